use std::path::Path;

use thiserror::Error;

use crate::types::{CellKind, Direction};

pub const STANDARD_LAYOUT: [&str; 20] = [
    "####################",
    "#P...#.....#....o.A#",
    "#.##.#.###.#.###.#A#",
    "#.......#......#...#",
    "#.#####.#####.####.#",
    "#........o........A#",
    "####.####.####.#####",
    "#..................#",
    "#.#######.########.#",
    "#......o...........#",
    "####.####.####.#####",
    "#.......#......#...#",
    "#.##.#.###.#.###.#.#",
    "#....#...o.....#...#",
    "#.#####.#####.####.#",
    "#..................#",
    "#.#######.########.#",
    "#..................#",
    "#A...#..o..#......A#",
    "####################",
];

#[derive(Debug, Error)]
pub enum GridError {
    #[error("layout has no rows")]
    Empty,
    #[error("layout must be square: row {row} has {found} cells, expected {expected}")]
    NotSquare {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown glyph {glyph:?} at row {row}, column {column}")]
    UnknownGlyph {
        glyph: char,
        row: usize,
        column: usize,
    },
    #[error("layout needs exactly one player spawn, found {0}")]
    PlayerSpawnCount(usize),
    #[error("failed to read layout {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Square maze of cell markers addressed by row-major index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    cells: Vec<CellKind>,
    consumables: usize,
}

impl Grid {
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let width = rows.len();
        if width == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(width * width);
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(GridError::NotSquare {
                    row,
                    found,
                    expected: width,
                });
            }
            for (column, glyph) in line.chars().enumerate() {
                let kind = CellKind::from_glyph(glyph).ok_or(GridError::UnknownGlyph {
                    glyph,
                    row,
                    column,
                })?;
                cells.push(kind);
            }
        }

        let player_spawns = cells
            .iter()
            .filter(|kind| **kind == CellKind::PlayerSpawn)
            .count();
        if player_spawns != 1 {
            return Err(GridError::PlayerSpawnCount(player_spawns));
        }

        let consumables = cells
            .iter()
            .filter(|kind| **kind == CellKind::Consumable)
            .count();
        Ok(Self {
            width,
            cells,
            consumables,
        })
    }

    /// Parses a layout file body; blank lines are skipped so files may end with a newline.
    pub fn parse_text(text: &str) -> Result<Self, GridError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        Self::parse(&rows)
    }

    pub fn load(path: &Path) -> Result<Self, GridError> {
        let text = std::fs::read_to_string(path).map_err(|source| GridError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        Self::parse_text(&text)
    }

    pub fn standard() -> Self {
        Self::parse(&STANDARD_LAYOUT).expect("built-in layout should be valid")
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    /// Out-of-bounds indices classify as walls.
    pub fn classify(&self, index: usize) -> CellKind {
        self.cells.get(index).copied().unwrap_or(CellKind::Wall)
    }

    pub fn indices_of(&self, kind: CellKind) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == kind)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn coords_of(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.cells.len() {
            return None;
        }
        Some((index % self.width, index / self.width))
    }

    pub fn index_of(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.width {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Orthogonal neighbor, or `None` past any edge. Horizontal steps never wrap rows.
    pub fn neighbor(&self, index: usize, dir: Direction) -> Option<usize> {
        let (x, y) = self.coords_of(index)?;
        match dir {
            Direction::Up => y.checked_sub(1).and_then(|ny| self.index_of(x, ny)),
            Direction::Down => self.index_of(x, y + 1),
            Direction::Left => x.checked_sub(1).and_then(|nx| self.index_of(nx, y)),
            Direction::Right => self.index_of(x + 1, y),
        }
    }

    pub fn is_open(&self, index: usize) -> bool {
        index < self.cells.len() && self.cells[index] != CellKind::Wall
    }

    pub fn manhattan(&self, a: usize, b: usize) -> u32 {
        let (ax, ay) = (a % self.width, a / self.width);
        let (bx, by) = (b % self.width, b / self.width);
        (ax.abs_diff(bx) + ay.abs_diff(by)) as u32
    }

    /// Overwrites a cell, keeping the consumable counter in step.
    pub fn set_cell(&mut self, index: usize, kind: CellKind) {
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        if *cell == CellKind::Consumable {
            self.consumables -= 1;
        }
        if kind == CellKind::Consumable {
            self.consumables += 1;
        }
        *cell = kind;
    }

    pub fn remaining_consumables(&self) -> usize {
        self.consumables
    }

    /// Regenerates consumables and power items from the pristine layout.
    pub fn restore_from(&mut self, template: &Grid) {
        self.width = template.width;
        self.cells.clone_from(&template.cells);
        self.consumables = template.consumables;
    }

    pub fn render_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|kind| kind.glyph()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Grid {
        Grid::parse(&["#####", "#P.o#", "#.#.#", "#A..#", "#####"]).expect("valid layout")
    }

    #[test]
    fn standard_layout_counts() {
        let grid = Grid::standard();
        assert_eq!(grid.width(), 20);
        assert_eq!(grid.len(), 400);
        assert_eq!(grid.remaining_consumables(), 193);
        assert_eq!(grid.indices_of(CellKind::PowerItem).len(), 5);
        assert_eq!(
            grid.indices_of(CellKind::AdversarySpawn),
            vec![38, 58, 118, 361, 378]
        );
        assert_eq!(grid.indices_of(CellKind::PlayerSpawn), vec![21]);
    }

    #[test]
    fn parse_rejects_bad_layouts() {
        assert!(matches!(
            Grid::parse::<&str>(&[]),
            Err(GridError::Empty)
        ));
        assert!(matches!(
            Grid::parse(&["#P#", "###"]),
            Err(GridError::NotSquare { row: 0, .. })
        ));
        assert!(matches!(
            Grid::parse(&["#P", "#x"]),
            Err(GridError::UnknownGlyph { glyph: 'x', row: 1, column: 1 })
        ));
        assert!(matches!(
            Grid::parse(&["##", "##"]),
            Err(GridError::PlayerSpawnCount(0))
        ));
        assert!(matches!(
            Grid::parse(&["PP", "##"]),
            Err(GridError::PlayerSpawnCount(2))
        ));
    }

    #[test]
    fn parse_text_skips_blank_lines_and_carriage_returns() {
        let grid = Grid::parse_text("###\r\n#P#\r\n###\r\n\r\n").expect("valid layout");
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.render_rows(), vec!["###", "#P#", "###"]);
    }

    #[test]
    fn load_reports_missing_file() {
        let path = std::env::temp_dir().join("maze-chase-missing-layout-file.txt");
        let result = Grid::load(&path);
        assert!(matches!(result, Err(GridError::Io { .. })));
    }

    #[test]
    fn horizontal_neighbors_never_wrap_rows() {
        let grid = Grid::parse(&[".P..", "....", "....", "...."]).expect("valid layout");
        let right_edge = grid.index_of(3, 1).expect("in bounds");
        let left_edge = grid.index_of(0, 2).expect("in bounds");
        assert_eq!(grid.neighbor(right_edge, Direction::Right), None);
        assert_eq!(grid.neighbor(left_edge, Direction::Left), None);
        assert_eq!(grid.neighbor(0, Direction::Up), None);
        assert_eq!(grid.neighbor(15, Direction::Down), None);
        assert_eq!(grid.neighbor(5, Direction::Right), Some(6));
        assert_eq!(grid.neighbor(5, Direction::Down), Some(9));
    }

    #[test]
    fn manhattan_uses_coordinates_not_index_delta() {
        let grid = Grid::standard();
        assert_eq!(grid.manhattan(19, 20), 20);
        assert_eq!(grid.manhattan(21, 21), 0);
        assert_eq!(grid.manhattan(21, 378), 17 + 17);
    }

    #[test]
    fn set_cell_tracks_consumable_counter() {
        let mut grid = small();
        let before = grid.remaining_consumables();
        grid.set_cell(7, CellKind::Empty);
        assert_eq!(grid.remaining_consumables(), before - 1);
        grid.set_cell(7, CellKind::Empty);
        assert_eq!(grid.remaining_consumables(), before - 1);
        grid.set_cell(8, CellKind::Empty);
        assert_eq!(grid.remaining_consumables(), before - 1);
        grid.set_cell(999, CellKind::Consumable);
        assert_eq!(grid.remaining_consumables(), before - 1);
    }

    #[test]
    fn restore_regenerates_items() {
        let template = small();
        let mut grid = template.clone();
        for index in grid.indices_of(CellKind::Consumable) {
            grid.set_cell(index, CellKind::Empty);
        }
        grid.set_cell(8, CellKind::Empty);
        assert_eq!(grid.remaining_consumables(), 0);

        grid.restore_from(&template);
        assert_eq!(grid, template);
        assert_eq!(grid.classify(8), CellKind::PowerItem);
    }

    #[test]
    fn classify_out_of_bounds_is_wall() {
        let grid = small();
        assert_eq!(grid.classify(25), CellKind::Wall);
        assert!(!grid.is_open(25));
        assert!(grid.is_open(6));
        assert!(!grid.is_open(0));
    }
}
