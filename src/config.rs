use std::path::{Path, PathBuf};

use crate::grid::{Grid, GridError};

pub const LAYOUT_ENV: &str = "MAZE_CHASE_LAYOUT";
pub const SEED_ENV: &str = "MAZE_CHASE_SEED";
pub const DEFAULT_FRAME_MS: u64 = 16;

/// Explicit flag wins, then the environment, then a random seed.
pub fn resolve_seed(flag: Option<u32>, env_value: Option<&str>) -> u32 {
    flag.or_else(|| env_value.and_then(parse_seed))
        .unwrap_or_else(rand::random::<u32>)
}

fn parse_seed(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

pub fn resolve_layout_path(flag: Option<PathBuf>, env_value: Option<&str>) -> Option<PathBuf> {
    flag.or_else(|| {
        env_value
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
    })
}

/// Loads the configured layout, or the built-in maze when none is set.
pub fn load_layout(path: Option<&Path>) -> Result<Grid, GridError> {
    match path {
        Some(path) => Grid::load(path),
        None => Ok(Grid::standard()),
    }
}

pub fn normalize_frame_ms(value: Option<u64>) -> u64 {
    value.unwrap_or(DEFAULT_FRAME_MS).clamp(1, 1_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_prefers_flag_then_env() {
        assert_eq!(resolve_seed(Some(5), Some("9")), 5);
        assert_eq!(resolve_seed(None, Some(" 9 ")), 9);
    }

    #[test]
    fn invalid_env_seed_falls_back_to_random() {
        assert_eq!(parse_seed("not-a-number"), None);
        assert_eq!(parse_seed("-1"), None);
        assert_eq!(parse_seed("4294967296"), None);
        assert_eq!(parse_seed(""), None);
        assert_eq!(parse_seed("4294967295"), Some(u32::MAX));
        assert_eq!(resolve_seed(Some(7), Some("not-a-number")), 7);

        let drawn: Vec<u32> = (0..4)
            .map(|_| resolve_seed(None, Some("not-a-number")))
            .collect();
        assert!(drawn.iter().any(|seed| *seed != drawn[0]));
    }

    #[test]
    fn layout_path_ignores_blank_env() {
        assert_eq!(resolve_layout_path(None, Some("   ")), None);
        assert_eq!(
            resolve_layout_path(None, Some("mazes/small.txt")),
            Some(PathBuf::from("mazes/small.txt"))
        );
        assert_eq!(
            resolve_layout_path(Some(PathBuf::from("a.txt")), Some("b.txt")),
            Some(PathBuf::from("a.txt"))
        );
    }

    #[test]
    fn missing_layout_file_is_a_config_error() {
        let path = std::env::temp_dir().join("maze-chase-no-such-layout.txt");
        assert!(matches!(load_layout(Some(&path)), Err(GridError::Io { .. })));
        assert_eq!(
            load_layout(None).expect("built-in layout").width(),
            20
        );
    }

    #[test]
    fn frame_ms_is_clamped() {
        assert_eq!(normalize_frame_ms(None), DEFAULT_FRAME_MS);
        assert_eq!(normalize_frame_ms(Some(0)), 1);
        assert_eq!(normalize_frame_ms(Some(50)), 50);
        assert_eq!(normalize_frame_ms(Some(60_000)), 1_000);
    }
}
