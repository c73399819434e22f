use crate::constants::{AGGRESSION_STEP, MAX_ADVERSARIES, MIN_SPEED_THRESHOLD};
use crate::types::AdversaryView;

/// Tunables for one adversary slot, assigned by spawn order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdversaryArchetype {
    pub name: &'static str,
    /// Adversary ticks between moves; lower is faster.
    pub base_speed: u32,
    pub aggression: f64,
    pub color: &'static str,
    pub points: u32,
}

pub const STANDARD_ROSTER: [AdversaryArchetype; MAX_ADVERSARIES] = [
    AdversaryArchetype {
        name: "Worm",
        base_speed: 8,
        aggression: 0.8,
        color: "#ff3366",
        points: 100,
    },
    AdversaryArchetype {
        name: "Trojan",
        base_speed: 6,
        aggression: 0.6,
        color: "#ff6600",
        points: 150,
    },
    AdversaryArchetype {
        name: "Spyware",
        base_speed: 7,
        aggression: 0.9,
        color: "#9933ff",
        points: 120,
    },
    AdversaryArchetype {
        name: "Ransomware",
        base_speed: 5,
        aggression: 0.5,
        color: "#00cc99",
        points: 200,
    },
    AdversaryArchetype {
        name: "Adware",
        base_speed: 9,
        aggression: 0.7,
        color: "#ffcc00",
        points: 80,
    },
    AdversaryArchetype {
        name: "Rootkit",
        base_speed: 4,
        aggression: 0.4,
        color: "#ff0066",
        points: 180,
    },
];

#[derive(Clone, Debug)]
pub struct Adversary {
    pub id: usize,
    pub name: String,
    pub index: usize,
    pub color: String,
    pub base_speed: u32,
    pub current_speed: u32,
    pub aggression: f64,
    pub points: u32,
    pub move_counter: u32,
    pub chasing: bool,
    /// Cell this adversary just left; stepping back into it is a last resort.
    pub last_index: Option<usize>,
}

impl Adversary {
    fn from_archetype(id: usize, index: usize, archetype: &AdversaryArchetype) -> Self {
        Self {
            id,
            name: archetype.name.to_string(),
            index,
            color: archetype.color.to_string(),
            base_speed: archetype.base_speed,
            current_speed: archetype.base_speed,
            aggression: archetype.aggression.clamp(0.0, 1.0),
            points: archetype.points,
            move_counter: 0,
            chasing: false,
            last_index: None,
        }
    }

    pub fn relocate(&mut self, index: usize) {
        self.index = index;
        self.last_index = None;
    }

    pub fn level_up(&mut self) {
        self.current_speed = self
            .current_speed
            .saturating_sub(1)
            .max(MIN_SPEED_THRESHOLD);
        self.aggression = (self.aggression + AGGRESSION_STEP).min(1.0);
    }

    pub fn view(&self, quarantined: bool) -> AdversaryView {
        AdversaryView {
            id: self.id,
            name: self.name.clone(),
            index: self.index,
            color: self.color.clone(),
            quarantined,
            chasing: self.chasing,
        }
    }
}

/// Pairs spawn cells with archetypes in order; extra spawns or archetypes are ignored.
pub fn build_roster(spawns: &[usize], archetypes: &[AdversaryArchetype]) -> Vec<Adversary> {
    spawns
        .iter()
        .zip(archetypes.iter())
        .take(MAX_ADVERSARIES)
        .enumerate()
        .map(|(id, (index, archetype))| Adversary::from_archetype(id, *index, archetype))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_is_capped_by_spawns_and_table() {
        let roster = build_roster(&[3, 9, 14], &STANDARD_ROSTER);
        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0].name, "Worm");
        assert_eq!(roster[2].index, 14);
        assert_eq!(roster[2].current_speed, 7);

        let spawns: Vec<usize> = (0..10).collect();
        assert_eq!(build_roster(&spawns, &STANDARD_ROSTER).len(), MAX_ADVERSARIES);
        assert_eq!(build_roster(&spawns, &STANDARD_ROSTER[..2]).len(), 2);
        assert!(build_roster(&[], &STANDARD_ROSTER).is_empty());
    }

    #[test]
    fn level_up_floors_speed_and_caps_aggression() {
        let mut roster = build_roster(&[1], &STANDARD_ROSTER[5..]);
        let rootkit = &mut roster[0];
        for _ in 0..20 {
            rootkit.level_up();
        }
        assert_eq!(rootkit.current_speed, MIN_SPEED_THRESHOLD);
        assert_eq!(rootkit.base_speed, 4);
        assert!((rootkit.aggression - 1.0).abs() < 1e-9);
    }

    #[test]
    fn relocate_clears_reversal_memory() {
        let mut roster = build_roster(&[1], &STANDARD_ROSTER);
        roster[0].last_index = Some(2);
        roster[0].relocate(40);
        assert_eq!(roster[0].index, 40);
        assert_eq!(roster[0].last_index, None);
    }
}
