//! ECS components for unit entities.
//!
//! Components are plain data structs with no game logic; the resolvers
//! in the simulation crate own all behavior. Records (`unit.rs`) map to
//! bundles of these at spawn time.

use serde::{Deserialize, Serialize};

use crate::grid::Cell;

/// Grid position of a unit. Mutated only by the movement resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position(pub Cell);

/// Alive flag. Dead units stay in the world for record-keeping but are
/// excluded from all action, observation, and targeting logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alive(pub bool);

/// Marker for units that may move (everything except SAMs).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mobile;

/// Sensor with a nominal detection range in cells.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Radar {
    pub range: f64,
}

/// Weapon state for armed units. One missile is consumed per shot fired,
/// hit or miss.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Launcher {
    pub missiles: u32,
    pub max_range: f64,
    pub base_hit_prob: f64,
    pub min_hit_prob: f64,
}

/// SAM radar switch and shot cooldown.
///
/// While `on` is false the SAM senses nothing and is invisible to every
/// other unit. Firing starts the cooldown; the cooldown ticks down once
/// per turn during pre-turn housekeeping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamControl {
    pub on: bool,
    pub cooldown_steps: u32,
    pub cooldown_remaining: u32,
}

impl SamControl {
    pub fn start_cooldown(&mut self) {
        self.cooldown_remaining = self.cooldown_steps;
    }

    pub fn tick_cooldown(&mut self) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
    }

    pub fn ready(&self) -> bool {
        self.cooldown_remaining == 0
    }
}
