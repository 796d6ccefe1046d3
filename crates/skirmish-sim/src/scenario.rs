//! Scenario definitions — complete, self-contained game setups.
//!
//! A scenario carries everything needed to initialize an episode: grid
//! dimensions, game rules, RNG seed, and the full unit list with explicit
//! stats (no defaults for combat-relevant numbers). Scenarios round-trip
//! through JSON for reproducible, portable setups.

use serde::{Deserialize, Serialize};

use skirmish_core::constants::*;
use skirmish_core::enums::Team;
use skirmish_core::error::SetupError;
use skirmish_core::grid::{Cell, Grid};
use skirmish_core::unit::UnitRecord;

/// Game rules and world parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub grid_width: i32,
    pub grid_height: i32,
    /// Turns without shooting before declaring a draw.
    pub max_stalemate_turns: u32,
    /// Turns without movement before declaring a draw.
    pub max_no_move_turns: u32,
    /// Optional hard cap on total turns before declaring a draw.
    pub max_turns: Option<u32>,
    /// End the game early once neither side can ever shoot again.
    pub check_missile_exhaustion: bool,
    /// RNG seed. Same seed plus same action maps replay identically.
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            max_stalemate_turns: DEFAULT_MAX_STALEMATE_TURNS,
            max_no_move_turns: DEFAULT_MAX_NO_MOVE_TURNS,
            max_turns: None,
            check_missile_exhaustion: true,
            seed: DEFAULT_SEED,
        }
    }
}

/// A complete scenario: config plus every unit with explicit stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub config: ScenarioConfig,
    pub units: Vec<UnitRecord>,
}

impl Scenario {
    pub fn new(config: ScenarioConfig, units: Vec<UnitRecord>) -> Self {
        Self { config, units }
    }

    /// Validate the grid and every unit record. Fatal on any bad stat.
    pub fn validate(&self) -> Result<(), SetupError> {
        Grid::new(self.config.grid_width, self.config.grid_height)?;
        for unit in &self.units {
            unit.validate()?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Scenario> {
        serde_json::from_str(json)
    }
}

// --- Scenario builders ---

/// Minimal duel: one aircraft per side, in radar but out of missile range.
pub fn basic_battle() -> Scenario {
    Scenario::new(
        ScenarioConfig {
            grid_width: 20,
            grid_height: 20,
            seed: 42,
            ..ScenarioConfig::default()
        },
        vec![
            UnitRecord::aircraft(Team::Blue, Cell::new(2, 10), 5.0, 4, 4.0, 0.8, 0.1),
            UnitRecord::aircraft(Team::Red, Cell::new(18, 10), 5.0, 4, 4.0, 0.8, 0.1),
        ],
    )
}

/// Combined arms on a 20×13 grid: AWACS, escorts, SAM per side, plus a
/// red decoy flying alongside the strike pair.
pub fn mixed_battle() -> Scenario {
    Scenario::new(
        ScenarioConfig {
            grid_width: 20,
            grid_height: 13,
            max_stalemate_turns: 60,
            max_no_move_turns: 100,
            max_turns: Some(50),
            check_missile_exhaustion: true,
            seed: 42,
        },
        vec![
            // Blue team
            UnitRecord::awacs(Team::Blue, Cell::new(1, 10), 9.0),
            UnitRecord::aircraft(Team::Blue, Cell::new(5, 10), 5.0, 4, 4.0, 0.8, 0.1),
            UnitRecord::aircraft(Team::Blue, Cell::new(5, 12), 5.0, 4, 4.0, 0.8, 0.1),
            UnitRecord::sam(Team::Blue, Cell::new(2, 2), 8.0, 6, 6.0, 0.8, 0.1, 5, true),
            // Red team
            UnitRecord::awacs(Team::Red, Cell::new(19, 10), 9.0),
            UnitRecord::aircraft(Team::Red, Cell::new(15, 10), 5.0, 4, 4.0, 0.8, 0.1),
            UnitRecord::aircraft(Team::Red, Cell::new(15, 8), 5.0, 4, 4.0, 0.8, 0.1),
            UnitRecord::decoy(Team::Red, Cell::new(16, 10)),
            UnitRecord::sam(Team::Red, Cell::new(18, 12), 8.0, 6, 6.0, 0.8, 0.1, 5, false),
        ],
    )
}
