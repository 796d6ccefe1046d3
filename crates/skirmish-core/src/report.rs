//! Structured per-turn reports — the only surface for resolution outcomes.
//!
//! Every movement and combat outcome, and the turn's victory
//! determination, is recorded here and returned from `step()`. There are
//! no other side channels; log strings are human-readable duplicates of
//! the machine-readable fields.

use serde::{Deserialize, Serialize};

use crate::action::{Action, Rejection};
use crate::enums::{EndReason, GameResult, Team};
use crate::grid::Cell;
use crate::unit::UnitId;

/// Outcome of one unit's movement-phase action (move, toggle, or wait).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub unit_id: UnitId,
    pub action: Action,
    pub from: Cell,
    pub to: Cell,
    pub success: bool,
    pub rejection: Option<Rejection>,
    pub log: String,
}

/// All movement-phase outcomes for a turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementReport {
    pub outcomes: Vec<MoveOutcome>,
    /// True if at least one unit's position actually changed.
    pub movement_occurred: bool,
}

/// Outcome of a single shot attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotOutcome {
    pub attacker: UnitId,
    pub target: UnitId,
    /// Whether the shot was fired at all (not whether it hit).
    pub success: bool,
    pub hit: Option<bool>,
    pub distance: Option<f64>,
    pub hit_probability: Option<f64>,
    pub roll: Option<f64>,
    pub target_killed: bool,
    pub rejection: Option<Rejection>,
    pub log: String,
}

/// All combat outcomes for a turn, including applied deaths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatReport {
    pub shots: Vec<ShotOutcome>,
    pub death_logs: Vec<String>,
    pub killed: Vec<UnitId>,
    /// True if at least one shot was fired (hit or miss).
    pub combat_occurred: bool,
}

/// The turn's victory determination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VictoryReport {
    pub is_game_over: bool,
    pub result: Option<GameResult>,
    pub winner: Option<Team>,
    pub reason: Option<EndReason>,
}

impl VictoryReport {
    pub fn ongoing() -> Self {
        Self::default()
    }

    pub fn win(team: Team, reason: EndReason) -> Self {
        Self {
            is_game_over: true,
            result: Some(GameResult::win_for(team)),
            winner: Some(team),
            reason: Some(reason),
        }
    }

    pub fn draw(reason: EndReason) -> Self {
        Self {
            is_game_over: true,
            result: Some(GameResult::Draw),
            winner: None,
            reason: Some(reason),
        }
    }
}

/// Complete metadata for one `step()` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub movement: MovementReport,
    pub combat: CombatReport,
    pub victory: VictoryReport,
}

/// Terminal-only reward signal: +1 / -1 on win/loss, 0 / 0 otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRewards {
    pub blue: f64,
    pub red: f64,
}

impl TeamRewards {
    pub fn from_victory(victory: &VictoryReport) -> Self {
        match victory.winner {
            Some(Team::Blue) => Self {
                blue: 1.0,
                red: -1.0,
            },
            Some(Team::Red) => Self {
                blue: -1.0,
                red: 1.0,
            },
            None => Self::default(),
        }
    }

    pub fn get(&self, team: Team) -> f64 {
        match team {
            Team::Blue => self.blue,
            Team::Red => self.red,
        }
    }
}
