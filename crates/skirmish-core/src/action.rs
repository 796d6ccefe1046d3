//! Per-turn unit actions and the structured rejection record.

use serde::{Deserialize, Serialize};

use crate::enums::{MoveDir, RejectReason};
use crate::unit::UnitId;

/// A single unit's intended action for one turn.
///
/// Actions are supplied externally as a map of unit id to action; units
/// without an entry are inert that turn. The engine never substitutes
/// `Wait` on the caller's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    /// Do nothing this turn.
    Wait,
    /// Move one cell in a direction.
    Move { dir: MoveDir },
    /// Fire one missile at a target unit.
    Shoot { target: UnitId },
    /// Set a SAM's radar on or off.
    Toggle { on: bool },
}

/// Why an action did not take effect this turn.
///
/// Rejections are expected, reportable outcomes — they degrade the action
/// to a no-op and surface in the step report, never as a panic or error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub code: RejectReason,
    pub message: String,
}

impl Rejection {
    pub fn new(code: RejectReason, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
