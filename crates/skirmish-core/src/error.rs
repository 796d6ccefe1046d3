//! Fatal error types.
//!
//! Only setup-time misconfiguration and engine misuse are errors. Invalid
//! actions at turn level are structured [`Rejection`](crate::action::Rejection)
//! records in the step report, never errors.

use thiserror::Error;

use crate::unit::UnitId;

/// Unusable configuration, raised at construction/reset time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    BadGrid { width: i32, height: i32 },

    #[error("{unit}: {message}")]
    InvalidStat { unit: String, message: String },

    #[error("{unit} starts out of bounds at ({x}, {y})")]
    StartsOutOfBounds { unit: String, x: i32, y: i32 },

    #[error("{a} and {b} start on the same cell")]
    OverlappingUnits { a: String, b: String },

    #[error("duplicate unit id {0}")]
    DuplicateId(UnitId),

    #[error(
        "provided world grid size does not match scenario config: \
         world={world_width}x{world_height}, scenario={scenario_width}x{scenario_height}"
    )]
    GridMismatch {
        world_width: i32,
        world_height: i32,
        scenario_width: i32,
        scenario_height: i32,
    },

    #[error("world snapshot must carry one view per team")]
    MalformedSnapshot,
}

/// Engine misuse, raised by `step()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("step() called before reset()")]
    NotReset,

    #[error("step() called after the game ended")]
    GameOver,
}
