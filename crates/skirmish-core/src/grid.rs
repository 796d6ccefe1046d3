//! Grid geometry — bounds checking and the distance metric.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// An integer grid cell coordinate. Serializes as `[x, y]`.
pub type Cell = IVec2;

/// Immutable rectangular battlefield of `width` × `height` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Grid {
    /// Create a grid. Non-positive dimensions are a fatal setup error.
    pub fn new(width: i32, height: i32) -> Result<Self, SetupError> {
        if width <= 0 || height <= 0 {
            return Err(SetupError::BadGrid { width, height });
        }
        Ok(Self { width, height })
    }

    /// The sole admission test for movement destinations.
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    /// Euclidean distance between two cell centers.
    pub fn distance(&self, a: Cell, b: Cell) -> f64 {
        a.as_dvec2().distance(b.as_dvec2())
    }
}
