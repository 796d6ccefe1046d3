//! Turn-resolution systems.
//!
//! Systems are stateless free functions over `&mut WorldState`. Each
//! `step()` runs them in a fixed order: movement, sensing, combat,
//! victory. All randomness comes from the world's seeded RNG, so a turn
//! is fully determined by the world state and the action map.

pub mod combat;
pub mod movement;
pub mod sensors;
pub mod victory;
