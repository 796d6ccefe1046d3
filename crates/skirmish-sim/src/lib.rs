//! Simulation engine for SKIRMISH.
//!
//! Owns the hecs ECS world, resolves one full turn per `step()`
//! (movement, sensing, combat, victory), and maintains the per-team
//! fog-of-war views. Completely headless, enabling deterministic
//! testing and replay.

pub mod actions;
pub mod engine;
pub mod intel;
pub mod scenario;
pub mod systems;
pub mod world;

pub use skirmish_core as core;
pub use engine::CombatEnv;
