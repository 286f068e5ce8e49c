//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Timers are tick deadlines, never wall-clock
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{circles_overlap, clamp_to_arena, hits_any_wall, slide_move};
pub use state::{Bullet, Enemy, GameEvent, GamePhase, GameState, Player, Wall, default_walls};
pub use tick::{TickInput, spawn_enemy, tick};
