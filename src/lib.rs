//! Arena Rush - a top-down arena shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, combat, timers, game state)
//! - `renderer`: Canvas2D rendering (wasm only)
//! - `audio`: Procedural Web Audio sound effects (wasm only)
//! - `settings`: Persisted preferences
//! - `highscores`: Local leaderboard

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscores;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one display refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 20.0;
    pub const PLAYER_SPEED: f32 = 300.0; // pixels/sec (5 px per 60 Hz tick)
    pub const PLAYER_START_HEALTH: u32 = 100;
    pub const PLAYER_MAX_AMMO: u32 = 30;

    /// Bullet defaults
    pub const BULLET_SIZE: f32 = 5.0;
    pub const BULLET_SPEED: f32 = 600.0;
    pub const BULLET_DAMAGE: i32 = 25;
    /// Trail ring length (rendering only)
    pub const BULLET_TRAIL_LENGTH: usize = 5;

    /// Enemy defaults
    pub const ENEMY_SIZE: f32 = 20.0;
    pub const ENEMY_SPEED: f32 = 120.0;
    pub const ENEMY_START_HEALTH: i32 = 100;
    /// Contact damage per enemy per tick (stacks across overlapping enemies)
    pub const ENEMY_CONTACT_DAMAGE: u32 = 20;
    /// How far outside the arena edge enemies spawn
    pub const ENEMY_SPAWN_MARGIN: f32 = 20.0;

    /// Timer tunings (millisecond values converted to ticks at 60 Hz)
    pub const RELOAD_TICKS: u32 = 60; // 1000 ms
    pub const DASH_DURATION_TICKS: u32 = 12; // 200 ms
    pub const DASH_COOLDOWN_TICKS: u64 = 60; // 1000 ms from activation
    pub const SPAWN_INTERVAL_TICKS: u64 = 120; // 2000 ms

    /// Dash displacement toward the aim point, applied when the dash lands
    pub const DASH_DISTANCE: f32 = 15.0;

    /// Score awarded per enemy kill
    pub const SCORE_PER_KILL: u64 = 100;
}

/// Angle (radians) from `from` toward `to`
#[inline]
pub fn aim_angle(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Unit direction vector for an angle
#[inline]
pub fn dir_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
