//! Game state and core simulation types
//!
//! One `GameState` value owns the whole session; the host passes it by
//! reference into `tick` and the renderer. No globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Start menu showing, nothing simulated yet
    NotStarted,
    /// Active gameplay
    Running,
    /// Health hit zero; update step is frozen until restart
    GameOver,
}

/// Side effects produced by a tick, drained by the host for audio/HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A bullet was fired
    Shot,
    /// A reload started
    ReloadStarted,
    /// An enemy was destroyed (score already applied)
    EnemyKilled,
    /// The player took contact damage
    PlayerHit,
    /// Health reached zero
    GameOver,
}

/// A projectile fired by the player
#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub damage: i32,
    /// Recent positions for the trail effect (newest last)
    pub trail: Vec<Vec2>,
}

impl Bullet {
    pub fn new(id: u32, pos: Vec2, angle: f32) -> Self {
        Self {
            id,
            pos,
            angle,
            speed: BULLET_SPEED,
            damage: BULLET_DAMAGE,
            trail: Vec::with_capacity(BULLET_TRAIL_LENGTH),
        }
    }

    /// Record current position to the bounded trail ring
    pub fn record_trail(&mut self) {
        self.trail.push(self.pos);
        if self.trail.len() > BULLET_TRAIL_LENGTH {
            self.trail.remove(0);
        }
    }

    /// Advance along the firing angle
    pub fn advance(&mut self, dt: f32) {
        self.pos += crate::dir_from_angle(self.angle) * self.speed * dt;
    }
}

/// An enemy that homes straight at the player
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub health: i32,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            angle: 0.0,
            speed: ENEMY_SPEED,
            health: ENEMY_START_HEALTH,
        }
    }
}

/// The player entity
///
/// Created once per session and reset in place on restart; the live bullets
/// belong to it.
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Facing angle toward the pointer
    pub angle: f32,
    pub ammo: u32,
    /// Ticks until the in-flight reload completes (0 = not reloading)
    pub reload_ticks_left: u32,
    /// Ticks until the in-flight dash lands (0 = not dashing)
    pub dash_ticks_left: u32,
    /// Displacement captured at dash activation, applied when the dash lands
    pub dash_delta: Vec2,
    /// Tick of the last dash activation, for the cooldown gate
    pub last_dash_tick: Option<u64>,
    pub bullets: Vec<Bullet>,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            angle: 0.0,
            ammo: PLAYER_MAX_AMMO,
            reload_ticks_left: 0,
            dash_ticks_left: 0,
            dash_delta: Vec2::ZERO,
            last_dash_tick: None,
            bullets: Vec::new(),
        }
    }

    pub fn is_reloading(&self) -> bool {
        self.reload_ticks_left > 0
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_ticks_left > 0
    }

    /// Reload completion fraction in [0, 1] (for the HUD arc)
    pub fn reload_progress(&self) -> f32 {
        if self.reload_ticks_left == 0 {
            1.0
        } else {
            1.0 - self.reload_ticks_left as f32 / RELOAD_TICKS as f32
        }
    }

    /// Whether the dash cooldown has elapsed at the given tick
    pub fn dash_ready(&self, now: u64) -> bool {
        match self.last_dash_tick {
            None => true,
            Some(last) => now.saturating_sub(last) >= DASH_COOLDOWN_TICKS,
        }
    }
}

/// A static axis-aligned wall rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Wall {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }
}

/// The fixed arena layout: two columns of three horizontal bars with
/// vertical pillars between them
pub fn default_walls() -> Vec<Wall> {
    vec![
        Wall::new(100.0, 100.0, 200.0, 20.0),
        Wall::new(400.0, 100.0, 200.0, 20.0),
        Wall::new(100.0, 300.0, 200.0, 20.0),
        Wall::new(400.0, 300.0, 200.0, 20.0),
        Wall::new(100.0, 500.0, 200.0, 20.0),
        Wall::new(400.0, 500.0, 200.0, 20.0),
        // Vertical walls
        Wall::new(100.0, 100.0, 20.0, 200.0),
        Wall::new(300.0, 100.0, 20.0, 200.0),
        Wall::new(500.0, 100.0, 20.0, 200.0),
        Wall::new(100.0, 400.0, 20.0, 200.0),
        Wall::new(300.0, 400.0, 20.0, 200.0),
        Wall::new(500.0, 400.0, 20.0, 200.0),
    ]
}

/// Complete game state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub score: u64,
    /// Player health, saturating at 0 (0 is terminal)
    pub health: u32,
    pub kills: u32,
    /// Simulation tick counter (the monotonic clock all timers compare against)
    pub time_ticks: u64,
    /// Tick at which the spawner next fires
    pub next_spawn_tick: u64,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub walls: Vec<Wall>,
    /// Arena dimensions (matches the rendering surface)
    pub arena: Vec2,
    /// Side effects since the host last drained them
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a session in the `NotStarted` phase
    pub fn new(arena_w: f32, arena_h: f32, seed: u64) -> Self {
        let arena = Vec2::new(arena_w, arena_h);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::NotStarted,
            score: 0,
            health: PLAYER_START_HEALTH,
            kills: 0,
            time_ticks: 0,
            next_spawn_tick: SPAWN_INTERVAL_TICKS,
            player: Player::new(arena / 2.0),
            enemies: Vec::new(),
            walls: default_walls(),
            arena,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reset all mutable session state and enter `Running`
    ///
    /// The same routine serves first start and restart after game over.
    pub fn start(&mut self) {
        self.phase = GamePhase::Running;
        self.score = 0;
        self.health = PLAYER_START_HEALTH;
        self.kills = 0;
        self.time_ticks = 0;
        self.next_spawn_tick = SPAWN_INTERVAL_TICKS;
        self.player = Player::new(self.arena / 2.0);
        self.enemies.clear();
        self.events.clear();
    }

    /// Drain pending events (host calls this once per tick)
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure entities stay sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.player.bullets.sort_by_key(|b| b.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_not_started() {
        let state = GameState::new(1024.0, 768.0, 7);
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert_eq!(state.health, PLAYER_START_HEALTH);
        assert_eq!(state.player.ammo, PLAYER_MAX_AMMO);
        assert_eq!(state.walls.len(), 12);
        assert_eq!(state.player.pos, Vec2::new(512.0, 384.0));
    }

    #[test]
    fn start_resets_session_state() {
        let mut state = GameState::new(1024.0, 768.0, 7);
        state.score = 900;
        state.health = 0;
        state.kills = 9;
        state.time_ticks = 5000;
        state.enemies.push(Enemy::new(99, Vec2::ZERO));
        state.player.ammo = 0;
        state.phase = GamePhase::GameOver;

        state.start();

        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.score, 0);
        assert_eq!(state.health, PLAYER_START_HEALTH);
        assert_eq!(state.kills, 0);
        assert_eq!(state.time_ticks, 0);
        assert!(state.enemies.is_empty());
        assert!(state.player.bullets.is_empty());
        assert_eq!(state.player.ammo, PLAYER_MAX_AMMO);
    }

    #[test]
    fn bullet_trail_is_bounded() {
        let mut bullet = Bullet::new(1, Vec2::ZERO, 0.0);
        for _ in 0..20 {
            bullet.record_trail();
            bullet.advance(1.0 / 60.0);
        }
        assert_eq!(bullet.trail.len(), BULLET_TRAIL_LENGTH);
        // Oldest entries dropped from the front
        assert!(bullet.trail[0].x < bullet.trail[BULLET_TRAIL_LENGTH - 1].x);
    }

    #[test]
    fn dash_cooldown_gate() {
        let mut player = Player::new(Vec2::ZERO);
        assert!(player.dash_ready(0));
        player.last_dash_tick = Some(10);
        assert!(!player.dash_ready(10 + crate::consts::DASH_COOLDOWN_TICKS - 1));
        assert!(player.dash_ready(10 + crate::consts::DASH_COOLDOWN_TICKS));
    }
}
