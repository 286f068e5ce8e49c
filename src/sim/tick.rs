//! Fixed timestep simulation tick
//!
//! One call advances the session by a single tick: timers, spawning, input,
//! movement, combat, cleanup. All timed behavior (reload, dash, spawn) is a
//! tick deadline compared against `time_ticks`, so the whole update is
//! deterministic and testable without wall-clock delays.

use glam::Vec2;
use rand::Rng;

use super::collision::{circles_overlap, clamp_to_arena, slide_move};
use super::state::{Enemy, GameEvent, GamePhase, GameState};
use crate::consts::*;
use crate::{aim_angle, dir_from_angle};

/// Input snapshot for a single tick
///
/// Held keys are level-triggered; `fire`, `reload` and `dash` are one-shot
/// flags the host clears after the tick that consumed them.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Pointer position in arena coordinates
    pub aim: Vec2,
    /// Fire a bullet (pointer press)
    pub fire: bool,
    /// Start a reload
    pub reload: bool,
    /// Start a dash toward the aim point
    pub dash: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Update step is frozen outside of a running session
    if state.phase != GamePhase::Running {
        return;
    }

    state.time_ticks += 1;

    run_timers(state);

    // Time-gated enemy spawning at the arena edges
    if state.time_ticks >= state.next_spawn_tick {
        spawn_enemy(state);
        state.next_spawn_tick = state.time_ticks + SPAWN_INTERVAL_TICKS;
    }

    move_player(state, input, dt);
    move_enemies(state, dt);

    for bullet in &mut state.player.bullets {
        bullet.record_trail();
        bullet.advance(dt);
    }

    // One-shot actions, after movement so new bullets start at the committed
    // player position
    if input.fire {
        fire(state, input.aim);
    }
    if input.reload {
        start_reload(state);
    }
    if input.dash {
        start_dash(state, input.aim);
    }

    resolve_combat(state);

    // Bullets that left the arena never reach the next collision pass
    let arena = state.arena;
    state
        .player
        .bullets
        .retain(|b| b.pos.x >= 0.0 && b.pos.x <= arena.x && b.pos.y >= 0.0 && b.pos.y <= arena.y);

    state.normalize_order();
}

/// Count down the reload and dash deadlines
fn run_timers(state: &mut GameState) {
    let player = &mut state.player;

    if player.reload_ticks_left > 0 {
        player.reload_ticks_left -= 1;
        if player.reload_ticks_left == 0 {
            player.ammo = PLAYER_MAX_AMMO;
        }
    }

    if player.dash_ticks_left > 0 {
        player.dash_ticks_left -= 1;
        if player.dash_ticks_left == 0 {
            // The dash lands: apply the captured displacement atomically,
            // still honoring walls and arena bounds
            let landed = slide_move(player.pos, player.dash_delta, PLAYER_SIZE, &state.walls);
            player.pos = clamp_to_arena(landed, PLAYER_SIZE, state.arena);
            player.dash_delta = Vec2::ZERO;
        }
    }
}

/// Player movement from held keys, with wall sliding and bounds clamping
fn move_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let player = &mut state.player;

    // Normal movement is suspended while a dash is in flight
    if player.is_dashing() {
        return;
    }

    let step = PLAYER_SPEED * dt;
    let mut delta = Vec2::ZERO;
    if input.up {
        delta.y -= step;
    }
    if input.down {
        delta.y += step;
    }
    if input.left {
        delta.x -= step;
    }
    if input.right {
        delta.x += step;
    }

    // Diagonal motion must not exceed axial speed
    if delta.x != 0.0 && delta.y != 0.0 {
        delta *= std::f32::consts::FRAC_1_SQRT_2;
    }

    let moved = slide_move(player.pos, delta, PLAYER_SIZE, &state.walls);
    player.pos = clamp_to_arena(moved, PLAYER_SIZE, state.arena);
    player.angle = aim_angle(player.pos, input.aim);
}

/// Enemies steer straight at the player's current position (no pathfinding)
fn move_enemies(state: &mut GameState, dt: f32) {
    let target = state.player.pos;
    for enemy in &mut state.enemies {
        enemy.angle = aim_angle(enemy.pos, target);
        let delta = dir_from_angle(enemy.angle) * enemy.speed * dt;
        enemy.pos = slide_move(enemy.pos, delta, ENEMY_SIZE, &state.walls);
    }
}

/// Fire a bullet toward the aim point
///
/// Silently a no-op with empty magazine or while reloading.
fn fire(state: &mut GameState, aim: Vec2) {
    if state.player.ammo == 0 || state.player.is_reloading() {
        return;
    }
    let id = state.next_entity_id();
    let player = &mut state.player;
    let angle = aim_angle(player.pos, aim);
    player
        .bullets
        .push(super::state::Bullet::new(id, player.pos, angle));
    player.ammo -= 1;
    state.events.push(GameEvent::Shot);
}

/// Begin a reload unless one is in flight or the magazine is full
fn start_reload(state: &mut GameState) {
    let player = &mut state.player;
    if player.is_reloading() || player.ammo == PLAYER_MAX_AMMO {
        return;
    }
    player.reload_ticks_left = RELOAD_TICKS;
    state.events.push(GameEvent::ReloadStarted);
}

/// Begin a dash toward the aim point, gated by the cooldown
fn start_dash(state: &mut GameState, aim: Vec2) {
    let now = state.time_ticks;
    let player = &mut state.player;
    if player.is_dashing() || !player.dash_ready(now) {
        return;
    }
    player.last_dash_tick = Some(now);
    player.dash_ticks_left = DASH_DURATION_TICKS;
    player.dash_delta = dir_from_angle(aim_angle(player.pos, aim)) * DASH_DISTANCE;
}

/// Bullet-enemy and player-enemy collision resolution
fn resolve_combat(state: &mut GameState) {
    let GameState {
        player,
        enemies,
        events,
        score,
        kills,
        health,
        phase,
        ..
    } = state;

    // Brute-force bullets x enemies scan; first hit consumes the bullet and
    // stops the inner scan
    for bi in (0..player.bullets.len()).rev() {
        for ei in (0..enemies.len()).rev() {
            if circles_overlap(
                player.bullets[bi].pos,
                BULLET_SIZE,
                enemies[ei].pos,
                ENEMY_SIZE,
            ) {
                enemies[ei].health -= player.bullets[bi].damage;
                player.bullets.remove(bi);
                if enemies[ei].health <= 0 {
                    enemies.remove(ei);
                    *score += SCORE_PER_KILL;
                    *kills += 1;
                    events.push(GameEvent::EnemyKilled);
                }
                break;
            }
        }
    }

    // Every enemy in contact deals damage the same tick; overlapping enemies
    // stack with no invulnerability window
    for enemy in enemies.iter() {
        if circles_overlap(player.pos, PLAYER_SIZE, enemy.pos, ENEMY_SIZE) {
            *health = health.saturating_sub(ENEMY_CONTACT_DAMAGE);
            events.push(GameEvent::PlayerHit);
        }
    }

    if *health == 0 && *phase == GamePhase::Running {
        *phase = GamePhase::GameOver;
        events.push(GameEvent::GameOver);
    }
}

/// Place a new enemy just outside a randomly chosen arena edge
pub fn spawn_enemy(state: &mut GameState) {
    let (w, h) = (state.arena.x, state.arena.y);
    let m = ENEMY_SPAWN_MARGIN;
    let side: u8 = state.rng.random_range(0..4);
    let pos = match side {
        0 => Vec2::new(state.rng.random_range(0.0..w), -m), // top
        1 => Vec2::new(w + m, state.rng.random_range(0.0..h)), // right
        2 => Vec2::new(state.rng.random_range(0.0..w), h + m), // bottom
        _ => Vec2::new(-m, state.rng.random_range(0.0..h)), // left
    };
    let id = state.next_entity_id();
    state.enemies.push(Enemy::new(id, pos));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::hits_any_wall;
    use crate::sim::state::Bullet;

    fn running_state() -> GameState {
        let mut state = GameState::new(1024.0, 768.0, 42);
        state.start();
        state
    }

    /// Aim straight right of the player so angles come out as 0
    fn aim_right(state: &GameState) -> Vec2 {
        state.player.pos + Vec2::new(100.0, 0.0)
    }

    #[test]
    fn tick_is_frozen_outside_running() {
        let mut state = GameState::new(1024.0, 768.0, 1);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, 0);

        state.start();
        state.phase = GamePhase::GameOver;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn fire_with_one_round_spawns_bullet_at_player() {
        let mut state = running_state();
        state.player.ammo = 1;
        let input = TickInput {
            fire: true,
            aim: aim_right(&state),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        assert_eq!(state.player.ammo, 0);
        assert_eq!(state.player.bullets.len(), 1);
        let bullet = &state.player.bullets[0];
        assert_eq!(bullet.pos, state.player.pos);
        assert!(bullet.angle.abs() < 1e-6);
        assert!(state.take_events().contains(&GameEvent::Shot));
    }

    #[test]
    fn fire_with_empty_magazine_is_a_no_op() {
        let mut state = running_state();
        state.player.ammo = 0;
        let input = TickInput {
            fire: true,
            aim: aim_right(&state),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        assert_eq!(state.player.ammo, 0);
        assert!(state.player.bullets.is_empty());
        assert!(!state.take_events().contains(&GameEvent::Shot));
    }

    #[test]
    fn fire_while_reloading_is_a_no_op() {
        let mut state = running_state();
        state.player.ammo = 10;
        state.player.reload_ticks_left = 30;
        let input = TickInput {
            fire: true,
            aim: aim_right(&state),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        assert_eq!(state.player.ammo, 10);
        assert!(state.player.bullets.is_empty());
    }

    #[test]
    fn reload_refills_after_duration() {
        let mut state = running_state();
        state.player.ammo = 5;
        let input = TickInput {
            reload: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!(state.player.is_reloading());
        assert_eq!(state.player.ammo, 5);
        assert!(state.take_events().contains(&GameEvent::ReloadStarted));

        for _ in 0..RELOAD_TICKS {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(!state.player.is_reloading());
        assert_eq!(state.player.ammo, PLAYER_MAX_AMMO);
    }

    #[test]
    fn reload_with_full_magazine_is_a_no_op() {
        let mut state = running_state();
        let input = TickInput {
            reload: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!(!state.player.is_reloading());
    }

    #[test]
    fn four_hits_kill_an_enemy_exactly_once() {
        let mut state = running_state();
        let enemy_pos = Vec2::new(800.0, 200.0);
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, enemy_pos));

        for hit in 1..=4u32 {
            let bid = state.next_entity_id();
            let mut bullet = Bullet::new(bid, enemy_pos, 0.0);
            bullet.speed = 0.0; // hold in place for the check
            state.player.bullets.push(bullet);
            tick(&mut state, &TickInput::default(), SIM_DT);

            if hit < 4 {
                assert_eq!(state.enemies.len(), 1, "enemy removed early at hit {hit}");
                assert_eq!(state.enemies[0].health, 100 - 25 * hit as i32);
                assert_eq!(state.score, 0);
            }
        }

        assert!(state.enemies.is_empty());
        assert_eq!(state.score, SCORE_PER_KILL);
        assert_eq!(state.kills, 1);
        let kill_events = state
            .take_events()
            .iter()
            .filter(|e| **e == GameEvent::EnemyKilled)
            .count();
        assert_eq!(kill_events, 1);
    }

    #[test]
    fn distant_bullet_does_not_damage() {
        let mut state = running_state();
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, Vec2::new(800.0, 200.0)));
        // Exactly at contact distance: (5 + 20) / 2 = 12.5 -> no hit
        let bid = state.next_entity_id();
        let mut bullet = Bullet::new(bid, Vec2::new(800.0 - 12.5 - 4.0, 200.0), 0.0);
        bullet.speed = 0.0;
        state.player.bullets.push(bullet);
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.enemies[0].health, ENEMY_START_HEALTH);
        assert_eq!(state.player.bullets.len(), 1);
    }

    #[test]
    fn contact_damage_stacks_across_enemies() {
        let mut state = running_state();
        let p = state.player.pos;
        for _ in 0..2 {
            let id = state.next_entity_id();
            state.enemies.push(Enemy::new(id, p));
        }
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.health, 100 - 2 * ENEMY_CONTACT_DAMAGE);
    }

    #[test]
    fn health_zero_ends_the_session_and_freezes_updates() {
        let mut state = running_state();
        state.health = 20;
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, state.player.pos));
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.health, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        let events = state.take_events();
        assert!(events.contains(&GameEvent::PlayerHit));
        assert!(events.contains(&GameEvent::GameOver));

        let ticks = state.time_ticks;
        let pos = state.player.pos;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.player.pos, pos);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn dash_applies_displacement_after_duration() {
        let mut state = running_state();
        state.player.pos = Vec2::new(800.0, 200.0);
        let input = TickInput {
            dash: true,
            aim: Vec2::new(900.0, 200.0),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!(state.player.is_dashing());
        assert_eq!(state.player.last_dash_tick, Some(1));
        let start = state.player.pos;

        // Held keys are ignored while the dash is in flight
        let held = TickInput {
            up: true,
            ..Default::default()
        };
        for _ in 0..DASH_DURATION_TICKS - 1 {
            tick(&mut state, &held, SIM_DT);
            assert!(state.player.is_dashing());
            assert_eq!(state.player.pos, start);
        }
        // Landing tick: displacement applied, movement resumes afterwards
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(!state.player.is_dashing());
        assert!((state.player.pos.x - (start.x + DASH_DISTANCE)).abs() < 1e-3);
        assert!((state.player.pos.y - start.y).abs() < 1e-3);
    }

    #[test]
    fn dash_during_cooldown_is_rejected() {
        let mut state = running_state();
        state.player.pos = Vec2::new(800.0, 200.0);
        let dash_input = TickInput {
            dash: true,
            aim: Vec2::new(900.0, 200.0),
            ..Default::default()
        };
        tick(&mut state, &dash_input, SIM_DT); // activation at tick 1

        // Run to the 500 ms mark (30 ticks at 60 Hz)
        for _ in 0..29 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        let pos_before = state.player.pos;
        tick(&mut state, &dash_input, SIM_DT);

        // Rejected: no displacement scheduled, no cooldown reset
        assert_eq!(state.player.last_dash_tick, Some(1));
        assert!(!state.player.is_dashing());
        assert_eq!(state.player.pos, pos_before);

        // Once the full cooldown elapses a new dash is accepted
        while state.time_ticks < DASH_COOLDOWN_TICKS {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        tick(&mut state, &dash_input, SIM_DT);
        assert!(state.player.is_dashing());
        assert_eq!(state.player.last_dash_tick, Some(DASH_COOLDOWN_TICKS + 1));
    }

    #[test]
    fn spawner_fires_on_a_fixed_cadence_outside_the_arena() {
        let mut state = running_state();
        for _ in 0..SPAWN_INTERVAL_TICKS {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.enemies.len(), 1);
        let e = &state.enemies[0];
        let outside = e.pos.x < 0.0
            || e.pos.x > state.arena.x
            || e.pos.y < 0.0
            || e.pos.y > state.arena.y;
        assert!(outside, "enemy spawned inside the arena: {:?}", e.pos);

        for _ in 0..SPAWN_INTERVAL_TICKS {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.enemies.len(), 2);
    }

    #[test]
    fn bullets_leaving_the_arena_are_removed() {
        let mut state = running_state();
        let bid = state.next_entity_id();
        state
            .player
            .bullets
            .push(Bullet::new(bid, Vec2::new(state.arena.x - 5.0, 200.0), 0.0));
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.player.bullets.is_empty());
    }

    #[test]
    fn arena_shrink_clamps_player_and_culls_bullets() {
        let mut state = running_state();
        state.player.pos = Vec2::new(1000.0, 700.0);
        let bid = state.next_entity_id();
        let mut bullet = Bullet::new(bid, Vec2::new(900.0, 100.0), 0.0);
        bullet.speed = 0.0;
        state.player.bullets.push(bullet);

        // Host shrank the viewport mid-session
        state.arena = Vec2::new(800.0, 600.0);
        tick(&mut state, &TickInput::default(), SIM_DT);

        let half = PLAYER_SIZE / 2.0;
        assert_eq!(state.player.pos, Vec2::new(800.0 - half, 600.0 - half));
        assert!(state.player.bullets.is_empty());
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut state = running_state();
        state.player.pos = Vec2::new(800.0, 200.0);
        let input = TickInput {
            right: true,
            down: true,
            aim: Vec2::new(900.0, 300.0),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        let step = PLAYER_SPEED * SIM_DT * std::f32::consts::FRAC_1_SQRT_2;
        assert!((state.player.pos.x - (800.0 + step)).abs() < 1e-3);
        assert!((state.player.pos.y - (200.0 + step)).abs() < 1e-3);
    }

    #[test]
    fn player_slides_along_a_wall() {
        let mut state = running_state();
        // Just left of the top-left wall bar, pushing diagonally into it
        state.player.pos = Vec2::new(88.0, 110.0);
        let input = TickInput {
            right: true,
            down: true,
            aim: Vec2::new(200.0, 110.0),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        // X blocked by the wall face, Y commits
        assert_eq!(state.player.pos.x, 88.0);
        assert!(state.player.pos.y > 110.0);
        assert!(!hits_any_wall(
            state.player.pos,
            PLAYER_SIZE,
            &state.walls
        ));
    }

    #[test]
    fn player_is_clamped_to_arena_bounds() {
        let mut state = running_state();
        state.player.pos = Vec2::new(12.0, 200.0);
        let input = TickInput {
            left: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.pos.x, PLAYER_SIZE / 2.0);
    }

    #[test]
    fn same_seed_and_inputs_are_deterministic() {
        let mut a = GameState::new(1024.0, 768.0, 99999);
        let mut b = GameState::new(1024.0, 768.0, 99999);
        a.start();
        b.start();

        let inputs = [
            TickInput {
                right: true,
                aim: Vec2::new(600.0, 400.0),
                ..Default::default()
            },
            TickInput {
                fire: true,
                aim: Vec2::new(600.0, 400.0),
                ..Default::default()
            },
            TickInput {
                dash: true,
                aim: Vec2::new(100.0, 100.0),
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..100 {
            for input in &inputs {
                tick(&mut a, input, SIM_DT);
                tick(&mut b, input, SIM_DT);
            }
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.score, b.score);
        assert_eq!(a.player.pos, b.player.pos);
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.pos, eb.pos);
            assert_eq!(ea.health, eb.health);
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Arbitrary input sequences never push the player out of bounds
            /// or into a wall.
            #[test]
            fn player_never_enters_walls(
                moves in proptest::collection::vec(
                    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()),
                    1..200,
                )
            ) {
                let mut state = running_state();
                for (up, down, left, right, dash) in moves {
                    let input = TickInput {
                        up,
                        down,
                        left,
                        right,
                        dash,
                        aim: Vec2::new(100.0, 100.0),
                        ..Default::default()
                    };
                    tick(&mut state, &input, SIM_DT);

                    let p = state.player.pos;
                    let half = PLAYER_SIZE / 2.0;
                    prop_assert!(p.x >= half && p.x <= state.arena.x - half);
                    prop_assert!(p.y >= half && p.y <= state.arena.y - half);
                    prop_assert!(!hits_any_wall(p, PLAYER_SIZE, &state.walls));
                }
            }
        }
    }
}
