//! Collision tests for the arena
//!
//! Two primitives cover everything: circle-circle overlap for combat
//! (bullet/enemy, player/enemy) and AABB overlap for wall blocking. Movement
//! commits each axis independently so entities slide along walls instead of
//! sticking to them.

use glam::Vec2;

use super::state::Wall;

/// Circle overlap test between two size-centered entities
///
/// Entities collide when the distance between centers is less than the sum
/// of their half-sizes.
#[inline]
pub fn circles_overlap(a_pos: Vec2, a_size: f32, b_pos: Vec2, b_size: f32) -> bool {
    a_pos.distance(b_pos) < (a_size + b_size) / 2.0
}

/// Whether an entity's size-centered bounding box overlaps a wall rectangle
#[inline]
pub fn wall_blocks(pos: Vec2, size: f32, wall: &Wall) -> bool {
    let half = size / 2.0;
    pos.x + half > wall.pos.x
        && pos.x - half < wall.pos.x + wall.size.x
        && pos.y + half > wall.pos.y
        && pos.y - half < wall.pos.y + wall.size.y
}

/// Whether a candidate position is blocked by any wall
pub fn hits_any_wall(pos: Vec2, size: f32, walls: &[Wall]) -> bool {
    walls.iter().any(|wall| wall_blocks(pos, size, wall))
}

/// Axis-separated move with wall blocking
///
/// The X candidate is tested first and committed if free; the Y candidate is
/// then tested from the committed X. Blocking one axis leaves the other free,
/// which is what lets entities slide along a wall.
pub fn slide_move(pos: Vec2, delta: Vec2, size: f32, walls: &[Wall]) -> Vec2 {
    let mut out = pos;
    if !hits_any_wall(Vec2::new(pos.x + delta.x, pos.y), size, walls) {
        out.x = pos.x + delta.x;
    }
    if !hits_any_wall(Vec2::new(out.x, pos.y + delta.y), size, walls) {
        out.y = pos.y + delta.y;
    }
    out
}

/// Clamp a size-centered entity inside the arena bounds
pub fn clamp_to_arena(pos: Vec2, size: f32, arena: Vec2) -> Vec2 {
    let half = size / 2.0;
    Vec2::new(
        pos.x.clamp(half, arena.x - half),
        pos.y.clamp(half, arena.y - half),
    )
}
