//! Canvas2D rendering
//!
//! Pure presentation: reads the current `GameState` once per frame and issues
//! draw calls, never mutating or blocking the sim.

use glam::Vec2;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::consts::*;
use crate::sim::{Bullet, Enemy, GameState, Player, Wall};

/// Renderer over a 2D canvas context
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    /// Draw one frame of the current world state
    ///
    /// `crosshair` is the pointer position, or None when the crosshair is
    /// disabled in settings.
    pub fn draw(&self, state: &GameState, crosshair: Option<Vec2>) -> Result<(), JsValue> {
        self.clear(state.arena);
        self.draw_walls(&state.walls);
        for bullet in &state.player.bullets {
            self.draw_bullet(bullet)?;
        }
        for enemy in &state.enemies {
            self.draw_enemy(enemy)?;
        }
        self.draw_player(&state.player)?;
        if let Some(pointer) = crosshair {
            self.draw_crosshair(pointer);
        }
        self.draw_ammo_hud(&state.player, state.arena)?;
        Ok(())
    }

    fn clear(&self, arena: Vec2) {
        self.ctx.set_fill_style_str("#1a1a1a");
        self.ctx
            .fill_rect(0.0, 0.0, arena.x as f64, arena.y as f64);
    }

    fn draw_walls(&self, walls: &[Wall]) {
        self.ctx.set_fill_style_str("#333");
        for wall in walls {
            self.ctx.fill_rect(
                wall.pos.x as f64,
                wall.pos.y as f64,
                wall.size.x as f64,
                wall.size.y as f64,
            );
        }
    }

    fn draw_bullet(&self, bullet: &Bullet) -> Result<(), JsValue> {
        let tau = std::f64::consts::TAU;

        // Fading trail, oldest first and fully transparent
        for (i, p) in bullet.trail.iter().enumerate() {
            let alpha = i as f32 / bullet.trail.len() as f32;
            self.ctx.begin_path();
            self.ctx.arc(
                p.x as f64,
                p.y as f64,
                (BULLET_SIZE * 0.5) as f64,
                0.0,
                tau,
            )?;
            self.ctx
                .set_fill_style_str(&format!("rgba(255, 255, 0, {alpha})"));
            self.ctx.fill();
        }

        // Bullet body
        self.ctx.begin_path();
        self.ctx.arc(
            bullet.pos.x as f64,
            bullet.pos.y as f64,
            BULLET_SIZE as f64,
            0.0,
            tau,
        )?;
        self.ctx.set_fill_style_str("#ff0");
        self.ctx.fill();

        // Glow
        self.ctx.begin_path();
        self.ctx.arc(
            bullet.pos.x as f64,
            bullet.pos.y as f64,
            (BULLET_SIZE * 1.5) as f64,
            0.0,
            tau,
        )?;
        self.ctx.set_fill_style_str("rgba(255, 255, 0, 0.2)");
        self.ctx.fill();
        Ok(())
    }

    fn draw_enemy(&self, enemy: &Enemy) -> Result<(), JsValue> {
        self.draw_unit(enemy.pos, enemy.angle, ENEMY_SIZE, "#f00", "#a00")?;

        // Health bar above the body
        let bar_w = ENEMY_SIZE as f64;
        let bar_h = 4.0;
        let x = enemy.pos.x as f64 - bar_w / 2.0;
        let y = (enemy.pos.y - ENEMY_SIZE / 2.0 - 10.0) as f64;
        let fraction = (enemy.health.max(0) as f64) / ENEMY_START_HEALTH as f64;

        self.ctx.set_fill_style_str("#000");
        self.ctx.fill_rect(x, y, bar_w, bar_h);
        self.ctx.set_fill_style_str("#0f0");
        self.ctx.fill_rect(x, y, bar_w * fraction, bar_h);
        Ok(())
    }

    fn draw_player(&self, player: &Player) -> Result<(), JsValue> {
        self.draw_unit(player.pos, player.angle, PLAYER_SIZE, "#0f0", "#0a0")
    }

    /// Circular body with a triangular facing indicator, rotated to `angle`
    fn draw_unit(
        &self,
        pos: Vec2,
        angle: f32,
        size: f32,
        body: &str,
        indicator: &str,
    ) -> Result<(), JsValue> {
        let size = size as f64;
        self.ctx.save();
        self.ctx.translate(pos.x as f64, pos.y as f64)?;
        self.ctx.rotate(angle as f64)?;

        self.ctx.set_fill_style_str(body);
        self.ctx.begin_path();
        self.ctx
            .arc(0.0, 0.0, size / 2.0, 0.0, std::f64::consts::TAU)?;
        self.ctx.fill();

        self.ctx.set_fill_style_str(indicator);
        self.ctx.begin_path();
        self.ctx.move_to(0.0, 0.0);
        self.ctx.line_to(size / 2.0, 0.0);
        self.ctx.line_to(size / 3.0, -size / 4.0);
        self.ctx.line_to(size / 3.0, size / 4.0);
        self.ctx.close_path();
        self.ctx.fill();

        self.ctx.restore();
        Ok(())
    }

    fn draw_crosshair(&self, pointer: Vec2) {
        let (x, y) = (pointer.x as f64, pointer.y as f64);
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str("#fff");
        self.ctx.set_line_width(2.0);
        self.ctx.move_to(x - 10.0, y);
        self.ctx.line_to(x + 10.0, y);
        self.ctx.move_to(x, y - 10.0);
        self.ctx.line_to(x, y + 10.0);
        self.ctx.stroke();
    }

    /// Ammo counter and reload progress arc in the bottom-right corner
    fn draw_ammo_hud(&self, player: &Player, arena: Vec2) -> Result<(), JsValue> {
        self.ctx.set_fill_style_str("#fff");
        self.ctx.set_font("20px Arial");
        self.ctx.set_text_align("right");
        self.ctx.fill_text(
            &format!("{}/{}", player.ammo, PLAYER_MAX_AMMO),
            (arena.x - 20.0) as f64,
            (arena.y - 20.0) as f64,
        )?;

        if player.is_reloading() {
            let x = (arena.x - 20.0) as f64;
            let y = (arena.y - 45.0) as f64;
            let start = -std::f64::consts::FRAC_PI_2;
            let end = start + player.reload_progress() as f64 * std::f64::consts::TAU;
            self.ctx.begin_path();
            self.ctx.arc(x, y, 8.0, start, end)?;
            self.ctx.set_stroke_style_str("#fff");
            self.ctx.set_line_width(2.0);
            self.ctx.stroke();
        }
        Ok(())
    }
}
