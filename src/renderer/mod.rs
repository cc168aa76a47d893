//! Rendering module
//!
//! Drawing goes through the [`Canvas`] trait so the frame logic stays
//! independent of the browser. The wasm build backs it with a Canvas 2D
//! context; tests use a recording canvas.

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;

#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2d;

use glam::Vec2;

use crate::Rgb;
use crate::consts::{MAGNET_RANGE, MAZE_CELL};
use crate::sim::{GameMode, GameState, Maze, POWERUP_COLOR, Stage, WALL_COLOR, World};

/// 2D drawing primitives the game needs
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    /// Glow around subsequent shapes (0 disables)
    fn set_glow(&mut self, blur: f32, color: Rgb);
    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Rgb, alpha: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32, width: f32);
    fn line(&mut self, from: Vec2, to: Vec2, color: Rgb, alpha: f32, width: f32);
    /// Centered text
    fn text(&mut self, label: &str, at: Vec2, color: Rgb);
}

/// Draw a full frame. `shake` is the render offset for camera shake.
pub fn draw_frame<C: Canvas + ?Sized>(canvas: &mut C, state: &GameState, shake: Vec2) {
    canvas.save();
    if shake != Vec2::ZERO {
        canvas.translate(shake);
    }

    // Translucent clear leaves motion trails
    let (background, alpha) = match state.mode {
        GameMode::Zen => (Rgb::BLACK, 0.4),
        GameMode::Normal | GameMode::Hardcore => (state.stage.biome().background, 0.3),
    };
    canvas.fill_rect(
        Vec2::ZERO,
        Vec2::new(state.viewport.width, state.viewport.height),
        background,
        alpha,
    );

    match &state.stage {
        Stage::World(world) => draw_world(canvas, world),
        Stage::Maze(maze) => draw_maze(canvas, maze, state.elapsed),
    }
    draw_particles(canvas, state);
    draw_player(canvas, state);

    canvas.restore();
}

fn draw_world<C: Canvas + ?Sized>(canvas: &mut C, world: &World) {
    for obs in &world.obstacles {
        canvas.set_glow(10.0, obs.color);
        canvas.fill_rect(obs.rect.min(), obs.rect.size, obs.color, 1.0);
    }

    for col in world.collectibles.iter().filter(|c| !c.collected) {
        canvas.set_glow(10.0, col.color);
        canvas.fill_circle(col.pos, col.radius, col.color, 1.0);
    }

    for p in world.powerups.iter().filter(|p| !p.collected) {
        canvas.set_glow(10.0, POWERUP_COLOR);
        canvas.fill_circle(p.pos, p.radius, POWERUP_COLOR, 1.0);
        canvas.set_glow(0.0, Rgb::BLACK);
        canvas.text(p.kind.glyph(), p.pos, Rgb::BLACK);
    }
    canvas.set_glow(0.0, Rgb::BLACK);
}

fn draw_maze<C: Canvas + ?Sized>(canvas: &mut C, maze: &Maze, time: f32) {
    let height = maze.viewport.height;

    // Subtle grid
    canvas.set_glow(0.0, Rgb::BLACK);
    let mut x = 0.0;
    while x < maze.viewport.width {
        canvas.line(Vec2::new(x, 0.0), Vec2::new(x, height), WALL_COLOR, 0.03, 1.0);
        x += MAZE_CELL;
    }

    canvas.set_glow(12.0, WALL_COLOR);
    for wall in &maze.walls {
        let min = wall.rect.min();
        if min.y <= -wall.rect.size.y || min.y >= height + wall.rect.size.y {
            continue;
        }
        canvas.fill_rect(min, wall.rect.size, wall.color, 1.0);
        canvas.fill_rect(min + 5.0, wall.rect.size - 10.0, WALL_COLOR, 0.3);
    }

    canvas.set_glow(10.0, Rgb::WHITE);
    for pair in maze.trail.iter().collect::<Vec<_>>().windows(2) {
        let (prev, point) = (pair[0], pair[1]);
        canvas.line(prev.pos, point.pos, Rgb::WHITE, point.alpha * 0.5, 3.0);
    }

    let on_screen = |y: f32| y > -50.0 && y < height + 50.0;
    let pulse = (time * 5.0).sin();
    for col in maze.collectibles.iter().filter(|c| !c.collected) {
        if on_screen(col.pos.y) {
            canvas.set_glow(15.0, col.color);
            canvas.fill_circle(col.pos, col.radius + pulse * 2.0, col.color, 1.0);
        }
    }

    let pulse = (time * 6.7).sin();
    for p in maze.powerups.iter().filter(|p| !p.collected) {
        if on_screen(p.pos.y) {
            canvas.set_glow(20.0, POWERUP_COLOR);
            canvas.fill_circle(p.pos, p.radius + pulse * 3.0, POWERUP_COLOR, 1.0);
            canvas.set_glow(0.0, Rgb::BLACK);
            canvas.text(p.kind.glyph(), p.pos, Rgb::BLACK);
        }
    }
    canvas.set_glow(0.0, Rgb::BLACK);
}

fn draw_particles<C: Canvas + ?Sized>(canvas: &mut C, state: &GameState) {
    for p in &state.particles.particles {
        canvas.fill_circle(p.pos, 3.0, p.color, p.life);
    }
}

fn draw_player<C: Canvas + ?Sized>(canvas: &mut C, state: &GameState) {
    let player = &state.player;
    let len = player.trail.len() as f32;
    for (i, t) in player.trail.iter().enumerate() {
        if t.alpha <= 0.0 {
            continue;
        }
        canvas.fill_circle(t.pos, player.radius * (i as f32 / len), Rgb::CYAN, t.alpha * 0.5);
    }

    if player.shield_active() {
        let flicker = (state.elapsed * 10.0).sin().abs();
        canvas.stroke_circle(player.pos, player.radius + 10.0, Rgb::WHITE, flicker, 3.0);
    }
    if player.magnet_active() {
        canvas.stroke_circle(player.pos, MAGNET_RANGE, Rgb::YELLOW, 0.1, 1.0);
    }

    canvas.set_glow(20.0, Rgb::CYAN);
    canvas.fill_circle(player.pos, player.radius, Rgb::CYAN, 1.0);
    canvas.set_glow(0.0, Rgb::BLACK);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Collectible, PowerUp, PowerUpKind, Viewport};

    /// Records draw calls for inspection
    #[derive(Default)]
    struct Recorder {
        circles: Vec<(Vec2, f32)>,
        rects: usize,
        translations: Vec<Vec2>,
        glyphs: Vec<String>,
        depth: i32,
    }

    impl Canvas for Recorder {
        fn save(&mut self) {
            self.depth += 1;
        }
        fn restore(&mut self) {
            self.depth -= 1;
        }
        fn translate(&mut self, offset: Vec2) {
            self.translations.push(offset);
        }
        fn set_glow(&mut self, _blur: f32, _color: Rgb) {}
        fn fill_rect(&mut self, _min: Vec2, _size: Vec2, _color: Rgb, _alpha: f32) {
            self.rects += 1;
        }
        fn fill_circle(&mut self, center: Vec2, radius: f32, _color: Rgb, _alpha: f32) {
            self.circles.push((center, radius));
        }
        fn stroke_circle(&mut self, _c: Vec2, _r: f32, _color: Rgb, _a: f32, _w: f32) {}
        fn line(&mut self, _from: Vec2, _to: Vec2, _color: Rgb, _alpha: f32, _width: f32) {}
        fn text(&mut self, label: &str, _at: Vec2, _color: Rgb) {
            self.glyphs.push(label.to_string());
        }
    }

    #[test]
    fn test_collected_pickups_are_not_drawn() {
        let mut state = GameState::new(GameMode::Normal, Viewport::new(400.0, 800.0), 1);
        if let Stage::World(world) = &mut state.stage {
            let mut gone = Collectible::new(Vec2::new(50.0, 50.0), 10.0, Rgb::WHITE);
            gone.collected = true;
            world.collectibles.push(gone);
            world
                .collectibles
                .push(Collectible::new(Vec2::new(70.0, 70.0), 10.0, Rgb::WHITE));
        }

        let mut canvas = Recorder::default();
        draw_frame(&mut canvas, &state, Vec2::ZERO);

        assert!(canvas.circles.contains(&(Vec2::new(70.0, 70.0), 10.0)));
        assert!(!canvas.circles.contains(&(Vec2::new(50.0, 50.0), 10.0)));
        assert_eq!(canvas.depth, 0);
        assert!(canvas.translations.is_empty());
    }

    #[test]
    fn test_power_ups_carry_glyphs() {
        let mut state = GameState::new(GameMode::Normal, Viewport::new(400.0, 800.0), 1);
        if let Stage::World(world) = &mut state.stage {
            world.powerups.push(PowerUp::new(
                Vec2::new(200.0, 200.0),
                15.0,
                PowerUpKind::Magnet,
            ));
        }
        let mut canvas = Recorder::default();
        draw_frame(&mut canvas, &state, Vec2::ZERO);
        assert_eq!(canvas.glyphs, vec!["M".to_string()]);
    }

    #[test]
    fn test_shake_offset_translates_frame() {
        let state = GameState::new(GameMode::Zen, Viewport::new(400.0, 800.0), 1);
        let mut canvas = Recorder::default();
        draw_frame(&mut canvas, &state, Vec2::new(1.5, -2.0));
        assert_eq!(canvas.translations, vec![Vec2::new(1.5, -2.0)]);
        // Background plus two rects per visible wall
        assert!(canvas.rects > 1);
    }
}
