//! Collision detection and resolution
//!
//! The player is a circle; pickups are circles and obstacles are axis-aligned
//! rectangles. Resolution runs once per tick after motion, in a fixed order:
//! magnet pull, collectibles, power-ups, obstacles. Obstacles go last so a
//! death sees every pickup made this tick, including a shield.

use glam::Vec2;

use super::state::{Collectible, GameEvent, GameState, POWERUP_COLOR, RunPhase, SoundCue};
use crate::consts::*;
use crate::{Rect, Rgb};

/// Strict circle-circle overlap
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(b) < a_radius + b_radius
}

/// Circle vs axis-aligned rectangle via the closest point on the rectangle
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = rect.closest_point(center);
    center.distance_squared(closest) < radius * radius
}

/// Pull uncollected collectibles within range toward `target` at
/// `MAGNET_PULL_SPEED`.
///
/// The step is capped at the remaining distance, so an item closer than one
/// step lands on the target instead of passing through it.
pub fn magnet_pull(target: Vec2, collectibles: &mut [Collectible], dt: f32) {
    for c in collectibles.iter_mut().filter(|c| !c.collected) {
        let offset = target - c.pos;
        let dist = offset.length();
        if dist < MAGNET_RANGE && dist > 0.0 {
            let step = (MAGNET_PULL_SPEED * dt).min(dist);
            c.pos += offset / dist * step;
        }
    }
}

/// Run every resolution pass for one tick
pub fn resolve(state: &mut GameState, dt: f32) {
    if state.player.magnet_active() {
        let target = state.player.pos;
        magnet_pull(target, state.stage.collectibles_mut(), dt);
    }
    resolve_collectibles(state);
    resolve_powerups(state);
    if state.mode.has_fatal_obstacles() {
        resolve_obstacles(state);
    }
}

/// Award points for every collectible the player touches
pub fn resolve_collectibles(state: &mut GameState) {
    let (pos, radius) = (state.player.pos, state.player.radius);
    for c in state.stage.collectibles_mut().iter_mut() {
        if c.collected || !circles_overlap(pos, radius, c.pos, c.radius) {
            continue;
        }
        c.collected = true;
        state.score += COLLECT_POINTS;
        state.events.push(GameEvent::ScoreChanged(state.score));
        state.particles.spawn(c.pos, c.color, BURST_COLLECT);
        state.shake = SHAKE_COLLECT;
        state.events.push(GameEvent::Sound(SoundCue::Collect));
    }
}

/// Activate every power-up the player touches
pub fn resolve_powerups(state: &mut GameState) {
    let (pos, radius) = (state.player.pos, state.player.radius);
    let mut picked = Vec::new();
    for p in state.stage.powerups_mut().iter_mut() {
        if p.collected || !circles_overlap(pos, radius, p.pos, p.radius) {
            continue;
        }
        p.collected = true;
        picked.push((p.kind, p.pos));
    }

    for (kind, at) in picked {
        state.player.apply_power_up(kind);
        state.particles.spawn(at, POWERUP_COLOR, BURST_POWERUP);
        state.events.push(GameEvent::Sound(SoundCue::PowerUp));
        log::debug!("Picked up {:?}", kind);
    }
}

/// Check obstacles; a shield absorbs one hit, otherwise the run ends
pub fn resolve_obstacles(state: &mut GameState) {
    let mut i = 0;
    while i < state.stage.obstacles().len() {
        let rect = state.stage.obstacles()[i].rect;
        if !circle_rect_overlap(state.player.pos, state.player.radius, &rect) {
            i += 1;
            continue;
        }

        if state.player.shield_active() {
            state.player.shield.consume();
            state
                .particles
                .spawn(state.player.pos, Rgb::CYAN, BURST_SHIELD);
            state.shake = SHAKE_SHIELD_BREAK;
            state.events.push(GameEvent::Sound(SoundCue::Explosion));
            if state.stage.remove_obstacle(i).is_none() {
                i += 1;
            }
            log::info!("Shield absorbed a hit");
        } else {
            state.shake = SHAKE_DEATH;
            state.events.push(GameEvent::Sound(SoundCue::Explosion));
            state.phase = RunPhase::GameOver;
            state
                .particles
                .spawn(state.player.pos, Rgb::RED, BURST_DEATH);
            state.events.push(GameEvent::Died { score: state.score });
            log::info!("Run over with score {}", state.score);
            return;
        }
    }
}
