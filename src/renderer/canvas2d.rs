//! Canvas 2D backend

use std::f64::consts::TAU;

use glam::Vec2;
use web_sys::CanvasRenderingContext2d;

use super::Canvas;
use crate::Rgb;

/// [`Canvas`] over a browser 2D context
pub struct Canvas2d {
    ctx: CanvasRenderingContext2d,
}

impl Canvas2d {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_font("bold 12px Arial");
        Self { ctx }
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    fn circle_path(&self, center: Vec2, radius: f32) {
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
            .ok();
    }
}

impl Canvas for Canvas2d {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, offset: Vec2) {
        self.ctx.translate(offset.x as f64, offset.y as f64).ok();
    }

    fn set_glow(&mut self, blur: f32, color: Rgb) {
        self.ctx.set_shadow_blur(blur as f64);
        self.ctx.set_shadow_color(&color.css(1.0));
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Rgb, alpha: f32) {
        self.ctx.set_fill_style_str(&color.css(alpha));
        self.ctx
            .fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        self.circle_path(center, radius);
        self.ctx.set_fill_style_str(&color.css(alpha));
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32, width: f32) {
        self.circle_path(center, radius);
        self.ctx.set_stroke_style_str(&color.css(alpha));
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Rgb, alpha: f32, width: f32) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.set_stroke_style_str(&color.css(alpha));
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn text(&mut self, label: &str, at: Vec2, color: Rgb) {
        self.ctx.set_fill_style_str(&color.css(1.0));
        self.ctx.fill_text(label, at.x as f64, at.y as f64).ok();
    }
}
