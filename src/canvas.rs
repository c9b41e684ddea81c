// Copyright (c) 2026 rezky_nightky

use crate::error::{try_filled, Result};
use crate::surface::{Arc, Pen, Point, Rect, Segment, Surface, FULL_CIRCLE};

/// In-memory raster of pens. Serves as the window contents, the host back
/// buffer and the ball-drop background cache.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Pen>,
}

impl Canvas {
    pub fn try_new(width: u32, height: u32) -> Result<Self> {
        let len = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            pixels: try_filled("canvas pixels", len, Pen::Background)?,
        })
    }

    pub fn pen_at(&self, x: i32, y: i32) -> Option<Pen> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn set(&mut self, x: i32, y: i32, pen: Pen) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = pen;
        }
    }

    fn hline(&mut self, x1: i32, x2: i32, y: i32, pen: Pen) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let lo = x1.min(x2).max(0);
        let hi = x1.max(x2).min(self.width as i32 - 1);
        for x in lo..=hi {
            self.set(x, y, pen);
        }
    }

    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, pen: Pen) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.set(x, y, pen);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn arc(&mut self, arc: &Arc, pen: Pen, filled: bool) {
        if arc.width == 0 || arc.height == 0 {
            self.line(
                arc.x,
                arc.y,
                arc.x + arc.width as i32,
                arc.y + arc.height as i32,
                pen,
            );
            return;
        }

        let shape = ArcShape::new(arc);
        for py in arc.y..arc.y + arc.height as i32 {
            for px in arc.x..arc.x + arc.width as i32 {
                if !shape.covers(px, py) {
                    continue;
                }
                let edge = !shape.covers(px - 1, py)
                    || !shape.covers(px + 1, py)
                    || !shape.covers(px, py - 1)
                    || !shape.covers(px, py + 1);
                if filled || edge {
                    self.set(px, py, pen);
                }
            }
        }
    }
}

struct ArcShape {
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    start: i32,
    sweep: i32,
}

impl ArcShape {
    fn new(arc: &Arc) -> Self {
        Self {
            cx: arc.x as f64 + arc.width as f64 / 2.0,
            cy: arc.y as f64 + arc.height as f64 / 2.0,
            rx: arc.width as f64 / 2.0,
            ry: arc.height as f64 / 2.0,
            start: arc.angle1.rem_euclid(FULL_CIRCLE),
            sweep: arc.angle2,
        }
    }

    fn covers(&self, px: i32, py: i32) -> bool {
        let nx = (px as f64 + 0.5 - self.cx) / self.rx;
        let ny = (py as f64 + 0.5 - self.cy) / self.ry;
        if nx * nx + ny * ny > 1.0 {
            return false;
        }
        if self.sweep.abs() >= FULL_CIRCLE {
            return true;
        }

        let deg = (-ny).atan2(nx).to_degrees();
        let angle = ((deg * 64.0).round() as i32).rem_euclid(FULL_CIRCLE);
        if self.sweep >= 0 {
            (angle - self.start).rem_euclid(FULL_CIRCLE) <= self.sweep
        } else {
            (self.start - angle).rem_euclid(FULL_CIRCLE) <= -self.sweep
        }
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rectangle(&mut self, rect: Rect, pen: Pen) {
        let y_end = rect.y.saturating_add(rect.height as i32);
        let x_end = rect.x.saturating_add(rect.width as i32);
        if rect.width == 0 {
            return;
        }
        for y in rect.y.max(0)..y_end.min(self.height as i32) {
            self.hline(rect.x, x_end - 1, y, pen);
        }
    }

    fn draw_arcs(&mut self, arcs: &[Arc], pen: Pen) {
        for a in arcs {
            self.arc(a, pen, false);
        }
    }

    fn fill_arcs(&mut self, arcs: &[Arc], pen: Pen) {
        for a in arcs {
            self.arc(a, pen, true);
        }
    }

    fn draw_segments(&mut self, segments: &[Segment], pen: Pen) {
        for s in segments {
            self.line(s.x1, s.y1, s.x2, s.y2, pen);
        }
    }

    fn draw_lines_relative(&mut self, origin: Point, steps: &[Point], pen: Pen) {
        let mut at = origin;
        if steps.is_empty() {
            self.set(at.x, at.y, pen);
            return;
        }
        for step in steps {
            let next = Point::new(at.x + step.x, at.y + step.y);
            self.line(at.x, at.y, next.x, next.y, pen);
            at = next;
        }
    }

    fn copy_area(&mut self, src: &Canvas, rect: Rect, dest: Point) {
        for row in 0..rect.height as i32 {
            for col in 0..rect.width as i32 {
                if let Some(pen) = src.pen_at(rect.x + col, rect.y + row) {
                    self.set(dest.x + col, dest.y + row, pen);
                }
            }
        }
    }
}
