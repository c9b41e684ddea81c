// Copyright (c) 2026 rezky_nightky

//! Lightning: a random walk from the top center to the bottom of the screen.
//! Where each bolt lands the ground burns one pixel deeper, so the burn
//! profile slowly grows into a bell curve.

use log::debug;
use rand::{
    distr::{Distribution, Uniform},
    Rng,
};

use crate::error::{try_filled, try_vec, Result};
use crate::surface::{BallColor, Pen, Point, Segment, Surface};

/// Horizontal and vertical size of one bolt step.
pub const SEGMENT: i32 = 2;

pub const BOLT_PEN: Pen = Pen::Ball(BallColor::Yellow);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Strike,
    Erase,
}

pub struct Lightning {
    width: i32,
    height: i32,
    phase: Phase,
    strikes: u64,
    /// Bolt steps, each relative to the previous point.
    path: Vec<Point>,
    /// Burn height per column; starts at the bottom edge and only decreases.
    decay: Vec<i32>,
    trail: Vec<Segment>,
    last_column: i32,
    coin: Uniform<u8>,
}

impl Lightning {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let width = width.max(1) as i32;
        let height = height.max(1) as i32;
        let steps = (height / SEGMENT) as usize;

        Ok(Self {
            width,
            height,
            phase: Phase::Strike,
            strikes: 0,
            path: try_filled("lightning path", steps, Point::new(0, SEGMENT))?,
            decay: try_filled("burn trail", width as usize, height)?,
            trail: try_vec("burn trail segments", width as usize)?,
            last_column: width / 2,
            coin: Uniform::new_inclusive(0, 1).expect("valid range"),
        })
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn strikes(&self) -> u64 {
        self.strikes
    }

    pub fn origin(&self) -> Point {
        Point::new(self.width / 2, 0)
    }

    #[cfg(test)]
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    #[cfg(test)]
    pub fn decay(&self) -> &[i32] {
        &self.decay
    }

    /// Column the last bolt ended in; may lie off screen.
    #[cfg(test)]
    pub fn last_column(&self) -> i32 {
        self.last_column
    }

    fn reset_limit(&self) -> u64 {
        (self.width as u64 * self.height as u64) / 4
    }

    /// Runs the pending phase and returns it.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Phase {
        let ran = self.phase;
        match ran {
            Phase::Strike => {
                self.strike(rng);
                self.phase = Phase::Erase;
            }
            Phase::Erase => {
                self.phase = Phase::Strike;
            }
        }
        ran
    }

    fn strike<R: Rng>(&mut self, rng: &mut R) {
        if self.strikes == 0 || self.strikes > self.reset_limit() {
            self.decay.fill(self.height);
            if self.strikes > 0 {
                debug!("lightning reset after {} strikes", self.strikes);
            }
            self.strikes = 0;
        }

        let mut x = self.origin().x;
        for step in &mut self.path {
            let dx = if self.coin.sample(rng) == 0 {
                -SEGMENT
            } else {
                SEGMENT
            };
            *step = Point::new(dx, SEGMENT);
            x += dx;
        }
        self.strikes += 1;
        self.last_column = x;

        if (0..self.width).contains(&x) {
            let d = &mut self.decay[x as usize];
            *d = (*d - 1).max(0);
        }
    }

    /// Draws what `phase` produced: the bolt, or the cleared screen with
    /// the burn profile.
    pub fn render(&mut self, surface: &mut dyn Surface, phase: Phase) {
        match phase {
            Phase::Strike => {
                surface.draw_lines_relative(self.origin(), &self.path, BOLT_PEN);
            }
            Phase::Erase => {
                surface.clear();
                self.trail.clear();
                let h = self.height;
                self.trail.extend(
                    self.decay
                        .iter()
                        .enumerate()
                        .map(|(x, &top)| Segment::vertical(x as i32, h, top)),
                );
                surface.draw_segments(&self.trail, Pen::Foreground);
            }
        }
    }
}
