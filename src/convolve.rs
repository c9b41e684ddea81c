// Copyright (c) 2026 rezky_nightky

//! Repeated convolution of a two-point density with itself. Each generation
//! is a two-step unbiased random walk, so the bars flatten into a Gaussian.

use log::debug;

use crate::error::{try_filled, try_vec, Result};
use crate::surface::{Pen, Segment, Surface};

pub const KERNEL: [f64; 3] = [0.5, 0.0, 0.5];
pub const SEED: [f64; 7] = [0.0, 0.0, 0.5, 0.0, 0.5, 0.0, 0.0];

/// Densities at or below this are not drawn.
pub const NEGLIGIBLE: f64 = 1e-5;

/// Writes `current` convolved with [`KERNEL`] into `next`, two elements
/// longer. Reads past either end of `current` count as zero, and both ends
/// of `next` stay zero.
pub fn convolve_into(current: &[f64], next: &mut [f64]) {
    debug_assert_eq!(next.len(), current.len() + 2);
    let at = |i: isize| -> f64 {
        if i < 0 {
            return 0.0;
        }
        current.get(i as usize).copied().unwrap_or(0.0)
    };

    let n = next.len();
    if n == 0 {
        return;
    }
    next[0] = 0.0;
    next[n - 1] = 0.0;
    for i in 1..n - 1 {
        let i = i as isize;
        next[i as usize] = at(i - 2) * KERNEL[2] + at(i - 1) * KERNEL[1] + at(i) * KERNEL[0];
    }
}

pub struct Convolver {
    width: i32,
    height: i32,
    current: Vec<f64>,
    next: Vec<f64>,
    bars: Vec<Segment>,
    generation: u64,
}

impl Convolver {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let width = width.max(1) as i32;
        Ok(Self {
            width,
            height: height.max(1) as i32,
            current: Vec::new(),
            next: Vec::new(),
            bars: try_vec("density bars", width as usize + 1)?,
            generation: 0,
        })
    }

    #[cfg(test)]
    pub fn current(&self) -> &[f64] {
        &self.current
    }

    #[cfg(test)]
    pub fn next(&self) -> &[f64] {
        &self.next
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Computes the next generation, reseeding first when the density is
    /// missing or as wide as the screen.
    pub fn step(&mut self) -> Result<()> {
        if self.current.is_empty() || self.current.len() >= self.width as usize {
            if !self.current.is_empty() {
                debug!(
                    "density reached {} columns after {} generations, reseeding",
                    self.current.len(),
                    self.generation
                );
            }
            let mut seed = try_vec("density", SEED.len())?;
            seed.extend_from_slice(&SEED);
            self.current = seed;
            self.generation = 0;
        }

        if self.next.is_empty() {
            self.next = try_filled("density", self.current.len() + 2, 0.0)?;
        }
        convolve_into(&self.current, &mut self.next);
        Ok(())
    }

    pub fn render(&mut self, surface: &mut dyn Surface) {
        let x0 = self.width / 2;
        let h = self.height as f64;
        let mid = (self.next.len() / 2) as i32;

        self.bars.clear();
        let n = self.next.len();
        for (i, &v) in self.next.iter().enumerate().take(n.saturating_sub(1)).skip(1) {
            if v <= NEGLIGIBLE {
                continue;
            }
            let x = x0 + (i as i32 - mid);
            let top = (h * (1.0 - v / 0.5)) as i32;
            self.bars.push(Segment::vertical(x, self.height, top));
        }

        surface.clear();
        surface.draw_segments(&self.bars, Pen::Foreground);
    }

    /// Drops the old density and makes the new one current.
    pub fn promote(&mut self) {
        self.current = std::mem::take(&mut self.next);
        self.generation += 1;
    }
}
