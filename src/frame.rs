// Copyright (c) 2026 rezky_nightky

use crate::canvas::Canvas;
use crate::cell::Cell;
use crate::palette::Palette;
use crate::surface::Pen;

/// Terminal-sized grid of cells with change tracking, so only cells that
/// differ from the previous frame are written out.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

/// Most frequent non-background pen in the `size` x `size` block at
/// `(x, y)`, so thin lines survive the downscale.
fn block_pen(canvas: &Canvas, x: i32, y: i32, size: i32) -> Pen {
    let mut counts = [0u32; Pen::COUNT];
    for py in y..y + size {
        for px in x..x + size {
            if let Some(pen) = canvas.pen_at(px, py) {
                counts[pen.index()] += 1;
            }
        }
    }

    let mut best = Pen::Background;
    let mut best_n = 0;
    for (i, &n) in counts.iter().enumerate().skip(1) {
        if n > best_n {
            best_n = n;
            best = Pen::from_index(i);
        }
    }
    best
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::blank(); len],
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
        } else {
            for &i in &self.dirty {
                self.dirty_map[i] = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells[i]
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    /// Samples `canvas` into the grid. Every cell covers a `scale` wide,
    /// `2 * scale` tall area, split into an upper and a lower block.
    pub fn rasterize(&mut self, canvas: &Canvas, palette: &Palette, scale: u32) {
        let s = scale.max(1) as i32;
        for cy in 0..self.height {
            for cx in 0..self.width {
                let x = cx as i32 * s;
                let y = cy as i32 * 2 * s;
                let top = block_pen(canvas, x, y, s);
                let bottom = block_pen(canvas, x, y + s, s);
                self.set(
                    cx,
                    cy,
                    Cell::pixels(palette.color(top), palette.color(bottom)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ColorMode;
    use crate::surface::{BallColor, Rect, Segment, Surface};

    #[test]
    fn set_tracks_only_changed_cells() {
        let mut f = Frame::new(3, 2);
        f.clear_dirty();
        let c = Cell::pixels(None, Some(crossterm::style::Color::Red));
        f.set(1, 1, c);
        f.set(1, 1, c);
        assert_eq!(f.dirty_indices(), &[4]);
        f.clear_dirty();
        f.set(1, 1, c);
        assert!(f.dirty_indices().is_empty());
        assert_eq!(f.get(1, 1), Some(&c));
    }

    #[test]
    fn rasterize_keeps_thin_lines_visible() {
        let palette = Palette::new(ColorMode::TrueColor);
        let mut canvas = Canvas::try_new(8, 8).unwrap();
        canvas.draw_segments(&[Segment::vertical(1, 0, 1)], Pen::Foreground);
        canvas.fill_rectangle(Rect::new(4, 4, 4, 4), Pen::Ball(BallColor::Red));

        let mut f = Frame::new(2, 1);
        f.rasterize(&canvas, &palette, 4);

        let left = f.get(0, 0).unwrap();
        assert_eq!(left.fg, palette.color(Pen::Foreground));
        assert_eq!(left.bg, palette.color(Pen::Background));

        let right = f.get(1, 0).unwrap();
        assert_eq!(right.fg, palette.color(Pen::Background));
        assert_eq!(right.bg, palette.ball(BallColor::Red));
    }
}
