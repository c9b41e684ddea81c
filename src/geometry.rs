// Copyright (c) 2026 rezky_nightky

//! Board layout derived from the surface size.

use crate::error::{try_vec, Result};
use crate::surface::{Arc, Segment};

/// Sizes the ball-drop board is built from. Both diameters must be even.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardConstants {
    pub ball_diameter: i32,
    pub pin_diameter: i32,
    pub bin_margin: i32,
}

impl Default for BoardConstants {
    fn default() -> Self {
        Self {
            ball_diameter: 10,
            pin_diameter: 4,
            bin_margin: 1,
        }
    }
}

impl BoardConstants {
    /// Height one settled ball adds to a bin stack.
    pub fn stack_unit(&self) -> i32 {
        self.ball_diameter + 2 * self.bin_margin
    }

    /// Distance a ball travels between two decisions at a pin row.
    pub fn roll_step(&self) -> i32 {
        self.ball_diameter / 2 + self.bin_margin + self.pin_diameter / 2
    }

    fn spacing(&self) -> i32 {
        self.ball_diameter + self.pin_diameter + 2 * self.bin_margin
    }
}

#[derive(Clone, Debug)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    pub dx: i32,
    pub dy: i32,
    pub bin_count: usize,
    pub pin_row_count: usize,
    pub pin_count: usize,
    pub x0: i32,
    /// Cap on live balls, per color and in total.
    pub live_cap: usize,
}

impl Layout {
    pub fn plan(width: u32, height: u32, k: &BoardConstants) -> Self {
        let width = width.max(1) as i32;
        let height = height.max(1) as i32;
        let dx = k.spacing();
        let dy = dx;

        let bin_count = (width / dx) as usize + 1;
        let mut pin_row_count = ((height / 2) / dy) as usize;
        if pin_row_count % 2 == 0 && pin_row_count > 0 {
            pin_row_count -= 1;
        }
        let pin_count = (2 * bin_count + 1) * pin_row_count / 2;

        Self {
            width,
            height,
            dx,
            dy,
            bin_count,
            pin_row_count,
            pin_count,
            x0: (width / 2) % dx,
            live_cap: ((height / 2) / k.stack_unit()).max(0) as usize,
        }
    }

    pub fn half_height(&self) -> i32 {
        self.height / 2
    }

    /// X of every bin boundary, `bin_count + 1` of them.
    pub fn bin_boundaries(&self) -> impl Iterator<Item = i32> + '_ {
        (0..=self.bin_count as i32).map(move |i| self.x0 + i * self.dx)
    }
}

/// Static parts of the board: pins and bin dividers.
#[derive(Clone, Debug)]
pub struct Board {
    pub pins: Vec<Arc>,
    pub dividers: Vec<Segment>,
    pub top_pin_y: i32,
}

impl Board {
    pub fn build(layout: &Layout, k: &BoardConstants) -> Result<Self> {
        let mut pins = try_vec("pin lattice", layout.pin_count)?;
        let mut top_pin_y = layout.half_height();

        let mut y = layout.half_height();
        let mut row = 0usize;
        while y > k.ball_diameter / 2 && pins.len() < layout.pin_count && row < layout.pin_row_count
        {
            top_pin_y = y;
            let shift = if row % 2 == 1 { layout.dx / 2 } else { 0 };
            let mut x = layout.x0 - shift;
            while x < layout.width + layout.dx / 2 && pins.len() < layout.pin_count {
                pins.push(Arc::circle(
                    x - k.pin_diameter / 2,
                    y,
                    k.pin_diameter as u32,
                ));
                x += layout.dx;
            }
            y -= layout.dy;
            row += 1;
        }

        let mut dividers = try_vec("bin dividers", layout.bin_count + 1)?;
        dividers.extend(
            layout
                .bin_boundaries()
                .map(|x| Segment::vertical(x, layout.height, layout.half_height())),
        );

        Ok(Self {
            pins,
            dividers,
            top_pin_y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plans_vga_board() {
        let l = Layout::plan(640, 480, &BoardConstants::default());
        assert_eq!(l.dx, 16);
        assert_eq!(l.dy, 16);
        assert_eq!(l.bin_count, 41);
        assert_eq!(l.pin_row_count, 15);
        assert_eq!(l.pin_count, 83 * 15 / 2);
        assert_eq!(l.x0, 0);
        assert_eq!(l.live_cap, 20);
    }

    #[test]
    fn even_row_count_is_made_odd() {
        // (256 / 2) / 16 = 8 rows
        let l = Layout::plan(100, 256, &BoardConstants::default());
        assert_eq!(l.pin_row_count, 7);
    }

    #[test]
    fn zero_size_is_clamped() {
        let l = Layout::plan(0, 0, &BoardConstants::default());
        assert_eq!(l.width, 1);
        assert_eq!(l.height, 1);
        assert_eq!(l.bin_count, 1);
        assert_eq!(l.pin_row_count, 0);
        assert_eq!(l.live_cap, 0);

        let b = Board::build(&l, &BoardConstants::default()).unwrap();
        assert!(b.pins.is_empty());
        assert_eq!(b.dividers.len(), 2);
    }

    #[test]
    fn board_lays_out_offset_rows_and_dividers() {
        let k = BoardConstants::default();
        let l = Layout::plan(640, 480, &k);
        let b = Board::build(&l, &k).unwrap();

        assert!(b.pins.len() <= l.pin_count);
        assert_eq!(b.pins[0].x, l.x0 - k.pin_diameter / 2);
        assert_eq!(b.pins[0].y, 240);

        let second_row = b.pins.iter().find(|p| p.y == 240 - 16).unwrap();
        assert_eq!(second_row.x, l.x0 - 8 - k.pin_diameter / 2);

        assert_eq!(b.dividers.len(), 42);
        assert_eq!(b.dividers[1], Segment::vertical(16, 480, 240));
        assert!(b.top_pin_y < 240);
    }
}
