// Copyright (c) 2026 rezky_nightky

use log::warn;

use crate::canvas::Canvas;
use crate::error::Result;
use crate::surface::{Point, Rect, Surface};

/// Canvas pixels behind one terminal cell: `scale` wide, `2 * scale` tall.
pub fn canvas_size(cols: u16, rows: u16, scale: u8) -> (u32, u32) {
    let s = scale.max(1) as u32;
    (cols as u32 * s, rows as u32 * 2 * s)
}

/// Window contents plus an optional back buffer. With a back buffer the
/// engine draws off screen and each frame is copied over in one go.
pub struct Display {
    window: Canvas,
    back: Option<Canvas>,
}

impl Display {
    pub fn new(width: u32, height: u32, double_buffer: bool) -> Result<Self> {
        let window = Canvas::try_new(width, height)?;
        let back = if double_buffer {
            match Canvas::try_new(width, height) {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!("no back buffer ({}), drawing straight to the window", e);
                    None
                }
            }
        } else {
            None
        };
        Ok(Self { window, back })
    }

    pub fn is_double_buffered(&self) -> bool {
        self.back.is_some()
    }

    pub fn drawable(&mut self) -> &mut dyn Surface {
        match &mut self.back {
            Some(back) => back,
            None => &mut self.window,
        }
    }

    /// Makes the frame just drawn visible.
    pub fn present(&mut self) {
        if let Some(back) = &self.back {
            let r = Rect::new(0, 0, back.width(), back.height());
            self.window.copy_area(back, r, Point::new(0, 0));
        }
    }

    pub fn window(&self) -> &Canvas {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Pen, Segment};

    #[test]
    fn canvas_is_scaled_from_cells() {
        assert_eq!(canvas_size(80, 24, 4), (320, 192));
        assert_eq!(canvas_size(80, 24, 0), (80, 48));
    }

    #[test]
    fn back_buffer_shows_only_after_present() {
        let mut d = Display::new(8, 8, true).unwrap();
        assert!(d.is_double_buffered());
        d.drawable()
            .draw_segments(&[Segment::vertical(2, 0, 7)], Pen::Foreground);
        assert_eq!(d.window().pen_at(2, 3), Some(Pen::Background));
        d.present();
        assert_eq!(d.window().pen_at(2, 3), Some(Pen::Foreground));
    }

    #[test]
    fn single_buffer_draws_straight_through() {
        let mut d = Display::new(8, 8, false).unwrap();
        assert!(!d.is_double_buffered());
        d.drawable()
            .draw_segments(&[Segment::vertical(5, 0, 7)], Pen::Foreground);
        assert_eq!(d.window().pen_at(5, 0), Some(Pen::Foreground));
    }
}
