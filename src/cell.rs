// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

/// Upper half block: the glyph's ink is the top pixel, its paper the bottom.
pub const HALF_BLOCK: char = '\u{2580}';

/// One terminal cell holding two stacked canvas blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl Cell {
    pub fn blank() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
        }
    }

    pub fn pixels(top: Option<Color>, bottom: Option<Color>) -> Self {
        if top == bottom {
            return Self {
                ch: ' ',
                fg: None,
                bg: bottom,
            };
        }
        Self {
            ch: HALF_BLOCK,
            fg: top,
            bg: bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_halves_use_a_plain_space() {
        let c = Cell::pixels(Some(Color::Red), Some(Color::Red));
        assert_eq!(c.ch, ' ');
        assert_eq!(c.bg, Some(Color::Red));

        let c = Cell::pixels(Some(Color::Red), Some(Color::Black));
        assert_eq!(c.ch, HALF_BLOCK);
        assert_eq!(c.fg, Some(Color::Red));
        assert_eq!(c.bg, Some(Color::Black));
    }
}
