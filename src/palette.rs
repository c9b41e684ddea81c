// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::ColorMode;
use crate::surface::{BallColor, Pen};

pub const BACKGROUND_RGB: (u8, u8, u8) = (0x00, 0x00, 0x00);
/// X11 gray80.
pub const FOREGROUND_RGB: (u8, u8, u8) = (0xCC, 0xCC, 0xCC);

/// Terminal color for every pen.
#[derive(Clone, Debug)]
pub struct Palette {
    pens: [Option<Color>; Pen::COUNT],
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| ((v as u16 * 5) + 127) / 255;
    let (r6, g6, b6) = (level(r), level(g), level(b));
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(
        r,
        g,
        b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    if !(8..=238).contains(&avg) {
        return cube_idx;
    }
    let gray_idx = 232 + ((avg - 8) / 10);
    let v = 8 + 10 * (gray_idx - 232);
    if dist2(r, g, b, v, v, v) < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 8] = [
        (Color::Black, (0, 0, 0)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::Cyan, (0, 255, 255)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, (cr, cg, cb))| dist2(r, g, b, *cr, *cg, *cb))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

fn convert(mode: ColorMode, (r, g, b): (u8, u8, u8)) -> Color {
    match mode {
        ColorMode::TrueColor => Color::Rgb { r, g, b },
        ColorMode::Color256 => Color::AnsiValue(rgb_to_ansi256(r, g, b)),
        ColorMode::Color16 | ColorMode::Mono => rgb_to_color16(r, g, b),
    }
}

impl Palette {
    pub fn new(mode: ColorMode) -> Self {
        let mut pens = [None; Pen::COUNT];
        for (i, slot) in pens.iter_mut().enumerate() {
            let rgb = match Pen::from_index(i) {
                Pen::Background => BACKGROUND_RGB,
                Pen::Foreground => FOREGROUND_RGB,
                // without color every ball is drawn like the board
                Pen::Ball(_) if mode == ColorMode::Mono => FOREGROUND_RGB,
                Pen::Ball(c) => c.rgb(),
            };
            *slot = Some(convert(mode, rgb));
        }
        Self { pens }
    }

    pub fn color(&self, pen: Pen) -> Option<Color> {
        self.pens[pen.index()]
    }

    #[cfg(test)]
    pub fn ball(&self, color: BallColor) -> Option<Color> {
        self.color(Pen::Ball(color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truecolor_keeps_exact_ball_colors() {
        let p = Palette::new(ColorMode::TrueColor);
        assert_eq!(
            p.ball(BallColor::Blue),
            Some(Color::Rgb {
                r: 0x00,
                g: 0x99,
                b: 0xFF
            })
        );
        assert_eq!(p.color(Pen::Background), Some(Color::Rgb { r: 0, g: 0, b: 0 }));
    }

    #[test]
    fn mono_collapses_balls_to_foreground() {
        let p = Palette::new(ColorMode::Mono);
        for c in BallColor::ALL {
            assert_eq!(p.ball(c), p.color(Pen::Foreground));
        }
    }

    #[test]
    fn ansi256_maps_primaries_into_the_cube() {
        assert_eq!(rgb_to_ansi256(255, 0, 0), 196);
        assert_eq!(rgb_to_ansi256(255, 255, 0), 226);
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
    }
}
