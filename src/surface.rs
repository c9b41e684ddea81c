// Copyright (c) 2026 rezky_nightky

//! Drawing primitives consumed by the simulators.
//!
//! Coordinates follow the usual raster convention: origin at the top-left,
//! y growing downwards. Arc angles are in 1/64 degree, counter-clockwise from
//! three o'clock, so a full circle is `0..360 * 64`.

use crate::canvas::Canvas;

pub const FULL_CIRCLE: i32 = 360 * 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BallColor {
    Red,
    Green,
    Blue,
    Yellow,
}

impl BallColor {
    pub const ALL: [BallColor; 4] = [
        BallColor::Red,
        BallColor::Green,
        BallColor::Blue,
        BallColor::Yellow,
    ];

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            BallColor::Red => (0xFF, 0x00, 0x00),
            BallColor::Green => (0x00, 0x99, 0x00),
            BallColor::Blue => (0x00, 0x99, 0xFF),
            BallColor::Yellow => (0xFF, 0xFF, 0x00),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// What a primitive is painted with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pen {
    #[default]
    Background,
    Foreground,
    Ball(BallColor),
}

impl Pen {
    pub const COUNT: usize = 2 + BallColor::ALL.len();

    pub fn index(self) -> usize {
        match self {
            Pen::Background => 0,
            Pen::Foreground => 1,
            Pen::Ball(c) => 2 + c.index(),
        }
    }

    pub fn from_index(i: usize) -> Pen {
        match i {
            0 => Pen::Background,
            1 => Pen::Foreground,
            n => BallColor::ALL
                .get(n - 2)
                .copied()
                .map(Pen::Ball)
                .unwrap_or(Pen::Foreground),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Segment {
    pub fn vertical(x: i32, y1: i32, y2: i32) -> Self {
        Self {
            x1: x,
            y1,
            x2: x,
            y2,
        }
    }
}

/// An elliptical arc inscribed in the bounding box at `(x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arc {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub angle1: i32,
    pub angle2: i32,
}

impl Arc {
    pub fn circle(x: i32, y: i32, diameter: u32) -> Self {
        Self {
            x,
            y,
            width: diameter,
            height: diameter,
            angle1: 0,
            angle2: FULL_CIRCLE,
        }
    }
}

pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn fill_rectangle(&mut self, rect: Rect, pen: Pen);
    fn draw_arcs(&mut self, arcs: &[Arc], pen: Pen);
    fn fill_arcs(&mut self, arcs: &[Arc], pen: Pen);
    fn draw_segments(&mut self, segments: &[Segment], pen: Pen);

    /// Connected polyline; every entry of `steps` is relative to the
    /// previous point, the first to `origin`.
    fn draw_lines_relative(&mut self, origin: Point, steps: &[Point], pen: Pen);

    /// Copies `rect` of `src` so that its top-left lands on `dest`.
    fn copy_area(&mut self, src: &Canvas, rect: Rect, dest: Point);

    fn clear(&mut self) {
        let rect = Rect::new(0, 0, self.width(), self.height());
        self.fill_rectangle(rect, Pen::Background);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        FillRectangle(Rect, Pen),
        DrawArcs(Vec<Arc>, Pen),
        FillArcs(Vec<Arc>, Pen),
        DrawSegments(Vec<Segment>, Pen),
        DrawLinesRelative(Point, Vec<Point>, Pen),
        CopyArea(Rect, Point),
    }

    /// Surface that only remembers what it was asked to draw.
    pub struct Recorder {
        pub width: u32,
        pub height: u32,
        pub calls: Vec<Call>,
    }

    impl Recorder {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                calls: Vec::new(),
            }
        }
    }

    impl Surface for Recorder {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn fill_rectangle(&mut self, rect: Rect, pen: Pen) {
            self.calls.push(Call::FillRectangle(rect, pen));
        }

        fn draw_arcs(&mut self, arcs: &[Arc], pen: Pen) {
            self.calls.push(Call::DrawArcs(arcs.to_vec(), pen));
        }

        fn fill_arcs(&mut self, arcs: &[Arc], pen: Pen) {
            self.calls.push(Call::FillArcs(arcs.to_vec(), pen));
        }

        fn draw_segments(&mut self, segments: &[Segment], pen: Pen) {
            self.calls.push(Call::DrawSegments(segments.to_vec(), pen));
        }

        fn draw_lines_relative(&mut self, origin: Point, steps: &[Point], pen: Pen) {
            self.calls
                .push(Call::DrawLinesRelative(origin, steps.to_vec(), pen));
        }

        fn copy_area(&mut self, _src: &Canvas, rect: Rect, dest: Point) {
            self.calls.push(Call::CopyArea(rect, dest));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pen_index_round_trips_every_pen() {
        for i in 0..Pen::COUNT {
            assert_eq!(Pen::from_index(i).index(), i);
        }
    }
}
