// Copyright (c) 2026 rezky_nightky

//! Galton board: balls fall through a pin lattice, bounce left or right at
//! every row and pile up in bins, tracing out a binomial histogram. When any
//! stack reaches the pins the bins drain and the board starts over.

use log::{debug, warn};
use rand::{
    distr::{Distribution, Uniform},
    Rng,
};

use crate::canvas::Canvas;
use crate::error::{try_vec, Result};
use crate::geometry::{Board, BoardConstants, Layout};
use crate::surface::{Arc, BallColor, Pen, Point, Rect, Segment, Surface};

const COLOR_COUNT: usize = BallColor::ALL.len();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Drop,
    Roll,
    Bin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ball {
    pub id: u64,
    /// Top-left of the bounding box.
    pub x: i32,
    pub y: i32,
    pub dx: i32,
    pub dy: i32,
    pub action: Action,
    /// Height at which the current action ends.
    pub y_limit: i32,
    pub bin: Option<usize>,
}

impl Ball {
    fn arc(&self, diameter: i32) -> Arc {
        Arc::circle(self.x, self.y, diameter as u32)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub spawned: Option<BallColor>,
    pub settled: usize,
    pub drain_started: bool,
}

enum Backdrop {
    Pending,
    Cached { canvas: Canvas, stale: bool },
    Direct,
}

pub struct BallDrop {
    k: BoardConstants,
    layout: Layout,
    board: Board,
    delay_us: u64,

    live: [Vec<Ball>; COLOR_COUNT],
    live_sum: usize,
    done: [Vec<Arc>; COLOR_COUNT],
    bins: Vec<u32>,

    wait: i32,
    draining: bool,
    next_id: u64,

    backdrop: Backdrop,
    scratch: Vec<Arc>,

    coin: Uniform<u8>,
    jitter: Uniform<i32>,
}

/// Index of the bin below `x`: one less than the first boundary after the
/// leftmost that lies right of `x`, or the last bin when none does.
pub fn bin_for(x: i32, dividers: &[Segment]) -> usize {
    dividers
        .iter()
        .skip(1)
        .position(|s| x < s.x1)
        .unwrap_or(dividers.len().saturating_sub(1))
}

impl BallDrop {
    pub fn new(width: u32, height: u32, k: BoardConstants, delay_us: u64) -> Result<Self> {
        let layout = Layout::plan(width, height, &k);
        let board = Board::build(&layout, &k)?;

        let done_cap = ((layout.height / k.ball_diameter) * (layout.width / k.ball_diameter) / 2)
            .max(0) as usize;
        let live = [
            try_vec("live balls", layout.live_cap)?,
            try_vec("live balls", layout.live_cap)?,
            try_vec("live balls", layout.live_cap)?,
            try_vec("live balls", layout.live_cap)?,
        ];
        let done = [
            try_vec("settled balls", done_cap)?,
            try_vec("settled balls", done_cap)?,
            try_vec("settled balls", done_cap)?,
            try_vec("settled balls", done_cap)?,
        ];
        let mut bins = try_vec("bins", layout.bin_count + 1)?;
        bins.resize(layout.bin_count + 1, 0);
        let scratch = try_vec("ball arcs", layout.live_cap.max(done_cap))?;

        debug!(
            "ball drop board {}x{}: {} bins, {} pin rows, {} pins, live cap {}",
            layout.width,
            layout.height,
            layout.bin_count,
            layout.pin_row_count,
            board.pins.len(),
            layout.live_cap
        );

        Ok(Self {
            k,
            layout,
            board,
            delay_us,
            live,
            live_sum: 0,
            done,
            bins,
            wait: 0,
            draining: false,
            next_id: 0,
            backdrop: Backdrop::Pending,
            scratch,
            coin: Uniform::new_inclusive(0, 1).expect("valid range"),
            jitter: Uniform::new(0, 10).expect("valid range"),
        })
    }

    pub fn live_total(&self) -> usize {
        self.live_sum
    }

    /// Advances the board by one frame: spawn, then move every live ball.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> StepReport {
        let mut report = StepReport::default();

        if !self.draining && self.wait <= 0 && self.live_sum < self.layout.live_cap {
            report.spawned = self.spawn(rng);
        }
        self.wait = self.wait.saturating_sub(1);

        let half = self.layout.half_height();
        let unit = self.k.stack_unit();
        let roll = self.k.roll_step();

        for (c, balls) in self.live.iter_mut().enumerate() {
            let mut j = 0;
            while j < balls.len() {
                let ball = &mut balls[j];
                ball.x += ball.dx;
                ball.y += ball.dy;

                match ball.action {
                    Action::Drop if ball.y >= half => {
                        ball.action = Action::Bin;
                        ball.dx = 0;
                        ball.bin = Some(bin_for(ball.x, &self.board.dividers));
                    }
                    Action::Drop if ball.y >= ball.y_limit => {
                        ball.action = Action::Roll;
                        ball.dx = if self.coin.sample(rng) == 0 { -1 } else { 1 };
                        ball.y_limit += roll;
                    }
                    Action::Roll if ball.y >= ball.y_limit => {
                        ball.action = Action::Drop;
                        ball.dx = 0;
                        ball.y_limit += roll;
                    }
                    Action::Bin => {
                        let bin = ball.bin.unwrap_or(0);
                        let rest = self.layout.height - unit * (1 + self.bins[bin] as i32);
                        ball.dy += 1;
                        if ball.y >= rest {
                            let mut arc = ball.arc(self.k.ball_diameter);
                            arc.y = rest;
                            self.done[c].push(arc);
                            self.bins[bin] += 1;
                            balls.remove(j);
                            self.live_sum -= 1;
                            report.settled += 1;

                            if let Backdrop::Cached { stale, .. } = &mut self.backdrop {
                                *stale = true;
                            }
                            if rest <= half && !self.draining {
                                self.draining = true;
                                report.drain_started = true;
                                debug!("bin {} reached the pins, draining", bin);
                            }
                            continue;
                        }
                    }
                    _ => {}
                }
                j += 1;
            }
        }

        report
    }

    /// Runs after the frame is drawn: while draining, shifts the stacks one
    /// step. Returns true on the frame the last bin empties.
    pub fn drain_check(&mut self) -> bool {
        self.draining && self.drain_once()
    }

    fn spawn<R: Rng>(&mut self, rng: &mut R) -> Option<BallColor> {
        let mut eligible = [BallColor::Red; COLOR_COUNT];
        let mut n = 0;
        for color in BallColor::ALL {
            if self.live[color.index()].len() < self.layout.live_cap {
                eligible[n] = color;
                n += 1;
            }
        }
        if n == 0 {
            return None;
        }
        let color = eligible[rng.random_range(0..n)];

        let d = self.k.ball_diameter;
        self.live[color.index()].push(Ball {
            id: self.next_id,
            x: self.layout.width / 2 - d / 2,
            y: -d - 1,
            dx: 0,
            dy: 1,
            action: Action::Drop,
            y_limit: self.board.top_pin_y - d - 2,
            bin: None,
        });
        self.next_id += 1;
        self.live_sum += 1;

        let unit = self.k.stack_unit() as f64;
        let fall = (self.layout.half_height() - d - 2 * self.k.bin_margin) as f64;
        let pace = (self.delay_us as f64 / 250_000.0) * fall;
        // float to int casts saturate, so huge delays pin the wait at i32::MAX
        self.wait = (unit + pace + self.jitter.sample(rng) as f64) as i32;

        Some(color)
    }

    /// Moves every stack down one ball and empties each non-empty bin by
    /// one. Returns true once every bin is empty.
    fn drain_once(&mut self) -> bool {
        let unit = self.k.stack_unit();
        for arcs in &mut self.done {
            for a in arcs.iter_mut() {
                a.y += unit;
            }
        }
        if let Backdrop::Cached { stale, .. } = &mut self.backdrop {
            *stale = true;
        }

        let mut remaining: u64 = 0;
        for b in &mut self.bins {
            if *b > 0 {
                *b -= 1;
                remaining += *b as u64;
            }
        }

        if remaining > 0 {
            return false;
        }

        self.draining = false;
        for arcs in &mut self.done {
            arcs.clear();
        }
        debug!("drain finished, board reset");
        true
    }

    pub fn render(&mut self, surface: &mut dyn Surface) {
        if matches!(self.backdrop, Backdrop::Pending) {
            let w = self.layout.width as u32;
            let h = self.layout.height as u32;
            self.backdrop = match Canvas::try_new(w, h) {
                Ok(canvas) => Backdrop::Cached {
                    canvas,
                    stale: true,
                },
                Err(e) => {
                    warn!("{}; drawing the board directly", e);
                    Backdrop::Direct
                }
            };
        }

        match &mut self.backdrop {
            Backdrop::Cached { canvas, stale } => {
                if *stale {
                    paint_backdrop(canvas, &self.layout, &self.board, &self.done);
                    *stale = false;
                }
                let rect = Rect::new(0, 0, canvas.width(), canvas.height());
                surface.copy_area(canvas, rect, Point::new(0, 0));
            }
            Backdrop::Direct | Backdrop::Pending => {
                paint_backdrop(surface, &self.layout, &self.board, &self.done);
            }
        }

        for color in BallColor::ALL {
            let balls = &self.live[color.index()];
            if balls.is_empty() {
                continue;
            }
            self.scratch.clear();
            self.scratch
                .extend(balls.iter().map(|b| b.arc(self.k.ball_diameter)));
            surface.draw_arcs(&self.scratch, Pen::Ball(color));
            surface.fill_arcs(&self.scratch, Pen::Ball(color));
        }
    }
}

fn paint_backdrop(
    surface: &mut dyn Surface,
    layout: &Layout,
    board: &Board,
    done: &[Vec<Arc>; COLOR_COUNT],
) {
    surface.fill_rectangle(
        Rect::new(0, 0, layout.width as u32, layout.height as u32),
        Pen::Background,
    );
    surface.fill_arcs(&board.pins, Pen::Foreground);
    surface.draw_segments(&board.dividers, Pen::Foreground);
    for color in BallColor::ALL {
        let arcs = &done[color.index()];
        if arcs.is_empty() {
            continue;
        }
        surface.draw_arcs(arcs, Pen::Ball(color));
        surface.fill_arcs(arcs, Pen::Ball(color));
    }
}

#[cfg(test)]
impl BallDrop {
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn live(&self, color: BallColor) -> &[Ball] {
        &self.live[color.index()]
    }

    pub fn done(&self, color: BallColor) -> &[Arc] {
        &self.done[color.index()]
    }

    pub fn bins(&self) -> &[u32] {
        &self.bins
    }

    pub fn is_draining(&self) -> bool {
        self.draining
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::surface::recording::{Call, Recorder};

    fn board(w: u32, h: u32) -> BallDrop {
        BallDrop::new(w, h, BoardConstants::default(), 0).unwrap()
    }

    /// One frame as the engine runs it, without drawing.
    fn frame(b: &mut BallDrop, rng: &mut StdRng) -> (StepReport, bool) {
        let report = b.step(rng);
        let drained = b.drain_check();
        (report, drained)
    }

    #[test]
    fn bin_assignment_picks_first_boundary_right_of_ball() {
        let dividers: Vec<Segment> = (0..5).map(|i| Segment::vertical(i * 16, 480, 240)).collect();
        assert_eq!(bin_for(20, &dividers), 1);
        assert_eq!(bin_for(0, &dividers), 0);
        assert_eq!(bin_for(-5, &dividers), 0);
        assert_eq!(bin_for(16, &dividers), 1);
        assert_eq!(bin_for(500, &dividers), 4);
    }

    #[test]
    fn first_spawn_drops_from_top_center() {
        let mut b = board(640, 480);
        let mut rng = StdRng::seed_from_u64(1);
        let report = b.step(&mut rng);

        let color = report.spawned.unwrap();
        let ball = b.live(color)[0];
        assert_eq!(ball.x, 320 - 5);
        // spawned at -11, moved once
        assert_eq!(ball.y, -10);
        assert_eq!(ball.action, Action::Drop);
        assert_eq!(ball.y_limit, b.board().top_pin_y - 12);
        assert_eq!(ball.bin, None);
        assert_eq!(b.live_total(), 1);
    }

    #[test]
    fn spawn_waits_between_balls() {
        let mut b = board(640, 480);
        let mut rng = StdRng::seed_from_u64(2);
        assert!(b.step(&mut rng).spawned.is_some());
        // wait is at least one stack unit of frames
        for _ in 0..10 {
            assert!(b.step(&mut rng).spawned.is_none());
        }
    }

    #[test]
    fn spawn_wait_scales_with_delay() {
        // unit 12, fall 240 - 10 - 2 = 228, delay of a quarter second
        let mut b = BallDrop::new(640, 480, BoardConstants::default(), 250_000).unwrap();
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            b.spawn(&mut rng).unwrap();
            assert!((240..=249).contains(&b.wait), "wait {}", b.wait);
        }
    }

    #[test]
    fn huge_delay_pins_the_wait_instead_of_overflowing() {
        let mut b = BallDrop::new(640, 480, BoardConstants::default(), u64::MAX).unwrap();
        let mut rng = StdRng::seed_from_u64(12);
        assert!(b.step(&mut rng).spawned.is_some());
        assert_eq!(b.wait, i32::MAX - 1);
        for _ in 0..100 {
            assert!(b.step(&mut rng).spawned.is_none());
        }
    }

    #[test]
    fn live_counts_never_exceed_cap() {
        let mut b = board(320, 192);
        let cap = b.layout().live_cap;
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20_000 {
            frame(&mut b, &mut rng);
            let mut total = 0;
            for c in BallColor::ALL {
                assert!(b.live(c).len() <= cap);
                total += b.live(c).len();
            }
            assert_eq!(total, b.live_total());
            assert!(total <= cap);
        }
    }

    #[test]
    fn every_ball_follows_drop_roll_bin_pattern() {
        let mut b = board(320, 192);
        let mut rng = StdRng::seed_from_u64(4);
        let mut seen: HashMap<u64, Vec<Action>> = HashMap::new();
        let mut finished = 0;

        for _ in 0..5_000 {
            frame(&mut b, &mut rng);
            let mut alive = Vec::new();
            for c in BallColor::ALL {
                for ball in b.live(c) {
                    alive.push(ball.id);
                    let hist = seen.entry(ball.id).or_default();
                    if hist.last() != Some(&ball.action) {
                        hist.push(ball.action);
                    }
                }
            }
            seen.retain(|id, hist| {
                if alive.contains(id) {
                    return true;
                }
                assert_eq!(hist.first(), Some(&Action::Drop));
                assert_eq!(hist.last(), Some(&Action::Bin));
                let middle = &hist[..hist.len() - 1];
                for (i, a) in middle.iter().enumerate() {
                    let expect = if i % 2 == 0 { Action::Drop } else { Action::Roll };
                    assert_eq!(*a, expect, "history {:?}", hist);
                }
                finished += 1;
                false
            });
        }
        assert!(finished > 10);
    }

    #[test]
    fn binned_ball_settles_on_stack_and_counts() {
        let mut b = board(640, 480);
        let mut rng = StdRng::seed_from_u64(5);
        b.wait = 1_000;
        b.bins[3] = 2;
        b.live[0].push(Ball {
            id: 99,
            x: 50,
            y: 480 - 12 * 3 - 1,
            dx: 0,
            dy: 1,
            action: Action::Bin,
            y_limit: 0,
            bin: Some(3),
        });
        b.live_sum = 1;

        let report = b.step(&mut rng);
        assert_eq!(report.settled, 1);
        assert!(b.live(BallColor::Red).is_empty());
        assert_eq!(b.live_total(), 0);
        assert_eq!(b.bins()[3], 3);
        assert_eq!(b.done(BallColor::Red)[0].y, 480 - 36);
        assert!(!b.is_draining());
    }

    #[test]
    fn full_stack_starts_drain_and_drain_resets_board() {
        let mut b = board(640, 480);
        let mut rng = StdRng::seed_from_u64(6);
        b.wait = 1_000;
        // rest = 480 - 12 * 20 = 240, the half-height line
        b.bins[0] = 19;
        b.bins[5] = 4;
        b.live[1].push(Ball {
            id: 7,
            x: 0,
            y: 300,
            dx: 0,
            dy: 1,
            action: Action::Bin,
            y_limit: 0,
            bin: Some(0),
        });
        b.live_sum = 1;

        let report = b.step(&mut rng);
        assert!(report.drain_started);
        assert!(b.is_draining());
        // stacks shift only once the frame has been drawn
        assert_eq!(b.done(BallColor::Green)[0].y, 240);
        assert!(!b.drain_check());
        assert_eq!(b.done(BallColor::Green)[0].y, 252);
        let done_before = b.done(BallColor::Green)[0].y;

        let mut prev = b.bins().to_vec();
        let mut frames = 1;
        loop {
            let (r, finished) = frame(&mut b, &mut rng);
            assert!(r.spawned.is_none());
            for (now, before) in b.bins().iter().zip(&prev) {
                assert!(now <= before);
            }
            prev = b.bins().to_vec();
            frames += 1;
            if finished {
                break;
            }
            assert!(b.done(BallColor::Green)[0].y > done_before);
        }

        // lockstep: the fullest bin sets the pace
        assert_eq!(frames, 20);
        assert!(!b.is_draining());
        assert!(b.bins().iter().all(|&n| n == 0));
        for c in BallColor::ALL {
            assert!(b.done(c).is_empty());
        }
    }

    #[test]
    fn bin_index_stays_in_range() {
        let mut b = board(200, 160);
        let bin_count = b.layout().bin_count;
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..5_000 {
            frame(&mut b, &mut rng);
            for c in BallColor::ALL {
                for ball in b.live(c) {
                    if let Some(bin) = ball.bin {
                        assert!(bin <= bin_count);
                    }
                }
            }
        }
    }

    #[test]
    fn render_caches_board_and_draws_live_balls_on_top() {
        let mut b = board(160, 96);
        let mut rng = StdRng::seed_from_u64(9);
        let color = b.step(&mut rng).spawned.unwrap();

        let mut rec = Recorder::new(160, 96);
        b.render(&mut rec);
        assert_eq!(
            rec.calls[0],
            Call::CopyArea(Rect::new(0, 0, 160, 96), Point::new(0, 0))
        );
        assert!(matches!(&rec.calls[1], Call::DrawArcs(a, Pen::Ball(c)) if a.len() == 1 && *c == color));
        assert!(matches!(&rec.calls[2], Call::FillArcs(a, Pen::Ball(c)) if a.len() == 1 && *c == color));
        assert!(matches!(b.backdrop, Backdrop::Cached { stale: false, .. }));
    }

    #[test]
    fn render_without_cache_paints_board_directly() {
        let mut b = board(160, 96);
        b.backdrop = Backdrop::Direct;
        let mut rec = Recorder::new(160, 96);
        b.render(&mut rec);
        assert!(matches!(rec.calls[0], Call::FillRectangle(_, Pen::Background)));
        assert!(matches!(&rec.calls[1], Call::FillArcs(pins, Pen::Foreground) if pins.len() == b.board().pins.len()));
        assert!(matches!(&rec.calls[2], Call::DrawSegments(s, Pen::Foreground) if s.len() == b.layout().bin_count + 1));
    }
}
