// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use log::{debug, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::ball_drop::BallDrop;
use crate::convolve::Convolver;
use crate::error::Result;
use crate::geometry::BoardConstants;
use crate::lightning::{Lightning, Phase};
use crate::surface::Surface;

/// Frame pacing of the ball drop, regardless of the configured delay.
pub const BALL_DROP_DELAY: Duration = Duration::from_micros(5_000);

/// Extra time a bolt stays on screen before it is erased.
pub const STRIKE_HOLD: Duration = Duration::from_micros(20_000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    BallDrop,
    Lightning,
    Convolve,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::BallDrop, Mode::Lightning, Mode::Convolve];

    pub fn label(self) -> &'static str {
        match self {
            Mode::BallDrop => "ball drop",
            Mode::Lightning => "lightning",
            Mode::Convolve => "convolve",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeChoice {
    Random,
    Fixed(Mode),
}

impl ModeChoice {
    /// 0 is random, 1..=3 pick a mode; anything else falls back to random.
    pub fn from_number(n: i64) -> Self {
        match n {
            0 => ModeChoice::Random,
            1 => ModeChoice::Fixed(Mode::BallDrop),
            2 => ModeChoice::Fixed(Mode::Lightning),
            3 => ModeChoice::Fixed(Mode::Convolve),
            other => {
                warn!("unknown mode {}, picking one at random", other);
                ModeChoice::Random
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub mode: ModeChoice,
    pub delay: Duration,
    /// Only meaningful to the host, which owns the back buffer.
    pub double_buffer: bool,
    pub seed: Option<u64>,
    pub board: BoardConstants,
}

impl EngineConfig {
    pub fn new(mode: i64, delay_us: i64, double_buffer: bool) -> Self {
        Self {
            mode: ModeChoice::from_number(mode),
            delay: Duration::from_micros(delay_us.max(0) as u64),
            double_buffer,
            seed: None,
            board: BoardConstants::default(),
        }
    }
}

enum Sim {
    BallDrop(BallDrop),
    Lightning(Lightning),
    Convolve(Convolver),
}

impl Sim {
    fn build(
        mode: Mode,
        width: u32,
        height: u32,
        k: BoardConstants,
        delay: Duration,
    ) -> Result<Self> {
        Ok(match mode {
            Mode::BallDrop => {
                let delay_us = delay.as_micros() as u64;
                Sim::BallDrop(BallDrop::new(width, height, k, delay_us)?)
            }
            Mode::Lightning => Sim::Lightning(Lightning::new(width, height)?),
            Mode::Convolve => Sim::Convolve(Convolver::new(width, height)?),
        })
    }
}

pub struct Engine {
    mode: Mode,
    delay: Duration,
    board: BoardConstants,
    width: u32,
    height: u32,
    rng: StdRng,
    sim: Sim,
    frames: u64,
    dropped: u64,
    settled: u64,
    drains: u64,
}

impl Engine {
    pub fn new(width: u32, height: u32, config: &EngineConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mode = match config.mode {
            ModeChoice::Fixed(m) => m,
            ModeChoice::Random => Mode::ALL[rng.random_range(0..Mode::ALL.len())],
        };
        debug!("starting {} mode at {}x{}", mode.label(), width, height);

        let sim = Sim::build(mode, width, height, config.board, config.delay)?;
        Ok(Self {
            mode,
            delay: config.delay,
            board: config.board,
            width,
            height,
            rng,
            sim,
            frames: 0,
            dropped: 0,
            settled: 0,
            drains: 0,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Phase the lightning will run next, when in lightning mode.
    #[cfg(test)]
    pub fn lightning_phase(&self) -> Option<Phase> {
        match &self.sim {
            Sim::Lightning(l) => Some(l.phase()),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn ball_drop(&self) -> Option<&BallDrop> {
        match &self.sim {
            Sim::BallDrop(b) => Some(b),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn lightning(&self) -> Option<&Lightning> {
        match &self.sim {
            Sim::Lightning(l) => Some(l),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn convolver(&self) -> Option<&Convolver> {
        match &self.sim {
            Sim::Convolve(c) => Some(c),
            _ => None,
        }
    }

    /// Advances the active mode by one frame, draws it, and returns how long
    /// the host should wait before the next frame.
    pub fn per_frame(&mut self, surface: &mut dyn Surface) -> Result<Duration> {
        let hint = match &mut self.sim {
            Sim::BallDrop(b) => {
                let report = b.step(&mut self.rng);
                self.dropped += report.spawned.is_some() as u64;
                self.settled += report.settled as u64;
                if report.drain_started {
                    debug!("draining after {} balls settled", self.settled);
                }
                b.render(surface);
                self.drains += b.drain_check() as u64;
                BALL_DROP_DELAY
            }
            Sim::Lightning(l) => {
                let ran = l.step(&mut self.rng);
                l.render(surface, ran);
                match ran {
                    Phase::Strike => self.delay + STRIKE_HOLD,
                    Phase::Erase => self.delay,
                }
            }
            Sim::Convolve(c) => {
                c.step()?;
                c.render(surface);
                c.promote();
                self.delay
            }
        };
        self.frames += 1;
        Ok(hint)
    }

    /// Rebuilds every mode buffer for the new size. Mode and delay are kept.
    pub fn on_resize(&mut self, width: u32, height: u32) -> Result<()> {
        debug!(
            "resize {}x{} -> {}x{}, rebuilding {}",
            self.width,
            self.height,
            width,
            height,
            self.mode.label()
        );
        self.sim = Sim::build(self.mode, width, height, self.board, self.delay)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn teardown(self) {
        match &self.sim {
            Sim::BallDrop(b) => debug!(
                "ball drop ran {} frames: {} balls dropped, {} settled, {} live, {} drain cycles",
                self.frames,
                self.dropped,
                self.settled,
                b.live_total(),
                self.drains
            ),
            Sim::Lightning(l) => debug!(
                "lightning ran {} frames, {} strikes since the last reset",
                self.frames,
                l.strikes()
            ),
            Sim::Convolve(c) => debug!(
                "convolve ran {} frames, generation {}",
                self.frames,
                c.generation()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::Recorder;

    fn config(mode: i64, delay: i64, seed: u64) -> EngineConfig {
        EngineConfig {
            seed: Some(seed),
            ..EngineConfig::new(mode, delay, true)
        }
    }

    #[test]
    fn random_mode_picks_each_mode_eventually() {
        let mut seen = Vec::new();
        for seed in 0..64 {
            let e = Engine::new(64, 48, &config(0, 0, seed)).unwrap();
            if !seen.contains(&e.mode()) {
                seen.push(e.mode());
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn unknown_mode_falls_back_to_random() {
        assert_eq!(ModeChoice::from_number(7), ModeChoice::Random);
        assert_eq!(ModeChoice::from_number(-1), ModeChoice::Random);
        assert_eq!(
            ModeChoice::from_number(2),
            ModeChoice::Fixed(Mode::Lightning)
        );
    }

    #[test]
    fn negative_delay_is_clamped() {
        assert_eq!(EngineConfig::new(1, -500, false).delay, Duration::ZERO);
        assert_eq!(
            EngineConfig::new(1, 10_000, false).delay,
            Duration::from_micros(10_000)
        );
    }

    #[test]
    fn delay_hints_follow_the_mode() {
        let mut rec = Recorder::new(64, 48);

        let mut e = Engine::new(64, 48, &config(1, 123, 1)).unwrap();
        assert_eq!(e.per_frame(&mut rec).unwrap(), BALL_DROP_DELAY);

        let mut e = Engine::new(64, 48, &config(2, 10_000, 1)).unwrap();
        assert_eq!(e.lightning_phase(), Some(Phase::Strike));
        assert_eq!(e.per_frame(&mut rec).unwrap(), Duration::from_micros(30_000));
        assert_eq!(e.lightning_phase(), Some(Phase::Erase));
        assert_eq!(e.per_frame(&mut rec).unwrap(), Duration::from_micros(10_000));
        assert_eq!(e.lightning_phase(), Some(Phase::Strike));

        let mut e = Engine::new(64, 48, &config(3, 10_000, 1)).unwrap();
        assert_eq!(e.per_frame(&mut rec).unwrap(), Duration::from_micros(10_000));
        assert_eq!(e.convolver().unwrap().current().len(), 9);
    }

    #[test]
    fn largest_delay_runs_ball_drop() {
        let mut rec = Recorder::new(640, 480);
        let mut e = Engine::new(640, 480, &config(1, i64::MAX, 5)).unwrap();
        for _ in 0..20 {
            assert_eq!(e.per_frame(&mut rec).unwrap(), BALL_DROP_DELAY);
        }
        assert_eq!(e.ball_drop().unwrap().live_total(), 1);
    }

    #[test]
    fn resize_rebuilds_geometry_and_keeps_mode() {
        let mut rec = Recorder::new(640, 480);
        let mut e = Engine::new(640, 480, &config(1, 42, 3)).unwrap();
        for _ in 0..50 {
            e.per_frame(&mut rec).unwrap();
        }
        assert!(e.ball_drop().unwrap().live_total() > 0);

        e.on_resize(320, 192).unwrap();
        assert_eq!(e.mode(), Mode::BallDrop);
        assert_eq!(e.delay(), Duration::from_micros(42));
        assert_eq!(e.size(), (320, 192));
        let b = e.ball_drop().unwrap();
        assert_eq!(b.layout().width, 320);
        assert_eq!(b.live_total(), 0);
        e.teardown();
    }

    #[test]
    fn same_seed_gives_same_run() {
        let run = |seed| {
            let mut rec = Recorder::new(200, 100);
            let mut e = Engine::new(200, 100, &config(2, 0, seed)).unwrap();
            for _ in 0..40 {
                e.per_frame(&mut rec).unwrap();
            }
            e.lightning().unwrap().decay().to_vec()
        };
        assert_eq!(run(11), run(11));
    }
}
