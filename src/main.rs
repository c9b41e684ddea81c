// Copyright (c) 2026 rezky_nightky

mod ball_drop;
mod canvas;
mod cell;
mod config;
mod convolve;
mod display;
mod engine;
mod error;
mod frame;
mod geometry;
mod lightning;
mod palette;
mod runtime;
mod surface;
mod terminal;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use log::{debug, info};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_help_detail, rewrite_legacy_flag,
    Args,
};
use crate::display::{canvas_size, Display};
use crate::engine::{Engine, EngineConfig};
use crate::error::GaussianError;
use crate::frame::Frame;
use crate::palette::Palette;
use crate::runtime::ColorMode;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

/// Shortest pause between frames, so a zero delay still polls input.
const MIN_FRAME: Duration = Duration::from_millis(1);

fn build_info() -> &'static str {
    env!("GAUSSIAN_BUILD")
}

fn git_sha() -> &'static str {
    env!("GAUSSIAN_GIT_SHA")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> ColorMode {
    match args.colormode {
        None => detect_color_mode_auto(),
        Some(0) => ColorMode::Mono,
        Some(16) => ColorMode::Color16,
        Some(8) | Some(256) => ColorMode::Color256,
        Some(24) | Some(32) => ColorMode::TrueColor,
        Some(m) => {
            eprintln!("invalid --colormode: {} (allowed: 0,16,8/256,24/32)", m);
            std::process::exit(1);
        }
    }
}

fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Color16 => "16-color",
        ColorMode::Mono => "mono",
    }
}

/// Leaves the alternate screen before reporting, so the message stays
/// visible after exit.
fn fatal(term: Terminal, e: GaussianError) -> ! {
    drop(term);
    eprintln!("gaussian: {}", e);
    std::process::exit(1);
}

fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();

    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let mut argv: Vec<std::ffi::OsString> = env::args_os().collect();
    for arg in argv.iter_mut().skip(1) {
        if let Some(long) = arg.to_str().and_then(rewrite_legacy_flag) {
            *arg = long.into();
        }
    }

    let matches = cmd.get_matches_from(argv);
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.help_detail {
        print_help_detail();
        return Ok(());
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let auto = detect_color_mode_auto();
        let effective = detect_color_mode(&args);

        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() {
                "(unset)"
            } else {
                &colorterm
            }
        );
        println!(
            "  TERM: {}",
            if term.is_empty() { "(unset)" } else { &term }
        );
        println!("  auto_detected: {}", color_mode_label(auto));
        if args.colormode.is_some() {
            println!("  forced: {}", color_mode_label(effective));
        }
        println!("  effective: {}", color_mode_label(effective));
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        if !git_sha().is_empty() {
            println!("Commit: {}", git_sha());
        }
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return Ok(());
    }

    let duration_s = match args.duration {
        Some(s) if !s.is_finite() => {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        Some(s) if s > 0.0 && !(0.1..=86400.0).contains(&s) => {
            eprintln!("failed to apply --duration {} (min 0.1 max 86400)", s);
            std::process::exit(1);
        }
        Some(s) if s > 0.0 => Some(s),
        _ => None,
    };

    let palette = Palette::new(detect_color_mode(&args));
    let scale = args.scale;
    let mut config = EngineConfig::new(args.mode, args.delay, args.double_buffer());
    config.seed = args.seed;

    let mut term = Terminal::new()?;
    let (cols, rows) = term.size()?;
    let (w, h) = canvas_size(cols, rows, scale);

    let mut engine = match Engine::new(w, h, &config) {
        Ok(e) => e,
        Err(e) => fatal(term, e),
    };
    let mut display = match Display::new(w, h, config.double_buffer) {
        Ok(d) => d,
        Err(e) => fatal(term, e),
    };
    let mut frame = Frame::new(cols, rows);
    info!(
        "{} mode on a {}x{} canvas ({}x{} cells), delay {:?}, double buffer {}",
        engine.mode().label(),
        engine.size().0,
        engine.size().1,
        cols,
        rows,
        engine.delay(),
        display.is_double_buffered()
    );

    let start_time = Instant::now();
    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));
    let mut next_frame = Instant::now();
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            running = false;
                            break;
                        }
                        match (k.code, k.modifiers) {
                            (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => running = false,
                            (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => {
                                running = false
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if let Some((nc, nr)) = pending_resize {
            let (nw, nh) = canvas_size(nc, nr, scale);
            debug!("terminal resized to {}x{} cells", nc, nr);
            if let Err(e) = engine.on_resize(nw, nh) {
                fatal(term, e);
            }
            display = match Display::new(nw, nh, config.double_buffer) {
                Ok(d) => d,
                Err(e) => fatal(term, e),
            };
            frame = Frame::new(nc, nr);
        }

        let hint = match engine.per_frame(display.drawable()) {
            Ok(d) => d,
            Err(e) => fatal(term, e),
        };
        display.present();
        frame.rasterize(display.window(), &palette, scale as u32);
        if frame.is_dirty_all() || !frame.dirty_indices().is_empty() {
            term.draw(&mut frame)?;
        }

        next_frame = Instant::now() + hint.max(MIN_FRAME);
    }

    engine.teardown();
    Ok(())
}
