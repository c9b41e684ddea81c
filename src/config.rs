// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;

use clap::Parser;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  gaussian --mode 0 --delay 10000 --db --scale 4";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Highlights headings, the program name, option lines and examples.
fn colorize_help_detail(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = match chunk.strip_suffix('\n') {
            Some(l) => (l, "\n"),
            None => (chunk, ""),
        };

        let heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();
        if heading {
            out.push_str(&format!("\x1b[1;36m{}\x1b[0m{}", line, nl));
        } else if let Some(rest) = line.strip_prefix("      Example:") {
            out.push_str(&format!("      \x1b[32mExample:\x1b[0m{}{}", rest, nl));
        } else if let Some(rest) = line.strip_prefix("  gaussian") {
            out.push_str(&format!("  \x1b[1;34mgaussian\x1b[0m{}{}", rest, nl));
        } else if let Some(rest) = line.strip_prefix("  -") {
            out.push_str(&format!("  \x1b[33m-{}\x1b[0m{}", rest, nl));
        } else {
            out.push_str(line);
            out.push_str(nl);
        }
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_help_detail(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

/// Old single-dash long flags still in use by screensaver launchers.
pub fn rewrite_legacy_flag(arg: &str) -> Option<&'static str> {
    match arg {
        "-delay" => Some("--delay"),
        "-mode" => Some("--mode"),
        "-db" => Some("--db"),
        "-no-db" => Some("--no-db"),
        _ => None,
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "gaussian", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        long = "mode",
        default_value_t = 0,
        allow_negative_numbers = true,
        help_heading = "SIMULATION",
        help = "Mode: 0=random, 1=ball drop, 2=lightning, 3=convolve (others pick at random)"
    )]
    pub mode: i64,

    #[arg(
        long = "delay",
        default_value_t = 10_000,
        allow_negative_numbers = true,
        help_heading = "SIMULATION",
        help = "Frame delay in microseconds (negative is treated as 0)"
    )]
    pub delay: i64,

    #[arg(
        long = "db",
        overrides_with = "no_db",
        help_heading = "SIMULATION",
        help = "Draw into a back buffer and copy it over each frame (default)"
    )]
    pub db: bool,

    #[arg(
        long = "no-db",
        overrides_with = "db",
        help_heading = "SIMULATION",
        help = "Draw straight into the window"
    )]
    pub no_db: bool,

    #[arg(
        long = "seed",
        help_heading = "SIMULATION",
        help = "Seed the random generator for a repeatable run"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "scale",
        default_value_t = 4,
        value_parser = clap::value_parser!(u8).range(1..=8),
        help_heading = "APPEARANCE",
        help = "Canvas pixels per half-cell edge (min 1 max 8)"
    )]
    pub scale: u8,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "help-detail",
        help_heading = "HELP",
        help = "Show detailed help for all parameters and exit"
    )]
    pub help_detail: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

impl Args {
    pub fn double_buffer(&self) -> bool {
        !self.no_db
    }
}

pub fn print_help_detail() {
    let block = format!(
        "{}\n\nUSAGE:\n  gaussian [OPTIONS]\n\nSIMULATION:\n  --mode <n>\n      0 picks one of the modes at random. 1 drops colored balls through a\n      pin lattice into bins, 2 strikes random-walk lightning that burns the\n      ground, 3 convolves a two-point density with itself.\n      Example: gaussian --mode 1\n\n  --delay <usecs>\n      Pause between frames. Ball drop always runs at 5000.\n      Example: gaussian --delay 20000\n\n  --db, --no-db\n      Use or skip the back buffer.\n      Example: gaussian --no-db\n\n  --seed <n>\n      Repeatable run.\n      Example: gaussian --mode 2 --seed 42\n\nAPPEARANCE:\n  --scale <n>\n      Canvas pixels per half-cell edge (min 1 max 8).\n      Example: gaussian --scale 2\n\n  --colormode <0|16|8|24>\n      Force color mode; otherwise auto-detected from COLORTERM/TERM.\n      Example: gaussian --colormode 8\n\nGENERAL:\n  -s, --screensaver\n      Exit on any keypress.\n      Example: gaussian -s\n\n  --duration <seconds>\n      Stop after N seconds (min 0.1 max 86400).\n      Example: gaussian --duration 30\n\nLEGACY FLAGS:\n  -delay, -mode, -db\n      Accepted as --delay, --mode and --db.\n      Example: gaussian -mode 3 -delay 5000\n\nKEYS:\n  q, Esc, Ctrl-C\n      Quit.\n\nHELP:\n  --check-bitcolor\n      Print detected terminal color capability and exit.\n\n  --help\n      Show short help.\n\n  --help-detail\n      Show this detailed help.\n\n  -v, --version\n      Print version and exit.\n\n  -i, --info\n      Print version info and exit.\n\nLOGGING:\n  RUST_LOG=debug gaussian 2>gaussian.log\n      Log mode choice, rebuilds and drain cycles to stderr.\n",
        DEFAULT_PARAMS_USAGE
    );

    if color_enabled_stdout() {
        print!("{}", colorize_help_detail(&block));
    } else {
        print!("{}", block);
    }
}
