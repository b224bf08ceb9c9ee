//! Polyfall: falling-block puzzle in the terminal, with a bag randomizer and a sinking DOT.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use polyfall::GameConfig;
use polyfall::config::{DEFAULT_COLS, DEFAULT_ROWS, ShapeSet};
use polyfall::highscores::{Leaderboard, default_path};

fn main() -> Result<()> {
    let args = Args::parse();
    if args.list_scores {
        print_scores(&Leaderboard::load());
        return Ok(());
    }
    let config = args.game_config();
    config.validate().context("invalid game options")?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette)
        .with_context(|| format!("loading theme {:?}", args.theme))?;
    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

fn print_scores(board: &Leaderboard) {
    println!("High scores ({})", default_path().display());
    if board.is_empty() {
        println!("  (none yet)");
    }
    for (i, e) in board.entries().iter().enumerate() {
        println!("{:>3}. {:<16} {:>8}", i + 1, e.name, e.score);
    }
}

/// Falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "polyfall",
    version,
    about = "Falling-block puzzle in the terminal: bag-dealt pieces, and optional pentomino-style extras that add a rare DOT which sinks to the lowest hole in its column.",
    long_about = "Polyfall is a terminal falling-block puzzle.\n\n\
        Pieces are dealt from a shuffled bag so every shape appears once per cycle. \
        With --extra-shapes, a single-cell DOT may appear instead with a small probability; when it lands it sinks \
        through its column to the lowest empty cell.\n\n\
        CONTROLS:\n  Left/Right (h/l)  Move     Up (k)     Rotate     Down (j)   Soft drop\n  Space/Enter       Hard drop   P          Pause      R          Restart   Q / Esc  Quit"
)]
pub struct Args {
    /// Add the extended shapes (U, P, W, V, X, Y) to the bag.
    #[arg(short = 'x', long)]
    pub extra_shapes: bool,

    /// Chance per draw that the DOT piece is dealt instead of the bag, with --extra-shapes (0 disables it).
    #[arg(short = 'd', long, default_value = "0.05", value_name = "P")]
    pub special_probability: f64,

    /// Playfield width in columns.
    #[arg(long, default_value_t = DEFAULT_COLS, value_name = "COLS")]
    pub width: usize,

    /// Playfield height in rows.
    #[arg(long, default_value_t = DEFAULT_ROWS, value_name = "ROWS")]
    pub height: usize,

    /// Seed the randomizer for a reproducible piece sequence.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette for pieces: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Name recorded on the leaderboard.
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Disable the line-clear fade.
    #[arg(long)]
    pub no_animation: bool,

    /// Print the leaderboard and exit.
    #[arg(long)]
    pub list_scores: bool,
}

impl Args {
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            shapes: if self.extra_shapes {
                ShapeSet::Extended
            } else {
                ShapeSet::Standard
            },
            special_probability: self.special_probability,
            rows: self.height,
            cols: self.width,
            ..GameConfig::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
