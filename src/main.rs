//! Serpentui — arcade snake in the terminal: wraparound grid, obstacles,
//! boost pads, timed powerups.

mod app;
mod game;
mod highscores;
mod input;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};

/// Options that reach the simulation (board size, entity counts, speed).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub cols: u16,
    pub rows: u16,
    pub obstacles: usize,
    pub boost_pads: usize,
    pub speed: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig {
        cols: args.cols,
        rows: args.rows,
        obstacles: args.obstacles,
        boost_pads: args.boost_pads,
        speed: args.speed,
    };
    let mut app = App::new(&args, config, theme)?;
    app.run()?;
    Ok(())
}

/// Arcade snake in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "serpentui",
    version,
    about = "Arcade snake in the terminal. Eat food, dodge the walls, grab powerups; the board wraps around.",
    long_about = "Serpentui is a terminal snake arcade game.\n\n\
        Steer the snake across a wraparound board: food grows the snake, obstacles kill it, \
        boost pads speed it up, and timed powerups grant a longer boost (C), bonus points (T) \
        or ghost mode (F) that lets the snake pass through itself.\n\n\
        CONTROLS (normal):\n  Arrows/WASD  Steer    Space/P  Pause    R  Reset\n  +/-          Speed   Q / Esc  Quit\n\n\
        CONTROLS (vim):\n  h/j/k/l      Steer\n\n\
        The best score is kept in your config directory. Use --theme to load a btop-style \
        theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Board width in grid cells.
    #[arg(long, default_value = "30", value_name = "COLS")]
    pub cols: u16,

    /// Board height in grid cells.
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub rows: u16,

    /// Number of fatal obstacles placed per game.
    #[arg(long, default_value = "12", value_name = "N")]
    pub obstacles: usize,

    /// Number of boost pads placed per game.
    #[arg(long, default_value = "10", value_name = "N")]
    pub boost_pads: usize,

    /// Initial speed setting (0-30); higher is faster. Adjustable in game with +/-.
    #[arg(short, long, default_value = "10", value_name = "SPEED")]
    pub speed: u32,

    /// Simulation ticks per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub tick_rate: f64,

    /// Path to theme file (btop-style theme[key]="value"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,
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
