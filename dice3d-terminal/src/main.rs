/// Dice3D Terminal - Interactive 3D dice
///
/// Controls:
///   - WASD / Arrow Keys: Flick the die
///   - 1-6: Roll to a value, R: random roll, B: random bounce roll
///   - P: Freeze the outer layer, L: Lock layer 1
///   - Q/ESC: Quit
use anyhow::Context;
use clap::Parser;
use dice3d_core::SimulationSettings;
use dice3d_terminal::{Preset, TerminalApp};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dice3d-terminal", version, about = "Interactive 3D dice in the terminal")]
struct Args {
    /// JSON file with simulation settings; missing fields use defaults
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Write logs to this file (the terminal itself is busy drawing)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Layer stack to show
    #[arg(long, value_enum, default_value_t = Preset::Classic)]
    layers: Preset,

    /// Seed for roll directions
    #[arg(long)]
    seed: Option<u64>,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dice3d_core=debug,dice3d_terminal=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<SimulationSettings> {
    let Some(path) = path else {
        return Ok(SimulationSettings::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings {}", path.display()))?;
    SimulationSettings::from_json_str(&json)
        .with_context(|| format!("invalid settings in {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let settings = load_settings(args.settings.as_deref())?;
    let layers = args
        .layers
        .layers()
        .with_context(|| format!("failed to build {:?} layers", args.layers))?;
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, preset = ?args.layers, fps = args.fps, "starting");

    let mut app = TerminalApp::new(layers, settings, seed, args.fps)?;
    app.run().context("terminal session failed")?;

    println!("Thanks for rolling!");
    Ok(())
}
