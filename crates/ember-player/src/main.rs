//! Ember - particle fountain demo
//!
//! Usage:
//!   ember [--config <particles.toml>] [--texture <sprite.png>] [--particles N]
//!   ember snapshot --frames 120 --output fountain.png
//!   ember config > particles.toml

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ember_particles::{rand::time_seed, ParticleConfig};
use ember_player::{run_snapshot, PlayerApp, PlayerOptions, SnapshotOptions};
use ember_runtime::{MAX_FPS, MIN_FPS};
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "Particle fountain rendered as camera-facing point sprites", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Particle config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sprite texture (any format the image crate reads); a soft dot is generated if omitted
    #[arg(long, global = true)]
    texture: Option<PathBuf>,

    /// Override the particle count from the config
    #[arg(long, global = true)]
    particles: Option<usize>,

    /// Random seed (defaults to the wall clock)
    #[arg(long, global = true)]
    seed: Option<u32>,

    /// Target frames per second
    #[arg(long, global = true, default_value_t = 50.0)]
    fps: f64,

    /// Render as fast as possible instead of holding the target frame rate
    #[arg(long)]
    no_pacing: bool,

    /// Launch in fullscreen mode
    #[arg(long)]
    fullscreen: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render offscreen and save the final frame as an image
    Snapshot {
        /// Frames to simulate before capturing
        #[arg(long, default_value_t = 120)]
        frames: u32,

        /// Image width in pixels
        #[arg(long, default_value_t = 1024)]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value_t = 768)]
        height: u32,

        /// Output image path
        #[arg(long, default_value = "ember.png")]
        output: PathBuf,
    },

    /// Print the effective particle config as TOML
    Config,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = player_options(&cli)?;

    match cli.command {
        None => run_window(options),
        Some(Commands::Snapshot {
            frames,
            width,
            height,
            output,
        }) => run_snapshot(
            &options,
            &SnapshotOptions {
                frames,
                width,
                height,
                output,
            },
        ),
        Some(Commands::Config) => {
            let text = options
                .config
                .to_toml_string()
                .context("Failed to serialise config")?;
            print!("{text}");
            Ok(())
        }
    }
}

fn player_options(cli: &Cli) -> Result<PlayerOptions> {
    let mut config = match &cli.config {
        Some(path) => ParticleConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ParticleConfig::default(),
    };
    if let Some(count) = cli.particles {
        config.count = count;
    }
    config.validate().context("Invalid particle config")?;

    let seed = cli.seed.unwrap_or_else(time_seed);
    if !(MIN_FPS..=MAX_FPS).contains(&cli.fps) {
        log::warn!("[ember] --fps {} outside {MIN_FPS}..={MAX_FPS}, clamping", cli.fps);
    }
    log::info!("[ember] {} particles, seed {seed}", config.count);

    Ok(PlayerOptions {
        config,
        texture: cli.texture.clone(),
        seed,
        fps: cli.fps,
        pacing: !cli.no_pacing,
        fullscreen: cli.fullscreen,
    })
}

fn run_window(options: PlayerOptions) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = PlayerApp::new(options);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
