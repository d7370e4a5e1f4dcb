//! Engagement vision: replays recorded face observations and publishes
//! gaze, smile, head size, novelty and motion events.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use engagement_vision::{
    app::VisionApp,
    config::{Config, EventOutput, EXAMPLE_CONFIG},
};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EventsArg {
    Stdout,
    File,
    Log,
}

impl From<EventsArg> for EventOutput {
    fn from(arg: EventsArg) -> Self {
        match arg {
            EventsArg::Stdout => Self::Stdout,
            EventsArg::File => Self::File,
            EventsArg::Log => Self::Log,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded observation stream (JSON Lines)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Event output
    #[arg(short, long, value_enum)]
    events: Option<EventsArg>,

    /// Event file when `--events file` is used
    #[arg(long)]
    events_path: Option<PathBuf>,

    /// Write contact samples to this JSON Lines file
    #[arg(long)]
    contacts: Option<PathBuf>,

    /// Replay pacing in frames per second (0 for as fast as possible)
    #[arg(long)]
    frame_rate: Option<u32>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(input) = self.input {
            config.input.path = Some(input);
        }
        if let Some(events) = self.events {
            config.output.events = events.into();
        }
        if let Some(path) = self.events_path {
            config.output.events_path = Some(path);
        }
        if let Some(path) = self.contacts {
            config.output.contacts_path = Some(path);
        }
        if let Some(rate) = self.frame_rate {
            config.input.frame_rate = rate;
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Engagement vision");

    // Load configuration if provided
    let mut config = match &args.config {
        Some(config_path) => {
            info!("Loading configuration from: {}", config_path.display());
            match Config::from_file(config_path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!("Failed to load config file: {e}. Using defaults.");
                    Config::default()
                }
            }
        }
        None => Config::default(),
    };
    args.apply(&mut config);

    // Create and run application
    let mut app = VisionApp::from_config(&config).context("Failed to start pipeline")?;
    let summary = app.run()?;
    info!(
        "Done: {} frames, {} events, {} contact samples, {} sessions",
        summary.frames, summary.events_published, summary.contacts, summary.sessions
    );

    Ok(())
}
