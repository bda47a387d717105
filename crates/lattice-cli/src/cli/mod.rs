//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lattice_core::{Config, PageManifest, logging};

mod commands;

#[derive(Parser)]
#[command(name = "lattice")]
#[command(version)]
#[command(about = "Viewport-triggered page animation and live network metrics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Page manifest to load (default: built-in LatticePress page)
    #[arg(long, global = true, value_name = "FILE")]
    page: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the page on a virtual clock, scrolling from top to bottom
    Simulate {
        /// Virtual time to run for
        #[arg(long, default_value_t = 10_000)]
        duration_ms: u64,

        /// Pixels scrolled per step
        #[arg(long, value_name = "PX", default_value_t = 16.0)]
        scroll_step: f64,

        /// Virtual time between scroll steps
        #[arg(long, value_name = "MS", default_value_t = 16)]
        step_ms: u64,

        /// Viewport height in pixels
        #[arg(long, value_name = "PX", default_value_t = 800.0)]
        viewport_height: f64,

        /// Print every effect with its timestamp
        #[arg(long)]
        trace: bool,
    },

    /// Stream the live network savings feed to stdout
    Live {
        /// How long to run (Ctrl+C stops early)
        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },

    /// Send one demo payload to the intercept sidecar
    Intercept {
        /// Hex payload (default: [intercept].payload_hex)
        #[arg(long, value_name = "HEX")]
        payload: Option<String>,

        /// Sidecar base URL (default: [intercept].base_url)
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, page } = cli;

    // Config commands must work even when the config file is broken.
    if let Some(Commands::Config { command }) = &command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        };
    }

    let config = Config::load().context("load config")?;
    let manifest = PageManifest::load_or_builtin(page.as_deref())?;

    // default to the interactive viewer
    let Some(command) = command else {
        return commands::view::run(&config, &manifest);
    };

    logging::init_stderr(config.log.filter.as_deref())?;

    match command {
        Commands::Simulate {
            duration_ms,
            scroll_step,
            step_ms,
            viewport_height,
            trace,
        } => commands::simulate::run(
            &config,
            &manifest,
            &commands::simulate::SimulateOptions {
                duration_ms,
                scroll_step,
                step_ms,
                viewport_height,
                trace,
            },
        ),
        Commands::Live { seconds } => commands::live::run(&config, seconds).await,
        Commands::Intercept { payload, base_url } => {
            commands::intercept::run(&config, payload.as_deref(), base_url.as_deref()).await
        }
        Commands::Config { .. } => Ok(()),
    }
}
