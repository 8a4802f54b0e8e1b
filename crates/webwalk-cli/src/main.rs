//! webwalk CLI - randomized bounded walks over a web application
//!
//! Usage:
//!   webwalk walk <url>           Run a walk from a start URL
//!   webwalk catalog              Print the built-in action catalog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use webwalk_browser::{BrowserConfig, BrowserSession, ProxyConfig};
use webwalk_core::WalkConfig;
use webwalk_engine::{shop_walk_catalog, Walker};

#[derive(Parser)]
#[command(name = "webwalk")]
#[command(author, version, about = "Randomized bounded walks over a web application")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a walk from a start URL
    Walk {
        /// URL the walk starts from
        url: String,

        /// Configuration file (TOML)
        #[arg(long, default_value = "webwalk.toml")]
        config: PathBuf,

        /// Maximum execution attempts
        #[arg(long)]
        max_steps: Option<usize>,

        /// Minimum inter-step wait in milliseconds
        #[arg(long)]
        min_wait: Option<u64>,

        /// Maximum inter-step wait in milliseconds
        #[arg(long)]
        max_wait: Option<u64>,

        /// Walk actions in catalog order instead of randomly
        #[arg(long)]
        sequential: bool,

        /// Maximum distinct visited locations
        #[arg(long)]
        max_visited: Option<usize>,

        /// Directory for diagnostic screenshots
        #[arg(long)]
        screenshot_dir: Option<PathBuf>,

        /// Run the browser with a visible window
        #[arg(long)]
        headed: bool,

        /// Attach to a browser already listening on this debug port
        #[arg(long)]
        connect: Option<u16>,

        /// Seed the RNG for a reproducible walk
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the built-in action catalog
    Catalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Walk {
            url,
            config,
            max_steps,
            min_wait,
            max_wait,
            sequential,
            max_visited,
            screenshot_dir,
            headed,
            connect,
            seed,
        } => {
            let overrides = WalkOverrides {
                max_steps,
                min_wait,
                max_wait,
                sequential,
                max_visited,
                screenshot_dir,
            };
            cmd_walk(url, config, overrides, headed, connect, seed).await
        }
        Commands::Catalog => cmd_catalog(),
    }
}

/// Command-line knobs layered over the config file
struct WalkOverrides {
    max_steps: Option<usize>,
    min_wait: Option<u64>,
    max_wait: Option<u64>,
    sequential: bool,
    max_visited: Option<usize>,
    screenshot_dir: Option<PathBuf>,
}

impl WalkOverrides {
    fn apply(self, mut config: WalkConfig) -> WalkConfig {
        if let Some(v) = self.max_steps {
            config.max_steps = v;
        }
        if let Some(v) = self.min_wait {
            config.min_wait_ms = v;
        }
        if let Some(v) = self.max_wait {
            config.max_wait_ms = v;
        }
        if self.sequential {
            config.random_order = false;
        }
        if let Some(v) = self.max_visited {
            config.max_visited_locations = v;
        }
        if let Some(v) = self.screenshot_dir {
            config.screenshot_dir = v;
        }
        config
    }
}

async fn cmd_walk(
    url: String,
    config_path: PathBuf,
    overrides: WalkOverrides,
    headed: bool,
    connect: Option<u16>,
    seed: Option<u64>,
) -> Result<()> {
    let config = WalkConfig::load_or_default(&config_path)
        .context("Failed to load configuration")?
        .apply_env_overrides()?;
    let config = overrides.apply(config);
    config.validate()?;

    let session = match connect {
        Some(port) => {
            info!("Attaching to browser on port {}", port);
            BrowserSession::connect(port).await?
        }
        None => {
            let browser_config = BrowserConfig {
                headless: BrowserConfig::resolve_headless(headed),
                proxy: ProxyConfig::resolve_from_env(),
                ..Default::default()
            };
            BrowserSession::launch_with_config(browser_config).await?
        }
    };

    let catalog = shop_walk_catalog()?;
    let mut walker = Walker::new(session, catalog, config)?;
    if let Some(seed) = seed {
        walker = walker.with_rng_seed(seed);
    }

    let outcome = walker.walk(&url).await;
    walker.into_page().close().await?;
    let report = outcome.context("Walk failed")?;

    println!("Walk finished: {}", report.stop_reason);
    println!("  steps:   {}", report.steps);
    println!("  visited: {} location(s)", report.visited_locations.len());
    for location in &report.visited_locations {
        println!("    {}", location);
    }
    Ok(())
}

fn cmd_catalog() -> Result<()> {
    let catalog = shop_walk_catalog()?;
    for rule in catalog.rules() {
        println!("[{}] {} ({})", rule.priority, rule.description, rule.matcher);
        for action in &rule.actions {
            let marker = if action.required { "*" } else { " " };
            println!("  {}{}", marker, action.name);
            for locator in &action.locators {
                println!("      {}", locator);
            }
        }
    }
    Ok(())
}
