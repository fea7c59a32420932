//! PPM Dashboard server
//!
//! Run with: cargo run -- serve --demo
//!
//! # Configuration
//!
//! Config is read from `--config`, else `~/.config/ppm-dashboard/config.toml`
//! or `./ppm-dashboard.toml`. Environment variables override the file:
//! - `PPM_HOST`, `PPM_PORT`: Bind address
//! - `PPM_LOG_LEVEL`, `PPM_LOG_FORMAT`: Logging (`RUST_LOG` wins when set)
//! - `PPM_UTC_OFFSET_MINUTES`: Offset used to decide what "today" is
//! - `PPM_CURRENCY_PREFIX`: Asset total prefix

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ppm_dashboard::api::{serve, AppState};
use ppm_dashboard::auth::MemoryAuth;
use ppm_dashboard::backend::DocumentStore;
use ppm_dashboard::config::{generate_default_config, DashboardConfig};
use ppm_dashboard::demo::{demo_auth, seed_demo, DEMO_EMAIL};
use ppm_dashboard::logging::init_tracing;
use ppm_dashboard::page::PageKind;
use ppm_dashboard::render::{render_page, RenderOptions};

#[derive(Parser)]
#[command(name = "ppm-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live PPM dashboard with server-side page sessions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP and WebSocket server
    Serve {
        /// Seed demo collections and a demo account
        #[arg(long)]
        demo: bool,
    },

    /// Boot a page headless against demo data and print its display as JSON
    Render {
        /// Page to boot (dashboard, login)
        #[arg(default_value = "dashboard")]
        page: String,
        /// Location path, used for nav highlighting
        #[arg(long)]
        path: Option<String>,
        /// Viewport width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Render as signed out
        #[arg(long)]
        signed_out: bool,
        /// Milliseconds to let the page settle
        #[arg(long, default_value = "50")]
        settle_ms: u64,
        /// Render time (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Print the default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<DashboardConfig> {
    match path {
        Some(path) => DashboardConfig::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(DashboardConfig::load_default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { demo } => {
            let config = load_config(cli.config.as_ref())?;
            init_tracing(&config.logging);
            tracing::info!("Starting PPM dashboard v{}", env!("CARGO_PKG_VERSION"));

            let store = Arc::new(DocumentStore::default());
            let auth = if demo {
                let written = seed_demo(&store, Utc::now()).await?;
                tracing::info!(documents = written, account = DEMO_EMAIL, "Demo mode enabled");
                demo_auth()
            } else {
                MemoryAuth::new()
            };

            let server = config.server.clone();
            let state = AppState::new(store, Arc::new(auth), config);
            serve(state, &server).await?;
            tracing::info!("PPM dashboard stopped");
        }

        Commands::Render {
            page,
            path,
            width,
            signed_out,
            settle_ms,
            at,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let kind: PageKind = page.parse().map_err(anyhow::Error::msg)?;
            let now = match at {
                Some(at) => DateTime::parse_from_rfc3339(&at)
                    .with_context(|| format!("invalid --at time '{}'", at))?
                    .with_timezone(&Utc),
                None => Utc::now(),
            };

            let mut options = RenderOptions::new(kind, now);
            if let Some(path) = path {
                options.path = path;
            }
            options.viewport_width = width;
            options.signed_in = !signed_out;
            options.settle = Duration::from_millis(settle_ms);

            let report = render_page(options, config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}
