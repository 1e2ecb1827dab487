use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_kernel::settings::{LoadOptions, Settings};

/// Command-line front end for the shelf book list service
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
struct Cli {
    /// Deployment environment (local, staging, production); overrides SHELF_ENV
    #[arg(long, global = true)]
    env: Option<String>,

    /// Directory holding base.toml and {env}.toml; overrides SHELF_CONFIG_DIR
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve {
        /// Port to listen on; overrides configuration
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the resolved configuration as JSON
    Settings,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_with(LoadOptions {
        environment: cli.env,
        config_dir: cli.config_dir,
    })
    .with_context(|| "failed to load shelf settings")?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Settings => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
        Command::Serve { port } => {
            let mut settings = settings;
            if let Some(port) = port {
                settings.server.port = port;
            }
            shelf_telemetry::init(&settings.telemetry)?;

            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(shelf_app::serve(settings))
        }
    }
}
