// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Lattice Gateway CLI
//!
//! The `lattice` binary serves compiled aggregate APIs over HTTP and offers a
//! few offline commands against the same Domain Store.
//!
//! ## Commands
//!
//! - `lattice serve` - Start the HTTP server (default when no command is given)
//! - `lattice schema --domain --context --aggregate --version` - Print compiled schema text
//! - `lattice route --host --url` - Resolve the backend view for a request
//! - `lattice config show` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lattice_core::domain::gateway_config::GatewayConfig;
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Level used until the configuration file has been read.
const BOOTSTRAP_LOG_LEVEL: &str = "info";

mod commands;

use commands::ConfigCommand;

/// Lattice - Aggregate API gateway
#[derive(Parser, Debug)]
#[command(name = "lattice")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "LATTICE_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// HTTP listen host (overrides configuration)
    #[arg(long, env = "LATTICE_HOST")]
    host: Option<String>,

    /// HTTP listen port (overrides configuration)
    #[arg(long, env = "LATTICE_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "LATTICE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    #[command(name = "serve")]
    Serve,

    /// Print the compiled schema of one aggregate version
    #[command(name = "schema")]
    Schema {
        /// Domain id in the Domain Store
        #[arg(long)]
        domain: String,

        /// Bounded context name
        #[arg(long)]
        context: String,

        /// Aggregate name
        #[arg(long)]
        aggregate: String,

        /// Aggregate version label
        #[arg(long)]
        version: String,
    },

    /// Resolve the backend view for a host and URL
    #[command(name = "route")]
    Route {
        #[arg(long)]
        host: String,

        #[arg(long)]
        url: String,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging comes up first so configuration discovery is logged too.
    let logging = init_logging(cli.log_level.as_deref().unwrap_or(BOOTSTRAP_LOG_LEVEL))?;

    let config = load_config(&cli)?;
    logging.set_level(&config.log_level)?;

    match cli.command {
        None | Some(Commands::Serve) => commands::serve::run(config).await,
        Some(Commands::Schema {
            domain,
            context,
            aggregate,
            version,
        }) => commands::schema::run(&config, &domain, &context, &aggregate, &version).await,
        Some(Commands::Route { host, url }) => {
            commands::route::run(&config, &host, &url).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config, &config).await
        }
    }
}

fn load_config(cli: &Cli) -> Result<GatewayConfig> {
    let mut config = GatewayConfig::load_or_default(cli.config.clone())
        .context("Failed to load configuration")?;
    apply_cli_overrides(&mut config, cli);
    Ok(config)
}

/// Global flags win over the configuration file.
fn apply_cli_overrides(config: &mut GatewayConfig, cli: &Cli) {
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
}

/// Handle to the installed log filter.
struct LogLevel {
    handle: reload::Handle<EnvFilter, Registry>,
    /// `RUST_LOG` was set and takes precedence over any configured level.
    from_env: bool,
}

impl LogLevel {
    fn set_level(&self, level: &str) -> Result<()> {
        if self.from_env {
            return Ok(());
        }
        let filter = EnvFilter::try_new(level).context("Failed to create log filter")?;
        self.handle
            .reload(filter)
            .context("Failed to update log filter")
    }
}

fn build_subscriber<W>(level: &str, writer: W) -> Result<(impl Subscriber + Send + Sync + 'static, LogLevel)>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (
            EnvFilter::try_new(level).context("Failed to create log filter")?,
            false,
        ),
    };
    let (filter, handle) = reload::Layer::new(filter);

    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact(),
    );

    Ok((subscriber, LogLevel { handle, from_env }))
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<LogLevel> {
    let (subscriber, log_level) = build_subscriber(level, std::io::stderr)?;
    subscriber.init();
    Ok(log_level)
}
