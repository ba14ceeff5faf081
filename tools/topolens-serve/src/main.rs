// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! topolens-serve - standalone REST server for an emulated topology
//!
//! Builds an in-memory topology from a template and serves it read-only over
//! HTTP. The main thread plays the part of the emulation's control loop and
//! can keep mutating the model while the API is being queried.
//!
//! # Usage
//!
//! ```bash
//! # Default: minimal topology on port 8080, /api/v1/ endpoints
//! topolens-serve
//!
//! # Tree topology, unprefixed endpoints
//! topolens-serve --topo tree,2,3 --minimal
//!
//! # Churn a transient host every 500ms
//! topolens-serve --topo linear,4 --churn-ms 500
//!
//! # Using config file
//! topolens-serve --config topolens.toml
//! ```

mod topo;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use topo::TopoSpec;
use topolens::{RestServer, RouteSet, ServerConfig, Topology, TopologyView};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const READY_TIMEOUT: Duration = Duration::from_secs(5);
const CHURN_HOST: &str = "hx";

/// Standalone topolens REST server
#[derive(Parser, Debug)]
#[command(name = "topolens-serve")]
#[command(about = "Serve a read-only REST view of an emulated topology")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP server port (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve the unprefixed minimal route set
    #[arg(long)]
    minimal: bool,

    /// Topology template: minimal, single,N, linear,N, tree,DEPTH[,FANOUT]
    #[arg(short, long, default_value = "minimal")]
    topo: String,

    /// Allow cross-origin requests
    #[arg(long)]
    cors: bool,

    /// Add/remove a transient host every N milliseconds (0 to disable)
    #[arg(long, default_value = "0")]
    churn_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "topolens.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Some(cmd) = &args.command {
        return match cmd {
            Commands::GenConfig { output } => cmd_gen_config(output),
            Commands::Validate { config } => cmd_validate(config),
        };
    }

    let config = build_config(&args)?;
    let spec: TopoSpec = args.topo.parse()?;
    let topology = Topology::new();
    spec.build(&topology)?;

    info!("topolens-serve v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Topology '{}': {} nodes, {} links",
        args.topo,
        topology.node_count(),
        topology.link_count()
    );
    for node in topology.nodes() {
        debug!("  {} {}", node.kind, node.name);
    }

    let server = RestServer::new(config);
    for route in server.routes().routes() {
        info!("GET {}", route.path());
    }

    let mut handle = server.start(Arc::new(topology.clone()));
    handle.wait_ready(READY_TIMEOUT)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(control_loop(&topology, args.churn_ms))?;

    info!("Shutting down...");
    handle.stop();
    Ok(())
}

fn build_config(args: &Args) -> Result<ServerConfig, topolens::ConfigError> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    if let Some(port) = args.port {
        config.port = port;
    }
    if args.minimal {
        config.route_set = RouteSet::Minimal;
    }
    if args.cors {
        config.cors = true;
    }

    config.validate()?;
    Ok(config)
}

/// Wait for Ctrl+C, optionally churning the topology meanwhile.
async fn control_loop(topology: &Topology, churn_ms: u64) -> std::io::Result<()> {
    if churn_ms == 0 {
        return tokio::signal::ctrl_c().await;
    }

    let mut interval = tokio::time::interval(Duration::from_millis(churn_ms));
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => return result,
            _ = interval.tick() => churn(topology),
        }
    }
}

/// Toggle a transient host attached to the first switch.
fn churn(topology: &Topology) {
    if topology.remove_node(CHURN_HOST) {
        info!("churn: removed {}", CHURN_HOST);
        return;
    }

    let Some(switch) = topology.list_switches().into_iter().next() else {
        warn!("churn: no switch to attach {} to", CHURN_HOST);
        return;
    };
    let attached = topology
        .add_host(CHURN_HOST)
        .and_then(|_| topology.add_link(CHURN_HOST, &switch));
    match attached {
        Ok(link) => info!("churn: added {} ({} <-> {})", CHURN_HOST, link.intf1(), link.intf2()),
        Err(e) => warn!("churn: {}", e),
    }
}

fn cmd_gen_config(output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = ServerConfig::default().to_toml()?;
    std::fs::write(output, text)?;
    println!("Generated example configuration: {}", output.display());
    Ok(())
}

fn cmd_validate(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_file(path)?;
    println!("Configuration is valid");
    println!("  Port: {}", config.port);
    println!("  Route set: {:?}", config.route_set);
    println!("  Shutdown grace: {:?}", config.shutdown_grace());
    println!("  CORS: {}", config.cors);
    Ok(())
}
