use anyhow::{Context, Result};
use clap::Parser;
use liftoff_simulator::{Api, PlayerSeed, Simulator, SimulatorConfig};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host interface to bind (default: localhost).
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    #[arg(short, long, default_value_t = 8090)]
    port: u16,

    /// Player to register at startup, as `email:password:coins` (repeatable).
    #[arg(long = "player")]
    players: Vec<PlayerSeed>,

    /// YAML file with a `players` list to register at startup.
    #[arg(long)]
    players_file: Option<PathBuf>,

    /// Max queued record events in the broadcast channel (0 uses default).
    #[arg(long)]
    updates_broadcast_buffer: Option<usize>,

    /// Max queued WebSocket outbound messages per connection (0 uses default).
    #[arg(long)]
    ws_outbound_buffer: Option<usize>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: Level,
}

#[derive(Debug, Deserialize)]
struct PlayersFile {
    #[serde(default)]
    players: Vec<PlayerSeed>,
}

fn build_config(args: &Args) -> SimulatorConfig {
    SimulatorConfig {
        updates_broadcast_buffer: args.updates_broadcast_buffer,
        ws_outbound_buffer: args.ws_outbound_buffer,
    }
}

fn load_players_file(path: &Path) -> Result<Vec<PlayerSeed>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read players file {}", path.display()))?;
    let file: PlayersFile = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse players file {}", path.display()))?;
    Ok(file.players)
}

fn init_tracing(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse args
    let args = Args::parse();

    // Create logger
    init_tracing(args.log_level);

    let mut seeds = match &args.players_file {
        Some(path) => load_players_file(path)?,
        None => Vec::new(),
    };
    seeds.extend(args.players.iter().cloned());

    let simulator = Arc::new(Simulator::new_with_config(build_config(&args)));
    for seed in seeds {
        simulator.add_player(seed).await;
    }
    if simulator.player_count().await == 0 {
        tracing::warn!("no players registered; pass --player email:password:coins");
    }

    let api = Api::new(simulator);
    let app = api.router();

    // Start server
    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", addr);
    axum::serve(listener, app)
        .await
        .context("axum server error")?;

    Ok(())
}
