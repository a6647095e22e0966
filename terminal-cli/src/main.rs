use anyhow::{bail, Context, Result};
use clap::Parser;
use liftoff_client::Client;
use liftoff_game::{Session, SessionConfig, SessionHandle};
use liftoff_types::PlayerId;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{warn, Level};

mod commands;
mod render;

use commands::{Command, HELP};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8090";
const DEFAULT_LOG_LEVEL: &str = "warn";

/// CLI flags (override values from the config file)
#[derive(Parser, Debug)]
#[command(name = "liftoff", version, about = "Play liftoff from the terminal")]
struct Args {
    /// YAML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Record store URL.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// Existing auth token (used instead of e-mail and password).
    #[arg(long)]
    token: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

/// Contents of the `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    base_url: Option<String>,
    email: Option<String>,
    password: Option<String>,
    token: Option<String>,
    log_level: Option<String>,
    json_logs: Option<bool>,
    session: Option<SessionConfig>,
}

#[derive(Debug)]
enum Credentials {
    Password { email: String, password: String },
    Token(String),
}

#[derive(Debug)]
struct Settings {
    base_url: String,
    credentials: Credentials,
    log_level: Level,
    json_logs: bool,
    session: SessionConfig,
}

impl Settings {
    fn resolve(args: Args, file: FileConfig) -> Result<Self> {
        let log_level = args
            .log_level
            .or(file.log_level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let log_level = Level::from_str(&log_level).context("Invalid log level")?;

        let credentials = match (
            args.token.or(file.token),
            args.email.or(file.email),
            args.password.or(file.password),
        ) {
            (Some(token), _, _) => Credentials::Token(token),
            (None, Some(email), Some(password)) => Credentials::Password { email, password },
            _ => bail!("provide --token, or --email and --password"),
        };

        Ok(Self {
            base_url: args
                .base_url
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            credentials,
            log_level,
            json_logs: args.json_logs || file.json_logs.unwrap_or(false),
            session: file.session.unwrap_or_else(SessionConfig::from_env),
        })
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read config file {}", path.display()))?;
    serde_yaml::from_str(&raw).context("Could not parse config file")
}

fn init_tracing(level: Level, json: bool) {
    // stdout is reserved for the game
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn sign_in(client: Client, credentials: &Credentials) -> Result<(Client, PlayerId)> {
    let (client, auth) = match credentials {
        Credentials::Password { email, password } => {
            let auth = client
                .auth_with_password(email, password)
                .await
                .context("Sign-in failed")?;
            (client, auth)
        }
        Credentials::Token(token) => {
            let client = client.with_token(token.clone());
            let auth = client.auth_refresh().await.context("Token refresh failed")?;
            (client, auth)
        }
    };
    Ok((client, auth.record.id))
}

/// Print every notable snapshot change until the session closes.
async fn render_loop(session: SessionHandle) {
    let mut snapshots = session.subscribe();
    let mut previous = snapshots.borrow_and_update().clone();
    println!("{}", render::status_line(&previous));
    while snapshots.changed().await.is_ok() {
        let next = snapshots.borrow_and_update().clone();
        if render::is_notable(&previous, &next) {
            if let Some(error) = next.error.as_ref().filter(|_| previous.error != next.error) {
                println!("! {error}");
            }
            println!("{}", render::status_line(&next));
        }
        previous = next;
    }
}

async fn apply(session: &mut SessionHandle, command: Command) -> bool {
    match command {
        Command::Stake(amount) => session.set_stake_amount(amount).await,
        Command::Bet => match session.place_stake().await {
            Ok(()) => println!("stake placed"),
            Err(err) => println!("! {err}"),
        },
        Command::CashOut => match session.cash_out().await {
            Some(winnings) => println!("cashed out {winnings}"),
            None => println!("nothing to cash out"),
        },
        Command::ClearError => session.clear_error().await,
        Command::Refresh => {
            if !session.refresh_balance().await {
                println!("! balance not refreshed");
            }
        }
        Command::Reset => {
            if let Err(err) = session.reset().await {
                println!("! {err}");
            }
        }
        Command::Width(width) => session.resize_viewport(width).await,
        Command::Status => println!("{}", render::status_line(&session.snapshot())),
        Command::History => println!("{}", render::history_line(&session.snapshot())),
        Command::Help => println!("{HELP}"),
        Command::Quit => return false,
    }
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse args
    let args = Args::parse();
    let file = match &args.config {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(args, file)?;

    // Create logger
    init_tracing(settings.log_level, settings.json_logs);

    // Sign in
    let client = Client::new(&settings.base_url).context("Invalid base URL")?;
    let (client, player) = sign_in(client, &settings.credentials).await?;

    // Start session
    let mut session = Session::spawn(client, player, settings.session)
        .await
        .context("Failed to start session")?;
    let renderer = tokio::spawn(render_loop(session.clone()));
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match Command::parse(&line) {
            Ok(command) => {
                if !apply(&mut session, command).await {
                    break;
                }
            }
            Err(err) => println!("! {err}"),
        }
    }

    session.teardown().await;
    if let Err(err) = renderer.await {
        warn!(?err, "renderer failed");
    }
    Ok(())
}
