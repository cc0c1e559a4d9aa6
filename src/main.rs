use anyhow::{Context, Result};
use cdp_admin::adapters::store::{FirestoreStore, MemoryStore};
use cdp_admin::ports::DocumentStorePort;
use cdp_admin::services::{
    BodyService, EventService, FileService, SessionService, TranscriptService,
};
use cdp_admin::{AppError, FirebaseConfig};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "cdp-admin")]
#[command(version)]
#[command(about = "Inspect the bodies, events, sessions and transcripts of a meeting archive", long_about = None)]
struct Cli {
    /// Read documents from a JSON fixture instead of Firestore
    #[arg(long, value_name = "FILE", env = "CDP_ADMIN_FIXTURE", conflicts_with = "config")]
    fixture: Option<PathBuf>,

    /// Firebase config file; the environment is used when omitted
    #[arg(short, long, value_name = "FILE", env = "CDP_FIREBASE_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all bodies by name
    Bodies,

    /// Show one body
    Body { id: String },

    /// List the events of a body, newest first
    Events {
        #[arg(long, value_name = "BODY_ID")]
        body: String,
    },

    /// Show one event with its body and thumbnails
    Event { id: String },

    /// List the sessions of an event
    Sessions {
        #[arg(long, value_name = "EVENT_ID")]
        event: String,
    },

    /// List the transcripts of a session, newest first
    Transcripts {
        #[arg(long, value_name = "SESSION_ID")]
        session: String,
    },

    /// Show one file
    File { id: String },
}

/// Application state shared by the commands
struct AppState {
    store: Arc<dyn DocumentStorePort>,
}

/// Initialize the application
///
/// Picks the document store: a fixture file when given, Firestore otherwise.
fn initialize_app(cli: &Cli) -> Result<AppState> {
    let store: Arc<dyn DocumentStorePort> = match (&cli.fixture, &cli.config) {
        (Some(path), _) => Arc::new(
            MemoryStore::from_fixture_file(path)
                .with_context(|| format!("failed to load fixture {}", path.display()))?,
        ),
        (None, Some(path)) => {
            let config = FirebaseConfig::from_json_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            Arc::new(FirestoreStore::new(config)?)
        }
        (None, None) => {
            let config = FirebaseConfig::from_env().context("no Firebase configuration")?;
            Arc::new(FirestoreStore::new(config)?)
        }
    };

    Ok(AppState { store })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", output);
    Ok(())
}

fn found<T>(value: Option<T>, what: &str, id: &str) -> Result<T> {
    value.ok_or_else(|| AppError::NotFound(format!("{} {}", what, id)).into())
}

async fn run(cli: Cli, state: AppState) -> Result<()> {
    let store = state.store;
    match &cli.command {
        Commands::Bodies => {
            let bodies = BodyService::new(store).get_all_bodies().await?;
            print_json(&bodies, cli.pretty)
        }
        Commands::Body { id } => {
            let body = BodyService::new(store).get_body_by_id(id).await?;
            print_json(&found(body, "body", id)?, cli.pretty)
        }
        Commands::Events { body } => {
            let events = EventService::new(store).get_events_by_body_id(body).await?;
            print_json(&events, cli.pretty)
        }
        Commands::Event { id } => {
            let event = EventService::new(store).get_event_by_id(id).await?;
            print_json(&found(event, "event", id)?, cli.pretty)
        }
        Commands::Sessions { event } => {
            let sessions = SessionService::new(store)
                .get_sessions_by_event_id(event)
                .await?;
            print_json(&sessions, cli.pretty)
        }
        Commands::Transcripts { session } => {
            let transcripts = TranscriptService::new(store)
                .get_transcripts_by_session_id(session)
                .await?;
            print_json(&transcripts, cli.pretty)
        }
        Commands::File { id } => {
            let file = FileService::new(store).get_file_by_id(id).await?;
            print_json(&found(file, "file", id)?, cli.pretty)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let state = initialize_app(&cli)?;
    run(cli, state).await
}
