//! # Rideshare CLI Library
//!
//! The application layer of the rideshare demo. It plays the part of the
//! browser front-end: every subcommand is one button press.
//!
//! ## Module Organization
//! ```text
//! rideshare_cli/
//! ├── lib.rs          ◄─── You are here (startup, logging)
//! ├── cli.rs          ◄─── clap arguments and dispatch
//! ├── state/
//! │   ├── config.rs   ◄─── AppConfig (defaults → TOML → env)
//! │   ├── db.rs       ◄─── DbState (restore, serialized writes)
//! │   ├── ledger.rs   ◄─── LedgerState (Arc<Mutex<RideLedger>>)
//! │   └── session.rs  ◄─── SessionState (Arc<Mutex<SessionStore>>)
//! ├── commands/       ◄─── auth, account, route, ride, admin
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize Logging ──► stderr, RUST_LOG or                          │
//! │                            "info,rideshare=debug,sqlx=warn"             │
//! │  2. Load Configuration ──► defaults → rideshare.toml → RIDESHARE_*      │
//! │  3. Open Database ───────► --db, config, or the platform data dir       │
//! │                            (WAL, migrations)                            │
//! │  4. Restore State ───────► rides, accounts, session                     │
//! │                            (seed demo data into an empty store)         │
//! │  5. Run Command ─────────► JSON on stdout, ApiError JSON on stderr      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use rideshare_db::{Database, DbConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::ApiError;
use state::{AppConfig, DbState, LedgerState, SessionState};

/// Everything a command may need, built once per process.
#[derive(Debug)]
pub struct App {
    pub config: AppConfig,
    pub db: DbState,
    pub ledger: LedgerState,
    pub session: SessionState,
}

impl App {
    /// Opens the database and restores the ledger and session.
    ///
    /// `db_path` overrides the configured path; `:memory:` gives a throwaway
    /// store.
    pub async fn open(db_path: Option<PathBuf>, config: AppConfig) -> Result<Self, ApiError> {
        let path = match db_path {
            Some(path) => path,
            None => config.database_path()?,
        };
        info!(path = %path.display(), "Database path determined");

        let db = DbState::new(Database::new(DbConfig::from_path(path)).await?);
        let (ledger, session) = db.restore(&config).await?;

        Ok(App {
            config,
            db,
            ledger,
            session,
        })
    }

    /// Closes the connection pool.
    pub async fn close(self) {
        self.db.inner().close().await;
    }
}

/// Loads configuration, runs one command, and returns its pretty JSON output.
pub async fn run(cli: Cli) -> Result<String, ApiError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let app = App::open(cli.db, config).await?;

    let result = cli::execute(&app, cli.command).await;
    app.close().await;

    Ok(serde_json::to_string_pretty(&result?)?)
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout stays valid JSON.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=rideshare=trace` - Show trace for rideshare crates only
/// - Default: INFO, DEBUG for rideshare crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rideshare=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
