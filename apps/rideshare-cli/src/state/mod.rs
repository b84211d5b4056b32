//! # State Module
//!
//! Application state for the CLI, one type per concern so each command
//! declares exactly the state it touches.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Application State                               │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │   DbState    │  │ LedgerState  │  │ SessionState │  │ AppConfig  │  │
//! │  │              │  │              │  │              │  │            │  │
//! │  │  Database    │  │  Arc<Mutex<  │  │  Arc<Mutex<  │  │ read-only  │  │
//! │  │  + write     │  │  RideLedger>>│  │  Session-    │  │ after load │  │
//! │  │    gate      │  │              │  │  Store>>     │  │            │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  Examples:                                                              │
//! │  • whoami          → SessionState                                       │
//! │  • estimate        → AppConfig                                          │
//! │  • accept          → DbState + LedgerState + SessionState               │
//! │  • cancel-with-fee → DbState + LedgerState + SessionState               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod ledger;
mod session;

pub use config::{default_config_path, AppConfig, ConfigError, CONFIG_FILE_NAME};
pub use db::DbState;
pub use ledger::LedgerState;
pub use session::SessionState;
