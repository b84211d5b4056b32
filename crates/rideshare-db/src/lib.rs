//! # rideshare-db: Persistence Layer for the Rideshare Demo
//!
//! Stores the ride ledger, the account directory and the current session in
//! SQLite via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rideshare Data Flow                              │
//! │                                                                         │
//! │  CLI command (accept)                                                  │
//! │       │  mutate RideLedger in memory, then save the whole collection   │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  rideshare-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │ SqlitePool    │◄───│ KvRepository  │    │ 001_init.sql │  │   │
//! │  │   │               │    │ RideRepo      │    │              │  │   │
//! │  │   │               │    │ AccountRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  kv_store(key, value, updated_at)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Key-value, ride and account repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rideshare_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("rideshare.db")).await?;
//! let rides = db.rides().load_all().await?.unwrap_or_default();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::accounts::AccountRepository;
pub use repository::kv::KvRepository;
pub use repository::rides::RideRepository;
pub use repository::store::StoreTransaction;
