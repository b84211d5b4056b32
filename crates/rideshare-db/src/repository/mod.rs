//! # Repository Module
//!
//! Typed access to the `kv_store` table.
//!
//! ```text
//! RideRepository ────┐
//!                    ├──► KvRepository ──► kv_store
//! AccountRepository ─┘
//! ```
//!
//! - [`KvRepository`](kv::KvRepository) - raw string values, JSON helpers
//! - [`RideRepository`](rides::RideRepository) - the `rides` collection
//! - [`AccountRepository`](accounts::AccountRepository) - `accounts` and `user`
//! - [`StoreTransaction`](store::StoreTransaction) - locked read-modify-write of all three

pub mod accounts;
pub mod kv;
pub mod rides;
pub mod store;
