//! # Ride Repository
//!
//! The ride ledger stored as one JSON array under the `rides` key.
//!
//! ## Contract
//! ```text
//! startup   load_all()  ──► None (never saved) | Some(every ride)
//! mutation  save_all()  ──► replaces the whole array
//! ```
//! There are no partial updates; the caller always writes the full snapshot.

use rideshare_core::RideRecord;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::kv::KvRepository;

/// Storage key of the ride collection.
pub const RIDES_KEY: &str = "rides";

/// Repository for the ride collection.
#[derive(Debug, Clone)]
pub struct RideRepository {
    kv: KvRepository,
}

impl RideRepository {
    /// Creates a new RideRepository.
    pub fn new(kv: KvRepository) -> Self {
        RideRepository { kv }
    }

    /// Loads every ride, or `None` if the collection was never written.
    pub async fn load_all(&self) -> DbResult<Option<Vec<RideRecord>>> {
        let rides: Option<Vec<RideRecord>> = self.kv.get_json(RIDES_KEY).await?;
        debug!(count = rides.as_ref().map(Vec::len), "Loaded rides");
        Ok(rides)
    }

    /// Replaces the stored collection.
    pub async fn save_all(&self, rides: &[RideRecord]) -> DbResult<()> {
        self.kv.put_json(RIDES_KEY, rides).await?;
        info!(count = rides.len(), "Saved rides");
        Ok(())
    }
}
