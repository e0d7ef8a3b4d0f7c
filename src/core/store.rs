//! Persistence boundary for the ledger
//!
//! Two JSON blobs in a key-value store, written whole on every save. The
//! trait is narrow on purpose; atomicity per call is all the single-writer
//! application needs.

use crate::core::asset::Asset;
use crate::core::history::Snapshot;
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub trait Store: Send + Sync {
    fn load_assets(&self) -> Result<Vec<Asset>>;
    fn save_assets(&self, assets: &[Asset]) -> Result<()>;
    fn load_snapshots(&self) -> Result<Vec<Snapshot>>;
    fn save_snapshots(&self, snapshots: &[Snapshot]) -> Result<()>;
    /// Wipes both blobs. Only the full reset path calls this.
    fn clear_all(&self) -> Result<()>;
}

/// Portable dump of everything the store holds, for backup files.
#[derive(Debug, Serialize, Deserialize)]
pub struct Backup {
    pub assets: Vec<Asset>,
    pub history: Vec<Snapshot>,
}
