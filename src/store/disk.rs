use crate::core::asset::Asset;
use crate::core::history::Snapshot;
use crate::core::store::Store;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "ledger";
const KEY_ASSETS: &str = "assets";
const KEY_SNAPSHOTS: &str = "assetHistory";

/// fjall-backed store. Both blobs live in one partition under fixed keys and
/// every write is synced before the call returns, so a save that reported
/// success survives the process.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open data store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open ledger partition")?;
        debug!("Opened data store at {}", path.display());
        Ok(DiskStore {
            keyspace,
            partition,
        })
    }

    fn read_blob<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self
            .partition
            .get(key)
            .with_context(|| format!("Failed to read {key} from data store"))?
        {
            Some(raw) => serde_json::from_slice(&raw)
                .with_context(|| format!("Corrupt {key} blob in data store")),
            None => Ok(Vec::new()),
        }
    }

    fn write_blob<T: Serialize>(&self, key: &str, values: &[T]) -> Result<()> {
        let raw = serde_json::to_vec(values)?;
        self.partition
            .insert(key, raw)
            .with_context(|| format!("Failed to write {key} to data store"))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to sync data store")?;
        Ok(())
    }
}

impl Store for DiskStore {
    fn load_assets(&self) -> Result<Vec<Asset>> {
        self.read_blob(KEY_ASSETS)
    }

    fn save_assets(&self, assets: &[Asset]) -> Result<()> {
        self.write_blob(KEY_ASSETS, assets)
    }

    fn load_snapshots(&self) -> Result<Vec<Snapshot>> {
        self.read_blob(KEY_SNAPSHOTS)
    }

    fn save_snapshots(&self, snapshots: &[Snapshot]) -> Result<()> {
        self.write_blob(KEY_SNAPSHOTS, snapshots)
    }

    fn clear_all(&self) -> Result<()> {
        self.partition
            .remove(KEY_ASSETS)
            .context("Failed to clear assets from data store")?;
        self.partition
            .remove(KEY_SNAPSHOTS)
            .context("Failed to clear history from data store")?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to sync data store")?;
        Ok(())
    }
}
