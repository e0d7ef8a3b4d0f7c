use crate::core::asset::Asset;
use crate::core::history::Snapshot;
use crate::core::store::Store;
use anyhow::Result;
use std::sync::RwLock;

/// In-memory store, for tests and ephemeral runs. Nothing is written to disk.
#[derive(Default)]
pub struct MemoryStore {
    assets: RwLock<Vec<Asset>>,
    snapshots: RwLock<Vec<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load_assets(&self) -> Result<Vec<Asset>> {
        Ok(self.assets.read().unwrap().clone())
    }

    fn save_assets(&self, assets: &[Asset]) -> Result<()> {
        *self.assets.write().unwrap() = assets.to_vec();
        Ok(())
    }

    fn load_snapshots(&self) -> Result<Vec<Snapshot>> {
        Ok(self.snapshots.read().unwrap().clone())
    }

    fn save_snapshots(&self, snapshots: &[Snapshot]) -> Result<()> {
        *self.snapshots.write().unwrap() = snapshots.to_vec();
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        self.assets.write().unwrap().clear();
        self.snapshots.write().unwrap().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::{Category, Currency};
    use chrono::Utc;

    #[test]
    fn test_round_trips_assets() {
        let store = MemoryStore::new();
        let asset =
            Asset::new(Category::Cash, "Bank", 30_000.0, Currency::Twd, "", Utc::now()).unwrap();

        store.save_assets(std::slice::from_ref(&asset)).unwrap();

        assert_eq!(store.load_assets().unwrap(), vec![asset]);
    }

    #[test]
    fn test_clear_all_wipes_both_blobs() {
        let store = MemoryStore::new();
        store
            .save_assets(&[Asset::new(
                Category::Other,
                "Gold",
                5_000.0,
                Currency::Twd,
                "",
                Utc::now(),
            )
            .unwrap()])
            .unwrap();
        store
            .save_snapshots(&[Snapshot {
                at: Utc::now(),
                total: 5_000.0,
                growth_rate: 0.0,
            }])
            .unwrap();

        store.clear_all().unwrap();

        assert!(store.load_assets().unwrap().is_empty());
        assert!(store.load_snapshots().unwrap().is_empty());
    }
}
