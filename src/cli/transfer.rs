use crate::core::store::Backup;
use crate::tracker::Tracker;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn import(tracker: &mut Tracker, path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;
    let count = tracker.import_csv(&content)?;
    if count == 0 {
        println!("No importable rows found in {}", path.display());
    } else {
        println!("Imported {count} assets from {}", path.display());
    }
    Ok(())
}

/// Writes the ledger as CSV, or prints it when no path is given.
pub fn export(tracker: &Tracker, path: Option<&Path>) -> Result<()> {
    let csv = tracker.export_csv();
    match path {
        Some(path) => {
            fs::write(path, &csv)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
            println!(
                "Exported {} assets to {}",
                tracker.assets().len(),
                path.display()
            );
        }
        None => print!("{csv}"),
    }
    Ok(())
}

pub fn backup(tracker: &Tracker, path: &Path) -> Result<()> {
    let backup = tracker.backup();
    let json = serde_json::to_string_pretty(&backup)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write backup file: {}", path.display()))?;
    println!(
        "Backed up {} assets and {} snapshots to {}",
        backup.assets.len(),
        backup.history.len(),
        path.display()
    );
    Ok(())
}

pub fn restore(tracker: &mut Tracker, path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup file: {}", path.display()))?;
    let backup: Backup = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse backup file: {}", path.display()))?;
    let assets = backup.assets.len();
    let snapshots = backup.history.len();
    tracker.restore(backup)?;
    println!(
        "Restored {assets} assets and {snapshots} snapshots from {}",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::{Category, Currency};
    use crate::core::clock::SystemClock;
    use crate::core::quote::{FxRateProvider, QuoteCache, QuoteProvider};
    use crate::store::MemoryStore;
    use anyhow::bail;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct NoQuotes;

    #[async_trait]
    impl QuoteProvider for NoQuotes {
        async fn fetch_price(&self, symbol: &str) -> Result<f64> {
            bail!("no quotes in tests, asked for {symbol}")
        }
    }

    #[async_trait]
    impl FxRateProvider for NoQuotes {
        async fn fetch_rate(&self, _from: &str, _to: &str) -> Result<f64> {
            bail!("no fx in tests")
        }
    }

    fn open_tracker() -> Tracker {
        Tracker::open(
            Arc::new(MemoryStore::new()),
            Arc::new(QuoteCache::new()),
            Arc::new(NoQuotes),
            Arc::new(NoQuotes),
            Arc::new(SystemClock),
        )
    }

    #[tokio::test]
    async fn test_export_then_import_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("assets.csv");
        let mut tracker = open_tracker();
        tracker
            .add_asset(Category::Cash, "Bank", 30_000.0, Currency::Twd, "生活費")
            .unwrap();
        tracker
            .add_asset(Category::Insurance, "保單", 150_000.0, Currency::Twd, "")
            .unwrap();

        export(&tracker, Some(&path)).unwrap();

        let mut restored = open_tracker();
        import(&mut restored, &path).unwrap();

        assert_eq!(restored.assets().len(), 2);
        assert_eq!(restored.net_worth(), 180_000.0);
    }

    #[tokio::test]
    async fn test_backup_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.json");
        let mut tracker = open_tracker();
        tracker
            .add_asset(Category::Cash, "Bank", 30_000.0, Currency::Twd, "")
            .unwrap();

        backup(&tracker, &path).unwrap();

        let mut restored = open_tracker();
        restore(&mut restored, &path).unwrap();

        assert_eq!(restored.assets(), tracker.assets());
        assert_eq!(restored.net_worth(), 30_000.0);
        assert_eq!(restored.history_window(12).len(), 1);
    }

    #[tokio::test]
    async fn test_restore_rejects_malformed_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.json");
        fs::write(&path, "not json at all").unwrap();
        let mut tracker = open_tracker();

        let err = restore(&mut tracker, &path).unwrap_err();

        assert!(err.to_string().contains("Failed to parse backup file"));
    }
}
