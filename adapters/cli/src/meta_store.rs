//! JSON persistence of the meta progress record between batches.

use std::{fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use bastion_core::MetaProgress;
use tracing::info;

/// Loads the meta record at `path`; a missing file yields a fresh record.
pub(crate) fn load(path: &Path) -> Result<MetaProgress> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no meta progress found, starting fresh");
            return Ok(MetaProgress::default());
        }
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to read meta progress at {}", path.display()))
        }
    };
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse meta progress at {}", path.display()))
}

/// Writes the meta record to `path` as pretty-printed JSON.
pub(crate) fn save(path: &Path, meta: &MetaProgress) -> Result<()> {
    let json = serde_json::to_string_pretty(meta).context("failed to encode meta progress")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write meta progress to {}", path.display()))
}

/// Adds the essence earned by a batch to the record it started from.
#[must_use]
pub(crate) fn credit<I>(meta: MetaProgress, earned: I) -> MetaProgress
where
    I: IntoIterator<Item = u64>,
{
    let essence = earned
        .into_iter()
        .fold(meta.essence, |total, run| total.saturating_add(run));
    MetaProgress { essence, ..meta }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{PermanentUpgradeKind, PermanentUpgrades};

    #[test]
    fn missing_file_starts_fresh() {
        let dir = tempfile::tempdir().expect("temp dir");

        let meta = load(&dir.path().join("meta.json")).expect("fresh record");

        assert_eq!(meta, MetaProgress::default());
    }

    #[test]
    fn saved_record_loads_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("meta.json");
        let mut upgrades = PermanentUpgrades::new();
        upgrades.set_level(PermanentUpgradeKind::GoldMultiplier, 2);
        let meta = MetaProgress::new(75, upgrades);

        save(&path, &meta).expect("saved");

        assert_eq!(load(&path).expect("loaded"), meta);
    }

    #[test]
    fn partial_record_fills_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("meta.json");
        fs::write(&path, r#"{"essence": 12, "upgrades": {"bounce": 3}}"#).expect("write");

        let meta = load(&path).expect("loaded");

        assert_eq!(meta.essence, 12);
        assert_eq!(meta.upgrades.bounce, 3);
        assert_eq!(meta.upgrades.gold_multiplier, 1.0);
    }

    #[test]
    fn malformed_record_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("meta.json");
        fs::write(&path, "not json").expect("write");

        assert!(load(&path).is_err());
    }

    #[test]
    fn credit_sums_every_run() {
        let meta = MetaProgress::new(10, PermanentUpgrades::new());

        assert_eq!(credit(meta, [5, 0, 7]).essence, 22);
    }
}
