//! Full-state JSON snapshots.
//!
//! A snapshot is the trusted round-trip format: trades are taken as
//! already-valid and are not re-reconstructed on load. Config travels with
//! the trades so vocabularies and multipliers survive a restore; an absent
//! config means "keep what you have".

use crate::config::JournalConfig;
use crate::domain::Trade;
use serde::{Deserialize, Serialize};

/// Bumped when the snapshot layout changes incompatibly. Files written
/// before versioning carry no field and deserialize as 0.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub trades: Vec<Trade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<JournalConfig>,
}

impl Snapshot {
    pub fn new(trades: Vec<Trade>, config: JournalConfig) -> Self {
        Self {
            schema_version: SNAPSHOT_VERSION,
            trades,
            config: Some(config),
        }
    }

    /// Parse and validate. A snapshot written by a newer build is refused
    /// outright rather than loaded lossily.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(text)?;
        if snapshot.schema_version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.schema_version,
                max: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("invalid snapshot JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("snapshot schema version {found} is newer than supported {max}")]
    UnsupportedVersion { found: u32, max: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_trades_and_config() {
        let snapshot = Snapshot::new(Vec::new(), JournalConfig::default());
        let text = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&text).unwrap();
        assert_eq!(restored.schema_version, SNAPSHOT_VERSION);
        assert!(restored.trades.is_empty());
        assert_eq!(restored.config, Some(JournalConfig::default()));
    }

    #[test]
    fn legacy_files_without_version_or_config_load() {
        let snapshot = Snapshot::from_json(r#"{"trades": []}"#).unwrap();
        assert_eq!(snapshot.schema_version, 0);
        assert!(snapshot.config.is_none());
    }

    #[test]
    fn newer_versions_are_refused() {
        let text = r#"{"schemaVersion": 99, "trades": []}"#;
        let err = Snapshot::from_json(text).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::UnsupportedVersion { found: 99, max: SNAPSHOT_VERSION }
        ));
    }

    #[test]
    fn malformed_json_is_a_hard_failure() {
        assert!(matches!(
            Snapshot::from_json("{not json").unwrap_err(),
            SnapshotError::Parse(_)
        ));
    }
}
