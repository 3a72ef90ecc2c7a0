//! Journal persistence — snapshot JSON save/load between invocations.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use edgelog_core::config::JournalConfig;
use edgelog_core::domain::Trade;
use edgelog_core::import::Snapshot;

/// The working journal: every trade on disk plus the active config.
#[derive(Debug, Default)]
pub struct Journal {
    pub trades: Vec<Trade>,
    pub config: JournalConfig,
}

/// Load a journal from disk.
///
/// A missing file is a fresh journal. A corrupt or future-versioned file is
/// reported and replaced with an empty journal rather than aborting, so a bad
/// snapshot never locks the user out of the tool.
pub fn load(path: &Path) -> Journal {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Journal::default(),
        Err(err) => {
            warn!(path = %path.display(), %err, "could not read journal, starting empty");
            return Journal::default();
        }
    };
    match Snapshot::from_json(&text) {
        Ok(snapshot) => Journal {
            trades: snapshot.trades,
            config: snapshot.config.unwrap_or_default(),
        },
        Err(err) => {
            warn!(path = %path.display(), %err, "journal is unreadable, starting empty");
            Journal::default()
        }
    }
}

/// Save the journal to disk. Creates parent directories if needed.
pub fn save(path: &Path, journal: &Journal) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let snapshot = Snapshot::new(journal.trades.clone(), journal.config.clone());
    let json = snapshot.to_json()?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
