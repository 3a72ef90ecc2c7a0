use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade ID — derived, stable, and unique within a reconstruction batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeId(pub String);

impl TradeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive a deterministic id for a reconstructed trade.
    ///
    /// Hashes instrument + opening timestamp + a batch-local sequence number,
    /// so two trades opened at the same instant on different instruments (or
    /// the same instrument later in the batch) never collide.
    /// Uses BLAKE3 for stable hashing across builds/platforms.
    pub fn derive(instrument: &str, open_time: DateTime<Utc>, seq: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(instrument.as_bytes());
        hasher.update(&open_time.timestamp_millis().to_le_bytes());
        hasher.update(&seq.to_le_bytes());
        let hash = hasher.finalize();
        Self(hash.to_hex()[..16].to_string())
    }

    /// Derive a fresh id for a merged trade from its constituents.
    ///
    /// Never reuses a constituent id: the hash covers every merged id plus the
    /// merged close time, so re-merging a different selection yields a
    /// different id.
    pub fn derive_merged(constituents: &[TradeId], close_time: DateTime<Utc>) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"merge");
        for id in constituents {
            hasher.update(id.0.as_bytes());
        }
        hasher.update(&close_time.timestamp_millis().to_le_bytes());
        let hash = hasher.finalize();
        Self(hash.to_hex()[..16].to_string())
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Annotation ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationId(pub String);

impl AnnotationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an id from the annotation's content and anchor.
    ///
    /// Content-derived on purpose: saving the same text at the same spot on
    /// the same trade updates the existing marker instead of stacking a
    /// duplicate on top of it.
    pub fn derive(trade: &TradeId, x: f64, y: f64, text: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(trade.0.as_bytes());
        hasher.update(&x.to_le_bytes());
        hasher.update(&y.to_le_bytes());
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();
        Self(hash.to_hex()[..12].to_string())
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content hash of a raw import payload, carried as provenance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceHash(pub String);

impl SourceHash {
    pub fn of(text: &str) -> Self {
        Self(blake3::hash(text.as_bytes()).to_hex().to_string())
    }
}

impl fmt::Display for SourceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
