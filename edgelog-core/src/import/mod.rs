//! The import pipeline: text in, reconstructed trades out.
//!
//! Stages run leaf-first: tabular split, format detection, normalization
//! into atomic executions, zero-to-zero reconstruction, equity curve. Rows
//! that fail field checks drop out along the way; only an empty result or
//! an undetectable format surfaces as an error.

pub mod detect;
pub mod mapping;
pub mod normalize;
pub mod snapshot;
pub mod tabular;

pub use detect::DetectedFormat;
pub use mapping::{ColumnMapping, MappingError};
pub use normalize::{CompletedRow, TimestampFallback};
pub use snapshot::{Snapshot, SnapshotError, SNAPSHOT_VERSION};

use crate::config::JournalConfig;
use crate::domain::{AtomicExecution, SourceHash, Trade};
use crate::engine::{apply_equity_curve, reconstruct_trades};
use std::fmt;
use tracing::{debug, info};

/// Which ingestion path produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    RawExecutions,
    CompletedTrades,
    Mapped,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceFormat::RawExecutions => "raw executions",
            SourceFormat::CompletedTrades => "completed trades",
            SourceFormat::Mapped => "manual mapping",
        };
        f.write_str(name)
    }
}

/// A successful import: trades with equity applied, in ascending open-time
/// order, plus enough provenance to log and summarize.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub trades: Vec<Trade>,
    pub format: SourceFormat,
    pub source_hash: SourceHash,
    pub lines_read: usize,
    pub execution_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("CSV parsed but no valid rows found")]
    NoValidRows,
    #[error("unknown CSV format (headers found: {})", headers.join(", "))]
    UnknownFormat { headers: Vec<String> },
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// Auto-detecting entry point for CSV text.
pub fn import_text(
    text: &str,
    config: &JournalConfig,
    fallback: TimestampFallback,
) -> Result<ImportOutcome, ImportError> {
    let source_hash = SourceHash::of(text);
    if text.trim().is_empty() {
        return Err(ImportError::NoValidRows);
    }
    let lines = tabular::split_lines(text);
    let headers = detect::parse_headers(lines[0]);

    let (executions, format) = match detect::detect(&headers, &lines) {
        DetectedFormat::CompletedTrades => {
            let rows: Vec<CompletedRow> = lines[1..]
                .iter()
                .filter_map(|line| {
                    let cells = tabular::split_line(line);
                    CompletedRow::from_cells(&headers, &cells)
                })
                .collect();
            debug!(rows = rows.len(), "detected completed-trade format");
            (
                normalize::decompose_completed(&rows, fallback),
                SourceFormat::CompletedTrades,
            )
        }
        DetectedFormat::RawExecutions => {
            debug!("detected raw-execution format");
            (normalize::normalize_raw(&lines), SourceFormat::RawExecutions)
        }
        DetectedFormat::Unresolved => return Err(ImportError::UnknownFormat { headers }),
    };
    finish(executions, format, source_hash, lines.len(), config)
}

/// Mapped entry point: same pipeline, but the caller supplies the column
/// mapping instead of relying on detection.
pub fn import_mapped(
    text: &str,
    mapping: &ColumnMapping,
    config: &JournalConfig,
    fallback: TimestampFallback,
) -> Result<ImportOutcome, ImportError> {
    let source_hash = SourceHash::of(text);
    if text.trim().is_empty() {
        return Err(ImportError::NoValidRows);
    }
    let lines = tabular::split_lines(text);
    let headers = detect::parse_headers(lines[0]);
    let rows = mapping::resolve_mapping(&headers, &lines[1..], mapping)?;
    let executions = normalize::decompose_completed(&rows, fallback);
    finish(
        executions,
        SourceFormat::Mapped,
        source_hash,
        lines.len(),
        config,
    )
}

fn finish(
    executions: Vec<AtomicExecution>,
    format: SourceFormat,
    source_hash: SourceHash,
    lines_read: usize,
    config: &JournalConfig,
) -> Result<ImportOutcome, ImportError> {
    if executions.is_empty() {
        return Err(ImportError::NoValidRows);
    }
    let execution_count = executions.len();
    let mut trades = reconstruct_trades(executions, &config.multipliers);
    apply_equity_curve(&mut trades);
    info!(
        trades = trades.len(),
        executions = execution_count,
        format = %format,
        "import complete"
    );
    Ok(ImportOutcome {
        trades,
        format,
        source_hash,
        lines_read,
        execution_count,
    })
}
