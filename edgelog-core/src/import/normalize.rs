//! Normalization of parsed rows into [`AtomicExecution`] values.
//!
//! Two entry points, one per detected format. Both drop rows they cannot
//! salvage instead of failing the import; drops are traced at debug level.

use crate::domain::{AtomicExecution, ExecutionSource, Side};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

use super::tabular::split_line;

/// Timestamp policy for completed-trade rows whose entry or exit time does
/// not parse: substitute this instant instead of dropping the row. Named and
/// passed explicitly so tests can pin it and callers cannot get it by
/// accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampFallback(pub DateTime<Utc>);

impl TimestampFallback {
    /// The wall clock at call time. What interactive imports use.
    pub fn processing_instant() -> Self {
        Self(Utc::now())
    }
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a timestamp in any of the shapes broker exports use. Offset-less
/// values are taken as UTC; date-only values resolve to midnight.
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(fixed) = DateTime::parse_from_rfc3339(text) {
        return Some(fixed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_ONLY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }
    }
    None
}

/// Parse a decimal field, tolerating surrounding whitespace and scientific
/// notation.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .ok()
        .or_else(|| Decimal::from_scientific(trimmed).ok())
}

fn side_from_text(text: &str) -> Side {
    if text.to_lowercase().contains("buy") {
        Side::Buy
    } else {
        Side::Sell
    }
}

/// Raw-execution path: every line is tried as an execution row with
/// positional columns (instrument, side, timestamp, price, quantity). Rows
/// with too few columns, an unparsable price/quantity/timestamp, or a
/// non-positive quantity are dropped. The header line fails these checks
/// naturally, so callers pass the whole document.
pub fn normalize_raw(lines: &[&str]) -> Vec<AtomicExecution> {
    let mut executions = Vec::new();
    for line in lines {
        let cells = split_line(line);
        if cells.len() < 5 {
            continue;
        }
        let (Some(timestamp), Some(price), Some(quantity)) = (
            parse_instant(&cells[2]),
            parse_decimal(&cells[3]),
            parse_decimal(&cells[4]),
        ) else {
            debug!(row = %line, "dropping unparsable execution row");
            continue;
        };
        if quantity <= Decimal::ZERO {
            debug!(row = %line, "dropping execution row with non-positive quantity");
            continue;
        }
        executions.push(AtomicExecution {
            instrument: cells[0].clone(),
            side: side_from_text(&cells[1]),
            price,
            quantity,
            timestamp,
            pnl_contribution: None,
            source: ExecutionSource::Raw,
        });
    }
    executions
}

/// One completed-trade row, keyed by the canonical header names. Built
/// either from a detected completed-trade CSV or from a resolved manual
/// mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletedRow {
    pub contract_name: String,
    pub trade_type: String,
    pub entry_price: String,
    pub exit_price: String,
    pub size: String,
    pub entered_at: String,
    pub exited_at: String,
    pub pnl: String,
}

impl CompletedRow {
    /// Pair header names with this line's cells. Returns `None` when the
    /// line has fewer cells than the header row; extra cells are ignored.
    /// A canonical column missing from the headers yields an empty field.
    pub fn from_cells(headers: &[String], cells: &[String]) -> Option<Self> {
        if cells.len() < headers.len() {
            return None;
        }
        let field = |name: &str| -> String {
            headers
                .iter()
                .position(|h| h == name)
                .map(|at| cells[at].clone())
                .unwrap_or_default()
        };
        Some(Self {
            contract_name: field("ContractName"),
            trade_type: field("Type"),
            entry_price: field("EntryPrice"),
            exit_price: field("ExitPrice"),
            size: field("Size"),
            entered_at: field("EnteredAt"),
            exited_at: field("ExitedAt"),
            pnl: field("PnL"),
        })
    }
}

/// Completed-trade path: decompose each row into an opening and a closing
/// execution so reconstruction can re-group scaled entries and exits across
/// rows instead of trusting the source's trade boundaries.
///
/// The row's reported P&L rides on the closing execution only; the opening
/// execution carries an explicit zero contribution. Unparsable prices and
/// P&L degrade to zero; an unparsable quantity drops the whole row since a
/// positive quantity is the one field decomposition cannot invent.
pub fn decompose_completed(
    rows: &[CompletedRow],
    fallback: TimestampFallback,
) -> Vec<AtomicExecution> {
    let mut executions = Vec::new();
    for row in rows {
        let Some(quantity) = parse_decimal(&row.size).filter(|q| *q > Decimal::ZERO) else {
            debug!(size = %row.size, "dropping completed row without a positive size");
            continue;
        };
        let entry_time = parse_instant(&row.entered_at).unwrap_or_else(|| {
            warn!(value = %row.entered_at, "unparsable entry time, using fallback instant");
            fallback.0
        });
        let exit_time = parse_instant(&row.exited_at).unwrap_or_else(|| {
            warn!(value = %row.exited_at, "unparsable exit time, using fallback instant");
            fallback.0
        });
        let is_long = row.trade_type.to_lowercase().contains("long");
        let entry_side = if is_long { Side::Buy } else { Side::Sell };
        let instrument = if row.contract_name.is_empty() {
            "Unknown".to_string()
        } else {
            row.contract_name.clone()
        };
        let row_pnl = parse_decimal(&row.pnl).unwrap_or(Decimal::ZERO);

        executions.push(AtomicExecution {
            instrument: instrument.clone(),
            side: entry_side,
            price: parse_decimal(&row.entry_price).unwrap_or(Decimal::ZERO),
            quantity,
            timestamp: entry_time,
            pnl_contribution: Some(Decimal::ZERO),
            source: ExecutionSource::Decomposed,
        });
        executions.push(AtomicExecution {
            instrument,
            side: entry_side.opposite(),
            price: parse_decimal(&row.exit_price).unwrap_or(Decimal::ZERO),
            quantity,
            timestamp: exit_time,
            pnl_contribution: Some(row_pnl),
            source: ExecutionSource::Decomposed,
        });
    }
    executions
}
