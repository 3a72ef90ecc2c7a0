//! Manual column mapping for files the detector cannot place.
//!
//! The caller names which source column feeds each canonical field; rows are
//! then reshaped into [`CompletedRow`]s and handed to the completed-trade
//! decomposition path.

use super::normalize::CompletedRow;
use super::tabular::split_line;

/// User-supplied mapping from canonical fields to source column names.
/// `instrument`, `entry_price`, and `entry_time` are required; the rest are
/// optional and degrade per the completed-trade path's rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pub instrument: Option<String>,
    pub direction: Option<String>,
    pub entry_price: Option<String>,
    pub exit_price: Option<String>,
    pub quantity: Option<String>,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub pnl: Option<String>,
}

impl ColumnMapping {
    pub const FIELD_NAMES: &'static [&'static str] = &[
        "instrument",
        "direction",
        "entry-price",
        "exit-price",
        "quantity",
        "entry-time",
        "exit-time",
        "pnl",
    ];

    /// Build a mapping from (canonical field, source column) pairs, e.g.
    /// parsed from repeated `--map field=Column` flags.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, MappingError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut mapping = Self::default();
        for (field, column) in pairs {
            let slot = match field {
                "instrument" => &mut mapping.instrument,
                "direction" => &mut mapping.direction,
                "entry-price" => &mut mapping.entry_price,
                "exit-price" => &mut mapping.exit_price,
                "quantity" => &mut mapping.quantity,
                "entry-time" => &mut mapping.entry_time,
                "exit-time" => &mut mapping.exit_time,
                "pnl" => &mut mapping.pnl,
                other => {
                    return Err(MappingError::UnknownField {
                        field: other.to_string(),
                    })
                }
            };
            *slot = Some(column.to_string());
        }
        Ok(mapping)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("mapping must specify: {}", missing.join(", "))]
    MissingFields { missing: Vec<String> },
    #[error("mapped column not found in header row: {column}")]
    UnknownColumn { column: String },
    #[error("unknown mapping field: {field} (expected one of {})", ColumnMapping::FIELD_NAMES.join(", "))]
    UnknownField { field: String },
}

/// Reshape data lines into completed-trade rows per the mapping.
///
/// Validation is up front: missing required fields and columns absent from
/// the header row reject the whole mapping before any row is produced.
/// Blank lines are skipped; a mapped column beyond a short row's width
/// yields an empty field. An unmapped quantity defaults every row to size 1
/// so that round trips without a size column still import.
pub fn resolve_mapping(
    headers: &[String],
    data_lines: &[&str],
    mapping: &ColumnMapping,
) -> Result<Vec<CompletedRow>, MappingError> {
    let mut missing = Vec::new();
    for (slot, name) in [
        (&mapping.instrument, "instrument"),
        (&mapping.entry_price, "entry price"),
        (&mapping.entry_time, "entry time"),
    ] {
        if slot.is_none() {
            missing.push(name.to_string());
        }
    }
    if !missing.is_empty() {
        return Err(MappingError::MissingFields { missing });
    }

    let index_of = |slot: &Option<String>| -> Result<Option<usize>, MappingError> {
        match slot {
            None => Ok(None),
            Some(column) => headers
                .iter()
                .position(|h| h == column)
                .map(Some)
                .ok_or_else(|| MappingError::UnknownColumn {
                    column: column.clone(),
                }),
        }
    };
    let instrument_at = index_of(&mapping.instrument)?;
    let direction_at = index_of(&mapping.direction)?;
    let entry_price_at = index_of(&mapping.entry_price)?;
    let exit_price_at = index_of(&mapping.exit_price)?;
    let quantity_at = index_of(&mapping.quantity)?;
    let entry_time_at = index_of(&mapping.entry_time)?;
    let exit_time_at = index_of(&mapping.exit_time)?;
    let pnl_at = index_of(&mapping.pnl)?;

    let mut rows = Vec::new();
    for line in data_lines {
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_line(line);
        let value_at =
            |at: Option<usize>| at.and_then(|i| cells.get(i)).cloned().unwrap_or_default();
        rows.push(CompletedRow {
            contract_name: value_at(instrument_at),
            trade_type: value_at(direction_at),
            entry_price: value_at(entry_price_at),
            exit_price: value_at(exit_price_at),
            size: match quantity_at {
                Some(at) => value_at(Some(at)),
                None => "1".to_string(),
            },
            entered_at: value_at(entry_time_at),
            exited_at: value_at(exit_time_at),
            pnl: value_at(pnl_at),
        });
    }
    Ok(rows)
}
