//! Journal export — CSV trade tape and JSON snapshot generation.

use anyhow::{Context, Result};

use edgelog_core::domain::Trade;
use edgelog_core::import::Snapshot;

use crate::persistence::Journal;

/// Export the trade tape as CSV for external analysis tools.
///
/// Columns: id, instrument, direction, open_time, close_time, executions,
/// realized_pnl, running_equity, setup, tags, outcome
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Header
    wtr.write_record([
        "id",
        "instrument",
        "direction",
        "open_time",
        "close_time",
        "executions",
        "realized_pnl",
        "running_equity",
        "setup",
        "tags",
        "outcome",
    ])?;

    for t in trades {
        let tags = [
            t.mistakes.as_slice(),
            t.successes.as_slice(),
            t.mindsets.as_slice(),
        ]
        .concat()
        .join("; ");

        wtr.write_record([
            t.id.0.as_str(),
            t.instrument.as_str(),
            &format!("{:?}", t.direction),
            &t.open_time.to_rfc3339(),
            &t.close_time.to_rfc3339(),
            &t.executions.len().to_string(),
            &t.realized_pnl.to_string(),
            &t.running_equity.to_string(),
            t.setup.as_str(),
            &tags,
            if t.is_winner() { "win" } else { "loss" },
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Serialize the full journal as a snapshot, the same shape `import` reads back.
pub fn export_journal_json(journal: &Journal) -> Result<String> {
    let snapshot = Snapshot::new(journal.trades.clone(), journal.config.clone());
    snapshot
        .to_json()
        .context("failed to serialize journal snapshot")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use edgelog_core::config::JournalConfig;
    use edgelog_core::domain::{Direction, TradeId, TradeNotes};
    use rust_decimal_macros::dec;

    // ─── Test helpers ────────────────────────────────────────────────

    fn sample_trade() -> Trade {
        let open = Utc.with_ymd_and_hms(2024, 6, 3, 13, 31, 0).unwrap();
        Trade {
            id: TradeId::derive("NQ", open, 0),
            instrument: "NQ".into(),
            direction: Direction::Long,
            open_time: open,
            close_time: open + chrono::Duration::minutes(30),
            executions: Vec::new(),
            realized_pnl: dec!(150),
            running_equity: dec!(150),
            setup: "Breakout".into(),
            mistakes: vec!["FOMO".into()],
            successes: vec!["Patience".into()],
            mindsets: Vec::new(),
            notes: TradeNotes::default(),
            chart_image: None,
            annotations: Vec::new(),
        }
    }

    // ─── CSV trades ─────────────────────────────────────────────────

    #[test]
    fn csv_trades_all_columns() {
        let csv = export_trades_csv(&[sample_trade()]).unwrap();
        let header = csv.lines().next().unwrap();
        let cols: Vec<&str> = header.split(',').collect();

        assert_eq!(cols.len(), 11);
        assert!(cols.contains(&"id"));
        assert!(cols.contains(&"instrument"));
        assert!(cols.contains(&"direction"));
        assert!(cols.contains(&"open_time"));
        assert!(cols.contains(&"close_time"));
        assert!(cols.contains(&"executions"));
        assert!(cols.contains(&"realized_pnl"));
        assert!(cols.contains(&"running_equity"));
        assert!(cols.contains(&"setup"));
        assert!(cols.contains(&"tags"));
        assert!(cols.contains(&"outcome"));
    }

    #[test]
    fn csv_trades_content() {
        let csv = export_trades_csv(&[sample_trade()]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2); // header + 1 data row
        let row = lines[1];
        assert!(row.contains("NQ"));
        assert!(row.contains("Long"));
        assert!(row.contains("Breakout"));
        assert!(row.contains("FOMO; Patience"));
        assert!(row.contains("win"));
        assert!(row.contains("150"));
    }

    #[test]
    fn csv_flat_trade_is_a_loss() {
        let mut trade = sample_trade();
        trade.realized_pnl = dec!(0);
        let csv = export_trades_csv(&[trade]).unwrap();
        assert!(csv.lines().nth(1).unwrap().ends_with("loss"));
    }

    #[test]
    fn csv_empty_trades() {
        let csv = export_trades_csv(&[]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 1); // header only
    }

    // ─── JSON snapshot ──────────────────────────────────────────────

    #[test]
    fn json_roundtrips_through_snapshot() {
        let journal = Journal {
            trades: vec![sample_trade()],
            config: JournalConfig::default(),
        };
        let json = export_journal_json(&journal).unwrap();
        let restored = Snapshot::from_json(&json).unwrap();

        assert_eq!(restored.trades.len(), 1);
        assert_eq!(restored.trades[0].id, journal.trades[0].id);
        assert_eq!(restored.config, Some(journal.config));
    }
}
