//! Merging trades that belong together.
//!
//! A split series of fills can reconstruct as several trades (partial file
//! uploads, broker-side session breaks). Merge collapses a selection into
//! one trade and re-runs the equity curve over the whole collection.

use super::equity::apply_equity_curve;
use crate::domain::{ExecutionRecord, NoteCategory, Trade, TradeId, TradeNotes};
use rust_decimal::Decimal;
use tracing::info;

/// Merge the trades named by `ids` into one replacement trade.
///
/// The earliest-opening selection is the base: it donates instrument,
/// direction, setup, chart image, and annotations. P&L is summed, tag sets
/// are unioned (first-seen order), non-empty note fields are joined with a
/// visible separator, and the execution lists are concatenated in timestamp
/// order. Roles and positions are kept as recorded per source trade, not
/// recomputed across the merged list.
///
/// Returns the new trade's id, or `None` without touching the collection
/// when fewer than two of the ids resolve.
pub fn merge_trades(trades: &mut Vec<Trade>, ids: &[TradeId]) -> Option<TradeId> {
    if ids.len() < 2 {
        return None;
    }
    if trades.iter().filter(|t| ids.contains(&t.id)).count() < 2 {
        return None;
    }

    let (mut selected, remaining): (Vec<Trade>, Vec<Trade>) = std::mem::take(trades)
        .into_iter()
        .partition(|t| ids.contains(&t.id));
    *trades = remaining;
    selected.sort_by_key(|t| t.open_time);

    let close_time = selected.iter().map(|t| t.close_time).max()?;
    let constituent_ids: Vec<TradeId> = selected.iter().map(|t| t.id.clone()).collect();
    let id = TradeId::derive_merged(&constituent_ids, close_time);

    let realized_pnl: Decimal = selected.iter().map(|t| t.realized_pnl).sum();
    let mut executions: Vec<ExecutionRecord> = selected
        .iter()
        .flat_map(|t| t.executions.iter().cloned())
        .collect();
    executions.sort_by_key(|r| r.execution.timestamp);

    let base = selected.first()?;
    let merged = Trade {
        id: id.clone(),
        instrument: base.instrument.clone(),
        direction: base.direction,
        open_time: base.open_time,
        close_time,
        executions,
        realized_pnl,
        running_equity: Decimal::ZERO,
        setup: base.setup.clone(),
        mistakes: union_tags(&selected, |t| t.mistakes.as_slice()),
        successes: union_tags(&selected, |t| t.successes.as_slice()),
        mindsets: union_tags(&selected, |t| t.mindsets.as_slice()),
        notes: TradeNotes {
            entry: join_notes(&selected, NoteCategory::Entry),
            exit: join_notes(&selected, NoteCategory::Exit),
            management: join_notes(&selected, NoteCategory::Management),
            general: join_notes(&selected, NoteCategory::General),
        },
        chart_image: base.chart_image.clone(),
        annotations: base.annotations.clone(),
    };
    info!(merged = %id, constituents = constituent_ids.len(), "merged trades");

    trades.push(merged);
    apply_equity_curve(trades);
    Some(id)
}

fn union_tags(sources: &[Trade], pick: fn(&Trade) -> &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for trade in sources {
        for tag in pick(trade) {
            if !out.contains(tag) {
                out.push(tag.clone());
            }
        }
    }
    out
}

/// Separator between merged note fields.
pub const NOTE_SEPARATOR: &str = "\n---\n";

fn join_notes(sources: &[Trade], category: NoteCategory) -> String {
    let parts: Vec<&str> = sources
        .iter()
        .map(|t| t.notes.get(category))
        .filter(|text| !text.is_empty())
        .collect();
    parts.join(NOTE_SEPARATOR)
}
