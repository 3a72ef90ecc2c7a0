//! Calendar grouping and session-relative bar arithmetic.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Trade, TradeId};

/// One calendar day's aggregate, keyed by the open time's date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub pnl: Decimal,
    pub count: usize,
    pub trade_ids: Vec<TradeId>,
}

/// Group trades by the date they were opened, ascending.
pub fn daily_summaries(trades: &[Trade]) -> Vec<DaySummary> {
    let mut days: BTreeMap<NaiveDate, DaySummary> = BTreeMap::new();
    for trade in trades {
        let date = trade.open_time.date_naive();
        let day = days.entry(date).or_insert_with(|| DaySummary {
            date,
            pnl: Decimal::ZERO,
            count: 0,
            trade_ids: Vec::new(),
        });
        day.pnl += trade.realized_pnl;
        day.count += 1;
        day.trade_ids.push(trade.id.clone());
    }
    days.into_values().collect()
}

/// Position of an instant within the trading session, in bars of a fixed
/// timeframe. The first bar of the session is bar 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarIndex {
    PreSession,
    Bar(i64),
}

impl fmt::Display for BarIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarIndex::PreSession => write!(f, "Pre"),
            BarIndex::Bar(n) => write!(f, "Bar {n}"),
        }
    }
}

/// Bar number of `ts` relative to a session starting at `session_start`
/// on the same calendar day.
pub fn bar_index(ts: DateTime<Utc>, session_start: NaiveTime, timeframe_minutes: i64) -> BarIndex {
    // A non-positive timeframe is meaningless; treat it as one-minute bars.
    let timeframe = timeframe_minutes.max(1);
    let start = ts.date_naive().and_time(session_start).and_utc();
    let offset = ts.signed_duration_since(start);
    if offset < Duration::zero() {
        return BarIndex::PreSession;
    }
    BarIndex::Bar(offset.num_minutes() / timeframe + 1)
}
