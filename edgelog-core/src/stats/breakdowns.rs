//! Per-tag P&L breakdowns and the per-setup scorecard.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::JournalConfig;
use crate::domain::{TagKind, Trade};

/// One tag value's aggregate across the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagBucket {
    pub label: String,
    pub pnl: Decimal,
    pub count: usize,
}

/// Sum full trade P&L into one bucket per distinct tag value, descending
/// by summed value.
///
/// A trade carrying several tags in a multi-valued field contributes its
/// full P&L to each of their buckets, undivided. Empty tag values are
/// skipped, so trades without a setup never show up in the setup
/// breakdown.
pub fn tag_breakdown(trades: &[Trade], kind: TagKind) -> Vec<TagBucket> {
    let mut buckets: Vec<TagBucket> = Vec::new();
    for trade in trades {
        let values: &[String] = match kind {
            TagKind::Setup => std::slice::from_ref(&trade.setup),
            _ => trade.tags(kind),
        };
        for value in values {
            if value.is_empty() {
                continue;
            }
            match buckets.iter_mut().find(|b| &b.label == value) {
                Some(bucket) => {
                    bucket.pnl += trade.realized_pnl;
                    bucket.count += 1;
                }
                None => buckets.push(TagBucket {
                    label: value.clone(),
                    pnl: trade.realized_pnl,
                    count: 1,
                }),
            }
        }
    }
    buckets.sort_by(|a, b| b.pnl.cmp(&a.pnl));
    buckets
}

/// Scorecard for one configured setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupMetrics {
    pub setup: String,
    pub count: usize,
    pub win_rate: f64,
    pub profit_factor: Decimal,
    pub expectancy: Decimal,
    pub pnl: Decimal,
}

/// One scorecard per configured setup with at least one matching trade,
/// descending by expectancy. Setups the journal knows but never traded are
/// omitted rather than shown as zero rows.
pub fn setup_metrics(trades: &[Trade], config: &JournalConfig) -> Vec<SetupMetrics> {
    let mut rows: Vec<SetupMetrics> = Vec::new();
    for setup in &config.setups {
        let pnls: Vec<Decimal> = trades
            .iter()
            .filter(|t| &t.setup == setup)
            .map(|t| t.realized_pnl)
            .collect();
        if pnls.is_empty() {
            continue;
        }
        rows.push(SetupMetrics {
            setup: setup.clone(),
            count: pnls.len(),
            win_rate: super::win_rate(&pnls),
            profit_factor: super::profit_factor(&pnls),
            expectancy: super::expectancy(&pnls),
            pnl: pnls.iter().sum(),
        });
    }
    rows.sort_by(|a, b| b.expectancy.cmp(&a.expectancy));
    rows
}
