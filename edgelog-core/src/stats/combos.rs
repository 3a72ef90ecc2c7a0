//! Combination mining: which setup and behavior pairings repeat, and what
//! they are worth.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{TagKind, Trade};

/// One recurring setup-and-tag pairing with its accumulated results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboStat {
    /// Reads `"{setup} + {tag} ({Mistake|Habit|Mindset})"`.
    pub label: String,
    pub count: usize,
    pub pnl: Decimal,
    pub expectancy: Decimal,
}

/// Pair every trade's setup with each of its behavioral tags, keep only
/// pairings seen more than once, and rank them by expectancy descending.
///
/// A single occurrence is an anecdote, not a pattern, so it is discarded.
/// Trades without a setup contribute nothing.
pub fn mine_combos(trades: &[Trade]) -> Vec<ComboStat> {
    struct Acc {
        label: String,
        pnl: Decimal,
        count: usize,
    }
    let mut pairs: Vec<Acc> = Vec::new();
    for trade in trades {
        if trade.setup.is_empty() {
            continue;
        }
        for kind in [TagKind::Mistake, TagKind::Success, TagKind::Mindset] {
            for tag in trade.tags(kind) {
                let label = format!("{} + {} ({})", trade.setup, tag, kind.combo_label());
                match pairs.iter_mut().find(|p| p.label == label) {
                    Some(pair) => {
                        pair.pnl += trade.realized_pnl;
                        pair.count += 1;
                    }
                    None => pairs.push(Acc {
                        label,
                        pnl: trade.realized_pnl,
                        count: 1,
                    }),
                }
            }
        }
    }

    let mut combos: Vec<ComboStat> = pairs
        .into_iter()
        .filter(|p| p.count > 1)
        .map(|p| ComboStat {
            expectancy: p.pnl / Decimal::from(p.count),
            label: p.label,
            count: p.count,
            pnl: p.pnl,
        })
        .collect();
    combos.sort_by(|a, b| b.expectancy.cmp(&a.expectancy));
    combos
}
