//! Journal statistics — pure functions over a filtered trade collection.
//!
//! Every aggregate is a pure function: trade list in, figures out. Money
//! stays in `Decimal` end to end; only the win-rate percentage drops to
//! `f64`. Nothing here touches I/O or the collection itself.

pub mod breakdowns;
pub mod combos;

pub use breakdowns::{setup_metrics, tag_breakdown, SetupMetrics, TagBucket};
pub use combos::{mine_combos, ComboStat};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::JournalConfig;
use crate::domain::{TagKind, Trade};

/// The full dashboard for one (possibly pre-filtered) trade collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStatistics {
    pub trade_count: usize,
    pub win_count: usize,
    pub loss_count: usize,
    pub total_pnl: Decimal,
    /// Percentage of winners, 0 to 100.
    pub win_rate: f64,
    pub profit_factor: Decimal,
    pub avg_win: Decimal,
    /// Mean losing P&L as a positive magnitude.
    pub avg_loss: Decimal,
    pub r_ratio: Decimal,
    pub expectancy: Decimal,
    pub by_setup: Vec<TagBucket>,
    pub by_mistake: Vec<TagBucket>,
    pub by_success: Vec<TagBucket>,
    pub by_mindset: Vec<TagBucket>,
    pub setup_metrics: Vec<SetupMetrics>,
    pub best_combo: Option<ComboStat>,
    pub worst_combo: Option<ComboStat>,
}

impl TradeStatistics {
    /// Compute every section in one place. Returns `None` for an empty
    /// collection rather than a struct of misleading zeros.
    pub fn compute(trades: &[Trade], config: &JournalConfig) -> Option<Self> {
        if trades.is_empty() {
            return None;
        }
        let pnls: Vec<Decimal> = trades.iter().map(|t| t.realized_pnl).collect();
        let win_count = pnls.iter().filter(|p| **p > Decimal::ZERO).count();
        let avg_win = average_win(&pnls);
        let avg_loss = average_loss(&pnls);
        let combos = mine_combos(trades);

        Some(Self {
            trade_count: trades.len(),
            win_count,
            loss_count: trades.len() - win_count,
            total_pnl: pnls.iter().sum(),
            win_rate: win_rate(&pnls),
            profit_factor: profit_factor(&pnls),
            avg_win,
            avg_loss,
            r_ratio: r_ratio(avg_win, avg_loss),
            expectancy: expectancy(&pnls),
            by_setup: tag_breakdown(trades, TagKind::Setup),
            by_mistake: tag_breakdown(trades, TagKind::Mistake),
            by_success: tag_breakdown(trades, TagKind::Success),
            by_mindset: tag_breakdown(trades, TagKind::Mindset),
            setup_metrics: setup_metrics(trades, config),
            best_combo: combos.first().cloned(),
            worst_combo: combos.last().cloned(),
        })
    }
}

// ─── Scalar metrics ─────────────────────────────────────────────────

/// Percentage of trades with positive P&L. A flat trade is a loss.
pub fn win_rate(pnls: &[Decimal]) -> f64 {
    if pnls.is_empty() {
        return 0.0;
    }
    let winners = pnls.iter().filter(|p| **p > Decimal::ZERO).count();
    winners as f64 / pnls.len() as f64 * 100.0
}

/// Gross winning P&L over gross losing P&L.
///
/// When there are no losses at all the ratio is defined as the winning sum
/// itself rather than infinity.
pub fn profit_factor(pnls: &[Decimal]) -> Decimal {
    let win_sum: Decimal = pnls.iter().filter(|p| **p > Decimal::ZERO).sum();
    let loss_sum: Decimal = pnls
        .iter()
        .filter(|p| **p <= Decimal::ZERO)
        .sum::<Decimal>()
        .abs();
    if loss_sum.is_zero() {
        win_sum
    } else {
        win_sum / loss_sum
    }
}

/// Mean winning P&L, zero when there are no winners.
pub fn average_win(pnls: &[Decimal]) -> Decimal {
    let winners: Vec<Decimal> = pnls.iter().copied().filter(|p| *p > Decimal::ZERO).collect();
    if winners.is_empty() {
        return Decimal::ZERO;
    }
    winners.iter().sum::<Decimal>() / Decimal::from(winners.len())
}

/// Mean losing P&L as a positive magnitude, zero when there are no losers.
pub fn average_loss(pnls: &[Decimal]) -> Decimal {
    let losers: Vec<Decimal> = pnls.iter().copied().filter(|p| *p <= Decimal::ZERO).collect();
    if losers.is_empty() {
        return Decimal::ZERO;
    }
    (losers.iter().sum::<Decimal>() / Decimal::from(losers.len())).abs()
}

/// Average win over average loss. When the average loss is zero the ratio
/// is defined as the average win itself.
pub fn r_ratio(avg_win: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss.is_zero() {
        avg_win
    } else {
        avg_win / avg_loss
    }
}

/// Mean P&L per trade.
pub fn expectancy(pnls: &[Decimal]) -> Decimal {
    if pnls.is_empty() {
        return Decimal::ZERO;
    }
    pnls.iter().sum::<Decimal>() / Decimal::from(pnls.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, TradeId, TradeNotes};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn make_trade(pnl: Decimal, setup: &str) -> Trade {
        let open = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        Trade {
            id: TradeId::derive("NQ", open, 0),
            instrument: "NQ".into(),
            direction: Direction::Long,
            open_time: open,
            close_time: open,
            executions: Vec::new(),
            realized_pnl: pnl,
            running_equity: Decimal::ZERO,
            setup: setup.into(),
            mistakes: Vec::new(),
            successes: Vec::new(),
            mindsets: Vec::new(),
            notes: TradeNotes::default(),
            chart_image: None,
            annotations: Vec::new(),
        }
    }

    // ── Scalar metrics ──

    #[test]
    fn win_rate_is_a_percentage() {
        let pnls = [dec!(500), dec!(-200), dec!(300)];
        assert!((win_rate(&pnls) - 66.666_666).abs() < 1e-3);
    }

    #[test]
    fn flat_trades_count_as_losses() {
        let pnls = [dec!(100), dec!(0)];
        assert!((win_rate(&pnls) - 50.0).abs() < 1e-10);
        // Losing sum is zero, so the ratios collapse to the winning side.
        assert_eq!(profit_factor(&pnls), dec!(100));
        assert_eq!(average_loss(&pnls), dec!(0));
        assert_eq!(r_ratio(average_win(&pnls), average_loss(&pnls)), dec!(100));
    }

    #[test]
    fn profit_factor_known_values() {
        // Wins 800, losses 200 → 4.
        let pnls = [dec!(500), dec!(-200), dec!(300)];
        assert_eq!(profit_factor(&pnls), dec!(4));
    }

    #[test]
    fn profit_factor_all_losers_is_zero() {
        let pnls = [dec!(-500), dec!(-300)];
        assert_eq!(profit_factor(&pnls), dec!(0));
    }

    #[test]
    fn averages_split_winners_and_losers() {
        let pnls = [dec!(500), dec!(-200), dec!(300), dec!(-100)];
        assert_eq!(average_win(&pnls), dec!(400));
        assert_eq!(average_loss(&pnls), dec!(150));
        assert_eq!(r_ratio(dec!(400), dec!(150)), dec!(400) / dec!(150));
    }

    #[test]
    fn expectancy_is_mean_pnl() {
        let pnls = [dec!(500), dec!(-200), dec!(300)];
        assert_eq!(expectancy(&pnls), dec!(200));
        assert_eq!(expectancy(&[]), dec!(0));
    }

    // ── Aggregate ──

    #[test]
    fn empty_collection_yields_none() {
        let config = JournalConfig::default();
        assert!(TradeStatistics::compute(&[], &config).is_none());
    }

    #[test]
    fn compute_wires_every_section() {
        let config = JournalConfig::default();
        let mut a = make_trade(dec!(500), "Breakout");
        a.mistakes.push("FOMO".into());
        let mut b = make_trade(dec!(-200), "Breakout");
        b.mistakes.push("FOMO".into());
        let c = make_trade(dec!(300), "Reversal");

        let stats = TradeStatistics::compute(&[a, b, c], &config).unwrap();
        assert_eq!(stats.trade_count, 3);
        assert_eq!(stats.win_count, 2);
        assert_eq!(stats.loss_count, 1);
        assert_eq!(stats.total_pnl, dec!(600));
        assert_eq!(stats.expectancy, dec!(200));
        assert_eq!(stats.by_setup.len(), 2);
        assert_eq!(stats.by_mistake.len(), 1);

        // One surviving combo is both the best and the worst.
        let best = stats.best_combo.unwrap();
        let worst = stats.worst_combo.unwrap();
        assert_eq!(best.label, "Breakout + FOMO (Mistake)");
        assert_eq!(best, worst);
        assert_eq!(best.expectancy, dec!(150)); // (500 - 200) / 2
    }

    #[test]
    fn combos_absent_when_nothing_repeats() {
        let config = JournalConfig::default();
        let mut a = make_trade(dec!(500), "Breakout");
        a.mistakes.push("FOMO".into());
        let stats = TradeStatistics::compute(&[a], &config).unwrap();
        assert!(stats.best_combo.is_none());
        assert!(stats.worst_combo.is_none());
    }
}
