//! Running equity over a trade collection.

use crate::domain::Trade;
use rust_decimal::Decimal;

/// Recompute `running_equity` for every trade: sort ascending by open time
/// and accumulate realized P&L in that pass. The collection is left in
/// ascending order; callers re-sort for display as they wish. Idempotent,
/// and insensitive to the input order.
pub fn apply_equity_curve(trades: &mut [Trade]) {
    trades.sort_by_key(|t| t.open_time);
    let mut running = Decimal::ZERO;
    for trade in trades.iter_mut() {
        running += trade.realized_pnl;
        trade.running_equity = running;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, TradeId, TradeNotes};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn ts(hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::hours(hour)
    }

    fn make_trade(hour: i64, pnl: Decimal) -> Trade {
        Trade {
            id: TradeId::derive("NQ", ts(hour), hour as u64),
            instrument: "NQ".into(),
            direction: Direction::Long,
            open_time: ts(hour),
            close_time: ts(hour) + Duration::minutes(30),
            executions: Vec::new(),
            realized_pnl: pnl,
            running_equity: Decimal::ZERO,
            setup: String::new(),
            mistakes: Vec::new(),
            successes: Vec::new(),
            mindsets: Vec::new(),
            notes: TradeNotes::default(),
            chart_image: None,
            annotations: Vec::new(),
        }
    }

    #[test]
    fn accumulates_in_chronological_order() {
        let mut trades = vec![
            make_trade(2, dec!(-40)),
            make_trade(0, dec!(100)),
            make_trade(1, dec!(60)),
        ];
        apply_equity_curve(&mut trades);

        assert_eq!(trades[0].open_time, ts(0));
        let equity: Vec<Decimal> = trades.iter().map(|t| t.running_equity).collect();
        assert_eq!(equity, vec![dec!(100), dec!(160), dec!(120)]);
    }

    #[test]
    fn rerunning_is_idempotent() {
        let mut trades = vec![make_trade(0, dec!(100)), make_trade(1, dec!(-30))];
        apply_equity_curve(&mut trades);
        let first: Vec<Decimal> = trades.iter().map(|t| t.running_equity).collect();
        apply_equity_curve(&mut trades);
        let second: Vec<Decimal> = trades.iter().map(|t| t.running_equity).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn input_order_does_not_matter() {
        let mut forward = vec![make_trade(0, dec!(10)), make_trade(1, dec!(20))];
        let mut backward = vec![make_trade(1, dec!(20)), make_trade(0, dec!(10))];
        apply_equity_curve(&mut forward);
        apply_equity_curve(&mut backward);
        for (a, b) in forward.iter().zip(&backward) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.running_equity, b.running_equity);
        }
    }

    #[test]
    fn empty_collection_is_fine() {
        let mut trades: Vec<Trade> = Vec::new();
        apply_equity_curve(&mut trades);
        assert!(trades.is_empty());
    }
}
