//! Trade reconstruction — groups atomic executions into round-trip trades.
//!
//! The zero-to-zero scan: per instrument, a signed running position opens a
//! trade when it leaves zero and seals it the instant it returns. Pure
//! function: executions + multiplier table → trades.

use crate::config::MultiplierTable;
use crate::domain::{
    AtomicExecution, Direction, ExecutionRecord, ExecutionRole, Side, Trade, TradeId, TradeNotes,
};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// State for a trade being accumulated during the scan.
struct OpenTrade {
    id: TradeId,
    instrument: String,
    direction: Direction,
    open_time: chrono::DateTime<chrono::Utc>,
    close_time: chrono::DateTime<chrono::Utc>,
    records: Vec<ExecutionRecord>,
    position: Decimal,
    pnl: Decimal,
    saw_contribution: bool,
}

impl OpenTrade {
    fn start(id: TradeId, first: &AtomicExecution) -> Self {
        Self {
            id,
            instrument: first.instrument.clone(),
            direction: match first.side {
                Side::Buy => Direction::Long,
                Side::Sell => Direction::Short,
            },
            open_time: first.timestamp,
            close_time: first.timestamp,
            records: Vec::new(),
            position: Decimal::ZERO,
            pnl: Decimal::ZERO,
            saw_contribution: false,
        }
    }

    fn push(&mut self, execution: AtomicExecution) {
        self.position += execution.signed_quantity();
        let role = if self.records.is_empty() {
            ExecutionRole::Open
        } else if self.position.is_zero() {
            ExecutionRole::Close
        } else {
            let prior = self
                .records
                .last()
                .map(|r| r.position_after.abs())
                .unwrap_or(Decimal::ZERO);
            if self.position.abs() > prior {
                ExecutionRole::Add
            } else {
                ExecutionRole::Trim
            }
        };
        self.close_time = execution.timestamp;
        if let Some(contribution) = execution.pnl_contribution {
            self.pnl += contribution;
            self.saw_contribution = true;
        }
        self.records.push(ExecutionRecord {
            execution,
            role,
            position_after: self.position,
        });
    }

    /// Seal into a Trade. Decomposed executions carry their P&L with them;
    /// raw executions are priced out at close via the multiplier table. An
    /// unclosed tail keeps zero realized P&L.
    fn into_trade(self, multipliers: &MultiplierTable) -> Trade {
        let realized_pnl = if self.saw_contribution {
            self.pnl
        } else if self.position.is_zero() {
            let mut bought = Decimal::ZERO;
            let mut sold = Decimal::ZERO;
            for record in &self.records {
                let notional = record.execution.price * record.execution.quantity;
                match record.execution.side {
                    Side::Buy => bought += notional,
                    Side::Sell => sold += notional,
                }
            }
            (sold - bought) * multipliers.lookup(&self.instrument)
        } else {
            Decimal::ZERO
        };

        Trade {
            id: self.id,
            instrument: self.instrument,
            direction: self.direction,
            open_time: self.open_time,
            close_time: self.close_time,
            executions: self.records,
            realized_pnl,
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
}

/// Reconstruct round-trip trades from normalized executions.
///
/// Executions are stably sorted by timestamp (ties keep input order), then
/// partitioned by instrument preserving first-seen order so output is
/// deterministic, then each partition is scanned independently. Every
/// consumable execution lands in exactly one trade; a partition whose
/// position never returns to zero yields a final open trade rather than
/// dropping fills.
pub fn reconstruct_trades(
    mut executions: Vec<AtomicExecution>,
    multipliers: &MultiplierTable,
) -> Vec<Trade> {
    executions.sort_by_key(|e| e.timestamp);

    let mut order: Vec<String> = Vec::new();
    let mut partitions: HashMap<String, Vec<AtomicExecution>> = HashMap::new();
    for execution in executions {
        if !partitions.contains_key(&execution.instrument) {
            order.push(execution.instrument.clone());
        }
        partitions
            .entry(execution.instrument.clone())
            .or_default()
            .push(execution);
    }

    let mut trades = Vec::new();
    let mut seq = 0u64;
    for instrument in &order {
        if let Some(batch) = partitions.remove(instrument) {
            scan_partition(batch, multipliers, &mut seq, &mut trades);
        }
    }
    trades
}

fn scan_partition(
    executions: Vec<AtomicExecution>,
    multipliers: &MultiplierTable,
    seq: &mut u64,
    out: &mut Vec<Trade>,
) {
    let mut open: Option<OpenTrade> = None;
    for execution in executions {
        let mut trade = match open.take() {
            Some(trade) => trade,
            None => {
                let id = TradeId::derive(&execution.instrument, execution.timestamp, *seq);
                *seq += 1;
                OpenTrade::start(id, &execution)
            }
        };
        trade.push(execution);
        if trade.position.is_zero() {
            out.push(trade.into_trade(multipliers));
        } else {
            open = Some(trade);
        }
    }
    if let Some(trade) = open {
        out.push(trade.into_trade(multipliers));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExecutionSource;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn ts(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap() + Duration::minutes(minute)
    }

    fn fill(instrument: &str, side: Side, minute: i64, price: Decimal, qty: Decimal) -> AtomicExecution {
        AtomicExecution {
            instrument: instrument.into(),
            side,
            price,
            quantity: qty,
            timestamp: ts(minute),
            pnl_contribution: None,
            source: ExecutionSource::Raw,
        }
    }

    fn buy(instrument: &str, minute: i64, price: Decimal, qty: Decimal) -> AtomicExecution {
        fill(instrument, Side::Buy, minute, price, qty)
    }

    fn sell(instrument: &str, minute: i64, price: Decimal, qty: Decimal) -> AtomicExecution {
        fill(instrument, Side::Sell, minute, price, qty)
    }

    fn with_contribution(mut execution: AtomicExecution, pnl: Decimal) -> AtomicExecution {
        execution.pnl_contribution = Some(pnl);
        execution.source = ExecutionSource::Decomposed;
        execution
    }

    fn table() -> MultiplierTable {
        MultiplierTable::default()
    }

    fn roles(trade: &Trade) -> Vec<ExecutionRole> {
        trade.executions.iter().map(|r| r.role).collect()
    }

    fn positions(trade: &Trade) -> Vec<Decimal> {
        trade.executions.iter().map(|r| r.position_after).collect()
    }

    #[test]
    fn zero_executions_produce_zero_trades() {
        assert!(reconstruct_trades(Vec::new(), &table()).is_empty());
    }

    #[test]
    fn single_long_round_trip() {
        let executions = vec![
            buy("NQ", 0, dec!(15000), dec!(1)),
            sell("NQ", 15, dec!(15020), dec!(1)),
        ];
        let trades = reconstruct_trades(executions, &table());

        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(t.instrument, "NQ");
        assert_eq!(t.direction, Direction::Long);
        assert_eq!(t.open_time, ts(0));
        assert_eq!(t.close_time, ts(15));
        assert_eq!(roles(t), vec![ExecutionRole::Open, ExecutionRole::Close]);
        assert_eq!(positions(t), vec![dec!(1), dec!(0)]);
        // (15020 - 15000) * 50 = 1000
        assert_eq!(t.realized_pnl, dec!(1000));
        assert!(t.is_closed());
        assert!(t.is_winner());
    }

    #[test]
    fn single_short_round_trip() {
        let executions = vec![
            sell("NQ", 0, dec!(15020), dec!(1)),
            buy("NQ", 10, dec!(15000), dec!(1)),
        ];
        let trades = reconstruct_trades(executions, &table());

        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(t.direction, Direction::Short);
        // Sold high, bought back low: (15020 - 15000) * 50 = 1000
        assert_eq!(t.realized_pnl, dec!(1000));
    }

    #[test]
    fn sequential_round_trips_stay_separate() {
        let executions = vec![
            buy("NQ", 0, dec!(15000), dec!(1)),
            sell("NQ", 5, dec!(15010), dec!(1)),
            buy("NQ", 20, dec!(15005), dec!(1)),
            sell("NQ", 30, dec!(15015), dec!(1)),
        ];
        let trades = reconstruct_trades(executions, &table());

        assert_eq!(trades.len(), 2);
        assert_ne!(trades[0].id, trades[1].id);
        assert_eq!(trades[0].realized_pnl, dec!(500));
        assert_eq!(trades[1].realized_pnl, dec!(500));
        assert!(trades.iter().all(Trade::is_closed));
    }

    #[test]
    fn scaling_in_classifies_add_then_close() {
        let executions = vec![
            buy("CL", 0, dec!(70), dec!(1)),
            buy("CL", 5, dec!(71), dec!(1)),
            sell("CL", 10, dec!(72), dec!(2)),
        ];
        let trades = reconstruct_trades(executions, &table());

        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(
            roles(t),
            vec![ExecutionRole::Open, ExecutionRole::Add, ExecutionRole::Close]
        );
        assert_eq!(positions(t), vec![dec!(1), dec!(2), dec!(0)]);
        // (72*2 - 70 - 71) * 1000 = 3000
        assert_eq!(t.realized_pnl, dec!(3000));
    }

    #[test]
    fn scaling_out_classifies_trim_then_close() {
        let executions = vec![
            buy("ES", 0, dec!(4500), dec!(2)),
            sell("ES", 5, dec!(4510), dec!(1)),
            sell("ES", 10, dec!(4520), dec!(1)),
        ];
        let trades = reconstruct_trades(executions, &table());

        let t = &trades[0];
        assert_eq!(
            roles(t),
            vec![ExecutionRole::Open, ExecutionRole::Trim, ExecutionRole::Close]
        );
        assert_eq!(positions(t), vec![dec!(2), dec!(1), dec!(0)]);
    }

    #[test]
    fn instruments_reconstruct_independently() {
        let executions = vec![
            buy("NQ", 0, dec!(15000), dec!(1)),
            buy("ES", 1, dec!(4500), dec!(1)),
            sell("NQ", 2, dec!(15010), dec!(1)),
            sell("ES", 3, dec!(4505), dec!(1)),
        ];
        let trades = reconstruct_trades(executions, &table());

        assert_eq!(trades.len(), 2);
        let nq = trades.iter().find(|t| t.instrument == "NQ").unwrap();
        let es = trades.iter().find(|t| t.instrument == "ES").unwrap();
        assert_eq!(nq.realized_pnl, dec!(500));
        assert_eq!(es.realized_pnl, dec!(250));
        assert!(nq.is_closed() && es.is_closed());
    }

    #[test]
    fn unclosed_tail_is_kept_open_with_zero_pnl() {
        let executions = vec![
            buy("NQ", 0, dec!(15000), dec!(1)),
            buy("NQ", 5, dec!(15005), dec!(1)),
        ];
        let trades = reconstruct_trades(executions, &table());

        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert!(!t.is_closed());
        assert_eq!(roles(t), vec![ExecutionRole::Open, ExecutionRole::Add]);
        assert_eq!(t.realized_pnl, Decimal::ZERO);
        assert_eq!(t.net_position(), dec!(2));
    }

    #[test]
    fn oversized_exit_keeps_trade_open() {
        // Selling through flat flips the sign without touching zero; the
        // scan keeps accumulating until the position is exactly zero.
        let executions = vec![
            buy("NQ", 0, dec!(15000), dec!(1)),
            sell("NQ", 5, dec!(15010), dec!(2)),
        ];
        let trades = reconstruct_trades(executions, &table());

        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert!(!t.is_closed());
        assert_eq!(positions(t), vec![dec!(1), dec!(-1)]);
        assert_eq!(roles(t), vec![ExecutionRole::Open, ExecutionRole::Trim]);
    }

    #[test]
    fn contributions_override_price_arithmetic() {
        let executions = vec![
            with_contribution(buy("ES", 0, dec!(4500), dec!(1)), Decimal::ZERO),
            with_contribution(sell("ES", 30, dec!(4490), dec!(1)), dec!(-500)),
        ];
        let trades = reconstruct_trades(executions, &table());

        assert_eq!(trades.len(), 1);
        // Reported P&L wins over (4490 - 4500) * 50.
        assert_eq!(trades[0].realized_pnl, dec!(-500));
    }

    #[test]
    fn decomposed_rows_regroup_into_multi_leg_trades() {
        // Two completed rows scaling out of one position: entry legs at 0
        // and 1, exit legs at 10 and 11. Position only returns to zero at
        // the final exit, so the rows fuse into one four-leg trade.
        let executions = vec![
            with_contribution(buy("NQ", 0, dec!(15000), dec!(1)), Decimal::ZERO),
            with_contribution(buy("NQ", 1, dec!(15002), dec!(1)), Decimal::ZERO),
            with_contribution(sell("NQ", 10, dec!(15010), dec!(1)), dec!(500)),
            with_contribution(sell("NQ", 11, dec!(15020), dec!(1)), dec!(900)),
        ];
        let trades = reconstruct_trades(executions, &table());

        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(t.executions.len(), 4);
        assert_eq!(t.realized_pnl, dec!(1400));
        assert_eq!(
            roles(t),
            vec![
                ExecutionRole::Open,
                ExecutionRole::Add,
                ExecutionRole::Trim,
                ExecutionRole::Close
            ]
        );
    }

    #[test]
    fn timestamp_ties_keep_input_order() {
        let executions = vec![
            buy("NQ", 0, dec!(15000), dec!(1)),
            sell("NQ", 0, dec!(15010), dec!(1)),
        ];
        let trades = reconstruct_trades(executions, &table());

        assert_eq!(trades.len(), 1);
        // Stable sort keeps the buy first, so the trade reads Long.
        assert_eq!(trades[0].direction, Direction::Long);
        assert!(trades[0].is_closed());
    }

    #[test]
    fn micro_symbols_use_their_own_multiplier() {
        let executions = vec![
            buy("MNQ", 0, dec!(15000), dec!(2)),
            sell("MNQ", 5, dec!(15010), dec!(2)),
        ];
        let trades = reconstruct_trades(executions, &table());
        // (15010 - 15000) * 2 * 5 = 100
        assert_eq!(trades[0].realized_pnl, dec!(100));
    }

    #[test]
    fn unknown_symbols_default_to_unit_multiplier() {
        let executions = vec![
            buy("ZZZ", 0, dec!(10), dec!(3)),
            sell("ZZZ", 5, dec!(12), dec!(3)),
        ];
        let trades = reconstruct_trades(executions, &table());
        assert_eq!(trades[0].realized_pnl, dec!(6));
    }
}
