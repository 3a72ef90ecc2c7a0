//! Seeded demo journal generation.
//!
//! Produces a plausible-looking journal (slightly winning, mixed
//! instruments, tagged from the configured vocabularies) without touching
//! any real import data. Everything is drawn from a single `StdRng` seeded
//! with the caller's value, so the same seed and clock always produce the
//! same journal.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::config::JournalConfig;
use crate::domain::{
    AtomicExecution, Direction, ExecutionRecord, ExecutionRole, ExecutionSource, Side, Trade,
    TradeId, TradeNotes,
};
use crate::engine::apply_equity_curve;

const DEMO_INSTRUMENTS: [&str; 6] = ["NQ", "ES", "MNQ", "CL", "AAPL", "TSLA"];

/// Generate `count` closed demo trades spread over the sixty days before
/// `now`, ascending by open time with the running equity already applied.
pub fn generate_demo_journal(
    count: usize,
    seed: u64,
    now: DateTime<Utc>,
    config: &JournalConfig,
) -> Vec<Trade> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut trades: Vec<Trade> = (0..count)
        .map(|seq| generate_trade(&mut rng, seq as u64, now, config))
        .collect();
    apply_equity_curve(&mut trades);
    trades
}

fn generate_trade(rng: &mut StdRng, seq: u64, now: DateTime<Utc>, config: &JournalConfig) -> Trade {
    let instrument = DEMO_INSTRUMENTS.choose(rng).copied().unwrap_or("NQ");
    let direction = if rng.gen_bool(0.5) {
        Direction::Long
    } else {
        Direction::Short
    };
    let is_win = rng.gen_bool(0.55);

    // Winners pay $100-$600, losers cost $50-$350, in whole cents.
    let pnl = if is_win {
        Decimal::new(rng.gen_range(10_000..=60_000), 2)
    } else {
        -Decimal::new(rng.gen_range(5_000..=35_000), 2)
    };

    let open_time = now
        - Duration::days(rng.gen_range(0..60))
        - Duration::minutes(rng.gen_range(0..390));
    let close_time = open_time + Duration::minutes(60);

    let base_cents: i64 = match instrument {
        "NQ" | "MNQ" => 1_500_000,
        "ES" => 452_000,
        "CL" => 7_200,
        "AAPL" => 18_500,
        _ => 24_000,
    };
    let entry_price = Decimal::new(base_cents + rng.gen_range(0..2_000), 2);
    // Hourly move of 10-50 basis points, favorable when the trade wins.
    let magnitude = (entry_price * Decimal::new(rng.gen_range(10..=50), 4)).round_dp(2);
    let favorable = match direction {
        Direction::Long => magnitude,
        Direction::Short => -magnitude,
    };
    let exit_price = if is_win {
        entry_price + favorable
    } else {
        entry_price - favorable
    };
    // Roughly one in five trades scales in over two entries.
    let scale_in = rng.gen_bool(0.2);
    let quantity = if scale_in {
        Decimal::from(rng.gen_range(2..=4))
    } else {
        Decimal::from(rng.gen_range(1..=3))
    };

    let (entry_side, exit_side) = match direction {
        Direction::Long => (Side::Buy, Side::Sell),
        Direction::Short => (Side::Sell, Side::Buy),
    };
    let leg = |side: Side, price, quantity, timestamp, contribution| AtomicExecution {
        instrument: instrument.to_string(),
        side,
        price,
        quantity,
        timestamp,
        pnl_contribution: Some(contribution),
        source: ExecutionSource::Decomposed,
    };

    let mut executions = Vec::new();
    if scale_in {
        let first_lot = Decimal::ONE;
        let second_lot = quantity - first_lot;
        executions.push(ExecutionRecord {
            execution: leg(entry_side, entry_price, first_lot, open_time, Decimal::ZERO),
            role: ExecutionRole::Open,
            position_after: first_lot * entry_side.sign(),
        });
        executions.push(ExecutionRecord {
            execution: leg(
                entry_side,
                entry_price,
                second_lot,
                open_time + Duration::minutes(10),
                Decimal::ZERO,
            ),
            role: ExecutionRole::Add,
            position_after: quantity * entry_side.sign(),
        });
    } else {
        executions.push(ExecutionRecord {
            execution: leg(entry_side, entry_price, quantity, open_time, Decimal::ZERO),
            role: ExecutionRole::Open,
            position_after: quantity * entry_side.sign(),
        });
    }
    executions.push(ExecutionRecord {
        execution: leg(exit_side, exit_price, quantity, close_time, pnl),
        role: ExecutionRole::Close,
        position_after: Decimal::ZERO,
    });

    let setup = config
        .setups
        .choose(rng)
        .cloned()
        .unwrap_or_default();
    let mut mistakes = Vec::new();
    if !is_win && rng.gen_bool(0.4) {
        if let Some(mistake) = config.mistakes.choose(rng) {
            mistakes.push(mistake.clone());
        }
    }
    let mut successes = Vec::new();
    if is_win {
        if let Some(success) = config.successes.choose(rng) {
            successes.push(success.clone());
        }
    }
    let mindsets = config
        .mindsets
        .choose(rng)
        .cloned()
        .into_iter()
        .collect();

    Trade {
        id: TradeId::derive(instrument, open_time, seq),
        instrument: instrument.to_string(),
        direction,
        open_time,
        close_time,
        executions,
        realized_pnl: pnl,
        running_equity: Decimal::ZERO,
        setup,
        mistakes,
        successes,
        mindsets,
        notes: TradeNotes::default(),
        chart_image: None,
        annotations: Vec::new(),
    }
}
