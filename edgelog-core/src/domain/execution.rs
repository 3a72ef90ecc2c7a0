//! Atomic executions — the single input shape the reconstruction engine
//! consumes, regardless of which import format produced them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fill side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Sign applied to quantities when accumulating a net position.
    pub fn sign(self) -> Decimal {
        match self {
            Side::Buy => Decimal::ONE,
            Side::Sell => Decimal::NEGATIVE_ONE,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// How an execution entered the system.
///
/// `Decomposed` marks the two synthetic legs produced from one
/// completed-trade row; `Raw` marks a fill imported as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionSource {
    Raw,
    Decomposed,
}

impl Default for ExecutionSource {
    fn default() -> Self {
        ExecutionSource::Raw
    }
}

/// Effect of an execution on the running position within its trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionRole {
    /// First execution of a trade.
    Open,
    /// Absolute position grew versus the prior execution.
    Add,
    /// Absolute position shrank, but not to zero.
    Trim,
    /// Brought the position back to exactly zero.
    Close,
}

/// One fill. Immutable once normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicExecution {
    pub instrument: String,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub timestamp: DateTime<Utc>,
    /// Per-row realized P&L reported by the source, present only on the
    /// closing leg of a decomposed completed-trade row (the opening leg
    /// carries an explicit zero).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl_contribution: Option<Decimal>,
    #[serde(default)]
    pub source: ExecutionSource,
}

impl AtomicExecution {
    /// Signed quantity: Buy contributes +qty, Sell contributes -qty.
    pub fn signed_quantity(&self) -> Decimal {
        self.side.sign() * self.quantity
    }
}

/// An execution as recorded inside a trade, with its classified role and the
/// signed running position after it was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    #[serde(flatten)]
    pub execution: AtomicExecution,
    pub role: ExecutionRole,
    pub position_after: Decimal,
}
