//! Query-style filtering over the trade collection.

use crate::domain::{Direction, Trade};

/// Win/loss bucket for filtering. A flat trade counts as a loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
}

impl std::str::FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "win" => Ok(Outcome::Win),
            "loss" => Ok(Outcome::Loss),
            _ => Err(format!("unknown outcome: {s}")),
        }
    }
}

/// Conjunction of optional criteria. An unset field matches everything.
#[derive(Debug, Clone, Default)]
pub struct TradeFilter {
    /// Case-insensitive substring matched against instrument or setup.
    pub query: Option<String>,
    /// Exact setup name.
    pub setup: Option<String>,
    pub direction: Option<Direction>,
    pub outcome: Option<Outcome>,
}

impl TradeFilter {
    pub fn matches(&self, trade: &Trade) -> bool {
        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            let hit = trade.instrument.to_lowercase().contains(&needle)
                || trade.setup.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(setup) = &self.setup {
            if &trade.setup != setup {
                return false;
            }
        }
        if let Some(direction) = self.direction {
            if trade.direction != direction {
                return false;
            }
        }
        match self.outcome {
            Some(Outcome::Win) => trade.is_winner(),
            Some(Outcome::Loss) => !trade.is_winner(),
            None => true,
        }
    }

    /// Filtered copy of the collection, preserving order.
    pub fn apply(&self, trades: &[Trade]) -> Vec<Trade> {
        trades.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}
