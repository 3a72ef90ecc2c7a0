//! Journal configuration — tag vocabularies and the contract multiplier
//! table.
//!
//! Passed explicitly into every operation that needs it; nothing here is
//! global state. Ships with stock defaults and can be overridden from a TOML
//! file or carried inside a snapshot.

use crate::domain::TagKind;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// One multiplier rule. `pattern` is matched case-insensitively against the
/// instrument symbol, as a substring by default or as the whole symbol when
/// `exact` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierRule {
    pub pattern: String,
    pub multiplier: Decimal,
    #[serde(default)]
    pub exact: bool,
}

impl MultiplierRule {
    pub fn substring(pattern: &str, multiplier: Decimal) -> Self {
        Self {
            pattern: pattern.into(),
            multiplier,
            exact: false,
        }
    }

    pub fn exact(pattern: &str, multiplier: Decimal) -> Self {
        Self {
            pattern: pattern.into(),
            multiplier,
            exact: true,
        }
    }
}

/// Ordered contract multiplier rules. Order matters and is part of the
/// contract: rules are applied first to last and the last match wins, which
/// is how the micro futures (MNQ, MES) override the full-size rules their
/// symbols contain (NQ, ES). Unmatched symbols resolve to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultiplierTable {
    pub rules: Vec<MultiplierRule>,
}

impl MultiplierTable {
    /// Dollar value of one point for the given symbol.
    pub fn lookup(&self, instrument: &str) -> Decimal {
        let symbol = instrument.to_uppercase();
        let mut multiplier = Decimal::ONE;
        for rule in &self.rules {
            let matched = if rule.exact {
                symbol == rule.pattern.to_uppercase()
            } else {
                symbol.contains(&rule.pattern.to_uppercase())
            };
            if matched {
                multiplier = rule.multiplier;
            }
        }
        multiplier
    }
}

impl Default for MultiplierTable {
    fn default() -> Self {
        let mut rules = vec![
            MultiplierRule::substring("NQ", dec!(50)),
            MultiplierRule::substring("ES", dec!(50)),
            MultiplierRule::substring("MNQ", dec!(5)),
            MultiplierRule::substring("MES", dec!(5)),
            MultiplierRule::substring("CL", dec!(1000)),
        ];
        for equity in ["AAPL", "TSLA", "AMD", "NVDA", "SPY", "QQQ"] {
            rules.push(MultiplierRule::exact(equity, Decimal::ONE));
        }
        Self { rules }
    }
}

/// Tag vocabularies plus the multiplier table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalConfig {
    #[serde(default = "default_setups")]
    pub setups: Vec<String>,
    #[serde(default = "default_mistakes")]
    pub mistakes: Vec<String>,
    #[serde(default = "default_successes")]
    pub successes: Vec<String>,
    #[serde(default = "default_mindsets")]
    pub mindsets: Vec<String>,
    #[serde(default)]
    pub multipliers: MultiplierTable,
}

impl JournalConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Vocabulary for a multi-valued tag kind, or the setup list.
    pub fn vocabulary(&self, kind: TagKind) -> &[String] {
        match kind {
            TagKind::Setup => &self.setups,
            TagKind::Mistake => &self.mistakes,
            TagKind::Success => &self.successes,
            TagKind::Mindset => &self.mindsets,
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            setups: default_setups(),
            mistakes: default_mistakes(),
            successes: default_successes(),
            mindsets: default_mindsets(),
            multipliers: MultiplierTable::default(),
        }
    }
}

fn default_setups() -> Vec<String> {
    ["Trend Follow", "Breakout", "Reversal", "Scalp"]
        .map(String::from)
        .to_vec()
}

fn default_mistakes() -> Vec<String> {
    ["FOMO", "Chasing", "Hesitation", "Revenge", "No Plan"]
        .map(String::from)
        .to_vec()
}

fn default_successes() -> Vec<String> {
    ["Patience", "Good Risk Mgmt", "Clean Entry", "Let Runners Run"]
        .map(String::from)
        .to_vec()
}

fn default_mindsets() -> Vec<String> {
    ["Flow", "Focused", "Anxious", "Bored", "Tilted", "Tired"]
        .map(String::from)
        .to_vec()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_multipliers_match_known_symbols() {
        let table = MultiplierTable::default();
        assert_eq!(table.lookup("NQ"), dec!(50));
        assert_eq!(table.lookup("NQH4"), dec!(50));
        assert_eq!(table.lookup("ES"), dec!(50));
        assert_eq!(table.lookup("CL"), dec!(1000));
        assert_eq!(table.lookup("AAPL"), dec!(1));
        assert_eq!(table.lookup("XYZ"), dec!(1));
    }

    #[test]
    fn micro_rules_override_full_size() {
        // "MNQ" contains "NQ"; the later micro rule must win.
        let table = MultiplierTable::default();
        assert_eq!(table.lookup("MNQ"), dec!(5));
        assert_eq!(table.lookup("MESU4"), dec!(5));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let table = MultiplierTable::default();
        assert_eq!(table.lookup("mnq"), dec!(5));
        assert_eq!(table.lookup("aapl"), dec!(1));
    }

    #[test]
    fn default_vocabularies_populated() {
        let config = JournalConfig::default();
        assert_eq!(config.setups.len(), 4);
        assert_eq!(config.mistakes.len(), 5);
        assert_eq!(config.successes.len(), 4);
        assert_eq!(config.mindsets.len(), 6);
        assert!(config.vocabulary(TagKind::Mindset).contains(&"Tilted".to_string()));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = JournalConfig::from_toml(r#"setups = ["Opening Drive"]"#).unwrap();
        assert_eq!(config.setups, vec!["Opening Drive".to_string()]);
        assert_eq!(config.mistakes.len(), 5);
        assert_eq!(config.multipliers.lookup("NQ"), dec!(50));
    }

    #[test]
    fn toml_multiplier_override() {
        let text = r#"
            [[multipliers]]
            pattern = "GC"
            multiplier = "100"
        "#;
        let config = JournalConfig::from_toml(text).unwrap();
        assert_eq!(config.multipliers.lookup("GC"), dec!(100));
        // The override replaces the whole table.
        assert_eq!(config.multipliers.lookup("NQ"), dec!(1));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(JournalConfig::from_toml("setups = not-a-list").is_err());
    }
}
