//! Trade — one flat-to-flat position cycle with journal metadata.

use super::execution::ExecutionRecord;
use super::ids::{AnnotationId, TradeId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of the position, fixed by the opening execution's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "long" => Ok(Direction::Long),
            "short" => Ok(Direction::Short),
            _ => Err(format!("unknown direction: {s}")),
        }
    }
}

/// Which of the four note fields an annotation or edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteCategory {
    Entry,
    Exit,
    #[serde(rename = "mgmt")]
    Management,
    General,
}

/// Kind of tag carried by a trade. Setup is single-valued; the other three
/// are duplicate-free sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Setup,
    Mistake,
    Success,
    Mindset,
}

impl TagKind {
    /// Display name used in combination-mining labels.
    pub fn combo_label(self) -> &'static str {
        match self {
            TagKind::Setup => "Setup",
            TagKind::Mistake => "Mistake",
            TagKind::Success => "Habit",
            TagKind::Mindset => "Mindset",
        }
    }
}

/// The four independent free-text note fields of a trade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeNotes {
    #[serde(default)]
    pub entry: String,
    #[serde(default)]
    pub exit: String,
    #[serde(default, rename = "mgmt")]
    pub management: String,
    #[serde(default)]
    pub general: String,
}

impl TradeNotes {
    pub fn get(&self, category: NoteCategory) -> &str {
        match category {
            NoteCategory::Entry => &self.entry,
            NoteCategory::Exit => &self.exit,
            NoteCategory::Management => &self.management,
            NoteCategory::General => &self.general,
        }
    }

    pub fn set(&mut self, category: NoteCategory, text: impl Into<String>) {
        *self.field_mut(category) = text.into();
    }

    /// Append a line to a note field, separated by a newline when the field
    /// already holds text.
    pub fn append_line(&mut self, category: NoteCategory, line: &str) {
        let field = self.field_mut(category);
        if field.is_empty() {
            field.push_str(line);
        } else {
            field.push('\n');
            field.push_str(line);
        }
    }

    fn field_mut(&mut self, category: NoteCategory) -> &mut String {
        match category {
            NoteCategory::Entry => &mut self.entry,
            NoteCategory::Exit => &mut self.exit,
            NoteCategory::Management => &mut self.management,
            NoteCategory::General => &mut self.general,
        }
    }
}

/// A chart-anchored note. Position is normalized to percentage offsets so it
/// survives chart resizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub category: NoteCategory,
    /// When both tag fields are present, saving the annotation also mutates
    /// the parent trade's tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_type: Option<TagKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_value: Option<String>,
}

impl Annotation {
    /// Build an annotation, clamping the anchor into the [0, 100] range.
    pub fn new(id: AnnotationId, x: f64, y: f64, text: impl Into<String>, category: NoteCategory) -> Self {
        Self {
            id,
            x: x.clamp(0.0, 100.0),
            y: y.clamp(0.0, 100.0),
            text: text.into(),
            category,
            tag_type: None,
            tag_value: None,
        }
    }

    pub fn with_tag(mut self, kind: TagKind, value: impl Into<String>) -> Self {
        self.tag_type = Some(kind);
        self.tag_value = Some(value.into());
        self
    }
}

/// One flat-to-flat position cycle for one instrument, plus everything the
/// journal attaches to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    // ── Identity ──
    pub id: TradeId,
    pub instrument: String,
    pub direction: Direction,

    // ── Timing ──
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,

    // ── Executions ──
    pub executions: Vec<ExecutionRecord>,

    // ── P&L ──
    pub realized_pnl: Decimal,
    /// Cumulative P&L as of this trade in open-time ascending order.
    #[serde(default)]
    pub running_equity: Decimal,

    // ── Journal metadata ──
    /// Single-valued setup tag; empty string means unset.
    #[serde(default)]
    pub setup: String,
    #[serde(default)]
    pub mistakes: Vec<String>,
    #[serde(default)]
    pub successes: Vec<String>,
    #[serde(default)]
    pub mindsets: Vec<String>,
    #[serde(default)]
    pub notes: TradeNotes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_image: Option<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.realized_pnl > Decimal::ZERO
    }

    /// A trade is closed once its final execution returns the position to
    /// exactly zero. Imports with an unclosed tail produce open trades.
    pub fn is_closed(&self) -> bool {
        self.executions
            .last()
            .is_some_and(|record| record.position_after.is_zero())
    }

    /// Setup tag, if one is set.
    pub fn setup(&self) -> Option<&str> {
        if self.setup.is_empty() {
            None
        } else {
            Some(self.setup.as_str())
        }
    }

    pub fn duration(&self) -> chrono::Duration {
        self.close_time - self.open_time
    }

    /// Sum of signed execution quantities. Zero for any closed trade built
    /// by reconstruction; merged trades may deviate since their execution
    /// lists span several source trades.
    pub fn net_position(&self) -> Decimal {
        self.executions
            .iter()
            .map(|record| record.execution.signed_quantity())
            .sum()
    }

    /// Tag set for a multi-valued kind. Panics on `TagKind::Setup`, which is
    /// single-valued and accessed through [`Trade::setup`].
    pub fn tags(&self, kind: TagKind) -> &[String] {
        match kind {
            TagKind::Mistake => &self.mistakes,
            TagKind::Success => &self.successes,
            TagKind::Mindset => &self.mindsets,
            TagKind::Setup => panic!("setup is single-valued; use Trade::setup"),
        }
    }

    pub fn set_note(&mut self, category: NoteCategory, text: impl Into<String>) {
        self.notes.set(category, text);
    }

    pub fn set_chart_image(&mut self, reference: Option<String>) {
        self.chart_image = reference;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::{AtomicExecution, ExecutionRole, ExecutionSource, Side};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn record(side: Side, qty: Decimal, position_after: Decimal, role: ExecutionRole) -> ExecutionRecord {
        ExecutionRecord {
            execution: AtomicExecution {
                instrument: "NQ".into(),
                side,
                price: dec!(15000),
                quantity: qty,
                timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 9, 31, 0).unwrap(),
                pnl_contribution: None,
                source: ExecutionSource::Raw,
            },
            role,
            position_after,
        }
    }

    fn sample_trade() -> Trade {
        let open = Utc.with_ymd_and_hms(2024, 3, 4, 9, 31, 0).unwrap();
        Trade {
            id: TradeId::derive("NQ", open, 0),
            instrument: "NQ".into(),
            direction: Direction::Long,
            open_time: open,
            close_time: open + chrono::Duration::minutes(12),
            executions: vec![
                record(Side::Buy, dec!(1), dec!(1), ExecutionRole::Open),
                record(Side::Sell, dec!(1), dec!(0), ExecutionRole::Close),
            ],
            realized_pnl: dec!(1000),
            running_equity: dec!(1000),
            setup: "Breakout".into(),
            mistakes: vec![],
            successes: vec!["Patience".into()],
            mindsets: vec!["Focused".into()],
            notes: TradeNotes::default(),
            chart_image: None,
            annotations: vec![],
        }
    }

    #[test]
    fn winner_and_closed() {
        let trade = sample_trade();
        assert!(trade.is_winner());
        assert!(trade.is_closed());
        assert_eq!(trade.net_position(), Decimal::ZERO);
    }

    #[test]
    fn open_trade_is_not_closed() {
        let mut trade = sample_trade();
        trade.executions.pop();
        assert!(!trade.is_closed());
        assert_eq!(trade.net_position(), dec!(1));
    }

    #[test]
    fn empty_setup_reads_as_none() {
        let mut trade = sample_trade();
        assert_eq!(trade.setup(), Some("Breakout"));
        trade.setup.clear();
        assert_eq!(trade.setup(), None);
    }

    #[test]
    fn notes_append_joins_with_newline() {
        let mut notes = TradeNotes::default();
        notes.append_line(NoteCategory::Entry, "[Chart] first");
        assert_eq!(notes.entry, "[Chart] first");
        notes.append_line(NoteCategory::Entry, "[Chart] second");
        assert_eq!(notes.entry, "[Chart] first\n[Chart] second");
    }

    #[test]
    fn annotation_anchor_clamped() {
        let anno = Annotation::new(AnnotationId::new("a1"), 140.0, -3.0, "late entry", NoteCategory::Entry);
        assert_eq!(anno.x, 100.0);
        assert_eq!(anno.y, 0.0);
    }

    #[test]
    fn serialization_uses_journal_field_names() {
        let trade = sample_trade();
        let json = serde_json::to_value(&trade).unwrap();
        assert!(json.get("openTime").is_some());
        assert!(json.get("closeTime").is_some());
        assert!(json.get("realizedPnl").is_some());
        assert!(json.get("runningEquity").is_some());
        assert_eq!(json["direction"], "Long");
    }

    #[test]
    fn notes_serialize_mgmt_key() {
        let mut notes = TradeNotes::default();
        notes.set(NoteCategory::Management, "scaled out too early");
        let json = serde_json::to_value(&notes).unwrap();
        assert_eq!(json["mgmt"], "scaled out too early");
    }

    #[test]
    fn trade_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trade);
    }
}
