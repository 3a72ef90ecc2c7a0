//! Domain types for the journal engine.

pub mod execution;
pub mod ids;
pub mod trade;

pub use execution::{AtomicExecution, ExecutionRecord, ExecutionRole, ExecutionSource, Side};
pub use ids::{AnnotationId, SourceHash, TradeId};
pub use trade::{Annotation, Direction, NoteCategory, TagKind, Trade, TradeNotes};
