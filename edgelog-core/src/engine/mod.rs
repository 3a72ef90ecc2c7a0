//! Trade engine — reconstruction from executions and edits on the result.
//!
//! The import pipeline hands this module a flat, normalized execution
//! stream. Reconstruction partitions it per instrument and walks each
//! partition's running position to carve out trades; the remaining
//! submodules operate on the reconstructed collection:
//!
//! 1. Reconstruct: position-crossing-zero trade boundaries, role labels
//! 2. Equity: chronological running equity across the collection
//! 3. Merge: collapse split fills into one trade
//! 4. Annotate/filter/calendar: journal edits and read-side views

pub mod annotate;
pub mod calendar;
pub mod equity;
pub mod filter;
pub mod merge;
pub mod reconstruct;

pub use annotate::{delete_annotation, save_annotation, toggle_tag, CHART_NOTE_PREFIX};
pub use calendar::{bar_index, daily_summaries, BarIndex, DaySummary};
pub use equity::apply_equity_curve;
pub use filter::{Outcome, TradeFilter};
pub use merge::{merge_trades, NOTE_SEPARATOR};
pub use reconstruct::reconstruct_trades;
