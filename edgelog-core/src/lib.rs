//! EdgeLog Core — trade reconstruction, journaling, and statistics.
//!
//! This crate contains everything that happens between a broker export and
//! the numbers on the dashboard:
//! - Domain types (executions, trades, notes, annotations, ids)
//! - Import pipeline: CSV splitting, format detection, manual column
//!   mapping, row normalization, JSON snapshots
//! - Trade reconstruction from raw executions by walking each
//!   instrument's running position
//! - Journal edits: merge, tags, notes, chart annotations
//! - Statistics: scalar metrics, tag breakdowns, setup scorecards,
//!   combination mining
//! - Seeded demo data generation
//!
//! The core is pure and synchronous. All I/O (files, journal persistence,
//! terminal output) lives in the CLI crate.

pub mod config;
pub mod demo;
pub mod domain;
pub mod engine;
pub mod import;
pub mod stats;
