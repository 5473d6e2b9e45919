//! Loading and shaping of social media performance exports.
//!
//! Reads the weekly per-platform metrics file and the top posts file into
//! typed rows, then reduces them to the aggregates a dashboard shows:
//! all-time totals, week-over-week deltas, per-platform breakdowns, trend
//! series and top post rankings.

pub mod aggregate;
pub mod change;
pub mod loader;
pub mod record;
