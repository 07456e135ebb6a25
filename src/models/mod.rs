//! Data models for the backfill run
//!
//! Days, windows, price series and the per-run report. These are plain data
//! types; loading, fetching and persisting live in `services`.

pub mod day;
pub mod series;
pub mod report;

// Re-export commonly used types for convenience
pub use day::{Day, Window};
pub use series::{PricePoint, Series};
pub use report::{RunReport, StopReason};
