pub mod backfill_service;
pub mod series_service;

pub use backfill_service::{run_once, BackfillController};
