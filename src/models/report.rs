//! Backfill run summary

use std::fmt;

use super::day::Day;

/// Why the day loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every day of the window was visited
    Completed,
    /// A day had no data and no previous day to fill from
    Cancelled { day: Day },
    /// The retry policy ran out of attempts for a day
    Exhausted { day: Day },
}

impl StopReason {
    pub fn is_early(&self) -> bool {
        !matches!(self, StopReason::Completed)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Completed => write!(f, "completed"),
            StopReason::Cancelled { day } => write!(f, "cancelled at {}", day),
            StopReason::Exhausted { day } => write!(f, "retries exhausted at {}", day),
        }
    }
}

/// Counters collected while walking the day grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub days_visited: usize,
    pub cache_hits: usize,
    pub fetched: usize,
    pub forward_filled: usize,
    pub skipped_for_budget: usize,
    pub fetch_attempts: usize,
    pub stop: StopReason,
}

impl Default for RunReport {
    fn default() -> Self {
        Self {
            days_visited: 0,
            cache_hits: 0,
            fetched: 0,
            forward_filled: 0,
            skipped_for_budget: 0,
            fetch_attempts: 0,
            stop: StopReason::Completed,
        }
    }
}

impl RunReport {
    /// Days newly merged into the series during this run
    pub fn merged(&self) -> usize {
        self.fetched + self.forward_filled
    }
}
