//! Incremental backfill of the daily close series
//!
//! Walks the window's day grid in ascending order, keeps cached days, and
//! fetches a bounded number of missing days through the retry policy. Days
//! the remote source has no data for take the previous day's close. The run
//! stops early when a day can be neither fetched nor filled, or when retries
//! for a day run out; whatever was merged up to then is still persisted.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::{QuoteError, QuoteFetcher, QuoteResult};
use crate::models::{Day, RunReport, Series, StopReason, Window};
use crate::services::series_service::{load_series, render_series};
use crate::storage::BlobStore;
use crate::utils::errors::RunError;
use crate::utils::{BreakerError, FetchBudget, Pacer, RetryPolicy, Step};

/// How a missing day was resolved
#[derive(Debug, Clone, Copy, PartialEq)]
enum Resolution {
    Fetched(f64),
    ForwardFilled(f64),
}

/// Drives quote fetches for the days missing from a series
pub struct BackfillController<F, P> {
    fetcher: F,
    policy: P,
    fetch_limit: usize,
    request_delay: Duration,
}

impl<F, P> BackfillController<F, P>
where
    F: QuoteFetcher,
    P: RetryPolicy,
{
    pub fn new(fetcher: F, policy: P, fetch_limit: usize, request_delay: Duration) -> Self {
        Self {
            fetcher,
            policy,
            fetch_limit,
            request_delay,
        }
    }

    /// Fill gaps of `series` inside `window`.
    ///
    /// Returns the run report on completion or early stop. A fatal quote
    /// error is returned as-is; points merged before it stay in `series`.
    pub async fn run(&self, series: &mut Series, window: Window) -> Result<RunReport, QuoteError> {
        let mut budget = FetchBudget::new(self.fetch_limit);
        let mut pacer = Pacer::new(self.request_delay);
        let mut report = RunReport::default();

        for day in window.days() {
            report.days_visited += 1;

            if series.lookup(day).is_some() {
                report.cache_hits += 1;
                continue;
            }

            if !budget.try_take() {
                report.skipped_for_budget += 1;
                continue;
            }

            pacer.wait().await;
            info!("Filling remote price for {} ({} fetches left)", day, budget.remaining());
            let outcome = self.resolve(series, day).await;
            pacer.record();

            match outcome {
                Ok(Resolution::Fetched(price)) => {
                    debug!("Fetched {} close {:.6}", day, price);
                    series.merge(day, price);
                    report.fetched += 1;
                }
                Ok(Resolution::ForwardFilled(price)) => {
                    warn!("No quote for {}, carrying forward {:.6}", day, price);
                    series.merge(day, price);
                    report.forward_filled += 1;
                }
                Err(BreakerError::Cancelled) => {
                    warn!("No quote for {} and nothing to carry forward, stopping run", day);
                    report.stop = StopReason::Cancelled { day };
                    break;
                }
                Err(BreakerError::Exhausted { attempts, last }) => {
                    warn!("Giving up on {} after {} attempts: {}", day, attempts, last);
                    report.stop = StopReason::Exhausted { day };
                    break;
                }
                Err(BreakerError::Aborted(e)) => return Err(e),
            }
        }

        if report.skipped_for_budget > 0 {
            debug!(
                "Fetch limit of {} reached, {} missing days left for later runs",
                self.fetch_limit, report.skipped_for_budget
            );
        }
        report.fetch_attempts = budget.used();
        Ok(report)
    }

    /// Fetch one day through the retry policy, falling back to the previous day's close
    async fn resolve(&self, series: &Series, day: Day) -> Result<Resolution, BreakerError<QuoteError>> {
        let fetcher = &self.fetcher;
        let previous = day.previous().and_then(|prev| series.lookup(prev));

        self.policy
            .execute(move || async move {
                match fetcher.fetch(day).await {
                    Ok(QuoteResult::Price(price)) => Ok(Resolution::Fetched(price)),
                    Ok(QuoteResult::NoData) => previous
                        .map(Resolution::ForwardFilled)
                        .ok_or(Step::Cancel),
                    Err(e) if e.is_retryable() => Err(Step::Retry(e)),
                    Err(e) => Err(Step::Abort(e)),
                }
            })
            .await
    }
}

/// Load the cached series, backfill it over `window`, and persist the result.
///
/// The series is written back after both natural completion and an early
/// stop. Any fatal error returns before the write, leaving the stored series
/// untouched.
pub async fn run_once<F, P>(
    store: &dyn BlobStore,
    container: &str,
    key: &str,
    controller: &BackfillController<F, P>,
    window: Window,
) -> Result<RunReport, RunError>
where
    F: QuoteFetcher,
    P: RetryPolicy,
{
    let bytes = match store.get(container, key).await {
        Ok(bytes) => bytes,
        Err(e) if e.is_not_found() => {
            info!("No cached series at {}/{}, starting empty", container, key);
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    let mut series = load_series(&bytes)?;
    if series.is_empty() {
        debug!("Cached series holds no days");
    }
    let outside = series.points().iter().filter(|p| !window.contains(p.day)).count();
    if outside > 0 {
        debug!("{} cached days fall outside the window and are kept as-is", outside);
    }
    info!(
        "Loaded {} cached days, backfilling {} through {}",
        series.len(),
        window.start,
        window.end
    );

    let report = controller.run(&mut series, window).await?;

    let rendered = render_series(&series)?;
    store.put(container, key, rendered).await?;

    info!(
        "Run {}: {} days visited, {} cached, {} fetched, {} forward-filled, {} left for later ({} fetches used), {} days stored",
        report.stop,
        report.days_visited,
        report.cache_hits,
        report.fetched,
        report.forward_filled,
        report.skipped_for_budget,
        report.fetch_attempts,
        series.len()
    );
    if report.stop.is_early() {
        warn!("Run stopped early, {} new days persisted", report.merged());
    }

    Ok(report)
}
