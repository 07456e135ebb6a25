pub mod breaker;
pub mod budget;
pub mod errors;
pub mod pacer;
#[cfg(test)]
pub mod stub_http;

pub use breaker::{Breaker, BreakerError, RetryPolicy, Step};
pub use budget::FetchBudget;
pub use pacer::Pacer;
