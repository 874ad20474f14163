//! Request pipeline shared by every resource façade.
//!
//! - [`ApiRequest`]: what to call
//! - [`ApiExecutor`] / [`Executor`]: rate limiting, retries, classification
//! - [`Error`] and friends: the outbound error taxonomy
//! - [`RetryPolicy`], [`RateLimiter`]: pacing of attempts

mod error;
mod executor;
mod rate_limit;
mod request;
mod retry;
mod types;

#[cfg(test)]
pub(crate) mod mock;

#[cfg(test)]
mod executor_tests;

pub use error::{
    ApiError, Error, ErrorCategory, IsRetryable, NetworkError, ValidationError, ValidationErrors,
};
pub use executor::{ApiExecutor, Executor};
pub use rate_limit::RateLimiter;
pub use request::{ApiRequest, RequestBody};
pub use retry::RetryPolicy;
pub use types::{BaseResponse, CustomParam, Parameter, Pagination, TokenResponse};
pub(crate) use types::{MIN_PHONE_LENGTH, path_segment, with_query};
