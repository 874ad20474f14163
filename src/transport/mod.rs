//! HTTP transport for outbound API calls.
//!
//! - [`HttpRequest`] / [`HttpResponse`]: value types over `http` crate types
//! - [`HttpClient`]: the seam the request executor sends through
//! - [`ReqwestClient`]: production implementation

mod client;
mod error;
mod message;

#[cfg(test)]
mod message_tests;

pub use client::ReqwestClient;
pub use error::HttpError;
pub use message::{HttpClient, HttpRequest, HttpResponse};
