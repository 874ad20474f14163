//! WATI SDK: a client for the WATI WhatsApp Business API.
//!
//! [`Client`] wraps every call in one request pipeline (rate limiting,
//! linear-backoff retries and error classification) and exposes the
//! resource façades:
//!
//! - [`contacts`]: contact lookup and maintenance
//! - [`messages`]: session, template and interactive messages
//! - [`chatbots`]: chatbot definitions and chat sessions
//! - [`media`]: uploads and the media library
//! - [`webhooks`]: signed event receiver and remote registration

pub mod api;
pub mod chatbots;
pub mod client;
pub mod config;
pub mod contacts;
pub mod context;
pub mod media;
pub mod messages;
pub mod time;
pub mod transport;
pub mod webhooks;

pub use api::Error;
pub use client::Client;
pub use config::ClientConfig;
pub use context::Context;
