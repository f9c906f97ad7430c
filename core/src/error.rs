//! Error type for `Utils` requests.
//!
//! # Design
//! A failing response whose body carries a structured message is not an
//! error at all: it is surfaced through the `Notifier` and the request
//! resolves to `Ok(None)`. Everything else that goes wrong ends up here.

/// Errors returned by `Utils` request methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status and no usable error message.
    #[error("Unknown error")]
    Unknown,

    /// The round trip itself failed (connection refused, DNS, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body was not JSON, or not the shape the caller asked for.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}
