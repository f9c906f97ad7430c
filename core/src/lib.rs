//! JSON request helpers and display formatting for the live-recorder web UI.
//!
//! # Overview
//! `Utils` wraps an HTTP `Transport` with JSON encoding/decoding and error
//! surfacing: GET/POST/PUT/DELETE requests resolve to the parsed response
//! body, to `None` after a structured server error has been shown through a
//! `Notifier`, or to an `ApiError`. `format` holds two pure helpers for
//! byte sizes and Unix timestamps.
//!
//! # Design
//! - Request construction (`build_*`) and response interpretation
//!   (`handle_response`) are pure; only `Transport::execute` does I/O.
//! - `UreqTransport` is the bundled transport; hosts can supply their own.
//! - The user-facing alert is the `Notifier` trait, logging by default.

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod http;
pub mod notify;
pub mod transport;

pub use client::Utils;
pub use config::UtilsConfig;
pub use error::ApiError;
pub use format::{human_file_size, human_timestamp, human_timestamp_in};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notify::{alert_error, LogNotifier, MemoryNotifier, Notifier};
pub use transport::{Transport, UreqTransport};
