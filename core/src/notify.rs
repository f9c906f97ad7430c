//! User notification for structured server errors.
//!
//! In a browser this would be a modal alert. Here it is the `Notifier`
//! trait; the default `LogNotifier` writes a warning through `tracing`.

use std::sync::Mutex;

/// Message shown when an error carries no text of its own.
pub const SERVER_ERROR: &str = "Server Error!";

/// Something that can show a message to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync,
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// Default notifier: emits a `warn` event on the `webapp_utils::alert` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(target: "webapp_utils::alert", "{message}");
    }
}

/// Keeps every message it is given, in order.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, message: &str) {
        let mut messages = match self.messages.lock() {
            Ok(messages) => messages,
            Err(poisoned) => poisoned.into_inner(),
        };
        messages.push(message.to_string());
    }
}

/// Show `err` to the user, or `Server Error!` when there is nothing to show.
pub fn alert_error<N: Notifier + ?Sized>(notifier: &N, err: Option<&str>) {
    let message = err.filter(|e| !e.is_empty()).unwrap_or(SERVER_ERROR);
    notifier.notify(message);
}
