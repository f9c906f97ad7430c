use serde::Deserialize;

/// Name of the response field that carries a human-readable failure reason.
pub const DEFAULT_ERROR_FIELD: &str = "err_msg";

/// Settings for `Utils`.
///
/// Deserializable so a host can keep it in its own config file, e.g.
///
/// ```toml
/// base_url = "http://127.0.0.1:8080"
/// error_field = "err_msg"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UtilsConfig {
    /// Prefix for relative request URLs. Absolute URLs ignore it.
    pub base_url: Option<String>,
    pub error_field: String,
}

impl Default for UtilsConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            error_field: DEFAULT_ERROR_FIELD.to_string(),
        }
    }
}

impl UtilsConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: Some(base_url.to_string()),
            ..Self::default()
        }
    }

    /// Resolve `url` against `base_url`.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        match &self.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            ),
            None => url.to_string(),
        }
    }
}
