//! Client-side constants and the configuration struct built from them.

use serde::Deserialize;

/// Path prefix of the todo API.
pub const API_BASE_URL: &str = "/api";

/// Number of todos requested per list page.
pub const PAGE_SIZE: u32 = 10;

/// Maximum number of characters in a todo title.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Settings shared by the request builders and the local validators.
///
/// Not negotiated with the server. A host may deserialize it from its own
/// settings file; missing fields fall back to the constants above.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub page_size: u32,
    pub max_title_length: usize,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            page_size: PAGE_SIZE,
            max_title_length: MAX_TITLE_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "/api");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.max_title_length, 100);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"page_size": 25}"#).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.base_url, "/api");
        assert_eq!(config.max_title_length, 100);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("http://localhost:3000/api/");
        assert_eq!(config.base_url, "http://localhost:3000/api");
    }
}
