//! Configuration schema.
//!
//! Hierarchy: `Config` → `StoreConfig`, `ChatConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// Default address of the RAG backend.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8601";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.ragchat/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub store: StoreConfig,
    pub chat: ChatConfig,
}

// ─────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────

/// Where and how to reach the remote session store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Base URL of the backend (e.g. `"http://127.0.0.1:8601"`).
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

// ─────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────

/// Conversation settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    /// Language of greetings, guided flows, and fallback texts.
    pub locale: Locale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.base_url, "http://127.0.0.1:8601");
        assert_eq!(config.store.timeout_secs, 30);
        assert_eq!(config.chat.locale, Locale::En);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"chat": {"locale": "ko"}}"#).unwrap();
        assert_eq!(config.chat.locale, Locale::Ko);
        assert_eq!(config.store.timeout_secs, 30);
    }

    #[test]
    fn test_camel_case_keys() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json["store"].get("baseUrl").is_some());
        assert!(json["store"].get("timeoutSecs").is_some());
        assert!(json["store"].get("base_url").is_none());
    }
}
