//! Client configuration from the environment

use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_LOG_FILTER: &str = "cosmic_quest=info";

/// Settings read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without a trailing slash
    pub api_base_url: String,
    pub log_path: PathBuf,
    pub log_filter: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; blank values count as unset
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_base_url = var("COSMIC_QUEST_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let log_path = var("COSMIC_QUEST_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("cosmic-quest.log"));

        let log_filter = var("COSMIC_QUEST_LOG")
            .or_else(|| var("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Self {
            api_base_url,
            log_path,
            log_filter,
        }
    }
}
