//! Configuration types for Flowscope

use serde::{Deserialize, Serialize};

/// Search index connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index base URL (e.g., "http://127.0.0.1:9200")
    pub url: String,

    /// API key for authenticated clusters (optional)
    #[serde(default)]
    pub api_key: String,

    /// Index name holding session documents
    #[serde(default = "default_index_name")]
    pub index: String,

    /// Sessions per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_index_name() -> String {
    "swap-sessions".to_string()
}

fn default_page_size() -> usize {
    25
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9200".to_string(),
            api_key: String::new(),
            index: default_index_name(),
            page_size: default_page_size(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Search index connection settings
    pub index: IndexConfig,

    /// API server bind address
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    19200
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            api_host: default_api_host(),
            api_port: default_api_port(),
        }
    }
}
