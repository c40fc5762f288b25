//! Configuration management.
//!
//! Defaults follow the NCBI usage policy for unauthenticated clients:
//! at most 3 requests per second, with a contact email and tool name sent
//! on every request.
//!
//! # Configuration File Format
//!
//! ```toml
//! tool = "PubMedSearcher"
//! email = "someone@example.org"
//! requests_per_second = 3
//! page_size = 1000
//! output_root = "./data"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Harvest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Tool identifier sent as the `tool` parameter
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Contact email sent as the `email` parameter
    #[serde(default = "default_email")]
    pub email: String,

    /// Rate ceiling: requests permitted per rolling second
    #[serde(default = "default_rps")]
    pub requests_per_second: usize,

    /// Records requested per efetch page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Directory under which each session writes its artifacts
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            tool: std::env::var("PUBMED_HARVEST_TOOL").unwrap_or_else(|_| default_tool()),
            email: std::env::var("PUBMED_HARVEST_EMAIL").unwrap_or_else(|_| default_email()),
            requests_per_second: default_rps(),
            page_size: default_page_size(),
            output_root: default_output_root(),
        }
    }
}

fn default_tool() -> String {
    "PubMedSearcher".to_string()
}

fn default_email() -> String {
    "my_email@example.com".to_string()
}

fn default_rps() -> usize {
    3
}

fn default_page_size() -> usize {
    1000
}

fn default_output_root() -> PathBuf {
    PathBuf::from("./data")
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<HarvestConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = HarvestConfig::default();
        assert_eq!(config.requests_per_second, 3);
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.tool, "PubMedSearcher");
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("harvest.toml");

        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"email = \"lab@example.org\"\npage_size = 250\n")
            .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.email, "lab@example.org");
        assert_eq!(config.page_size, 250);
        assert_eq!(config.requests_per_second, 3);
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        std::fs::write(&path, "email = = 3").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_load_nonexistent() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
