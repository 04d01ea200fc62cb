//! CLI configuration from the environment

use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = ".taskflow-data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Everything in one JSON file under the data directory
    Local { data_dir: PathBuf },
    /// A taskflow-server instance, optionally resuming a session token
    Remote { api_url: String, token: Option<String> },
}

impl BackendConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        match read("TASKFLOW_API_URL") {
            Some(api_url) => Self::Remote {
                api_url,
                token: read("TASKFLOW_TOKEN"),
            },
            None => Self::Local {
                data_dir: read("TASKFLOW_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            },
        }
    }
}
