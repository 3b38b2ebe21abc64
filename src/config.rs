use std::path::PathBuf;

const DEFAULT_DATABASE: &str = "roomdesk.db";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite database file (env: ROOMDESK_DATABASE)
    pub database_path: PathBuf,
    /// Log filter, e.g. `info` or `roomdesk_lib=debug` (env: ROOMDESK_LOG)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from(DEFAULT_DATABASE),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, reading `.env` first if present
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        Config {
            database_path: lookup("ROOMDESK_DATABASE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_level: lookup("ROOMDESK_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_level),
        }
    }

    /// Apply command-line overrides on top of the loaded values
    pub fn with_overrides(mut self, database_path: Option<PathBuf>, log_level: Option<String>) -> Self {
        if let Some(path) = database_path {
            self.database_path = path;
        }
        if let Some(level) = log_level {
            self.log_level = level;
        }
        self
    }
}
