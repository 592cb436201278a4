use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an optional TOML configuration file.
pub const CONFIG_PATH_VAR: &str = "RCC_CONFIG";

const TIME_FILTERS: &[&str] = &["hour", "day", "week", "month", "year", "all"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub collector: CollectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub home_page: PathBuf,
    pub subreddits_path: PathBuf,
    pub models_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            home_page: PathBuf::from("web-app/static/home.html"),
            subreddits_path: PathBuf::from("data/subreddits.json"),
            models_path: PathBuf::from("data/models.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub subreddits: Vec<String>,
    /// Number of top posts fetched per community.
    pub post_limit: u32,
    /// Reddit `t` parameter of the top listing.
    pub time_filter: String,
    /// How many "more comments" stubs to expand per post. `None` expands all
    /// of them. `Some(0)` drops every stub like PRAW's `replace_more(limit=0)`,
    /// keeping only the comments of the first page.
    pub more_comments_limit: Option<usize>,
    pub snapshot_dir: PathBuf,
    pub requests_per_minute: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            subreddits: ["politics", "atheism", "hiphopheads", "science", "worldnews"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            post_limit: 100,
            time_filter: "year".to_string(),
            more_comments_limit: None,
            snapshot_dir: PathBuf::from("snapshots"),
            requests_per_minute: 60,
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subreddits.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "at least one subreddit must be configured".to_string(),
            });
        }
        if self.post_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "collector.post_limit".to_string(),
                value: self.post_limit.to_string(),
            });
        }
        if !TIME_FILTERS.contains(&self.time_filter.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "collector.time_filter".to_string(),
                value: self.time_filter.clone(),
            });
        }
        if self.requests_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                field: "collector.requests_per_minute".to_string(),
                value: self.requests_per_minute.to_string(),
            });
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.collector.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        debug!("Loaded configuration file {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Reads the file named by `RCC_CONFIG`, or falls back to defaults when
    /// the variable is unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => {
                info!("{} not set, using default configuration", CONFIG_PATH_VAR);
                Ok(Self::default())
            }
        }
    }
}

/// Secrets for the Reddit API and the document store. Read once at startup.
#[derive(Clone)]
pub struct Credentials {
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_username: String,
    pub reddit_password: String,
    pub reddit_user_agent: String,
    pub database_url: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var_name: &str| {
            lookup(var_name).ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                var_name: var_name.to_string(),
            })
        };

        Ok(Self {
            reddit_client_id: require("REDDIT_CLIENT_ID")?,
            reddit_client_secret: require("REDDIT_CLIENT_SECRET")?,
            reddit_username: require("REDDIT_U")?,
            reddit_password: require("REDDIT_P")?,
            reddit_user_agent: require("REDDIT_USER_AGENT")?,
            database_url: require("RCC_DATABASE_URL")?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("reddit_client_id", &self.reddit_client_id)
            .field("reddit_client_secret", &"<redacted>")
            .field("reddit_username", &self.reddit_username)
            .field("reddit_password", &"<redacted>")
            .field("reddit_user_agent", &self.reddit_user_agent)
            .field("database_url", &self.database_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        [
            ("REDDIT_CLIENT_ID", "id"),
            ("REDDIT_CLIENT_SECRET", "secret"),
            ("REDDIT_U", "user"),
            ("REDDIT_P", "pass"),
            ("REDDIT_USER_AGENT", "rcc/0.1 by user"),
            ("RCC_DATABASE_URL", "sqlite://rcc.db"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect()
    }

    #[test]
    fn test_defaults_match_collection_limits() {
        let config = AppConfig::default();
        assert_eq!(config.collector.post_limit, 100);
        assert_eq!(config.collector.time_filter, "year");
        assert_eq!(config.collector.more_comments_limit, None);
        assert_eq!(config.collector.subreddits.len(), 5);
        assert_eq!(config.server.bind_address, "127.0.0.1:5000");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [collector]
            subreddits = ["rust"]
            more_comments_limit = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.collector.subreddits, vec!["rust".to_string()]);
        assert_eq!(config.collector.more_comments_limit, Some(0));
        assert_eq!(config.collector.post_limit, 100);
        assert_eq!(
            config.server.models_path,
            PathBuf::from("data/models.json")
        );
    }

    #[test]
    fn test_invalid_time_filter_rejected() {
        let result = AppConfig::from_toml_str(
            r#"
            [collector]
            time_filter = "decade"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_example_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../rcc.example.toml");
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.server.home_page, PathBuf::from("web-app/static/home.html"));
        assert_eq!(config.collector.more_comments_limit, None);
        assert_eq!(config.collector.requests_per_minute, 60);
    }

    #[test]
    fn test_credentials_from_lookup() {
        let env = full_env();
        let credentials = Credentials::from_lookup(|name| env.get(name).cloned()).unwrap();
        assert_eq!(credentials.reddit_username, "user");
        assert_eq!(credentials.database_url, "sqlite://rcc.db");
        assert!(!format!("{:?}", credentials).contains("\"pass\""));
    }

    #[test]
    fn test_missing_credential_is_fatal() {
        let mut env = full_env();
        env.remove("REDDIT_P");
        let result = Credentials::from_lookup(|name| env.get(name).cloned());
        match result {
            Err(ConfigError::MissingEnvironmentVariable { var_name }) => {
                assert_eq!(var_name, "REDDIT_P")
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
