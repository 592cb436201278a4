use crate::error::*;
use std::fmt::Display;
use tracing::{error, info, warn};

/// Stable codes, end-user wording and logging shared by every error enum.
pub trait ErrorExt: Display {
    /// Machine-readable code, also sent to HTTP clients.
    fn error_code(&self) -> &'static str;

    fn user_friendly_message(&self) -> String;

    fn is_retryable(&self) -> bool {
        false
    }

    fn log_error(&self) -> &Self {
        error!(code = self.error_code(), "{}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!(code = self.error_code(), "{}", self);
        self
    }
}

impl ErrorExt for CoreError {
    fn error_code(&self) -> &'static str {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API",
            CoreError::Database(_) => "DATABASE",
            CoreError::Model(_) => "MODEL",
            CoreError::Prediction(e) => e.error_code(),
            CoreError::Config(_) => "CONFIG",
            CoreError::Io(_) => "IO",
            CoreError::Serialization(_) => "SERIALIZATION",
            CoreError::Network(_) => "NETWORK",
            CoreError::InvalidInput { .. } => "INVALID_INPUT",
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Database(e) => e.user_friendly_message(),
            CoreError::Model(e) => e.user_friendly_message(),
            CoreError::Prediction(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Io(e) => format!("File access failed: {}.", e),
            CoreError::Serialization(_) => "Data could not be encoded or decoded.".to_string(),
            CoreError::Network(_) => "Could not reach Reddit. Check the network.".to_string(),
            CoreError::InvalidInput { message } => message.clone(),
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::RedditApi(e) => e.is_retryable(),
            CoreError::Database(e) => e.is_retryable(),
            CoreError::Network(_) => true,
            _ => false,
        }
    }

    fn log_error(&self) -> &Self {
        error!(code = self.error_code(), "{}", self);
        match self {
            CoreError::RedditApi(e) => error!("Reddit API error details: {:?}", e),
            CoreError::Database(e) => error!("Document store error details: {:?}", e),
            CoreError::Model(e) => error!("Model error details: {:?}", e),
            _ => {}
        }
        self
    }
}

impl ErrorExt for RedditApiError {
    fn error_code(&self) -> &'static str {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED",
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT",
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN",
            RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND",
            RedditApiError::PostNotFound { .. } => "REDDIT_POST_NOT_FOUND",
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN",
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT",
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE",
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR",
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => {
                "Reddit rejected the script credentials (REDDIT_CLIENT_ID, REDDIT_U, ...)."
                    .to_string()
            }
            RedditApiError::RateLimitExceeded { retry_after } => {
                format!("Reddit rate limit hit; retry in {} seconds.", retry_after)
            }
            RedditApiError::Forbidden { resource } => {
                format!("Reddit refused access to {}.", resource)
            }
            RedditApiError::SubredditNotFound { subreddit } => {
                format!("r/{} does not exist or is private.", subreddit)
            }
            RedditApiError::PostNotFound { post_id } => {
                format!("Post {} is no longer available.", post_id)
            }
            RedditApiError::InvalidToken => {
                "The Reddit access token was rejected; authenticate again.".to_string()
            }
            RedditApiError::RequestTimeout => "Reddit did not answer in time.".to_string(),
            RedditApiError::InvalidResponse { details } => {
                format!("Unexpected answer from Reddit: {}", details)
            }
            RedditApiError::ServerError { status_code } => {
                format!("Reddit is having trouble (HTTP {}).", status_code)
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            RedditApiError::RateLimitExceeded { .. }
                | RedditApiError::RequestTimeout
                | RedditApiError::ServerError { .. }
        )
    }
}

impl ErrorExt for DatabaseError {
    fn error_code(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed { .. } => "DB_CONNECTION_FAILED",
            DatabaseError::MigrationFailed { .. } => "DB_MIGRATION_FAILED",
            DatabaseError::CorruptDocument { .. } => "DB_CORRUPT_DOCUMENT",
            DatabaseError::Sql(_) => "DB_SQL_ERROR",
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            DatabaseError::ConnectionFailed { reason } => {
                format!("Could not open the document store: {}", reason)
            }
            DatabaseError::MigrationFailed { .. } => {
                "The document store schema could not be created.".to_string()
            }
            DatabaseError::CorruptDocument { collection, post_id } => {
                format!("Document {} in {} could not be read.", post_id, collection)
            }
            DatabaseError::Sql(_) => "A document store query failed.".to_string(),
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, DatabaseError::ConnectionFailed { .. })
    }
}

impl ErrorExt for ModelError {
    fn error_code(&self) -> &'static str {
        match self {
            ModelError::ArtifactNotFound { .. } => "MODEL_NOT_FOUND",
            ModelError::InvalidArtifact { .. } => "MODEL_INVALID_ARTIFACT",
            ModelError::MatrixShapeMismatch { .. } => "MODEL_MATRIX_SHAPE",
            ModelError::FeatureCountMismatch { .. } => "MODEL_FEATURE_COUNT",
            ModelError::MalformedTree { .. } => "MODEL_MALFORMED_TREE",
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ModelError::ArtifactNotFound { path } => {
                format!("Model file '{}' could not be found.", path)
            }
            ModelError::InvalidArtifact { path, .. } => {
                format!("Model file '{}' is not a valid model bundle.", path)
            }
            _ => "The trained model is inconsistent and cannot be used.".to_string(),
        }
    }
}

impl ErrorExt for PredictionError {
    fn error_code(&self) -> &'static str {
        match self {
            PredictionError::UnknownCommunity { .. } => "UNKNOWN_COMMUNITY",
            PredictionError::FeatureMismatch { .. } => "FEATURE_MISMATCH",
            PredictionError::InvalidRequest { .. } => "INVALID_REQUEST",
            PredictionError::EmptyVocabulary => "EMPTY_VOCABULARY",
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            PredictionError::UnknownCommunity { community } => {
                format!("No model is available for r/{}.", community)
            }
            PredictionError::FeatureMismatch { .. } => {
                "The model could not score this comment.".to_string()
            }
            PredictionError::InvalidRequest { reason } => {
                format!("Invalid prediction request: {}", reason)
            }
            PredictionError::EmptyVocabulary => {
                "The comment has no words left to classify once stopwords are removed."
                    .to_string()
            }
        }
    }
}

impl ErrorExt for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND",
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE",
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV_VAR",
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED",
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR",
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => format!("File '{}' does not exist.", path),
            ConfigError::InvalidValue { field, value } => {
                format!("'{}' is not a valid value for {}.", value, field)
            }
            ConfigError::MissingEnvironmentVariable { var_name } => {
                format!("Set the {} environment variable.", var_name)
            }
            ConfigError::ValidationFailed { reason } => reason.clone(),
            ConfigError::Parse(e) => format!("The configuration file is not valid TOML: {}", e),
        }
    }
}

/// Final error output of the binaries.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    quiet: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppresses the extra code and hint lines.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        if !self.quiet {
            info!("Error code: {}", error.error_code());
            info!("Hint: {}", error.user_friendly_message());
            if error.is_retryable() {
                info!("This error is usually temporary; running again may succeed.");
            }
        }
    }

    pub fn report_warning(&self, error: &CoreError) {
        error.log_warn();
    }
}
