use thiserror::Error;

/// Top-level error of every crate in the workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("Document store: {0}")]
    Database(#[from] DatabaseError),

    #[error("Model: {0}")]
    Model(#[from] ModelError),

    #[error("Prediction: {0}")]
    Prediction(#[from] PredictionError),

    #[error("Configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP transport: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("password grant rejected: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("rate limited for {retry_after}s")]
    RateLimitExceeded { retry_after: u64 },

    #[error("403 on {resource}")]
    Forbidden { resource: String },

    #[error("no such subreddit r/{subreddit}")]
    SubredditNotFound { subreddit: String },

    #[error("no such post {post_id}")]
    PostNotFound { post_id: String },

    #[error("access token rejected")]
    InvalidToken,

    #[error("request timed out")]
    RequestTimeout,

    #[error("unexpected response: {details}")]
    InvalidResponse { details: String },

    #[error("HTTP {status_code} from Reddit")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("cannot connect: {reason}")]
    ConnectionFailed { reason: String },

    #[error("migration failed: {migration}")]
    MigrationFailed { migration: String },

    /// The stored comments column is not a JSON list of comment triples.
    #[error("unreadable comments for post {post_id} in {collection}")]
    CorruptDocument { collection: String, post_id: String },

    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

/// Problems with the model artifacts, detected while loading them.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("artifact not found: {path}")]
    ArtifactNotFound { path: String },

    #[error("invalid artifact {path}: {details}")]
    InvalidArtifact { path: String, details: String },

    #[error("fitted matrix for {community} has {actual} columns, vocabulary has {expected} terms")]
    MatrixShapeMismatch {
        community: String,
        expected: usize,
        actual: usize,
    },

    #[error("classifier for {community} expects {actual} features, bundle provides {expected}")]
    FeatureCountMismatch {
        community: String,
        expected: usize,
        actual: usize,
    },

    #[error("malformed decision tree: {reason}")]
    MalformedTree { reason: String },
}

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("no model bundle for community {community}")]
    UnknownCommunity { community: String },

    #[error("classifier was fit on {expected} features, received {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Nothing of two or more word characters survives cleaning, so there
    /// is no n-gram to vectorize.
    #[error("comment has an empty vocabulary after cleaning")]
    EmptyVocabulary,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    #[error("{field} = {value:?} is not allowed")]
    InvalidValue { field: String, value: String },

    #[error("{var_name} is not set")]
    MissingEnvironmentVariable { var_name: String },

    #[error("{reason}")]
    ValidationFailed { reason: String },

    #[error(transparent)]
    Parse(#[from] toml::de::Error),
}
