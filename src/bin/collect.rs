use collector::Collector;
use database::PostStore;
use rcc_core::{AppConfig, CoreError, Credentials, ErrorReporter};
use reddit_client::{RedditClient, RedditConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("rcc=info,collector=info,reddit_client=info,database=info")
        }))
        .init();

    let reporter = ErrorReporter::new();
    let result = run().await;
    if let Err(e) = &result {
        reporter.report_error(e);
    }
    result
}

async fn run() -> Result<(), CoreError> {
    let credentials = Credentials::from_env()?;
    let config = AppConfig::load()?;
    tracing::debug!("Collector credentials: {:?}", credentials);

    let mut store = PostStore::new(credentials.database_url.clone());
    store.connect().await?;
    store.run_migrations().await?;

    let mut reddit = RedditClient::new(RedditConfig::from_credentials(
        &credentials,
        config.collector.requests_per_minute,
    ))?;
    reddit.authenticate().await?;

    let mut collector = Collector::new(reddit, store, config.collector);
    let summary = collector.run().await?;
    tracing::info!(
        "COMPLETE: {} posts and {} comments stored",
        summary.posts,
        summary.comments
    );

    collector.store().close().await;
    Ok(())
}
