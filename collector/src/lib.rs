pub mod snapshot;

use chrono::{Local, NaiveDate, TimeZone};
use database::PostStore;
use rcc_core::{CollectorConfig, CommentRecord, CoreError, PostDocument};
use reddit_client::api::RedditPostData;
use reddit_client::RedditClient;
use tracing::info;

pub use snapshot::SnapshotWriter;

/// Where posts and their flattened comments come from.
#[allow(async_fn_in_trait)]
pub trait CommentSource {
    async fn top_posts(
        &mut self,
        subreddit: &str,
        time_filter: &str,
        limit: u32,
    ) -> Result<Vec<RedditPostData>, CoreError>;

    async fn comments(
        &mut self,
        post: &RedditPostData,
        more_limit: Option<usize>,
    ) -> Result<Vec<CommentRecord>, CoreError>;
}

impl CommentSource for RedditClient {
    async fn top_posts(
        &mut self,
        subreddit: &str,
        time_filter: &str,
        limit: u32,
    ) -> Result<Vec<RedditPostData>, CoreError> {
        self.fetch_top_posts(subreddit, time_filter, limit).await
    }

    async fn comments(
        &mut self,
        post: &RedditPostData,
        more_limit: Option<usize>,
    ) -> Result<Vec<CommentRecord>, CoreError> {
        self.fetch_comments(post, more_limit).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionSummary {
    pub posts: usize,
    pub comments: usize,
}

/// One sequential collection run over the configured communities. The
/// first failure ends the run.
pub struct Collector<S> {
    source: S,
    store: PostStore,
    snapshots: SnapshotWriter,
    config: CollectorConfig,
}

impl<S: CommentSource> Collector<S> {
    pub fn new(source: S, store: PostStore, config: CollectorConfig) -> Self {
        let snapshots = SnapshotWriter::new(config.snapshot_dir.clone());
        Self {
            source,
            store,
            snapshots,
            config,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &PostStore {
        &self.store
    }

    pub async fn run(&mut self) -> Result<CollectionSummary, CoreError> {
        let mut summary = CollectionSummary::default();
        let today = Local::now().date_naive();

        for subreddit in self.config.subreddits.clone() {
            let collected = self.collect_subreddit(&subreddit, today).await?;
            summary.posts += collected.posts;
            summary.comments += collected.comments;
        }

        info!(
            "Collection complete: {} posts, {} comments",
            summary.posts, summary.comments
        );
        Ok(summary)
    }

    pub async fn collect_subreddit(
        &mut self,
        subreddit: &str,
        today: NaiveDate,
    ) -> Result<CollectionSummary, CoreError> {
        let posts = self
            .source
            .top_posts(subreddit, &self.config.time_filter, self.config.post_limit)
            .await?;

        let mut summary = CollectionSummary::default();
        for post in posts {
            info!("Getting comments for {} {}", subreddit, post.id);
            let comments = self
                .source
                .comments(&post, self.config.more_comments_limit)
                .await?;

            let document = PostDocument {
                subreddit: subreddit.to_string(),
                post_id: post.id.clone(),
                post_age: post_age_days(post.created_utc, today)?,
                comments,
            };

            self.snapshots.write(&document)?;
            self.store.insert_post_document(&document).await?;

            summary.posts += 1;
            summary.comments += document.comments.len();
        }

        info!(
            "Collected {} posts from r/{}",
            summary.posts, subreddit
        );
        Ok(summary)
    }
}

/// Whole days between the post's local creation date and `today`.
pub fn post_age_days(created_utc: f64, today: NaiveDate) -> Result<i64, CoreError> {
    let created = Local
        .timestamp_opt(created_utc.trunc() as i64, 0)
        .earliest()
        .ok_or_else(|| CoreError::InvalidInput {
            message: format!("Invalid post timestamp {}", created_utc),
        })?;
    Ok((today - created.date_naive()).num_days())
}
