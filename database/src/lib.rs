use chrono::Utc;
use rcc_core::{CommentRecord, CoreError, DatabaseError, PostDocument};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};


/// Document store for collected posts. Each community's documents live in
/// their own logical collection, named by [`rcc_core::collection_name`].
pub struct PostStore {
    connection_string: String,
    pool: Option<SqlitePool>,
}

impl PostStore {
    pub fn new(connection_string: String) -> Self {
        Self {
            connection_string,
            pool: None,
        }
    }

    pub async fn connect(&mut self) -> Result<(), CoreError> {
        let options = SqliteConnectOptions::from_str(&self.connection_string)
            .map_err(|e| DatabaseError::ConnectionFailed {
                reason: format!("Invalid connection string: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        info!("Connected to document store at {}", self.connection_string);
        self.pool = Some(pool);
        Ok(())
    }

    pub async fn run_migrations(&self) -> Result<(), CoreError> {
        sqlx::migrate!("./migrations")
            .run(self.pool()?)
            .await
            .map_err(|e| DatabaseError::MigrationFailed {
                migration: e.to_string(),
            })?;
        debug!("Document store migrations applied");
        Ok(())
    }

    fn pool(&self) -> Result<&SqlitePool, CoreError> {
        self.pool.as_ref().ok_or_else(|| {
            DatabaseError::ConnectionFailed {
                reason: "Not connected".to_string(),
            }
            .into()
        })
    }

    /// Appends one document to its community's collection. Documents are
    /// never deduplicated.
    pub async fn insert_post_document(&self, document: &PostDocument) -> Result<i64, CoreError> {
        let collection = document.collection_name();
        let comments = serde_json::to_string(&document.comments)?;

        let result = sqlx::query(
            "INSERT INTO post_documents (collection, subreddit, post_id, post_age, comments, inserted_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&collection)
        .bind(&document.subreddit)
        .bind(&document.post_id)
        .bind(document.post_age)
        .bind(comments)
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool()?)
        .await
        .map_err(DatabaseError::Sql)?;

        let row_id = result.last_insert_rowid();
        info!(
            "Inserted post {} with {} comments into {}",
            document.post_id,
            document.comments.len(),
            collection
        );
        Ok(row_id)
    }

    /// All documents of a community, in insertion order.
    pub async fn get_post_documents(&self, subreddit: &str) -> Result<Vec<PostDocument>, CoreError> {
        let collection = rcc_core::collection_name(subreddit);
        let rows = sqlx::query(
            "SELECT subreddit, post_id, post_age, comments FROM post_documents
             WHERE collection = ? ORDER BY id",
        )
        .bind(&collection)
        .fetch_all(self.pool()?)
        .await
        .map_err(DatabaseError::Sql)?;

        rows.into_iter()
            .map(|row| -> Result<PostDocument, CoreError> {
                let post_id: String = row.try_get("post_id").map_err(DatabaseError::Sql)?;
                let comments_json: String = row.try_get("comments").map_err(DatabaseError::Sql)?;
                let comments: Vec<CommentRecord> =
                    serde_json::from_str(&comments_json).map_err(|_| {
                        DatabaseError::CorruptDocument {
                            collection: collection.clone(),
                            post_id: post_id.clone(),
                        }
                    })?;

                Ok(PostDocument {
                    subreddit: row.try_get("subreddit").map_err(DatabaseError::Sql)?,
                    post_id,
                    post_age: row.try_get("post_age").map_err(DatabaseError::Sql)?,
                    comments,
                })
            })
            .collect()
    }

    pub async fn count_documents(&self, subreddit: &str) -> Result<i64, CoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM post_documents WHERE collection = ?")
                .bind(rcc_core::collection_name(subreddit))
                .fetch_one(self.pool()?)
                .await
                .map_err(DatabaseError::Sql)?;
        Ok(count)
    }

    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
