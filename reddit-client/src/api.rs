use crate::rate_limiter::{RateLimitConfig, RateLimiter};
use rcc_core::{CoreError, RedditApiError};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

/// Reddit caps `/api/morechildren` at 100 ids per call.
pub const MORE_CHILDREN_BATCH: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<T>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub permalink: String,
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditCommentData {
    pub id: String,
    pub name: String,
    pub parent_id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
    pub created_utc: f64,
    #[serde(default)]
    pub replies: Replies,
}

/// Placeholder for comments that were not included in a response.
/// An empty `children` list marks a "continue this thread" link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditMoreData {
    pub id: String,
    pub parent_id: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub children: Vec<String>,
}

/// A listing entry, tagged by Reddit's `kind` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Thing {
    #[serde(rename = "t1")]
    Comment(RedditCommentData),
    #[serde(rename = "t3")]
    Post(RedditPostData),
    #[serde(rename = "more")]
    More(RedditMoreData),
}

/// Reddit sends `""` when a comment has no replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Replies {
    Listing(Box<RedditListing<Thing>>),
    Empty(String),
}

impl Default for Replies {
    fn default() -> Self {
        Replies::Empty(String::new())
    }
}

impl Replies {
    pub fn things(&self) -> &[Thing] {
        match self {
            Replies::Listing(listing) => &listing.data.children,
            Replies::Empty(_) => &[],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenJson,
}

#[derive(Debug, Clone, Deserialize)]
struct MoreChildrenJson {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
    #[serde(default)]
    data: Option<MoreChildrenData>,
}

#[derive(Debug, Clone, Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<Thing>,
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl RedditApiClient {
    pub fn new(http_client: Client, requests_per_minute: u32) -> Self {
        Self::with_base_url(http_client, requests_per_minute, REDDIT_API_BASE)
    }

    pub fn with_base_url(
        http_client: Client,
        requests_per_minute: u32,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            rate_limiter: RateLimiter::new(RateLimitConfig::reddit_oauth(requests_per_minute)),
            base_url: base_url.into(),
        }
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let waited = self.rate_limiter.acquire_permit().await;
        debug!(
            "Acquired rate limit permit for {} {} after {:?}",
            method, endpoint, waited
        );

        let request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .query(query_params);

        info!("Making Reddit API request: {} {}", method, endpoint);
        let response = request_builder.send().await.map_err(|e| {
            error!("Network error for {} {}: {}", method, endpoint, e);
            if e.is_timeout() {
                CoreError::RedditApi(RedditApiError::RequestTimeout)
            } else {
                CoreError::Network(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());
        Err(CoreError::RedditApi(status_error(status, endpoint, retry_after)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, &str)],
        what: &str,
    ) -> Result<T, CoreError> {
        let response = self
            .make_request(Method::GET, endpoint, access_token, query_params)
            .await?;

        response.json().await.map_err(|e| {
            error!("Failed to parse {}: {}", what, e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse {}", what),
            })
        })
    }

    /// One page of the community's top listing.
    pub async fn get_top_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        time_filter: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<RedditListing<Thing>, CoreError> {
        let endpoint = format!("/r/{}/top", subreddit);
        let limit_str = limit.to_string();
        let mut params = vec![
            ("t", time_filter),
            ("limit", limit_str.as_str()),
            ("raw_json", "1"),
        ];
        if let Some(after_val) = after {
            params.push(("after", after_val));
        }

        let listing: RedditListing<Thing> = self
            .get_json(&endpoint, access_token, &params, &format!("top posts of r/{}", subreddit))
            .await?;

        info!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }

    /// The post followed by its comment forest. With `focus_comment`, only
    /// the subtree rooted at that comment is returned.
    pub async fn get_comments(
        &self,
        access_token: &str,
        post_id: &str,
        focus_comment: Option<&str>,
    ) -> Result<(RedditListing<Thing>, RedditListing<Thing>), CoreError> {
        let endpoint = format!("/comments/{}", post_id);
        let mut params = vec![("raw_json", "1"), ("limit", "500")];
        if let Some(comment_id) = focus_comment {
            params.push(("comment", comment_id));
        }

        let (post, comments): (RedditListing<Thing>, RedditListing<Thing>) = self
            .get_json(&endpoint, access_token, &params, &format!("comments of {}", post_id))
            .await?;

        debug!(
            "Retrieved {} top-level entries for post {}",
            comments.data.children.len(),
            post_id
        );
        Ok((post, comments))
    }

    /// Expands up to [`MORE_CHILDREN_BATCH`] comment ids of a post.
    pub async fn get_more_children(
        &self,
        access_token: &str,
        post_fullname: &str,
        children: &[String],
    ) -> Result<Vec<Thing>, CoreError> {
        let joined = children.join(",");
        let params = [
            ("api_type", "json"),
            ("raw_json", "1"),
            ("link_id", post_fullname),
            ("children", joined.as_str()),
        ];

        let response: MoreChildrenResponse = self
            .get_json("/api/morechildren", access_token, &params, "more children")
            .await?;

        if !response.json.errors.is_empty() {
            warn!("morechildren returned errors: {:?}", response.json.errors);
            return Err(CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("morechildren errors: {:?}", response.json.errors),
            }));
        }

        Ok(response
            .json
            .data
            .map(|data| data.things)
            .unwrap_or_default())
    }

    pub async fn available_tokens(&self) -> f64 {
        self.rate_limiter.available_tokens().await
    }
}

pub(crate) fn status_error(
    status: StatusCode,
    endpoint: &str,
    retry_after: Option<u64>,
) -> RedditApiError {
    match status.as_u16() {
        429 => {
            let retry_after = retry_after.unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        401 => RedditApiError::InvalidToken,
        403 => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        404 => not_found(endpoint),
        code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
        code => RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", code, endpoint),
        },
    }
}

fn not_found(endpoint: &str) -> RedditApiError {
    let mut segments = endpoint.trim_start_matches('/').split('/');
    match (segments.next(), segments.next()) {
        (Some("r"), Some(subreddit)) => RedditApiError::SubredditNotFound {
            subreddit: subreddit.to_string(),
        },
        (Some("comments"), Some(post_id)) => RedditApiError::PostNotFound {
            post_id: post_id.to_string(),
        },
        _ => RedditApiError::InvalidResponse {
            details: format!("Resource not found: {}", endpoint),
        },
    }
}

/// Default request timeout for the shared HTTP client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
