pub mod api;
pub mod comments;
pub mod rate_limiter;


use api::{RedditApiClient, RedditPostData, Thing, MORE_CHILDREN_BATCH, REQUEST_TIMEOUT};
use comments::CommentTree;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, ResourceOwnerPassword,
    ResourceOwnerUsername, TokenResponse, TokenUrl,
};
use rcc_core::{CommentRecord, CoreError, Credentials, RedditApiError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Reddit returns at most 100 posts per listing page.
const LISTING_PAGE_SIZE: u32 = 100;

/// Tokens are refreshed this long before Reddit would reject them.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub requests_per_minute: u32,
}

impl RedditConfig {
    pub fn new(
        client_id: String,
        client_secret: String,
        username: String,
        password: String,
        user_agent: String,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            username,
            password,
            user_agent,
            requests_per_minute: 60,
        }
    }

    pub fn from_credentials(credentials: &Credentials, requests_per_minute: u32) -> Self {
        Self {
            client_id: credentials.reddit_client_id.clone(),
            client_secret: credentials.reddit_client_secret.clone(),
            username: credentials.reddit_username.clone(),
            password: credentials.reddit_password.clone(),
            user_agent: credentials.reddit_user_agent.clone(),
            requests_per_minute,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

#[derive(Debug, Clone)]
pub enum AuthState {
    NotAuthenticated,
    Authenticated { token: RedditToken },
    TokenExpired { token: RedditToken },
}

/// Script-type Reddit application client. Authenticates with the
/// resource-owner password grant and re-authenticates when the token
/// expires; script apps receive no refresh token.
pub struct RedditClient {
    config: RedditConfig,
    oauth_client: BasicClient,
    http_client: Client,
    api_client: RedditApiClient,
    auth_state: AuthState,
}

impl RedditClient {
    pub fn new(config: RedditConfig) -> Result<Self, CoreError> {
        let oauth_client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(REDDIT_AUTH_URL.to_string()).map_err(|e| {
                CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                    reason: format!("Invalid auth URL: {}", e),
                })
            })?,
            Some(TokenUrl::new(REDDIT_TOKEN_URL.to_string()).map_err(|e| {
                CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                    reason: format!("Invalid token URL: {}", e),
                })
            })?),
        );

        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(CoreError::Network)?;

        let api_client = RedditApiClient::new(http_client.clone(), config.requests_per_minute);

        Ok(Self {
            config,
            oauth_client,
            http_client,
            api_client,
            auth_state: AuthState::NotAuthenticated,
        })
    }

    pub fn get_auth_state(&self) -> &AuthState {
        &self.auth_state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth_state, AuthState::Authenticated { .. })
    }

    pub fn needs_refresh(&self) -> bool {
        matches!(self.auth_state, AuthState::TokenExpired { .. })
    }

    pub fn set_token(&mut self, token: RedditToken) {
        self.auth_state = if token.is_expired() {
            AuthState::TokenExpired { token }
        } else {
            AuthState::Authenticated { token }
        };
    }

    pub fn api_client(&self) -> &RedditApiClient {
        &self.api_client
    }

    pub async fn authenticate(&mut self) -> Result<(), CoreError> {
        info!("Authenticating with Reddit as {}", self.config.username);

        let http_client = self.http_client.clone();
        let token_result = self
            .oauth_client
            .exchange_password(
                &ResourceOwnerUsername::new(self.config.username.clone()),
                &ResourceOwnerPassword::new(self.config.password.clone()),
            )
            .request_async(|request| send_oauth_request(http_client, request))
            .await
            .map_err(|e| {
                CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                    reason: e.to_string(),
                })
            })?;

        let expires_in = token_result
            .expires_in()
            .unwrap_or(Duration::from_secs(3600));
        let scope = token_result
            .scopes()
            .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();

        self.set_token(RedditToken {
            access_token: token_result.access_token().secret().clone(),
            expires_at: SystemTime::now() + expires_in,
            scope,
        });
        info!("Authenticated with Reddit, token valid for {:?}", expires_in);
        Ok(())
    }

    /// Returns a usable access token, authenticating first when needed.
    pub async fn ensure_authenticated(&mut self) -> Result<String, CoreError> {
        if let AuthState::Authenticated { token } = &self.auth_state {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
            debug!("Access token expired");
        }

        self.authenticate().await?;
        match &self.auth_state {
            AuthState::Authenticated { token } => Ok(token.access_token.clone()),
            _ => Err(CoreError::RedditApi(RedditApiError::InvalidToken)),
        }
    }

    /// Top posts of a community for the given period, following listing
    /// pagination until `limit` posts were seen or the listing ends.
    pub async fn fetch_top_posts(
        &mut self,
        subreddit: &str,
        time_filter: &str,
        limit: u32,
    ) -> Result<Vec<RedditPostData>, CoreError> {
        let mut posts = Vec::new();
        let mut after: Option<String> = None;

        while (posts.len() as u32) < limit {
            let token = self.ensure_authenticated().await?;
            let page_size = (limit - posts.len() as u32).min(LISTING_PAGE_SIZE);
            let listing = self
                .api_client
                .get_top_posts(&token, subreddit, time_filter, page_size, after.as_deref())
                .await?;

            let page_len = listing.data.children.len();
            posts.extend(listing.data.children.into_iter().filter_map(|thing| match thing {
                Thing::Post(post) => Some(post),
                _ => None,
            }));

            after = listing.data.after;
            if page_len == 0 || after.is_none() {
                break;
            }
        }

        posts.truncate(limit as usize);
        info!("Fetched {} top posts from r/{}", posts.len(), subreddit);
        Ok(posts)
    }

    /// Every comment of `post`, flattened breadth first.
    ///
    /// `more_limit` bounds how many "load more" placeholders are expanded.
    /// `None` expands all of them and `Some(0)` drops them unexpanded.
    pub async fn fetch_comments(
        &mut self,
        post: &RedditPostData,
        more_limit: Option<usize>,
    ) -> Result<Vec<CommentRecord>, CoreError> {
        let token = self.ensure_authenticated().await?;
        let (_, listing) = self.api_client.get_comments(&token, &post.id, None).await?;

        let mut tree = CommentTree::new(post.name.clone());
        tree.insert_things(listing.data.children);

        let mut expanded = 0usize;
        while let Some(stub) = tree.next_pending() {
            if more_limit.is_some_and(|limit| expanded >= limit) {
                let dropped = tree.discard_pending() + 1;
                debug!("Dropping {} unexpanded placeholders of {}", dropped, post.id);
                break;
            }
            expanded += 1;

            let token = self.ensure_authenticated().await?;
            if stub.children.is_empty() {
                // "continue this thread": reload the subtree under the parent comment.
                let Some(parent) = stub.parent_id.strip_prefix("t1_") else {
                    warn!("Skipping continuation stub under {}", stub.parent_id);
                    continue;
                };
                let (_, subtree) = self
                    .api_client
                    .get_comments(&token, &post.id, Some(parent))
                    .await?;
                tree.insert_things(subtree.data.children);
            } else {
                for batch in stub.children.chunks(MORE_CHILDREN_BATCH) {
                    let things = self
                        .api_client
                        .get_more_children(&token, tree.post_fullname(), batch)
                        .await?;
                    tree.insert_things(things);
                }
            }
        }

        let records = tree.flatten(post.created_utc);
        debug!(
            "Collected {} comments for post {} after {} expansions",
            records.len(),
            post.id,
            expanded
        );
        Ok(records)
    }
}

async fn send_oauth_request(
    http_client: Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let mut builder = http_client
        .request(request.method, request.url.as_str())
        .body(request.body);
    for (name, value) in request.headers.iter() {
        builder = builder.header(name, value);
    }

    let response = builder.send().await?;
    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
