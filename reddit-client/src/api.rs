use crate::auth::{RedditAuthenticator, RedditOAuth2Config};
use crate::fetcher::PostSource;
use crate::rate_limiter::{RateLimitConfig, RateLimitStatus, RateLimiter, MAX_SERVER_PAUSE};
use listentothis_core::{CoreError, PostRecord, RedditApiError};
use reqwest::header::HeaderMap;
use reqwest::{redirect, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

const REDDIT_API_BASE: &str = "https://oauth.reddit.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

impl<T> RedditListing<T> {
    pub fn into_items(self) -> Vec<T> {
        self.data.children.into_iter().map(|child| child.data).collect()
    }
}

/// The fields of a Reddit link (`t3`) the browser looks at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubredditPost {
    pub id: String,
    pub title: String,
    pub url: String,
    pub selftext: String,
    pub author: Option<String>,
    pub removed_by_category: Option<String>,
    pub link_flair_text: Option<String>,
    pub score: i64,
    pub permalink: String,
    pub created_utc: f64,
}

/// Text Reddit substitutes for the body or author of deleted content.
pub const DELETED_PLACEHOLDER: &str = "[deleted]";

impl SubredditPost {
    pub fn is_removed(&self) -> bool {
        self.removed_by_category.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.selftext == DELETED_PLACEHOLDER
    }

    /// The author's name, unless the account is gone.
    pub fn author_name(&self) -> Option<&str> {
        self.author
            .as_deref()
            .filter(|name| *name != DELETED_PLACEHOLDER)
    }
}

impl From<SubredditPost> for PostRecord {
    fn from(post: SubredditPost) -> Self {
        Self {
            title: post.title,
            url: post.url,
            flair: post.link_flair_text.unwrap_or_default(),
            score: post.score,
        }
    }
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    auth: RedditAuthenticator,
    rate_limiter: RateLimiter,
    api_base: Url,
}

impl RedditApiClient {
    pub fn new(config: RedditOAuth2Config) -> Result<Self, CoreError> {
        // Reddit answers unknown subreddits with a redirect to its search page.
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(REQUEST_TIMEOUT)
            .redirect(redirect::Policy::none())
            .build()?;

        let auth = RedditAuthenticator::new(&config, http_client.clone())?;
        let api_base = Url::parse(REDDIT_API_BASE).map_err(|e| CoreError::Internal {
            message: format!("invalid API base URL: {e}"),
        })?;

        Ok(Self {
            http_client,
            auth,
            rate_limiter: RateLimiter::new(RateLimitConfig::reddit_oauth()),
            api_base,
        })
    }

    /// Builds `/r/{subreddit}/{listing}` with the name percent-encoded as one segment.
    pub fn listing_url(&self, subreddit: &str, listing: &str) -> Result<Url, CoreError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| CoreError::Internal {
                message: "API base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push("r")
            .push(subreddit)
            .push(listing);
        Ok(url)
    }

    async fn get(
        &self,
        url: Url,
        subreddit: &str,
        query_params: &[(&str, &str)],
    ) -> Result<Response, CoreError> {
        let mut reauthenticated = false;

        loop {
            let access_token = self.auth.access_token().await?;
            let permit = self.rate_limiter.acquire_permit().await;
            debug!(
                "Acquired rate limit permit for {} after {:?}",
                url.path(),
                permit.queue_wait_time
            );

            info!("Making Reddit API request: GET {}", url.path());
            let response = self
                .http_client
                .get(url.clone())
                .bearer_auth(&access_token)
                .query(query_params)
                .send()
                .await
                .map_err(|e| {
                    error!("Network error for GET {}: {}", url.path(), e);
                    if e.is_timeout() {
                        CoreError::RedditApi(RedditApiError::RequestTimeout)
                    } else {
                        CoreError::Network(e)
                    }
                })?;

            let (remaining, reset) = server_budget(response.headers());
            self.rate_limiter.record_server_budget(remaining, reset).await;

            let status = response.status();
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok());

            match classify_status(status, retry_after, subreddit, url.path()) {
                Ok(()) => {
                    debug!("Request successful: {} {}", status, url.path());
                    return Ok(response);
                }
                Err(RedditApiError::InvalidToken) if !reauthenticated => {
                    warn!("Access token rejected, authenticating again");
                    self.auth.invalidate().await;
                    reauthenticated = true;
                }
                Err(RedditApiError::RateLimitExceeded { retry_after }) => {
                    self.rate_limiter
                        .pause_for(Duration::from_secs(retry_after))
                        .await;
                    return Err(RedditApiError::RateLimitExceeded { retry_after }.into());
                }
                Err(e) => {
                    error!("Request failed with status: {} for {}", status, url.path());
                    return Err(e.into());
                }
            }
        }
    }

    /// Newest posts of `subreddit`, most recent first.
    pub async fn get_new_posts(
        &self,
        subreddit: &str,
        limit: u8,
    ) -> Result<RedditListing<SubredditPost>, CoreError> {
        let url = self.listing_url(subreddit, "new")?;
        let limit_str = limit.to_string();
        let params = [("limit", limit_str.as_str()), ("raw_json", "1")];

        let response = self.get(url, subreddit, &params).await?;
        let listing: RedditListing<SubredditPost> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        info!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }

    pub async fn get_rate_limit_status(&self) -> RateLimitStatus {
        self.rate_limiter.get_rate_limit_status().await
    }
}

impl PostSource for RedditApiClient {
    async fn get_recent_posts(
        &self,
        community_name: &str,
        limit: u8,
    ) -> Result<Vec<SubredditPost>, CoreError> {
        Ok(self.get_new_posts(community_name, limit).await?.into_items())
    }
}

/// Maps a listing response status onto the error taxonomy.
pub fn classify_status(
    status: StatusCode,
    retry_after: Option<&str>,
    subreddit: &str,
    endpoint: &str,
) -> Result<(), RedditApiError> {
    if status.is_success() {
        return Ok(());
    }

    let error = match status.as_u16() {
        300..=399 | 404 => RedditApiError::SubredditNotFound {
            subreddit: subreddit.to_string(),
        },
        401 => RedditApiError::InvalidToken,
        403 => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        429 => RedditApiError::RateLimitExceeded {
            retry_after: retry_after
                .and_then(|value| value.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
                .min(MAX_SERVER_PAUSE.as_secs()),
        },
        code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
        code => RedditApiError::UnexpectedStatus {
            status_code: code,
            endpoint: endpoint.to_string(),
        },
    };
    Err(error)
}

/// Reads `x-ratelimit-remaining` and `x-ratelimit-reset` (seconds). The reset
/// is capped at [`MAX_SERVER_PAUSE`]; negative or NaN values are ignored.
fn server_budget(headers: &HeaderMap) -> (Option<f64>, Option<Duration>) {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<f64>().ok())
    };

    let remaining = read("x-ratelimit-remaining");
    let reset = read("x-ratelimit-reset")
        .filter(|secs| *secs >= 0.0)
        .map(|secs| secs.min(MAX_SERVER_PAUSE.as_secs_f64()))
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
    (remaining, reset)
}
