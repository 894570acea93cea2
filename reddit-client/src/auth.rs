use listentothis_core::{CoreError, RedditApiError, RedditCredentials};
use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, TokenResponse, TokenUrl};
use reqwest::Client;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Tokens are renewed this long before Reddit would expire them.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
/// Reddit issues one-hour tokens; used when the response omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct RedditOAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl RedditOAuth2Config {
    pub fn new(client_id: String, client_secret: String, user_agent: String) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent,
        }
    }

    pub fn from_credentials(credentials: &RedditCredentials) -> Self {
        Self::new(
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
            credentials.user_agent(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
}

impl RedditToken {
    /// True once the token is inside the renewal margin.
    pub fn needs_refresh(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

/// Application-only OAuth2 (client credentials grant) with a cached token.
#[derive(Debug)]
pub struct RedditAuthenticator {
    oauth_client: BasicClient,
    http_client: Client,
    user_agent: String,
    token: Mutex<Option<RedditToken>>,
}

impl RedditAuthenticator {
    pub fn new(config: &RedditOAuth2Config, http_client: Client) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(REDDIT_AUTH_URL.to_string()).map_err(|e| CoreError::Internal {
            message: format!("invalid authorize URL: {e}"),
        })?;
        let token_url =
            TokenUrl::new(REDDIT_TOKEN_URL.to_string()).map_err(|e| CoreError::Internal {
                message: format!("invalid token URL: {e}"),
            })?;

        let oauth_client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        );

        Ok(Self {
            oauth_client,
            http_client,
            user_agent: config.user_agent.clone(),
            token: Mutex::new(None),
        })
    }

    /// Returns a valid bearer token, requesting a new one when needed.
    pub async fn access_token(&self) -> Result<String, CoreError> {
        let mut token = self.token.lock().await;

        if let Some(current) = token.as_ref() {
            if !current.needs_refresh() {
                return Ok(current.access_token.clone());
            }
            debug!("Access token is about to expire, requesting a new one");
        }

        let fresh = self.request_token().await?;
        let access_token = fresh.access_token.clone();
        *token = Some(fresh);
        Ok(access_token)
    }

    /// Drops the cached token so the next request authenticates again.
    pub async fn invalidate(&self) {
        warn!("Discarding cached Reddit access token");
        *self.token.lock().await = None;
    }

    async fn request_token(&self) -> Result<RedditToken, CoreError> {
        info!("Requesting Reddit access token");
        let http_client = self.http_client.clone();
        let user_agent = self.user_agent.clone();

        let response = self
            .oauth_client
            .exchange_client_credentials()
            .request_async(|request| send_token_request(http_client, user_agent, request))
            .await
            .map_err(|e| {
                CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                    reason: e.to_string(),
                })
            })?;

        let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);

        debug!("Received access token valid for {:?}", lifetime);
        Ok(RedditToken {
            access_token: response.access_token().secret().clone(),
            expires_at: SystemTime::now() + lifetime,
        })
    }
}

/// Token endpoint transport. Reddit rejects requests without a descriptive
/// user agent, so the oauth2 request goes through our own client.
async fn send_token_request(
    http_client: Client,
    user_agent: String,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = http_client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .header(reqwest::header::USER_AGENT, user_agent)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
