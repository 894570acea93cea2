pub mod api;
pub mod auth;
pub mod fetcher;
pub mod rate_limiter;

#[cfg(test)]
mod tests;

pub use api::{RedditApiClient, RedditListing, SubredditPost};
pub use auth::{RedditAuthenticator, RedditOAuth2Config, RedditToken};
pub use fetcher::{fetch_posts, is_visible, try_fetch_posts, FetchOutcome, PostSource};
pub use rate_limiter::{RateLimitConfig, RateLimitStatus, RateLimiter};
