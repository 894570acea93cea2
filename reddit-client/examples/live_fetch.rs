//! Fetches the newest posts of a few subreddits with real credentials.
//!
//! Reads `REDDIT_CLIENT_ID`, `REDDIT_CLIENT_SECRET` and `REDDIT_USERNAME`
//! from the environment or a `.env` file. Subreddit names can be passed as
//! arguments: `cargo run -p reddit-client --example live_fetch -- Metal Jazz`.

use listentothis_core::{resolve_thumbnail, RedditCredentials, DEFAULT_POST_LIMIT};
use reddit_client::{fetch_posts, RedditApiClient, RedditOAuth2Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter("reddit_client=debug")
        .init();

    let credentials = RedditCredentials::from_env()?;
    let client = RedditApiClient::new(RedditOAuth2Config::from_credentials(&credentials))?;

    let mut subreddits: Vec<String> = std::env::args().skip(1).collect();
    if subreddits.is_empty() {
        subreddits.push("ListenToThis".to_string());
    }

    for subreddit in &subreddits {
        println!("=== r/{} ===", subreddit);
        let outcome = fetch_posts(&client, subreddit, DEFAULT_POST_LIMIT).await;

        if let Some(warning) = &outcome.warning {
            println!("warning: {}", warning);
        }
        if outcome.posts.is_empty() {
            println!("No valid posts found.");
        }
        for post in &outcome.posts {
            println!("{} (Score: {})", post.title, post.score);
            println!("  {}", post.url);
            if post.has_flair() {
                println!("  Flair: {}", post.flair);
            }
            if let Some(thumbnail) = resolve_thumbnail(&post.url) {
                println!("  Thumbnail: {}", thumbnail);
            }
        }
        println!();
    }

    println!("{:?}", client.get_rate_limit_status().await);
    Ok(())
}
