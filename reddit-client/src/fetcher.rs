use crate::api::SubredditPost;
use listentothis_core::{CoreError, ErrorReporter, FetchRequest, PostRecord};
use tracing::debug;

/// Anything that can list the newest posts of a subreddit.
pub trait PostSource {
    async fn get_recent_posts(
        &self,
        community_name: &str,
        limit: u8,
    ) -> Result<Vec<SubredditPost>, CoreError>;
}

/// Result of fetching one subreddit. A failure leaves `posts` empty and
/// carries the message shown to the user in `warning`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    pub posts: Vec<PostRecord>,
    pub warning: Option<String>,
}

/// Removed posts, `[deleted]` bodies and posts without an author are hidden.
pub fn is_visible(post: &SubredditPost) -> bool {
    !post.is_removed() && !post.is_deleted() && post.author_name().is_some()
}

pub async fn try_fetch_posts<S: PostSource>(
    source: &S,
    request: &FetchRequest,
) -> Result<Vec<PostRecord>, CoreError> {
    let candidates = source
        .get_recent_posts(request.community_name(), request.limit())
        .await?;
    let examined = candidates.len().min(usize::from(request.limit()));

    let posts: Vec<PostRecord> = candidates
        .into_iter()
        .take(usize::from(request.limit()))
        .filter(is_visible)
        .map(PostRecord::from)
        .collect();

    debug!(
        "r/{}: kept {} of {} posts",
        request.community_name(),
        posts.len(),
        examined
    );
    Ok(posts)
}

/// Fetches and filters the newest posts of one subreddit. Never fails: errors
/// are logged and turned into a warning with no posts.
pub async fn fetch_posts<S: PostSource>(
    source: &S,
    community_name: &str,
    limit: u8,
) -> FetchOutcome {
    let result = match FetchRequest::new(community_name, limit) {
        Ok(request) => try_fetch_posts(source, &request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(posts) => FetchOutcome {
            posts,
            warning: None,
        },
        Err(e) => {
            ErrorReporter::new().report_warning(&format!("Fetching r/{}", community_name), &e);
            FetchOutcome {
                posts: Vec::new(),
                warning: Some(format!(
                    "Error fetching posts from r/{}: {}",
                    community_name, e
                )),
            }
        }
    }
}
