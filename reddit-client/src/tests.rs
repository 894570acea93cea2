#[cfg(test)]
mod tests {
    use crate::{fetch_posts, try_fetch_posts, PostSource, SubredditPost};
    use listentothis_core::{CoreError, FetchRequest, RedditApiError};
    use std::cell::RefCell;

    /// Serves canned posts per subreddit and records every call.
    #[derive(Default)]
    struct FakeSource {
        posts: Vec<(String, Vec<SubredditPost>)>,
        calls: RefCell<Vec<(String, u8)>>,
    }

    impl FakeSource {
        fn with(mut self, subreddit: &str, posts: Vec<SubredditPost>) -> Self {
            self.posts.push((subreddit.to_string(), posts));
            self
        }
    }

    impl PostSource for FakeSource {
        async fn get_recent_posts(
            &self,
            community_name: &str,
            limit: u8,
        ) -> Result<Vec<SubredditPost>, CoreError> {
            self.calls
                .borrow_mut()
                .push((community_name.to_string(), limit));
            self.posts
                .iter()
                .find(|(name, _)| name == community_name)
                .map(|(_, posts)| posts.clone())
                .ok_or_else(|| {
                    CoreError::RedditApi(RedditApiError::SubredditNotFound {
                        subreddit: community_name.to_string(),
                    })
                })
        }
    }

    fn post(title: &str, score: i64) -> SubredditPost {
        SubredditPost {
            id: title.to_lowercase(),
            title: title.to_string(),
            url: format!("https://example.com/{}", title),
            author: Some("listener".to_string()),
            score,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_filters_and_preserves_order() {
        let mut deleted = post("Deleted", 5);
        deleted.selftext = "[deleted]".to_string();
        let mut removed = post("Removed", 9);
        removed.removed_by_category = Some("moderator".to_string());
        let mut orphan = post("Orphan", 2);
        orphan.author = None;

        let source = FakeSource::default().with(
            "Metal",
            vec![
                post("Newest", 1),
                deleted,
                post("Middle", 30),
                removed,
                orphan,
                post("Oldest", 7),
            ],
        );

        let outcome = fetch_posts(&source, "Metal", 6).await;
        assert!(outcome.warning.is_none());
        let titles: Vec<&str> = outcome.posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
        assert_eq!(outcome.posts[1].score, 30);
    }

    #[tokio::test]
    async fn test_one_deleted_of_five_leaves_four() {
        let mut posts: Vec<SubredditPost> =
            (1..=5).map(|i| post(&format!("Song{}", i), i)).collect();
        posts[2].selftext = "[deleted]".to_string();
        let source = FakeSource::default().with("Metal", posts);

        let outcome = fetch_posts(&source, "Metal", 5).await;
        assert_eq!(outcome.posts.len(), 4);
        assert_eq!(
            source.calls.borrow().as_slice(),
            &[("Metal".to_string(), 5)]
        );
    }

    #[tokio::test]
    async fn test_flair_defaults_to_empty() {
        let mut flaired = post("Flaired", 3);
        flaired.link_flair_text = Some("Jazz".to_string());
        let source = FakeSource::default().with("Jazz", vec![flaired, post("Plain", 1)]);

        let outcome = fetch_posts(&source, "Jazz", 5).await;
        assert_eq!(outcome.posts[0].flair, "Jazz");
        assert_eq!(outcome.posts[1].flair, "");
    }

    #[tokio::test]
    async fn test_examines_at_most_limit_candidates() {
        let posts: Vec<SubredditPost> =
            (1..=8).map(|i| post(&format!("Song{}", i), i)).collect();
        let source = FakeSource::default().with("EDM", posts);

        let request = FetchRequest::new("EDM", 3).unwrap();
        let records = try_fetch_posts(&source, &request).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].title, "Song3");
    }

    #[tokio::test]
    async fn test_platform_failure_becomes_warning() {
        let source = FakeSource::default();

        let outcome = fetch_posts(&source, "NoSuchSub", 5).await;
        assert!(outcome.posts.is_empty());
        assert_eq!(
            outcome.warning.as_deref(),
            Some("Error fetching posts from r/NoSuchSub: Reddit API error: Subreddit not found: NoSuchSub")
        );
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_platform() {
        let source = FakeSource::default().with("Metal", vec![post("Song", 1)]);

        let outcome = fetch_posts(&source, "Metal", 0).await;
        assert!(outcome.posts.is_empty());
        assert!(outcome.warning.is_some());

        let outcome = fetch_posts(&source, "  ", 5).await;
        assert!(outcome.posts.is_empty());
        assert!(outcome.warning.is_some());

        assert!(source.calls.borrow().is_empty());
    }

    #[test]
    fn test_fetch_outside_async_context() {
        let source = FakeSource::default().with("Rock", vec![post("Riff", 11)]);
        let outcome = tokio_test::block_on(fetch_posts(&source, "Rock", 1));
        assert_eq!(outcome.posts.len(), 1);
        assert_eq!(outcome.posts[0].url, "https://example.com/Riff");
    }
}
