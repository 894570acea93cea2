use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Smallest number of posts requested per subreddit.
pub const MIN_POST_LIMIT: u8 = 1;
/// Largest number of posts requested per subreddit.
pub const MAX_POST_LIMIT: u8 = 20;
pub const DEFAULT_POST_LIMIT: u8 = 5;
/// Upper bound on how many subreddits can be browsed at once.
pub const MAX_SELECTED_COMMUNITIES: usize = 20;

/// A post that survived filtering, normalized for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub title: String,
    pub url: String,
    /// Link flair text, empty when the post has none.
    pub flair: String,
    pub score: i64,
}

impl PostRecord {
    pub fn has_flair(&self) -> bool {
        !self.flair.is_empty()
    }
}

/// One subreddit fetch within a render cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    community_name: String,
    limit: u8,
}

impl FetchRequest {
    pub fn new(community_name: impl Into<String>, limit: u8) -> Result<Self, CoreError> {
        let community_name = community_name.into().trim().to_string();
        if community_name.is_empty() {
            return Err(CoreError::invalid_input("subreddit name must not be empty"));
        }
        if !(MIN_POST_LIMIT..=MAX_POST_LIMIT).contains(&limit) {
            return Err(CoreError::invalid_input(format!(
                "post limit {} outside {}..={}",
                limit, MIN_POST_LIMIT, MAX_POST_LIMIT
            )));
        }

        Ok(Self {
            community_name,
            limit,
        })
    }

    pub fn community_name(&self) -> &str {
        &self.community_name
    }

    pub fn limit(&self) -> u8 {
        self.limit
    }
}

/// Slider fill percentage for a post limit, 0 at the minimum and 100 at the maximum.
pub fn limit_fill_percent(limit: u8) -> u8 {
    let limit = limit.clamp(MIN_POST_LIMIT, MAX_POST_LIMIT);
    let span = u32::from(MAX_POST_LIMIT - MIN_POST_LIMIT);
    (u32::from(limit - MIN_POST_LIMIT) * 100 / span) as u8
}
