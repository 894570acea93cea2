//! One render cycle: fetch every selected subreddit in order and attach
//! thumbnail URLs to the surviving posts.

use listentothis_core::{resolve_thumbnail, PostRecord};
use reddit_client::{fetch_posts, FetchOutcome, PostSource};
use tracing::info;

pub const NO_RESULTS_MESSAGE: &str = "No valid posts found.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEntry {
    pub record: PostRecord,
    pub thumbnail_url: Option<String>,
}

impl From<PostRecord> for PostEntry {
    fn from(record: PostRecord) -> Self {
        let thumbnail_url = resolve_thumbnail(&record.url);
        Self {
            record,
            thumbnail_url,
        }
    }
}

impl PostEntry {
    pub fn headline(&self) -> String {
        format!("{} (Score: {})", self.record.title, self.record.score)
    }

    pub fn flair_label(&self) -> Option<String> {
        self.record
            .has_flair()
            .then(|| format!("Flair: {}", self.record.flair))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunitySection {
    pub name: String,
    pub entries: Vec<PostEntry>,
    pub warning: Option<String>,
}

impl CommunitySection {
    pub fn from_outcome(name: &str, outcome: FetchOutcome) -> Self {
        Self {
            name: name.to_string(),
            entries: outcome.posts.into_iter().map(PostEntry::from).collect(),
            warning: outcome.warning,
        }
    }

    pub fn header(&self) -> String {
        format!("r/{}", self.name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines shown between the header and the posts: the fetch warning, if
    /// any, then the no-results message when nothing survived.
    pub fn notices(&self) -> Vec<Notice<'_>> {
        let mut notices = Vec::new();
        if let Some(warning) = &self.warning {
            notices.push(Notice::Warning(warning));
        }
        if self.is_empty() {
            notices.push(Notice::NoResults);
        }
        notices
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice<'a> {
    Warning(&'a str),
    NoResults,
}

impl Notice<'_> {
    pub fn text(&self) -> &str {
        match self {
            Notice::Warning(warning) => warning,
            Notice::NoResults => NO_RESULTS_MESSAGE,
        }
    }
}

/// Fetches each community sequentially with the shared `limit`.
pub async fn load_feed<S: PostSource>(
    source: &S,
    communities: &[String],
    limit: u8,
) -> Vec<CommunitySection> {
    let mut sections = Vec::with_capacity(communities.len());

    for name in communities {
        let outcome = fetch_posts(source, name, limit).await;
        sections.push(CommunitySection::from_outcome(name, outcome));
    }

    info!(
        "Loaded {} posts across {} subreddits",
        sections.iter().map(|s| s.entries.len()).sum::<usize>(),
        sections.len()
    );
    sections
}

/// Distinct thumbnail URLs in display order.
pub fn thumbnail_urls(sections: &[CommunitySection]) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for url in sections
        .iter()
        .flat_map(|section| &section.entries)
        .filter_map(|entry| entry.thumbnail_url.as_ref())
    {
        if !urls.contains(url) {
            urls.push(url.clone());
        }
    }
    urls
}
