use regex::Regex;
use std::sync::LazyLock;

/// Matches a YouTube video id given as `v=<id>` or `youtu.be/<id>`.
/// The trailing group rejects runs longer than 11 id characters.
static VIDEO_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|youtu\.be/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)")
        .expect("video id regex should compile")
});

/// Extracts the first YouTube video id found in `url`.
pub fn video_id(url: &str) -> Option<&str> {
    VIDEO_ID_REGEX
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

/// Thumbnail image URL for a post URL, if it points at a YouTube video.
pub fn resolve_thumbnail(url: &str) -> Option<String> {
    video_id(url).map(|id| format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id))
}
