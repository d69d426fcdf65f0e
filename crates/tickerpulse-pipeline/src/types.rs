//! Post data fetched from the discussion source.

/// A post fetched from the discussion source. Never mutated after fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Vendor-assigned id, unique within the subreddit.
    pub id: String,
    pub title: String,
    /// Self text; empty for link posts or when the field is missing.
    pub body: String,
    pub author: String,
    pub score: i64,
    pub num_comments: u64,
    /// Short link to the post (`https://redd.it/{id}`).
    pub permalink: String,
    /// Creation time, Unix epoch seconds.
    pub created_utc: i64,
}

impl Post {
    /// Title and body joined by a single space; the text mentions are counted in.
    #[must_use]
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}
