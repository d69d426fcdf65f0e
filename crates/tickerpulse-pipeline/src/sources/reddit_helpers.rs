//! Reddit listing payloads and their conversion into [`Post`]s.

use serde::Deserialize;

use crate::types::Post;

#[derive(Debug, Deserialize)]
pub(super) struct Listing {
    pub(super) data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListingData {
    #[serde(default)]
    pub(super) children: Vec<Child>,
    #[serde(default)]
    pub(super) after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Child {
    #[serde(default)]
    pub(super) data: PostData,
}

/// Raw submission fields. Everything is optional so partial records still
/// convert; absent values fall back to empty strings and zeros.
#[derive(Debug, Default, Deserialize)]
pub(super) struct PostData {
    #[serde(default)]
    pub(super) id: Option<String>,
    #[serde(default)]
    pub(super) title: Option<String>,
    #[serde(default)]
    pub(super) selftext: Option<String>,
    #[serde(default)]
    pub(super) author: Option<String>,
    #[serde(default)]
    pub(super) score: Option<f64>,
    #[serde(default)]
    pub(super) num_comments: Option<f64>,
    #[serde(default)]
    pub(super) created_utc: Option<f64>,
}

pub(super) fn shortlink(post_id: &str) -> String {
    format!("https://redd.it/{post_id}")
}

/// Convert one submission. Returns `None` only when the id is missing, since
/// a post without an id cannot be deduplicated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(super) fn to_post(data: PostData) -> Option<Post> {
    let id = data.id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;

    Some(Post {
        permalink: shortlink(&id),
        title: data.title.unwrap_or_default(),
        body: data.selftext.unwrap_or_default(),
        author: data.author.unwrap_or_else(|| "[deleted]".to_string()),
        score: data.score.unwrap_or(0.0) as i64,
        num_comments: data.num_comments.unwrap_or(0.0).max(0.0) as u64,
        created_utc: data.created_utc.unwrap_or(0.0) as i64,
        id,
    })
}

pub(super) fn listing_to_posts(listing: Listing) -> Vec<Post> {
    listing
        .data
        .children
        .into_iter()
        .filter_map(|child| {
            let post = to_post(child.data);
            if post.is_none() {
                tracing::debug!("skipping listing entry without an id");
            }
            post
        })
        .collect()
}
