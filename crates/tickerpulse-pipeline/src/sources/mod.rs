//! Post sources.

mod reddit;
mod reddit_helpers;

pub use reddit::{RedditClient, SearchOptions};

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::Post;

/// A searchable source of posts scoped to one community.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Run one search query and return the posts it yields.
    async fn search(&self, query: &str) -> Result<Vec<Post>, SourceError>;
}
