use std::collections::HashSet;

use ego_tree::NodeId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Normalized article returned by the scrape endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScrapeResult {
    pub title: String,
    /// Title heading, optional banner and the sanitized article markup.
    pub content_html: String,
    /// Absolute image URLs, banner first, no duplicates.
    pub images: Vec<String>,
    /// `image{n}.png` for each entry of `images`, same order.
    pub image_names: Vec<String>,
}

/// Where the article body lives inside a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Article {
    /// A single container element, minus any pruned nodes.
    Subtree {
        root: NodeId,
        excluded: HashSet<NodeId>,
    },
    /// Loose blocks gathered in document order.
    Sequence(Vec<NodeId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub title: String,
    pub article: Option<Article>,
    /// Banner candidate found by the strategy itself, used when the page
    /// has no `og:image`.
    pub banner_hint: Option<String>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractError {
    #[error("could not extract blog content")]
    NoArticle,
}
