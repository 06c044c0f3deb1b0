use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ego_tree::NodeId;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extractor::images::{normalize_image_url, resolve_img_src};
use crate::extractor::model::{Article, Located};

/// Class hints tried, in order, when a page has no `<article>`.
const CONTENT_CLASS_HINTS: [&str; 5] = [
    "blog-content",
    "post-content",
    "entry-content",
    "content",
    "article-body",
];

/// Tags collected after the `<h1>` by the heading-anchored strategy.
const SEQUENCE_TAGS: [&str; 6] = ["h2", "p", "ul", "ol", "img", "blockquote"];

const TRAILER_MARKER: &str = "More resources";

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("title"));
static H1_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("h1"));
static H3_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("h3"));
static ARTICLE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("article"));
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("body"));
static CLASS_HINT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    CONTENT_CLASS_HINTS
        .iter()
        .map(|class| selector(&format!("div.{}", class)))
        .collect()
});

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Failed to parse built-in selector")
}

/// How the article body is found on a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateStrategy {
    /// `<article>`, then a content-classed `<div>`, then `<body>`.
    #[default]
    Generic,
    /// Everything of interest following the first `<h1>`.
    HeadingAnchored,
    /// Generic, minus a trailing "More resources" block.
    TrailerTrimmed,
}

impl FromStr for LocateStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "heading" | "heading_anchored" => Ok(Self::HeadingAnchored),
            "trailer" | "trailer_trimmed" => Ok(Self::TrailerTrimmed),
            other => Err(format!("unknown scrape strategy '{}'", other)),
        }
    }
}

impl Display for LocateStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Generic => "generic",
            Self::HeadingAnchored => "heading",
            Self::TrailerTrimmed => "trailer",
        };
        f.write_str(name)
    }
}

/// Find the title and article body of `document` using `strategy`.
pub fn locate(document: &Html, strategy: LocateStrategy) -> Located {
    match strategy {
        LocateStrategy::Generic => Located {
            title: page_title(document),
            article: find_container(document).map(|root| Article::Subtree {
                root: root.id(),
                excluded: HashSet::new(),
            }),
            banner_hint: None,
        },
        LocateStrategy::HeadingAnchored => locate_after_heading(document),
        LocateStrategy::TrailerTrimmed => Located {
            title: page_title(document),
            article: find_container(document).map(|root| Article::Subtree {
                root: root.id(),
                excluded: trailer_nodes(root),
            }),
            banner_hint: None,
        },
    }
}

/// `<title>` text, or the first `<h1>` when the title is blank.
pub fn page_title(document: &Html) -> String {
    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_default();

    if !title.is_empty() {
        return title;
    }

    document
        .select(&H1_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn find_container(document: &Html) -> Option<ElementRef<'_>> {
    if let Some(article) = document.select(&ARTICLE_SELECTOR).next() {
        return Some(article);
    }

    for hint in CLASS_HINT_SELECTORS.iter() {
        if let Some(div) = document.select(hint).next() {
            return Some(div);
        }
    }

    // The parser always synthesizes a <body>; an empty one counts as missing.
    document
        .select(&BODY_SELECTOR)
        .next()
        .filter(|body| has_content(*body))
}

fn has_content(element: ElementRef<'_>) -> bool {
    element.children().any(|child| {
        child.value().is_element()
            || child
                .value()
                .as_text()
                .is_some_and(|text| !text.trim().is_empty())
    })
}

/// Nodes removed by the "More resources" trim: the marker heading's parent
/// and every sibling after it.
fn trailer_nodes(container: ElementRef<'_>) -> HashSet<NodeId> {
    let Some(marker) = container
        .select(&H3_SELECTOR)
        .find(|h3| h3.text().collect::<String>().contains(TRAILER_MARKER))
    else {
        return HashSet::new();
    };

    let Some(parent) = marker.parent() else {
        return HashSet::new();
    };

    // Trimming the container itself, or anything above it, would wipe the
    // whole article. A parent with no element above it is the document root.
    let parent_is_root = parent.parent().and_then(ElementRef::wrap).is_none();
    let parent_encloses_container =
        parent.id() == container.id() || container.ancestors().any(|a| a.id() == parent.id());
    if parent_is_root || parent_encloses_container {
        debug!("trailer marker sits at the container root, leaving article untouched");
        return HashSet::new();
    }

    std::iter::once(parent.id())
        .chain(parent.next_siblings().map(|sibling| sibling.id()))
        .collect()
}

fn locate_after_heading(document: &Html) -> Located {
    let Some(heading) = document.select(&H1_SELECTOR).next() else {
        return Located {
            title: String::new(),
            article: None,
            banner_hint: None,
        };
    };

    let mut collected: Vec<NodeId> = Vec::new();
    let mut collected_set: HashSet<NodeId> = HashSet::new();
    let mut banner_hint = None;
    let mut seen_img = false;
    let mut past_heading = false;

    for node in document.root_element().descendants() {
        if node.id() == heading.id() {
            past_heading = true;
            continue;
        }
        if !past_heading {
            continue;
        }
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if node.ancestors().any(|a| a.id() == heading.id()) {
            continue;
        }

        let name = element.value().name();
        if name == "img" && !seen_img {
            seen_img = true;
            banner_hint = resolve_img_src(element.value()).and_then(normalize_image_url);
        }

        if !SEQUENCE_TAGS.contains(&name) {
            continue;
        }
        // Already part of an enclosing collected block.
        if node.ancestors().any(|a| collected_set.contains(&a.id())) {
            continue;
        }
        collected.push(node.id());
        collected_set.insert(node.id());
    }

    Located {
        title: element_text(heading),
        article: (!collected.is_empty()).then_some(Article::Sequence(collected)),
        banner_hint,
    }
}
