use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, node::Element};

/// Attributes consulted for an `<img>` source, in priority order. Lazy-load
/// plugins park the real URL in one of the `data-*` variants.
const IMG_SRC_ATTRS: [&str; 5] = [
    "src",
    "data-src",
    "data-lazy-src",
    "data-original",
    "data-background",
];

// Lexical scan only; a declaration like `url(a) , url(b)` inside one
// property is fine, but escaped parens inside a URL are not handled.
static CSS_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"url\((.*?)\)").expect("Failed to compile css url regex"));

/// Resolve the source of an `<img>` without normalizing it: direct source,
/// then the lazy-load variants, then the first `srcset` candidate.
pub fn resolve_img_src(img: &Element) -> Option<&str> {
    IMG_SRC_ATTRS
        .iter()
        .filter_map(|name| img.attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .or_else(|| img.attr("srcset").and_then(first_srcset_candidate))
}

/// First URL of a `srcset` value, with any width/density descriptor dropped.
pub fn first_srcset_candidate(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .next()
        .and_then(|entry| entry.split_whitespace().next())
}

/// Prefix protocol-relative URLs with `https:`, leave everything else alone.
pub fn expand_protocol_relative(raw: &str) -> String {
    if raw.starts_with("//") {
        format!("https:{}", raw)
    } else {
        raw.to_string()
    }
}

/// Normalize a candidate into an absolute http(s) URL, or reject it.
///
/// Relative paths are never joined against the page URL; `data:` and other
/// schemes are dropped.
pub fn normalize_image_url(raw: &str) -> Option<String> {
    let url = expand_protocol_relative(raw.trim());
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url)
    } else {
        None
    }
}

/// Every `url(...)` reference inside an inline style, unquoted.
pub fn style_urls(style: &str) -> impl Iterator<Item = &str> {
    CSS_URL_REGEX
        .captures_iter(style)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches(|c| c == '"' || c == '\'' || c == ' '))
}

/// Collect absolute image URLs referenced anywhere in `root` (itself
/// included), deduplicated in document order.
pub fn extract_images(root: ElementRef<'_>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();

    let mut push = |candidate: &str| {
        if let Some(url) = normalize_image_url(candidate)
            && seen.insert(url.clone())
        {
            images.push(url);
        }
    };

    for element in root.descendants().filter_map(ElementRef::wrap) {
        let value = element.value();
        match value.name() {
            "img" => {
                if let Some(src) = resolve_img_src(value) {
                    push(src);
                }
            }
            "source" => {
                if let Some(src) = value.attr("srcset").and_then(first_srcset_candidate) {
                    push(src);
                }
            }
            _ => {}
        }

        if let Some(style) = value.attr("style") {
            for url in style_urls(style) {
                push(url);
            }
        }
    }

    images
}
