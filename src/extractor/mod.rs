pub mod assemble;
pub mod cleaner;
pub mod images;
pub mod locator;
pub mod model;

#[cfg(test)]
mod tests;

pub use locator::LocateStrategy;
pub use model::{ExtractError, ScrapeResult};

use scraper::{ElementRef, Html};
use tracing::{debug, instrument};

use crate::extractor::model::Article;

/// Run the whole pipeline over raw page HTML.
#[instrument(skip_all, fields(strategy = %strategy, bytes = html.len()))]
pub fn extract(html: &str, strategy: LocateStrategy) -> Result<ScrapeResult, ExtractError> {
    // 1. Parse and find the article
    let document = Html::parse_document(html);
    let located = locator::locate(&document, strategy);
    let article = located.article.ok_or(ExtractError::NoArticle)?;

    // 2. Sanitize into the whitelisted markup
    let article_html = render_article(&document, &article);
    debug!(
        title = %located.title,
        markup_len = article_html.len(),
        "article sanitized"
    );

    // 3. Banner from page metadata, else whatever the strategy spotted
    let banner = assemble::og_image(&document).or(located.banner_hint);

    // 4. Compose the payload
    Ok(assemble::assemble(
        &located.title,
        banner.as_deref(),
        &article_html,
    ))
}

fn render_article(document: &Html, article: &Article) -> String {
    match article {
        Article::Subtree { root, excluded } => element(document, *root)
            .map(|root| cleaner::clean_excluding(root, excluded).to_html())
            .unwrap_or_default(),
        Article::Sequence(ids) => ids
            .iter()
            .filter_map(|id| element(document, *id))
            .map(|block| cleaner::clean(block).to_html())
            .filter(|markup| !markup.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn element(document: &Html, id: ego_tree::NodeId) -> Option<ElementRef<'_>> {
    document.tree.get(id).and_then(ElementRef::wrap)
}
