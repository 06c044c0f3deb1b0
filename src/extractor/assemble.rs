use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::extractor::images::{extract_images, normalize_image_url};
use crate::extractor::model::ScrapeResult;

static OG_IMAGE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="og:image"]"#).expect("Failed to parse og:image selector")
});

/// The `og:image` URL of the page, normalized like any other image. A
/// relative or non-http(s) value means no banner.
pub fn og_image(document: &Html) -> Option<String> {
    document
        .select(&OG_IMAGE_SELECTOR)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .and_then(normalize_image_url)
}

/// `image1.png`, `image2.png`, ... one per image.
pub fn image_names(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("image{}.png", n)).collect()
}

/// Build the response payload from the title, optional banner and the
/// sanitized article markup.
pub fn assemble(title: &str, banner: Option<&str>, article_html: &str) -> ScrapeResult {
    let mut images: Vec<String> = banner.map(str::to_string).into_iter().collect();

    let fragment = Html::parse_fragment(article_html);
    for url in extract_images(fragment.root_element()) {
        if !images.contains(&url) {
            images.push(url);
        }
    }

    let mut content_html = format!("<h1>{}</h1>\n", html_escape::encode_text(title));
    if let Some(banner) = banner {
        content_html.push_str(&format!(
            "<p><img src=\"{}\" alt=\"Banner\"></p>\n",
            html_escape::encode_double_quoted_attribute(banner)
        ));
    }
    content_html.push_str(article_html.trim());

    ScrapeResult {
        title: title.to_string(),
        content_html,
        image_names: image_names(images.len()),
        images,
    }
}
