use std::fs;

use scraper::{ElementRef, Html};

use crate::extractor::cleaner::{ALLOWED_TAGS, clean};
use crate::extractor::{ExtractError, LocateStrategy, extract};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{}", name))
        .expect("Failed to read test fixture")
}

fn assert_whitelisted(content_html: &str) {
    let fragment = Html::parse_fragment(content_html);
    for element in fragment
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .skip(1)
    {
        let name = element.value().name();
        assert!(ALLOWED_TAGS.contains(&name), "unexpected tag <{}>", name);
        let attrs: Vec<&str> = element.value().attrs().map(|(k, _)| k).collect();
        if name == "img" {
            assert!(attrs.iter().all(|a| *a == "src" || *a == "alt"));
        } else {
            assert!(attrs.is_empty(), "<{}> kept attributes {:?}", name, attrs);
        }
    }
}

#[test]
fn test_extract_article() {
    let result = extract(&fixture("article.html"), LocateStrategy::Generic).unwrap();

    assert_eq!(result.title, "How We Ship Small Services");
    assert_eq!(
        result.images,
        vec![
            "https://blog.example.com/static/banner.jpg",
            "https://cdn.example.com/img/pipeline.png",
            "https://cdn.example.com/img/diagram.png",
        ]
    );
    assert_eq!(result.image_names, vec!["image1.png", "image2.png", "image3.png"]);

    assert!(result.content_html.starts_with(
        "<h1>How We Ship Small Services</h1>\n<p><img src=\"https://blog.example.com/static/banner.jpg\" alt=\"Banner\"></p>\n"
    ));
    assert!(result.content_html.contains("<strong>boring</strong>"));
    assert!(
        result
            .content_html
            .contains(r#"<img src="https://cdn.example.com/img/pipeline.png" alt="The pipeline">"#)
    );
    assert!(result.content_html.contains("Ünïcödé survives"));
    assert!(!result.content_html.contains("trackScroll"));
    assert!(!result.content_html.contains("pixel.gif"));
    assert!(!result.content_html.contains("Home"));
    assert!(!result.content_html.contains("<article"));
    assert_whitelisted(&result.content_html);
}

#[test]
fn test_extract_with_trailer_trimmed() {
    let html = fixture("deel.html");

    let trimmed = extract(&html, LocateStrategy::TrailerTrimmed).unwrap();
    assert_eq!(trimmed.title, "Hiring Contractors Abroad");
    assert!(trimmed.content_html.contains("Contractors are not employees."));
    assert!(!trimmed.content_html.contains("More resources"));
    assert!(!trimmed.content_html.contains("Book a demo"));
    assert_eq!(
        trimmed.images,
        vec![
            "https://www.deel.test/og/contractors.png",
            "https://www.deel.test/images/map.png",
        ]
    );

    let generic = extract(&html, LocateStrategy::Generic).unwrap();
    assert!(generic.content_html.contains("More resources"));
    assert!(
        generic
            .images
            .contains(&"https://www.deel.test/images/guide-thumb.png".to_string())
    );
}

#[test]
fn test_extract_heading_anchored() {
    let result = extract(&fixture("heading.html"), LocateStrategy::HeadingAnchored).unwrap();

    assert_eq!(result.title, "Remote Work Policies");
    assert_eq!(result.images, vec!["https://site.test/cover.jpg"]);
    assert_eq!(result.image_names, vec!["image1.png"]);
    assert!(!result.content_html.contains("Top bar"));
    assert!(!result.content_html.contains("logo.png"));
    assert!(!result.content_html.contains("5 min read"));
    assert!(!result.content_html.contains("ignored"));
    assert!(
        result
            .content_html
            .ends_with("<h2>Equipment</h2>\n<ol><li>Laptop</li><li>Monitor</li></ol>\nWrite it down.")
    );
    assert_whitelisted(&result.content_html);
}

#[test]
fn test_banner_and_protocol_relative_image() {
    let html = r#"<html><head><meta property="og:image" content="http://x/banner.jpg"></head><body><article><h1>T</h1><p>Hello</p><img src="//cdn/a.png"></article></body></html>"#;
    let result = extract(html, LocateStrategy::Generic).unwrap();

    assert_eq!(result.images, vec!["http://x/banner.jpg", "https://cdn/a.png"]);
    assert_eq!(result.image_names, vec!["image1.png", "image2.png"]);
    assert_eq!(result.title, "T");
}

#[test]
fn test_banner_urls_follow_image_rules() {
    let html = r#"<html><head><meta property="og:image" content="//cdn.test/b.jpg"></head><body><article><p>x</p></article></body></html>"#;
    let result = extract(html, LocateStrategy::Generic).unwrap();
    assert_eq!(result.images, vec!["https://cdn.test/b.jpg"]);
    assert!(
        result
            .content_html
            .contains(r#"<img src="https://cdn.test/b.jpg" alt="Banner">"#)
    );

    let html = r#"<html><head><meta property="og:image" content="/b.jpg"></head><body><article><p>x</p><img src="https://cdn.test/a.png"></article></body></html>"#;
    let result = extract(html, LocateStrategy::Generic).unwrap();
    assert_eq!(result.images, vec!["https://cdn.test/a.png"]);
    assert!(!result.content_html.contains("Banner"));
}

#[test]
fn test_falls_back_to_body() {
    let html = "<html><head><title>Plain</title></head><body><section><p>Just a page.</p></section></body></html>";
    let result = extract(html, LocateStrategy::Generic).unwrap();

    assert_eq!(result.title, "Plain");
    assert_eq!(result.content_html, "<h1>Plain</h1>\n<p>Just a page.</p>");
}

#[test]
fn test_reject_empty_page() {
    let html = "<html><head><title>Nothing</title></head><body></body></html>";
    assert_eq!(
        extract(html, LocateStrategy::Generic),
        Err(ExtractError::NoArticle)
    );
    assert_eq!(extract("", LocateStrategy::TrailerTrimmed), Err(ExtractError::NoArticle));
    assert_eq!(
        extract(html, LocateStrategy::HeadingAnchored),
        Err(ExtractError::NoArticle)
    );
}

#[test]
fn test_relative_lazy_image_is_excluded() {
    let html = r#"<html><body><article><p>x</p><img data-src="/relative.png"></article></body></html>"#;
    let result = extract(html, LocateStrategy::Generic).unwrap();

    assert!(result.images.is_empty());
    assert!(result.image_names.is_empty());
    assert!(result.content_html.contains(r#"<img src="/relative.png" alt="Image">"#));
}

#[test]
fn test_sanitized_article_is_a_fixed_point() {
    let document = Html::parse_document(&fixture("article.html"));
    let once = clean(document.root_element()).to_html();
    let twice = clean(Html::parse_fragment(&once).root_element()).to_html();
    assert_eq!(once, twice);
}

#[test]
fn test_deeply_nested_page_does_not_exhaust_the_stack() {
    const DEPTH: usize = 5000;
    let html = format!(
        "<html><head><title>Deep</title></head><body><article>{}<p>x</p>{}</article></body></html>",
        "<div>".repeat(DEPTH),
        "</div>".repeat(DEPTH)
    );
    // Same stack size the blocking pool gives extraction work.
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || {
            [
                LocateStrategy::Generic,
                LocateStrategy::HeadingAnchored,
                LocateStrategy::TrailerTrimmed,
            ]
            .map(|strategy| extract(&html, strategy).map(|result| result.content_html))
        })
        .unwrap();
    let [generic, heading, trailer] = handle.join().unwrap();

    assert_eq!(generic.unwrap(), "<h1>Deep</h1>\n<p>x</p>");
    assert_eq!(trailer.unwrap(), "<h1>Deep</h1>\n<p>x</p>");
    assert_eq!(heading, Err(ExtractError::NoArticle));
}

#[cfg(feature = "fuzz")]
mod properties {
    use proptest::prelude::*;

    use super::*;

    fn block() -> impl Strategy<Value = String> {
        let tag = prop::sample::select(vec![
            "p", "div", "span", "article", "section", "h1", "h2", "h3", "h4", "ul", "li", "a",
            "em", "table", "td", "script", "style", "noscript", "blockquote",
        ]);
        let img = prop::sample::select(vec![
            r#"<img src="//cdn.test/a.png">"#,
            r#"<img data-src="https://cdn.test/b.png" class="x">"#,
            r#"<img data-src="/relative.png">"#,
            r#"<img srcset="https://cdn.test/c.png 1x, https://cdn.test/d.png 2x">"#,
            r#"<img src="data:image/gif;base64,R0lGOD">"#,
            r#"<div style="background:url('https://cdn.test/bg.png')"></div>"#,
        ]);
        let leaf = prop_oneof![
            "[a-zA-Z &<>]{0,12}".prop_map(|text| html_escape::encode_text(&text).to_string()),
            img.prop_map(str::to_string),
        ];
        leaf.prop_recursive(4, 32, 4, move |inner| {
            (tag.clone(), prop::collection::vec(inner, 0..4)).prop_map(|(tag, children)| {
                format!(r#"<{tag} class="c" onclick="x()">{}</{tag}>"#, children.concat())
            })
        })
    }

    // Nests that cross the whitelist in every combination, including blocks
    // inside headings, paragraphs, links and list items.
    fn nested_block() -> impl Strategy<Value = String> {
        let wrapper = prop::sample::select(vec![
            "div", "span", "section", "article", "blockquote", "em", "strong", "b", "i", "p",
            "h1", "h2", "h3", "a", "ul", "ol", "li",
        ]);
        let leaf = prop_oneof![
            "[a-zA-Z ]{0,12}",
            "[a-z]{1,8}".prop_map(|text| format!("<p class=\"x\">{} &amp; more</p>", text)),
            "[a-z]{1,8}".prop_map(|text| format!("<h2>{}</h2>", text)),
            "[a-z]{1,8}".prop_map(|text| format!("<ul><li>{}</li></ul>", text)),
            "[a-z]{1,8}".prop_map(|text| format!(r#"<a href="/{}">{}</a>"#, text, text)),
            Just(r#"<img data-lazy-src="//cdn.test/x.png" alt=" x ">"#.to_string()),
            Just("<script>var a = 1;</script>".to_string()),
        ];
        leaf.prop_recursive(4, 32, 4, move |inner| {
            (wrapper.clone(), prop::collection::vec(inner, 0..4)).prop_map(|(tag, children)| {
                format!(r#"<{tag} style="color:red">{}</{tag}>"#, children.concat())
            })
        })
    }

    proptest! {
        #[test]
        fn prop_output_invariants(body in block(), banner in prop::bool::ANY) {
            let head = if banner {
                r#"<meta property="og:image" content="https://cdn.test/banner.png">"#
            } else {
                ""
            };
            let html = format!("<html><head>{}</head><body><article>{}</article></body></html>", head, body);
            let result = extract(&html, LocateStrategy::Generic).unwrap();

            assert_whitelisted(&result.content_html);
            prop_assert_eq!(result.images.len(), result.image_names.len());
            for (i, name) in result.image_names.iter().enumerate() {
                prop_assert_eq!(name, &format!("image{}.png", i + 1));
            }
            for (i, url) in result.images.iter().enumerate() {
                prop_assert!(url.starts_with("http://") || url.starts_with("https://"));
                prop_assert!(!result.images[..i].contains(url));
            }
            if banner {
                prop_assert_eq!(result.images[0].as_str(), "https://cdn.test/banner.png");
            }
        }

        #[test]
        fn prop_clean_is_idempotent(body in nested_block()) {
            let once = clean(Html::parse_fragment(&body).root_element()).to_html();
            let twice = clean(Html::parse_fragment(&once).root_element()).to_html();
            prop_assert_eq!(once, twice);
        }
    }
}
