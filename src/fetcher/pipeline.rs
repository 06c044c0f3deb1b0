use crate::fetcher::types::{Charset, CharsetSource, PageResponse};
use bytes::Bytes;
use chrono::Utc;
use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use tracing::warn;
use url::Url;

/// Bytes of the body searched for a `<meta>` charset declaration.
const META_SNIFF_LEN: usize = 4096;

static CHARSET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;/>]+)"#).expect("Failed to compile charset regex")
});

// Matches both `<meta charset=..>` and the http-equiv Content-Type form.
static META_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s[^>]*?charset\s*=\s*["']?([^"'\s;/>]+)"#)
        .expect("Failed to compile meta charset regex")
});

pub fn process_response(
    url_final: Url,
    status: StatusCode,
    body_bytes: Bytes,
    content_type: &str,
) -> PageResponse {
    let charset = detect_charset(content_type, &body_bytes);
    let body_utf8 = decode_to_utf8(&body_bytes, charset);

    PageResponse {
        url_final,
        status,
        body_utf8,
        charset,
        fetched_at: Utc::now(),
    }
}

fn label_encoding(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = regex.captures(haystack)?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}

fn detect_charset(content_type: &str, body_bytes: &[u8]) -> Charset {
    // 1. Content-Type header
    if let Some(encoding) = label_encoding(&CHARSET_REGEX, content_type) {
        return Charset {
            encoding,
            source: CharsetSource::ContentType,
        };
    }

    // 2. <meta> declaration near the top of the document
    let head = &body_bytes[..body_bytes.len().min(META_SNIFF_LEN)];
    if let Some(encoding) = label_encoding(&META_REGEX, &String::from_utf8_lossy(head)) {
        return Charset {
            encoding,
            source: CharsetSource::MetaTag,
        };
    }

    // 3. Statistical guess
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, body_bytes.len() <= META_SNIFF_LEN);
    Charset {
        encoding: detector.guess(None, true),
        source: CharsetSource::Detected,
    }
}

// Malformed sequences become U+FFFD rather than failing the whole scrape.
fn decode_to_utf8(body_bytes: &[u8], charset: Charset) -> String {
    let (decoded, encoding, had_errors) = charset.encoding.decode(body_bytes);
    if had_errors {
        warn!(encoding = encoding.name(), "page contained malformed byte sequences");
    }
    decoded.into_owned()
}
