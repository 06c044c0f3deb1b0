#![no_main]

use libfuzzer_sys::fuzz_target;

use blogscrape::extractor::{LocateStrategy, extract};

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);

    // No strategy may panic, and successful output must keep its invariants.
    for strategy in [
        LocateStrategy::Generic,
        LocateStrategy::HeadingAnchored,
        LocateStrategy::TrailerTrimmed,
    ] {
        if let Ok(result) = extract(&html, strategy) {
            assert_eq!(result.images.len(), result.image_names.len());
            assert!(
                result
                    .images
                    .iter()
                    .all(|url| url.starts_with("http://") || url.starts_with("https://"))
            );
        }
    }
});
