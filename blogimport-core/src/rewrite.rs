//! Rewriting of embedded image sources to local asset URLs

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::assets::AssetImporter;
use crate::richtext::html::escape_attr;
use crate::storage::{AssetStore, EntryId};

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img[^>]+>").expect("img tag pattern is valid"));
static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("src attribute pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedImage {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RewriteOutcome {
    pub html: String,
    /// Image tags whose source now points at a local asset
    pub rewritten: usize,
    /// One entry per tag left pointing at its remote source
    pub failed: Vec<FailedImage>,
    /// Tags without a usable remote source (missing `src`, inline data, already local)
    pub skipped: usize,
}

/// Import every remote image referenced by an `<img>` tag and point the tag
/// at the local copy. Only the `src` value changes; the rest of the markup is
/// kept byte for byte. Failed imports leave the tag untouched.
pub async fn rewrite_images<S: AssetStore>(
    html: &str,
    owner: &EntryId,
    assets: &AssetImporter<S>,
) -> RewriteOutcome {
    let mut outcome = RewriteOutcome::default();
    let mut out = String::with_capacity(html.len());
    let mut resolved: HashMap<String, Result<String, String>> = HashMap::new();
    let mut last = 0;

    for tag in IMG_TAG.find_iter(html) {
        out.push_str(&html[last..tag.start()]);
        last = tag.end();
        let tag_text = tag.as_str();

        let Some(value) = SRC_ATTR
            .captures(tag_text)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        else {
            outcome.skipped += 1;
            out.push_str(tag_text);
            continue;
        };

        let url = value.as_str().trim().replace("&amp;", "&");
        if url.is_empty() || url.starts_with("data:") || assets.is_local(&url) {
            outcome.skipped += 1;
            out.push_str(tag_text);
            continue;
        }

        let result = match resolved.get(&url) {
            Some(result) => result.clone(),
            None => {
                let result = assets
                    .import_by_url(&url, owner)
                    .await
                    .map(|asset| asset.url)
                    .map_err(|e| e.to_string());
                resolved.insert(url.clone(), result.clone());
                result
            }
        };

        match result {
            Ok(local_url) => {
                debug!(%url, %local_url, "rewrote image source");
                out.push_str(&tag_text[..value.start()]);
                out.push_str(&escape_attr(&local_url));
                out.push_str(&tag_text[value.end()..]);
                outcome.rewritten += 1;
            }
            Err(error) => {
                warn!(%url, %error, "image import failed, keeping remote source");
                out.push_str(tag_text);
                outcome.failed.push(FailedImage { url, error });
            }
        }
    }

    out.push_str(&html[last..]);
    outcome.html = out;
    outcome
}
