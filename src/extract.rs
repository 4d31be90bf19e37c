// ABOUTME: Normalizes raw feed entries into export-ready metadata
// ABOUTME: Truncates dates, derives tags, finds image and enclosure URLs

use crate::model::{Entry, RawEntry};
use crate::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

fn img_src_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Each quote style closes only itself
        Regex::new(r#"<img[^>]+src=(?:"([^"]+)"|'([^']+)')"#).expect("image src pattern is valid")
    })
}

/// `src` values of `<img>` tags in order of appearance, duplicates kept.
pub fn image_urls(body: &str) -> Vec<String> {
    img_src_regex()
        .captures_iter(body)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// First ten characters of an ISO-8601 timestamp, i.e. `YYYY-MM-DD`.
pub fn truncate_date(published: &str) -> String {
    published.chars().take(10).collect()
}

pub fn extract_entry(raw: &RawEntry) -> Result<Entry> {
    let title = raw
        .title
        .clone()
        .ok_or_else(|| Error::Entry("entry has no title".into()))?;

    let published = raw
        .published
        .as_deref()
        .map(truncate_date)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| Error::Entry(format!("entry {:?} has no published date", title)))?;

    let body = raw.content.clone().unwrap_or_default();
    let categories = raw.categories.clone();

    let draft = raw
        .draft
        .as_deref()
        .map(|d| d.trim().eq_ignore_ascii_case("yes"))
        .unwrap_or(false);

    let enclosure_urls = raw
        .links
        .iter()
        .filter(|(rel, _)| rel == "enclosure")
        .map(|(_, href)| href.clone())
        .collect();

    Ok(Entry {
        image_urls: image_urls(&body),
        title,
        body,
        published,
        tags: categories.clone(),
        categories,
        draft,
        enclosure_urls,
    })
}
