// ABOUTME: Atom feed page parsing and pagination over `rel="next"` links
// ABOUTME: Returns raw entries in feed order, keeping partial results on failure

use crate::api::ApiClient;
use crate::model::RawEntry;
use crate::{Error, Result};
use atom_syndication::extension::{Extension, ExtensionMap};
use atom_syndication::{Feed, Link};
use std::collections::{BTreeMap, HashSet};

pub const APP_NS: &str = "http://www.w3.org/2007/app";
pub const ATOM_BLOG_NS: &str = "http://purl.org/atom-blog/ns#";

/// Prefix Hatena binds to the AtomPub namespace.
const APP_PREFIX: &str = "app";

/// One page of the entry collection.
#[derive(Debug, Default)]
pub struct FeedPage {
    pub entries: Vec<RawEntry>,
    pub next: Option<String>,
}

/// Parses one Atom document into its entries and the feed-level `next` link.
pub fn parse_feed_page(xml: &str) -> Result<FeedPage> {
    let feed = Feed::read_from(xml.as_bytes())
        .map_err(|e| Error::Xml(format!("Atom parse error: {}", e)))?;

    let draft_prefixes = draft_prefixes(feed.namespaces());

    let next = feed
        .links()
        .iter()
        .find(|link| link.rel() == "next" && !link.href().is_empty())
        .map(|link| link.href().to_string());

    let entries = feed
        .entries()
        .iter()
        .map(|entry| {
            // An empty <title/> is indistinguishable from a missing one here
            let title = Some(entry.title().as_str())
                .filter(|t| !t.is_empty())
                .map(str::to_string);

            RawEntry {
                title,
                content: entry.content().map(|c| {
                    // Structured xhtml bodies have no direct text
                    if c.content_type() == Some("xhtml") {
                        String::new()
                    } else {
                        c.value().unwrap_or_default().to_string()
                    }
                }),
                published: entry.published().map(|dt| dt.to_rfc3339()),
                categories: entry
                    .categories()
                    .iter()
                    .map(|c| c.term().to_string())
                    .collect(),
                links: entry.links().iter().filter_map(link_pair).collect(),
                draft: find_draft(entry.extensions(), &draft_prefixes),
            }
        })
        .collect();

    Ok(FeedPage { entries, next })
}

fn link_pair(link: &Link) -> Option<(String, String)> {
    if link.href().is_empty() {
        return None;
    }
    Some((link.rel().to_string(), link.href().to_string()))
}

/// Prefixes the document binds to namespaces that may carry the draft flag.
fn draft_prefixes(namespaces: &BTreeMap<String, String>) -> Vec<String> {
    let mut prefixes: Vec<String> = namespaces
        .iter()
        .filter(|(_, uri)| uri.as_str() == APP_NS || uri.as_str() == ATOM_BLOG_NS)
        .map(|(prefix, _)| prefix.clone())
        .collect();

    if !namespaces.values().any(|uri| uri == APP_NS) && !namespaces.contains_key(APP_PREFIX) {
        prefixes.push(APP_PREFIX.to_string());
    }
    prefixes
}

/// Text of the first `draft` element under any of `prefixes`, at any depth.
fn find_draft(extensions: &ExtensionMap, prefixes: &[String]) -> Option<String> {
    prefixes
        .iter()
        .filter_map(|prefix| extensions.get(prefix))
        .find_map(find_draft_in)
}

fn find_draft_in(elements: &BTreeMap<String, Vec<Extension>>) -> Option<String> {
    if let Some(draft) = elements.get("draft").and_then(|found| found.first()) {
        return Some(draft.value().unwrap_or_default().to_string());
    }
    elements
        .values()
        .flatten()
        .find_map(|ext| find_draft_in(ext.children()))
}

/// All entries gathered by walking the feed, plus the reason the walk
/// stopped early, if it did.
#[derive(Debug)]
pub struct FeedFetch {
    pub entries: Vec<RawEntry>,
    pub stopped: Option<Error>,
}

/// Follows `next` links from `start_url` until the feed is exhausted or a
/// page fails. Entries gathered before a failure are kept.
pub fn fetch_all_entries(client: &ApiClient, start_url: &str) -> FeedFetch {
    let mut entries = Vec::new();
    let mut visited = HashSet::new();
    let mut url = Some(start_url.to_string());

    while let Some(current) = url.take() {
        if !visited.insert(current.clone()) {
            tracing::warn!(url = %current, "next link points at an already fetched page, stopping");
            break;
        }

        let page = match client.get_feed(&current).and_then(|xml| parse_feed_page(&xml)) {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(url = %current, error = %e, "stopping pagination");
                return FeedFetch {
                    entries,
                    stopped: Some(e),
                };
            }
        };

        let count = page.entries.len();
        entries.extend(page.entries);
        println!("Fetched {} entries (total: {})", count, entries.len());

        url = page.next;
    }

    FeedFetch {
        entries,
        stopped: None,
    }
}
