// ABOUTME: Data models for feed entries and exported frontmatter
// ABOUTME: RawEntry mirrors the XML, Entry is the normalized record

use serde::Deserialize;

/// One `<entry>` element as read from an Atom page, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<String>,
    pub categories: Vec<String>,
    /// `(rel, href)` pairs in document order; `rel` defaults to `alternate`
    pub links: Vec<(String, String)>,
    pub draft: Option<String>,
}

/// Normalized metadata for one blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub title: String,
    pub body: String,
    /// Calendar date portion of the published timestamp (`YYYY-MM-DD`)
    pub published: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub draft: bool,
    pub image_urls: Vec<String>,
    pub enclosure_urls: Vec<String>,
}

/// Frontmatter block of an exported Markdown file.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportedFrontmatter {
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exported_frontmatter_deserialize() {
        let yaml = "title: \"Hello/World\"\ndate: 2024-03-05\ncategories: ['diary', \"it's\"]\ntags: ['diary']\ndraft: False\n";
        let fm: ExportedFrontmatter = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(fm.title, "Hello/World");
        assert_eq!(fm.date, "2024-03-05");
        assert_eq!(fm.categories, vec!["diary", "it's"]);
        assert!(!fm.draft);
    }
}
