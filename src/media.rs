// ABOUTME: Best-effort download of images and attachments into the media dir
// ABOUTME: Failures are reported as outcomes, never as errors

use crate::api::ApiClient;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Result of one media download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOutcome {
    Saved(PathBuf),
    /// Empty source URL; nothing was requested
    NoSource,
    Failed(String),
}

impl MediaOutcome {
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            MediaOutcome::Saved(path) => Some(path),
            _ => None,
        }
    }
}

/// Final path segment of `url`, used as the local file name.
pub fn media_file_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .last()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

pub struct MediaFetcher<'a> {
    client: &'a ApiClient,
    signed: bool,
}

impl<'a> MediaFetcher<'a> {
    pub fn new(client: &'a ApiClient, signed: bool) -> Self {
        Self { client, signed }
    }

    pub fn fetch(&self, url: &str, out_dir: &Path) -> MediaOutcome {
        if url.trim().is_empty() {
            return MediaOutcome::NoSource;
        }

        match self.try_fetch(url, out_dir) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(url, error = %e, "media download failed");
                MediaOutcome::Failed(e.to_string())
            }
        }
    }

    fn try_fetch(&self, url: &str, out_dir: &Path) -> Result<MediaOutcome> {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!(url, error = %e, "skipping unparseable media URL");
                return Ok(MediaOutcome::Failed(format!("invalid URL: {}", e)));
            }
        };

        let Some(file_name) = media_file_name(&parsed) else {
            tracing::warn!(url, "media URL has no file name");
            return Ok(MediaOutcome::Failed("URL has no file name".into()));
        };

        fs::create_dir_all(out_dir)?;
        let bytes = self.client.download(&parsed, self.signed)?;

        let path = out_dir.join(file_name);
        fs::write(&path, &bytes)?;
        tracing::debug!(url, path = %path.display(), bytes = bytes.len(), "media saved");

        Ok(MediaOutcome::Saved(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::Consumer;
    use tempfile::TempDir;

    #[test]
    fn test_media_file_name() {
        let url = Url::parse("https://cdn-ak.f.st-hatena.com/images/fotolife/a/alice/20240305/20240305100000.png").unwrap();
        assert_eq!(media_file_name(&url).as_deref(), Some("20240305100000.png"));

        let url = Url::parse("http://x/a.png?width=300#frag").unwrap();
        assert_eq!(media_file_name(&url).as_deref(), Some("a.png"));

        let url = Url::parse("http://x/dir/").unwrap();
        assert_eq!(media_file_name(&url), None);
    }

    #[test]
    fn test_empty_url_is_no_source() {
        let temp = TempDir::new().unwrap();
        let client = ApiClient::new(Consumer::new("ck", "cs"), None).unwrap();
        let fetcher = MediaFetcher::new(&client, false);

        let media_dir = temp.path().join("media");
        assert_eq!(fetcher.fetch("", &media_dir), MediaOutcome::NoSource);
        assert!(!media_dir.exists(), "no directory for a no-op download");
    }

    #[test]
    fn test_unparseable_url_fails_without_request() {
        let temp = TempDir::new().unwrap();
        let client = ApiClient::new(Consumer::new("ck", "cs"), None).unwrap();
        let fetcher = MediaFetcher::new(&client, false);

        let outcome = fetcher.fetch("/relative/a.png", temp.path());
        assert!(matches!(outcome, MediaOutcome::Failed(_)));
        assert!(outcome.local_path().is_none());
    }
}
