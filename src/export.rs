// ABOUTME: Core export logic writing one Markdown file per feed entry
// ABOUTME: Downloads media, rewrites image URLs and reports progress

use crate::{
    config::CollisionPolicy,
    convert::{file_name, to_markdown},
    extract::extract_entry,
    media::{MediaFetcher, MediaOutcome},
    model::{Entry, RawEntry},
    storage::{write_atomic, Paths},
    Result,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: usize,
    pub skipped: usize,
    pub media_saved: usize,
    pub media_failed: usize,
}

pub struct Exporter<'a> {
    paths: &'a Paths,
    media: MediaFetcher<'a>,
    collision: CollisionPolicy,
    /// File names already written in this run
    written: HashSet<String>,
}

impl<'a> Exporter<'a> {
    pub fn new(paths: &'a Paths, media: MediaFetcher<'a>, collision: CollisionPolicy) -> Self {
        Self {
            paths,
            media,
            collision,
            written: HashSet::new(),
        }
    }

    pub fn export_all(&mut self, raw_entries: &[RawEntry]) -> Result<ExportSummary> {
        let stdout = io::stdout();
        self.export_all_to(raw_entries, &mut stdout.lock())
    }

    /// Exports every entry, announcing each written file on `out`.
    pub fn export_all_to<W: Write>(&mut self, raw_entries: &[RawEntry], out: &mut W) -> Result<ExportSummary> {
        self.paths.ensure_dirs()?;

        let pb = ProgressBar::new(raw_entries.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40}] {pos}/{len} entries")
                .unwrap()
                .progress_chars("##-"),
        );

        let mut summary = ExportSummary::default();

        for raw in raw_entries {
            match extract_entry(raw) {
                Ok(entry) => {
                    let path = self.export_entry(&entry, &mut summary)?;
                    // ProgressBar::println is dropped when stderr is not a terminal
                    pb.suspend(|| writeln!(out, "Saved: {}", path.display()))?;
                    summary.written += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping entry");
                    summary.skipped += 1;
                }
            }
            pb.inc(1);
        }

        pb.finish_with_message(format!(
            "exported {} entries ({} skipped)",
            summary.written, summary.skipped
        ));

        Ok(summary)
    }

    /// Downloads the entry's media, rewrites its body and writes the file.
    pub fn export_entry(&mut self, entry: &Entry, summary: &mut ExportSummary) -> Result<PathBuf> {
        let mut body = entry.body.clone();

        // Each image URL is paired with its own outcome so one failure never
        // shifts the replacement of the URLs after it.
        let mut replacements = Vec::new();
        for url in &entry.image_urls {
            let outcome = self.media.fetch(url, &self.paths.media_dir);
            tally(&outcome, summary);
            if let Some(link) = outcome.local_path().and_then(|p| self.paths.relative_link(p)) {
                replacements.push((url, link));
            }
        }

        // Enclosures are attachments; they are stored but not linked from the body
        for url in &entry.enclosure_urls {
            let outcome = self.media.fetch(url, &self.paths.media_dir);
            tally(&outcome, summary);
        }

        for (url, link) in replacements {
            body = body.replace(url.as_str(), &link);
        }

        let name = self.claim_file_name(file_name(entry));
        let path = self.paths.export_root.join(name);
        write_atomic(&path, to_markdown(entry, &body).as_bytes())?;

        Ok(path)
    }

    fn claim_file_name(&mut self, name: String) -> String {
        if self.written.insert(name.clone()) {
            return name;
        }

        match self.collision {
            CollisionPolicy::Overwrite => {
                tracing::warn!(file = %name, "two entries share a file name; overwriting the earlier one");
                name
            }
            CollisionPolicy::Suffix => {
                let stem = name.trim_end_matches(".md");
                let mut n = 2;
                loop {
                    let candidate = format!("{}_{}.md", stem, n);
                    if self.written.insert(candidate.clone()) {
                        tracing::info!(file = %candidate, "file name collision resolved with suffix");
                        return candidate;
                    }
                    n += 1;
                }
            }
        }
    }
}

fn tally(outcome: &MediaOutcome, summary: &mut ExportSummary) {
    match outcome {
        MediaOutcome::Saved(_) => summary.media_saved += 1,
        MediaOutcome::Failed(_) => summary.media_failed += 1,
        MediaOutcome::NoSource => {}
    }
}
