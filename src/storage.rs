// ABOUTME: Export directory layout with atomic file writes
// ABOUTME: Handles the export root, media subdirectory and frontmatter reads

use crate::model::ExportedFrontmatter;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const MEDIA_DIR_NAME: &str = "media";

pub struct Paths {
    pub export_root: PathBuf,
    pub media_dir: PathBuf,
}

impl Paths {
    pub fn new(export_root: PathBuf) -> Self {
        Paths {
            media_dir: export_root.join(MEDIA_DIR_NAME),
            export_root,
        }
    }

    /// Creates the export root. The media directory is created lazily on the
    /// first download.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.export_root)?;
        Ok(())
    }

    /// `path` relative to the export root with `/` separators, as used in
    /// Markdown links.
    pub fn relative_link(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.export_root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

/// Writes via a temp file in the target directory followed by a rename.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    write_atomic_with(path, content, false)
}

/// Like [`write_atomic`], but the file ends up readable by its owner only.
pub fn write_private(path: &Path, content: &[u8]) -> Result<()> {
    write_atomic_with(path, content, true)
}

fn write_atomic_with(path: &Path, content: &[u8], private: bool) -> Result<()> {
    use rand::Rng;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let random: u32 = rand::thread_rng().gen();
    let tmp_path = dir.join(format!(".{:x}.part", random));

    if let Err(e) = fs::write(&tmp_path, content) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if private {
            let perms = fs::Permissions::from_mode(0o600);
            if let Err(e) = fs::set_permissions(&tmp_path, perms) {
                let _ = fs::remove_file(&tmp_path);
                return Err(e.into());
            }
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}

pub fn read_frontmatter(md_path: &Path) -> Result<Option<ExportedFrontmatter>> {
    if !md_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(md_path)?;

    let Some(rest) = content.strip_prefix("---\n") else {
        return Ok(None);
    };

    if let Some(end_pos) = rest.find("\n---\n") {
        let yaml = &rest[..end_pos];
        let fm: ExportedFrontmatter = serde_yaml::from_str(yaml).map_err(|e| {
            Error::Filesystem(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to parse frontmatter in {}: {}", md_path.display(), e),
            ))
        })?;
        Ok(Some(fm))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_layout() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::new(temp.path().to_path_buf());
        assert_eq!(paths.export_root, temp.path());
        assert_eq!(paths.media_dir, temp.path().join("media"));
    }

    #[test]
    fn test_ensure_dirs_creates_root() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::new(temp.path().join("nested").join("export"));
        paths.ensure_dirs().unwrap();
        assert!(paths.export_root.is_dir());
    }

    #[test]
    fn test_relative_link() {
        let paths = Paths::new(PathBuf::from("/vault/HatenaBlog"));
        let local = paths.media_dir.join("a.png");
        assert_eq!(paths.relative_link(&local).as_deref(), Some("media/a.png"));
        assert_eq!(paths.relative_link(Path::new("/elsewhere/a.png")), None);
    }
}
