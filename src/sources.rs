//! Discovery of source folders and the per-day files inside them.
//!
//! The archive is laid out as one subfolder per paper and medium, e.g.
//! `politiken-print/` or `politiken-web/`, each holding one NDJSON file per
//! day. Enumeration order is whatever the filesystem returns.

use clap::ValueEnum;
use std::fmt;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Which medium to clean, matched against the subfolder name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    Print,
    Web,
}

impl SourceKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            SourceKind::Print => "print",
            SourceKind::Web => "web",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Metadata of the entry, following symlinks. Dangling links are logged and
/// yield `None`.
async fn target_metadata(path: &Path) -> Option<Metadata> {
    match fs::metadata(path).await {
        Ok(meta) => Some(meta),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
            None
        }
    }
}

/// Immediate subdirectories of `root` whose name ends with `suffix`.
///
/// Symlinked folders count. Every call re-reads the directory.
#[instrument(level = "info", skip_all, fields(root = %root.display(), %suffix))]
pub async fn list_subfolders(root: &Path, suffix: &str) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(root).await?;
    let mut folders = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_name().to_string_lossy().ends_with(suffix) {
            continue;
        }
        if target_metadata(&entry.path()).await.is_some_and(|m| m.is_dir()) {
            folders.push(entry.path());
        }
    }
    info!(count = folders.len(), "Indexed source folders");
    debug!(folders = ?folders, "Source folders");
    Ok(folders)
}

/// Regular files directly inside `folder`, symlinked files included.
#[instrument(level = "debug", skip_all, fields(folder = %folder.display()))]
pub async fn list_files(folder: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(folder).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if target_metadata(&entry.path()).await.is_some_and(|m| m.is_file()) {
            files.push(entry.path());
        }
    }
    debug!(count = files.len(), "Indexed source files");
    Ok(files)
}
