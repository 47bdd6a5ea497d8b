//! Zip packaging of a run's output root.
//!
//! Entries mirror the directory layout (`<job_folder>/<icon>.png`) with `/`
//! separators and are written in sorted order. An empty root produces a valid
//! empty archive.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ArchiveError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    /// File entries written.
    pub files: usize,
    /// Uncompressed bytes of all entries.
    pub bytes: u64,
}

/// Writes a deflate zip of everything under `root` to `dest`.
///
/// Blocking; call from `spawn_blocking` if used from async code.
pub fn archive_dir(root: &Path, dest: &Path) -> Result<ArchiveStats, ArchiveError> {
    let mut files = Vec::new();
    collect_files(root, root, &mut files)?;
    files.sort();

    let out = File::create(dest)?;
    let mut zip = zip::ZipWriter::new(out);
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    let mut stats = ArchiveStats::default();
    for (entry_name, path) in files {
        zip.start_file(entry_name, options)?;
        let mut src = File::open(&path)?;
        stats.bytes += io::copy(&mut src, &mut zip)?;
        stats.files += 1;
    }
    zip.finish()?;

    tracing::info!(dest = %dest.display(), files = stats.files, bytes = stats.bytes, "archive written");
    Ok(stats)
}

/// Collects `(entry name, absolute path)` for every regular file under `dir`.
fn collect_files(root: &Path, dir: &Path, out: &mut Vec<(String, PathBuf)>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else if file_type.is_file() {
            let rel = path.strip_prefix(root).unwrap_or(&path);
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push((name, path));
        }
    }
    Ok(())
}

/// The packaged output of one run. Lives in its own temporary directory,
/// which is removed when the artifact is dropped.
#[derive(Debug)]
pub struct ArchiveArtifact {
    _dir: tempfile::TempDir,
    path: PathBuf,
    stats: ArchiveStats,
}

impl ArchiveArtifact {
    /// Archives `root` into a fresh temporary directory as `file_name`.
    pub fn build(root: &Path, file_name: &str) -> Result<Self, ArchiveError> {
        let dir = tempfile::Builder::new().prefix("icondl-archive-").tempdir()?;
        let path = dir.path().join(file_name);
        let stats = archive_dir(root, &path)?;
        Ok(Self {
            _dir: dir,
            path,
            stats,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("icons.zip")
    }

    pub fn stats(&self) -> ArchiveStats {
        self.stats
    }

    /// Copies the archive to `dest` for delivery. Returns bytes copied.
    pub fn persist_to(&self, dest: &Path) -> io::Result<u64> {
        std::fs::copy(&self.path, dest)
    }
}
