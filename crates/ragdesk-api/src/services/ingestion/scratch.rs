use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Temp files staged for one upload, removed when the guard drops.
///
/// Removal is best effort: failures are logged and never escalated.
#[derive(Debug)]
pub struct ScratchFiles {
    dir: PathBuf,
    paths: Vec<PathBuf>,
}

impl ScratchFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            paths: Vec::new(),
        }
    }

    /// Write `contents` to `{random}-{name}` in the scratch directory.
    pub async fn stage(&mut self, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(format!("{}-{}", Uuid::new_v4(), name));
        // Tracked before the write so a partial file is still removed.
        self.paths.push(path.clone());
        tokio::fs::write(&path, contents).await?;

        tracing::debug!(path = %path.display(), bytes = contents.len(), "Staged upload file");
        Ok(path)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Remove every staged file now.
    pub fn release(self) {
        drop(self);
    }
}

fn remove_staged(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed staged file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged file")
        }
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            remove_staged(&path);
        }
    }
}
