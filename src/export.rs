//! Export: persist a converted document to the local file system.
//!
//! When the parameter bag carries an `export` path, the client hands the
//! response bytes to an [`ExportWriter`] instead of returning them. The
//! default [`FsExportWriter`] creates missing parent directories and writes
//! through a temporary sibling file that is renamed into place, so a failed
//! write never leaves a truncated PDF at the target path.

use async_trait::async_trait;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes the bytes of a converted document to `path`.
#[async_trait]
pub trait ExportWriter: Send + Sync {
    async fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Writes to the local file system (atomic temp-file + rename).
#[derive(Debug, Clone, Copy, Default)]
pub struct FsExportWriter;

#[async_trait]
impl ExportWriter for FsExportWriter {
    async fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&parent).await?;

        let target = path.to_path_buf();
        let data = bytes.to_vec();
        tokio::task::spawn_blocking(move || write_atomic(&parent, &target, &data))
            .await
            .map_err(|e| io::Error::other(format!("export task panicked: {e}")))?
    }
}

/// Blocking implementation of the atomic write.
fn write_atomic(dir: &Path, target: &Path, data: &[u8]) -> io::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    debug!("Wrote {} bytes to {}", data.len(), target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_bytes_and_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.pdf");

        FsExportWriter.write(&path, b"%PDF-1.4").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        std::fs::write(&path, b"old contents that are longer").unwrap();

        FsExportWriter.write(&path, b"new").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[tokio::test]
    async fn fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let result = FsExportWriter.write(&blocker.join("out.pdf"), b"x").await;
        assert!(result.is_err());
    }
}
