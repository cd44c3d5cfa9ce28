//! Local cache of downloaded files.
//!
//! The cache is append-only: files are created once under their
//! date-stamped name and never evicted or rewritten.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;

/// Storage for cached files.
#[async_trait]
pub trait Store: Send + Sync {
    /// Whether a regular file exists at `path`. Unreadable paths count as absent.
    async fn exists(&self, path: &Path) -> bool;

    /// Read the whole file at `path`.
    async fn read_all(&self, path: &Path) -> io::Result<Bytes>;

    /// Persist `bytes` at `path`. Either the complete file appears under
    /// `path` or an error is returned.
    async fn write_all(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Filesystem-backed [`Store`].
///
/// Writes go to a `<name>.part` sibling first and are renamed into place
/// once flushed, so an interrupted save never leaves a truncated file under
/// the final name.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

/// Temporary path used while writing `path`.
pub fn part_path(path: &Path) -> io::Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("no file name in {}", path.display())))?;
    let mut part: OsString = name.to_os_string();
    part.push(".part");
    Ok(path.with_file_name(part))
}

#[async_trait]
impl Store for FsStore {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
    }

    async fn read_all(&self, path: &Path) -> io::Result<Bytes> {
        tokio::fs::read(path).await.map(Bytes::from)
    }

    async fn write_all(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let part = part_path(path)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let written = async {
            let mut file = tokio::fs::File::create(&part).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&part, path).await
        }
        .await;

        if let Err(err) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&part).await
                && cleanup.kind() != io::ErrorKind::NotFound
            {
                tracing::debug!("could not remove {}: {}", part.display(), cleanup);
            }
            return Err(err);
        }

        tracing::debug!("cached {} bytes at {}", bytes.len(), path.display());
        Ok(())
    }
}
