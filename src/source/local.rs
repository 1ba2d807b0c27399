//! Directory-backed tile source.
//!
//! Every regular, non-hidden file directly inside the tile directory is a
//! candidate tile. The tile identifier is the file name; subdirectories are
//! not scanned. Files that turn out not to be images are rejected later, when
//! the corpus decodes them.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::SourceError;

use super::{TileId, TileSource};

/// Tile source reading tile files from a local directory.
#[derive(Debug, Clone)]
pub struct LocalTileSource {
    root: PathBuf,
}

impl LocalTileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the tiles are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an identifier to a path inside the root.
    ///
    /// Identifiers are bare file names; anything that could escape the root
    /// directory is treated as unknown.
    fn path_for(&self, id: &TileId) -> Option<PathBuf> {
        let name = id.as_str();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return None;
        }
        Some(self.root.join(name))
    }
}

fn map_io_error(err: std::io::Error, what: &str) -> SourceError {
    match err.kind() {
        ErrorKind::NotFound => SourceError::NotFound(what.to_string()),
        _ => SourceError::Io(format!("{}: {}", what, err)),
    }
}

#[async_trait]
impl TileSource for LocalTileSource {
    async fn list_tiles(&self) -> Result<Vec<TileId>, SourceError> {
        let root = self.root.display().to_string();
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| map_io_error(e, &root))?;

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| map_io_error(e, &root))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| map_io_error(e, &root))?;
            if !file_type.is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                debug!(path = %entry.path().display(), "Skipping tile with non UTF-8 name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            ids.push(TileId::from(name));
        }

        ids.sort();
        Ok(ids)
    }

    async fn fetch(&self, id: &TileId) -> Result<Bytes, SourceError> {
        let path = self
            .path_for(id)
            .ok_or_else(|| SourceError::NotFound(id.to_string()))?;

        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| map_io_error(e, id.as_str()))?;
        Ok(Bytes::from(data))
    }
}
