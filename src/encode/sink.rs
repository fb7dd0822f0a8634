use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::info;

use crate::encode::raster::EncodedCard;
use crate::foundation::error::{CardError, CardResult};

/// Destination for encoded cards.
pub trait CardSink {
    /// Persist or forward one encoded card.
    fn write(&mut self, card: &EncodedCard) -> CardResult<()>;
}

/// Writes cards to `card.path`, creating parent directories.
///
/// Bytes go to a temp file next to the target which is then renamed over it, so a failed write
/// never leaves a truncated image behind.
#[derive(Debug, Default)]
pub struct FileSink;

impl FileSink {
    /// Create a file sink.
    pub fn new() -> Self {
        Self
    }
}

impl CardSink for FileSink {
    fn write(&mut self, card: &EncodedCard) -> CardResult<()> {
        write_atomic(&card.path, &card.bytes)?;
        info!("{} image was created", card.path.display());
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    pub(crate) cards: Vec<EncodedCard>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the captured cards.
    pub fn cards(&self) -> &[EncodedCard] {
        &self.cards
    }
}

impl CardSink for InMemorySink {
    fn write(&mut self, card: &EncodedCard) -> CardResult<()> {
        self.cards.push(card.clone());
        Ok(())
    }
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> CardResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))
            .map_err(|e| CardError::encoding(format!("{e:#}")))?;
    }
    Ok(())
}

/// Write `bytes` to `path` through a sibling temp file and an atomic rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> CardResult<()> {
    ensure_parent_dir(path)?;
    let dir: PathBuf = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| {
        CardError::encoding(format!("failed to create temp file in '{}': {e}", dir.display()))
    })?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| CardError::encoding(format!("failed to write '{}': {e}", path.display())))?;
    tmp.persist(path).map_err(|e| {
        CardError::encoding(format!("failed to move image into '{}': {}", path.display(), e.error))
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
