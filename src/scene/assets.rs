//! Out-of-band asset loading.
//!
//! Fetches run on the rayon pool and report back over a channel. Each request
//! is tagged with the mount generation it belongs to so the scene can drop
//! results that arrive after teardown.

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::AssetError;
use crate::scene::overlay::{parse_boundaries, BoundaryOverlay};

/// Where asset bytes come from
pub trait AssetSource: Send + Sync {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError>;
}

/// Assets read from a directory on disk
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FsAssetSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let full = self.root.join(path);
        let bytes = fs::read(&full).map_err(|source| AssetError::Io { path: full, source })?;
        if bytes.is_empty() {
            return Err(AssetError::Empty(path.to_string()));
        }
        Ok(bytes)
    }
}

/// What a finished request produced
#[derive(Debug)]
pub enum AssetPayload {
    GroundTexture(Result<Vec<u8>, AssetError>),
    BodyTexture(Result<Vec<u8>, AssetError>),
    Boundaries(Result<Vec<BoundaryOverlay>, AssetError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    GroundTexture,
    BodyTexture,
    Boundaries,
}

#[derive(Debug)]
pub struct Completion {
    pub generation: u64,
    pub payload: AssetPayload,
}

pub struct AssetLoader {
    source: Arc<dyn AssetSource>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    in_flight: usize,
}

impl AssetLoader {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Start fetching `path` in the background
    pub fn request(&mut self, generation: u64, kind: AssetKind, path: &str) {
        debug!(generation, ?kind, path, "requesting asset");
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let path = path.to_string();
        self.in_flight += 1;
        rayon::spawn(move || {
            let fetched = source.fetch(&path);
            let payload = match kind {
                AssetKind::GroundTexture => AssetPayload::GroundTexture(fetched),
                AssetKind::BodyTexture => AssetPayload::BodyTexture(fetched),
                AssetKind::Boundaries => AssetPayload::Boundaries(fetched.and_then(|mut bytes| parse_boundaries(&mut bytes))),
            };
            // receiver gone means the scene was dropped; nothing left to notify
            let _ = tx.send(Completion { generation, payload });
        });
    }

    /// Next finished request, without blocking
    pub fn try_next(&mut self) -> Option<Completion> {
        let completion = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }

    /// Next finished request, waiting up to `timeout`
    pub fn wait_next(&mut self, timeout: Duration) -> Option<Completion> {
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(completion)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("textures")).unwrap();
        fs::write(dir.path().join("textures/moon.jpg"), b"pixels").unwrap();
        let source = FsAssetSource::new(dir.path());
        assert_eq!(source.fetch("textures/moon.jpg").unwrap(), b"pixels");
        assert!(matches!(source.fetch("missing.jpg"), Err(AssetError::Io { .. })));
    }

    #[test]
    fn test_fs_source_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty.json"), b"").unwrap();
        let source = FsAssetSource::new(dir.path());
        assert!(matches!(source.fetch("empty.json"), Err(AssetError::Empty(_))));
    }

    #[test]
    fn test_loader_delivers_tagged_completion() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("moon.jpg"), b"pixels").unwrap();
        let mut loader = AssetLoader::new(Arc::new(FsAssetSource::new(dir.path())));
        loader.request(7, AssetKind::BodyTexture, "moon.jpg");
        assert_eq!(loader.in_flight(), 1);
        let completion = loader.wait_next(Duration::from_secs(5)).unwrap();
        assert_eq!(completion.generation, 7);
        assert!(matches!(completion.payload, AssetPayload::BodyTexture(Ok(ref b)) if b == b"pixels"));
        assert_eq!(loader.in_flight(), 0);
        assert!(loader.try_next().is_none());
    }

    #[test]
    fn test_loader_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = AssetLoader::new(Arc::new(FsAssetSource::new(dir.path())));
        loader.request(1, AssetKind::Boundaries, "geo/countries.geojson");
        let completion = loader.wait_next(Duration::from_secs(5)).unwrap();
        assert!(matches!(completion.payload, AssetPayload::Boundaries(Err(_))));
    }
}
