//! Image sequence source for frame directories

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::source::FrameSource;
use crate::{CaptureError, Result};

/// File extensions treated as frames when scanning a directory
pub const DEFAULT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// One encoded image read from disk
#[derive(Debug, Clone)]
pub struct ImageFrame {
    /// Zero-based index within the sequence
    pub index: u64,

    /// File the frame was read from
    pub path: PathBuf,

    /// Encoded file contents (zero-copy via Arc)
    pub data: Arc<[u8]>,
}

/// Source that reads a sequence of image files in order
#[derive(Debug)]
pub struct ImageSequenceSource {
    /// Frame files, in playback order
    paths: Vec<PathBuf>,

    /// Index of the next file to read
    next: usize,
}

impl ImageSequenceSource {
    /// Scan `dir` for image files with one of the [`DEFAULT_EXTENSIONS`]
    pub async fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::open_with_extensions(dir, DEFAULT_EXTENSIONS).await
    }

    /// Scan `dir` for files with one of `extensions` (case-insensitive), sorted by file name
    pub async fn open_with_extensions<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Self> {
        let dir = dir.as_ref();
        let file_error = |e| CaptureError::file_error(dir.to_path_buf(), e);

        let mut entries = tokio::fs::read_dir(dir).await.map_err(file_error)?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(file_error)? {
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)));
            if matches && entry.file_type().await.map_err(file_error)?.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        info!("Opened image sequence {}: {} frames", dir.display(), paths.len());
        Ok(Self::from_paths(paths))
    }

    /// Use an explicit list of frame files, read in the given order
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths, next: 0 }
    }

    /// Frame files in playback order
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

#[async_trait::async_trait]
impl FrameSource for ImageSequenceSource {
    type Frame = ImageFrame;

    async fn read_next(&mut self) -> Result<Option<ImageFrame>> {
        let Some(path) = self.paths.get(self.next) else {
            debug!("Reached end of image sequence");
            return Ok(None);
        };

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| CaptureError::file_error(path.clone(), e))?;
        trace!("Frame {}/{}: {} ({} bytes)", self.next, self.paths.len(), path.display(), data.len());

        let frame = ImageFrame { index: self.next as u64, path: path.clone(), data: data.into() };
        self.next += 1;
        Ok(Some(frame))
    }

    fn position(&self) -> u64 {
        self.next as u64
    }

    fn frame_count_hint(&self) -> Option<u64> {
        Some(self.paths.len() as u64)
    }
}
