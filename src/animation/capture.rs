//! Numbered frame capture.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::renderer::frame::RenderedFrame;

/// Writes frames as `00000.png`, `00001.png`, ... into one directory.
#[derive(Debug)]
pub struct FrameRecorder {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FrameRecorder {
    /// printf-style pattern of the file names, as passed to an encoder.
    pub const PATTERN: &'static str = "%05d.png";

    /// Creates the output directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index:05}.png"))
    }

    /// Full input pattern, e.g. `out/%05d.png`.
    #[must_use]
    pub fn input_pattern(&self) -> PathBuf {
        self.dir.join(Self::PATTERN)
    }

    /// Saves `frame` as the next numbered image.
    pub fn record(&mut self, frame: &RenderedFrame) -> Result<PathBuf> {
        let path = self.frame_path(self.written.len());
        frame.save_png(&path)?;
        self.written.push(path.clone());
        Ok(path)
    }

    #[must_use]
    pub fn frames(&self) -> &[PathBuf] {
        &self.written
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.written.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }

    /// Deletes every frame written so far.
    pub fn discard(&mut self) {
        for path in self.written.drain(..) {
            if let Err(err) = fs::remove_file(&path) {
                log::warn!("Failed to remove partial frame {}: {err}", path.display());
            }
        }
    }
}
