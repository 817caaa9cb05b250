//! Packed frame buffer: headerless run of frames, each `height * width * 3`
//! bytes, as streamed to the panel.

use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::FrameError;
use crate::geometry::PanelSize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedFrames {
    data: Vec<u8>,
    frame_size: usize,
}

impl PackedFrames {
    /// Take ownership of a packed buffer, checking it holds whole frames
    pub fn from_bytes(data: Vec<u8>, panel: PanelSize) -> Result<Self, FrameError> {
        let frame_size = panel.frame_size();
        if data.len() % frame_size != 0 {
            return Err(FrameError::Corrupt {
                len: data.len(),
                frame_size,
            });
        }
        if data.is_empty() {
            return Err(FrameError::Empty);
        }
        Ok(PackedFrames { data, frame_size })
    }

    pub fn load(path: &Path, panel: PanelSize) -> Result<Self, FrameError> {
        let data = fs::read(path)?;
        let frames = Self::from_bytes(data, panel)?;
        info!("Loaded {} ({} frames)", path.display(), frames.frame_count());
        Ok(frames)
    }

    /// Write the whole buffer; a failed write leaves no file behind
    pub fn store(&self, path: &Path) -> Result<(), FrameError> {
        if let Err(e) = fs::write(path, &self.data) {
            if path.exists() {
                if let Err(remove) = fs::remove_file(path) {
                    warn!("Failed to remove partial {}: {}", path.display(), remove);
                }
            }
            return Err(e.into());
        }
        info!("Wrote {} ({} frames, {} bytes)", path.display(), self.frame_count(), self.data.len());
        Ok(())
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.data.len() / self.frame_size
    }

    pub fn frames(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.frame_size)
    }
}
