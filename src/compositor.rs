//! Bilinear resampling of decoded frames onto the panel raster.
//!
//! The panel is addressed transposed relative to the crop window: the output
//! row index walks the source horizontally and the output column index walks
//! it vertically.

use tracing::info;

use crate::error::FrameError;
use crate::geometry::Geometry;
use crate::pixel_format::{quantize, source_offset, CHANNELS, SOURCE_STRIDE};

/// Decoded source frame, 4 bytes per pixel in B, G, R, A order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFrame {
    width: usize,
    height: usize,
    pitch: usize,
    data: Vec<u8>,
}

impl SourceFrame {
    /// `pitch` is the distance in bytes between rows and may exceed
    /// `width * 4`.
    pub fn new(width: usize, height: usize, pitch: usize, data: Vec<u8>) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::MalformedSource(format!(
                "empty {}x{} frame",
                width, height
            )));
        }
        if pitch < width * SOURCE_STRIDE {
            return Err(FrameError::MalformedSource(format!(
                "pitch {} too small for width {}",
                pitch, width
            )));
        }
        let needed = pitch * (height - 1) + width * SOURCE_STRIDE;
        if data.len() < needed {
            return Err(FrameError::MalformedSource(format!(
                "{} bytes cannot hold {}x{} with pitch {}",
                data.len(),
                width,
                height,
                pitch
            )));
        }
        Ok(SourceFrame {
            width,
            height,
            pitch,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn sample(&self, row: usize, column: usize, channel: usize) -> f32 {
        self.data[self.pitch * row + SOURCE_STRIDE * column + source_offset(channel)] as f32
    }
}

/// Continuous source coordinate for output index `index` of `count`,
/// spreading `count` samples over `span` source pixels from `origin`
#[inline]
fn source_coordinate(origin: usize, index: usize, span: usize, count: usize) -> f32 {
    if count < 2 {
        return origin as f32;
    }
    origin as f32 + index as f32 * span.saturating_sub(1) as f32 / (count - 1) as f32
}

/// Floor index, its successor and the fractional weight, clamped to `len`
#[inline]
fn neighbours(coordinate: f32, len: usize) -> (usize, usize, f32) {
    let floor = coordinate.floor();
    let last = len - 1;
    let i0 = (floor as usize).min(last);
    let i1 = (i0 + 1).min(last);
    (i0, i1, coordinate - floor)
}

/// Resample one frame into `out`, which must hold exactly one packed frame
pub fn resample_frame(frame: &SourceFrame, geometry: &Geometry, out: &mut [u8]) {
    let panel = geometry.panel;
    let crop = geometry.crop;
    debug_assert_eq!(out.len(), panel.frame_size());

    for row in 0..panel.height {
        let x = source_coordinate(crop.left, row, crop.width, panel.height);
        let (x0, x1, dx) = neighbours(x, frame.width);
        for column in 0..panel.width {
            let y = source_coordinate(crop.top, column, crop.height, panel.width);
            let (y0, y1, dy) = neighbours(y, frame.height);
            let base = (row * panel.width + column) * CHANNELS;
            for channel in 0..CHANNELS {
                let value = frame.sample(y0, x0, channel) * (1.0 - dx) * (1.0 - dy)
                    + frame.sample(y0, x1, channel) * dx * (1.0 - dy)
                    + frame.sample(y1, x0, channel) * (1.0 - dx) * dy
                    + frame.sample(y1, x1, channel) * dx * dy;
                out[base + channel] = quantize(value);
            }
        }
    }
}

/// Resample every frame into one packed buffer, frame after frame
pub fn resample(frames: &[SourceFrame], geometry: &Geometry) -> Vec<u8> {
    let frame_size = geometry.panel.frame_size();
    let mut packed = vec![0u8; frames.len() * frame_size];
    for (i, (frame, out)) in frames.iter().zip(packed.chunks_exact_mut(frame_size)).enumerate() {
        info!("Processing frame {}/{}", i + 1, frames.len());
        resample_frame(frame, geometry, out);
    }
    packed
}
