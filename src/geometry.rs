//! Panel raster and source crop window.
//!
//! Production values are fixed at compile time; they are carried around as
//! values so the resampler can be exercised against other sizes.

/// Bytes per packed output pixel (R, G, B)
pub const BYTES_PER_PIXEL: usize = 3;

/// Addressable panel raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSize {
    pub width: usize,
    pub height: usize,
}

impl PanelSize {
    pub const PANEL: PanelSize = PanelSize {
        width: 128,
        height: 160,
    };

    /// Size in bytes of one packed frame
    pub const fn frame_size(&self) -> usize {
        self.width * self.height * BYTES_PER_PIXEL
    }

    pub const fn last_column(&self) -> u16 {
        (self.width - 1) as u16
    }

    pub const fn last_row(&self) -> u16 {
        (self.height - 1) as u16
    }
}

/// Sub-rectangle of the source frame mapped onto the whole panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub top: usize,
    pub left: usize,
    pub height: usize,
    pub width: usize,
}

impl CropWindow {
    pub const DEFAULT: CropWindow = CropWindow {
        top: 0,
        left: 33,
        height: 300,
        width: 375,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub panel: PanelSize,
    pub crop: CropWindow,
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry {
            panel: PanelSize::PANEL,
            crop: CropWindow::DEFAULT,
        }
    }
}
