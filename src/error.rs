use linux_embedded_hal::sysfs_gpio::Error as GpioError;
use linux_embedded_hal::SPIError;
use std::io;
use thiserror::Error;

/// Errors raised while talking to the panel
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("invalid parameter for {command}: {reason}")]
    InvalidParameter {
        command: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Spi(#[from] SPIError),
    #[error(transparent)]
    Gpio(#[from] GpioError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PanelError {
    pub fn invalid(command: &'static str, reason: impl Into<String>) -> Self {
        PanelError::InvalidParameter {
            command,
            reason: reason.into(),
        }
    }
}

/// Errors raised while producing or loading packed frame buffers
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("corrupted frame buffer: {len} bytes is not a multiple of the {frame_size}-byte frame size")]
    Corrupt { len: usize, frame_size: usize },
    #[error("frame buffer contains no frames")]
    Empty,
    #[error("malformed source frame: {0}")]
    MalformedSource(String),
    #[error(transparent)]
    Decode(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
