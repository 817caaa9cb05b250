use embedded_hal::spi::SpiDevice;
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::{Direction, Pin};
use linux_embedded_hal::SpidevDevice;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::HardwareConfig;
use crate::error::PanelError;
use crate::protocol::SendMode;

/// SPI clock used for the panel
pub const SPI_CLOCK_HZ: u32 = 15_000_000;

/// Largest single spidev transfer with the default kernel buffer size
const MAX_TRANSFER: usize = 4096;

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[repr(u8)]
pub enum Level {
    Low = 0x00,
    High = 0x01,
}

impl From<Level> for u8 {
    fn from(value: Level) -> Self {
        value as u8
    }
}

impl From<SendMode> for Level {
    /// Command bytes go out with the line low, data bytes with it high
    fn from(mode: SendMode) -> Self {
        match mode {
            SendMode::Command => Level::Low,
            SendMode::Data => Level::High,
        }
    }
}

/// Write-only link to the panel controller
pub trait Transport {
    /// Drive the data/command line
    fn set_mode(&mut self, mode: SendMode) -> Result<(), PanelError>;
    /// Drive the hardware reset line
    fn set_reset(&mut self, level: Level) -> Result<(), PanelError>;
    /// Send bytes on the chip-select channel
    fn write(&mut self, bytes: &[u8]) -> Result<(), PanelError>;
    /// Block the calling thread
    fn delay(&mut self, duration: Duration);
}

/// Panel attached to a Linux spidev device with sysfs GPIO control lines
pub struct SpidevTransport {
    spi: SpidevDevice,
    mode_pin: OutputPin,
    reset_pin: OutputPin,
}

impl SpidevTransport {
    pub fn open(config: &HardwareConfig) -> Result<Self, PanelError> {
        debug!(
            "Opening {} (mode GPIO {}, reset GPIO {})",
            config.spi_device, config.mode_pin, config.reset_pin
        );
        let mode_pin = OutputPin::export(config.mode_pin)?;
        let reset_pin = OutputPin::export(config.reset_pin)?;

        let mut spi = SpidevDevice::open(&config.spi_device)?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(SPI_CLOCK_HZ)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options)?;

        Ok(SpidevTransport {
            spi,
            mode_pin,
            reset_pin,
        })
    }
}

/// Exported sysfs GPIO line, driven low and unexported when dropped
struct OutputPin(Pin);

impl OutputPin {
    /// Export `number` as an output driven low
    fn export(number: u64) -> Result<Self, PanelError> {
        let pin = Pin::new(number);
        pin.export()?;
        // from here on a failure still releases the line
        let pin = OutputPin(pin);
        pin.0.set_direction(Direction::Low)?;
        Ok(pin)
    }

    fn set(&self, level: Level) -> Result<(), PanelError> {
        self.0.set_value(level.into())?;
        Ok(())
    }
}

impl Drop for OutputPin {
    fn drop(&mut self) {
        let number = self.0.get_pin_num();
        if let Err(e) = self.0.set_value(Level::Low.into()) {
            warn!("Failed to drive GPIO {} low: {}", number, e);
        }
        if let Err(e) = self.0.unexport() {
            warn!("Failed to release GPIO {}: {}", number, e);
        }
    }
}

impl Transport for SpidevTransport {
    fn set_mode(&mut self, mode: SendMode) -> Result<(), PanelError> {
        self.mode_pin.set(Level::from(mode))
    }

    fn set_reset(&mut self, level: Level) -> Result<(), PanelError> {
        self.reset_pin.set(level)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), PanelError> {
        for chunk in bytes.chunks(MAX_TRANSFER) {
            self.spi.write(chunk)?;
        }
        Ok(())
    }

    fn delay(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}
