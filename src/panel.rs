use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::error::PanelError;
use crate::protocol::{AddressMode, Command, Palette, SendMode};
use crate::transport::{Level, Transport};

const RESET_PULSE: Duration = Duration::from_millis(10);
const RESET_RECOVERY: Duration = Duration::from_millis(120);

/// Only this many payload bytes are dumped per command at trace level
const TRACE_DUMP_BYTES: usize = 16;

/// 128x160 TFT controller driven over a write-only transport
///
/// The transport is released when the panel is dropped.
pub struct Panel<T: Transport> {
    transport: T,
}

impl<T: Transport> Panel<T> {
    /// Reset the controller and bring it up in 18-bit color mode with the
    /// display on.
    pub fn new(transport: T) -> Result<Self, PanelError> {
        let mut panel = Panel { transport };
        panel.init()?;
        Ok(panel)
    }

    fn init(&mut self) -> Result<(), PanelError> {
        debug!("Driving control lines low");
        self.transport.set_mode(SendMode::Command)?;
        self.transport.set_reset(Level::Low)?;

        debug!("Hardware reset");
        self.transport.delay(RESET_PULSE);
        self.transport.set_reset(Level::High)?;
        self.transport.delay(RESET_RECOVERY);

        debug!("Software reset");
        self.reset()?;
        self.transport.delay(RESET_RECOVERY);

        self.sleep_out()?;
        self.set_address_mode(AddressMode::default())?;
        self.set_color_mode(18)?;
        self.set_gamma(1.0)?;
        self.invert_off()?;
        self.tearing_effect_off()?;
        self.display_on()?;
        info!("Panel initialized");
        Ok(())
    }

    /// Turn the display off and put the controller to sleep, ignoring errors
    pub fn shutdown(&mut self) {
        if let Err(e) = self.display_off() {
            warn!("Failed to turn display off: {}", e);
        }
        if let Err(e) = self.sleep_in() {
            warn!("Failed to put panel to sleep: {}", e);
        }
    }

    fn send(&mut self, command: Command) -> Result<(), PanelError> {
        let steps = command.encode()?;
        for step in &steps {
            if tracing::enabled!(tracing::Level::TRACE) {
                trace!("{}", describe(&command, step.mode, &step.bytes));
            }
            self.transport.set_mode(step.mode)?;
            self.transport.write(&step.bytes)?;
        }
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), PanelError> {
        self.send(Command::SoftReset)
    }

    pub fn sleep_in(&mut self) -> Result<(), PanelError> {
        self.send(Command::SleepIn)
    }

    pub fn sleep_out(&mut self) -> Result<(), PanelError> {
        self.send(Command::SleepOut)
    }

    pub fn invert_off(&mut self) -> Result<(), PanelError> {
        self.send(Command::InvertOff)
    }

    #[allow(dead_code)]
    pub fn invert_on(&mut self) -> Result<(), PanelError> {
        self.send(Command::InvertOn)
    }

    /// `curve` must be one of 1.0, 1.8, 2.2 or 2.5
    pub fn set_gamma(&mut self, curve: f32) -> Result<(), PanelError> {
        self.send(Command::SetGamma(curve))
    }

    pub fn display_off(&mut self) -> Result<(), PanelError> {
        self.send(Command::DisplayOff)
    }

    pub fn display_on(&mut self) -> Result<(), PanelError> {
        self.send(Command::DisplayOn)
    }

    pub fn set_column_range(&mut self, begin: u16, end: u16) -> Result<(), PanelError> {
        self.send(Command::ColumnRange { begin, end })
    }

    pub fn set_row_range(&mut self, begin: u16, end: u16) -> Result<(), PanelError> {
        self.send(Command::RowRange { begin, end })
    }

    /// Stream pixels into the window set by the last column and row ranges.
    /// The payload length is not checked against that window.
    pub fn write_memory(&mut self, pixels: &[u8]) -> Result<(), PanelError> {
        self.send(Command::WriteMemory(pixels))
    }

    #[allow(dead_code)]
    pub fn set_palette(&mut self, palette: &Palette) -> Result<(), PanelError> {
        self.send(Command::SetPalette(palette))
    }

    pub fn tearing_effect_off(&mut self) -> Result<(), PanelError> {
        self.send(Command::TearingEffectOff)
    }

    #[allow(dead_code)]
    pub fn tearing_effect_on(&mut self) -> Result<(), PanelError> {
        self.send(Command::TearingEffectOn)
    }

    pub fn set_address_mode(&mut self, mode: AddressMode) -> Result<(), PanelError> {
        self.send(Command::SetAddressMode(mode))
    }

    /// `bits_per_pixel` must be 12, 16 or 18
    pub fn set_color_mode(&mut self, bits_per_pixel: u32) -> Result<(), PanelError> {
        self.send(Command::SetColorMode(bits_per_pixel))
    }

    #[cfg(test)]
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

/// Trace line for one byte group; pixel payloads are summarised by length
fn describe(command: &Command, mode: SendMode, bytes: &[u8]) -> String {
    let header = format!("{} {:?} {} bytes", command.name(), mode, bytes.len());
    if matches!(command, Command::WriteMemory(_)) && mode == SendMode::Data {
        return header;
    }
    let hex = bytes
        .iter()
        .take(TRACE_DUMP_BYTES)
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}: {}", header, hex)
}
