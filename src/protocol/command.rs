use std::borrow::Cow;

use crate::error::PanelError;
use crate::geometry::PanelSize;
use crate::protocol::params::{AddressMode, ColorMode, Gamma, Palette};

/// Level of the data/command control line while a byte group is sent
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SendMode {
    Command,
    Data,
}

/// One byte group sent with the control line in a given mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<'a> {
    pub mode: SendMode,
    pub bytes: Cow<'a, [u8]>,
}

impl<'a> Step<'a> {
    fn command(opcode: u8) -> Self {
        Step {
            mode: SendMode::Command,
            bytes: Cow::Owned(vec![opcode]),
        }
    }

    fn data(bytes: impl Into<Cow<'a, [u8]>>) -> Self {
        Step {
            mode: SendMode::Data,
            bytes: bytes.into(),
        }
    }
}

/// Controller commands understood by the panel
#[derive(Debug, Clone, PartialEq)]
pub enum Command<'a> {
    SoftReset,
    SleepIn,
    SleepOut,
    InvertOff,
    InvertOn,
    SetGamma(f32),
    DisplayOff,
    DisplayOn,
    ColumnRange { begin: u16, end: u16 },
    RowRange { begin: u16, end: u16 },
    WriteMemory(&'a [u8]),
    SetPalette(&'a Palette),
    TearingEffectOff,
    TearingEffectOn,
    SetAddressMode(AddressMode),
    SetColorMode(u32),
}

impl<'a> Command<'a> {
    pub fn opcode(&self) -> u8 {
        match self {
            Command::SoftReset => 0x01,
            Command::SleepIn => 0x10,
            Command::SleepOut => 0x11,
            Command::InvertOff => 0x20,
            Command::InvertOn => 0x21,
            Command::SetGamma(_) => 0x26,
            Command::DisplayOff => 0x28,
            Command::DisplayOn => 0x29,
            Command::ColumnRange { .. } => 0x2A,
            Command::RowRange { .. } => 0x2B,
            Command::WriteMemory(_) => 0x2C,
            Command::SetPalette(_) => 0x2D,
            Command::TearingEffectOff => 0x34,
            Command::TearingEffectOn => 0x35,
            Command::SetAddressMode(_) => 0x36,
            Command::SetColorMode(_) => 0x3A,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::SoftReset => "SWRESET",
            Command::SleepIn => "SLPIN",
            Command::SleepOut => "SLPOUT",
            Command::InvertOff => "INVOFF",
            Command::InvertOn => "INVON",
            Command::SetGamma(_) => "GAMSET",
            Command::DisplayOff => "DISPOFF",
            Command::DisplayOn => "DISPON",
            Command::ColumnRange { .. } => "CASET",
            Command::RowRange { .. } => "RASET",
            Command::WriteMemory(_) => "RAMWR",
            Command::SetPalette(_) => "RGBSET",
            Command::TearingEffectOff => "TEOFF",
            Command::TearingEffectOn => "TEON",
            Command::SetAddressMode(_) => "MADCTL",
            Command::SetColorMode(_) => "COLMOD",
        }
    }

    /// Validate parameters and build the byte groups to send.
    ///
    /// Nothing is returned on error, so an invalid command never reaches
    /// the wire.
    pub fn encode(&self) -> Result<Vec<Step<'a>>, PanelError> {
        let parameters: Option<Cow<'a, [u8]>> = match self {
            Command::SoftReset
            | Command::SleepIn
            | Command::SleepOut
            | Command::InvertOff
            | Command::InvertOn
            | Command::DisplayOff
            | Command::DisplayOn
            | Command::TearingEffectOff
            | Command::TearingEffectOn => None,
            Command::SetGamma(curve) => Some(vec![Gamma::from_curve(*curve)?.code()].into()),
            Command::ColumnRange { begin, end } => Some(
                encode_range(self.name(), *begin, *end, PanelSize::PANEL.last_column())?
                    .to_vec()
                    .into(),
            ),
            Command::RowRange { begin, end } => Some(
                encode_range(self.name(), *begin, *end, PanelSize::PANEL.last_row())?
                    .to_vec()
                    .into(),
            ),
            Command::WriteMemory(payload) => Some(Cow::Borrowed(*payload)),
            Command::SetPalette(palette) => {
                palette.validate()?;
                Some(palette.to_bytes().into())
            }
            Command::SetAddressMode(mode) => Some(vec![mode.bits()].into()),
            Command::SetColorMode(bits) => Some(vec![ColorMode::from_bits(*bits)?.code()].into()),
        };

        let mut steps = vec![Step::command(self.opcode())];
        if let Some(parameters) = parameters {
            steps.push(Step::data(parameters));
        }
        Ok(steps)
    }
}

/// Big-endian begin/end pair as sent by CASET and RASET
fn encode_range(
    command: &'static str,
    begin: u16,
    end: u16,
    last: u16,
) -> Result<[u8; 4], PanelError> {
    if begin > last || end > last {
        return Err(PanelError::invalid(
            command,
            format!("range {}..={} exceeds 0..={}", begin, end, last),
        ));
    }
    if begin > end {
        return Err(PanelError::invalid(
            command,
            format!("begin {} is after end {}", begin, end),
        ));
    }
    let [begin_hi, begin_lo] = begin.to_be_bytes();
    let [end_hi, end_lo] = end.to_be_bytes();
    Ok([begin_hi, begin_lo, end_hi, end_lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(steps: &[Step]) -> Vec<(SendMode, Vec<u8>)> {
        steps
            .iter()
            .map(|s| (s.mode, s.bytes.to_vec()))
            .collect()
    }

    #[test]
    fn test_parameterless_commands() {
        let expected = [
            (Command::SoftReset, 0x01),
            (Command::SleepIn, 0x10),
            (Command::SleepOut, 0x11),
            (Command::InvertOff, 0x20),
            (Command::InvertOn, 0x21),
            (Command::DisplayOff, 0x28),
            (Command::DisplayOn, 0x29),
            (Command::TearingEffectOff, 0x34),
            (Command::TearingEffectOn, 0x35),
        ];
        for (command, opcode) in expected {
            let steps = command.encode().unwrap();
            assert_eq!(bytes(&steps), vec![(SendMode::Command, vec![opcode])]);
        }
    }

    #[test]
    fn test_gamma_encoding() {
        for (curve, code) in [(1.0, 0x01), (1.8, 0x08), (2.2, 0x04), (2.5, 0x02)] {
            let steps = Command::SetGamma(curve).encode().unwrap();
            assert_eq!(
                bytes(&steps),
                vec![(SendMode::Command, vec![0x26]), (SendMode::Data, vec![code])]
            );
        }
        assert!(Command::SetGamma(2.0).encode().is_err());
    }

    #[test]
    fn test_range_encoding_is_big_endian() {
        let steps = Command::ColumnRange { begin: 0, end: 127 }.encode().unwrap();
        assert_eq!(
            bytes(&steps),
            vec![
                (SendMode::Command, vec![0x2A]),
                (SendMode::Data, vec![0x00, 0x00, 0x00, 0x7F])
            ]
        );
        let steps = Command::RowRange { begin: 3, end: 159 }.encode().unwrap();
        assert_eq!(
            bytes(&steps),
            vec![
                (SendMode::Command, vec![0x2B]),
                (SendMode::Data, vec![0x00, 0x03, 0x00, 0x9F])
            ]
        );
    }

    #[test]
    fn test_range_round_trip() {
        for begin in 0..=159u16 {
            for end in begin..=159u16 {
                let steps = Command::RowRange { begin, end }.encode().unwrap();
                let p = &steps[1].bytes;
                assert_eq!(u16::from_be_bytes([p[0], p[1]]), begin);
                assert_eq!(u16::from_be_bytes([p[2], p[3]]), end);
            }
        }
    }

    #[test]
    fn test_range_rejections() {
        let rejected = [
            Command::ColumnRange { begin: 5, end: 4 },
            Command::ColumnRange { begin: 0, end: 128 },
            Command::ColumnRange { begin: 128, end: 128 },
            Command::RowRange { begin: 100, end: 99 },
            Command::RowRange { begin: 0, end: 160 },
            Command::RowRange { begin: 0x100, end: 0x200 },
        ];
        for command in rejected {
            assert!(matches!(
                command.encode(),
                Err(PanelError::InvalidParameter { .. })
            ));
        }
        // rows go further than columns
        assert!(Command::RowRange { begin: 0, end: 159 }.encode().is_ok());
        assert!(Command::ColumnRange { begin: 0, end: 159 }.encode().is_err());
    }

    #[test]
    fn test_write_memory_borrows_payload() {
        let payload = vec![0xFCu8; 48];
        let steps = Command::WriteMemory(&payload).encode().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].bytes.as_ref(), &[0x2C]);
        assert!(matches!(steps[1].bytes, Cow::Borrowed(_)));
        assert_eq!(steps[1].bytes.len(), 48);
    }

    #[test]
    fn test_address_and_color_mode_encoding() {
        let mode = AddressMode {
            row_inverse: true,
            rgb_inverse: true,
            ..AddressMode::default()
        };
        let steps = Command::SetAddressMode(mode).encode().unwrap();
        assert_eq!(steps[0].bytes.as_ref(), &[0x36]);
        assert_eq!(steps[1].bytes.as_ref(), &[0x88]);

        let steps = Command::SetColorMode(18).encode().unwrap();
        assert_eq!(
            bytes(&steps),
            vec![(SendMode::Command, vec![0x3A]), (SendMode::Data, vec![6])]
        );
        assert!(Command::SetColorMode(24).encode().is_err());
    }

    #[test]
    fn test_palette_encoding() {
        let palette = Palette::default();
        let steps = Command::SetPalette(&palette).encode().unwrap();
        assert_eq!(steps[0].bytes.as_ref(), &[0x2D]);
        assert_eq!(steps[1].mode, SendMode::Data);
        assert_eq!(steps[1].bytes.len(), 128);
        assert_eq!(steps[1].bytes[32], 0); // first green entry
        assert_eq!(steps[1].bytes[95], 63); // last green entry

        let mut bad = palette.clone();
        bad.blue[7] = 0xFF;
        assert!(Command::SetPalette(&bad).encode().is_err());
    }
}
