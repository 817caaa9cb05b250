use crate::error::PanelError;

/// Gamma curves selectable with GAMSET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Gamma {
    Curve1_0 = 0x01,
    Curve2_5 = 0x02,
    Curve2_2 = 0x04,
    Curve1_8 = 0x08,
}

impl Gamma {
    pub fn from_curve(curve: f32) -> Result<Self, PanelError> {
        if curve == 1.0 {
            Ok(Gamma::Curve1_0)
        } else if curve == 1.8 {
            Ok(Gamma::Curve1_8)
        } else if curve == 2.2 {
            Ok(Gamma::Curve2_2)
        } else if curve == 2.5 {
            Ok(Gamma::Curve2_5)
        } else {
            Err(PanelError::invalid(
                "GAMSET",
                format!("unsupported gamma {}", curve),
            ))
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Interface pixel formats selectable with COLMOD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ColorMode {
    Bits12 = 3,
    Bits16 = 5,
    Bits18 = 6,
}

impl ColorMode {
    pub fn from_bits(bits_per_pixel: u32) -> Result<Self, PanelError> {
        match bits_per_pixel {
            12 => Ok(ColorMode::Bits12),
            16 => Ok(ColorMode::Bits16),
            18 => Ok(ColorMode::Bits18),
            other => Err(PanelError::invalid(
                "COLMOD",
                format!("unsupported bit depth {}", other),
            )),
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Memory access control flags (MADCTL)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressMode {
    pub row_inverse: bool,
    pub column_inverse: bool,
    pub row_column_swap: bool,
    pub row_refresh_inverse: bool,
    pub column_refresh_inverse: bool,
    pub rgb_inverse: bool,
}

impl AddressMode {
    /// Parameter byte. The rgb flag sits at bit 3 and column refresh at
    /// bit 2, the reverse of their argument order.
    pub fn bits(&self) -> u8 {
        let mut parameter = 0u8;
        if self.row_inverse {
            parameter |= 1 << 7;
        }
        if self.column_inverse {
            parameter |= 1 << 6;
        }
        if self.row_column_swap {
            parameter |= 1 << 5;
        }
        if self.row_refresh_inverse {
            parameter |= 1 << 4;
        }
        if self.rgb_inverse {
            parameter |= 1 << 3;
        }
        if self.column_refresh_inverse {
            parameter |= 1 << 2;
        }
        parameter
    }
}

pub const PALETTE_RED_LEN: usize = 32;
pub const PALETTE_GREEN_LEN: usize = 64;
pub const PALETTE_BLUE_LEN: usize = 32;

/// Lookup table used by the reduced color modes (RGBSET)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub red: [u8; PALETTE_RED_LEN],
    pub green: [u8; PALETTE_GREEN_LEN],
    pub blue: [u8; PALETTE_BLUE_LEN],
}

impl Palette {
    /// Red and blue entries are 6 bits wide, green entries 7 bits
    pub fn validate(&self) -> Result<(), PanelError> {
        if let Some(i) = self.red.iter().position(|v| v & 0xC0 != 0) {
            return Err(PanelError::invalid(
                "RGBSET",
                format!("red entry {} out of range: {:#04x}", i, self.red[i]),
            ));
        }
        if let Some(i) = self.green.iter().position(|v| v & 0x80 != 0) {
            return Err(PanelError::invalid(
                "RGBSET",
                format!("green entry {} out of range: {:#04x}", i, self.green[i]),
            ));
        }
        if let Some(i) = self.blue.iter().position(|v| v & 0xC0 != 0) {
            return Err(PanelError::invalid(
                "RGBSET",
                format!("blue entry {} out of range: {:#04x}", i, self.blue[i]),
            ));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(PALETTE_RED_LEN + PALETTE_GREEN_LEN + PALETTE_BLUE_LEN);
        bytes.extend_from_slice(&self.red);
        bytes.extend_from_slice(&self.green);
        bytes.extend_from_slice(&self.blue);
        bytes
    }
}

impl Default for Palette {
    /// Linear ramps covering each channel's full range
    fn default() -> Self {
        let mut red = [0u8; PALETTE_RED_LEN];
        let mut green = [0u8; PALETTE_GREEN_LEN];
        let mut blue = [0u8; PALETTE_BLUE_LEN];
        for (i, v) in red.iter_mut().enumerate() {
            *v = (i * 2) as u8;
        }
        for (i, v) in green.iter_mut().enumerate() {
            *v = i as u8;
        }
        for (i, v) in blue.iter_mut().enumerate() {
            *v = (i * 2) as u8;
        }
        Palette { red, green, blue }
    }
}
