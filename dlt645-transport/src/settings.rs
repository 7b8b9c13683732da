//! Serial line settings
//!
//! Settings are written in the compact form `"<baud>,<data bits>,<parity>,<stop bits>"`,
//! e.g. `"2400,8,E,1"`, with parity one of `N`, `O`, `E` or `S`.

use crate::error::{Dlt645Error, Dlt645Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use tokio_serial::{DataBits, Parity, StopBits};

static SETTINGS_PATTERN: once_cell::sync::Lazy<Regex> = once_cell::sync::Lazy::new(|| {
    Regex::new(r"^\s*(\d+)\s*,\s*([5-8])\s*,\s*([NnOoEeSs])\s*,\s*([12])\s*$")
        .expect("static pattern is valid")
});

/// Parity as written in the settings string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParitySetting {
    None,
    Odd,
    Even,
    Space,
}

impl ParitySetting {
    fn from_letter(letter: &str) -> Option<Self> {
        match letter.to_ascii_uppercase().as_str() {
            "N" => Some(ParitySetting::None),
            "O" => Some(ParitySetting::Odd),
            "E" => Some(ParitySetting::Even),
            "S" => Some(ParitySetting::Space),
            _ => None,
        }
    }

    fn letter(&self) -> char {
        match self {
            ParitySetting::None => 'N',
            ParitySetting::Odd => 'O',
            ParitySetting::Even => 'E',
            ParitySetting::Space => 'S',
        }
    }

    /// Driver parity, space parity has no driver equivalent
    pub fn to_serial(&self) -> Dlt645Result<Parity> {
        match self {
            ParitySetting::None => Ok(Parity::None),
            ParitySetting::Odd => Ok(Parity::Odd),
            ParitySetting::Even => Ok(Parity::Even),
            ParitySetting::Space => Err(Dlt645Error::Unsupported(
                "Space parity is not supported by the serial driver".to_string(),
            )),
        }
    }
}

/// Serial port line settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: ParitySetting,
    pub stop_bits: StopBits,
}

impl SerialSettings {
    /// Parse the compact settings string
    pub fn parse(settings: &str) -> Dlt645Result<Self> {
        let caps = SETTINGS_PATTERN.captures(settings).ok_or_else(|| {
            Dlt645Error::Configuration(format!(
                "Serial settings {:?} do not match <baud>,<data bits>,<N|O|E|S>,<stop bits>",
                settings
            ))
        })?;

        let baud_rate: u32 = caps[1]
            .parse()
            .map_err(|_| Dlt645Error::Configuration(format!("Invalid baud rate: {}", &caps[1])))?;
        if baud_rate == 0 {
            return Err(Dlt645Error::Configuration(
                "Baud rate must be greater than zero".to_string(),
            ));
        }

        let data_bits = match &caps[2] {
            "5" => DataBits::Five,
            "6" => DataBits::Six,
            "7" => DataBits::Seven,
            _ => DataBits::Eight,
        };
        let parity = ParitySetting::from_letter(&caps[3])
            .ok_or_else(|| Dlt645Error::Configuration(format!("Invalid parity: {}", &caps[3])))?;
        let stop_bits = match &caps[4] {
            "2" => StopBits::Two,
            _ => StopBits::One,
        };

        Ok(Self {
            baud_rate,
            data_bits,
            parity,
            stop_bits,
        })
    }
}

impl Default for SerialSettings {
    /// 2400 baud, 8 data bits, even parity, 1 stop bit
    fn default() -> Self {
        Self {
            baud_rate: 2400,
            data_bits: DataBits::Eight,
            parity: ParitySetting::Even,
            stop_bits: StopBits::One,
        }
    }
}

impl FromStr for SerialSettings {
    type Err = Dlt645Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SerialSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data_bits = match self.data_bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        let stop_bits = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        write!(
            f,
            "{},{},{},{}",
            self.baud_rate,
            data_bits,
            self.parity.letter(),
            stop_bits
        )
    }
}
