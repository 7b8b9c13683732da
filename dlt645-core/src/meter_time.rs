//! Meter clock stamp used by the time calibration command

use crate::error::{Dlt645Error, Dlt645Result};
use chrono::{Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall clock time as the meter receives it
///
/// Each field is one raw binary byte; the year is reduced modulo 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterTime {
    second: u8,
    minute: u8,
    hour: u8,
    day: u8,
    month: u8,
    year: u8,
}

impl MeterTime {
    pub const LENGTH: usize = 6;

    /// Constructs a meter time stamp
    ///
    /// # Arguments
    ///
    /// * `year` - Full or two-digit year, stored modulo 100
    /// * `month` - The month from 1 to 12
    /// * `day` - The day of the month from 1 to 31
    /// * `hour` - The hour from 0 to 23
    /// * `minute` - The minute from 0 to 59
    /// * `second` - The second from 0 to 59
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Dlt645Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Dlt645Error::InvalidData(format!("Month out of range: {}", month)));
        }
        if !(1..=31).contains(&day) {
            return Err(Dlt645Error::InvalidData(format!("Day out of range: {}", day)));
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(Dlt645Error::InvalidData(format!(
                "Time out of range: {:02}:{:02}:{:02}",
                hour, minute, second
            )));
        }
        Ok(Self {
            second,
            minute,
            hour,
            day,
            month,
            year: (year % 100) as u8,
        })
    }

    /// Capture the local clock
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// Build from any chrono date-time value
    pub fn from_datetime<T: Datelike + Timelike>(moment: &T) -> Self {
        Self {
            // leap seconds report 60
            second: moment.second().min(59) as u8,
            minute: moment.minute() as u8,
            hour: moment.hour() as u8,
            day: moment.day() as u8,
            month: moment.month() as u8,
            year: moment.year().rem_euclid(100) as u8,
        }
    }

    /// Bytes in transmission order: second, minute, hour, day, month, year
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        [self.second, self.minute, self.hour, self.day, self.month, self.year]
    }

    /// Decode bytes in transmission order
    pub fn from_bytes(bytes: &[u8]) -> Dlt645Result<Self> {
        if bytes.len() != Self::LENGTH {
            return Err(Dlt645Error::InvalidData(format!(
                "Meter time needs {} bytes, got {}",
                Self::LENGTH,
                bytes.len()
            )));
        }
        Self::new(bytes[5] as u16, bytes[4], bytes[3], bytes[2], bytes[1], bytes[0])
    }

    pub fn year(&self) -> u8 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

impl fmt::Display for MeterTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_from_datetime() {
        let moment = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 30)
            .unwrap();
        let time = MeterTime::from_datetime(&moment);
        assert_eq!(time.to_bytes(), [30, 5, 14, 9, 3, 24]);
        assert_eq!(time.to_string(), "24-03-09 14:05:30");
    }

    #[test]
    fn test_bytes_round_trip() {
        let time = MeterTime::new(2031, 12, 31, 23, 59, 58).unwrap();
        assert_eq!(MeterTime::from_bytes(&time.to_bytes()).unwrap(), time);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(MeterTime::new(2024, 13, 1, 0, 0, 0).is_err());
        assert!(MeterTime::new(2024, 1, 0, 0, 0, 0).is_err());
        assert!(MeterTime::new(2024, 1, 1, 24, 0, 0).is_err());
        assert!(MeterTime::from_bytes(&[0; 5]).is_err());
    }
}
