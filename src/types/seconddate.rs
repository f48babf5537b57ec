//! HANA's `SecondDate`: a UTC timestamp with 1-second precision (§4.2).
//!
//! Not present in the upstream driver's published sources; modeled directly on the sibling
//! `LongDate`/`DayDate` encodings, which share the same Julian-day date part and differ only
//! in the time-of-day factor and the NULL sentinel.

use super::longdate::{julian_day_number, ymd_from_julian_day};
use crate::error::{HdbError, HdbResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

const NULL_REPRESENTATION: i64 = 315_538_070_400 + 1;
const SECONDS_PER_DAY: i64 = 86_400;
const ZEITENWENDE: i64 = 1_721_424;

/// Wire representation of HANA's `SECONDDATE` type: seconds since `0001-01-01 00:00:00 UTC`,
/// offset by one, matching the convention used by `LongDate` and `DayDate`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecondDate(i64);

impl std::fmt::Display for SecondDate {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (year, month, day, hour, minute, second) = self.as_ymd_hms();
        write!(
            fmt,
            "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}",
        )
    }
}

impl SecondDate {
    pub(crate) fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub(crate) fn raw(&self) -> i64 {
        self.0
    }

    pub fn from_ymd_hms(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> HdbResult<Self> {
        let julian_day = julian_day_number(year, month, day)?;
        let datevalue = i64::from(julian_day) - ZEITENWENDE;
        let timevalue = i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second);
        Ok(Self(datevalue * SECONDS_PER_DAY + timevalue + 1))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn as_ymd_hms(&self) -> (i32, u8, u8, u8, u8, u8) {
        let value = match self.0 {
            0 => 0,
            v => v - 1,
        };
        let datevalue = value / SECONDS_PER_DAY;
        let mut timevalue = value - datevalue * SECONDS_PER_DAY;
        let hour = (timevalue / 3600) as u8;
        timevalue -= 3600 * i64::from(hour);
        let minute = (timevalue / 60) as u8;
        timevalue -= 60 * i64::from(minute);
        let second = timevalue as u8;

        let julian = datevalue + ZEITENWENDE;
        let (year, month, day) = ymd_from_julian_day(julian);
        (year, month, day, hour, minute, second)
    }

    pub(crate) fn parse(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<Option<Self>> {
        let raw = rdr.read_i64::<LittleEndian>()?;
        if raw == NULL_REPRESENTATION {
            if nullable {
                Ok(None)
            } else {
                Err(HdbError::protocol(
                    "NULL value for NOT NULL SECONDDATE column",
                ))
            }
        } else {
            Ok(Some(Self::new(raw)))
        }
    }

    pub(crate) fn emit(&self, w: &mut dyn std::io::Write) -> HdbResult<()> {
        w.write_i64::<LittleEndian>(self.0)?;
        Ok(())
    }

    pub(crate) fn emit_null(w: &mut dyn std::io::Write) -> HdbResult<()> {
        w.write_i64::<LittleEndian>(NULL_REPRESENTATION)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_fixed_point() {
        let sd = SecondDate::from_ymd_hms(1, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(sd.raw(), 1);
    }

    #[test]
    fn round_trips() {
        let sd = SecondDate::from_ymd_hms(2024, 3, 17, 13, 45, 9).unwrap();
        assert_eq!(sd.as_ymd_hms(), (2024, 3, 17, 13, 45, 9));
    }

    #[test]
    fn null_sentinel_round_trips() {
        let mut buf = Vec::new();
        SecondDate::emit_null(&mut buf).unwrap();
        let mut rdr = &buf[..];
        assert!(SecondDate::parse(true, &mut rdr).unwrap().is_none());
    }
}
