//! HANA's `LongDate`: a UTC timestamp with 100-nanosecond precision (§4.2).

use crate::error::{HdbError, HdbResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

const NULL_REPRESENTATION: i64 = 3_155_380_704_000_000_001;

const SECOND_FACTOR: i64 = 10_000_000;
const MINUTE_FACTOR: i64 = 600_000_000;
const HOUR_FACTOR: i64 = 36_000_000_000;
const DAY_FACTOR: i64 = 864_000_000_000;

const ZEITENWENDE: i64 = 1_721_424;
const JGREG: i64 = 2_299_161;

/// Wire representation of HANA's `LONGDATE` type: 100ns ticks since `0001-01-01 00:00:00 UTC`,
/// offset by one so that the fixed point in §8 (`longdate(1 Jan 0001 00:00:00.0000000 UTC) == 1`)
/// holds. Agnostic of time zones; callers are responsible for normalizing to UTC before encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LongDate(i64);

impl std::fmt::Display for LongDate {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (year, month, day, hour, minute, second, fraction) = self.as_ymd_hms_f();
        write!(
            fmt,
            "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{fraction:07}",
        )
    }
}

impl LongDate {
    pub(crate) fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub(crate) fn raw(&self) -> i64 {
        self.0
    }

    /// Builds a `LongDate` from UTC calendar components; `fraction` is in 100ns units (0..10_000_000).
    #[allow(clippy::cast_possible_truncation, clippy::too_many_arguments)]
    pub fn from_ymd_hms_f(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        fraction: u32,
    ) -> HdbResult<Self> {
        let julian_day = julian_day_number(year, month, day)?;
        let datevalue = i64::from(julian_day) - ZEITENWENDE;
        let timevalue = i64::from(hour) * HOUR_FACTOR
            + i64::from(minute) * MINUTE_FACTOR
            + i64::from(second) * SECOND_FACTOR
            + i64::from(fraction);
        Ok(Self(datevalue * DAY_FACTOR + timevalue + 1))
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub(crate) fn as_ymd_hms_f(&self) -> (i32, u8, u8, u8, u8, u8, u32) {
        let value = match self.0 {
            0 => 0,
            v => v - 1,
        };

        let datevalue = value / DAY_FACTOR;
        let mut timevalue = value - (datevalue * DAY_FACTOR);
        let hour: u8 = (timevalue / HOUR_FACTOR) as u8;
        timevalue -= HOUR_FACTOR * i64::from(hour);
        let minute: u8 = (timevalue / MINUTE_FACTOR) as u8;
        timevalue -= MINUTE_FACTOR * i64::from(minute);
        let second: u8 = (timevalue / SECOND_FACTOR) as u8;
        timevalue -= SECOND_FACTOR * i64::from(second);
        let fraction: u32 = timevalue as u32;

        let julian: i64 = datevalue + ZEITENWENDE;
        let (year, month, day) = ymd_from_julian_day(julian);
        (year, month, day, hour, minute, second, fraction)
    }

    pub(crate) fn parse(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<Option<Self>> {
        let raw = rdr.read_i64::<LittleEndian>()?;
        if raw == NULL_REPRESENTATION {
            if nullable {
                Ok(None)
            } else {
                Err(HdbError::protocol("NULL value for NOT NULL LONGDATE column"))
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

/// Julian day number (integer, noon-based convention dropped for our purposes) for a
/// proleptic-Gregorian calendar date, shared by `LongDate`/`DayDate`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn julian_day_number(year: i32, month: u8, day: u8) -> HdbResult<i32> {
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(HdbError::protocol("calendar date out of range"));
    }
    let (y, m) = if month > 2 {
        (i64::from(year), i64::from(month))
    } else {
        (i64::from(year) - 1, i64::from(month) + 12)
    };
    let a = y / 100;
    let b = 2 - a + a / 4;
    let jd = (365.25 * (y as f64 + 4716.0)) as i64 + (30.6001 * (m as f64 + 1.0)) as i64
        + i64::from(day)
        + b
        - 1524;
    Ok(jd as i32)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub(crate) fn ymd_from_julian_day(julian: i64) -> (i32, u8, u8) {
    let ja: i64 = if julian >= JGREG {
        let jalpha: i64 = (((julian - 1_867_216) as f64 - 0.25_f64) / 36_524.25_f64) as i64;
        julian + 1 + jalpha - ((0.25_f64 * jalpha as f64) as i64)
    } else {
        julian
    };

    let jb: i64 = ja + 1524;
    let jc: i64 = (6680_f64 + ((jb - 2_439_870) as f64 - 122.1_f64) / 365.25_f64) as i64;
    let jd: i64 = ((365 * jc) as f64 + (0.25_f64 * jc as f64)) as i64;
    let je: i64 = ((jb - jd) as f64 / 30.6001) as i64;

    let day: u8 = (jb - jd - ((30.6001 * je as f64) as i64)) as u8;
    let mut month: u8 = je as u8 - 1;
    let mut year: i32 = jc as i32 - 4715;

    if month > 12 {
        month -= 12;
    }
    if month > 2 {
        year -= 1;
    }
    if year <= 0 {
        year -= 1;
    }
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_fixed_point() {
        // longdate(1 Jan 0001 00:00:00.0000000 UTC) == 1, per spec §8.
        let ld = LongDate::from_ymd_hms_f(1, 1, 1, 0, 0, 0, 0).unwrap();
        assert_eq!(ld.raw(), 1);
    }

    #[test]
    fn round_trips_through_display_components() {
        let ld = LongDate::from_ymd_hms_f(2024, 3, 17, 13, 45, 9, 1_234_567).unwrap();
        let (y, mo, d, h, mi, s, f) = ld.as_ymd_hms_f();
        assert_eq!((y, mo, d, h, mi, s, f), (2024, 3, 17, 13, 45, 9, 1_234_567));
    }

    #[test]
    fn null_sentinel_round_trips() {
        let mut buf = Vec::new();
        LongDate::emit_null(&mut buf).unwrap();
        let mut rdr = &buf[..];
        assert!(LongDate::parse(true, &mut rdr).unwrap().is_none());
    }
}
