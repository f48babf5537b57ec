//! HANA's `DayDate`: a day-resolution UTC date (§4.2).

use super::longdate::{julian_day_number, ymd_from_julian_day};
use crate::error::{HdbError, HdbResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

const NULL_REPRESENTATION: i32 = 3_652_062;
const ZEITENWENDE: i32 = 1_721_424;

/// Wire representation of HANA's `DAYDATE` type: days since the Julian proleptic epoch minus
/// `1721423`, offset by one (`daydate(1 Jan 0001) == 1`, per §8).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayDate(i32);

impl std::fmt::Display for DayDate {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (year, month, day) = self.as_ymd();
        write!(fmt, "{year:04}-{month:02}-{day:02}")
    }
}

impl DayDate {
    pub(crate) fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub(crate) fn raw(&self) -> i32 {
        self.0
    }

    pub fn from_ymd(year: i32, month: u8, day: u8) -> HdbResult<Self> {
        let julian = julian_day_number(year, month, day)?;
        Ok(Self(julian - ZEITENWENDE + 1))
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn as_ymd(&self) -> (i32, u8, u8) {
        let datevalue = match self.0 {
            0 => 0,
            v => v - 1,
        };
        let julian = i64::from(datevalue) + i64::from(ZEITENWENDE);
        ymd_from_julian_day(julian)
    }

    pub(crate) fn parse(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<Option<Self>> {
        let raw = rdr.read_i32::<LittleEndian>()?;
        if raw == NULL_REPRESENTATION {
            if nullable {
                Ok(None)
            } else {
                Err(HdbError::protocol("NULL value for NOT NULL DAYDATE column"))
            }
        } else {
            Ok(Some(Self::new(raw)))
        }
    }

    pub(crate) fn emit(&self, w: &mut dyn std::io::Write) -> HdbResult<()> {
        w.write_i32::<LittleEndian>(self.0)?;
        Ok(())
    }

    pub(crate) fn emit_null(w: &mut dyn std::io::Write) -> HdbResult<()> {
        w.write_i32::<LittleEndian>(NULL_REPRESENTATION)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_fixed_point() {
        let dd = DayDate::from_ymd(1, 1, 1).unwrap();
        assert_eq!(dd.raw(), 1);
    }

    #[test]
    fn round_trips() {
        let dd = DayDate::from_ymd(2024, 3, 17).unwrap();
        assert_eq!(dd.as_ymd(), (2024, 3, 17));
    }
}
