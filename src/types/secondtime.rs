//! HANA's `SecondTime`: seconds since midnight (§4.2).

use crate::error::{HdbError, HdbResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

// The wire quirk documented in the spec's design notes (§9): the NULL sentinel for
// SECONDTIME is the literal value 86401, one past the last legal value, rather than a
// high-bit-tagged TypeCode like every other nullable type. Kept as-is rather than
// "corrected" to the neighboring out-of-range value some other drivers use, since the
// wire format is defined by what the server actually sends.
const NULL_REPRESENTATION: i32 = 86_401;

const MINUTE_FACTOR: u32 = 60;
const HOUR_FACTOR: u32 = 3_600;

/// Wire representation of HANA's `SECONDTIME` type: seconds since midnight, offset by one
/// (`secondtime(00:00:00) == 1`, per §8).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecondTime(u32);

impl std::fmt::Display for SecondTime {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (hour, minute, second) = self.as_hms();
        write!(fmt, "{hour:02}:{minute:02}:{second:02}")
    }
}

impl SecondTime {
    pub(crate) fn new(raw: i32) -> HdbResult<Self> {
        if !(0..NULL_REPRESENTATION).contains(&raw) {
            return Err(HdbError::protocol("SECONDTIME value out of range"));
        }
        #[allow(clippy::cast_sign_loss)]
        Ok(Self(raw as u32))
    }

    pub(crate) fn raw(&self) -> u32 {
        self.0
    }

    pub fn from_hms(hour: u8, minute: u8, second: u8) -> HdbResult<Self> {
        if hour >= 24 || minute >= 60 || second >= 60 {
            return Err(HdbError::protocol("time-of-day out of range"));
        }
        let secs = u32::from(hour) * HOUR_FACTOR + u32::from(minute) * MINUTE_FACTOR + u32::from(second);
        Ok(Self(secs + 1))
    }

    pub(crate) fn as_hms(&self) -> (u32, u32, u32) {
        let mut second = if self.0 == 0 { 0 } else { self.0 - 1 };
        let hour = second / HOUR_FACTOR;
        second -= HOUR_FACTOR * hour;
        let minute = second / MINUTE_FACTOR;
        second -= MINUTE_FACTOR * minute;
        (hour, minute, second)
    }

    pub(crate) fn parse(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<Option<Self>> {
        let raw = rdr.read_i32::<LittleEndian>()?;
        if raw == NULL_REPRESENTATION {
            if nullable {
                Ok(None)
            } else {
                Err(HdbError::protocol(
                    "NULL value for NOT NULL SECONDTIME column",
                ))
            }
        } else {
            Ok(Some(Self::new(raw)?))
        }
    }

    pub(crate) fn emit(&self, w: &mut dyn std::io::Write) -> HdbResult<()> {
        #[allow(clippy::cast_possible_wrap)]
        w.write_i32::<LittleEndian>(self.0 as i32)?;
        Ok(())
    }

    /// Emits the NULL sentinel. Unlike every other nullable wire type, SECONDTIME never sets
    /// the TypeCode high bit for NULL (§8); the sentinel value alone carries the meaning.
    pub(crate) fn emit_null(w: &mut dyn std::io::Write) -> HdbResult<()> {
        w.write_i32::<LittleEndian>(NULL_REPRESENTATION)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midnight_fixed_point() {
        let st = SecondTime::from_hms(0, 0, 0).unwrap();
        assert_eq!(st.raw(), 1);
    }

    #[test]
    fn null_sentinel_is_86401() {
        let mut buf = Vec::new();
        SecondTime::emit_null(&mut buf).unwrap();
        let mut rdr = &buf[..];
        assert!(SecondTime::parse(true, &mut rdr).unwrap().is_none());
        assert_eq!(buf, 86_401_i32.to_le_bytes());
    }

    #[test]
    fn round_trips() {
        let st = SecondTime::from_hms(13, 45, 9).unwrap();
        assert_eq!(st.as_hms(), (13, 45, 9));
    }
}
