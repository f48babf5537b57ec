//! Typed values carried by option lists (§6): 1-byte typecode, then the value.

use crate::codec::{cesu8_length, cesu8_to_utf8, utf8_to_cesu8, Cesu8DecodePolicy};
use crate::error::{HdbError, HdbResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum OptionValue {
    Int(i32),
    BigInt(i64),
    Double(f64),
    Boolean(bool),
    String(String),
    BString(Vec<u8>),
}

impl OptionValue {
    pub(crate) fn as_i32(&self) -> HdbResult<i32> {
        match self {
            Self::Int(i) => Ok(*i),
            _ => Err(HdbError::Usage("not an Int-typed option value")),
        }
    }

    pub(crate) fn as_bool(&self) -> HdbResult<bool> {
        match self {
            Self::Boolean(b) => Ok(*b),
            _ => Err(HdbError::Usage("not a Boolean-typed option value")),
        }
    }

    pub(crate) fn as_str(&self) -> HdbResult<&str> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(HdbError::Usage("not a String-typed option value")),
        }
    }

    pub(crate) fn type_id(&self) -> u8 {
        match self {
            Self::Int(_) => 3,
            Self::BigInt(_) => 4,
            Self::Double(_) => 7,
            Self::Boolean(_) => 28,
            Self::String(_) => 29,
            Self::BString(_) => 33,
        }
    }

    pub(crate) fn size(&self) -> usize {
        1 + match self {
            Self::Int(_) => 4,
            Self::BigInt(_) | Self::Double(_) => 8,
            Self::Boolean(_) => 1,
            Self::String(s) => cesu8_length(s) + 2,
            Self::BString(v) => v.len() + 2,
        }
    }

    pub(crate) fn emit(&self, w: &mut dyn std::io::Write) -> HdbResult<()> {
        w.write_u8(self.type_id())?;
        match self {
            Self::Int(i) => w.write_i32::<LittleEndian>(*i)?,
            Self::BigInt(i) => w.write_i64::<LittleEndian>(*i)?,
            Self::Double(f) => w.write_f64::<LittleEndian>(*f)?,
            Self::Boolean(b) => w.write_u8((*b).into())?,
            Self::String(s) => emit_length_and_bytes(&utf8_to_cesu8(s), w)?,
            Self::BString(v) => emit_length_and_bytes(v, w)?,
        }
        Ok(())
    }

    pub(crate) fn parse(rdr: &mut dyn std::io::Read) -> HdbResult<Self> {
        let typecode = rdr.read_u8()?;
        match typecode {
            3 => Ok(Self::Int(rdr.read_i32::<LittleEndian>()?)),
            4 => Ok(Self::BigInt(rdr.read_i64::<LittleEndian>()?)),
            7 => Ok(Self::Double(rdr.read_f64::<LittleEndian>()?)),
            28 => Ok(Self::Boolean(rdr.read_u8()? > 0)),
            29 => {
                let bytes = parse_length_and_bytes(rdr)?;
                Ok(Self::String(cesu8_to_utf8(&bytes, Cesu8DecodePolicy::Strict)?))
            }
            33 => Ok(Self::BString(parse_length_and_bytes(rdr)?)),
            other => Err(HdbError::protocol(format!(
                "unsupported option value typecode {other}"
            ))),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn emit_length_and_bytes(v: &[u8], w: &mut dyn std::io::Write) -> HdbResult<()> {
    w.write_i16::<LittleEndian>(v.len() as i16)?;
    w.write_all(v)?;
    Ok(())
}

#[allow(clippy::cast_sign_loss)]
fn parse_length_and_bytes(rdr: &mut dyn std::io::Read) -> HdbResult<Vec<u8>> {
    let len = rdr.read_i16::<LittleEndian>()? as usize;
    let mut buf = vec![0_u8; len];
    rdr.read_exact(&mut buf)?;
    Ok(buf)
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::BString(v) => write!(f, "{v:?}"),
        }
    }
}
