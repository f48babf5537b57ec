//! `HdbValue` (§3 `TypeCode`, §4.2): the wire-value representation shared by row
//! materialization, parameter encoding, and output-parameter decoding.
//!
//! Each `TypeId` maps to exactly one `HdbValue` variant; [`HdbValue::convert`] performs
//! the caller-value -> wire-value narrowing the spec calls `convert`, [`HdbValue::prm_size`]
//! is `prmSize`, and [`HdbValue::encode`]/[`HdbValue::decode`] are the per-type codec.

use crate::codec::{self, cesu8_to_utf8, utf8_to_cesu8, Cesu8DecodePolicy};
use crate::error::{HdbError, HdbResult};
use crate::types::{self, DayDate, LongDate, SecondDate, SecondTime, TypeId};
use bigdecimal::BigDecimal;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// A locator-bearing LOB column value, either received from the server (with an initial
/// data chunk already in hand) or about to be streamed out as a parameter (§3
/// `LobDescriptor`).
#[derive(Clone, Debug, Default)]
pub struct LobValue {
    pub(crate) is_last_data: bool,
    pub(crate) total_char_length: u64,
    pub(crate) total_byte_length: u64,
    pub(crate) locator_id: u64,
    pub(crate) data: Vec<u8>,
}

impl LobValue {
    pub(crate) fn parse(rdr: &mut dyn std::io::Read) -> HdbResult<Option<Self>> {
        let _data_type = rdr.read_u8()?;
        let options = rdr.read_u8()?;
        let is_null = options & 0b1 != 0;
        let is_data_included = options & 0b10 != 0;
        let is_last_data = options & 0b100 != 0;
        if is_null {
            return Ok(None);
        }
        let mut filler = [0_u8; 2];
        rdr.read_exact(&mut filler)?;
        let total_char_length = rdr.read_u64::<LittleEndian>()?;
        let total_byte_length = rdr.read_u64::<LittleEndian>()?;
        let locator_id = rdr.read_u64::<LittleEndian>()?;
        let chunk_length = rdr.read_u32::<LittleEndian>()?;
        let data = if is_data_included {
            crate::protocol::util::read_bytes(chunk_length as usize, rdr)?
        } else {
            Vec::new()
        };
        Ok(Some(Self {
            is_last_data,
            total_char_length,
            total_byte_length,
            locator_id,
            data,
        }))
    }

    /// Writes the 9-byte placeholder descriptor for an outbound LOB parameter (§4.2):
    /// option byte, then a zeroed char length and byte length. The real payload follows
    /// in `WriteLobRequest` parts issued after the server assigns a locator.
    pub(crate) fn emit_placeholder(w: &mut dyn std::io::Write) -> HdbResult<()> {
        w.write_u8(0b0000_0010)?; // data-included=false, not-null
        w.write_i32::<LittleEndian>(0)?;
        w.write_i32::<LittleEndian>(0)?;
        Ok(())
    }

    pub(crate) fn locator_id(&self) -> u64 {
        self.locator_id
    }

    pub(crate) fn is_last_data(&self) -> bool {
        self.is_last_data
    }

    pub(crate) fn total_char_length(&self) -> u64 {
        self.total_char_length
    }

    /// The data chunk the server included with the descriptor (§4.6): empty for an
    /// outbound parameter placeholder, the first chunk for an inbound LOB.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// The wire-value representation of a database column or parameter value (§3 `TypeCode`).
#[derive(Clone, Debug)]
pub enum HdbValue {
    Null,
    TinyInt(u8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Decimal(BigDecimal),
    Boolean(bool),
    /// CHAR/VARCHAR/BINARY/VARBINARY: raw bytes, no charset transform.
    Bytes(Vec<u8>),
    /// NCHAR/NVARCHAR/STRING/NSTRING/ALPHANUM/SHORTTEXT: CESU-8 on the wire, UTF-8 here.
    Str(String),
    LongDate(LongDate),
    SecondDate(SecondDate),
    DayDate(DayDate),
    SecondTime(SecondTime),
    Blob(LobValue),
    Clob(LobValue),
    NClob(LobValue),
}

macro_rules! range_check_signed {
    ($v:expr, $min:expr, $max:expr, $name:expr) => {
        if $v < $min as i128 || $v > $max as i128 {
            return Err(HdbError::IntegerOutOfRange($name));
        }
    };
}

impl HdbValue {
    /// Converts a caller-supplied integer (already widened to `i128` by the caller) to the
    /// wire value for `type_id`, enforcing the type's `[min, max]` range (§4.2).
    pub fn convert_integer(raw: i128, type_id: TypeId) -> HdbResult<Self> {
        match type_id {
            TypeId::TinyInt => {
                range_check_signed!(raw, 0, 255, "TINYINT");
                Ok(Self::TinyInt(raw as u8))
            }
            TypeId::SmallInt => {
                range_check_signed!(raw, i16::MIN, i16::MAX, "SMALLINT");
                Ok(Self::SmallInt(raw as i16))
            }
            TypeId::Int => {
                range_check_signed!(raw, i32::MIN, i32::MAX, "INTEGER");
                Ok(Self::Int(raw as i32))
            }
            TypeId::BigInt => {
                range_check_signed!(raw, i64::MIN, i64::MAX, "BIGINT");
                Ok(Self::BigInt(raw as i64))
            }
            other => Err(HdbError::Conversion {
                target: type_id_name(other),
                actual: "integer",
            }),
        }
    }

    /// Converts an unsigned 64-bit caller value; the top bit set is always out of range
    /// (§4.2, §8) regardless of target type, matching `ErrUint64OutOfRange`.
    pub fn convert_u64(raw: u64, type_id: TypeId) -> HdbResult<Self> {
        if raw > i64::MAX as u64 {
            return Err(HdbError::Uint64OutOfRange);
        }
        Self::convert_integer(i128::from(raw), type_id)
    }

    pub fn convert_float(raw: f64, type_id: TypeId) -> HdbResult<Self> {
        match type_id {
            TypeId::Real => {
                if raw.abs() > f64::from(f32::MAX) {
                    return Err(HdbError::FloatOutOfRange("REAL"));
                }
                #[allow(clippy::cast_possible_truncation)]
                Ok(Self::Real(raw as f32))
            }
            TypeId::Double => Ok(Self::Double(raw)),
            other => Err(HdbError::Conversion {
                target: type_id_name(other),
                actual: "float",
            }),
        }
    }

    pub fn convert_bool(raw: bool, type_id: TypeId) -> HdbResult<Self> {
        match type_id {
            TypeId::Boolean => Ok(Self::Boolean(raw)),
            TypeId::TinyInt | TypeId::SmallInt | TypeId::Int | TypeId::BigInt => {
                Self::convert_integer(i128::from(raw), type_id)
            }
            other => Err(HdbError::Conversion {
                target: type_id_name(other),
                actual: "bool",
            }),
        }
    }

    pub fn convert_str(raw: &str, type_id: TypeId) -> HdbResult<Self> {
        match type_id {
            TypeId::NChar
            | TypeId::NVarChar
            | TypeId::String
            | TypeId::NString
            | TypeId::AlphaNum
            | TypeId::ShortText => Ok(Self::Str(raw.to_string())),
            TypeId::Char | TypeId::VarChar => Ok(Self::Bytes(raw.as_bytes().to_vec())),
            TypeId::Text | TypeId::NClob => Ok(Self::NClob(LobValue {
                data: utf8_to_cesu8(raw),
                ..Default::default()
            })),
            TypeId::Clob => Ok(Self::Clob(LobValue {
                data: utf8_to_cesu8(raw),
                ..Default::default()
            })),
            other => Err(HdbError::Conversion {
                target: type_id_name(other),
                actual: "string",
            }),
        }
    }

    pub fn convert_bytes(raw: &[u8], type_id: TypeId) -> HdbResult<Self> {
        match type_id {
            TypeId::Binary | TypeId::VarBinary | TypeId::Char | TypeId::VarChar => {
                Ok(Self::Bytes(raw.to_vec()))
            }
            TypeId::Blob => Ok(Self::Blob(LobValue {
                data: raw.to_vec(),
                ..Default::default()
            })),
            other => Err(HdbError::Conversion {
                target: type_id_name(other),
                actual: "bytes",
            }),
        }
    }

    /// Size, in bytes, this value will occupy on the wire as a parameter (the spec's
    /// `prmSize`): the `TypeCode` byte plus the encoded payload.
    pub(crate) fn prm_size(&self) -> usize {
        1 + match self {
            Self::Null => 0,
            Self::TinyInt(_) | Self::Boolean(_) => 1,
            Self::SmallInt(_) => 2,
            Self::Int(_) | Self::Real(_) => 4,
            Self::BigInt(_) | Self::Double(_) => 8,
            Self::Decimal(_) => 16,
            Self::LongDate(_) | Self::SecondDate(_) => 8,
            Self::DayDate(_) | Self::SecondTime(_) => 4,
            Self::Bytes(v) => codec_length_size(v.len()) + v.len(),
            Self::Str(s) => {
                let bytes = utf8_to_cesu8(s);
                codec_length_size(bytes.len()) + bytes.len()
            }
            Self::Blob(_) | Self::Clob(_) | Self::NClob(_) => 9,
        }
    }

    pub(crate) fn type_id(&self) -> TypeId {
        match self {
            Self::Null => TypeId::Int,
            Self::TinyInt(_) => TypeId::TinyInt,
            Self::SmallInt(_) => TypeId::SmallInt,
            Self::Int(_) => TypeId::Int,
            Self::BigInt(_) => TypeId::BigInt,
            Self::Real(_) => TypeId::Real,
            Self::Double(_) => TypeId::Double,
            Self::Decimal(_) => TypeId::Decimal,
            Self::Boolean(_) => TypeId::Boolean,
            Self::Bytes(_) => TypeId::VarBinary,
            Self::Str(_) => TypeId::NVarChar,
            Self::LongDate(_) => TypeId::LongDate,
            Self::SecondDate(_) => TypeId::SecondDate,
            Self::DayDate(_) => TypeId::DayDate,
            Self::SecondTime(_) => TypeId::SecondTime,
            Self::Blob(_) => TypeId::Blob,
            Self::Clob(_) => TypeId::Clob,
            Self::NClob(_) => TypeId::NClob,
        }
    }

    /// Encodes one parameter: a `TypeCode` byte (with the NULL high bit set when this value
    /// is NULL) followed by the value payload. A NULL parameter carries no payload at all —
    /// the high bit alone tells the server to expect nothing further for this value (§4.2).
    pub(crate) fn encode(&self, type_id: TypeId, w: &mut dyn std::io::Write) -> HdbResult<()> {
        if matches!(self, Self::Null) {
            w.write_u8(type_id.type_code(true))?;
            return Ok(());
        }
        w.write_u8(type_id.type_code(false))?;
        match self {
            Self::Null => unreachable!(),
            Self::TinyInt(v) => w.write_u8(*v)?,
            Self::SmallInt(v) => w.write_i16::<LittleEndian>(*v)?,
            Self::Int(v) => w.write_i32::<LittleEndian>(*v)?,
            Self::BigInt(v) => w.write_i64::<LittleEndian>(*v)?,
            Self::Real(v) => w.write_f32::<LittleEndian>(*v)?,
            Self::Double(v) => w.write_f64::<LittleEndian>(*v)?,
            // Tri-state wire encoding (0/1/2 = false/null/true, DFV >= 8); a non-null
            // value is always 0 or 2.
            Self::Boolean(v) => w.write_u8(2 * u8::from(*v))?,
            Self::Decimal(v) => w.write_all(&types::encode_decimal(v)?)?,
            Self::LongDate(v) => v.emit(w)?,
            Self::SecondDate(v) => v.emit(w)?,
            Self::DayDate(v) => v.emit(w)?,
            Self::SecondTime(v) => v.emit(w)?,
            Self::Bytes(v) => {
                codec::emit_length_indicator(v.len(), w)?;
                w.write_all(v)?;
            }
            Self::Str(s) => {
                let bytes = utf8_to_cesu8(s);
                codec::emit_length_indicator(bytes.len(), w)?;
                w.write_all(&bytes)?;
            }
            Self::Blob(_) | Self::Clob(_) | Self::NClob(_) => LobValue::emit_placeholder(w)?,
        }
        Ok(())
    }

    /// Decodes one value of `type_id` from the wire. This path is shared by result-row
    /// columns and output-parameter values; unlike [`Self::encode`]'s parameter stream,
    /// no `TypeCode` byte precedes the payload here — the type is already known from
    /// metadata, so NULL is signaled per-type instead (a leading indicator byte for
    /// fixed-width integers, tri-state for BOOLEAN, a sentinel bit pattern for
    /// REAL/DOUBLE/DECIMAL/temporals, and the 255 length indicator for byte strings).
    /// `nullable` comes from the column's field metadata and only affects the
    /// NOT-NULL-violation error path.
    pub(crate) fn decode(type_id: TypeId, nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<Self> {
        Ok(match type_id {
            TypeId::TinyInt => match read_null_indicator(nullable, rdr)? {
                false => Self::TinyInt(rdr.read_u8()?),
                true => Self::Null,
            },
            TypeId::SmallInt => match read_null_indicator(nullable, rdr)? {
                false => Self::SmallInt(rdr.read_i16::<LittleEndian>()?),
                true => Self::Null,
            },
            TypeId::Int => match read_null_indicator(nullable, rdr)? {
                false => Self::Int(rdr.read_i32::<LittleEndian>()?),
                true => Self::Null,
            },
            TypeId::BigInt => match read_null_indicator(nullable, rdr)? {
                false => Self::BigInt(rdr.read_i64::<LittleEndian>()?),
                true => Self::Null,
            },
            TypeId::Boolean => match rdr.read_u8()? {
                0 => Self::Boolean(false),
                2 => Self::Boolean(true),
                1 if nullable => Self::Null,
                1 => return Err(HdbError::protocol("NULL value for NOT NULL BOOLEAN column")),
                other => return Err(HdbError::protocol(format!("invalid BOOLEAN wire value {other}"))),
            },
            TypeId::Real => {
                let bits = rdr.read_u32::<LittleEndian>()?;
                if bits == 0xFFFF_FFFF {
                    return Ok(Self::Null);
                }
                Self::Real(f32::from_bits(bits))
            }
            TypeId::Double => {
                let bits = rdr.read_u64::<LittleEndian>()?;
                if bits == 0xFFFF_FFFF_FFFF_FFFF {
                    return Ok(Self::Null);
                }
                Self::Double(f64::from_bits(bits))
            }
            TypeId::Decimal | TypeId::Fixed8 | TypeId::Fixed12 | TypeId::Fixed16 => {
                let mut raw = [0_u8; 16];
                rdr.read_exact(&mut raw)?;
                match types::decode_decimal(raw, nullable, i16::MAX)? {
                    Some(d) => Self::Decimal(d),
                    None => Self::Null,
                }
            }
            TypeId::LongDate => match LongDate::parse(nullable, rdr)? {
                Some(v) => Self::LongDate(v),
                None => Self::Null,
            },
            TypeId::SecondDate => match SecondDate::parse(nullable, rdr)? {
                Some(v) => Self::SecondDate(v),
                None => Self::Null,
            },
            TypeId::DayDate => match DayDate::parse(nullable, rdr)? {
                Some(v) => Self::DayDate(v),
                None => Self::Null,
            },
            TypeId::SecondTime => match SecondTime::parse(nullable, rdr)? {
                Some(v) => Self::SecondTime(v),
                None => Self::Null,
            },
            TypeId::Char | TypeId::VarChar | TypeId::Binary | TypeId::VarBinary => {
                let first = rdr.read_u8()?;
                match codec::parse_length_indicator(first, rdr)? {
                    Some(len) => Self::Bytes(crate::protocol::util::read_bytes(len, rdr)?),
                    None => Self::Null,
                }
            }
            TypeId::NChar
            | TypeId::NVarChar
            | TypeId::String
            | TypeId::NString
            | TypeId::AlphaNum
            | TypeId::ShortText => {
                let first = rdr.read_u8()?;
                match codec::parse_length_indicator(first, rdr)? {
                    Some(len) => {
                        let raw = crate::protocol::util::read_bytes(len, rdr)?;
                        Self::Str(cesu8_to_utf8(&raw, Cesu8DecodePolicy::Replace)?)
                    }
                    None => Self::Null,
                }
            }
            TypeId::Blob => match LobValue::parse(rdr)? {
                Some(v) => Self::Blob(v),
                None => Self::Null,
            },
            TypeId::Clob => match LobValue::parse(rdr)? {
                Some(v) => Self::Clob(v),
                None => Self::Null,
            },
            TypeId::NClob | TypeId::Text | TypeId::BinText => match LobValue::parse(rdr)? {
                Some(v) => Self::NClob(v),
                None => Self::Null,
            },
            other => {
                return Err(HdbError::protocol(format!(
                    "decode not implemented for type {other}"
                )))
            }
        })
    }
}

/// Reads the 1-byte NULL indicator that precedes fixed-width integer columns (§4.2): zero
/// means NULL, anything else means the value follows. Returns `true` when NULL.
fn read_null_indicator(nullable: bool, rdr: &mut dyn std::io::Read) -> HdbResult<bool> {
    let is_null = rdr.read_u8()? == 0;
    if is_null && !nullable {
        return Err(HdbError::protocol("NULL value for NOT NULL integer column"));
    }
    Ok(is_null)
}

fn codec_length_size(len: usize) -> usize {
    match len {
        0..=245 => 1,
        0..=0xFFFF => 3,
        _ => 5,
    }
}

fn type_id_name(type_id: TypeId) -> &'static str {
    // Leaked into a 'static str via the Display impl's match arms; TypeId::Display
    // already owns the canonical names, so reuse them through a thin wrapper.
    match type_id {
        TypeId::TinyInt => "TINYINT",
        TypeId::SmallInt => "SMALLINT",
        TypeId::Int => "INTEGER",
        TypeId::BigInt => "BIGINT",
        TypeId::Real => "REAL",
        TypeId::Double => "DOUBLE",
        TypeId::Decimal | TypeId::Fixed8 | TypeId::Fixed12 | TypeId::Fixed16 => "DECIMAL",
        TypeId::Boolean => "BOOLEAN",
        TypeId::Char => "CHAR",
        TypeId::VarChar => "VARCHAR",
        TypeId::NChar => "NCHAR",
        TypeId::NVarChar => "NVARCHAR",
        TypeId::String => "STRING",
        TypeId::NString => "NSTRING",
        TypeId::AlphaNum => "ALPHANUM",
        TypeId::ShortText => "SHORTTEXT",
        TypeId::Binary => "BINARY",
        TypeId::VarBinary => "VARBINARY",
        TypeId::Blob => "BLOB",
        TypeId::Clob => "CLOB",
        TypeId::NClob => "NCLOB",
        TypeId::Text => "TEXT",
        TypeId::BinText => "BINTEXT",
        TypeId::BLocator => "BLOCATOR",
        TypeId::BString => "BSTRING",
        TypeId::LongDate => "LONGDATE",
        TypeId::SecondDate => "SECONDDATE",
        TypeId::DayDate => "DAYDATE",
        TypeId::SecondTime => "SECONDTIME",
        TypeId::Geometry => "GEOMETRY",
        TypeId::Point => "POINT",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_range_checks_match_spec() {
        assert!(HdbValue::convert_integer(i128::from(i32::MIN) - 1, TypeId::Int).is_err());
        assert!(HdbValue::convert_integer(i128::from(i32::MAX) + 1, TypeId::Int).is_err());
        assert!(HdbValue::convert_integer(0, TypeId::Int).is_ok());
    }

    #[test]
    fn u64_high_bit_is_always_out_of_range() {
        let huge = u64::MAX;
        assert!(matches!(
            HdbValue::convert_u64(huge, TypeId::BigInt),
            Err(HdbError::Uint64OutOfRange)
        ));
    }

    #[test]
    fn float_out_of_range_for_real() {
        assert!(HdbValue::convert_float(f64::from(f32::MAX) * 2.0, TypeId::Real).is_err());
        assert!(HdbValue::convert_float(1.5, TypeId::Double).is_ok());
    }

    #[test]
    fn parameter_encode_writes_type_code_then_value() {
        let mut buf = Vec::new();
        HdbValue::Int(42).encode(TypeId::Int, &mut buf).unwrap();
        assert_eq!(buf[0], TypeId::Int.type_code(false));
        assert_eq!(&buf[1..], &42_i32.to_le_bytes());
    }

    #[test]
    fn parameter_null_encodes_as_type_code_alone() {
        let mut buf = Vec::new();
        HdbValue::Null.encode(TypeId::Real, &mut buf).unwrap();
        assert_eq!(buf, vec![TypeId::Real.type_code(true)]);
    }

    #[test]
    fn row_int_decode_reads_leading_null_indicator() {
        let buf = [1_u8, 42, 0, 0, 0];
        let decoded = HdbValue::decode(TypeId::Int, false, &mut &buf[..]).unwrap();
        assert!(matches!(decoded, HdbValue::Int(42)));

        let null_buf = [0_u8];
        let decoded_null = HdbValue::decode(TypeId::Int, true, &mut &null_buf[..]).unwrap();
        assert!(matches!(decoded_null, HdbValue::Null));
    }

    #[test]
    fn row_real_null_sentinel_decodes_to_null() {
        let buf = 0xFFFF_FFFF_u32.to_le_bytes();
        let decoded = HdbValue::decode(TypeId::Real, true, &mut &buf[..]).unwrap();
        assert!(matches!(decoded, HdbValue::Null));
    }

    #[test]
    fn row_boolean_tristate_decodes() {
        assert!(matches!(
            HdbValue::decode(TypeId::Boolean, false, &mut &[0_u8][..]).unwrap(),
            HdbValue::Boolean(false)
        ));
        assert!(matches!(
            HdbValue::decode(TypeId::Boolean, false, &mut &[2_u8][..]).unwrap(),
            HdbValue::Boolean(true)
        ));
        assert!(matches!(
            HdbValue::decode(TypeId::Boolean, true, &mut &[1_u8][..]).unwrap(),
            HdbValue::Null
        ));
    }
}
