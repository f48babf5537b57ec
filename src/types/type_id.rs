use crate::error::{HdbError, HdbResult};

/// ID of the wire type of a database column or a parameter (§3 `TypeCode`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeId {
    /// TINYINT
    TinyInt = 1,
    /// SMALLINT
    SmallInt = 2,
    /// INTEGER
    Int = 3,
    /// BIGINT
    BigInt = 4,
    /// DECIMAL / SMALLDECIMAL (generic 16-byte wire decimal)
    Decimal = 5,
    /// REAL (f32)
    Real = 6,
    /// DOUBLE (f64)
    Double = 7,
    /// CHAR (byte string)
    Char = 8,
    /// VARCHAR (byte string)
    VarChar = 9,
    /// NCHAR (CESU-8)
    NChar = 10,
    /// NVARCHAR (CESU-8)
    NVarChar = 11,
    /// BINARY
    Binary = 12,
    /// VARBINARY
    VarBinary = 13,
    /// CLOB
    Clob = 25,
    /// NCLOB
    NClob = 26,
    /// BLOB
    Blob = 27,
    /// BOOLEAN
    Boolean = 28,
    /// STRING (CESU-8)
    String = 29,
    /// NSTRING (CESU-8)
    NString = 30,
    /// Binary LOB locator
    BLocator = 31,
    /// Byte string (length-prefixed, no charset transform)
    BString = 33,
    /// TEXT (CESU-8 LOB)
    Text = 51,
    /// SHORTTEXT (CESU-8)
    ShortText = 52,
    /// BINTEXT (byte LOB)
    BinText = 53,
    /// ALPHANUM (CESU-8)
    AlphaNum = 55,
    /// 100ns-precision UTC timestamp
    LongDate = 61,
    /// 1-second-precision UTC timestamp
    SecondDate = 62,
    /// Day resolution date
    DayDate = 63,
    /// Seconds-since-midnight time
    SecondTime = 64,
    /// ST_GEOMETRY
    Geometry = 74,
    /// ST_POINT
    Point = 75,
    /// Wire encoding of DECIMAL for precision <= 18 (DFV >= 8)
    Fixed8 = 81,
    /// Wire encoding of DECIMAL for precision <= 28 (DFV >= 8)
    Fixed12 = 82,
    /// Wire encoding of DECIMAL for precision <= 38 (DFV >= 8)
    Fixed16 = 76,
}

impl TypeId {
    pub(crate) fn try_new(id: u8) -> HdbResult<Self> {
        Ok(match id {
            1 => Self::TinyInt,
            2 => Self::SmallInt,
            3 => Self::Int,
            4 => Self::BigInt,
            5 => Self::Decimal,
            6 => Self::Real,
            7 => Self::Double,
            8 => Self::Char,
            9 => Self::VarChar,
            10 => Self::NChar,
            11 => Self::NVarChar,
            12 => Self::Binary,
            13 => Self::VarBinary,
            25 => Self::Clob,
            26 => Self::NClob,
            27 => Self::Blob,
            28 => Self::Boolean,
            29 => Self::String,
            30 => Self::NString,
            31 => Self::BLocator,
            33 => Self::BString,
            51 => Self::Text,
            52 => Self::ShortText,
            53 => Self::BinText,
            55 => Self::AlphaNum,
            61 => Self::LongDate,
            62 => Self::SecondDate,
            63 => Self::DayDate,
            64 => Self::SecondTime,
            74 => Self::Geometry,
            75 => Self::Point,
            76 => Self::Fixed16,
            81 => Self::Fixed8,
            82 => Self::Fixed12,
            tc => return Err(HdbError::protocol(format!("unknown type code {tc}"))),
        })
    }

    /// The wire `TypeCode` byte for this type, with the high bit set when `nullable`.
    pub(crate) fn type_code(self, nullable: bool) -> u8 {
        (if nullable { 128 } else { 0 }) + self as u8
    }

    pub(crate) fn is_character_lob(self) -> bool {
        matches!(self, Self::Clob | Self::NClob | Self::Text)
    }

    pub(crate) fn is_binary_lob(self) -> bool {
        matches!(self, Self::Blob | Self::BinText)
    }

    pub(crate) fn is_lob(self) -> bool {
        self.is_character_lob() || self.is_binary_lob()
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            fmt,
            "{}",
            match self {
                Self::TinyInt => "TINYINT",
                Self::SmallInt => "SMALLINT",
                Self::Int => "INT",
                Self::BigInt => "BIGINT",
                Self::Decimal => "DECIMAL",
                Self::Real => "REAL",
                Self::Double => "DOUBLE",
                Self::Char => "CHAR",
                Self::VarChar => "VARCHAR",
                Self::NChar => "NCHAR",
                Self::NVarChar => "NVARCHAR",
                Self::Binary => "BINARY",
                Self::VarBinary => "VARBINARY",
                Self::Clob => "CLOB",
                Self::NClob => "NCLOB",
                Self::Blob => "BLOB",
                Self::Boolean => "BOOLEAN",
                Self::String => "STRING",
                Self::NString => "NSTRING",
                Self::BLocator => "BLOCATOR",
                Self::BString => "BSTRING",
                Self::Text => "TEXT",
                Self::ShortText => "SHORTTEXT",
                Self::BinText => "BINTEXT",
                Self::AlphaNum => "ALPHANUM",
                Self::LongDate => "LONGDATE",
                Self::SecondDate => "SECONDDATE",
                Self::DayDate => "DAYDATE",
                Self::SecondTime => "SECONDTIME",
                Self::Geometry => "GEOMETRY",
                Self::Point => "POINT",
                Self::Fixed16 => "FIXED16",
                Self::Fixed8 => "FIXED8",
                Self::Fixed12 => "FIXED12",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_code_sets_high_bit_when_nullable() {
        assert_eq!(TypeId::Int.type_code(false), 3);
        assert_eq!(TypeId::Int.type_code(true), 131);
    }

    #[test]
    fn unknown_code_is_a_protocol_error() {
        assert!(TypeId::try_new(17).is_err());
    }
}
