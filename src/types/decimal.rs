//! HANA's 16-byte wire decimal layout (§4.2) and DFV-gated FIXED8/12/16 precision routing.

use crate::error::{HdbError, HdbResult};
use crate::types::type_id::TypeId;
use bigdecimal::{BigDecimal, Zero};
use byteorder::{ByteOrder, LittleEndian};
use num_bigint::{BigInt, Sign};

/// 16-byte wire layout: a 113-bit mantissa (bytes 0..=14, plus the low bit of byte 14),
/// a 14-bit exponent biased by 6176 (remaining bits of byte 14, and all but the top bit
/// of byte 15), and a sign bit (top bit of byte 15). The NULL sentinel is the high nibble
/// of byte 15 equal to `0x7` with every other byte zero.
pub(crate) fn decode(mut raw: [u8; 16], nullable: bool, scale: i16) -> HdbResult<Option<BigDecimal>> {
    if raw[15] == 0x70 && raw[0..=14].iter().all(|b| *b == 0) {
        return if nullable {
            Ok(None)
        } else {
            Err(HdbError::protocol("NULL value for NOT NULL DECIMAL column"))
        };
    }

    let is_negative = (raw[15] & 0b1000_0000) != 0;
    raw[15] &= 0b0111_1111;
    let exponent = i64::from(LittleEndian::read_u16(&raw[14..=15]) >> 1) - 6176;
    raw[14] &= 0b0000_0001;
    let mantissa = BigInt::from_bytes_le(Sign::Plus, &raw[0..=14]);

    let mut value = if is_negative {
        -BigDecimal::new(mantissa, -exponent)
    } else {
        BigDecimal::new(mantissa, -exponent)
    };
    if scale < i16::MAX {
        value = value.with_scale(i64::from(scale));
    }
    Ok(Some(value))
}

/// Encodes a `BigDecimal` into the 16-byte wire layout, rounding away trailing-zero
/// mantissa digits (HANA rejects a mantissa that is a multiple of 10) and any precision
/// beyond 113 bits.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn encode(value: &BigDecimal) -> HdbResult<[u8; 16]> {
    let ten = BigInt::from(10_u8);
    let (mut bigint, neg_exponent) = value.as_bigint_and_exponent();
    let mut exponent = -neg_exponent;

    while !bigint.is_zero() && (&bigint % &ten).is_zero() {
        bigint /= 10;
        exponent += 1;
    }

    loop {
        let (_, mantissa) = bigint.to_bytes_le();
        let len = mantissa.len();
        if (len > 15) || (len == 15 && (mantissa[14] & 0b1111_1110) != 0) {
            bigint /= 10;
            exponent += 1;
        } else {
            break;
        }
    }

    if !(-6143..=6144).contains(&exponent) {
        return Err(HdbError::DecimalOutOfRange(
            "exponent out of representable range",
        ));
    }

    let (sign, mantissa) = bigint.to_bytes_le();
    let mut raw = [0_u8; 16];
    for (i, b) in mantissa.iter().enumerate() {
        raw[i] = *b;
    }
    let biased_exponent = (exponent + 6176) as u16;
    LittleEndian::write_u16(&mut raw[14..=15], biased_exponent * 2);
    if sign == Sign::Minus {
        raw[15] |= 0b1000_0000;
    }
    Ok(raw)
}

pub(crate) fn null_raw() -> [u8; 16] {
    let mut raw = [0_u8; 16];
    raw[15] = 0x70;
    raw
}

/// Chooses the DFV-gated fixed-point wire type for a DECIMAL column of the given precision
/// (§4.2, §8). On `dfv < 8` the generic `Decimal` encoding is always used.
pub fn type_for_precision(precision: u32, dfv: u8) -> HdbResult<TypeId> {
    if dfv < 8 {
        return if precision < 38 {
            Ok(TypeId::Decimal)
        } else {
            Err(HdbError::protocol("DECIMAL precision 38 requires DFV >= 8"))
        };
    }
    Ok(match precision {
        0..=18 => TypeId::Fixed8,
        19..=28 => TypeId::Fixed12,
        29..=38 => TypeId::Fixed16,
        _ => return Err(HdbError::protocol("DECIMAL precision exceeds 38")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn round_trip(s: &str) {
        let original = BigDecimal::from_str(s).unwrap();
        let raw = encode(&original).unwrap();
        let exponent = i64::from(LittleEndian::read_u16(&raw[14..=15]) >> 1) - 6176;
        let decoded = decode(raw, false, (-exponent).min(i16::MAX as i64) as i16)
            .unwrap()
            .unwrap();
        assert_eq!(original, decoded, "round trip for {s}");
    }

    #[test]
    fn decimal_round_trips() {
        for s in [
            "1234.5678",
            "-1234.5678",
            "123456789",
            "0.1234567890000",
            "-123456789.0000",
            "123456789123456789",
            "1234567890000000000000000123456789",
        ] {
            round_trip(s);
        }
    }

    #[test]
    fn null_sentinel_decodes_to_none() {
        assert!(decode(null_raw(), true, 0).unwrap().is_none());
    }

    #[test]
    fn precision_routing_matches_spec_table() {
        assert!(matches!(type_for_precision(18, 8).unwrap(), TypeId::Fixed8));
        assert!(matches!(type_for_precision(19, 8).unwrap(), TypeId::Fixed12));
        assert!(matches!(type_for_precision(28, 8).unwrap(), TypeId::Fixed12));
        assert!(matches!(type_for_precision(29, 8).unwrap(), TypeId::Fixed16));
        assert!(type_for_precision(38, 7).is_err());
    }
}
