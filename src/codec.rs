//! Little-endian wire primitives and the CESU-8 &lt;-&gt; UTF-8 transform.

use crate::error::{HdbError, HdbResult};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Minimum size, in bytes, that reader/writer buffers around a [`crate::conn::Transport`]
/// are expected to hold before the writer is forced to flush.
pub const MIN_BUFFER_SIZE: usize = 4096;

pub(crate) const MAX_1_BYTE_LENGTH: u8 = 245;
const LENGTH_INDICATOR_2BYTE: u8 = 246;
const LENGTH_INDICATOR_4BYTE: u8 = 247;
pub(crate) const LENGTH_INDICATOR_NULL: u8 = 255;

/// Writes a variable-length byte-string length indicator per §4.1: 0-245 direct,
/// 246 + i16 for larger lengths, 247 + i32 beyond that.
#[allow(clippy::cast_possible_truncation)]
pub fn emit_length_indicator(len: usize, w: &mut dyn std::io::Write) -> HdbResult<()> {
    match len {
        l if l <= MAX_1_BYTE_LENGTH as usize => w.write_u8(l as u8)?,
        l if l <= 0xFFFF => {
            w.write_u8(LENGTH_INDICATOR_2BYTE)?;
            w.write_u16::<LittleEndian>(l as u16)?;
        }
        l if l <= 0xFFFF_FFFF => {
            w.write_u8(LENGTH_INDICATOR_4BYTE)?;
            w.write_u32::<LittleEndian>(l as u32)?;
        }
        l => return Err(HdbError::protocol(format!("length indicator too large: {l}"))),
    }
    Ok(())
}

/// Writes the length-indicator NULL byte (255) alone, with no following length or payload.
pub fn emit_length_indicator_null(w: &mut dyn std::io::Write) -> HdbResult<()> {
    w.write_u8(LENGTH_INDICATOR_NULL)?;
    Ok(())
}

/// Parses a length indicator whose first byte has already been read. Any indicator byte
/// other than a direct length, 246, 247, or 255 (NULL) is a protocol error.
pub fn parse_length_indicator(first_byte: u8, rdr: &mut dyn std::io::Read) -> HdbResult<Option<usize>> {
    match first_byte {
        0..=MAX_1_BYTE_LENGTH => Ok(Some(first_byte as usize)),
        LENGTH_INDICATOR_2BYTE => Ok(Some(rdr.read_u16::<LittleEndian>()? as usize)),
        LENGTH_INDICATOR_4BYTE => Ok(Some(rdr.read_u32::<LittleEndian>()? as usize)),
        LENGTH_INDICATOR_NULL => Ok(None),
        other => Err(HdbError::protocol(format!(
            "unknown length indicator byte: {other}"
        ))),
    }
}

/// How a CESU-8 decoder should react to an invalid byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cesu8DecodePolicy {
    /// Fail the decode; the caller gets the raw bytes back inside the error.
    Strict,
    /// Emit `U+FFFD` for the invalid sequence and keep decoding.
    Replace,
}

impl Default for Cesu8DecodePolicy {
    fn default() -> Self {
        Self::Strict
    }
}

/// Encodes a UTF-8 string to CESU-8 (supplementary code points become two three-byte
/// surrogate-encoded sequences).
pub fn utf8_to_cesu8(s: &str) -> Vec<u8> {
    cesu8::to_cesu8(s).into_owned()
}

/// Length, in CESU-8 bytes, that `utf8_to_cesu8` would produce for `s`, without allocating.
pub fn cesu8_length(s: &str) -> usize {
    let mut len = s.len();
    for b in s.as_bytes() {
        if *b >= 0xF0 {
            // a 4-byte utf-8 lead byte becomes a 6-byte cesu-8 surrogate pair
            len += 2;
        }
    }
    len
}

/// Decodes a full, self-contained CESU-8 byte buffer to a `String`, applying `policy` to any
/// invalid sequence.
pub fn cesu8_to_utf8(bytes: &[u8], policy: Cesu8DecodePolicy) -> HdbResult<String> {
    // CESU-8 is a strict superset of UTF-8 for anything other than supplementary code
    // points, so try the cheap path first.
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        Err(_) => match cesu8::from_cesu8(bytes) {
            Ok(cow) => Ok(cow.into_owned()),
            Err(_) => match policy {
                Cesu8DecodePolicy::Strict => Err(HdbError::Cesu8 {
                    bytes: bytes.to_vec(),
                }),
                Cesu8DecodePolicy::Replace => Ok(replace_invalid_cesu8(bytes)),
            },
        },
    }
}

/// Best-effort CESU-8 decode that walks the buffer one (possibly multi-byte) unit at a time,
/// emitting `U+FFFD` for anything it cannot interpret. Used by [`cesu8_to_utf8`]'s `Replace`
/// policy and by the char-LOB streaming transform (§4.6) on chunk boundaries.
pub(crate) fn replace_invalid_cesu8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i];
        let remaining = bytes.len() - i;
        // A CESU-8 surrogate half is a 3-byte unit (ED, A0-BF, 80-BF). A valid
        // supplementary code point is two such units (a high half then a low half); a
        // half with no matching partner is an orphan and gets collapsed, together with
        // the byte that was inspected while looking for its partner, into one U+FFFD.
        if b0 == 0xED && remaining >= 3 && (0xA0..=0xBF).contains(&bytes[i + 1]) && (0x80..=0xBF).contains(&bytes[i + 2]) {
            if remaining >= 6 {
                if let Ok(s) = cesu8::from_cesu8(&bytes[i..i + 6]) {
                    out.push_str(&s);
                    i += 6;
                    continue;
                }
            }
            out.push('\u{FFFD}');
            i += if remaining >= 4 { 4 } else { 3 };
            continue;
        }
        let char_len = utf8_lead_len(b0);
        if char_len <= remaining {
            if let Ok(s) = std::str::from_utf8(&bytes[i..i + char_len]) {
                out.push_str(s);
                i += char_len;
                continue;
            }
        }
        out.push('\u{FFFD}');
        i += 1;
    }
    out
}

fn utf8_lead_len(b: u8) -> usize {
    if b < 0x80 {
        1
    } else if b & 0xE0 == 0xC0 {
        2
    } else if b & 0xF0 == 0xE0 {
        3
    } else if b & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_indicator_round_trips_at_boundaries() {
        for len in [0usize, 1, 245, 246, 247, 32767, 32768, 65535, 65536, 1 << 20] {
            let mut buf = Vec::new();
            emit_length_indicator(len, &mut buf).unwrap();
            let mut rdr = &buf[1..];
            let first = buf[0];
            let parsed = parse_length_indicator(first, &mut rdr).unwrap();
            assert_eq!(parsed, Some(len), "length {len} round-trip");
        }
    }

    #[test]
    fn null_indicator_parses_to_none() {
        let mut rdr: &[u8] = &[];
        assert_eq!(parse_length_indicator(255, &mut rdr).unwrap(), None);
    }

    #[test]
    fn cesu8_round_trip_for_supplementary_code_points() {
        let s = "a\u{1F600}b";
        let encoded = utf8_to_cesu8(s);
        assert_eq!(encoded.len(), s.len() + 2);
        let decoded = cesu8_to_utf8(&encoded, Cesu8DecodePolicy::Strict).unwrap();
        assert_eq!(decoded, s);
    }

    #[test]
    fn replace_policy_substitutes_invalid_surrogate() {
        // from spec §8 scenario 4
        let input = [
            0x2b, 0x30, 0x1c, 0x39, 0xed, 0xa2, 0xa8, 0x11, 0x32, 0x30, 0x60, 0x33,
        ];
        let decoded = cesu8_to_utf8(&input, Cesu8DecodePolicy::Replace).unwrap();
        let expected_bytes = [
            0x2b, 0x30, 0x1c, 0x39, 0xef, 0xbf, 0xbd, 0x32, 0x30, 0x60, 0x33,
        ];
        assert_eq!(decoded.as_bytes(), &expected_bytes);
    }
}
