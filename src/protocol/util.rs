//! Small shared helpers used across part parsers.

use crate::codec::{cesu8_to_utf8, Cesu8DecodePolicy};
use crate::error::HdbResult;

pub(crate) fn read_bytes(len: usize, rdr: &mut dyn std::io::Read) -> HdbResult<Vec<u8>> {
    let mut buf = vec![0_u8; len];
    rdr.read_exact(&mut buf)?;
    Ok(buf)
}

pub(crate) fn string_from_cesu8(bytes: Vec<u8>) -> HdbResult<String> {
    cesu8_to_utf8(&bytes, Cesu8DecodePolicy::Replace)
}
