//! `WriteLobReply` (§4.6): locator ids the server still has open after a `WriteLobRequest`
//! batch, one per LOB column that hasn't yet received its final chunk.

use crate::error::HdbResult;
use byteorder::{LittleEndian, ReadBytesExt};

#[derive(Debug)]
pub struct WriteLobReply {
    locator_ids: Vec<u64>,
}

impl WriteLobReply {
    pub(crate) fn parse(count: usize, rdr: &mut dyn std::io::Read) -> HdbResult<Self> {
        let mut locator_ids = Vec::with_capacity(count);
        for _ in 0..count {
            locator_ids.push(rdr.read_u64::<LittleEndian>()?);
        }
        Ok(Self { locator_ids })
    }

    pub(crate) fn into_locator_ids(self) -> Vec<u64> {
        self.locator_ids
    }
}
