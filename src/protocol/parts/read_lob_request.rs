//! `ReadLobRequest` (§4.6): asks the server for the next chunk of a LOB, by locator.

use crate::error::HdbResult;
use byteorder::{LittleEndian, WriteBytesExt};

#[derive(Debug)]
pub struct ReadLobRequest {
    locator_id: u64,
    offset: u64,
    length: u32,
}

impl ReadLobRequest {
    pub(crate) fn new(locator_id: u64, offset: u64, length: u32) -> Self {
        Self {
            locator_id,
            offset,
            length,
        }
    }

    pub(crate) fn size() -> usize {
        24
    }

    pub(crate) fn emit(&self, w: &mut dyn std::io::Write) -> HdbResult<()> {
        w.write_u64::<LittleEndian>(self.locator_id)?;
        w.write_u64::<LittleEndian>(self.offset)?;
        w.write_u32::<LittleEndian>(self.length)?;
        w.write_u32::<LittleEndian>(0)?; // filler
        Ok(())
    }
}
