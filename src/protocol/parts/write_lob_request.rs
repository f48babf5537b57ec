//! `WriteLobRequest` (§4.6): one chunk of LOB data sent to the server for a locator the
//! server handed out earlier, either while finishing an inbound parameter LOB or while
//! streaming a [`crate::lob`] write handle.

use crate::error::HdbResult;
use byteorder::{LittleEndian, WriteBytesExt};

const DATA_INCLUDED: u8 = 0b010;
const LAST_DATA: u8 = 0b100;

#[derive(Debug)]
pub struct WriteLobRequest<'a> {
    locator_id: u64,
    offset: i64,
    buf: &'a [u8],
    last_data: bool,
}

impl<'a> WriteLobRequest<'a> {
    pub(crate) fn new(locator_id: u64, offset: i64, buf: &'a [u8], last_data: bool) -> Self {
        Self {
            locator_id,
            offset,
            buf,
            last_data,
        }
    }

    pub(crate) fn size(&self) -> usize {
        21 + self.buf.len()
    }

    pub(crate) fn emit(&self, w: &mut dyn std::io::Write) -> HdbResult<()> {
        w.write_u64::<LittleEndian>(self.locator_id)?;
        let options = DATA_INCLUDED | if self.last_data { LAST_DATA } else { 0 };
        w.write_u8(options)?;
        w.write_i64::<LittleEndian>(self.offset)?;
        #[allow(clippy::cast_possible_truncation)]
        w.write_u32::<LittleEndian>(self.buf.len() as u32)?;
        w.write_all(self.buf)?;
        Ok(())
    }
}
