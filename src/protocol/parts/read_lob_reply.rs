//! `ReadLobReply` (§4.6): one chunk of LOB data returned in response to a `ReadLobRequest`.

use crate::error::HdbResult;
use byteorder::{LittleEndian, ReadBytesExt};

const LAST_DATA: u8 = 0b100;

#[derive(Debug)]
pub struct ReadLobReply {
    locator_id: u64,
    is_last_data: bool,
    data: Vec<u8>,
}

impl ReadLobReply {
    pub(crate) fn parse(rdr: &mut dyn std::io::Read) -> HdbResult<Self> {
        let locator_id = rdr.read_u64::<LittleEndian>()?;
        let options = rdr.read_u8()?;
        let is_last_data = (options & LAST_DATA) != 0;
        let chunk_length = rdr.read_i32::<LittleEndian>()?;
        let mut filler = [0_u8; 3];
        rdr.read_exact(&mut filler)?;

        #[allow(clippy::cast_sign_loss)]
        let mut data = vec![0_u8; chunk_length as usize];
        rdr.read_exact(&mut data)?;

        Ok(Self {
            locator_id,
            is_last_data,
            data,
        })
    }

    pub(crate) fn locator_id(&self) -> u64 {
        self.locator_id
    }

    pub(crate) fn into_data_and_last(self) -> (Vec<u8>, bool) {
        (self.data, self.is_last_data)
    }
}
