//! A repeated [`OptionPart`], one line per described topology node (§6). Used only by
//! [`crate::protocol::parts::topology::Topology`].

use crate::error::HdbResult;
use crate::protocol::parts::option_part::{OptionId, OptionPart};
use byteorder::{LittleEndian, ReadBytesExt};
use std::{fmt::Debug, hash::Hash};

#[derive(Debug)]
pub(crate) struct MultilineOptionPart<T: OptionId<T> + Debug + Eq + PartialEq + Hash>(Vec<OptionPart<T>>);

impl<T: OptionId<T> + Debug + Eq + PartialEq + Hash> MultilineOptionPart<T> {
    pub(crate) fn parse(no_of_lines: usize, rdr: &mut dyn std::io::Read) -> HdbResult<Self> {
        let mut lines = Vec::with_capacity(no_of_lines);
        for _ in 0..no_of_lines {
            let field_count = rdr.read_u16::<LittleEndian>()? as usize;
            lines.push(OptionPart::<T>::parse(field_count, rdr)?);
        }
        Ok(Self(lines))
    }

    pub(crate) fn lines(&self) -> &[OptionPart<T>] {
        &self.0
    }
}
