//! `ResultSetMetadata` (§6): one [`FieldMetadata`] per column, with column/table/schema
//! names stored once in a shared name table and referenced by offset (the wire format
//! avoids repeating identical schema/table names across columns).

use crate::codec::cesu8_to_utf8;
use crate::codec::Cesu8DecodePolicy;
use crate::error::HdbResult;
use crate::types::TypeId;
use byteorder::{LittleEndian, ReadBytesExt};
use std::sync::Arc;
use vec_map::VecMap;

const NO_NAME: u32 = 0xFFFF_FFFF;

/// Metadata for a single result-set column (§3 `PrepareResult`).
#[derive(Clone, Debug)]
pub struct FieldMetadata {
    schemaname_idx: u32,
    tablename_idx: u32,
    columnname_idx: u32,
    displayname_idx: u32,
    column_options: u8,
    type_id: TypeId,
    scale: i16,
    precision: i16,
    names: Arc<VecMap<String>>,
}

impl FieldMetadata {
    fn name_at(&self, idx: u32) -> &str {
        if idx == NO_NAME {
            return "";
        }
        self.names.get(idx as usize).map_or("", String::as_str)
    }

    /// Database schema of the field.
    pub fn schemaname(&self) -> &str {
        self.name_at(self.schemaname_idx)
    }

    /// Database table of the field.
    pub fn tablename(&self) -> &str {
        self.name_at(self.tablename_idx)
    }

    /// Column name.
    pub fn columnname(&self) -> &str {
        self.name_at(self.columnname_idx)
    }

    /// Display name.
    pub fn displayname(&self) -> &str {
        self.name_at(self.displayname_idx)
    }

    /// The column's wire type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub(crate) fn is_lob(&self) -> bool {
        self.type_id.is_lob()
    }

    /// True if the column can contain NULL values.
    pub fn is_nullable(&self) -> bool {
        self.column_options & 0b0000_0010 != 0
    }

    /// Length or precision of the value; `-1` for LOB types.
    pub fn precision(&self) -> i16 {
        self.precision
    }

    /// Scale of the value; `0` where a scale doesn't apply.
    pub fn scale(&self) -> i16 {
        self.scale
    }
}

/// The full set of column descriptions for a query's result set (§3 `PrepareResult`).
#[derive(Clone, Debug, Default)]
pub struct ResultSetMetadata(Vec<FieldMetadata>);

impl ResultSetMetadata {
    /// The contained field descriptions, in column order.
    pub fn fields(&self) -> &[FieldMetadata] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn parse(count: usize, argument_count: usize, rdr: &mut dyn std::io::Read) -> HdbResult<Self> {
        struct Raw {
            column_options: u8,
            type_code: u8,
            scale: i16,
            precision: i16,
            schemaname_idx: u32,
            tablename_idx: u32,
            columnname_idx: u32,
            displayname_idx: u32,
        }

        let mut raws = Vec::with_capacity(count);
        for _ in 0..count {
            let column_options = rdr.read_u8()?;
            let type_code = rdr.read_u8()?;
            let scale = rdr.read_i16::<LittleEndian>()?;
            let precision = rdr.read_i16::<LittleEndian>()?;
            let _filler = rdr.read_u16::<LittleEndian>()?;
            let tablename_idx = rdr.read_u32::<LittleEndian>()?;
            let schemaname_idx = rdr.read_u32::<LittleEndian>()?;
            let columnname_idx = rdr.read_u32::<LittleEndian>()?;
            let displayname_idx = rdr.read_u32::<LittleEndian>()?;
            raws.push(Raw {
                column_options,
                type_code,
                scale,
                precision,
                schemaname_idx,
                tablename_idx,
                columnname_idx,
                displayname_idx,
            });
        }

        // The name table that follows is shared across all columns; `argument_count` is
        // the distinct-name count the server announced, not the column count.
        let mut offset_to_name = VecMap::new();
        let mut seen_offsets: Vec<u32> = raws
            .iter()
            .flat_map(|r| {
                [
                    r.schemaname_idx,
                    r.tablename_idx,
                    r.columnname_idx,
                    r.displayname_idx,
                ]
            })
            .filter(|o| *o != NO_NAME)
            .collect();
        seen_offsets.sort_unstable();
        seen_offsets.dedup();
        let _ = argument_count;
        for offset in seen_offsets {
            let len = rdr.read_u8()?;
            let raw = crate::protocol::util::read_bytes(len as usize, rdr)?;
            let name = cesu8_to_utf8(&raw, Cesu8DecodePolicy::Replace)?;
            offset_to_name.insert(offset as usize, name);
        }
        let names = Arc::new(offset_to_name);

        let fields = raws
            .into_iter()
            .map(|r| -> HdbResult<FieldMetadata> {
                Ok(FieldMetadata {
                    schemaname_idx: r.schemaname_idx,
                    tablename_idx: r.tablename_idx,
                    columnname_idx: r.columnname_idx,
                    displayname_idx: r.displayname_idx,
                    column_options: r.column_options,
                    type_id: TypeId::try_new(r.type_code & 0x7F)?,
                    scale: r.scale,
                    precision: r.precision,
                    names: Arc::clone(&names),
                })
            })
            .collect::<HdbResult<Vec<_>>>()?;
        Ok(Self(fields))
    }
}
