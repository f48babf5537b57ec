//! `ResultSet` row chunk (§4.2, §4.6): a batch of rows belonging to a query's result set,
//! as carried by one `ResultSet` part. The server sends rows in whatever batch size it
//! chooses; `attributes` on the enclosing part tells the caller whether more batches can
//! be fetched.

use crate::error::HdbResult;
use crate::protocol::parts::field_metadata::ResultSetMetadata;
use crate::protocol::parts::hdb_value::HdbValue;

/// One row of column values, positioned per [`ResultSetMetadata`].
#[derive(Clone, Debug, Default)]
pub struct Row(Vec<HdbValue>);

impl Row {
    pub fn values(&self) -> &[HdbValue] {
        &self.0
    }

    pub fn into_values(self) -> Vec<HdbValue> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::ops::Index<usize> for Row {
    type Output = HdbValue;
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Parses `row_count` rows from the wire, one column at a time per `metadata`.
pub(crate) fn parse_rows(
    row_count: usize,
    metadata: &ResultSetMetadata,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<Vec<Row>> {
    let mut rows = Vec::with_capacity(row_count);
    for _ in 0..row_count {
        let mut values = Vec::with_capacity(metadata.len());
        for field in metadata.fields() {
            values.push(HdbValue::decode(field.type_id(), field.is_nullable(), rdr)?);
        }
        rows.push(Row(values));
    }
    Ok(rows)
}
