//! `Parameters` (§4.2, §6): one or more rows of IN/INOUT parameter values sent with an
//! `Exec`/`Call` request. Bulk `Exec` sends `N` rows back to back with no row framing
//! beyond the parameter count itself, which the caller already knows from the descriptor.

use crate::error::HdbResult;
use crate::protocol::parts::hdb_value::HdbValue;
use crate::protocol::parts::parameter_descriptor::ParameterDescriptors;

/// The full set of parameter rows for one `Exec`/`Call` request.
#[derive(Clone, Debug, Default)]
pub struct ParameterRows(Vec<Vec<HdbValue>>);

impl ParameterRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one row; `values` must align positionally with the IN/INOUT parameters of
    /// [`ParameterDescriptors`].
    pub fn push_row(&mut self, values: Vec<HdbValue>) {
        self.0.push(values);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn size(&self) -> usize {
        self.0.iter().flatten().map(HdbValue::prm_size).sum()
    }

    pub(crate) fn emit(&self, descriptors: &ParameterDescriptors, w: &mut dyn std::io::Write) -> HdbResult<()> {
        for row in &self.0 {
            for (value, descriptor) in row.iter().zip(descriptors.iter_in()) {
                value.encode(descriptor.type_id(), w)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeId;

    #[test]
    fn size_sums_every_value_in_every_row() {
        let mut rows = ParameterRows::new();
        rows.push_row(vec![HdbValue::Int(1), HdbValue::Null]);
        rows.push_row(vec![HdbValue::Int(2), HdbValue::Null]);
        // two rows, each (Int: 1 type byte + 4) + (Null: 1 type byte + 0) = 10 per row
        assert_eq!(rows.size(), 10);
        let _ = TypeId::Int;
    }
}
