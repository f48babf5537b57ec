//! `AuthFields` (§4.4): a short list of length-prefixed byte fields carried inside the
//! `Authentication` part's payload (e.g. salt, server nonce, iteration count, proof).

use crate::error::HdbResult;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

const EXTENDED_LENGTH: u8 = 255;

#[derive(Clone, Debug, Default)]
pub(crate) struct AuthFields(Vec<Vec<u8>>);

impl AuthFields {
    pub(crate) fn new(fields: Vec<Vec<u8>>) -> Self {
        Self(fields)
    }

    pub(crate) fn push(&mut self, field: Vec<u8>) {
        self.0.push(field);
    }

    pub(crate) fn pop(&mut self) -> Option<Vec<u8>> {
        self.0.pop()
    }

    pub(crate) fn into_inner(self) -> Vec<Vec<u8>> {
        self.0
    }

    pub(crate) fn size(&self) -> usize {
        2 + self
            .0
            .iter()
            .map(|f| if f.len() < EXTENDED_LENGTH as usize { 1 + f.len() } else { 3 + f.len() })
            .sum::<usize>()
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn emit(&self, w: &mut dyn std::io::Write) -> HdbResult<()> {
        w.write_u16::<BigEndian>(self.0.len() as u16)?;
        for field in &self.0 {
            if field.len() < EXTENDED_LENGTH as usize {
                w.write_u8(field.len() as u8)?;
            } else {
                w.write_u8(EXTENDED_LENGTH)?;
                w.write_u16::<BigEndian>(field.len() as u16)?;
            }
            w.write_all(field)?;
        }
        Ok(())
    }

    pub(crate) fn parse(rdr: &mut dyn std::io::Read) -> HdbResult<Self> {
        let count = rdr.read_u16::<BigEndian>()?;
        let mut fields = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let first = rdr.read_u8()?;
            let len = if first == EXTENDED_LENGTH {
                rdr.read_u16::<BigEndian>()? as usize
            } else {
                first as usize
            };
            let mut buf = vec![0_u8; len];
            rdr.read_exact(&mut buf)?;
            fields.push(buf);
        }
        Ok(Self(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_mixed_length_fields() {
        let mut fields = AuthFields::default();
        fields.push(b"salt-16-bytes...".to_vec());
        fields.push(vec![7_u8; 300]);
        let mut buf = Vec::new();
        fields.emit(&mut buf).unwrap();
        let mut rdr = &buf[..];
        let parsed = AuthFields::parse(&mut rdr).unwrap().into_inner();
        assert_eq!(parsed[0], b"salt-16-bytes...".to_vec());
        assert_eq!(parsed[1].len(), 300);
    }
}
