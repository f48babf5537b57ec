//! `ParameterMetadata` (§3 `PrepareResult`, §6): describes the IN/INOUT/OUT parameters of
//! a prepared statement or stored-procedure call.

use crate::error::HdbResult;
use crate::protocol::util;
use crate::types::TypeId;
use byteorder::{LittleEndian, ReadBytesExt};

/// Direction of a single parameter in a `CALL` or parameterized statement.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParameterDirection {
    In,
    InOut,
    Out,
}

impl ParameterDirection {
    fn from_u8(raw: u8) -> HdbResult<Self> {
        // bit 3 = in, bit 2 = out (both set => inout)
        match (raw & 0b0000_1000 != 0, raw & 0b0000_0100 != 0) {
            (true, true) => Ok(Self::InOut),
            (true, false) => Ok(Self::In),
            (false, true) => Ok(Self::Out),
            (false, false) => Ok(Self::In),
        }
    }
}

/// Whether a parameter admits NULL or has a server-side default.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParameterBinding {
    Mandatory,
    Optional,
    HasDefault,
}

/// Describes one parameter of a prepared statement (§3 `PrepareResult`).
#[derive(Clone, Debug)]
pub struct ParameterDescriptor {
    name: Option<String>,
    type_id: TypeId,
    binding: ParameterBinding,
    direction: ParameterDirection,
    scale: i16,
    precision: i16,
}

impl ParameterDescriptor {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn binding(&self) -> ParameterBinding {
        self.binding
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self.binding, ParameterBinding::Optional)
    }

    pub fn direction(&self) -> ParameterDirection {
        self.direction
    }

    pub fn scale(&self) -> i16 {
        self.scale
    }

    pub fn precision(&self) -> i16 {
        self.precision
    }

    fn binding_from_u8(raw: u8) -> ParameterBinding {
        if raw & 0b0000_0010 != 0 {
            ParameterBinding::Optional
        } else if raw & 0b0000_0100 != 0 {
            ParameterBinding::HasDefault
        } else {
            ParameterBinding::Mandatory
        }
    }
}

/// The full set of IN/INOUT/OUT parameter descriptions for a prepared statement (§3
/// `PrepareResult`).
#[derive(Clone, Debug, Default)]
pub struct ParameterDescriptors(Vec<ParameterDescriptor>);

impl ParameterDescriptors {
    pub fn iter_in(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.0
            .iter()
            .filter(|p| matches!(p.direction, ParameterDirection::In | ParameterDirection::InOut))
    }

    pub fn iter_out(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.0
            .iter()
            .filter(|p| matches!(p.direction, ParameterDirection::Out | ParameterDirection::InOut))
    }

    pub fn has_in(&self) -> bool {
        self.iter_in().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn parse(count: usize, rdr: &mut dyn std::io::Read) -> HdbResult<Self> {
        let mut descriptors = Vec::with_capacity(count);
        let mut name_offsets = Vec::with_capacity(count);
        for _ in 0..count {
            let option = rdr.read_u8()?;
            let type_code = rdr.read_u8()?;
            let mode = rdr.read_u8()?;
            let _reserved = rdr.read_u8()?;
            name_offsets.push(rdr.read_u32::<LittleEndian>()?);
            let precision = rdr.read_i16::<LittleEndian>()?;
            let scale = rdr.read_i16::<LittleEndian>()?;
            let _reserved2 = rdr.read_u32::<LittleEndian>()?;
            descriptors.push(ParameterDescriptor {
                name: None,
                type_id: TypeId::try_new(type_code & 0x7F)?,
                binding: ParameterDescriptor::binding_from_u8(option),
                direction: ParameterDirection::from_u8(mode)?,
                scale,
                precision,
            });
        }
        for (descriptor, offset) in descriptors.iter_mut().zip(name_offsets.iter()) {
            if *offset != 0xFFFF_FFFF {
                let len = rdr.read_u8()?;
                let raw = util::read_bytes(len as usize, rdr)?;
                descriptor.name = Some(util::string_from_cesu8(raw)?);
            }
        }
        Ok(Self(descriptors))
    }
}

impl std::ops::Index<usize> for ParameterDescriptors {
    type Output = ParameterDescriptor;
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
