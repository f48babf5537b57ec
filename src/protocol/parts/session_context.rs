//! `SessionContext` (§6): distinguishes a primary connection from a secondary one opened
//! for the same logical session (e.g. for parallel result-set fetch).

use crate::protocol::parts::option_part::{OptionId, OptionPart};

pub(crate) type SessionContext = OptionPart<SessionContextId>;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum SessionContextId {
    PrimaryConnectionId,
    PrimaryHostname,
    PrimaryHostPortNumber,
    MasterConnectionId,
    MasterHostname,
    MasterHostPortNumber,
    __Unexpected__(u8),
}

impl OptionId<SessionContextId> for SessionContextId {
    fn to_u8(&self) -> u8 {
        match *self {
            Self::PrimaryConnectionId => 1,
            Self::PrimaryHostname => 2,
            Self::PrimaryHostPortNumber => 3,
            Self::MasterConnectionId => 4,
            Self::MasterHostname => 5,
            Self::MasterHostPortNumber => 6,
            Self::__Unexpected__(val) => val,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::PrimaryConnectionId,
            2 => Self::PrimaryHostname,
            3 => Self::PrimaryHostPortNumber,
            4 => Self::MasterConnectionId,
            5 => Self::MasterHostname,
            6 => Self::MasterHostPortNumber,
            val => {
                warn!("Unsupported value for SessionContextId received: {val}");
                Self::__Unexpected__(val)
            }
        }
    }

    fn part_name(&self) -> &'static str {
        "SessionContext"
    }
}
