//! `TopologyInformation` (§6): one line per known node in the HANA landscape, used by
//! callers that want to pick a preferred host/port for a follow-up connection. This
//! engine does not act on topology itself — opening a follow-up connection is left to
//! the caller.

use crate::protocol::parts::multiline_option_part::MultilineOptionPart;
use crate::protocol::parts::option_part::OptionId;

pub(crate) type Topology = MultilineOptionPart<TopologyAttrId>;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum TopologyAttrId {
    HostName,
    HostPortNumber,
    TenantName,
    LoadFactor,
    VolumeId,
    IsMaster,
    IsCurrentSession,
    ServiceType,
    IsStandby,
    SiteType,
    __Unexpected__(u8),
}

impl OptionId<TopologyAttrId> for TopologyAttrId {
    fn to_u8(&self) -> u8 {
        match *self {
            Self::HostName => 1,
            Self::HostPortNumber => 2,
            Self::TenantName => 3,
            Self::LoadFactor => 4,
            Self::VolumeId => 5,
            Self::IsMaster => 6,
            Self::IsCurrentSession => 7,
            Self::ServiceType => 8,
            Self::IsStandby => 10,
            Self::SiteType => 13,
            Self::__Unexpected__(i) => i,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::HostName,
            2 => Self::HostPortNumber,
            3 => Self::TenantName,
            4 => Self::LoadFactor,
            5 => Self::VolumeId,
            6 => Self::IsMaster,
            7 => Self::IsCurrentSession,
            8 => Self::ServiceType,
            10 => Self::IsStandby,
            13 => Self::SiteType,
            val => {
                warn!("Invalid value for TopologyAttrId received: {val}");
                Self::__Unexpected__(val)
            }
        }
    }

    fn part_name(&self) -> &'static str {
        "Topology"
    }
}
