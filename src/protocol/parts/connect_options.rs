//! `ConnectOptions` (§6): the option list exchanged right after authentication to settle
//! on a data-format version, locale, and a handful of feature flags the session cares about.

use crate::protocol::parts::option_part::{OptionId, OptionPart};
use crate::protocol::parts::option_value::OptionValue;

pub(crate) type ConnectOptions = OptionPart<ConnectOptionId>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) enum ConnectOptionId {
    ConnectionId,
    CompleteArrayExecution,
    ClientLocale,
    SupportsLargeBulkOperations,
    DistributionEnabled,
    DataFormatVersion2,
    SelectForUpdateSupported,
    ClientDistributionMode,
    EngineDataFormatVersion2,
    ClientInfoNullValueSupport,
    SplitBatchCommands,
    UseDistribution,
    RowSlotImageParameter,
    OsUser,
    __Unexpected__(u8),
}

impl OptionId<ConnectOptionId> for ConnectOptionId {
    fn to_u8(&self) -> u8 {
        match *self {
            Self::ConnectionId => 1,
            Self::CompleteArrayExecution => 2,
            Self::ClientLocale => 3,
            Self::SupportsLargeBulkOperations => 4,
            Self::DistributionEnabled => 5,
            Self::DataFormatVersion2 => 12,
            Self::SelectForUpdateSupported => 14,
            Self::ClientDistributionMode => 15,
            Self::EngineDataFormatVersion2 => 23,
            Self::ClientInfoNullValueSupport => 30,
            Self::SplitBatchCommands => 26,
            Self::UseDistribution => 13,
            Self::RowSlotImageParameter => 33,
            Self::OsUser => 46,
            Self::__Unexpected__(v) => v,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::ConnectionId,
            2 => Self::CompleteArrayExecution,
            3 => Self::ClientLocale,
            4 => Self::SupportsLargeBulkOperations,
            5 => Self::DistributionEnabled,
            12 => Self::DataFormatVersion2,
            13 => Self::UseDistribution,
            14 => Self::SelectForUpdateSupported,
            15 => Self::ClientDistributionMode,
            23 => Self::EngineDataFormatVersion2,
            26 => Self::SplitBatchCommands,
            30 => Self::ClientInfoNullValueSupport,
            33 => Self::RowSlotImageParameter,
            46 => Self::OsUser,
            val => {
                warn!("Unsupported value for ConnectOptionId received: {val}");
                Self::__Unexpected__(val)
            }
        }
    }

    fn part_name(&self) -> &'static str {
        "ConnectOptions"
    }
}

impl ConnectOptions {
    pub(crate) fn for_request(dfv: u8, locale: Option<&str>) -> Self {
        let mut opts = Self::default();
        opts.insert(ConnectOptionId::DataFormatVersion2, OptionValue::Int(i32::from(dfv)));
        opts.insert(ConnectOptionId::CompleteArrayExecution, OptionValue::Boolean(true));
        opts.insert(ConnectOptionId::ClientDistributionMode, OptionValue::Int(0));
        if let Some(locale) = locale {
            opts.insert(ConnectOptionId::ClientLocale, OptionValue::String(locale.to_string()));
        }
        opts
    }

    /// The data-format version the server actually granted, falling back to the value
    /// the client proposed if the server omitted the option.
    pub(crate) fn negotiated_dfv(&self, proposed: u8) -> u8 {
        match self.get_opt(&ConnectOptionId::DataFormatVersion2) {
            Some(OptionValue::Int(v)) => {
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                {
                    (*v).clamp(1, 255) as u8
                }
            }
            _ => proposed,
        }
    }
}
