//! `StatementContext` (§6): server-reported bookkeeping attached to a command reply —
//! statement sequence info (used to pipeline multiple statements within one transaction),
//! and optional server-side timing/memory counters.

use crate::protocol::parts::option_part::{OptionId, OptionPart};
use crate::protocol::parts::option_value::OptionValue;
use std::{convert::TryInto, time::Duration};

pub(crate) type StatementContext = OptionPart<StatementContextId>;

impl StatementContext {
    pub(crate) fn statement_sequence_info(&self) -> Option<i64> {
        match self.get(&StatementContextId::StatementSequenceInfo) {
            Ok(OptionValue::BigInt(value)) => Some(*value),
            _ => None,
        }
    }

    pub(crate) fn set_statement_sequence_info(&mut self, value: i64) {
        self.insert(
            StatementContextId::StatementSequenceInfo,
            OptionValue::BigInt(value),
        );
    }

    pub(crate) fn server_processing_time(&self) -> Option<Duration> {
        match self.get(&StatementContextId::ServerProcessingTime) {
            Ok(OptionValue::BigInt(value)) => Some(Duration::from_micros((*value).try_into().unwrap_or(0))),
            _ => None,
        }
    }

    pub(crate) fn server_cpu_time(&self) -> Option<Duration> {
        match self.get(&StatementContextId::ServerCpuTime) {
            Ok(OptionValue::BigInt(value)) => Some(Duration::from_micros((*value).try_into().unwrap_or(0))),
            _ => None,
        }
    }

    pub(crate) fn server_memory_usage(&self) -> Option<u64> {
        match self.get(&StatementContextId::ServerMemoryUsage) {
            Ok(OptionValue::BigInt(value)) => Some((*value).try_into().unwrap_or(0)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum StatementContextId {
    StatementSequenceInfo,
    ServerProcessingTime,
    SchemaName,
    FlagSet,
    QueryTimeout,
    ClientReconnectionWaitTimeout,
    ServerCpuTime,
    ServerMemoryUsage,
    __Unexpected__(u8),
}

impl OptionId<StatementContextId> for StatementContextId {
    fn to_u8(&self) -> u8 {
        match *self {
            Self::StatementSequenceInfo => 1,
            Self::ServerProcessingTime => 2,
            Self::SchemaName => 3,
            Self::FlagSet => 4,
            Self::QueryTimeout => 5,
            Self::ClientReconnectionWaitTimeout => 6,
            Self::ServerCpuTime => 7,
            Self::ServerMemoryUsage => 8,
            Self::__Unexpected__(val) => val,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::StatementSequenceInfo,
            2 => Self::ServerProcessingTime,
            3 => Self::SchemaName,
            4 => Self::FlagSet,
            5 => Self::QueryTimeout,
            6 => Self::ClientReconnectionWaitTimeout,
            7 => Self::ServerCpuTime,
            8 => Self::ServerMemoryUsage,
            val => {
                warn!("Unsupported value for StatementContextId received: {val}");
                Self::__Unexpected__(val)
            }
        }
    }

    fn part_name(&self) -> &'static str {
        "StatementContext"
    }
}
