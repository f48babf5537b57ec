//! `TransactionFlags` (§6): server-pushed transaction-state notifications, sent after
//! almost every reply so the client never has to infer transaction state from statement
//! text. No sibling file for this part existed in the reference tree this module was
//! grounded on; the option-id table below is reconstructed from the flag names a
//! [`crate::session::Session`] actually reacts to.

use crate::protocol::parts::option_part::{OptionId, OptionPart};

pub(crate) type TransactionFlags = OptionPart<TaFlagId>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) enum TaFlagId {
    RolledBack,            // 0 // BOOLEAN
    Committed,             // 1 // BOOLEAN
    NewIsolationLevel,     // 2 // INT
    DdlCommitModeChanged,  // 3 // BOOLEAN
    WriteTaStarted,        // 4 // BOOLEAN
    NoWriteTaStarted,      // 5 // BOOLEAN
    SessionClosingTaError, // 6 // BOOLEAN
    ReadOnlyMode,          // 7 // BOOLEAN
    __Unexpected__(u8),
}

impl OptionId<TaFlagId> for TaFlagId {
    fn to_u8(&self) -> u8 {
        match *self {
            Self::RolledBack => 0,
            Self::Committed => 1,
            Self::NewIsolationLevel => 2,
            Self::DdlCommitModeChanged => 3,
            Self::WriteTaStarted => 4,
            Self::NoWriteTaStarted => 5,
            Self::SessionClosingTaError => 6,
            Self::ReadOnlyMode => 7,
            Self::__Unexpected__(val) => val,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            0 => Self::RolledBack,
            1 => Self::Committed,
            2 => Self::NewIsolationLevel,
            3 => Self::DdlCommitModeChanged,
            4 => Self::WriteTaStarted,
            5 => Self::NoWriteTaStarted,
            6 => Self::SessionClosingTaError,
            7 => Self::ReadOnlyMode,
            val => {
                warn!("Unsupported value for TaFlagId received: {val}");
                Self::__Unexpected__(val)
            }
        }
    }

    fn part_name(&self) -> &'static str {
        "TransactionFlags"
    }
}

/// Transaction state derived from a stream of [`TransactionFlags`] parts (§4.7).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionState {
    Initial,
    RolledBack,
    Committed,
    ReadTransaction,
    WriteTransaction,
}

/// Session-wide bookkeeping updated from every `TransactionFlags` part the server sends.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SessionState {
    pub ta_state: TransactionState,
    pub isolation_level: u8,
    pub ddl_commit_mode: bool,
    pub read_only_mode: bool,
    pub dead: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            ta_state: TransactionState::Initial,
            isolation_level: 0,
            ddl_commit_mode: true,
            read_only_mode: false,
            dead: false,
        }
    }
}

impl SessionState {
    pub(crate) fn update(&mut self, transaction_flags: TransactionFlags) {
        use crate::protocol::parts::option_value::OptionValue;

        for (id, value) in transaction_flags {
            match (id, value) {
                (TaFlagId::RolledBack, OptionValue::Boolean(true)) => {
                    self.ta_state = TransactionState::RolledBack;
                }
                (TaFlagId::Committed, OptionValue::Boolean(true)) => {
                    self.ta_state = TransactionState::Committed;
                }
                (TaFlagId::WriteTaStarted, OptionValue::Boolean(true)) => {
                    self.ta_state = TransactionState::WriteTransaction;
                }
                (TaFlagId::NoWriteTaStarted, OptionValue::Boolean(true)) => {
                    self.ta_state = TransactionState::ReadTransaction;
                }
                (TaFlagId::NewIsolationLevel, OptionValue::Int(i)) => {
                    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                    {
                        self.isolation_level = i as u8;
                    }
                }
                (TaFlagId::SessionClosingTaError, OptionValue::Boolean(b)) => self.dead = b,
                (TaFlagId::DdlCommitModeChanged, OptionValue::Boolean(b)) => self.ddl_commit_mode = b,
                (TaFlagId::ReadOnlyMode, OptionValue::Boolean(b)) => self.read_only_mode = b,
                (id, value) => {
                    warn!("unexpected transaction flag ignored: {id:?} = {value:?}");
                }
            }
        }
    }
}
