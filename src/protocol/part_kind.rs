//! `PartKind` (§6): the one-byte tag identifying a part's payload.

use crate::error::{HdbError, HdbResult};

/// Identifies the payload carried by a [`crate::protocol::part::Part`] (§6, bit-exact
/// numeric values). `Authentication` and `ResultSetId` share wire tag 33 — the spec calls
/// this out explicitly as context-dependent (§6: "Authentication=33 (context-dependent)");
/// [`PartKind::try_new`] resolves it using whether the reply being parsed is an
/// authentication round.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PartKind {
    Command = 3,
    RowsAffected = 5,
    Error = 6,
    StatementId = 10,
    TransactionId = 11,
    RowsAffectedPerBatch = 12,
    ResultSet = 13,
    ResultSetMetadata = 14,
    TopologyInformation = 15,
    OutputParameters = 16,
    ParameterMetadata = 17,
    SessionContext = 21,
    ConnectOptions = 27,
    CommandInfo = 30,
    Parameters = 32,
    ResultSetId = 33,
    Authentication = 33,
    FetchSize = 34,
    ClientInfo = 35,
    ClientContext = 38,
    StatementContext = 39,
    ReadLobRequest = 40,
    ReadLobReply = 41,
    WriteLobRequest = 43,
    WriteLobReply = 44,
    TransactionFlags = 64,
}

impl PartKind {
    /// `during_auth` disambiguates wire tag 33, which the spec reuses for both
    /// `Authentication` (the two auth rounds) and `ResultSetId` (every later reply).
    pub(crate) fn try_new(id: i8, during_auth: bool) -> HdbResult<Self> {
        Ok(match id {
            3 => Self::Command,
            5 => Self::RowsAffected,
            6 => Self::Error,
            10 => Self::StatementId,
            11 => Self::TransactionId,
            12 => Self::RowsAffectedPerBatch,
            13 => Self::ResultSet,
            14 => Self::ResultSetMetadata,
            15 => Self::TopologyInformation,
            16 => Self::OutputParameters,
            17 => Self::ParameterMetadata,
            21 => Self::SessionContext,
            27 => Self::ConnectOptions,
            30 => Self::CommandInfo,
            32 => Self::Parameters,
            33 if during_auth => Self::Authentication,
            33 => Self::ResultSetId,
            34 => Self::FetchSize,
            35 => Self::ClientInfo,
            38 => Self::ClientContext,
            39 => Self::StatementContext,
            40 => Self::ReadLobRequest,
            41 => Self::ReadLobReply,
            43 => Self::WriteLobRequest,
            44 => Self::WriteLobReply,
            64 => Self::TransactionFlags,
            other => return Err(HdbError::protocol(format!("unknown part kind {other}"))),
        })
    }

    pub(crate) fn to_i8(self) -> i8 {
        self as i8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_spec_wire_table() {
        assert_eq!(PartKind::Command.to_i8(), 3);
        assert_eq!(PartKind::RowsAffected.to_i8(), 5);
        assert_eq!(PartKind::Error.to_i8(), 6);
        assert_eq!(PartKind::StatementId.to_i8(), 10);
        assert_eq!(PartKind::TransactionId.to_i8(), 11);
        assert_eq!(PartKind::RowsAffectedPerBatch.to_i8(), 12);
        assert_eq!(PartKind::ResultSet.to_i8(), 13);
        assert_eq!(PartKind::ResultSetMetadata.to_i8(), 14);
        assert_eq!(PartKind::TopologyInformation.to_i8(), 15);
        assert_eq!(PartKind::OutputParameters.to_i8(), 16);
        assert_eq!(PartKind::ParameterMetadata.to_i8(), 17);
        assert_eq!(PartKind::ConnectOptions.to_i8(), 27);
        assert_eq!(PartKind::Parameters.to_i8(), 32);
        assert_eq!(PartKind::ResultSetId.to_i8(), 33);
        assert_eq!(PartKind::Authentication.to_i8(), 33);
        assert_eq!(PartKind::FetchSize.to_i8(), 34);
        assert_eq!(PartKind::ClientInfo.to_i8(), 35);
        assert_eq!(PartKind::StatementContext.to_i8(), 39);
        assert_eq!(PartKind::ReadLobRequest.to_i8(), 40);
        assert_eq!(PartKind::ReadLobReply.to_i8(), 41);
        assert_eq!(PartKind::WriteLobRequest.to_i8(), 43);
        assert_eq!(PartKind::WriteLobReply.to_i8(), 44);
        assert_eq!(PartKind::TransactionFlags.to_i8(), 64);
    }

    #[test]
    fn tag_33_resolves_by_auth_context() {
        assert_eq!(PartKind::try_new(33, true).unwrap(), PartKind::Authentication);
        assert_eq!(PartKind::try_new(33, false).unwrap(), PartKind::ResultSetId);
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(PartKind::try_new(99, false).is_err());
    }
}
