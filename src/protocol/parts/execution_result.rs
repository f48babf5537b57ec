//! `RowsAffected` (§4.2, §6): per-row outcome of an `Exec`/bulk `Exec`. Each row of a bulk
//! statement gets its own entry, so one `RowsAffected` part can mix successes and failures
//! within the same reply (the invariant the spec calls out in §9: preserve each row's
//! outcome rather than collapsing to a single result).

use crate::error::HdbResult;
use crate::protocol::parts::server_error::ServerError;
use byteorder::{LittleEndian, ReadBytesExt};

/// Outcome of a single row of a (possibly bulk) `Exec`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionResult {
    /// The row was executed and affected this many rows.
    RowsAffected(usize),
    /// The row succeeded but the server could not report a row count.
    SuccessNoInfo,
    /// The row failed; the accompanying [`ServerError`], if the reply carried one at this
    /// position, is attached by the caller after parsing the `Error` part.
    Failure(Option<ServerError>),
}

impl ExecutionResult {
    pub(crate) fn parse(count: usize, rdr: &mut dyn std::io::Read) -> HdbResult<Vec<Self>> {
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(match rdr.read_i32::<LittleEndian>()? {
                -2 => Self::SuccessNoInfo,
                -3 => Self::Failure(None),
                #[allow(clippy::cast_sign_loss)]
                n => Self::RowsAffected(n as usize),
            });
        }
        Ok(results)
    }

    /// Fills in the `ServerError` for every `Failure` entry, in order, from `errors`. Bulk
    /// execs report failures and their `hdbErrors` rows in the same row order.
    pub(crate) fn attach_errors(results: &mut [Self], errors: Vec<ServerError>) {
        let mut errors = errors.into_iter();
        for result in results.iter_mut() {
            if let Self::Failure(slot @ None) = result {
                *slot = errors.next();
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn is_rows_affected(&self) -> bool {
        matches!(self, Self::RowsAffected(_))
    }
}

impl std::fmt::Display for ExecutionResult {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::RowsAffected(count) => write!(fmt, "{count} row(s) affected"),
            Self::SuccessNoInfo => write!(fmt, "executed successfully, row count not reported"),
            Self::Failure(Some(err)) => write!(fmt, "execution failed: {err}"),
            Self::Failure(None) => write!(fmt, "execution failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_bulk_outcomes() {
        let mut buf = Vec::new();
        for n in [3_i32, -2, -3] {
            buf.extend_from_slice(&n.to_le_bytes());
        }
        let results = ExecutionResult::parse(3, &mut &buf[..]).unwrap();
        assert_eq!(results[0], ExecutionResult::RowsAffected(3));
        assert_eq!(results[1], ExecutionResult::SuccessNoInfo);
        assert_eq!(results[2], ExecutionResult::Failure(None));
    }
}
