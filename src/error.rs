//! The crate's single error type.

use crate::protocol::parts::ServerError;
use thiserror::Error;

/// A list specifying categories of [`HdbError`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HdbError {
    /// The database server responded with one or more error rows; the contained
    /// [`ServerError`] describes the concrete reason.
    #[error("database server responded with an error")]
    DbError {
        /// The causing error.
        #[from]
        source: ServerError,
    },

    /// The server returned several `hdbErrors` rows along a reply that otherwise succeeded
    /// (e.g. a bulk exec with some failing rows).
    #[error("database server responded with {0} error(s)")]
    ExecutionResults(Vec<ServerError>),

    /// A caller-supplied value cannot be converted to the target wire type.
    #[error("cannot convert value of type {actual} to {target}")]
    Conversion {
        /// Name of the target wire type.
        target: &'static str,
        /// Abstract type name of the offending value.
        actual: &'static str,
    },

    /// An integer value is outside the admissible range for its wire type.
    #[error("integer value out of range for {0}")]
    IntegerOutOfRange(&'static str),

    /// An unsigned 64-bit value has the top bit set and cannot be represented.
    #[error("u64 value out of range")]
    Uint64OutOfRange,

    /// A floating point value is outside the admissible range for its wire type.
    #[error("float value out of range for {0}")]
    FloatOutOfRange(&'static str),

    /// A decimal value cannot be represented in the target fixed-point layout.
    #[error("decimal value out of range: {0}")]
    DecimalOutOfRange(&'static str),

    /// An invalid CESU-8 byte sequence was encountered under the strict decode policy;
    /// the original bytes are preserved.
    #[error("invalid CESU-8 sequence")]
    Cesu8 {
        /// The bytes that could not be decoded.
        bytes: Vec<u8>,
    },

    /// Malformed message/segment/part framing, an unknown `TypeCode`, or an impossible
    /// option was observed on the wire. Fatal to the session.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The session is no longer usable because a protocol or transport error occurred earlier.
    #[error("session is broken and can no longer be used")]
    SessionBroken,

    /// The session was already closed.
    #[error("session is closed")]
    SessionClosed,

    /// An attempt was made to switch the session user while a transaction or a prepared
    /// statement was still in scope.
    #[error("cannot switch user inside an open transaction or statement scope")]
    SwitchUser,

    /// All proposed authentication methods were exhausted, including any refresh retries.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The in-flight operation was canceled by the caller.
    #[error("operation was canceled")]
    Canceled,

    /// Error caused by wrong usage of the API.
    #[error("wrong usage: {0}")]
    Usage(&'static str),

    /// Error caused by wrong usage of the API, with a dynamic message.
    #[error("wrong usage: {0}")]
    UsageDetailed(String),

    /// Poisoned internal mutex; the session must be considered broken.
    #[error("internal lock was poisoned")]
    Poison,

    /// Error in communication with the database (transport I/O).
    #[error(transparent)]
    Io {
        /// The causing error.
        #[from]
        source: std::io::Error,
    },
}

/// Abbreviation of `Result<T, HdbError>`.
pub type HdbResult<T> = std::result::Result<T, HdbError>;

impl HdbError {
    /// Returns the contained [`ServerError`], if any.
    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            Self::DbError { source } => Some(source),
            _ => None,
        }
    }

    pub(crate) fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

impl<G> From<std::sync::PoisonError<G>> for HdbError {
    fn from(_error: std::sync::PoisonError<G>) -> Self {
        Self::Poison
    }
}
