//! Server-reported error/warning/info rows (`hdbErrors`), §4.3 and §7.

use crate::codec::cesu8_to_utf8;
use crate::error::HdbResult;
use byteorder::{LittleEndian, ReadBytesExt};
use std::error::Error;

/// Severity of a server-reported message. Numeric values follow §4.3/§7: `Info` is
/// logged only, `Warning` is attached to an otherwise-successful reply, `Error` and above
/// surface as a [`crate::error::HdbError::DbError`], and `Fatal` additionally marks the
/// session broken.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Severity {
    /// Purely informational; never surfaced as an error.
    Info,
    /// Non-fatal diagnostic attached to a successful reply.
    Warning,
    /// The request could not be answered correctly.
    Error,
    /// The session must be terminated.
    Fatal,
    /// A severity byte this implementation does not recognize.
    Unknown(i8),
}

impl Severity {
    pub(crate) fn from_i8(i: i8) -> Self {
        match i {
            0 => Self::Info,
            1 => Self::Warning,
            2 => Self::Error,
            i if i >= 3 => Self::Fatal,
            i => Self::Unknown(i),
        }
    }

    /// Whether this severity surfaces as a [`crate::error::HdbError::DbError`] to the caller.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }

    /// Whether this severity requires the session to be marked broken.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Self::Info => write!(f, "Info"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
            Self::Fatal => write!(f, "Fatal error"),
            Self::Unknown(i) => write!(f, "message of unknown severity ({i})"),
        }
    }
}

/// An error, warning, or info message returned by the database server.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerError {
    code: i32,
    position: i32,
    severity: Severity,
    sqlstate: Vec<u8>,
    text: String,
}

const BASE_SIZE: i32 = 4 + 4 + 4 + 1 + 5;

impl ServerError {
    /// The server-assigned error code.
    #[must_use]
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Position within the statement text where the error occurred, or -1 if not applicable.
    #[must_use]
    pub fn position(&self) -> i32 {
        self.position
    }

    /// The severity of the message.
    #[must_use]
    pub fn severity(&self) -> &Severity {
        &self.severity
    }

    /// The five-byte SQLSTATE code.
    #[must_use]
    pub fn sqlstate(&self) -> &[u8] {
        &self.sqlstate
    }

    /// The human-readable message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn new(
        code: i32,
        position: i32,
        severity: Severity,
        sqlstate: Vec<u8>,
        text: String,
    ) -> Self {
        Self {
            code,
            position,
            severity,
            sqlstate,
            text,
        }
    }

    pub(crate) fn parse(count: usize, rdr: &mut dyn std::io::Read) -> HdbResult<Vec<Self>> {
        let mut errors = Vec::with_capacity(count);
        for _ in 0..count {
            let code = rdr.read_i32::<LittleEndian>()?;
            let position = rdr.read_i32::<LittleEndian>()?;
            let text_length = rdr.read_i32::<LittleEndian>()?;
            let severity = Severity::from_i8(rdr.read_i8()?);
            let mut sqlstate = vec![0_u8; 5];
            rdr.read_exact(&mut sqlstate)?;
            #[allow(clippy::cast_sign_loss)]
            let mut raw_text = vec![0_u8; text_length as usize];
            rdr.read_exact(&mut raw_text)?;
            let text = cesu8_to_utf8(&raw_text, crate::codec::Cesu8DecodePolicy::Replace)?;

            #[allow(clippy::cast_sign_loss)]
            let pad = (8 - (BASE_SIZE + text_length) % 8) % 8;
            let mut filler = vec![0_u8; pad as usize];
            rdr.read_exact(&mut filler)?;

            let error = Self::new(code, position, severity, sqlstate, text);
            trace!("ServerError::parse(): found {error}");
            errors.push(error);
        }
        Ok(errors)
    }
}

impl Error for ServerError {}

impl std::fmt::Display for ServerError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            fmt,
            r#"{}[code: {}, sql state: {}] at position {}: "{}""#,
            self.severity,
            self.code,
            String::from_utf8_lossy(&self.sqlstate),
            self.position,
            self.text
        )
    }
}

impl std::fmt::Debug for ServerError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{self}")
    }
}
