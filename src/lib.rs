//! Wire protocol engine for SAP HANA (HDB): message framing, authentication, the
//! row/parameter codec, and the per-connection session state machine.
//!
//! This crate does not dial a socket or negotiate TLS; callers hand it an already
//! established `Read + Write` transport through [`ConnectParams`] and [`conn::connect`].
//! It also does not implement a SQL-string scanner, `serde`-based row deserialization,
//! or XA/distributed-transaction glue — those are layered on top of the narrow
//! [`Session`] API the same way the upstream driver layers its own higher-level crates
//! on top of its protocol engine.

#![deny(missing_debug_implementations)]
#![allow(clippy::module_name_repetitions)]

#[macro_use]
extern crate log;

mod client;
mod codec;
mod conn;
mod error;
mod protocol;
mod types;

pub use client::{CallResult, CallTableOutput, PrepareResult, ResultSet, Session, StatementId};
pub use conn::{
    connect, ClientCertificate, ConnectParams, ConnectParamsBuilder, CredentialRefresh,
};
pub use error::{HdbError, HdbResult};
pub use protocol::{
    ExecutionResult, FieldMetadata, HdbValue, LobValue, OutputParameters, ParameterBinding,
    ParameterDescriptor, ParameterDescriptors, ParameterDirection, ResultSetMetadata, Row,
    ServerError, Severity,
};
pub use types::{type_for_precision, DayDate, LongDate, SecondDate, SecondTime, TypeId};

/// Rows fetched per round-trip unless [`ConnectParamsBuilder::fetch_size`] overrides it.
pub const DEFAULT_FETCH_SIZE: u32 = 100_000;
/// Bytes read per `ReadLobRequest` chunk unless overridden.
pub const DEFAULT_LOB_READ_LENGTH: u32 = 16_000_000;
/// Bytes written per `WriteLobRequest` chunk unless overridden (§4.6: "default 4 KiB"
/// is the *protocol's* floor; this is the driver-side default before a caller tunes it).
pub const DEFAULT_LOB_WRITE_LENGTH: usize = 4096;
/// Highest data-format version this engine proposes at connect time.
pub const DEFAULT_DATA_FORMAT_VERSION: u8 = 8;
