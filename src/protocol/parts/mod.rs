//! Part payloads (§6): one module per `PartKind`'s body, plus the shared option-list and
//! value-codec primitives they build on.

mod auth_fields;
mod client_info;
mod connect_options;
mod execution_result;
mod field_metadata;
mod hdb_value;
mod multiline_option_part;
mod option_part;
mod option_value;
mod output_parameters;
mod parameter_descriptor;
mod parameter_rows;
mod read_lob_reply;
mod read_lob_request;
mod result_set_rows;
mod server_error;
mod session_context;
mod statement_context;
mod topology;
mod transaction_flags;
mod write_lob_reply;
mod write_lob_request;

pub(crate) use auth_fields::AuthFields;
pub(crate) use client_info::ClientInfo;
pub(crate) use connect_options::{ConnectOptionId, ConnectOptions};
pub use execution_result::ExecutionResult;
pub use field_metadata::{FieldMetadata, ResultSetMetadata};
pub use hdb_value::{HdbValue, LobValue};
pub(crate) use option_part::OptionId;
pub(crate) use option_value::OptionValue;
pub use output_parameters::OutputParameters;
pub use parameter_descriptor::{ParameterBinding, ParameterDescriptor, ParameterDescriptors, ParameterDirection};
pub(crate) use parameter_rows::ParameterRows;
pub(crate) use read_lob_reply::ReadLobReply;
pub(crate) use read_lob_request::ReadLobRequest;
pub(crate) use result_set_rows::parse_rows;
pub use result_set_rows::Row;
pub use server_error::{Severity, ServerError};
pub(crate) use session_context::{SessionContext, SessionContextId};
pub(crate) use statement_context::StatementContext;
pub(crate) use topology::Topology;
pub(crate) use transaction_flags::{SessionState, TaFlagId, TransactionFlags, TransactionState};
pub(crate) use write_lob_reply::WriteLobReply;
pub(crate) use write_lob_request::WriteLobRequest;
