//! The wire protocol engine (§4.3, §4.4, §4.5, §6): message/segment framing, the part
//! registry, and request/reply assembly. Everything above this module talks to a
//! [`crate::conn::Session`], never to these types directly.

mod message;
mod part;
mod part_attributes;
mod part_kind;
pub(crate) mod parts;
mod reply;
mod request;
mod util;

pub(crate) use message::{padded_size, skip_padding, write_padding};
pub(crate) use part::{Part, PartContext};
pub(crate) use reply::Reply;
pub(crate) use request::{MessageType, Request};

pub use parts::{
    ExecutionResult, FieldMetadata, HdbValue, LobValue, OutputParameters, ParameterBinding,
    ParameterDescriptor, ParameterDescriptors, ParameterDirection, ResultSetMetadata, Row,
    Severity, ServerError,
};
