//! Request assembly (§4.3, §4.5): one [`MessageType`] plus the ordered list of parts it
//! carries, serialized as a single message with exactly one request segment.

use crate::error::HdbResult;
use crate::protocol::message::{MessageHeader, SegmentHeader};
use crate::protocol::part::{Part, PartContext};
use crate::protocol::parts::ParameterDescriptors;
use std::sync::Arc;

/// Action requested from the server (§6, "Message Type"). Numeric values match the
/// ones this engine was built against; irrelevant ABAP/XA request types are omitted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MessageType {
    ExecuteDirect = 2,
    Prepare = 3,
    Execute = 13,
    ReadLob = 16,
    WriteLob = 17,
    Authenticate = 65,
    Connect = 66,
    Commit = 67,
    Rollback = 68,
    CloseResultSet = 69,
    DropStatementId = 70,
    FetchNext = 71,
    Disconnect = 77,
}

#[derive(Debug, Default)]
pub(crate) struct Request<'a> {
    message_type: Option<MessageType>,
    command_options: u8,
    parts: Vec<Part<'a>>,
}

impl<'a> Request<'a> {
    pub(crate) fn new(message_type: MessageType, command_options: u8) -> Self {
        Self {
            message_type: Some(message_type),
            command_options,
            parts: Vec::new(),
        }
    }

    pub(crate) fn message_type(&self) -> MessageType {
        self.message_type
            .expect("Request::message_type() called on an unset request")
    }

    pub(crate) fn push(&mut self, part: Part<'a>) {
        self.parts.push(part);
    }

    /// Writes the full message: header, one request segment header, then every part
    /// with its 8-byte padding. `descriptors` is required whenever the request carries
    /// a `Parameters` part (bound input values for exec/query).
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) fn emit(
        &self,
        session_id: u64,
        seq_number: i32,
        auto_commit: bool,
        descriptors: Option<&Arc<ParameterDescriptors>>,
        w: &mut dyn std::io::Write,
    ) -> HdbResult<()> {
        let ctx = PartContext {
            result_set_metadata: None,
            parameter_descriptors: descriptors,
            during_auth: false,
        };

        let mut body = Vec::new();
        for part in &self.parts {
            part.emit(ctx, &mut body)?;
        }

        let segment_length = crate::protocol::message::SEGMENT_HEADER_SIZE as usize + body.len();
        let varpart_size = segment_length;

        trace!(
            "Request::emit() of type {:?} for session_id {session_id}, seq_number {seq_number}, \
             varpart_size {varpart_size}",
            self.message_type,
        );

        let header = MessageHeader {
            session_id,
            packet_count: seq_number,
            varpart_length: varpart_size as u32,
            varpart_size: varpart_size as u32,
            no_of_segments: 1,
        };
        header.write(w)?;

        SegmentHeader::write_request(
            segment_length as i32,
            self.parts.len() as i16,
            self.message_type() as i8,
            auto_commit,
            self.command_options,
            w,
        )?;

        w.write_all(&body)?;
        w.flush()?;
        Ok(())
    }
}
