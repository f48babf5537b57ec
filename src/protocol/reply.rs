//! Reply assembly (§4.3, §4.5, §7): reads one message's header, its (always single)
//! segment, and every part it carries. Server-reported errors are collected rather than
//! raised immediately, so that bulk-exec partial failures can still be attached to their
//! `RowsAffected` row positions (§9 design note) before the caller decides whether the
//! reply as a whole succeeded.

use crate::error::{HdbError, HdbResult};
use crate::protocol::message::{MessageHeader, SegmentHeader};
use crate::protocol::part::{self, Part, PartContext};
use crate::protocol::parts::{ExecutionResult, ParameterDescriptors, ResultSetMetadata, ServerError, Severity};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct Reply<'a> {
    pub(crate) session_id: u64,
    pub(crate) function_code: i16,
    pub(crate) parts: Vec<Part<'a>>,
    /// Non-fatal server diagnostics (severity `Info`/`Warning`) attached to a successful reply.
    pub(crate) warnings: Vec<ServerError>,
    /// Error-or-worse diagnostics (severity `Error`/`Fatal`), not yet raised (§9, §9.1).
    errors: Vec<ServerError>,
}

impl<'a> Reply<'a> {
    /// Reads a full reply message from `rdr`. `result_set_metadata`/`parameter_descriptors`
    /// must be supplied when the caller expects a `ResultSet`/`OutputParameters` part,
    /// since those parts carry no self-describing schema on the wire.
    /// `during_auth` must be `true` for the two authentication-round replies (§4.4),
    /// where wire tag 33 means `Authentication` rather than `ResultSetId` (§6).
    pub(crate) fn parse(
        result_set_metadata: Option<&Arc<ResultSetMetadata>>,
        parameter_descriptors: Option<&Arc<ParameterDescriptors>>,
        during_auth: bool,
        rdr: &mut dyn std::io::Read,
    ) -> HdbResult<Reply<'static>> {
        let msg_header = MessageHeader::read(rdr)?;
        trace!(
            "Reply::parse(): session_id {}, varpart_size {}",
            msg_header.session_id, msg_header.varpart_size
        );

        let seg_header = SegmentHeader::read(rdr)?;
        let ctx = PartContext {
            result_set_metadata,
            parameter_descriptors,
            during_auth,
        };

        let mut parts = Vec::with_capacity(seg_header.no_of_parts as usize);
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        for _ in 0..seg_header.no_of_parts {
            let (part, _attributes) = part::parse(ctx, rdr)?;
            if let Part::Error(server_errors) = part {
                for e in server_errors {
                    if e.severity().is_error() {
                        errors.push(e);
                    } else {
                        if matches!(e.severity(), &Severity::Warning) {
                            warn!("server warning: {e}");
                        } else {
                            trace!("server info: {e}");
                        }
                        warnings.push(e);
                    }
                }
            } else {
                parts.push(part);
            }
        }

        Ok(Reply {
            session_id: msg_header.session_id,
            function_code: seg_header.function_code,
            parts,
            warnings,
            errors,
        })
    }

    /// The server's response to an authentication round has its own, request-specific
    /// evaluation and must not be silently turned into `ErrExecutionResults`.
    pub(crate) fn into_auth_result(self) -> HdbResult<Self> {
        if let Some(first) = self.errors.into_iter().next() {
            return Err(HdbError::from(first));
        }
        Ok(Self {
            errors: Vec::new(),
            ..self
        })
    }

    /// Applies the default error-handling policy (§4.5, §7, §9): if the reply carries a
    /// `RowsAffected` part, per-row failures reported alongside it are attached
    /// positionally and the reply is still returned (bulk exec's partial-failure shape);
    /// otherwise any collected `errors` fail the whole call.
    pub(crate) fn handle_db_error(mut self) -> HdbResult<Self> {
        if self.errors.is_empty() {
            return Ok(self);
        }

        if let Some(pos) = self.parts.iter().position(|p| matches!(p, Part::RowsAffected(_))) {
            if let Part::RowsAffected(results) = &mut self.parts[pos] {
                let errors = std::mem::take(&mut self.errors);
                ExecutionResult::attach_errors(results, errors);
                return Ok(self);
            }
        }

        let mut errors = self.errors;
        if errors.len() == 1 {
            Err(HdbError::from(errors.remove(0)))
        } else {
            Err(HdbError::ExecutionResults(errors))
        }
    }
}
