//! Unified part payload (§4.3, §6): the unit of exchange inside a segment, wrapping one
//! `PartKind`'s on-wire body. [`Part::emit`] and [`parse_body`] are the single place that
//! dispatches to the per-payload modules under `parts/`.

use crate::error::{HdbError, HdbResult};
use crate::protocol::part_attributes::PartAttributes;
use crate::protocol::part_kind::PartKind;
use crate::protocol::parts::{
    parse_rows, AuthFields, ClientInfo, ConnectOptions, ExecutionResult, OutputParameters,
    ParameterDescriptors, ParameterRows, ReadLobReply, ReadLobRequest, ResultSetMetadata, Row,
    ServerError, SessionContext, StatementContext, Topology, TransactionFlags, WriteLobReply,
    WriteLobRequest,
};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::sync::Arc;

/// Context a part's body may need beyond its own bytes: the column metadata for a
/// result-set chunk, or the parameter descriptors for output parameters / bulk input.
#[derive(Clone, Copy, Default)]
pub(crate) struct PartContext<'a> {
    pub(crate) result_set_metadata: Option<&'a Arc<ResultSetMetadata>>,
    pub(crate) parameter_descriptors: Option<&'a Arc<ParameterDescriptors>>,
    /// Disambiguates wire tag 33 (§6: `Authentication`/`ResultSetId` share it).
    pub(crate) during_auth: bool,
}

#[derive(Debug)]
pub(crate) enum Part<'a> {
    Auth(AuthFields),
    ClientInfo(ClientInfo),
    Command(&'a str),
    ConnectOptions(ConnectOptions),
    Error(Vec<ServerError>),
    FetchSize(u32),
    OutputParameters(OutputParameters),
    ParameterMetadata(ParameterDescriptors),
    Parameters(ParameterRows),
    ReadLobRequest(ReadLobRequest),
    ReadLobReply(ReadLobReply),
    WriteLobRequest(WriteLobRequest<'a>),
    WriteLobReply(WriteLobReply),
    /// Rows of one result-set chunk, plus whether the server marked it as the last one.
    ResultSet(Vec<Row>, bool),
    ResultSetId(u64),
    ResultSetMetadata(ResultSetMetadata),
    RowsAffected(Vec<ExecutionResult>),
    SessionContext(SessionContext),
    StatementContext(StatementContext),
    StatementId(u64),
    TopologyInformation(Topology),
    TransactionFlags(TransactionFlags),
}

impl<'a> Part<'a> {
    pub(crate) fn kind(&self) -> PartKind {
        match self {
            Self::Auth(_) => PartKind::Authentication,
            Self::ClientInfo(_) => PartKind::ClientInfo,
            Self::Command(_) => PartKind::Command,
            Self::ConnectOptions(_) => PartKind::ConnectOptions,
            Self::Error(_) => PartKind::Error,
            Self::FetchSize(_) => PartKind::FetchSize,
            Self::OutputParameters(_) => PartKind::OutputParameters,
            Self::ParameterMetadata(_) => PartKind::ParameterMetadata,
            Self::Parameters(_) => PartKind::Parameters,
            Self::ReadLobRequest(_) => PartKind::ReadLobRequest,
            Self::ReadLobReply(_) => PartKind::ReadLobReply,
            Self::WriteLobRequest(_) => PartKind::WriteLobRequest,
            Self::WriteLobReply(_) => PartKind::WriteLobReply,
            Self::ResultSet(..) => PartKind::ResultSet,
            Self::ResultSetId(_) => PartKind::ResultSetId,
            Self::ResultSetMetadata(_) => PartKind::ResultSetMetadata,
            Self::RowsAffected(_) => PartKind::RowsAffected,
            Self::SessionContext(_) => PartKind::SessionContext,
            Self::StatementContext(_) => PartKind::StatementContext,
            Self::StatementId(_) => PartKind::StatementId,
            Self::TopologyInformation(_) => PartKind::TopologyInformation,
            Self::TransactionFlags(_) => PartKind::TransactionFlags,
        }
    }

    /// The header's `argumentCount`: how many logical rows/fields the payload carries.
    fn arg_count(&self) -> i32 {
        match self {
            Self::Auth(_) | Self::Command(_) | Self::FetchSize(_) | Self::ResultSetId(_)
            | Self::StatementId(_) | Self::ReadLobRequest(_) | Self::WriteLobReply(_) => 1,
            Self::ClientInfo(ci) => ci.count() as i32,
            Self::ConnectOptions(opts) => opts.len() as i32,
            Self::SessionContext(opts) => opts.len() as i32,
            Self::StatementContext(sc) => sc.len() as i32,
            Self::TransactionFlags(opts) => opts.len() as i32,
            Self::Parameters(rows) => rows.len() as i32,
            Self::WriteLobRequest(_) => 1,
            Self::Error(v) => v.len() as i32,
            Self::RowsAffected(v) => v.len() as i32,
            Self::ResultSet(rows, _) => rows.len() as i32,
            Self::ParameterMetadata(descriptors) => descriptors.len() as i32,
            Self::ResultSetMetadata(md) => md.len() as i32,
            Self::OutputParameters(_) => 1,
            Self::ReadLobReply(_) => 1,
            Self::TopologyInformation(t) => t.lines().len() as i32,
        }
    }

    fn body_size(&self, ctx: PartContext<'_>) -> HdbResult<usize> {
        Ok(match self {
            Self::Auth(af) => af.size(),
            Self::ClientInfo(ci) => ci.size(),
            Self::Command(s) => crate::codec::cesu8_length(s),
            Self::ConnectOptions(opts) => opts.size(),
            Self::FetchSize(_) => 4,
            Self::SessionContext(opts) => opts.size(),
            Self::StatementContext(sc) => sc.size(),
            Self::TransactionFlags(opts) => opts.size(),
            Self::Parameters(rows) => {
                ctx.parameter_descriptors.ok_or_else(|| {
                    HdbError::protocol("Parameters part requires parameter descriptors")
                })?;
                rows.size()
            }
            Self::ReadLobRequest(_) => ReadLobRequest::size(),
            Self::WriteLobRequest(r) => r.size(),
            Self::ResultSetId(_) | Self::StatementId(_) => 8,
            ref other => {
                return Err(HdbError::protocol(format!(
                    "body_size() called on a read-only part {other:?}"
                )))
            }
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) fn emit(&self, ctx: PartContext<'_>, w: &mut dyn std::io::Write) -> HdbResult<()> {
        let body_size = self.body_size(ctx)?;
        w.write_i8(self.kind().to_i8())?;
        w.write_u8(0)?; // attributes, unused on requests
        w.write_i16::<LittleEndian>(self.arg_count() as i16)?;
        w.write_i32::<LittleEndian>(0)?; // big argument count, unused here
        w.write_i32::<LittleEndian>(body_size as i32)?;
        w.write_i32::<LittleEndian>(body_size as i32)?;

        match self {
            Self::Auth(af) => af.emit(w)?,
            Self::ClientInfo(ci) => ci.emit(w)?,
            Self::Command(s) => w.write_all(&crate::codec::utf8_to_cesu8(s))?,
            Self::ConnectOptions(opts) => opts.emit(w)?,
            Self::FetchSize(fs) => w.write_u32::<LittleEndian>(*fs)?,
            Self::SessionContext(opts) => opts.emit(w)?,
            Self::StatementContext(sc) => sc.emit(w)?,
            Self::TransactionFlags(opts) => opts.emit(w)?,
            Self::Parameters(rows) => {
                let descriptors = ctx.parameter_descriptors.ok_or_else(|| {
                    HdbError::protocol("Parameters part requires parameter descriptors")
                })?;
                rows.emit(descriptors, w)?;
            }
            Self::ReadLobRequest(r) => r.emit(w)?,
            Self::WriteLobRequest(r) => r.emit(w)?,
            Self::ResultSetId(id) | Self::StatementId(id) => {
                w.write_u64::<LittleEndian>(*id)?;
            }
            other => {
                return Err(HdbError::protocol(format!(
                    "emit() called on a read-only part {other:?}"
                )))
            }
        }
        crate::protocol::message::write_padding(body_size, w)?;
        Ok(())
    }
}

/// Parses one part's header and body. `attributes` is handed back to the caller since
/// result-set / LOB-reply streaming decisions (fetch again? more chunks?) hinge on it.
pub(crate) fn parse(
    ctx: PartContext<'_>,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<(Part<'static>, PartAttributes)> {
    let kind = PartKind::try_new(rdr.read_i8()?, ctx.during_auth)?;
    let attributes = PartAttributes::new(rdr.read_i8()?);
    let arg_count_small = rdr.read_i16::<LittleEndian>()?;
    let big_arg_count = rdr.read_i32::<LittleEndian>()?;
    let buffer_length = rdr.read_i32::<LittleEndian>()?;
    let _buffer_size = rdr.read_i32::<LittleEndian>()?;
    let arg_count = if arg_count_small == -1 {
        big_arg_count as usize
    } else {
        arg_count_small as usize
    };

    let part = parse_body(kind, attributes, arg_count, ctx, rdr)?;
    crate::protocol::message::skip_padding(buffer_length as usize, rdr)?;
    Ok((part, attributes))
}

#[allow(clippy::too_many_lines)]
fn parse_body(
    kind: PartKind,
    attributes: PartAttributes,
    arg_count: usize,
    ctx: PartContext<'_>,
    rdr: &mut dyn std::io::Read,
) -> HdbResult<Part<'static>> {
    Ok(match kind {
        PartKind::Authentication => Part::Auth(AuthFields::parse(rdr)?),
        PartKind::Error => Part::Error(ServerError::parse(arg_count, rdr)?),
        PartKind::StatementId => Part::StatementId(rdr.read_u64::<LittleEndian>()?),
        PartKind::ResultSetId => Part::ResultSetId(rdr.read_u64::<LittleEndian>()?),
        PartKind::RowsAffected | PartKind::RowsAffectedPerBatch => {
            Part::RowsAffected(ExecutionResult::parse(arg_count, rdr)?)
        }
        PartKind::TopologyInformation => {
            Part::TopologyInformation(Topology::parse(arg_count, rdr)?)
        }
        PartKind::OutputParameters => {
            let descriptors = ctx.parameter_descriptors.ok_or_else(|| {
                HdbError::protocol("OutputParameters part requires parameter descriptors")
            })?;
            Part::OutputParameters(OutputParameters::parse(descriptors, rdr)?)
        }
        PartKind::ParameterMetadata => {
            Part::ParameterMetadata(ParameterDescriptors::parse(arg_count, rdr)?)
        }
        PartKind::SessionContext => Part::SessionContext(SessionContext::parse(arg_count, rdr)?),
        PartKind::ConnectOptions => Part::ConnectOptions(ConnectOptions::parse(arg_count, rdr)?),
        PartKind::Parameters => {
            return Err(HdbError::protocol(
                "Parameters part is request-only and never parsed from a reply",
            ))
        }
        PartKind::ResultSetMetadata => {
            Part::ResultSetMetadata(ResultSetMetadata::parse(arg_count, arg_count, rdr)?)
        }
        PartKind::ClientInfo => {
            return Err(HdbError::protocol("ClientInfo part is request-only"))
        }
        PartKind::StatementContext => {
            Part::StatementContext(StatementContext::parse(arg_count, rdr)?)
        }
        PartKind::ReadLobRequest => {
            return Err(HdbError::protocol("ReadLobRequest part is request-only"))
        }
        PartKind::ReadLobReply => Part::ReadLobReply(ReadLobReply::parse(rdr)?),
        PartKind::WriteLobRequest => {
            return Err(HdbError::protocol("WriteLobRequest part is request-only"))
        }
        PartKind::WriteLobReply => Part::WriteLobReply(WriteLobReply::parse(arg_count, rdr)?),
        PartKind::TransactionFlags => {
            Part::TransactionFlags(TransactionFlags::parse(arg_count, rdr)?)
        }
        PartKind::Command
        | PartKind::FetchSize
        | PartKind::CommandInfo
        | PartKind::ClientContext
        | PartKind::TransactionId => {
            return Err(HdbError::protocol(format!(
                "{kind:?} part is request-only and never parsed from a reply"
            )))
        }
        PartKind::ResultSet => {
            let metadata = ctx.result_set_metadata.ok_or_else(|| {
                HdbError::protocol("ResultSet part requires result-set metadata")
            })?;
            let rows = parse_rows(arg_count, metadata, rdr)?;
            Part::ResultSet(rows, attributes.is_last_packet())
        }
    })
}
