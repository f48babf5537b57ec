//! Public session API (§4.7): `Session` is the only type a caller drives directly;
//! `StatementId`, `PrepareResult`, and `ResultSet` are the handles its methods hand back.

use crate::conn::ConnectParams;
use crate::conn::SessionCore;
use crate::error::{HdbError, HdbResult};
use crate::protocol::parts::{
    OutputParameters, ParameterDescriptors, ParameterRows, ReadLobRequest, ResultSetMetadata, Row,
    WriteLobRequest,
};
use crate::protocol::{MessageType, Part};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Opaque handle to a prepared statement (§4.7): wraps the server-issued statement id.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct StatementId(u64);

impl std::fmt::Debug for StatementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StatementId({:#x})", self.0)
    }
}

/// What `Session::prepare` learns about a statement before it is ever executed (§4.5).
#[derive(Clone, Debug, Default)]
pub struct PrepareResult {
    parameter_descriptors: Arc<ParameterDescriptors>,
    result_set_metadata: Option<Arc<ResultSetMetadata>>,
}

impl PrepareResult {
    pub fn parameter_descriptors(&self) -> &ParameterDescriptors {
        &self.parameter_descriptors
    }

    pub fn result_set_metadata(&self) -> Option<&ResultSetMetadata> {
        self.result_set_metadata.as_deref()
    }
}

/// The table-valued part of a [`CallResult`] (§9): internally always a [`ResultSet`];
/// translated to an opaque locator string only when `legacy` is set (§6 `legacy` connect
/// option), matching the upstream driver's choice to keep one canonical shape and
/// translate solely at the API boundary.
#[derive(Debug)]
pub enum CallTableOutput<T> {
    ResultSet(ResultSet<T>),
    /// `legacy = true`: the result-set id, surfaced as an opaque handle string instead of
    /// a live `ResultSet`.
    LegacyHandle(String),
}

/// Reply to [`Session::call`] (§2 `call`, §4.5, §4.7): rows affected by DML run inside
/// the procedure, any OUT/INOUT parameter values, and the table output of the ref-cursor
/// the procedure declared, if any.
#[derive(Debug)]
pub struct CallResult<T> {
    pub rows_affected: Vec<crate::protocol::ExecutionResult>,
    pub output_parameters: Option<OutputParameters>,
    pub table_output: Option<CallTableOutput<T>>,
}

/// A write-only sink a caller supplies to receive LOB bytes as they stream in (§4.6).
pub trait LobSink {
    fn write_chunk(&mut self, chunk: &[u8]) -> HdbResult<()>;
}

impl<W: Write> LobSink for W {
    fn write_chunk(&mut self, chunk: &[u8]) -> HdbResult<()> {
        self.write_all(chunk).map_err(HdbError::from)
    }
}

/// A read-only source a caller supplies to stream an outbound LOB parameter (§4.6).
pub trait LobSource {
    /// Reads up to `buf.len()` bytes, returning the number read (`0` at end of data).
    fn read_chunk(&mut self, buf: &mut [u8]) -> HdbResult<usize>;
}

impl<R: Read> LobSource for R {
    fn read_chunk(&mut self, buf: &mut [u8]) -> HdbResult<usize> {
        self.read(buf).map_err(HdbError::from)
    }
}

struct ResultSetState<T> {
    core: Arc<Mutex<SessionCore<T>>>,
    result_set_id: u64,
    metadata: Arc<ResultSetMetadata>,
    buffer: VecDeque<Row>,
    server_done: bool,
    closed: bool,
}

/// A query's result rows (§4.6, §4.7): buffers at most one server-sent chunk and fetches
/// lazily as the caller iterates.
pub struct ResultSet<T> {
    state: ResultSetState<T>,
}

impl<T> std::fmt::Debug for ResultSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSet")
            .field("result_set_id", &self.state.result_set_id)
            .field("buffered", &self.state.buffer.len())
            .field("server_done", &self.state.server_done)
            .finish()
    }
}

impl<T: Read + Write> ResultSet<T> {
    pub fn metadata(&self) -> &ResultSetMetadata {
        &self.state.metadata
    }

    /// Closes the result set server-side ahead of exhausting it; idempotent (§8).
    pub fn close(&mut self) -> HdbResult<()> {
        if self.state.closed {
            return Ok(());
        }
        self.state.closed = true;
        let result_set_id = self.state.result_set_id;
        let mut core = self.state.core.lock()?;
        core.roundtrip(
            MessageType::CloseResultSet,
            0,
            |r| r.push(Part::ResultSetId(result_set_id)),
            None,
            None,
        )?;
        Ok(())
    }

    fn fetch_more(&mut self) -> HdbResult<()> {
        let result_set_id = self.state.result_set_id;
        let mut core = self.state.core.lock()?;
        let fetch_size = core.fetch_size();
        let metadata = self.state.metadata.clone();
        let reply = core.roundtrip(
            MessageType::FetchNext,
            0,
            |r| {
                r.push(Part::ResultSetId(result_set_id));
                r.push(Part::FetchSize(fetch_size));
            },
            Some(&metadata),
            None,
        )?;
        drop(core);
        for part in reply.parts {
            if let Part::ResultSet(rows, is_last) = part {
                self.state.buffer.extend(rows);
                self.state.server_done = is_last;
            }
        }
        Ok(())
    }
}

impl<T: Read + Write> Iterator for ResultSet<T> {
    type Item = HdbResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.state.buffer.pop_front() {
                return Some(Ok(row));
            }
            if self.state.server_done {
                return None;
            }
            if let Err(e) = self.fetch_more() {
                return Some(Err(e));
            }
        }
    }
}

/// Scope tracking for §4.5's user-switch restriction: a switch is refused while a
/// transaction or a prepared statement is open.
#[derive(Default)]
struct Scopes {
    open_statements: AtomicUsize,
    transaction_open: AtomicBool,
}

/// A session to an HDB server (§4.7): one transport, authenticated and ready. All
/// operations serialize on an internal mutex — half-duplex, one request/reply at a time
/// (§5).
pub struct Session<T> {
    core: Arc<Mutex<SessionCore<T>>>,
    cancel_requested: Arc<AtomicBool>,
    scopes: Arc<Scopes>,
}

impl<T> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl<T> Clone for Session<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            cancel_requested: Arc::clone(&self.cancel_requested),
            scopes: Arc::clone(&self.scopes),
        }
    }
}

impl<T: Read + Write + Send> Session<T> {
    pub(crate) fn new(core: SessionCore<T>) -> Self {
        Self {
            core: Arc::new(Mutex::new(core)),
            cancel_requested: Arc::new(AtomicBool::new(false)),
            scopes: Arc::new(Scopes::default()),
        }
    }

    /// Requests cancellation of the next (or currently in-flight) operation. The
    /// operation that observes the request fails with `HdbError::Canceled`; the
    /// session itself remains usable for the caller's next call (§4.5, §5).
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    fn check_canceled(&self) -> HdbResult<()> {
        if self.cancel_requested.swap(false, Ordering::SeqCst) {
            return Err(HdbError::Canceled);
        }
        Ok(())
    }

    /// Prepares a statement (§4.5): `Command(sql)` → `StatementId`, optional
    /// `ParameterMetadata`, optional `ResultMetadata`.
    pub fn prepare(&self, sql: &str) -> HdbResult<(StatementId, PrepareResult)> {
        self.check_canceled()?;
        let mut core = self.core.lock()?;
        let reply = core.roundtrip(MessageType::Prepare, 0, |r| r.push(Part::Command(sql)), None, None)?;
        drop(core);
        // The reply is already drained (§4.5, §5): a cancel() issued while we were
        // blocked on the network is surfaced on *this* call, not the next one.
        self.check_canceled()?;

        let mut statement_id = None;
        let mut parameter_descriptors = ParameterDescriptors::default();
        let mut result_set_metadata = None;
        for part in reply.parts {
            match part {
                Part::StatementId(id) => statement_id = Some(id),
                Part::ParameterMetadata(descriptors) => parameter_descriptors = descriptors,
                Part::ResultSetMetadata(md) => result_set_metadata = Some(Arc::new(md)),
                _ => {}
            }
        }
        let statement_id = statement_id
            .ok_or_else(|| HdbError::protocol("Prepare reply carried no StatementId part"))?;

        self.scopes.open_statements.fetch_add(1, Ordering::SeqCst);
        Ok((
            StatementId(statement_id),
            PrepareResult {
                parameter_descriptors: Arc::new(parameter_descriptors),
                result_set_metadata,
            },
        ))
    }

    /// Executes a (possibly bulk) statement (§4.5): one `ExecutionResult` per input row.
    pub fn exec(
        &self,
        statement_id: StatementId,
        prepare_result: &PrepareResult,
        rows: ParameterRows,
    ) -> HdbResult<(Vec<crate::protocol::ExecutionResult>, Option<OutputParameters>)> {
        self.check_canceled()?;
        let descriptors = Arc::clone(&prepare_result.parameter_descriptors);
        let mut core = self.core.lock()?;
        let reply = core.roundtrip(
            MessageType::Execute,
            0,
            |r| {
                r.push(Part::StatementId(statement_id.0));
                r.push(Part::Parameters(rows));
            },
            None,
            Some(&descriptors),
        )?;
        drop(core);
        self.check_canceled()?;

        self.scopes.transaction_open.store(true, Ordering::SeqCst);

        let mut rows_affected = Vec::new();
        let mut output_parameters = None;
        for part in reply.parts {
            match part {
                Part::RowsAffected(v) => rows_affected = v,
                Part::OutputParameters(op) => output_parameters = Some(op),
                _ => {}
            }
        }
        Ok((rows_affected, output_parameters))
    }

    /// Runs a query (§4.5, §4.6): returns a lazily-fetching [`ResultSet`].
    pub fn query(
        &self,
        statement_id: StatementId,
        prepare_result: &PrepareResult,
        rows: ParameterRows,
    ) -> HdbResult<ResultSet<T>> {
        self.check_canceled()?;
        let descriptors = Arc::clone(&prepare_result.parameter_descriptors);
        let metadata = prepare_result
            .result_set_metadata
            .clone()
            .ok_or_else(|| HdbError::Usage("statement has no result-set metadata to query against"))?;

        let mut core = self.core.lock()?;
        let reply = core.roundtrip(
            MessageType::Execute,
            0,
            |r| {
                r.push(Part::StatementId(statement_id.0));
                r.push(Part::Parameters(rows));
            },
            Some(&metadata),
            Some(&descriptors),
        )?;
        drop(core);
        self.check_canceled()?;

        self.scopes.transaction_open.store(true, Ordering::SeqCst);

        let mut result_set_id = None;
        let mut buffer = VecDeque::new();
        let mut server_done = true;
        for part in reply.parts {
            match part {
                Part::ResultSetId(id) => result_set_id = Some(id),
                Part::ResultSet(rs_rows, is_last) => {
                    buffer.extend(rs_rows);
                    server_done = is_last;
                }
                _ => {}
            }
        }
        let result_set_id = result_set_id
            .ok_or_else(|| HdbError::protocol("Query reply carried no ResultSetId part"))?;

        Ok(ResultSet {
            state: ResultSetState {
                core: Arc::clone(&self.core),
                result_set_id,
                metadata,
                buffer,
                server_done,
                closed: false,
            },
        })
    }

    /// Runs a stored-procedure call (§2 `call`, §4.5, §4.7): same wire recipe as
    /// [`Session::exec`]/[`Session::query`] (`StatementId, Parameters` via `Execute`), but
    /// a procedure's reply may carry `RowsAffected`, OUT/INOUT `OutputParameters`, and a
    /// table-valued ref-cursor result all at once.
    pub fn call(
        &self,
        statement_id: StatementId,
        prepare_result: &PrepareResult,
        rows: ParameterRows,
    ) -> HdbResult<CallResult<T>> {
        self.check_canceled()?;
        let descriptors = Arc::clone(&prepare_result.parameter_descriptors);
        let metadata = prepare_result.result_set_metadata.clone();

        let mut core = self.core.lock()?;
        let reply = core.roundtrip(
            MessageType::Execute,
            0,
            |r| {
                r.push(Part::StatementId(statement_id.0));
                r.push(Part::Parameters(rows));
            },
            metadata.as_ref(),
            Some(&descriptors),
        )?;
        let legacy = core.legacy();
        drop(core);
        self.check_canceled()?;

        self.scopes.transaction_open.store(true, Ordering::SeqCst);

        let mut rows_affected = Vec::new();
        let mut output_parameters = None;
        let mut result_set_id = None;
        let mut buffer = VecDeque::new();
        let mut server_done = true;
        for part in reply.parts {
            match part {
                Part::RowsAffected(v) => rows_affected = v,
                Part::OutputParameters(op) => output_parameters = Some(op),
                Part::ResultSetId(id) => result_set_id = Some(id),
                Part::ResultSet(rs_rows, is_last) => {
                    buffer.extend(rs_rows);
                    server_done = is_last;
                }
                _ => {}
            }
        }

        let table_output = match (result_set_id, metadata) {
            (Some(result_set_id), Some(_metadata)) if legacy => {
                let _ = (buffer, server_done);
                Some(CallTableOutput::LegacyHandle(format!("{result_set_id:#x}")))
            }
            (Some(result_set_id), Some(metadata)) => Some(CallTableOutput::ResultSet(ResultSet {
                state: ResultSetState {
                    core: Arc::clone(&self.core),
                    result_set_id,
                    metadata,
                    buffer,
                    server_done,
                    closed: false,
                },
            })),
            _ => None,
        };

        Ok(CallResult {
            rows_affected,
            output_parameters,
            table_output,
        })
    }

    /// Runs a free-standing statement outside the prepare/exec split (`ExecuteDirect`),
    /// for DDL and other parameterless commands.
    pub fn execute_direct(&self, sql: &str) -> HdbResult<Vec<crate::protocol::ExecutionResult>> {
        self.check_canceled()?;
        let mut core = self.core.lock()?;
        let reply = core.roundtrip(MessageType::ExecuteDirect, 0, |r| r.push(Part::Command(sql)), None, None)?;
        drop(core);
        self.check_canceled()?;
        self.scopes.transaction_open.store(true, Ordering::SeqCst);

        let mut rows_affected = Vec::new();
        for part in reply.parts {
            if let Part::RowsAffected(v) = part {
                rows_affected = v;
            }
        }
        Ok(rows_affected)
    }

    pub fn begin(&self) -> HdbResult<()> {
        let mut core = self.core.lock()?;
        core.set_auto_commit(false);
        Ok(())
    }

    pub fn commit(&self) -> HdbResult<()> {
        self.check_canceled()?;
        let mut core = self.core.lock()?;
        core.roundtrip(MessageType::Commit, 0, |_| {}, None, None)?;
        core.set_auto_commit(true);
        drop(core);
        self.check_canceled()?;
        self.scopes.transaction_open.store(false, Ordering::SeqCst);
        Ok(())
    }

    pub fn rollback(&self) -> HdbResult<()> {
        self.check_canceled()?;
        let mut core = self.core.lock()?;
        core.roundtrip(MessageType::Rollback, 0, |_| {}, None, None)?;
        core.set_auto_commit(true);
        drop(core);
        self.check_canceled()?;
        self.scopes.transaction_open.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Drops a prepared statement server-side; idempotent (§8).
    pub fn drop_statement(&self, statement_id: StatementId) -> HdbResult<()> {
        let mut core = self.core.lock()?;
        let result = core.roundtrip(
            MessageType::DropStatementId,
            0,
            |r| r.push(Part::StatementId(statement_id.0)),
            None,
            None,
        );
        drop(core);
        self.scopes.open_statements.fetch_sub(1, Ordering::SeqCst);
        result.map(|_| ())
    }

    /// Reads the next chunk of a character or binary LOB by locator, streaming it into
    /// `sink` until the server marks the chunk stream as complete (§4.6).
    pub fn read_lob(&self, locator_id: u64, chunk_size: u32, sink: &mut dyn LobSink) -> HdbResult<()> {
        let mut offset: u64 = 0;
        loop {
            self.check_canceled()?;
            let mut core = self.core.lock()?;
            let reply = core.roundtrip(
                MessageType::ReadLob,
                0,
                |r| r.push(Part::ReadLobRequest(ReadLobRequest::new(locator_id, offset, chunk_size))),
                None,
                None,
            )?;
            drop(core);
            self.check_canceled()?;

            let mut done = true;
            for part in reply.parts {
                if let Part::ReadLobReply(reply) = part {
                    let (data, is_last) = reply.into_data_and_last();
                    offset += data.len() as u64;
                    sink.write_chunk(&data)?;
                    done = is_last;
                }
            }
            if done {
                return Ok(());
            }
        }
    }

    /// Streams an outbound LOB to the locator(s) the server assigned after `exec`
    /// (§4.6): reads `source` in `chunk_size`-sized pieces until exhausted.
    pub fn write_lob(&self, locator_id: u64, chunk_size: usize, source: &mut dyn LobSource) -> HdbResult<()> {
        let mut offset: i64 = 0;
        let mut buf = vec![0_u8; chunk_size];
        loop {
            self.check_canceled()?;
            let n = source.read_chunk(&mut buf)?;
            let last = n < buf.len();
            let mut core = self.core.lock()?;
            core.roundtrip(
                MessageType::WriteLob,
                0,
                |r| {
                    r.push(Part::WriteLobRequest(WriteLobRequest::new(
                        locator_id,
                        offset,
                        &buf[..n],
                        last,
                    )))
                },
                None,
                None,
            )?;
            drop(core);
            self.check_canceled()?;
            offset += n as i64;
            if last {
                return Ok(());
            }
        }
    }

    /// Re-authenticates the connection as a different user (§4.5). Refused while a
    /// transaction or a prepared statement is still open.
    pub fn with_user(&self, username: impl Into<String>, password: impl Into<String>) -> HdbResult<()> {
        if self.scopes.open_statements.load(Ordering::SeqCst) > 0
            || self.scopes.transaction_open.load(Ordering::SeqCst)
        {
            return Err(HdbError::SwitchUser);
        }
        let mut core = self.core.lock()?;
        let params = ConnectParams::builder()
            .username(username)
            .password(password)
            .build()?;
        core.reauthenticate(params)
    }

    /// Closes the session, sending a best-effort disconnect request.
    pub fn close(self) -> HdbResult<()> {
        let mut core = self.core.lock()?;
        core.disconnect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_id_debug_is_hex() {
        let id = StatementId(0xAB);
        assert_eq!(format!("{id:?}"), "StatementId(0xab)");
    }

    /// Wire-level fakes for session tests: an in-process `Read + Write` transport
    /// scripted with the exact reply bytes a scenario describes, since there is no live
    /// HANA server to round-trip against in this test environment (§8 end-to-end
    /// scenarios).
    mod mock {
        use std::io::{Cursor, Read, Write};
        use std::sync::{Arc, Mutex};

        type CancelHook = Box<dyn FnOnce() + Send>;

        /// Replays a scripted byte stream of concatenated reply messages. `cancel_cell`,
        /// if populated before the first `read()`, fires once — used to simulate a
        /// `cancel()` issued while the caller is blocked on the network (§8 scenario 3).
        pub(super) struct MockTransport {
            stream: Cursor<Vec<u8>>,
            cancel_cell: Arc<Mutex<Option<CancelHook>>>,
        }

        impl MockTransport {
            pub(super) fn new(replies: Vec<u8>) -> Self {
                Self {
                    stream: Cursor::new(replies),
                    cancel_cell: Arc::new(Mutex::new(None)),
                }
            }

            pub(super) fn with_cancel_cell(
                replies: Vec<u8>,
                cancel_cell: Arc<Mutex<Option<CancelHook>>>,
            ) -> Self {
                Self {
                    stream: Cursor::new(replies),
                    cancel_cell,
                }
            }
        }

        impl Read for MockTransport {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if let Some(hook) = self.cancel_cell.lock().unwrap().take() {
                    hook();
                }
                self.stream.read(buf)
            }
        }

        impl Write for MockTransport {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        pub(super) const KIND_ROWS_AFFECTED: i8 = 5;
        pub(super) const KIND_ERROR: i8 = 6;
        pub(super) const KIND_STATEMENT_ID: i8 = 10;
        pub(super) const KIND_RESULT_SET: i8 = 13;
        pub(super) const KIND_RESULT_SET_METADATA: i8 = 14;
        pub(super) const KIND_PARAMETER_METADATA: i8 = 17;
        pub(super) const KIND_RESULT_SET_ID: i8 = 33;
        pub(super) const KIND_READ_LOB_REPLY: i8 = 41;

        /// One reply message: a 32-byte message header, a 24-byte segment header
        /// (`SegmentKind::Reply`), and the given already-encoded parts back to back (§6).
        pub(super) fn reply_message(session_id: u64, seq: i32, parts: &[Vec<u8>]) -> Vec<u8> {
            let body: Vec<u8> = parts.iter().flatten().copied().collect();
            let segment_length = 24 + body.len() as i32;
            let mut buf = Vec::new();
            buf.extend_from_slice(&session_id.to_le_bytes());
            buf.extend_from_slice(&seq.to_le_bytes());
            buf.extend_from_slice(&(segment_length as u32).to_le_bytes());
            buf.extend_from_slice(&(segment_length as u32).to_le_bytes());
            buf.extend_from_slice(&1_i16.to_le_bytes());
            buf.extend_from_slice(&[0_u8; 10]);

            buf.extend_from_slice(&segment_length.to_le_bytes());
            buf.extend_from_slice(&0_i32.to_le_bytes());
            buf.extend_from_slice(&(parts.len() as i16).to_le_bytes());
            buf.extend_from_slice(&1_i16.to_le_bytes());
            buf.push(2); // SegmentKind::Reply
            buf.push(0); // message_type, unused on reply parse
            buf.push(0); // commit
            buf.push(0); // command_options
            buf.extend_from_slice(&[0_u8; 8]);
            buf.extend_from_slice(&0_i16.to_le_bytes()); // function_code
            buf.extend_from_slice(&body);
            buf
        }

        /// One part: kind/attributes/arg-count header, the body, and 8-byte padding (§6).
        pub(super) fn part(kind: i8, attributes: i8, arg_count: i16, body: &[u8]) -> Vec<u8> {
            let mut buf = Vec::new();
            buf.push(kind as u8);
            buf.push(attributes as u8);
            buf.extend_from_slice(&arg_count.to_le_bytes());
            buf.extend_from_slice(&0_i32.to_le_bytes());
            buf.extend_from_slice(&(body.len() as i32).to_le_bytes());
            buf.extend_from_slice(&(body.len() as i32).to_le_bytes());
            buf.extend_from_slice(body);
            let pad = (8 - (body.len() % 8)) % 8;
            buf.extend(std::iter::repeat(0_u8).take(pad));
            buf
        }

        pub(super) fn statement_id_body(id: u64) -> Vec<u8> {
            id.to_le_bytes().to_vec()
        }

        pub(super) fn rows_affected_body(results: &[i32]) -> Vec<u8> {
            results.iter().flat_map(|n| n.to_le_bytes()).collect()
        }

        /// `count` IN `Int` parameter descriptors (§6): no default, no name.
        pub(super) fn parameter_metadata_body(count: usize) -> Vec<u8> {
            let mut buf = Vec::new();
            for _ in 0..count {
                buf.push(0); // option: mandatory
                buf.push(3); // type code: Int
                buf.push(0b1000); // mode: IN
                buf.push(0); // reserved
                buf.extend_from_slice(&0xFFFF_FFFF_u32.to_le_bytes()); // no name
                buf.extend_from_slice(&0_i16.to_le_bytes()); // precision
                buf.extend_from_slice(&0_i16.to_le_bytes()); // scale
                buf.extend_from_slice(&0_u32.to_le_bytes()); // reserved
            }
            buf
        }

        /// `count` NOT NULL `Int` result columns (§6), with no name table (every name
        /// offset is the `NO_NAME` sentinel).
        pub(super) fn result_set_metadata_body(count: usize) -> Vec<u8> {
            let mut buf = Vec::new();
            for _ in 0..count {
                buf.push(0); // column_options: not nullable
                buf.push(3); // type code: Int
                buf.extend_from_slice(&0_i16.to_le_bytes()); // scale
                buf.extend_from_slice(&0_i16.to_le_bytes()); // precision
                buf.extend_from_slice(&0_u16.to_le_bytes()); // filler
                for _ in 0..4 {
                    buf.extend_from_slice(&0xFFFF_FFFF_u32.to_le_bytes());
                }
            }
            buf
        }

        /// `rows` of not-null `Int` values, one row per inner slice.
        pub(super) fn int_result_set_body(rows: &[&[i32]]) -> Vec<u8> {
            let mut buf = Vec::new();
            for row in rows {
                for v in *row {
                    buf.push(1); // not-null indicator
                    buf.extend_from_slice(&v.to_le_bytes());
                }
            }
            buf
        }

        pub(super) fn read_lob_reply_body(locator_id: u64, data: &[u8], is_last: bool) -> Vec<u8> {
            let mut buf = Vec::new();
            buf.extend_from_slice(&locator_id.to_le_bytes());
            buf.push(if is_last { 0b100 } else { 0 });
            buf.extend_from_slice(&(data.len() as i32).to_le_bytes());
            buf.extend_from_slice(&[0_u8; 3]);
            buf.extend_from_slice(data);
            buf
        }
    }

    use mock::{
        int_result_set_body, parameter_metadata_body, part, read_lob_reply_body, reply_message,
        result_set_metadata_body, rows_affected_body, statement_id_body, MockTransport,
        KIND_ERROR, KIND_PARAMETER_METADATA, KIND_READ_LOB_REPLY, KIND_RESULT_SET,
        KIND_RESULT_SET_ID, KIND_RESULT_SET_METADATA, KIND_ROWS_AFFECTED, KIND_STATEMENT_ID,
    };

    fn test_params() -> ConnectParams {
        ConnectParams::builder()
            .username("scott")
            .password("tiger")
            .build()
            .unwrap()
    }

    fn test_session(replies: Vec<u8>) -> Session<MockTransport> {
        let core = SessionCore::for_test(MockTransport::new(replies), test_params());
        Session::new(core)
    }

    /// §8 scenario 1: prepare/exec a DDL, prepare/bulk-exec an insert, prepare/query a
    /// select, and check the rows come back in the order written.
    #[test]
    fn prepare_exec_query_integer_round_trip() {
        let create_reply = reply_message(1, 1, &[part(KIND_STATEMENT_ID, 0, 1, &statement_id_body(1))]);
        let create_exec_reply =
            reply_message(1, 2, &[part(KIND_ROWS_AFFECTED, 0, 1, &rows_affected_body(&[0]))]);
        let insert_reply = reply_message(
            1,
            3,
            &[
                part(KIND_STATEMENT_ID, 0, 1, &statement_id_body(2)),
                part(KIND_PARAMETER_METADATA, 0, 2, &parameter_metadata_body(2)),
            ],
        );
        let insert_exec_reply = reply_message(
            1,
            4,
            &[part(KIND_ROWS_AFFECTED, 0, 3, &rows_affected_body(&[1, 1, 1]))],
        );
        let select_reply = reply_message(
            1,
            5,
            &[
                part(KIND_STATEMENT_ID, 0, 1, &statement_id_body(3)),
                part(KIND_RESULT_SET_METADATA, 0, 2, &result_set_metadata_body(2)),
            ],
        );
        let query_reply = reply_message(
            1,
            6,
            &[
                part(KIND_RESULT_SET_ID, 0, 1, &statement_id_body(100)),
                part(
                    KIND_RESULT_SET,
                    1, // last packet
                    3,
                    &int_result_set_body(&[&[0, 0], &[1, 1], &[2, 2]]),
                ),
            ],
        );

        let mut bytes = Vec::new();
        for msg in [
            create_reply,
            create_exec_reply,
            insert_reply,
            insert_exec_reply,
            select_reply,
            query_reply,
        ] {
            bytes.extend(msg);
        }
        let session = test_session(bytes);

        let (create_id, create_prep) = session.prepare("create table T (i integer, j integer)").unwrap();
        let (rows_affected, _) = session.exec(create_id, &create_prep, ParameterRows::new()).unwrap();
        assert_eq!(rows_affected, vec![crate::protocol::ExecutionResult::RowsAffected(0)]);

        let (insert_id, insert_prep) = session.prepare("insert into T values (?,?)").unwrap();
        assert_eq!(insert_prep.parameter_descriptors().len(), 2);
        let mut rows = ParameterRows::new();
        for (i, j) in [(0, 0), (1, 1), (2, 2)] {
            rows.push_row(vec![
                crate::protocol::parts::HdbValue::Int(i),
                crate::protocol::parts::HdbValue::Int(j),
            ]);
        }
        let (rows_affected, _) = session.exec(insert_id, &insert_prep, rows).unwrap();
        assert_eq!(rows_affected.len(), 3);
        assert!(rows_affected
            .iter()
            .all(|r| *r == crate::protocol::ExecutionResult::RowsAffected(1)));

        let (select_id, select_prep) = session.prepare("select i,j from T order by i").unwrap();
        let result_set = session.query(select_id, &select_prep, ParameterRows::new()).unwrap();
        let rows: Vec<Vec<i32>> = result_set
            .map(|r| {
                r.unwrap()
                    .values()
                    .iter()
                    .map(|v| match v {
                        crate::protocol::parts::HdbValue::Int(n) => *n,
                        other => panic!("unexpected value {other:?}"),
                    })
                    .collect()
            })
            .collect();
        assert_eq!(rows, vec![vec![0, 0], vec![1, 1], vec![2, 2]]);
    }

    /// §8 scenario 3: cancel after the Exec request is sent; that Exec fails with
    /// `HdbError::Canceled` and the next Exec on the same statement succeeds.
    #[test]
    fn cancel_fails_the_in_flight_exec_not_the_next_one() {
        let reply1 = reply_message(1, 1, &[part(KIND_ROWS_AFFECTED, 0, 1, &rows_affected_body(&[1]))]);
        let reply2 = reply_message(1, 2, &[part(KIND_ROWS_AFFECTED, 0, 1, &rows_affected_body(&[1]))]);
        let mut bytes = reply1;
        bytes.extend(reply2);

        let cancel_cell = Arc::new(Mutex::new(None));
        let transport = MockTransport::with_cancel_cell(bytes, Arc::clone(&cancel_cell));
        let core = SessionCore::for_test(transport, test_params());
        let session = Session::new(core);
        *cancel_cell.lock().unwrap() = Some({
            let session = session.clone();
            Box::new(move || session.cancel()) as Box<dyn FnOnce() + Send>
        });

        let statement_id = StatementId(1);
        let prepare_result = PrepareResult::default();

        let first = session.exec(statement_id, &prepare_result, ParameterRows::new());
        assert!(matches!(first, Err(HdbError::Canceled)), "expected Canceled, got {first:?}");

        let (rows_affected, _) = session
            .exec(statement_id, &prepare_result, ParameterRows::new())
            .expect("second Exec on the same statement must succeed");
        assert_eq!(rows_affected, vec![crate::protocol::ExecutionResult::RowsAffected(1)]);
    }

    /// Bulk-exec partial failure (§9 design note): a mixed `RowsAffected` reply keeps one
    /// failed row's `ServerError` attached at its row position instead of failing the
    /// whole call.
    #[test]
    fn bulk_exec_partial_failure_attaches_error_by_row_position() {
        let mut error_body = Vec::new();
        error_body.extend_from_slice(&301_i32.to_le_bytes()); // code
        error_body.extend_from_slice(&(-1_i32).to_le_bytes()); // position
        let text = b"unique constraint violated";
        error_body.extend_from_slice(&(text.len() as i32).to_le_bytes());
        error_body.push(2); // severity: Error
        error_body.extend_from_slice(b"23000"); // sqlstate
        error_body.extend_from_slice(text);
        let base_size = 4 + 4 + 4 + 1 + 5;
        let pad = (8 - (base_size + text.len() as i32) % 8) % 8;
        error_body.extend(std::iter::repeat(0_u8).take(pad as usize));

        let reply = reply_message(
            1,
            1,
            &[
                part(KIND_ROWS_AFFECTED, 0, 3, &rows_affected_body(&[1, -3, -2])),
                part(KIND_ERROR, 0, 1, &error_body),
            ],
        );
        let session = test_session(reply);

        let statement_id = StatementId(1);
        let prepare_result = PrepareResult::default();
        let (rows_affected, _) = session
            .exec(statement_id, &prepare_result, ParameterRows::new())
            .unwrap();

        assert_eq!(rows_affected.len(), 3);
        assert_eq!(rows_affected[0], crate::protocol::ExecutionResult::RowsAffected(1));
        assert!(rows_affected[1].is_failure());
        assert_eq!(rows_affected[2], crate::protocol::ExecutionResult::SuccessNoInfo);
        match &rows_affected[1] {
            crate::protocol::ExecutionResult::Failure(Some(err)) => {
                assert_eq!(err.code(), 301);
                assert_eq!(err.text(), "unique constraint violated");
            }
            other => panic!("expected an attached ServerError, got {other:?}"),
        }
    }

    /// `legacy` connect option (§6, §9): a procedure's table-valued ref-cursor surfaces as
    /// an opaque locator string instead of a live `ResultSet`.
    #[test]
    fn call_with_legacy_option_surfaces_table_output_as_a_handle() {
        let reply = reply_message(
            1,
            1,
            &[
                part(KIND_RESULT_SET_ID, 0, 1, &statement_id_body(0xBEEF)),
                part(KIND_RESULT_SET, 1, 1, &int_result_set_body(&[&[7]])),
            ],
        );
        let params = ConnectParams::builder()
            .username("scott")
            .password("tiger")
            .legacy(true)
            .build()
            .unwrap();
        let core = SessionCore::for_test(MockTransport::new(reply), params);
        let session = Session::new(core);

        let statement_id = StatementId(1);
        let mut prepare_result = PrepareResult::default();
        let md_bytes = result_set_metadata_body(1);
        let metadata = ResultSetMetadata::parse(1, 1, &mut &md_bytes[..]).unwrap();
        prepare_result.result_set_metadata = Some(Arc::new(metadata));

        let call_result = session.call(statement_id, &prepare_result, ParameterRows::new()).unwrap();
        match call_result.table_output {
            Some(CallTableOutput::LegacyHandle(handle)) => assert_eq!(handle, "0xbeef"),
            other => panic!("expected a legacy handle, got {other:?}"),
        }
    }

    /// Known limitation (documented in `DESIGN.md`): this engine tracks exactly one
    /// table-valued result per statement, so a reply carrying two `ResultSetId`/
    /// `ResultSet` pairs (an anonymous block's parallel result sets, §8 scenario 2) is
    /// flattened into a single `ResultSet` keyed by the *last* id, not split in two.
    #[test]
    fn parallel_result_sets_are_merged_not_split() {
        let reply = reply_message(
            1,
            1,
            &[
                part(KIND_RESULT_SET_ID, 0, 1, &statement_id_body(10)),
                part(KIND_RESULT_SET, 1, 1, &int_result_set_body(&[&[1]])),
                part(KIND_RESULT_SET_ID, 0, 1, &statement_id_body(20)),
                part(KIND_RESULT_SET, 1, 1, &int_result_set_body(&[&[2]])),
            ],
        );
        let session = test_session(reply);

        let statement_id = StatementId(1);
        let mut prepare_result = PrepareResult::default();
        let md_bytes = result_set_metadata_body(1);
        let metadata = ResultSetMetadata::parse(1, 1, &mut &md_bytes[..]).unwrap();
        prepare_result.result_set_metadata = Some(Arc::new(metadata));

        let result_set = session.query(statement_id, &prepare_result, ParameterRows::new()).unwrap();
        assert_eq!(result_set.state.result_set_id, 20);
        let rows: Vec<HdbResult<Row>> = result_set.collect();
        assert_eq!(rows.len(), 2, "both chunks land in the same buffer");
    }

    /// §8 scenario 5 (scaled to `read_lob`'s own unit of work): LOB bytes stream through
    /// unmodified, including a UTF-8 supplementary code point.
    #[test]
    fn read_lob_streams_bytes_through_unmodified() {
        let data = "𝄞 clef".as_bytes().to_vec();
        let reply = reply_message(
            1,
            1,
            &[part(
                KIND_READ_LOB_REPLY,
                0,
                1,
                &read_lob_reply_body(42, &data, true),
            )],
        );
        let session = test_session(reply);

        let mut sink = Vec::new();
        session.read_lob(42, 1024, &mut sink).unwrap();
        assert_eq!(sink, data);
    }
}
