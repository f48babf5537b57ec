//! Connection establishment and per-session wire state (§4.4, §4.5, §5): authenticates an
//! already-established transport, negotiates connect options, and drives the
//! request/reply round-trip every session-level operation in `client.rs` builds on.

mod auth;
mod cookie;
mod params;

pub use params::{ClientCertificate, ConnectParams, ConnectParamsBuilder, CredentialRefresh};

use crate::error::{HdbError, HdbResult};
use crate::protocol::parts::{ConnectOptions, ParameterDescriptors, ResultSetMetadata, Topology};
use crate::protocol::{MessageType, Reply, Request};
use cookie::CookieCache;
use std::io::{Read, Write};
use std::sync::Arc;

/// Process-wide session-cookie cache, shared across every `connect()` call in this
/// process so a reconnect for the same (host, logon name) can skip a full SCRAM
/// round-trip (§4.4, §5).
fn global_cookie_cache() -> &'static CookieCache {
    static CACHE: std::sync::OnceLock<CookieCache> = std::sync::OnceLock::new();
    CACHE.get_or_init(CookieCache::default)
}

/// The wire-level engine behind a [`crate::Session`]: owns the transport, the
/// session id and sequence counter, and the negotiated connect options. Every
/// method either succeeds or marks the session broken (§5, `ErrSessionBroken`).
pub(crate) struct SessionCore<T> {
    transport: T,
    session_id: u64,
    seq_number: i32,
    auto_commit: bool,
    connect_options: ConnectOptions,
    #[allow(dead_code)]
    topology: Option<Topology>,
    dfv: u8,
    fetch_size: u32,
    lob_read_length: u32,
    lob_write_length: usize,
    bulk_size: usize,
    statement_sequence: Option<i64>,
    broken: bool,
    host: String,
    params: ConnectParams,
}

impl<T: Read + Write> SessionCore<T> {
    /// Authenticates over `transport` and negotiates connect options (§4.4, §4.5).
    /// `host` identifies the server for the session-cookie cache; it need not be
    /// resolvable, only stable across reconnects to the same logical server.
    pub(crate) fn connect(mut transport: T, params: ConnectParams, host: impl Into<String>) -> HdbResult<Self> {
        let host = host.into();
        let cookies = global_cookie_cache();
        let outcome = auth::authenticate(&mut transport, &params, &host, cookies)?;
        let dfv = outcome.connect_options.negotiated_dfv(params.dfv());

        Ok(Self {
            transport,
            session_id: outcome.session_id,
            seq_number: 0,
            auto_commit: true,
            connect_options: outcome.connect_options,
            topology: outcome.topology,
            dfv,
            fetch_size: params.fetch_size(),
            lob_read_length: crate::DEFAULT_LOB_READ_LENGTH,
            lob_write_length: params.lob_chunk_size(),
            bulk_size: params.bulk_size(),
            statement_sequence: None,
            broken: false,
            host,
            params,
        })
    }

    /// Builds a session core directly over `transport`, skipping the authentication
    /// handshake. Only for session-level tests driving a mock transport that starts
    /// mid-session (§8 scenarios 1, 2, 3, 5).
    #[cfg(test)]
    pub(crate) fn for_test(transport: T, params: ConnectParams) -> Self {
        Self {
            transport,
            session_id: 1,
            seq_number: 0,
            auto_commit: true,
            connect_options: ConnectOptions::default(),
            topology: None,
            dfv: params.dfv(),
            fetch_size: params.fetch_size(),
            lob_read_length: crate::DEFAULT_LOB_READ_LENGTH,
            lob_write_length: params.lob_chunk_size(),
            bulk_size: params.bulk_size(),
            statement_sequence: None,
            broken: false,
            host: "mock".to_string(),
            params,
        }
    }

    pub(crate) fn dfv(&self) -> u8 {
        self.dfv
    }

    pub(crate) fn fetch_size(&self) -> u32 {
        self.fetch_size
    }

    pub(crate) fn set_fetch_size(&mut self, fetch_size: u32) {
        self.fetch_size = fetch_size;
    }

    pub(crate) fn lob_read_length(&self) -> u32 {
        self.lob_read_length
    }

    pub(crate) fn set_lob_read_length(&mut self, len: u32) {
        self.lob_read_length = len;
    }

    pub(crate) fn lob_write_length(&self) -> usize {
        self.lob_write_length
    }

    pub(crate) fn bulk_size(&self) -> usize {
        self.bulk_size
    }

    pub(crate) fn legacy(&self) -> bool {
        self.params.legacy()
    }

    pub(crate) fn cesu8_decode_policy(&self) -> crate::codec::Cesu8DecodePolicy {
        self.params.cesu8_decode_policy
    }

    pub(crate) fn set_auto_commit(&mut self, auto_commit: bool) {
        self.auto_commit = auto_commit;
    }

    pub(crate) fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    pub(crate) fn statement_sequence(&self) -> Option<i64> {
        self.statement_sequence
    }

    pub(crate) fn is_broken(&self) -> bool {
        self.broken
    }

    fn next_seq_number(&mut self) -> i32 {
        self.seq_number += 1;
        self.seq_number
    }

    /// Builds, sends and reads one message for `message_type`, applying the default
    /// error-handling policy (§4.5, §7, §9). Any I/O failure permanently breaks the
    /// session; subsequent calls fail fast with `HdbError::SessionBroken`.
    pub(crate) fn roundtrip(
        &mut self,
        message_type: MessageType,
        command_options: u8,
        build: impl for<'r> FnOnce(&mut Request<'r>),
        result_set_metadata: Option<&Arc<ResultSetMetadata>>,
        parameter_descriptors: Option<&Arc<ParameterDescriptors>>,
    ) -> HdbResult<Reply<'static>> {
        if self.broken {
            return Err(HdbError::SessionBroken);
        }

        let mut request = Request::new(message_type, command_options);
        build(&mut request);

        let seq_number = self.next_seq_number();
        let result = request
            .emit(
                self.session_id,
                seq_number,
                self.auto_commit,
                parameter_descriptors,
                &mut self.transport,
            )
            .and_then(|()| Reply::parse(result_set_metadata, parameter_descriptors, false, &mut self.transport));

        match result {
            Ok(reply) => {
                for w in &reply.warnings {
                    warn!("server warning: {w}");
                }
                reply.handle_db_error()
            }
            Err(e) => {
                self.broken = true;
                Err(e)
            }
        }
    }

    /// Best-effort disconnect; failures are logged, not propagated (§4.5 "Disconnect").
    pub(crate) fn disconnect(&mut self) {
        if self.broken {
            return;
        }
        let seq_number = self.next_seq_number();
        let mut request = Request::new(MessageType::Disconnect, 0);
        if let Err(e) = request.emit(self.session_id, seq_number, self.auto_commit, None, &mut self.transport) {
            debug!("disconnect request failed: {e}");
            return;
        }
        if let Err(e) = Reply::parse(None, None, false, &mut self.transport) {
            debug!("disconnect reply failed: {e}");
        }
    }

    pub(crate) fn host(&self) -> &str {
        &self.host
    }

    /// Re-authenticates the same transport as a different user (§4.5 "user switch").
    /// The caller is responsible for refusing this while a transaction or a prepared
    /// statement is open; this just replays the handshake and adopts its outcome.
    pub(crate) fn reauthenticate(&mut self, params: ConnectParams) -> HdbResult<()> {
        if self.broken {
            return Err(HdbError::SessionBroken);
        }
        let cookies = global_cookie_cache();
        let outcome = auth::authenticate(&mut self.transport, &params, &self.host, cookies)?;
        self.session_id = outcome.session_id;
        self.dfv = outcome.connect_options.negotiated_dfv(params.dfv());
        self.connect_options = outcome.connect_options;
        self.topology = outcome.topology;
        self.seq_number = 0;
        self.auto_commit = true;
        self.statement_sequence = None;
        self.params = params;
        Ok(())
    }
}

impl<T> std::fmt::Debug for SessionCore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCore")
            .field("session_id", &self.session_id)
            .field("seq_number", &self.seq_number)
            .field("broken", &self.broken)
            .finish_non_exhaustive()
    }
}

/// Authenticates over an already-established transport and negotiates a session (§3,
/// §4.4, §4.7). `host` identifies the server for the session-cookie cache.
pub fn connect<T: Read + Write + Send>(
    transport: T,
    params: ConnectParams,
    host: impl Into<String>,
) -> HdbResult<crate::client::Session<T>> {
    let core = SessionCore::connect(transport, params, host)?;
    Ok(crate::client::Session::new(core))
}
