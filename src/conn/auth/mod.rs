//! Authentication engine (§4.4): proposes every method the caller configured credentials
//! for, drives whichever one the server selects through its final round, and on success
//! hands back the negotiated session id, connect options, and topology. Falls back from
//! SCRAM-PBKDF2-SHA256 to SCRAM-SHA256 when the server rejects the stronger variant, and
//! retries once per credential class via the caller's refresh callbacks.

mod authenticator;
mod crypto_util;
mod jwt;
mod scram;
mod session_cookie;
mod x509;

pub(crate) use authenticator::Authenticator;

use crate::conn::cookie::CookieCache;
use crate::conn::params::{ConnectParams, CredentialRefresh};
use crate::error::{HdbError, HdbResult};
use crate::protocol::parts::{AuthFields, ConnectOptions, Topology};
use crate::protocol::{MessageType, Part, Request};
use jwt::JwtAuthenticator;
use scram::{ScramPbkdf2Sha256, ScramSha256};
use session_cookie::SessionCookieAuthenticator;
use std::io::{Read, Write};
use x509::X509Authenticator;

/// Everything a successful handshake establishes for the session that follows.
pub(crate) struct AuthOutcome {
    pub(crate) session_id: u64,
    pub(crate) connect_options: ConnectOptions,
    pub(crate) topology: Option<Topology>,
}

type BoxedAuthenticator = Box<dyn Authenticator + Send>;

fn primary_candidates(
    params: &ConnectParams,
    host: &str,
    cookies: &CookieCache,
) -> Vec<BoxedAuthenticator> {
    let mut candidates: Vec<BoxedAuthenticator> = Vec::new();

    if let Some(cookie) = cookies.get(host, &params.username) {
        let client_id = params.client_id.clone().unwrap_or_default();
        candidates.push(Box::new(SessionCookieAuthenticator::new(cookie, client_id)));
    }
    if let Some(cert) = &params.client_certificate {
        if let Ok(auth) = X509Authenticator::new(cert) {
            candidates.push(Box::new(auth));
        }
    }
    if let Some(password) = &params.password {
        candidates.push(Box::new(ScramPbkdf2Sha256::new(password.clone())));
    }
    if let Some(token) = &params.token {
        candidates.push(Box::new(JwtAuthenticator::new(token.clone())));
    }

    candidates
}

/// Drives one full two-round handshake with the given candidate list. Returns the chosen
/// method's name alongside the outcome, so the caller can decide whether a fallback or a
/// refresh-and-retry applies.
fn try_handshake<T: Read + Write>(
    transport: &mut T,
    params: &ConnectParams,
    candidates: Vec<BoxedAuthenticator>,
) -> HdbResult<(String, AuthOutcome, Vec<u8>)> {
    if candidates.is_empty() {
        return Err(HdbError::Authentication(
            "no credentials configured: set a password, a client certificate, or a token".into(),
        ));
    }

    let mut first_fields = AuthFields::default();
    first_fields.push(params.username.as_bytes().to_vec());
    for candidate in &candidates {
        first_fields.push(candidate.name().as_bytes().to_vec());
        first_fields.push(candidate.client_challenge());
    }

    let mut request1 = Request::new(MessageType::Authenticate, 0);
    request1.push(Part::Auth(first_fields));
    request1.emit(0, 1, false, None, transport)?;

    let reply1 = crate::protocol::Reply::parse(None, None, true, transport)?.into_auth_result()?;
    let (chosen_name, server_challenge_data) = extract_first_response(reply1)?;

    let mut chosen = candidates
        .into_iter()
        .find(|c| c.name() == chosen_name)
        .ok_or_else(|| {
            HdbError::Authentication(format!("server selected unproposed method {chosen_name}"))
        })?;

    let proof = chosen.client_proof(&server_challenge_data)?;

    let mut second_fields = AuthFields::default();
    let username_for_round2 = if chosen_name == "X509" {
        Vec::new()
    } else {
        params.username.as_bytes().to_vec()
    };
    second_fields.push(username_for_round2);
    second_fields.push(chosen_name.as_bytes().to_vec());
    second_fields.push(proof);

    let mut request2 = Request::new(MessageType::Connect, 0);
    request2.push(Part::Auth(second_fields));
    request2.push(Part::ConnectOptions(ConnectOptions::for_request(
        params.dfv,
        params.locale(),
    )));
    request2.emit(0, 2, false, None, transport)?;

    let reply2 = crate::protocol::Reply::parse(None, None, true, transport)?.into_auth_result()?;
    let session_id = reply2.session_id;

    let mut connect_options = ConnectOptions::default();
    let mut topology = None;
    let mut cookie = Vec::new();
    let mut server_proof = Vec::new();

    for part in reply2.parts {
        match part {
            Part::ConnectOptions(opts) => connect_options = opts,
            Part::TopologyInformation(t) => topology = Some(t),
            Part::Auth(mut af) => {
                let c = af.pop().unwrap_or_default();
                let p = af.pop().unwrap_or_default();
                // remaining field, if present, is the method name echoed back; unused.
                cookie = c;
                server_proof = p;
            }
            _ => {}
        }
    }

    chosen.verify_server(&server_proof)?;

    Ok((
        chosen_name,
        AuthOutcome {
            session_id,
            connect_options,
            topology,
        },
        cookie,
    ))
}

fn extract_first_response(reply: crate::protocol::Reply<'_>) -> HdbResult<(String, Vec<u8>)> {
    for part in reply.parts {
        if let Part::Auth(mut af) = part {
            let challenge = af
                .pop()
                .ok_or_else(|| HdbError::protocol("missing server challenge in auth reply"))?;
            let raw_name = af
                .pop()
                .ok_or_else(|| HdbError::protocol("missing chosen method name in auth reply"))?;
            let name = String::from_utf8(raw_name)
                .map_err(|_| HdbError::protocol("chosen auth method name is not valid UTF-8"))?;
            return Ok((name, challenge));
        }
    }
    Err(HdbError::protocol("auth reply carried no Auth part"))
}

/// Runs the full authentication engine (§4.4): session-cookie fast path, then whatever
/// credentials the caller configured, with the PBKDF2→SHA256 fallback and one
/// refresh-and-retry per credential class on failure.
pub(crate) fn authenticate<T: Read + Write>(
    transport: &mut T,
    params: &ConnectParams,
    host: &str,
    cookies: &CookieCache,
) -> HdbResult<AuthOutcome> {
    let candidates = primary_candidates(params, host, cookies);
    match try_handshake(transport, params, candidates) {
        Ok((chosen_name, outcome, cookie)) => {
            if !cookie.is_empty() {
                cookies.store(host, &params.username, cookie);
            }
            Ok(outcome)
        }
        Err(first_error) => {
            if let Some(outcome) = retry_with_fallback_or_refresh(transport, params, host, cookies, &first_error)? {
                return Ok(outcome);
            }
            cookies.invalidate(host, &params.username);
            Err(first_error)
        }
    }
}

/// Tries, in order: the SCRAM-SHA256 fallback (password present), then one refresh-and-retry
/// per configured credential class. Returns `Ok(None)` if nothing applicable succeeded, so
/// the caller can surface the original error.
fn retry_with_fallback_or_refresh<T: Read + Write>(
    transport: &mut T,
    params: &ConnectParams,
    host: &str,
    cookies: &CookieCache,
    _first_error: &HdbError,
) -> HdbResult<Option<AuthOutcome>> {
    if let Some(password) = &params.password {
        let fallback: Vec<BoxedAuthenticator> =
            vec![Box::new(ScramSha256::new(password.clone()))];
        if let Ok((_, outcome, cookie)) = try_handshake(transport, params, fallback) {
            if !cookie.is_empty() {
                cookies.store(host, &params.username, cookie);
            }
            return Ok(Some(outcome));
        }
    }

    for refresh in &params.refresh {
        let candidates: Vec<BoxedAuthenticator> = match refresh {
            CredentialRefresh::Password(f) => vec![Box::new(ScramPbkdf2Sha256::new(f()))],
            CredentialRefresh::Token(f) => vec![Box::new(JwtAuthenticator::new(f()))],
            CredentialRefresh::ClientCert(f) => {
                let cert = f();
                match X509Authenticator::new(&cert) {
                    Ok(auth) => vec![Box::new(auth)],
                    Err(_) => continue,
                }
            }
        };
        if let Ok((_, outcome, cookie)) = try_handshake(transport, params, candidates) {
            if !cookie.is_empty() {
                cookies.store(host, &params.username, cookie);
            }
            return Ok(Some(outcome));
        }
    }

    Ok(None)
}
