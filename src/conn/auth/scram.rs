//! SCRAM-PBKDF2-SHA256 (primary) and SCRAM-SHA256 (fallback) authenticators (§4.4, §8
//! scenario 6).

use crate::conn::auth::authenticator::Authenticator;
use crate::conn::auth::crypto_util;
use crate::error::{HdbError, HdbResult};
use crate::protocol::parts::AuthFields;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use rand::{rngs::OsRng, RngCore};
use secstr::SecUtf8;
use std::io::Write as _;

const CLIENT_PROOF_SIZE: u8 = 32;

/// Wraps a 32-byte SCRAM client proof in the little-endian `count=1, length, bytes` layout
/// the server expects in the final auth round (distinct from the big-endian `AuthFields`
/// layout used everywhere else).
fn wrap_client_proof(proof: &[u8]) -> HdbResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(3 + CLIENT_PROOF_SIZE as usize);
    buf.write_u16::<LittleEndian>(1)?;
    buf.write_u8(CLIENT_PROOF_SIZE)?;
    buf.write_all(proof)?;
    Ok(buf)
}

pub(crate) struct ScramPbkdf2Sha256 {
    password: SecUtf8,
    client_challenge: Vec<u8>,
    server_proof: Option<Vec<u8>>,
}

impl ScramPbkdf2Sha256 {
    pub(crate) fn new(password: SecUtf8) -> Self {
        let mut client_challenge = vec![0_u8; 64];
        OsRng.fill_bytes(&mut client_challenge);
        Self {
            password,
            client_challenge,
            server_proof: None,
        }
    }
}

impl Authenticator for ScramPbkdf2Sha256 {
    fn name(&self) -> &'static str {
        "SCRAMPBKDF2SHA256"
    }

    fn client_challenge(&self) -> Vec<u8> {
        self.client_challenge.clone()
    }

    fn client_proof(&mut self, server_challenge_data: &[u8]) -> HdbResult<Vec<u8>> {
        let (salt, server_nonce, iterations) = parse_challenge(server_challenge_data, true)?;
        let (client_proof, server_proof) = crypto_util::scram_pbkdf2_sha256(
            &salt,
            &server_nonce,
            &self.client_challenge,
            &self.password,
            iterations.unwrap_or(15_000),
        )
        .map_err(|_| HdbError::protocol("PBKDF2 derivation failed on a valid-length key"))?;
        self.server_proof = Some(server_proof);
        wrap_client_proof(&client_proof)
    }

    fn verify_server(&self, server_proof: &[u8]) -> HdbResult<()> {
        verify(self.server_proof.as_deref(), server_proof)
    }
}

pub(crate) struct ScramSha256 {
    password: SecUtf8,
    client_challenge: Vec<u8>,
    server_proof: Option<Vec<u8>>,
}

impl ScramSha256 {
    pub(crate) fn new(password: SecUtf8) -> Self {
        let mut client_challenge = vec![0_u8; 64];
        OsRng.fill_bytes(&mut client_challenge);
        Self {
            password,
            client_challenge,
            server_proof: None,
        }
    }
}

impl Authenticator for ScramSha256 {
    fn name(&self) -> &'static str {
        "SCRAMSHA256"
    }

    fn client_challenge(&self) -> Vec<u8> {
        self.client_challenge.clone()
    }

    fn client_proof(&mut self, server_challenge_data: &[u8]) -> HdbResult<Vec<u8>> {
        let (salt, server_nonce, _iterations) = parse_challenge(server_challenge_data, false)?;
        let (client_proof, server_proof) = crypto_util::scram_sha256(
            &salt,
            &server_nonce,
            &self.client_challenge,
            &self.password,
        )
        .map_err(|_| HdbError::protocol("SCRAM-SHA256 derivation failed on a valid-length key"))?;
        self.server_proof = Some(server_proof);
        wrap_client_proof(&client_proof)
    }

    fn verify_server(&self, server_proof: &[u8]) -> HdbResult<()> {
        verify(self.server_proof.as_deref(), server_proof)
    }
}

fn verify(expected: Option<&[u8]>, actual: &[u8]) -> HdbResult<()> {
    match expected {
        Some(expected) if expected == actual => Ok(()),
        _ => {
            warn!("server proof mismatch during SCRAM authentication");
            Err(HdbError::Authentication(
                "server proof did not match; the server's identity cannot be confirmed".into(),
            ))
        }
    }
}

/// The server's challenge data for both SCRAM variants is an `AuthFields` carrying salt,
/// server nonce, and (PBKDF2 only) an iteration count.
fn parse_challenge(data: &[u8], has_iterations: bool) -> HdbResult<(Vec<u8>, Vec<u8>, Option<u32>)> {
    let mut fields = AuthFields::parse(&mut std::io::Cursor::new(data))?;
    let iterations = if has_iterations {
        let raw = fields
            .pop()
            .ok_or_else(|| HdbError::protocol("missing PBKDF2 iteration count field"))?;
        Some(std::io::Cursor::new(raw).read_u32::<BigEndian>()?)
    } else {
        None
    };
    let server_nonce = fields
        .pop()
        .ok_or_else(|| HdbError::protocol("missing SCRAM server nonce field"))?;
    let salt = fields
        .pop()
        .ok_or_else(|| HdbError::protocol("missing SCRAM salt field"))?;
    if let Some(iterations) = iterations {
        if iterations < 15_000 {
            return Err(HdbError::protocol(format!(
                "PBKDF2 iteration count too low: {iterations}"
            )));
        }
    }
    if salt.len() < 16 {
        return Err(HdbError::protocol("SCRAM salt shorter than 16 bytes"));
    }
    Ok((salt, server_nonce, iterations))
}
