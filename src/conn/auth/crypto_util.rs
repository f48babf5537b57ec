//! SCRAM primitives (§4.4, §8 scenario 6): `HMAC-SHA256`, `SHA256`, `PBKDF2-HMAC-SHA256`,
//! and the byte-wise XOR the two SCRAM variants share.

use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2;
use secstr::SecUtf8;
use sha2::{Digest, Sha256};

/// `SCRAMKey = SHA256(PBKDF2(password, salt, rounds, 32, SHA256))`; `client_proof` and
/// `server_proof` as defined in §4.4.
pub(crate) fn scram_pbkdf2_sha256(
    salt: &[u8],
    server_nonce: &[u8],
    client_nonce: &[u8],
    password: &SecUtf8,
    iterations: u32,
) -> Result<(Vec<u8>, Vec<u8>), crypto_common::InvalidLength> {
    let salted_password = pbkdf2_sha256(password.unsecure().as_bytes(), salt, iterations);
    scram_from_salted_password(&salted_password, salt, server_nonce, client_nonce)
}

/// The SCRAM-SHA256 fallback (§4.4): `salted_password = HMAC(password, salt)` instead of
/// PBKDF2.
pub(crate) fn scram_sha256(
    salt: &[u8],
    server_nonce: &[u8],
    client_nonce: &[u8],
    password: &SecUtf8,
) -> Result<(Vec<u8>, Vec<u8>), crypto_common::InvalidLength> {
    let salted_password = hmac(password.unsecure().as_bytes(), salt)?;
    scram_from_salted_password(&salted_password, salt, server_nonce, client_nonce)
}

fn scram_from_salted_password(
    salted_password: &[u8],
    salt: &[u8],
    server_nonce: &[u8],
    client_nonce: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), crypto_common::InvalidLength> {
    let server_verifier = hmac(salted_password, salt)?;

    let client_key = sha256(salted_password);
    let client_verifier = sha256(&client_key);

    let mut salt_serverno_clientno = Vec::with_capacity(salt.len() + server_nonce.len() + client_nonce.len());
    salt_serverno_clientno.extend_from_slice(salt);
    salt_serverno_clientno.extend_from_slice(server_nonce);
    salt_serverno_clientno.extend_from_slice(client_nonce);
    let shared_key = hmac(&client_verifier, &salt_serverno_clientno)?;
    let client_proof = xor(&shared_key, &client_key);

    let mut clientno_salt_serverno = Vec::with_capacity(client_nonce.len() + salt.len() + server_nonce.len());
    clientno_salt_serverno.extend_from_slice(client_nonce);
    clientno_salt_serverno.extend_from_slice(salt);
    clientno_salt_serverno.extend_from_slice(server_nonce);
    let server_proof = hmac(&server_verifier, &clientno_salt_serverno)?;

    Ok((client_proof, server_proof))
}

fn pbkdf2_sha256(key: &[u8], salt: &[u8], iterations: u32) -> Vec<u8> {
    let mut output = [0_u8; 32];
    pbkdf2::<Hmac<Sha256>>(key, salt, iterations, &mut output)
        .expect("32-byte output is always a valid PBKDF2-HMAC-SHA256 length");
    output.to_vec()
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, crypto_common::InvalidLength> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

pub(crate) fn sha256(input: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hasher.finalize().to_vec()
}

fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    debug_assert_eq!(a.len(), b.len(), "xor operands must be equally long");
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pbkdf2_variant_is_deterministic() {
        let salt = b"0123456789abcdef";
        let server_nonce = b"server-nonce-bytes-long-enough..";
        let client_nonce = b"client-nonce-bytes-long-enough..";
        let password = SecUtf8::from("s3cr3t");
        let (p1, s1) =
            scram_pbkdf2_sha256(salt, server_nonce, client_nonce, &password, 15_000).unwrap();
        let (p2, s2) =
            scram_pbkdf2_sha256(salt, server_nonce, client_nonce, &password, 15_000).unwrap();
        assert_eq!(p1, p2);
        assert_eq!(s1, s2);
        assert_eq!(p1.len(), 32);
        assert_eq!(s1.len(), 32);
    }
}
