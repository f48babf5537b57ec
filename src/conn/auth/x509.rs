//! X.509 client-certificate authentication (§4.4): the client proves possession of the
//! private key behind a certificate already trusted by the server by signing the server's
//! nonce. Unlike the SCRAM variants this method has no teacher counterpart; the signature
//! algorithm is routed by private-key type (RSA-PSS, ECDSA P-256, or Ed25519), mirroring how
//! the other auth modules route on a single enum.

use crate::conn::auth::authenticator::Authenticator;
use crate::conn::params::ClientCertificate;
use crate::error::{HdbError, HdbResult};
use crate::protocol::parts::AuthFields;

enum Signer {
    Rsa(Box<rsa::RsaPrivateKey>),
    EcP256(Box<p256::ecdsa::SigningKey>),
    Ed25519(Box<ed25519_dalek::SigningKey>),
}

pub(crate) struct X509Authenticator {
    cert_der: Vec<u8>,
    signer: Signer,
}

impl X509Authenticator {
    pub(crate) fn new(cert: &ClientCertificate) -> HdbResult<Self> {
        let cert_pem = pem::parse(&cert.cert_pem)
            .map_err(|e| HdbError::UsageDetailed(format!("invalid client certificate PEM: {e}")))?;
        let key_pem = pem::parse(&cert.key_pem)
            .map_err(|e| HdbError::UsageDetailed(format!("invalid client key PEM: {e}")))?;
        let signer = signer_from_key_pem(&key_pem)?;
        Ok(Self {
            cert_der: cert_pem.contents().to_vec(),
            signer,
        })
    }
}

fn signer_from_key_pem(key_pem: &pem::Pem) -> HdbResult<Signer> {
    use ed25519_dalek::pkcs8::DecodePrivateKey as _;
    use p256::pkcs8::DecodePrivateKey as _;
    use pkcs1::DecodeRsaPrivateKey as _;
    use rsa::pkcs8::DecodePrivateKey as _;

    let der = key_pem.contents();
    match key_pem.tag() {
        "RSA PRIVATE KEY" => rsa::RsaPrivateKey::from_pkcs1_der(der)
            .map(|k| Signer::Rsa(Box::new(k)))
            .map_err(|e| HdbError::UsageDetailed(format!("invalid PKCS#1 RSA key: {e}"))),
        "EC PRIVATE KEY" => p256::SecretKey::from_sec1_der(der)
            .map(|k| Signer::EcP256(Box::new(p256::ecdsa::SigningKey::from(k))))
            .map_err(|e| HdbError::UsageDetailed(format!("invalid SEC1 EC key: {e}"))),
        "PRIVATE KEY" => {
            if let Ok(k) = ed25519_dalek::SigningKey::from_pkcs8_der(der) {
                return Ok(Signer::Ed25519(Box::new(k)));
            }
            if let Ok(k) = p256::ecdsa::SigningKey::from_pkcs8_der(der) {
                return Ok(Signer::EcP256(Box::new(k)));
            }
            rsa::RsaPrivateKey::from_pkcs8_der(der)
                .map(|k| Signer::Rsa(Box::new(k)))
                .map_err(|_| {
                    HdbError::UsageDetailed(
                        "client key is a PKCS#8 document of an unsupported key type".into(),
                    )
                })
        }
        other => Err(HdbError::UsageDetailed(format!(
            "unsupported client key PEM tag: {other}"
        ))),
    }
}

fn sign(signer: &Signer, message: &[u8]) -> HdbResult<Vec<u8>> {
    match signer {
        Signer::Rsa(key) => {
            use rsa::signature::{RandomizedSigner, SignatureEncoding};
            use sha2::Sha256;
            let signing_key = rsa::pss::SigningKey::<Sha256>::new((**key).clone());
            let signature = signing_key.sign_with_rng(&mut rand::thread_rng(), message);
            Ok(signature.to_vec())
        }
        Signer::EcP256(key) => {
            use p256::ecdsa::signature::{Signer as _, SignatureEncoding as _};
            let signature: p256::ecdsa::Signature = key.sign(message);
            Ok(signature.to_vec())
        }
        Signer::Ed25519(key) => {
            use ed25519_dalek::Signer as _;
            Ok(key.sign(message).to_bytes().to_vec())
        }
    }
}

impl Authenticator for X509Authenticator {
    fn name(&self) -> &'static str {
        "X509"
    }

    /// The init round carries no client challenge; the certificate itself is sent in the
    /// final round alongside the signature.
    fn client_challenge(&self) -> Vec<u8> {
        Vec::new()
    }

    fn client_proof(&mut self, server_challenge_data: &[u8]) -> HdbResult<Vec<u8>> {
        let mut fields = AuthFields::parse(&mut std::io::Cursor::new(server_challenge_data))?;
        let nonce = fields
            .pop()
            .ok_or_else(|| HdbError::protocol("missing X.509 server nonce field"))?;
        let mut signed_message = self.cert_der.clone();
        signed_message.extend_from_slice(&nonce);
        let signature = sign(&self.signer, &signed_message)?;
        let mut out = AuthFields::default();
        out.push(self.cert_der.clone());
        out.push(signature);
        let mut buf = Vec::new();
        out.emit(&mut buf)?;
        Ok(buf)
    }
}
