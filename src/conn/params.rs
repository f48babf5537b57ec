//! Connection configuration (§1.1, §6): an immutable, `Clone`-able [`ConnectParams`] built
//! through [`ConnectParamsBuilder`], the same builder-pattern shape the teacher uses for
//! its own connection parameters.

use crate::error::{HdbError, HdbResult};
use secstr::SecUtf8;
use std::sync::Arc;

/// A PEM-encoded client certificate and private key, used for X.509 authentication.
/// PKCS#1, PKCS#8, EC, and Ed25519 private keys are all accepted (§4.4).
#[derive(Clone)]
pub struct ClientCertificate {
    pub(crate) cert_pem: String,
    pub(crate) key_pem: String,
}

impl std::fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("cert_pem", &"<redacted>")
            .field("key_pem", &"<redacted>")
            .finish()
    }
}

impl ClientCertificate {
    /// Builds a client certificate from PEM-encoded certificate and key material.
    pub fn new(cert_pem: impl Into<String>, key_pem: impl Into<String>) -> Self {
        Self {
            cert_pem: cert_pem.into(),
            key_pem: key_pem.into(),
        }
    }
}

/// Refresh callbacks for the three credential classes the auth engine understands
/// (§4.4, §9): a tagged sum of callables rather than a trait hierarchy, since the
/// refresh routine only ever needs to dispatch on the credential class that is
/// currently in use.
#[derive(Clone)]
pub enum CredentialRefresh {
    /// Returns a freshly obtained password.
    Password(Arc<dyn Fn() -> SecUtf8 + Send + Sync>),
    /// Returns a freshly obtained JWT.
    Token(Arc<dyn Fn() -> String + Send + Sync>),
    /// Returns a freshly obtained client certificate and key.
    ClientCert(Arc<dyn Fn() -> ClientCertificate + Send + Sync>),
}

impl std::fmt::Debug for CredentialRefresh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Password(_) => "Password",
            Self::Token(_) => "Token",
            Self::ClientCert(_) => "ClientCert",
        };
        write!(f, "CredentialRefresh::{name}(..)")
    }
}

/// Everything needed to authenticate and negotiate a session with an HDB server over an
/// already-established transport (§3: TLS/dialing is an external collaborator).
#[derive(Clone, Debug)]
pub struct ConnectParams {
    pub(crate) username: String,
    pub(crate) password: Option<SecUtf8>,
    pub(crate) client_certificate: Option<ClientCertificate>,
    pub(crate) token: Option<String>,
    pub(crate) refresh: Vec<CredentialRefresh>,
    pub(crate) dfv: u8,
    pub(crate) locale: Option<String>,
    pub(crate) application_name: Option<String>,
    pub(crate) driver_version: Option<String>,
    pub(crate) driver_name: Option<String>,
    pub(crate) client_id: Option<String>,
    pub(crate) fetch_size: u32,
    pub(crate) lob_chunk_size: usize,
    pub(crate) bulk_size: usize,
    pub(crate) buffer_size: usize,
    pub(crate) timeout: Option<std::time::Duration>,
    pub(crate) legacy: bool,
    pub(crate) cesu8_decode_policy: crate::codec::Cesu8DecodePolicy,
}

impl ConnectParams {
    /// Returns a new builder.
    pub fn builder() -> ConnectParamsBuilder {
        ConnectParamsBuilder::new()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn dfv(&self) -> u8 {
        self.dfv
    }

    pub fn fetch_size(&self) -> u32 {
        self.fetch_size
    }

    pub fn lob_chunk_size(&self) -> usize {
        self.lob_chunk_size
    }

    pub fn bulk_size(&self) -> usize {
        self.bulk_size
    }

    pub fn legacy(&self) -> bool {
        self.legacy
    }

    pub(crate) fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}

/// Builder for [`ConnectParams`] (§1.1).
#[derive(Clone, Debug, Default)]
pub struct ConnectParamsBuilder {
    username: Option<String>,
    password: Option<SecUtf8>,
    client_certificate: Option<ClientCertificate>,
    token: Option<String>,
    refresh: Vec<CredentialRefresh>,
    dfv: Option<u8>,
    locale: Option<String>,
    application_name: Option<String>,
    driver_version: Option<String>,
    driver_name: Option<String>,
    client_id: Option<String>,
    fetch_size: Option<u32>,
    lob_chunk_size: Option<usize>,
    bulk_size: Option<usize>,
    buffer_size: Option<usize>,
    timeout: Option<std::time::Duration>,
    legacy: bool,
    cesu8_decode_policy: Option<crate::codec::Cesu8DecodePolicy>,
}

impl ConnectParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecUtf8::from(password.into()));
        self
    }

    pub fn client_certificate(mut self, cert: ClientCertificate) -> Self {
        self.client_certificate = Some(cert);
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn refresh(mut self, refresh: CredentialRefresh) -> Self {
        self.refresh.push(refresh);
        self
    }

    pub fn dfv(mut self, dfv: u8) -> Self {
        self.dfv = Some(dfv);
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn driver_version(mut self, version: impl Into<String>) -> Self {
        self.driver_version = Some(version.into());
        self
    }

    pub fn driver_name(mut self, name: impl Into<String>) -> Self {
        self.driver_name = Some(name.into());
        self
    }

    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    pub fn fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = Some(fetch_size);
        self
    }

    pub fn lob_chunk_size(mut self, lob_chunk_size: usize) -> Self {
        self.lob_chunk_size = Some(lob_chunk_size);
        self
    }

    pub fn bulk_size(mut self, bulk_size: usize) -> Self {
        self.bulk_size = Some(bulk_size);
        self
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = Some(buffer_size);
        self
    }

    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// When set, table-output parameters surface as opaque handle strings rather than
    /// `ResultSet`s (§9.1). Only the client-facing accessor in `client.rs` is affected.
    pub fn legacy(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    pub fn cesu8_decode_policy(mut self, policy: crate::codec::Cesu8DecodePolicy) -> Self {
        self.cesu8_decode_policy = Some(policy);
        self
    }

    /// Validates and finalizes the builder.
    ///
    /// # Errors
    /// `HdbError::Usage` if no username was set, or if neither a password, a client
    /// certificate, nor a token was configured.
    pub fn build(self) -> HdbResult<ConnectParams> {
        let username = self
            .username
            .ok_or(HdbError::Usage("ConnectParams: username is required"))?;
        if self.password.is_none() && self.client_certificate.is_none() && self.token.is_none() {
            return Err(HdbError::Usage(
                "ConnectParams: one of password, client_certificate, or token is required",
            ));
        }
        Ok(ConnectParams {
            username,
            password: self.password,
            client_certificate: self.client_certificate,
            token: self.token,
            refresh: self.refresh,
            dfv: self.dfv.unwrap_or(crate::DEFAULT_DATA_FORMAT_VERSION),
            locale: self.locale,
            application_name: self.application_name,
            driver_version: self.driver_version,
            driver_name: self.driver_name,
            client_id: self.client_id,
            fetch_size: self.fetch_size.unwrap_or(crate::DEFAULT_FETCH_SIZE),
            lob_chunk_size: self.lob_chunk_size.unwrap_or(crate::DEFAULT_LOB_WRITE_LENGTH),
            bulk_size: self.bulk_size.unwrap_or(5000),
            buffer_size: self.buffer_size.unwrap_or(crate::codec::MIN_BUFFER_SIZE),
            timeout: self.timeout,
            legacy: self.legacy,
            cesu8_decode_policy: self
                .cesu8_decode_policy
                .unwrap_or(crate::codec::Cesu8DecodePolicy::Strict),
        })
    }
}
