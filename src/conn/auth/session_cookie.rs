//! Session-cookie fast-path authentication (§4.4): when a prior session for the same
//! (host, logon name) left a cookie behind, it replaces a full SCRAM round-trip. The final
//! round carries no payload — the server either accepts the init round outright or rejects
//! it, in which case the engine falls through to the next method in priority order.

use crate::conn::auth::authenticator::Authenticator;
use crate::error::HdbResult;
use crate::protocol::parts::AuthFields;

pub(crate) struct SessionCookieAuthenticator {
    cookie: Vec<u8>,
    client_id: String,
}

impl SessionCookieAuthenticator {
    pub(crate) fn new(cookie: Vec<u8>, client_id: String) -> Self {
        Self { cookie, client_id }
    }
}

impl Authenticator for SessionCookieAuthenticator {
    fn name(&self) -> &'static str {
        "SessionCookie"
    }

    fn client_challenge(&self) -> Vec<u8> {
        let mut fields = AuthFields::default();
        fields.push(self.cookie.clone());
        fields.push(self.client_id.clone().into_bytes());
        let mut buf = Vec::new();
        let _ = fields.emit(&mut buf);
        buf
    }

    fn client_proof(&mut self, _server_challenge_data: &[u8]) -> HdbResult<Vec<u8>> {
        let mut fields = AuthFields::default();
        fields.push(Vec::new());
        let mut buf = Vec::new();
        fields.emit(&mut buf)?;
        Ok(buf)
    }
}
