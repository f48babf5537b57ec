//! JWT bearer-token authentication (§4.4): a single-round method — the token itself is the
//! proof, there is no server challenge to answer.

use crate::conn::auth::authenticator::Authenticator;
use crate::error::HdbResult;
use crate::protocol::parts::AuthFields;

pub(crate) struct JwtAuthenticator {
    token: String,
}

impl JwtAuthenticator {
    pub(crate) fn new(token: String) -> Self {
        Self { token }
    }
}

impl Authenticator for JwtAuthenticator {
    fn name(&self) -> &'static str {
        "JWT"
    }

    fn client_challenge(&self) -> Vec<u8> {
        let mut fields = AuthFields::default();
        fields.push(self.token.clone().into_bytes());
        let mut buf = Vec::new();
        let _ = fields.emit(&mut buf);
        buf
    }

    /// The server accepts or rejects based on the token sent as the client challenge; there
    /// is nothing further to prove in a second round, so the method's own name is echoed
    /// back as a zero-length confirmation field.
    fn client_proof(&mut self, _server_challenge_data: &[u8]) -> HdbResult<Vec<u8>> {
        let mut fields = AuthFields::default();
        fields.push(Vec::new());
        let mut buf = Vec::new();
        fields.emit(&mut buf)?;
        Ok(buf)
    }
}
