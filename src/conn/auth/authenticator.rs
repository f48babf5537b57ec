//! The `Authenticator` trait (§4.4): one implementation per method in the priority
//! table, proposed to the server in the first auth request and driven to completion by
//! whichever one the server picks in its reply.

use crate::error::HdbResult;

pub(crate) trait Authenticator {
    /// The wire name proposed in the first auth request, e.g. `"SCRAMPBKDF2SHA256"`.
    fn name(&self) -> &'static str;

    /// The client challenge sent alongside `name()` in the first auth request.
    fn client_challenge(&self) -> Vec<u8>;

    /// Computes the final-round proof from the server's challenge data.
    fn client_proof(&mut self, server_challenge_data: &[u8]) -> HdbResult<Vec<u8>>;

    /// Verifies the server's own proof, when the method provides one (SCRAM variants).
    /// Methods without a server proof (X.509, JWT, session cookie) accept unconditionally.
    fn verify_server(&self, _server_proof: &[u8]) -> HdbResult<()> {
        Ok(())
    }
}
