//! Session-cookie cache (§4.4, §5): a process-wide, read-mostly table of cookies the
//! server handed out on prior successful logons, keyed by `(host, logon name)` so the
//! fast path can skip a full SCRAM round-trip on reconnect.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Clone, Default)]
pub(crate) struct CookieCache(Arc<RwLock<HashMap<(String, String), Vec<u8>>>>);

impl CookieCache {
    pub(crate) fn get(&self, host: &str, logon_name: &str) -> Option<Vec<u8>> {
        self.0
            .read()
            .ok()?
            .get(&(host.to_string(), logon_name.to_string()))
            .cloned()
    }

    pub(crate) fn store(&self, host: &str, logon_name: &str, cookie: Vec<u8>) {
        if let Ok(mut guard) = self.0.write() {
            guard.insert((host.to_string(), logon_name.to_string()), cookie);
        }
    }

    pub(crate) fn invalidate(&self, host: &str, logon_name: &str) {
        if let Ok(mut guard) = self.0.write() {
            guard.remove(&(host.to_string(), logon_name.to_string()));
        }
    }
}

impl std::fmt::Debug for CookieCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CookieCache { .. }")
    }
}
