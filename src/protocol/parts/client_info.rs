//! `ClientInfo` (§6): free-form application/driver identification strings sent once at
//! connect time, surfaced server-side in session traces.

use crate::codec::utf8_to_cesu8;
use crate::error::HdbResult;
use byteorder::{LittleEndian, WriteBytesExt};
use std::collections::HashMap;
use std::env;
use std::path::Path;

#[derive(Clone, Debug)]
pub(crate) struct ClientInfo(HashMap<ClientInfoKey, String>);

impl Default for ClientInfo {
    fn default() -> Self {
        let mut ci = Self(HashMap::new());

        if let Some(os_str) = env::args_os().next() {
            let p = Path::new(&os_str);
            if let Some(s) = p.file_name() {
                ci.set_application(s.to_string_lossy());
            }
        }
        ci.set(ClientInfoKey::Driver, "hdbconnect_core");
        ci.set(
            ClientInfoKey::DriverVersion,
            &format!("hdbconnect_core = {}", env!("CARGO_PKG_VERSION")),
        );
        ci
    }
}

impl ClientInfo {
    pub(crate) fn set_application<S: AsRef<str>>(&mut self, application: S) {
        self.set(ClientInfoKey::Application, application.as_ref());
    }

    pub(crate) fn set_application_version(&mut self, version: &str) {
        self.set(ClientInfoKey::ApplicationVersion, version);
    }

    pub(crate) fn set_application_source(&mut self, source: &str) {
        self.set(ClientInfoKey::ApplicationSource, source);
    }

    pub(crate) fn set_application_user(&mut self, user: &str) {
        self.set(ClientInfoKey::ApplicationUser, user);
    }

    fn set(&mut self, key: ClientInfoKey, value: &str) {
        self.0.insert(key, value.to_string());
    }

    pub(crate) fn emit(&self, w: &mut dyn std::io::Write) -> HdbResult<()> {
        for (key, value) in &self.0 {
            emit_length_and_string(key.as_str(), w)?;
            emit_length_and_string(value, w)?;
        }
        Ok(())
    }

    pub(crate) fn size(&self) -> usize {
        self.0
            .iter()
            .map(|(k, v)| string_length(k.as_str()) + string_length(v))
            .sum()
    }

    pub(crate) fn count(&self) -> usize {
        self.0.len() * 2
    }
}

impl std::fmt::Display for ClientInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (k, v) in &self.0 {
            writeln!(f, "{k:?} = {v}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum ClientInfoKey {
    Application,
    ApplicationVersion,
    ApplicationSource,
    ApplicationUser,
    Driver,
    DriverVersion,
}

impl ClientInfoKey {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "APPLICATION",
            Self::ApplicationVersion => "APPLICATIONVERSION",
            Self::ApplicationSource => "APPLICATIONSOURCE",
            Self::ApplicationUser => "APPLICATIONUSER",
            Self::Driver => "DRIVER",
            Self::DriverVersion => "DRIVERVERSION",
        }
    }
}

fn string_length(s: &str) -> usize {
    2 + utf8_to_cesu8(s).len()
}

fn emit_length_and_string(s: &str, w: &mut dyn std::io::Write) -> HdbResult<()> {
    let bytes = utf8_to_cesu8(s);
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    w.write_i16::<LittleEndian>(bytes.len() as i16)?;
    w.write_all(&bytes)?;
    Ok(())
}
