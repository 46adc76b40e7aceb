//! Static AWS credentials.

use std::fmt;

use syslogidx_core::error::TransportError;

const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
const SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Access key pair plus optional session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }

    /// Reads credentials from the standard environment variables.
    ///
    /// An empty `AWS_SESSION_TOKEN` is treated as absent.
    pub fn from_env() -> Result<Self, TransportError> {
        let access_key_id = required(ACCESS_KEY_ID)?;
        let secret_access_key = required(SECRET_ACCESS_KEY)?;
        let session_token = std::env::var(SESSION_TOKEN)
            .ok()
            .filter(|t| !t.is_empty());

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token,
        })
    }
}

fn required(key: &str) -> Result<String, TransportError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(TransportError::Credentials(format!("{key} is not set"))),
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear() {
        // SAFETY: env-mutating tests are serialized.
        unsafe {
            std::env::remove_var(ACCESS_KEY_ID);
            std::env::remove_var(SECRET_ACCESS_KEY);
            std::env::remove_var(SESSION_TOKEN);
        }
    }

    #[test]
    #[serial]
    fn from_env_reads_keys() {
        clear();
        // SAFETY: env-mutating tests are serialized.
        unsafe {
            std::env::set_var(ACCESS_KEY_ID, "AKIDEXAMPLE");
            std::env::set_var(SECRET_ACCESS_KEY, "secret");
            std::env::set_var(SESSION_TOKEN, "");
        }
        let creds = Credentials::from_env().unwrap();
        assert_eq!(creds.access_key_id, "AKIDEXAMPLE");
        assert_eq!(creds.secret_access_key, "secret");
        assert_eq!(creds.session_token, None);
        clear();
    }

    #[test]
    #[serial]
    fn from_env_reads_session_token() {
        clear();
        // SAFETY: env-mutating tests are serialized.
        unsafe {
            std::env::set_var(ACCESS_KEY_ID, "AKIDEXAMPLE");
            std::env::set_var(SECRET_ACCESS_KEY, "secret");
            std::env::set_var(SESSION_TOKEN, "token");
        }
        let creds = Credentials::from_env().unwrap();
        assert_eq!(creds.session_token.as_deref(), Some("token"));
        clear();
    }

    #[test]
    #[serial]
    fn from_env_requires_secret() {
        clear();
        // SAFETY: env-mutating tests are serialized.
        unsafe { std::env::set_var(ACCESS_KEY_ID, "AKIDEXAMPLE") };
        let err = Credentials::from_env().unwrap_err();
        assert!(err.to_string().contains(SECRET_ACCESS_KEY));
        clear();
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials::new("AKID", "topsecret", Some("tok".to_owned()));
        let debug = format!("{creds:?}");
        assert!(debug.contains("AKID"));
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("tok\""));
    }
}
