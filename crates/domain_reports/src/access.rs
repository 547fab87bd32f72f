//! Password gate for report access
//!
//! The stored credential is normally a hex SHA-256 digest. Older stores kept
//! the password itself; a stored value that is not a 64-digit hex string is
//! compared as plain text. Verification never errors: every failure is a
//! denied [`GateOutcome`] with a message for the user.

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Result of a password check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateOutcome {
    pub granted: bool,
    pub message: String,
}

impl GateOutcome {
    fn granted(message: &str) -> Self {
        Self {
            granted: true,
            message: message.to_string(),
        }
    }

    fn denied(message: &str) -> Self {
        Self {
            granted: false,
            message: message.to_string(),
        }
    }
}

/// Hex SHA-256 digest of a password
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Compares without short-circuiting on the first differing byte
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Checks submitted passwords against a stored credential
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    stored: Option<String>,
}

impl AccessGate {
    /// A gate protected by `stored`; an empty value leaves the gate open
    pub fn new(stored: Option<String>) -> Self {
        let stored = stored
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { stored }
    }

    /// A gate protected by the hash of `password`
    pub fn with_password(password: &str) -> Self {
        Self::new(Some(hash_password(password)))
    }

    /// Returns true when a credential is configured
    pub fn is_protected(&self) -> bool {
        self.stored.is_some()
    }

    pub fn verify(&self, submitted: &str) -> GateOutcome {
        let Some(stored) = self.stored.as_deref() else {
            return GateOutcome::granted("No password configured");
        };
        if submitted.is_empty() {
            return GateOutcome::denied("Password required");
        }

        let matches = if is_sha256_hex(stored) {
            constant_time_eq(
                hash_password(submitted).as_bytes(),
                stored.to_ascii_lowercase().as_bytes(),
            )
        } else {
            debug!("stored credential is plain text");
            constant_time_eq(submitted.as_bytes(), stored.as_bytes())
        };

        if matches {
            GateOutcome::granted("Access granted")
        } else {
            warn!("report access denied");
            GateOutcome::denied("Incorrect password")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_is_hex_sha256() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hashed_credential() {
        let gate = AccessGate::with_password("s3cret");
        assert!(gate.verify("s3cret").granted);

        let denied = gate.verify("guess");
        assert!(!denied.granted);
        assert_eq!(denied.message, "Incorrect password");
    }

    #[test]
    fn test_uppercase_stored_hash() {
        let gate = AccessGate::new(Some(hash_password("pw").to_uppercase()));
        assert!(gate.verify("pw").granted);
    }

    #[test]
    fn test_legacy_plain_text_credential() {
        let gate = AccessGate::new(Some("letmein".into()));
        assert!(gate.verify("letmein").granted);
        assert!(!gate.verify("LETMEIN").granted);
    }

    #[test]
    fn test_open_gate_and_empty_submission() {
        assert!(AccessGate::new(Some("  ".into())).verify("").granted);
        assert!(!AccessGate::with_password("pw").verify("").granted);
    }
}
