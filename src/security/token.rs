//! Session Tokens
//!
//! One token per circuit load. The token is the HMAC key for that
//! session's score submission; the server never stores it.

use std::fmt;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Serialize, Deserialize};

/// Random bytes per token (hex-encoded to twice as many characters).
pub const TOKEN_BYTES: usize = 16;

/// Opaque session identifier drawn from the OS CSPRNG.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh, unpredictable token.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap an existing token string (as received from a client).
    pub fn from_string(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Token text, used as HMAC key bytes.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the key material
        f.write_str("SessionToken(..)")
    }
}

/// Generate a token for a new circuit load.
pub fn generate_session_token() -> SessionToken {
    SessionToken::generate()
}
