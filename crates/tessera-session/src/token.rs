//! Session token generation and comparison.
//!
//! # Security
//!
//! Tokens carry 256 bits from the operating system's RNG. Token comparison
//! uses constant-time comparison to prevent timing attacks.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::TryRngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

/// Number of random bytes in a token.
pub const TOKEN_BYTES: usize = 32;

/// Length of the encoded token (unpadded URL-safe base64 of [`TOKEN_BYTES`]).
pub const TOKEN_LEN: usize = 43;

/// An opaque session token.
///
/// The encoded form only uses `[A-Za-z0-9_-]`, so it never contains the
/// cookie delimiter. `Debug` is redacted so tokens do not end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh token from the OS randomness source.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| Error::Generation(e.to_string()))?;
        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Wrap an already-encoded token (e.g. one read from a cookie or a store).
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The encoded token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against another token in constant time.
    pub fn ct_matches(&self, other: &SessionToken) -> bool {
        constant_time_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Compare two strings in constant time.
///
/// The running time does not depend on where the first mismatching byte
/// is. Strings of different lengths never match; the length itself is not
/// treated as secret.
pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    if a_bytes.len() == b_bytes.len() {
        a_bytes.ct_eq(b_bytes).into()
    } else {
        // Dummy comparison to keep timing consistent
        let _ = a_bytes.ct_eq(a_bytes);
        false
    }
}
