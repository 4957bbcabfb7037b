//! At-rest obfuscation for persisted text.
//!
//! Repeating-key XOR followed by base64. This keeps records opaque to
//! a casual reader, nothing more: there is no authentication, and a
//! truncated or bit-flipped token may decode to garbage rather than
//! fail. Do not mistake it for encryption.

use crate::error::{DrawError, DrawResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha2::{Digest, Sha256};

pub struct Codec {
    key: Vec<u8>,
}

impl Codec {
    /// The key must be non-empty.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        let key = key.into();
        assert!(!key.is_empty(), "codec key must be non-empty");
        Self { key }
    }

    fn xor(&self, bytes: &[u8]) -> Vec<u8> {
        bytes
            .iter()
            .enumerate()
            .map(|(i, b)| b ^ self.key[i % self.key.len()])
            .collect()
    }

    /// Mask `plaintext` into a single base64 token, safe to store as
    /// one text line.
    pub fn mask(&self, plaintext: &str) -> String {
        BASE64.encode(self.xor(plaintext.as_bytes()))
    }

    /// Inverse of [`mask`](Self::mask) under the same key. Fails with
    /// [`DrawError::Decode`] when the token is not valid base64 or the
    /// unmasked bytes are not UTF-8.
    pub fn unmask(&self, token: &str) -> DrawResult<String> {
        let raw = BASE64
            .decode(token.trim())
            .map_err(|e| DrawError::Decode(e.to_string()))?;
        String::from_utf8(self.xor(&raw)).map_err(|e| DrawError::Decode(e.to_string()))
    }
}

/// Stable masking keys, one per store category.
///
/// Keys are derived from fixed labels so data persisted by an earlier
/// run stays readable after a restart. NEVER change a label: doing so
/// orphans everything written under the old key.
pub struct KeyRing;

impl KeyRing {
    fn derive(label: &str) -> Vec<u8> {
        Sha256::digest(label.as_bytes()).to_vec()
    }

    /// Codec for ledger files.
    pub fn ledger() -> Codec {
        Codec::new(Self::derive("numdraw/ledger/v1"))
    }

    /// Codec for the at-rest audit file.
    pub fn audit() -> Codec {
        Codec::new(Self::derive("numdraw/audit/v1"))
    }
}
