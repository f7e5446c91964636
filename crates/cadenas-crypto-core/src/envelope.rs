//! Key-wrap envelopes — per-record item keys encrypted under the master key.
//!
//! This module provides:
//! - [`generate_item_key`] — fresh random 256-bit item key, one per save
//! - [`wrap`] — encrypt an item key under the master key, producing a
//!   [`WrappedKeyEnvelope`]
//! - [`unwrap`] — recover the item key, or fail with `KeyUnwrapFailed`
//!
//! The envelope is the only form in which an item key is ever persisted.
//! No AAD is used here: the envelope's own ciphertext authentication is
//! sufficient, since the wrapped key has no external binding requirement.

use crate::error::CryptoError;
use crate::memory::SecretBytes;
use crate::symmetric::{self, KEY_LEN, NONCE_LEN};
use data_encoding::BASE64;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Item key length in bytes (256 bits).
pub const ITEM_KEY_LEN: usize = KEY_LEN;

/// A wrapped item key: `{iv, ct}` with base64 fields.
///
/// Serialized via [`WrappedKeyEnvelope::to_json`] into the compact blob the
/// storage collaborator persists verbatim (`encKeyWrapped`).
#[must_use = "the envelope must be stored alongside the record"]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedKeyEnvelope {
    /// Base64 of the 12-byte IV drawn for this wrap.
    pub iv: String,
    /// Base64 of the encrypted item key (ciphertext ‖ tag).
    pub ct: String,
}

impl WrappedKeyEnvelope {
    /// Serialize to the compact JSON blob stored by the collaborator.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encoding` if serialization fails.
    pub fn to_json(&self) -> Result<String, CryptoError> {
        serde_json::to_string(self)
            .map_err(|e| CryptoError::Encoding(format!("envelope serialization failed: {e}")))
    }

    /// Parse an envelope from its stored JSON blob.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encoding` on malformed JSON.
    pub fn from_json(blob: &str) -> Result<Self, CryptoError> {
        serde_json::from_str(blob)
            .map_err(|e| CryptoError::Encoding(format!("malformed envelope blob: {e}")))
    }
}

/// Generate a fresh random item key.
///
/// Called once per record per save — an item key is used for exactly one
/// encrypt operation before being wrapped and discarded.
///
/// # Errors
///
/// Returns `CryptoError::Random` if the CSPRNG fails.
pub fn generate_item_key() -> Result<SecretBytes<ITEM_KEY_LEN>, CryptoError> {
    SecretBytes::random()
}

/// Wrap an item key under the master key.
///
/// Draws a fresh 12-byte IV, independent of any IV used for payload
/// encryption.
///
/// # Errors
///
/// Returns `CryptoError::Random` if the IV draw fails and
/// `CryptoError::Encryption` if the cipher cannot be constructed.
pub fn wrap(
    master_key: &SecretBytes<KEY_LEN>,
    item_key: &SecretBytes<ITEM_KEY_LEN>,
) -> Result<WrappedKeyEnvelope, CryptoError> {
    let nonce = symmetric::generate_nonce()?;
    let mut sealed = symmetric::seal(master_key.expose(), nonce, &[], item_key.expose())?;
    let envelope = WrappedKeyEnvelope {
        iv: BASE64.encode(&nonce),
        ct: BASE64.encode(&sealed),
    };
    sealed.zeroize();
    Ok(envelope)
}

/// Unwrap an envelope, recovering the item key.
///
/// On authentication failure (wrong master key, corrupted blob, tampering)
/// no partial output is ever returned. The raw key bytes are moved straight
/// into a [`SecretBytes`] and intermediate buffers are zeroized.
///
/// # Errors
///
/// Returns `CryptoError::Encoding` for malformed base64 or a wrong-size IV,
/// and `CryptoError::KeyUnwrapFailed` when authentication fails or the
/// recovered material is not a 256-bit key.
pub fn unwrap(
    master_key: &SecretBytes<KEY_LEN>,
    envelope: &WrappedKeyEnvelope,
) -> Result<SecretBytes<ITEM_KEY_LEN>, CryptoError> {
    let iv_bytes = BASE64
        .decode(envelope.iv.as_bytes())
        .map_err(|e| CryptoError::Encoding(format!("malformed envelope iv: {e}")))?;
    if iv_bytes.len() != NONCE_LEN {
        return Err(CryptoError::Encoding(format!(
            "invalid envelope iv length: {} bytes (expected {NONCE_LEN})",
            iv_bytes.len()
        )));
    }
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&iv_bytes);

    let ciphertext = BASE64
        .decode(envelope.ct.as_bytes())
        .map_err(|e| CryptoError::Encoding(format!("malformed envelope ciphertext: {e}")))?;

    let mut raw = symmetric::open(master_key.expose(), nonce, &[], &ciphertext)
        .map_err(|e| e.or_auth(CryptoError::KeyUnwrapFailed))?;

    let item_key = SecretBytes::from_slice(&raw);
    raw.zeroize();
    // Authenticated material of the wrong size is still not a usable key.
    item_key.map_err(|_| CryptoError::KeyUnwrapFailed)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
