//! Authenticated record cipher — payload encryption under a per-record
//! item key, bound to record identity.
//!
//! This module provides:
//! - [`encrypt`] — seal serialized payload bytes with a fresh IV and an AAD
//!   string binding the ciphertext to `{record id, write timestamp}`
//! - [`decrypt`] — open a stored ciphertext with the *stored* IV and AAD
//! - [`build_aad`] — the canonical AAD construction
//!
//! # Why the AAD carries the record id and timestamp
//!
//! AEAD authentication covers the AAD, so swapping one record's stored
//! ciphertext/IV into another record's row, or replaying an old ciphertext
//! over a newer save, fails authentication instead of silently decrypting
//! to the wrong plaintext. The AAD string is persisted verbatim alongside
//! the ciphertext — it is not re-derivable from the record's current
//! metadata after updates, and decryption always uses the stored copy.

use crate::error::CryptoError;
use crate::memory::{SecretBuffer, SecretBytes};
use crate::symmetric::{self, KEY_LEN, NONCE_LEN};
use zeroize::Zeroize;

/// Product namespace prefix for every record AAD.
pub const AAD_NAMESPACE: &str = "cadenas";

/// Record IV length in bytes (96-bit AES-GCM nonce).
pub const IV_LEN: usize = NONCE_LEN;

/// Placeholder id used in the AAD when a record has not been assigned an
/// id yet (first save).
const NEW_RECORD_TAG: &str = "new";

/// Output of a record encryption: the three values the storage collaborator
/// persists next to the wrapped key.
#[must_use = "sealed record fields must be stored"]
#[derive(Clone, Debug)]
pub struct SealedRecord {
    /// Encrypted payload (ciphertext ‖ tag).
    pub ciphertext: Vec<u8>,
    /// Fresh 12-byte IV drawn for this encryption.
    pub iv: [u8; NONCE_LEN],
    /// The literal AAD string, persisted and required verbatim at decrypt.
    pub aad: String,
}

/// Build the AAD string for a record write.
///
/// Format: `cadenas:<record-id-or-'new'>:<epoch-millis>`.
#[must_use]
pub fn build_aad(record_id: Option<&str>, now_ms: u64) -> String {
    let id = record_id.unwrap_or(NEW_RECORD_TAG);
    format!("{AAD_NAMESPACE}:{id}:{now_ms}")
}

/// Encrypt serialized payload bytes under an item key.
///
/// Draws a fresh 12-byte IV (independent of the envelope's wrap IV) and
/// binds the ciphertext to `record_id` and `now_ms` through the AAD.
/// Wall-clock is supplied by the caller.
///
/// # Errors
///
/// Returns `CryptoError::Random` if the IV draw fails and
/// `CryptoError::Encryption` if the cipher cannot be constructed.
pub fn encrypt(
    item_key: &SecretBytes<KEY_LEN>,
    plaintext: &[u8],
    record_id: Option<&str>,
    now_ms: u64,
) -> Result<SealedRecord, CryptoError> {
    let aad = build_aad(record_id, now_ms);
    let iv = symmetric::generate_nonce()?;
    let ciphertext = symmetric::seal(item_key.expose(), iv, aad.as_bytes(), plaintext)?;
    Ok(SealedRecord {
        ciphertext,
        iv,
        aad,
    })
}

/// Decrypt a stored record ciphertext.
///
/// `iv` and `aad` must be the stored values, passed verbatim — the AAD is
/// never recomputed. Authentication fails if ciphertext, IV, or AAD was
/// altered independently; that failure is the tamper-detection mechanism.
///
/// # Errors
///
/// Returns `CryptoError::RecordDecryptFailed` on authentication failure.
/// No partial plaintext is ever returned.
pub fn decrypt(
    item_key: &SecretBytes<KEY_LEN>,
    ciphertext: &[u8],
    iv: [u8; NONCE_LEN],
    aad: &str,
) -> Result<SecretBuffer, CryptoError> {
    let mut plaintext = symmetric::open(item_key.expose(), iv, aad.as_bytes(), ciphertext)
        .map_err(|e| e.or_auth(CryptoError::RecordDecryptFailed))?;
    let buffer = SecretBuffer::new(&plaintext);
    plaintext.zeroize();
    Ok(buffer)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
