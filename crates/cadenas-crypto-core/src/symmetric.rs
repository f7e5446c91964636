//! AES-256-GCM seal/open primitives shared by the envelope and record
//! modules.
//!
//! Wire shape: `ciphertext ‖ tag (16 bytes)` — the tag travels appended to
//! the ciphertext, and the 12-byte nonce is stored by the caller alongside
//! it. Callers map [`OpenError::Auth`] onto their own taxonomy
//! (`KeyUnwrapFailed` for envelopes, `RecordDecryptFailed` for records).

use crate::error::CryptoError;
use rand::rngs::OsRng;
use rand::RngCore;
use ring::aead;

/// AES-256-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// AES-256-GCM key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Failure modes of [`open`].
#[derive(Debug)]
pub(crate) enum OpenError {
    /// Cipher construction failed (should not happen with fixed-size keys).
    Setup(String),
    /// Authentication failed — wrong key, tampered data, or wrong AAD.
    Auth,
}

impl OpenError {
    /// Convert a setup failure into the shared taxonomy; auth failures are
    /// mapped by the caller.
    pub(crate) fn or_auth(self, auth: CryptoError) -> CryptoError {
        match self {
            Self::Setup(msg) => CryptoError::Encryption(msg),
            Self::Auth => auth,
        }
    }
}

/// Generate a fresh random 96-bit nonce.
///
/// Every seal operation draws its own nonce — nonce reuse under the same
/// key breaks the AEAD guarantees outright.
pub(crate) fn generate_nonce() -> Result<[u8; NONCE_LEN], CryptoError> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| CryptoError::Random(format!("CSPRNG fill failed: {e}")))?;
    Ok(nonce)
}

/// Encrypt `plaintext` under `key` with the given nonce and AAD.
///
/// Returns `ciphertext ‖ tag`.
pub(crate) fn seal(
    key: &[u8; KEY_LEN],
    nonce: [u8; NONCE_LEN],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key)
        .map_err(|_| CryptoError::Encryption("failed to create AES-256-GCM key".into()))?;
    let sealing_key = aead::LessSafeKey::new(unbound);
    let nonce = aead::Nonce::assume_unique_for_key(nonce);

    let mut in_out = plaintext.to_vec();
    sealing_key
        .seal_in_place_append_tag(nonce, aead::Aad::from(aad), &mut in_out)
        .map_err(|_| CryptoError::Encryption("AES-256-GCM encryption failed".into()))?;
    Ok(in_out)
}

/// Decrypt and authenticate `ciphertext ‖ tag` under `key`.
///
/// On [`OpenError::Auth`] no plaintext bytes are returned — the partially
/// decrypted buffer is discarded.
pub(crate) fn open(
    key: &[u8; KEY_LEN],
    nonce: [u8; NONCE_LEN],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, OpenError> {
    if ciphertext.len() < TAG_LEN {
        return Err(OpenError::Auth);
    }
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key)
        .map_err(|_| OpenError::Setup("failed to create AES-256-GCM key".into()))?;
    let opening_key = aead::LessSafeKey::new(unbound);
    let nonce = aead::Nonce::assume_unique_for_key(nonce);

    let mut in_out = ciphertext.to_vec();
    let plaintext_len = opening_key
        .open_in_place(nonce, aead::Aad::from(aad), &mut in_out)
        .map_err(|_| OpenError::Auth)?
        .len();
    in_out.truncate(plaintext_len);
    Ok(in_out)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
