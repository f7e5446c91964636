//! PBKDF2 key derivation and passphrase verification.
//!
//! This module provides:
//! - [`derive`] — turn a passphrase + salt + params into the master key and
//!   a persistable verifier
//! - [`verify`] — constant-time comparison of two verifier values
//! - [`KdfParams`] — serializable `{algo, iter}` parameter set (stored
//!   alongside the salt and honored verbatim on unlock)
//!
//! # Key / Verifier Independence
//!
//! The master key and the verifier are two separate PBKDF2 runs over the
//! same passphrase and cost parameters. The verifier run uses a
//! domain-separated salt (`salt ‖ "cadenas-verifier"`), so its 128-bit
//! output shares no derivation blocks with the 256-bit master key and is
//! safe to persist server-side.

use crate::error::CryptoError;
use crate::memory::SecretBytes;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Master key length in bytes (256 bits).
pub const MASTER_KEY_LEN: usize = 32;

/// Verifier length in bytes (128 bits).
pub const VERIFIER_LEN: usize = 16;

/// Salt length in bytes. Generated once per vault, never regenerated.
pub const SALT_LEN: usize = 16;

/// Default PBKDF2 iteration count for new vaults.
pub const DEFAULT_ITERATIONS: u32 = 400_000;

/// Domain tag appended to the salt for the verifier derivation.
const VERIFIER_DOMAIN: &[u8] = b"cadenas-verifier";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// KDF algorithm identifier — stored in the vault record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KdfAlgorithm {
    /// PBKDF2 with HMAC-SHA256 (the only algorithm currently in use).
    #[serde(rename = "PBKDF2-SHA256")]
    Pbkdf2Sha256,
}

/// PBKDF2 parameter set — persisted alongside the salt.
///
/// Must round-trip exactly: changing `iter` for an existing vault without
/// re-deriving invalidates the stored verifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfParams {
    /// Algorithm tag.
    pub algo: KdfAlgorithm,
    /// Iteration count (time cost).
    pub iter: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            algo: KdfAlgorithm::Pbkdf2Sha256,
            iter: DEFAULT_ITERATIONS,
        }
    }
}

/// Output of a successful derivation.
///
/// `master_key` is memory-only and masked in Debug; `salt`, `params`, and
/// `verifier` are the non-secret values the storage collaborator persists.
#[derive(Debug)]
#[must_use = "derivation output carries the master key"]
pub struct DerivedKey {
    /// 256-bit master key — never serialized, never leaves the process.
    pub master_key: SecretBytes<MASTER_KEY_LEN>,
    /// Salt used for the derivation (fresh on creation, stored on unlock).
    pub salt: [u8; SALT_LEN],
    /// Parameters used for the derivation.
    pub params: KdfParams,
    /// 128-bit non-secret verifier, safe to persist.
    pub verifier: [u8; VERIFIER_LEN],
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derive the master key and verifier from a passphrase.
///
/// - `salt` absent → generate 16 fresh random bytes (vault creation path).
///   Present → used verbatim (unlock path).
/// - `params` absent → [`KdfParams::default`]. Present → honored exactly so
///   an existing vault's cost factor is preserved.
///
/// Derivation never fails on a wrong passphrase — it always produces *some*
/// key. Correctness is established solely by [`verify`] against the
/// persisted verifier.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if the supplied salt is not exactly
/// 16 bytes or the iteration count is zero, and `CryptoError::Random` if
/// salt generation fails.
pub fn derive(
    passphrase: &[u8],
    salt: Option<&[u8]>,
    params: Option<KdfParams>,
) -> Result<DerivedKey, CryptoError> {
    let salt: [u8; SALT_LEN] = match salt {
        Some(bytes) => {
            if bytes.len() != SALT_LEN {
                return Err(CryptoError::KeyDerivation(format!(
                    "invalid salt length: {} bytes (expected {SALT_LEN})",
                    bytes.len()
                )));
            }
            let mut fixed = [0u8; SALT_LEN];
            fixed.copy_from_slice(bytes);
            fixed
        }
        None => generate_salt()?,
    };

    let params = params.unwrap_or_default();
    if params.iter == 0 {
        return Err(CryptoError::KeyDerivation(
            "iteration count must be > 0".into(),
        ));
    }

    let mut key_bytes = [0u8; MASTER_KEY_LEN];
    pbkdf2_hmac::<Sha256>(passphrase, &salt, params.iter, &mut key_bytes);
    let master_key = SecretBytes::new(key_bytes);
    key_bytes.zeroize();

    // Independent derivation: same primitive and cost, domain-separated salt.
    let mut verifier_salt = Vec::with_capacity(SALT_LEN.saturating_add(VERIFIER_DOMAIN.len()));
    verifier_salt.extend_from_slice(&salt);
    verifier_salt.extend_from_slice(VERIFIER_DOMAIN);
    let mut verifier = [0u8; VERIFIER_LEN];
    pbkdf2_hmac::<Sha256>(passphrase, &verifier_salt, params.iter, &mut verifier);

    Ok(DerivedKey {
        master_key,
        salt,
        params,
        verifier,
    })
}

/// Generate a fresh random 16-byte salt.
///
/// # Errors
///
/// Returns `CryptoError::Random` if the CSPRNG fails.
pub fn generate_salt() -> Result<[u8; SALT_LEN], CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| CryptoError::Random(format!("CSPRNG fill failed: {e}")))?;
    Ok(salt)
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Compare a locally derived verifier against the persisted one.
///
/// Uses `ring`'s constant-time comparison. Returns `false` if either value
/// is empty or the lengths differ — a length mismatch is itself non-secret
/// and may short-circuit safely.
#[must_use]
pub fn verify(local: &[u8], stored: &[u8]) -> bool {
    if local.is_empty() || stored.is_empty() || local.len() != stored.len() {
        return false;
    }
    ring::constant_time::verify_slices_are_equal(local, stored).is_ok()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
