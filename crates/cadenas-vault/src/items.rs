//! Item payloads and the save/load encryption flows.
//!
//! A save generates a fresh item key, encrypts the serialized payload under
//! it, wraps the key under the session's master key, and hands the four
//! opaque fields to the storage collaborator. A load reverses the path; a
//! bulk load isolates per-record failures so one corrupted row never locks
//! the user out of the rest of the vault.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use cadenas_crypto_core::envelope::{self, WrappedKeyEnvelope};
use cadenas_crypto_core::record::{self, IV_LEN};
use cadenas_crypto_core::totp::{self, OtpDigits};
use cadenas_crypto_core::CryptoError;
use data_encoding::BASE64;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::boundary::ItemRecord;
use crate::error::VaultError;
use crate::session::VaultSession;

// ---------------------------------------------------------------------------
// Payload model
// ---------------------------------------------------------------------------

/// The decrypted payload of an item, by record kind.
///
/// Exists only between decrypt and re-encrypt; never persisted in the
/// clear. Serialized to JSON before encryption.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemPayload {
    /// Site/service credentials.
    Login {
        /// Account name or e-mail.
        username: String,
        /// The stored password.
        password: String,
    },
    /// Free-form secure note.
    Note {
        /// Note body.
        text: String,
    },
    /// TOTP seed for one-time code generation.
    Totp {
        /// Base32 seed as issued (tolerant decode on use).
        seed: String,
    },
    /// Open-ended key/value map.
    Custom {
        /// Field name → value.
        fields: BTreeMap<String, String>,
    },
}

impl ItemPayload {
    /// Kind tag mirrored into the record's pass-through metadata.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Note { .. } => "note",
            Self::Totp { .. } => "totp",
            Self::Custom { .. } => "custom",
        }
    }
}

/// The four opaque fields produced by a save, stored verbatim by the
/// collaborator alongside its own metadata.
#[must_use = "sealed item fields must be handed to storage"]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedItem {
    /// JSON wrap envelope for the fresh item key.
    pub enc_key_wrapped: String,
    /// Base64 encrypted payload.
    pub enc_blob: String,
    /// Base64 12-byte IV.
    pub iv: String,
    /// Literal AAD string.
    pub aad: String,
}

/// An item successfully decrypted during a bulk load.
#[derive(Clone, Debug)]
pub struct LoadedItem {
    /// The stored row, metadata included.
    pub row: ItemRecord,
    /// Its decrypted payload.
    pub payload: ItemPayload,
}

/// A record skipped during a bulk load, kept for diagnostics.
#[derive(Debug)]
pub struct LoadFailure {
    /// Id of the unreadable record.
    pub id: String,
    /// Why it was skipped.
    pub error: VaultError,
}

/// Outcome of [`open_all`]: decrypted items plus skipped records.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Records that decrypted and deserialized cleanly.
    pub items: Vec<LoadedItem>,
    /// Records skipped because of tampering, corruption, or format drift.
    pub failures: Vec<LoadFailure>,
}

// ---------------------------------------------------------------------------
// Save path
// ---------------------------------------------------------------------------

/// Encrypt a payload for storage.
///
/// Generates a fresh item key (used for exactly this one encryption), seals
/// the payload bound to `record_id` and the current wall-clock, wraps the
/// key under the master key, and returns the four opaque fields. A wrap
/// failure is fatal to the save — nothing is partially produced.
///
/// # Errors
///
/// Returns [`VaultError::Locked`] if the session holds no key, and
/// propagates `CryptoError` from key generation, encryption, or wrapping.
pub fn seal_item(
    session: &VaultSession,
    payload: &ItemPayload,
    record_id: Option<&str>,
) -> Result<SealedItem, VaultError> {
    let now_ms = epoch_millis();
    session.with_key(|master_key| {
        let item_key = envelope::generate_item_key()?;

        let mut plaintext = serde_json::to_vec(payload)
            .map_err(|e| VaultError::PayloadFormat(format!("payload serialization failed: {e}")))?;
        let sealed = record::encrypt(&item_key, &plaintext, record_id, now_ms);
        plaintext.zeroize();
        let sealed = sealed?;

        let wrapped = envelope::wrap(master_key, &item_key)?;

        Ok(SealedItem {
            enc_key_wrapped: wrapped.to_json()?,
            enc_blob: BASE64.encode(&sealed.ciphertext),
            iv: BASE64.encode(&sealed.iv),
            aad: sealed.aad,
        })
    })
}

// ---------------------------------------------------------------------------
// Load path
// ---------------------------------------------------------------------------

/// Decrypt a single stored row back into its payload.
///
/// Unwraps the item key under the session's master key, then decrypts the
/// blob with the *stored* IV and AAD exactly as persisted.
///
/// # Errors
///
/// Returns [`VaultError::Locked`] if the session holds no key;
/// `CryptoError::KeyUnwrapFailed` / `CryptoError::RecordDecryptFailed` on
/// tampering or a wrong key; [`VaultError::PayloadFormat`] if the decrypted
/// bytes are not a known payload shape.
pub fn open_item(session: &VaultSession, row: &ItemRecord) -> Result<ItemPayload, VaultError> {
    session.with_key(|master_key| {
        let wrapped = WrappedKeyEnvelope::from_json(&row.enc_key_wrapped)?;
        let item_key = envelope::unwrap(master_key, &wrapped)?;

        let ciphertext = BASE64
            .decode(row.enc_blob.as_bytes())
            .map_err(|e| CryptoError::Encoding(format!("malformed stored blob: {e}")))?;
        let iv_bytes = BASE64
            .decode(row.iv.as_bytes())
            .map_err(|e| CryptoError::Encoding(format!("malformed stored iv: {e}")))?;
        if iv_bytes.len() != IV_LEN {
            return Err(VaultError::Crypto(CryptoError::Encoding(format!(
                "invalid stored iv length: {} bytes (expected {IV_LEN})",
                iv_bytes.len()
            ))));
        }
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&iv_bytes);

        let plaintext = record::decrypt(&item_key, &ciphertext, iv, &row.aad)?;
        serde_json::from_slice(plaintext.expose())
            .map_err(|e| VaultError::PayloadFormat(format!("payload deserialization failed: {e}")))
    })
}

/// Decrypt a batch of stored rows, isolating per-record failures.
///
/// An unreadable record (tampered, corrupted, or cross-wired) is skipped
/// and recorded in [`LoadOutcome::failures`]; the rest of the vault loads
/// normally. No record is ever downgraded to a default/empty payload.
///
/// # Errors
///
/// Returns [`VaultError::Locked`] if the session locks before or during the
/// load — that is a session-level condition, not a per-record one.
pub fn open_all(session: &VaultSession, rows: &[ItemRecord]) -> Result<LoadOutcome, VaultError> {
    let mut outcome = LoadOutcome::default();
    for row in rows {
        match open_item(session, row) {
            Ok(payload) => outcome.items.push(LoadedItem {
                row: row.clone(),
                payload,
            }),
            Err(VaultError::Locked) => return Err(VaultError::Locked),
            Err(error) => outcome.failures.push(LoadFailure {
                id: row.id.clone(),
                error,
            }),
        }
    }
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Tag hashing
// ---------------------------------------------------------------------------

/// Hash a tag list into the opaque form stored with a record.
///
/// Tags are normalized (trimmed, lower-cased) before hashing so the stored
/// values support equality matching without revealing the tag text.
#[must_use]
pub fn hash_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| {
            blake3::hash(tag.trim().to_lowercase().as_bytes())
                .to_hex()
                .to_string()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// TOTP convenience
// ---------------------------------------------------------------------------

/// Generate the current 6-digit code for a stored TOTP seed.
///
/// # Errors
///
/// Returns `CryptoError::Encoding` for an undecodable seed.
pub fn current_code(seed: &str) -> Result<String, VaultError> {
    Ok(totp::code(
        seed,
        epoch_seconds(),
        totp::DEFAULT_PERIOD,
        OtpDigits::Six,
    )?)
}

// ---------------------------------------------------------------------------
// Wall clock
// ---------------------------------------------------------------------------

/// Current Unix time in milliseconds.
///
/// The single place this crate reads the wall clock for AAD construction.
#[must_use]
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Current Unix time in seconds.
#[must_use]
pub fn epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_kind_tags() {
        let login = ItemPayload::Login {
            username: "ada".into(),
            password: "pw".into(),
        };
        let note = ItemPayload::Note { text: "n".into() };
        let totp = ItemPayload::Totp {
            seed: "JBSWY3DP".into(),
        };
        let custom = ItemPayload::Custom {
            fields: BTreeMap::new(),
        };
        assert_eq!(login.kind(), "login");
        assert_eq!(note.kind(), "note");
        assert_eq!(totp.kind(), "totp");
        assert_eq!(custom.kind(), "custom");
    }

    #[test]
    fn payload_serde_is_kind_tagged() {
        let payload = ItemPayload::Login {
            username: "ada".into(),
            password: "hunter2".into(),
        };
        let json = serde_json::to_string(&payload).expect("serialize");
        assert!(json.contains("\"kind\":\"login\""));
        let back: ItemPayload = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, payload);
    }

    #[test]
    fn custom_payload_roundtrips_field_map() {
        let mut fields = BTreeMap::new();
        fields.insert("host".to_string(), "db.internal".to_string());
        fields.insert("port".to_string(), "5432".to_string());
        let payload = ItemPayload::Custom { fields };
        let json = serde_json::to_vec(&payload).expect("serialize");
        let back: ItemPayload = serde_json::from_slice(&json).expect("deserialize");
        assert_eq!(back, payload);
    }

    #[test]
    fn hash_tags_is_deterministic_and_normalizing() {
        let a = hash_tags(&["Work".into(), "  banking ".into()]);
        let b = hash_tags(&["work".into(), "banking".into()]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_ne!(a[0], a[1]);
    }

    #[test]
    fn hash_tags_output_is_opaque_hex() {
        let hashed = hash_tags(&["secret-project".into()]);
        assert_eq!(hashed[0].len(), 64);
        assert!(!hashed[0].contains("secret"));
    }

    #[test]
    fn current_code_rejects_undecodable_seed() {
        let result = current_code("!!!");
        assert!(matches!(
            result,
            Err(VaultError::Crypto(CryptoError::Encoding(_)))
        ));
    }

    #[test]
    fn current_code_is_six_digits() {
        let code = current_code("JBSWY3DPEHPK3PXP").expect("code");
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}
