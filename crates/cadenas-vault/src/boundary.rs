//! DTOs exchanged with the remote storage collaborator.
//!
//! The collaborator owns persistence, identity, and row-level access
//! control. This layer only produces and consumes these shapes; every
//! binary value crossing the boundary is base64, every structured value a
//! compact JSON object with fixed field names.

use cadenas_crypto_core::kdf::KdfParams;
use serde::{Deserialize, Serialize};

/// The per-vault key record: created once, read on every unlock, never
/// mutated outside an explicit passphrase-rotation flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultKeyRecord {
    /// Owning identity — opaque to this layer.
    pub owner_id: String,
    /// Base64 of the 16-byte KDF salt.
    pub kdf_salt: String,
    /// KDF parameters, honored verbatim on unlock.
    pub kdf_params: KdfParams,
    /// Base64 of the 16-byte verifier. Non-secret: it proves knowledge of
    /// the passphrase without allowing decryption of any record.
    pub key_verifier: String,
}

/// One stored item row.
///
/// `id`, `kind`, `title`, `tags_opaque`, `version`, and `updated_at` are
/// pass-through metadata owned by the presentation/storage layer — this
/// crate never interprets them. The four encrypted fields are produced by
/// [`crate::items::seal_item`] and consumed by [`crate::items::open_item`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    /// Storage-assigned record id.
    pub id: String,
    /// Record kind tag (mirrors the payload variant).
    pub kind: String,
    /// Display title.
    pub title: String,
    /// Hashed tag list (see [`crate::items::hash_tags`]).
    pub tags_opaque: Vec<String>,
    /// JSON wrap envelope for the item key.
    pub enc_key_wrapped: String,
    /// Base64 encrypted payload.
    pub enc_blob: String,
    /// Base64 12-byte IV for the payload ciphertext.
    pub iv: String,
    /// Literal AAD string, persisted at write time and required verbatim
    /// for decryption.
    pub aad: String,
    /// Schema version.
    pub version: u32,
    /// Last-updated timestamp (collaborator-formatted).
    pub updated_at: String,
}
