//! Vault error types for `cadenas-vault`.

use cadenas_crypto_core::CryptoError;
use thiserror::Error;

/// Errors produced by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Cryptographic operation failed (delegated from crypto-core).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Verifier mismatch — the passphrase is wrong. User-correctable;
    /// the unlock flow surfaces this and prompts re-entry.
    #[error("invalid passphrase")]
    InvalidPassphrase,

    /// The session is locked — operation requires an unlocked vault.
    #[error("vault is locked")]
    Locked,

    /// Decrypted bytes did not deserialize into a known payload shape.
    #[error("malformed payload: {0}")]
    PayloadFormat(String),
}
