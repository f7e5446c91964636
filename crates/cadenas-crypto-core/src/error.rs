//! Cryptographic error types for `cadenas-crypto-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed (PBKDF2 parameter validation, output sizing).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Symmetric encryption failure (AES-256-GCM setup or seal).
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Item-key envelope could not be unwrapped — wrong master key,
    /// corrupted blob, or tampering. No partial output is ever returned.
    #[error("key unwrap failed: authentication tag mismatch")]
    KeyUnwrapFailed,

    /// Record decryption failed — ciphertext, IV, or AAD was altered,
    /// or the record was re-bound to a different identity.
    #[error("record decrypt failed: authentication tag mismatch")]
    RecordDecryptFailed,

    /// TOTP generation error (empty seed, zero period).
    #[error("OTP error: {0}")]
    Otp(String),

    /// Password generation policy error (e.g., no character class enabled).
    #[error("password policy error: {0}")]
    PasswordPolicy(String),

    /// Malformed base32/base64/structured-blob input.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The OS CSPRNG failed to produce bytes.
    #[error("random generation failed: {0}")]
    Random(String),
}
