//! `cadenas-crypto-core` — Pure cryptographic primitives for CADENAS.
//!
//! This crate is the audit target: zero network, zero async, zero storage
//! dependencies. It turns a memorized passphrase into a master key and
//! verifier, wraps per-record item keys under the master key, and provides
//! the authenticated record cipher, TOTP generation, and password tooling.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod kdf;
mod symmetric;

pub mod envelope;
pub mod record;

pub mod totp;

pub mod password;

pub use envelope::{generate_item_key, unwrap, wrap, WrappedKeyEnvelope, ITEM_KEY_LEN};
pub use error::CryptoError;
pub use kdf::{
    derive, generate_salt, verify, DerivedKey, KdfAlgorithm, KdfParams, DEFAULT_ITERATIONS,
    MASTER_KEY_LEN, SALT_LEN, VERIFIER_LEN,
};
pub use memory::{SecretBuffer, SecretBytes};
pub use password::{
    generate, score, PasswordPolicy, StrengthLabel, StrengthReport, DEFAULT_PASSWORD_LENGTH,
};
pub use record::{build_aad, decrypt, encrypt, SealedRecord, AAD_NAMESPACE, IV_LEN};
pub use totp::{code, decode_seed, generate_totp, OtpDigits, DEFAULT_PERIOD};
