//! Vault session — the explicit lock/unlock state machine.
//!
//! The master key is process-wide, single-instance state: absent →
//! populated on successful unlock → cleared on lock. It is modeled as an
//! explicit [`SessionState`] behind an `RwLock` rather than ambient global
//! memory, and every encrypt/decrypt call takes the session explicitly.
//!
//! # Concurrency
//!
//! Bulk decrypts hold the lock shared, so independent records decrypt
//! concurrently. [`VaultSession::lock`] takes the lock exclusively — a hard
//! barrier: in-flight reads finish against the old key, and anything
//! starting afterwards observes `Locked` and fails cleanly. Dropping the
//! `Unlocked` state zeroizes the key via `SecretBytes`'s `Drop` impl.

use std::sync::{PoisonError, RwLock};

use cadenas_crypto_core::kdf::{self, KdfParams, MASTER_KEY_LEN};
use cadenas_crypto_core::memory::SecretBytes;
use cadenas_crypto_core::CryptoError;
use data_encoding::BASE64;

use crate::boundary::VaultKeyRecord;
use crate::error::VaultError;

/// Lock state of a vault session.
enum SessionState {
    /// No key material in memory.
    Locked,
    /// Master key held for the duration of the session.
    Unlocked {
        master_key: SecretBytes<MASTER_KEY_LEN>,
    },
}

/// A vault session context.
///
/// Created locked; populated by [`VaultSession::create`] (new vault) or
/// [`VaultSession::unlock`] (existing vault).
pub struct VaultSession {
    state: RwLock<SessionState>,
}

impl VaultSession {
    /// Create a new, locked session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::Locked),
        }
    }

    /// Create a brand-new vault with default KDF parameters.
    ///
    /// Generates a fresh salt, derives the master key and verifier, stores
    /// the key in this session, and returns the persistable key record.
    ///
    /// # Errors
    ///
    /// Propagates `CryptoError` from derivation or salt generation.
    pub fn create(&self, owner_id: &str, passphrase: &str) -> Result<VaultKeyRecord, VaultError> {
        self.create_with_params(owner_id, passphrase, KdfParams::default())
    }

    /// Create a brand-new vault with an explicit cost factor.
    ///
    /// # Errors
    ///
    /// Propagates `CryptoError` from derivation or salt generation.
    pub fn create_with_params(
        &self,
        owner_id: &str,
        passphrase: &str,
        params: KdfParams,
    ) -> Result<VaultKeyRecord, VaultError> {
        let derived = kdf::derive(passphrase.as_bytes(), None, Some(params))?;
        let record = VaultKeyRecord {
            owner_id: owner_id.to_owned(),
            kdf_salt: BASE64.encode(&derived.salt),
            kdf_params: derived.params,
            key_verifier: BASE64.encode(&derived.verifier),
        };
        self.install(derived.master_key);
        Ok(record)
    }

    /// Unlock against a stored key record.
    ///
    /// Re-derives with the persisted salt and parameters, then compares the
    /// re-derived verifier against the persisted one in constant time. The
    /// derived key is trusted (and installed) only after that check passes.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidPassphrase`] on verifier mismatch — the
    /// session stays locked. Malformed stored fields surface as
    /// `CryptoError::Encoding`.
    pub fn unlock(&self, record: &VaultKeyRecord, passphrase: &str) -> Result<(), VaultError> {
        let salt = BASE64
            .decode(record.kdf_salt.as_bytes())
            .map_err(|e| CryptoError::Encoding(format!("malformed stored salt: {e}")))?;
        let stored_verifier = BASE64
            .decode(record.key_verifier.as_bytes())
            .map_err(|e| CryptoError::Encoding(format!("malformed stored verifier: {e}")))?;

        let derived = kdf::derive(passphrase.as_bytes(), Some(&salt), Some(record.kdf_params))?;
        if !kdf::verify(&derived.verifier, &stored_verifier) {
            return Err(VaultError::InvalidPassphrase);
        }

        self.install(derived.master_key);
        Ok(())
    }

    /// Lock the session, clearing the master key.
    ///
    /// Takes the write lock: every in-flight shared-lock operation
    /// completes first, and the replaced `Unlocked` state zeroizes the key
    /// on drop.
    pub fn lock(&self) {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = SessionState::Locked;
    }

    /// Whether the session currently holds a master key.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        matches!(&*guard, SessionState::Unlocked { .. })
    }

    /// Run `f` with shared access to the master key.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Locked`] if no key is installed.
    pub(crate) fn with_key<T>(
        &self,
        f: impl FnOnce(&SecretBytes<MASTER_KEY_LEN>) -> Result<T, VaultError>,
    ) -> Result<T, VaultError> {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*guard {
            SessionState::Locked => Err(VaultError::Locked),
            SessionState::Unlocked { master_key } => f(master_key),
        }
    }

    /// Install a freshly derived master key, replacing any previous state.
    fn install(&self, master_key: SecretBytes<MASTER_KEY_LEN>) {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = SessionState::Unlocked { master_key };
    }
}

impl Default for VaultSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.is_unlocked() {
            "Unlocked(***)"
        } else {
            "Locked"
        };
        write!(f, "VaultSession({state})")
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
