//! Password health audit over decrypted payloads.
//!
//! Runs entirely over in-memory payloads after a bulk load — plaintext
//! passwords never leave this function and never land in the report.
//! Strength comes from the core scorer, unmodified; reuse detection groups
//! by a blake3 fingerprint of the password.

use std::collections::BTreeMap;

use cadenas_crypto_core::password::{self, StrengthLabel};

use crate::items::{ItemPayload, LoadedItem};

/// A credential reference (id + title) — safe to display, no secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRef {
    /// Record id.
    pub id: String,
    /// Display title.
    pub title: String,
}

/// A credential flagged as weak by the scorer.
#[derive(Debug, Clone)]
pub struct WeakCredential {
    /// Record id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Points the scorer awarded (0-5).
    pub score: u8,
}

/// A group of two or more credentials sharing the same password.
#[derive(Debug, Clone)]
pub struct ReusedGroup {
    /// The credentials in the group.
    pub credentials: Vec<CredentialRef>,
}

/// Aggregate audit result.
#[derive(Debug, Default)]
pub struct HealthReport {
    /// Number of login records examined.
    pub total_logins: usize,
    /// Logins whose password scored weak.
    pub weak: Vec<WeakCredential>,
    /// Groups of logins sharing a password.
    pub reused: Vec<ReusedGroup>,
}

/// Audit the loaded items for weak and reused passwords.
///
/// Only `Login` payloads participate; other kinds are ignored. Pure over
/// the input slice — no session access, no side effects.
#[must_use]
pub fn audit(items: &[LoadedItem]) -> HealthReport {
    let mut report = HealthReport::default();
    // Fingerprint → credentials sharing that password. BTreeMap keeps the
    // group order stable across runs.
    let mut by_fingerprint: BTreeMap<String, Vec<CredentialRef>> = BTreeMap::new();

    for item in items {
        let ItemPayload::Login { password, .. } = &item.payload else {
            continue;
        };
        report.total_logins = report.total_logins.saturating_add(1);

        let strength = password::score(password);
        if strength.label == StrengthLabel::Weak {
            report.weak.push(WeakCredential {
                id: item.row.id.clone(),
                title: item.row.title.clone(),
                score: strength.score,
            });
        }

        let fingerprint = blake3::hash(password.as_bytes()).to_hex().to_string();
        by_fingerprint
            .entry(fingerprint)
            .or_default()
            .push(CredentialRef {
                id: item.row.id.clone(),
                title: item.row.title.clone(),
            });
    }

    report.reused = by_fingerprint
        .into_values()
        .filter(|group| group.len() > 1)
        .map(|credentials| ReusedGroup { credentials })
        .collect();

    report
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
