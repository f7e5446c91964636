//! Password generation and heuristic strength scoring.
//!
//! This module provides:
//! - [`generate`] — policy-driven random password generation from `OsRng`
//! - [`score`] — the strength heuristic, a pure function over the password
//!   string (also consumed unmodified by the vault health audit)

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default password length.
pub const DEFAULT_PASSWORD_LENGTH: usize = 20;

// Character sets, with and without visually-ambiguous glyphs.
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const UPPERCASE_UNAMBIGUOUS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ"; // no I, O
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const LOWERCASE_UNAMBIGUOUS: &[u8] = b"abcdefghijkmnopqrstuvwxyz"; // no l
const DIGITS: &[u8] = b"0123456789";
const DIGITS_UNAMBIGUOUS: &[u8] = b"23456789"; // no 0, 1
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{};:,.?/";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Character-class policy for password generation.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordPolicy {
    /// Number of characters to generate.
    pub length: usize,
    /// Include uppercase letters (A-Z).
    pub upper: bool,
    /// Include lowercase letters (a-z).
    pub lower: bool,
    /// Include digits (0-9).
    pub digits: bool,
    /// Include symbols (!@#$%^&*...).
    pub symbols: bool,
    /// Drop visually-ambiguous glyphs (`I O l 0 1`) from enabled classes.
    pub exclude_ambiguous: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: DEFAULT_PASSWORD_LENGTH,
            upper: true,
            lower: true,
            digits: true,
            symbols: true,
            exclude_ambiguous: true,
        }
    }
}

impl PasswordPolicy {
    /// Build the combined alphabet from the enabled classes.
    fn alphabet(&self) -> Vec<u8> {
        let mut alphabet = Vec::new();
        if self.upper {
            alphabet.extend_from_slice(if self.exclude_ambiguous {
                UPPERCASE_UNAMBIGUOUS
            } else {
                UPPERCASE
            });
        }
        if self.lower {
            alphabet.extend_from_slice(if self.exclude_ambiguous {
                LOWERCASE_UNAMBIGUOUS
            } else {
                LOWERCASE
            });
        }
        if self.digits {
            alphabet.extend_from_slice(if self.exclude_ambiguous {
                DIGITS_UNAMBIGUOUS
            } else {
                DIGITS
            });
        }
        if self.symbols {
            alphabet.extend_from_slice(SYMBOLS);
        }
        alphabet
    }
}

/// Strength tier produced by [`score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLabel {
    Weak,
    Medium,
    Strong,
}

impl StrengthLabel {
    /// Human-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
        }
    }
}

/// Result of scoring a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthReport {
    /// Points awarded (0-5).
    pub score: u8,
    /// Tier mapped from the score.
    pub label: StrengthLabel,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a random password according to `policy`.
///
/// Draws `length` independent uniformly-random `u32` values from the OS
/// CSPRNG and maps each into the combined alphabet by modulo.
///
/// # Errors
///
/// Returns [`CryptoError::PasswordPolicy`] if no character class is enabled
/// or the length is zero, and [`CryptoError::Random`] if the CSPRNG fails.
pub fn generate(policy: &PasswordPolicy) -> Result<String, CryptoError> {
    if policy.length == 0 {
        return Err(CryptoError::PasswordPolicy(
            "password length must be > 0".to_string(),
        ));
    }

    let alphabet = policy.alphabet();
    if alphabet.is_empty() {
        return Err(CryptoError::PasswordPolicy(
            "at least one character class must be enabled".to_string(),
        ));
    }

    let byte_len = policy
        .length
        .checked_mul(4)
        .ok_or_else(|| CryptoError::PasswordPolicy("password length too large".to_string()))?;
    let mut raw = vec![0u8; byte_len];
    OsRng
        .try_fill_bytes(&mut raw)
        .map_err(|e| CryptoError::Random(format!("CSPRNG fill failed: {e}")))?;

    let chars: Vec<u8> = raw
        .chunks_exact(4)
        .map(|chunk| {
            let index = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            // The alphabet is validated non-empty above, so the modulus
            // cannot be zero.
            #[allow(clippy::arithmetic_side_effects)]
            alphabet[index as usize % alphabet.len()]
        })
        .collect();

    // All character sets are ASCII.
    Ok(String::from_utf8(chars).expect("password chars are ASCII"))
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score a password with the audit heuristic.
///
/// Not an entropy estimate: fewer than 8 characters is an immediate floor;
/// otherwise one point each for length ≥ 12 and the presence of an
/// uppercase letter, a lowercase letter, a digit, and a symbol. 5 points is
/// strong, 3-4 medium, below that weak. Pure and side-effect free — the
/// vault health audit calls this on every stored login password.
// Score is bounded by the five criteria; the additions cannot overflow.
#[allow(clippy::arithmetic_side_effects)]
#[must_use]
pub fn score(password: &str) -> StrengthReport {
    if password.chars().count() < 8 {
        return StrengthReport {
            score: 0,
            label: StrengthLabel::Weak,
        };
    }

    let mut score: u8 = 0;
    if password.chars().count() >= 12 {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 1;
    }

    let label = match score {
        5 => StrengthLabel::Strong,
        3 | 4 => StrengthLabel::Medium,
        _ => StrengthLabel::Weak,
    };
    StrengthReport { score, label }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
