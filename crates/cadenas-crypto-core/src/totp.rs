//! RFC 6238 TOTP generation over stored base32 seeds.
//!
//! Codes are a pure function of the seed and the supplied Unix time — no
//! persisted state, and any two calls inside the same step window produce
//! the same code. HMAC-SHA1 via `ring::hmac`, per the ecosystem of
//! authenticator apps this interoperates with.

use ring::hmac;

use crate::error::CryptoError;

/// Default TOTP period in seconds (RFC 6238 §4).
pub const DEFAULT_PERIOD: u32 = 30;

/// RFC 4648 base32 alphabet.
const BASE32_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Number of digits in a TOTP code (6 or 8 only).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OtpDigits {
    /// 6-digit code (standard).
    #[default]
    Six,
    /// 8-digit code.
    Eight,
}

impl OtpDigits {
    /// Return the numeric digit count.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Six => 6,
            Self::Eight => 8,
        }
    }

    /// Return the modulus value (10^digits) for truncation.
    const fn modulus(self) -> u32 {
        match self {
            Self::Six => 1_000_000,
            Self::Eight => 100_000_000,
        }
    }
}

/// Decode a stored base32 seed into raw key bytes.
///
/// Tolerant decode: whitespace is stripped, input is upper-cased, and any
/// character outside the RFC 4648 alphabet (including padding `=`) is
/// skipped. Trailing bits that do not fill a whole byte are dropped.
///
/// # Errors
///
/// Returns `CryptoError::Encoding` if no alphabet characters remain — a
/// seed that decodes to nothing must not silently become an empty key.
// Accumulator holds at most 12 bits between iterations; the shifts and
// additions below cannot overflow a u32.
#[allow(clippy::arithmetic_side_effects)]
pub fn decode_seed(seed: &str) -> Result<Vec<u8>, CryptoError> {
    let mut bits: u32 = 0;
    let mut bit_count: u32 = 0;
    let mut out = Vec::new();

    for c in seed.chars() {
        let upper = c.to_ascii_uppercase();
        let Some(value) = BASE32_ALPHABET.iter().position(|&a| char::from(a) == upper) else {
            continue;
        };
        bits = (bits << 5) | u32::try_from(value).unwrap_or(0);
        bit_count += 5;
        if bit_count >= 8 {
            bit_count -= 8;
            out.push(u8::try_from((bits >> bit_count) & 0xFF).unwrap_or(0));
        }
    }

    if out.is_empty() {
        return Err(CryptoError::Encoding(
            "base32 seed contains no decodable characters".into(),
        ));
    }
    Ok(out)
}

/// Generate an HOTP code for an explicit counter value (RFC 4226).
///
/// # Errors
///
/// Returns `CryptoError::Otp` if the secret is empty.
fn generate_hotp(secret: &[u8], counter: u64, digits: OtpDigits) -> Result<String, CryptoError> {
    if secret.is_empty() {
        return Err(CryptoError::Otp("secret must not be empty".to_owned()));
    }

    // HMAC-SHA1 over the counter as 8-byte big-endian (RFC 4226 §5.2).
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, secret);
    let tag = hmac::sign(&key, &counter.to_be_bytes());
    let digest = tag.as_ref();

    // Dynamic truncation (RFC 4226 §5.3): offset = low 4 bits of last byte,
    // then 4 bytes from the offset with the top bit masked to a 31-bit int.
    let offset = usize::from(digest[digest.len().wrapping_sub(1)] & 0x0F);
    let binary_code = u32::from_be_bytes([
        digest[offset] & 0x7F,
        digest[offset.wrapping_add(1)],
        digest[offset.wrapping_add(2)],
        digest[offset.wrapping_add(3)],
    ]);

    // modulus is always 10^6 or 10^8, never zero.
    #[allow(clippy::arithmetic_side_effects)]
    let code = binary_code % digits.modulus();
    let width = usize::from(digits.value());
    Ok(format!("{code:0>width$}"))
}

/// Generate a TOTP code from raw secret bytes at the given Unix time.
///
/// # Errors
///
/// Returns `CryptoError::Otp` if `period` is zero or the secret is empty.
pub fn generate_totp(
    secret: &[u8],
    time: u64,
    period: u32,
    digits: OtpDigits,
) -> Result<String, CryptoError> {
    if period == 0 {
        return Err(CryptoError::Otp("period must be > 0".to_owned()));
    }

    // counter = floor(time / period); period validated non-zero above.
    #[allow(clippy::arithmetic_side_effects)]
    let counter = time / u64::from(period);
    generate_hotp(secret, counter, digits)
}

/// Generate a TOTP code straight from a stored base32 seed.
///
/// Decode + generate in one call; `time` is the current Unix time in
/// seconds, supplied by the caller.
///
/// # Errors
///
/// Returns `CryptoError::Encoding` for an undecodable seed and
/// `CryptoError::Otp` for a zero period.
pub fn code(
    seed_base32: &str,
    time: u64,
    period: u32,
    digits: OtpDigits,
) -> Result<String, CryptoError> {
    let secret = decode_seed(seed_base32)?;
    generate_totp(&secret, time, period, digits)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
