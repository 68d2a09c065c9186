//! Score Signatures
//!
//! `key = HMAC-SHA256("MiCetF" + chrono, token)`, hex-encoded, where
//! `chrono` is the completion time in centiseconds written as a decimal
//! integer. The server recomputes the key and compares in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

/// Message prefix shared by client and server.
pub const KEY_PREFIX: &str = "MiCetF";

/// Placeholder chrono meaning "no time provided" (one hour in centiseconds).
pub const SENTINEL_CHRONO: i64 = 360_000;

type HmacSha256 = Hmac<Sha256>;

/// Why a submission was not inserted.
///
/// Never reported to the client, which only sees an unchanged list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Chrono was missing, non-positive, or the sentinel itself.
    #[error("chrono is unset")]
    SentinelChrono,

    /// Chrono does not fit a leaderboard entry.
    #[error("chrono out of range")]
    ChronoOutOfRange,

    /// Key does not match the recomputed signature.
    #[error("signature mismatch")]
    SignatureMismatch,
}

fn keyed_mac(chrono_centiseconds: i64, token: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(token.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(KEY_PREFIX.as_bytes());
    mac.update(chrono_centiseconds.to_string().as_bytes());
    mac
}

/// Compute the hex signature for a chrono and session token.
pub fn compute_key(chrono_centiseconds: i64, token: &str) -> String {
    hex::encode(keyed_mac(chrono_centiseconds, token).finalize().into_bytes())
}

/// Length of an encoded key: 32 MAC bytes as hex.
pub const KEY_HEX_LEN: usize = 64;

/// Check `key` against the recomputed signature in constant time.
///
/// Only the exact form [`compute_key`] produces matches: 64 lowercase hex
/// digits, no surrounding whitespace.
pub fn verify_key(chrono_centiseconds: i64, token: &str, key: &str) -> bool {
    let canonical = key.len() == KEY_HEX_LEN
        && key.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    if !canonical {
        return false;
    }
    let Ok(provided) = hex::decode(key) else {
        return false;
    };
    keyed_mac(chrono_centiseconds, token)
        .verify_slice(&provided)
        .is_ok()
}

/// Map non-positive chronos to the sentinel.
#[inline]
pub fn normalize_chrono(chrono_centiseconds: i64) -> i64 {
    if chrono_centiseconds > 0 {
        chrono_centiseconds
    } else {
        SENTINEL_CHRONO
    }
}

/// Validate a submission; returns the accepted chrono in centiseconds.
pub fn check_submission(chrono_centiseconds: i64, token: &str, key: &str) -> Result<u32, Rejection> {
    let chrono = normalize_chrono(chrono_centiseconds);
    if chrono == SENTINEL_CHRONO {
        return Err(Rejection::SentinelChrono);
    }
    if !verify_key(chrono, token, key) {
        return Err(Rejection::SignatureMismatch);
    }
    u32::try_from(chrono).map_err(|_| Rejection::ChronoOutOfRange)
}
