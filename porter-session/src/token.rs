//! Session token generation.
//!
//! A token mixes the current time with randomness: the decimal nanosecond
//! timestamp is OR-ed with a per-process salt, and its bytes are spread over
//! the even positions of a random buffer. The buffer is then encoded with
//! the URL-safe base64 alphabet, so tokens can travel in cookies, headers
//! and query strings untouched.
//!
//! This is a best-effort uniqueness scheme layered over the thread RNG,
//! not a formally analysed security primitive. If the operating system
//! cannot supply random bytes the thread RNG panics; there is no
//! meaningful way to continue issuing sessions at that point.

use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use once_cell::sync::Lazy;
use rand::RngCore;
use std::time::{SystemTime, UNIX_EPOCH};

/// Process-wide salt, one byte per decimal digit of a timestamp.
static SALT: Lazy<Vec<u8>> = Lazy::new(|| random_bytes(timestamp_digits().len()));

/// Generate the salt now rather than on the first token.
pub fn init() {
    Lazy::force(&SALT);
}

/// Generate a new session token.
///
/// ```
/// let a = porter_session::token::new_token();
/// let b = porter_session::token::new_token();
/// assert_ne!(a, b);
/// assert!(!a.contains('+') && !a.contains('/'));
/// ```
pub fn new_token() -> String {
    URL_SAFE.encode(token_bytes())
}

fn random_bytes(len: usize) -> Vec<u8> {
    let mut buffer = vec![0u8; len];
    rand::rng().fill_bytes(&mut buffer);
    buffer
}

fn timestamp_digits() -> Vec<u8> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
        .to_string()
        .into_bytes()
}

fn add_salt(stamp: &[u8], salt: &[u8]) -> Vec<u8> {
    stamp
        .iter()
        .enumerate()
        .map(|(i, b)| match salt.get(i) {
            Some(s) => b | s,
            None => *b,
        })
        .collect()
}

fn interleave(salted: &[u8]) -> Vec<u8> {
    let mut buffer = random_bytes(salted.len() * 2 + 1);
    for (i, b) in salted.iter().enumerate() {
        buffer[i * 2] = *b;
    }
    buffer
}

fn token_bytes() -> Vec<u8> {
    interleave(&add_salt(&timestamp_digits(), &SALT))
}
