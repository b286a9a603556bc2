//! Request nonces for the `logic` API.
//!
//! A nonce is the current unix time in milliseconds followed by a random
//! number below `36^4`, each written in base 36 with no padding. It only has
//! to be unlikely to repeat; it is not a cryptographic nonce.

use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Upper bound (exclusive) of the random component.
pub const RANDOM_BOUND: i64 = 1_679_616;

const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const BASE: i64 = 36;

/// Generate a fresh nonce from the wall clock and the thread-local RNG.
pub fn generate() -> String {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default();
    let random = rand::thread_rng().gen_range(0..RANDOM_BOUND);
    from_parts(now_ms, random)
}

/// Build a nonce from explicit time and random components.
pub fn from_parts(time_ms: i64, random: i64) -> String {
    let mut nonce = encode_base36(time_ms);
    nonce.push_str(&encode_base36(random));
    nonce
}

/// Encode `value` in base 36, most significant digit first.
///
/// `0` encodes to `"0"` and negative values get a leading `-`.
pub fn encode_base36(value: i64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    // i128 so that i64::MIN can be negated
    let mut rest = (value as i128).abs();
    let mut digits = Vec::new();
    while rest > 0 {
        digits.push(DIGITS[(rest % BASE as i128) as usize]);
        rest /= BASE as i128;
    }
    if value < 0 {
        digits.push(b'-');
    }
    digits.reverse();
    // only ASCII was pushed
    String::from_utf8(digits).unwrap_or_default()
}

/// Reverse of [`encode_base36`]; `None` for empty input, foreign digits or overflow.
pub fn decode_base36(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if digits.is_empty() {
        return None;
    }
    let mut value: i64 = 0;
    for c in digits.bytes() {
        let digit = DIGITS[..BASE as usize].iter().position(|&d| d == c)? as i64;
        value = value.checked_mul(BASE)?.checked_add(digit)?;
    }
    Some(if negative { -value } else { value })
}
