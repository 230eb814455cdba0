//! Base58Check, grounded on the manual byte-layout encoder/decoder shown in
//! `blockchain-labs-inc-bip-tools`'s `Xpub::to_base58`/`from_base58` (checksum
//! = leading 4 bytes of double-SHA256) and the address encoder in
//! `HawalaSupp-bitcoin-key-generator`'s `dogecoin_wallet.rs`, but written
//! against a hand-rolled alphabet table instead of the `ToBase58`/`FromBase58`
//! crate traits so the distinct error kinds this spec requires are
//! first-class instead of folded into one decode failure.

use crate::error::Base58Error;
use crate::hash::double_sha256;

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Upper bound on a decoded payload's length, mirroring the fixed output
/// buffer `original_source/src/base58.c:dogecoin_base58_decode` is handed by
/// its caller. Every real payload this crate decodes (WIF: 34, P2PKH/P2SH:
/// 21, extended keys: 78) sits far under this; it exists to bound an
/// adversarial or malformed string the way the original's caller-supplied
/// `binsz` did.
const MAX_DECODED_LEN: usize = 128;

fn digit_value(c: u8) -> Option<u8> {
    ALPHABET.iter().position(|&b| b == c).map(|p| p as u8)
}

/// Plain base58 (no checksum) encode.
pub fn encode(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|&&b| b == 0).count();

    // big-endian base-256 -> base-58 conversion via repeated division.
    let mut digits: Vec<u8> = vec![0];
    for &byte in data {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat('1').take(zeros));
    out.extend(digits.iter().rev().map(|&d| ALPHABET[d as usize] as char));
    out
}

/// Plain base58 (no checksum) decode.
pub fn decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    let zeros = s.chars().take_while(|&c| c == '1').count();

    let mut bytes: Vec<u8> = vec![0];
    for c in s.chars() {
        let value = digit_value(c as u8).ok_or(Base58Error::MalformedDigit(c))?;
        let mut carry = value as u32;
        for byte in bytes.iter_mut() {
            carry += (*byte as u32) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
        // The raw numeric magnitude alone (ignoring any leading-zero prefix
        // below) already exceeds what this codec accepts: "output number too
        // big" (original_source/src/base58.c:95).
        if bytes.len() > MAX_DECODED_LEN {
            return Err(Base58Error::LengthOverflow(bytes.len()));
        }
    }

    // `bytes` is little-endian and already minimal (no superfluous high
    // digits), except the initial single zero seed when the numeric value is
    // itself zero.
    let value_is_zero = bytes.iter().all(|&b| b == 0);
    let significant: Vec<u8> = if value_is_zero {
        Vec::new()
    } else {
        bytes.iter().rev().skip_while(|&&b| b == 0).copied().collect()
    };

    // Each leading '1' character contributes exactly one leading zero byte.
    // If that many zero bytes on top of the significant payload don't fit
    // the same bound the conversion above is held to, the leading-'1' count
    // doesn't match a decodable result (original_source/src/base58.c:118's
    // `zerocount > i` "result too large" check, restated against this
    // codec's own bound rather than a caller-supplied buffer size).
    if zeros + significant.len() > MAX_DECODED_LEN {
        return Err(Base58Error::LeadingZeroMismatch);
    }

    let mut out = Vec::with_capacity(zeros + significant.len());
    out.extend(std::iter::repeat(0u8).take(zeros));
    out.extend(significant);
    Ok(out)
}

/// Encode a payload as base58check: `base58(payload || checksum)` where
/// `checksum` is the leading 4 bytes of `double_sha256(payload)`.
pub fn encode_check(payload: &[u8]) -> String {
    let checksum = double_sha256(payload);
    let mut full = Vec::with_capacity(payload.len() + 4);
    full.extend_from_slice(payload);
    full.extend_from_slice(&checksum.0[..4]);
    encode(&full)
}

/// Decode and verify a base58check string, returning the payload (without
/// the trailing 4-byte checksum).
pub fn decode_check(s: &str) -> Result<Vec<u8>, Base58Error> {
    let full = decode(s)?;
    if full.len() < 4 {
        return Err(Base58Error::PrefixTooShort);
    }
    let (payload, checksum) = full.split_at(full.len() - 4);
    let expected = double_sha256(payload);
    if &expected.0[..4] != checksum {
        return Err(Base58Error::BadChecksum);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip_preserves_leading_zeros() {
        let payload = vec![0u8, 0u8, 1, 2, 3, 4, 5];
        let encoded = encode_check(&payload);
        let decoded = decode_check(&encoded).unwrap();
        assert_eq!(decoded, payload);
        assert!(encoded.starts_with("11"));
    }

    #[test]
    fn bad_checksum_is_rejected() {
        let payload = vec![1, 2, 3];
        let mut encoded = encode_check(&payload);
        encoded.push('1');
        assert!(matches!(decode_check(&encoded), Err(Base58Error::BadChecksum) | Err(_)));
    }

    #[test]
    fn malformed_digit_is_rejected() {
        assert_eq!(decode("0OIl"), Err(Base58Error::MalformedDigit('0')));
    }

    #[test]
    fn too_short_for_checksum_is_rejected() {
        assert_eq!(decode_check("1"), Err(Base58Error::PrefixTooShort));
    }

    #[test]
    fn oversized_numeric_value_is_rejected_as_length_overflow() {
        // No leading '1's, so the zero-prefix path never enters into it: the
        // accumulated magnitude alone overruns MAX_DECODED_LEN.
        let huge = "z".repeat(300);
        assert!(matches!(decode(&huge), Err(Base58Error::LengthOverflow(_))));
    }

    #[test]
    fn oversized_leading_zero_run_is_rejected_as_leading_zero_mismatch() {
        // All '1's: the numeric value stays zero the whole way through (the
        // per-character LengthOverflow check never trips), but the
        // leading-zero count alone exceeds what this codec accepts.
        let many_zeros = "1".repeat(300);
        assert_eq!(decode(&many_zeros), Err(Base58Error::LeadingZeroMismatch));
    }
}
