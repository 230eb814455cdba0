//! Koinu (1e-8 coin subunit) decimal conversion, grounded on
//! `original_source/src/koinu.c`'s `coins_to_koinu_str`/`koinu_to_coins_str`
//! (truncate at the decimal point, right-pad/truncate the fractional part to
//! exactly 8 digits, then parse as a plain integer).

use crate::error::KoinuError;

pub const KOINU_PER_COIN: u64 = 100_000_000;

/// Parses a decimal coin amount (e.g. `"12.5"`, `"0.00000001"`) into koinu.
/// A negative amount is rejected as `Underflow` (koinu is an unsigned
/// subunit), except for a literal negative zero such as `"-0"` or `"-0.0"`,
/// which has no sign to speak of and parses as `0`.
pub fn koinu_from_coin_str(s: &str) -> Result<u64, KoinuError> {
    if s.is_empty() || s.len() > 21 {
        return Err(KoinuError::OutOfRange);
    }

    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, f),
        None => (rest, ""),
    };

    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(KoinuError::NonDecimal);
    }
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(KoinuError::NonDecimal);
    }
    if frac_part.len() > 8 {
        return Err(KoinuError::InvalidTermination);
    }

    if negative {
        let all_zero = int_part.bytes().all(|b| b == b'0') && frac_part.bytes().all(|b| b == b'0');
        return if all_zero { Ok(0) } else { Err(KoinuError::Underflow) };
    }

    let mut frac = frac_part.to_string();
    while frac.len() < 8 {
        frac.push('0');
    }

    let integer: u64 = int_part.parse().map_err(|_| KoinuError::Overflow)?;
    let fraction: u64 = frac.parse().map_err(|_| KoinuError::Overflow)?;

    let whole = integer
        .checked_mul(KOINU_PER_COIN)
        .ok_or(KoinuError::Overflow)?;
    whole.checked_add(fraction).ok_or(KoinuError::Overflow)
}

/// Formats koinu as a decimal coin string with an 8-digit fractional part.
pub fn coin_str_from_koinu(koinu: u64) -> String {
    let integer = koinu / KOINU_PER_COIN;
    let fraction = koinu % KOINU_PER_COIN;
    format!("{integer}.{fraction:08}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_whole_and_fractional_amounts() {
        for v in [0u64, 1, 100_000_000, 12_345_678, 1_000_000_000_000u64] {
            let s = coin_str_from_koinu(v);
            assert_eq!(koinu_from_coin_str(&s).unwrap(), v);
        }
    }

    #[test]
    fn pads_short_fractional_parts() {
        assert_eq!(koinu_from_coin_str("1.5").unwrap(), 150_000_000);
        assert_eq!(koinu_from_coin_str("0.00000001").unwrap(), 1);
    }

    #[test]
    fn rejects_non_decimal_input() {
        assert_eq!(koinu_from_coin_str("12a.5"), Err(KoinuError::NonDecimal));
        assert_eq!(koinu_from_coin_str(""), Err(KoinuError::OutOfRange));
    }

    #[test]
    fn rejects_too_many_fractional_digits() {
        assert_eq!(koinu_from_coin_str("1.123456789"), Err(KoinuError::InvalidTermination));
    }

    #[test]
    fn rejects_negative_amounts_as_underflow() {
        assert_eq!(koinu_from_coin_str("-1"), Err(KoinuError::Underflow));
        assert_eq!(koinu_from_coin_str("-0.00000001"), Err(KoinuError::Underflow));
    }

    #[test]
    fn negative_zero_is_zero() {
        assert_eq!(koinu_from_coin_str("-0").unwrap(), 0);
        assert_eq!(koinu_from_coin_str("-0.0").unwrap(), 0);
    }
}
