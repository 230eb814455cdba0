//! BIP39 mnemonic entropy <-> words and PBKDF2-HMAC-SHA512 seed derivation,
//! grounded on `original_source/src/bip39.c`'s `generateRandomEnglishMnemonic`
//! / `mnemonic_to_entropy` / `mnemonic_to_seed` family.
//!
//! Expansion note (SPEC_FULL.md 3): the source's mnemonic words are NFKD
//! before hashing; since this crate ships only the fixed English wordlist,
//! NFKD is the identity transform on that ASCII vocabulary. Passphrases are
//! taken as raw UTF-8 bytes rather than pulling in a full Unicode
//! normalization crate the rest of the corpus never reaches for.

use crate::error::MnemonicError;
use sha2::{Digest, Sha256, Sha512};
use std::collections::HashMap;
use std::sync::OnceLock;

const WORDLIST_TEXT: &str = include_str!("wordlist_english.txt");
const PBKDF2_ROUNDS: u32 = 2048;
const SUPPORTED_ENTROPY_BITS: [usize; 5] = [128, 160, 192, 224, 256];

/// The fixed 2048-word English BIP39 list, one word per line, in order.
pub fn wordlist() -> &'static [&'static str] {
    static WORDS: OnceLock<Vec<&'static str>> = OnceLock::new();
    WORDS.get_or_init(|| WORDLIST_TEXT.lines().collect())
}

fn word_index(word: &str) -> Option<u16> {
    static INDEX: OnceLock<HashMap<&'static str, u16>> = OnceLock::new();
    let index = INDEX.get_or_init(|| wordlist().iter().enumerate().map(|(i, w)| (*w, i as u16)).collect());
    index.get(word).copied()
}

fn bits_of_byte(byte: u8) -> impl Iterator<Item = bool> {
    (0..8).rev().map(move |i| (byte >> i) & 1 == 1)
}

fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | (b as u8)))
        .collect()
}

/// Entropy -> mnemonic: `words = (entropy_bits || sha256(entropy)[..checksum_bits])`
/// split into 11-bit word indices.
pub fn entropy_to_mnemonic(entropy: &[u8]) -> Result<String, MnemonicError> {
    let entropy_bits = entropy.len() * 8;
    if !SUPPORTED_ENTROPY_BITS.contains(&entropy_bits) {
        return Err(MnemonicError::UnsupportedEntropySize(entropy_bits));
    }
    let checksum_bits = entropy_bits / 32;
    let hash = Sha256::digest(entropy);

    let mut bits: Vec<bool> = Vec::with_capacity(entropy_bits + checksum_bits);
    bits.extend(entropy.iter().flat_map(|&b| bits_of_byte(b)));
    bits.extend(bits_of_byte(hash[0]).take(checksum_bits.min(8)));
    if checksum_bits > 8 {
        bits.extend(hash[1..].iter().flat_map(|&b| bits_of_byte(b)).take(checksum_bits - 8));
    }

    let words = bits
        .chunks(11)
        .map(|chunk| {
            let index = chunk.iter().fold(0u16, |acc, &b| (acc << 1) | (b as u16));
            wordlist()[index as usize]
        })
        .collect::<Vec<_>>();
    Ok(words.join(" "))
}

/// Mnemonic -> entropy, validating the embedded checksum.
pub fn mnemonic_to_entropy(mnemonic: &str) -> Result<Vec<u8>, MnemonicError> {
    let words: Vec<&str> = mnemonic.split_whitespace().collect();
    if words.len() < 12 || words.len() > 24 || words.len() % 3 != 0 {
        return Err(MnemonicError::WrongWordCount(words.len()));
    }

    let mut bits = Vec::with_capacity(words.len() * 11);
    for word in &words {
        let index = word_index(word).ok_or_else(|| MnemonicError::UnknownWord((*word).to_string()))?;
        bits.extend((0..11).rev().map(|i| (index >> i) & 1 == 1));
    }

    // total_bits = entropy_bits + entropy_bits/32 = entropy_bits * 33/32
    let total_bits = bits.len();
    let entropy_bits = total_bits * 32 / 33;
    let checksum_bits = total_bits - entropy_bits;
    if !SUPPORTED_ENTROPY_BITS.contains(&entropy_bits) {
        return Err(MnemonicError::UnsupportedEntropySize(entropy_bits));
    }

    let entropy = bits_to_bytes(&bits[..entropy_bits]);
    let hash = Sha256::digest(&entropy);
    let expected_checksum_bits: Vec<bool> = {
        let mut v = Vec::with_capacity(checksum_bits);
        v.extend(bits_of_byte(hash[0]).take(checksum_bits.min(8)));
        if checksum_bits > 8 {
            v.extend(hash[1..].iter().flat_map(|&b| bits_of_byte(b)).take(checksum_bits - 8));
        }
        v
    };
    if bits[entropy_bits..] != expected_checksum_bits[..] {
        return Err(MnemonicError::BadChecksum);
    }

    Ok(entropy)
}

/// Validates a mnemonic's checksum without returning the entropy.
pub fn validate(mnemonic: &str) -> Result<(), MnemonicError> {
    mnemonic_to_entropy(mnemonic).map(|_| ())
}

/// PBKDF2-HMAC-SHA512 seed derivation: 2048 rounds, salt = `"mnemonic" ||
/// passphrase`, 64-byte output.
pub fn to_seed(mnemonic: &str, passphrase: &str) -> [u8; 64] {
    let mut salt = String::with_capacity(8 + passphrase.len());
    salt.push_str("mnemonic");
    salt.push_str(passphrase);

    let mut seed = [0u8; 64];
    pbkdf2::pbkdf2_hmac::<Sha512>(mnemonic.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut seed);
    seed
}

/// Generates a fresh mnemonic of `entropy_bits` bits of randomness.
pub fn generate(entropy_bits: usize) -> Result<String, MnemonicError> {
    if !SUPPORTED_ENTROPY_BITS.contains(&entropy_bits) {
        return Err(MnemonicError::UnsupportedEntropySize(entropy_bits));
    }
    let mut entropy = vec![0u8; entropy_bits / 8];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut entropy);
    entropy_to_mnemonic(&entropy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wordlist_has_2048_entries_and_is_sorted() {
        let words = wordlist();
        assert_eq!(words.len(), 2048);
        assert!(words.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn zero_entropy_matches_known_abandon_mnemonic() {
        let entropy = [0u8; 16];
        let mnemonic = entropy_to_mnemonic(&entropy).unwrap();
        assert_eq!(mnemonic, "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about");
    }

    #[test]
    fn mnemonic_entropy_round_trips_across_all_supported_sizes() {
        for &bits in &SUPPORTED_ENTROPY_BITS {
            let entropy = vec![0x42u8; bits / 8];
            let mnemonic = entropy_to_mnemonic(&entropy).unwrap();
            let recovered = mnemonic_to_entropy(&mnemonic).unwrap();
            assert_eq!(recovered, entropy);
        }
    }

    #[test]
    fn unknown_word_is_rejected() {
        let mnemonic = "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo notaword";
        assert!(matches!(mnemonic_to_entropy(mnemonic), Err(MnemonicError::UnknownWord(_))));
    }

    #[test]
    fn tampered_checksum_word_is_rejected() {
        let entropy = [0u8; 16];
        let mnemonic = entropy_to_mnemonic(&entropy).unwrap();
        let mut words: Vec<&str> = mnemonic.split_whitespace().collect();
        let last = words.len() - 1;
        words[last] = "zoo";
        let tampered = words.join(" ");
        assert!(matches!(mnemonic_to_entropy(&tampered), Err(MnemonicError::BadChecksum)));
    }

    #[test]
    fn seed_from_zoo_vote_mnemonic_matches_expected_root() {
        let mnemonic = "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo vote";
        validate(mnemonic).unwrap();
        let seed = to_seed(mnemonic, "");
        let root = crate::hd::ExtendedKey::from_seed(&seed).unwrap();
        let params = doge_types::ChainParams::for_network(doge_types::Network::Testnet);
        assert!(root.to_base58(&params).starts_with("tprv"));
    }
}
