//! Cipher Schemes and Training-Time Encoders
//!
//! [`CipherScheme`] is the closed set of algorithm classes the classifier can
//! assign. The encoder functions in this module simulate each scheme and
//! exist solely to synthesize labeled training ciphertext; nothing on the
//! inference path calls them.
//!
//! Every randomized encoder takes the caller's RNG handle, so a training run
//! seeded once at the top is reproducible end to end — key material, column
//! counts, and substitution alphabets included.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keywords drawn per Vigenère sample
const VIGENERE_KEYWORDS: [&str; 4] = ["KEY", "SECRET", "CRYPTO", "PASSWORD"];

/// AES block size used by the modern encoder
const BLOCK_SIZE: usize = 16;

/// Encryption scheme classes the classifier distinguishes.
///
/// The set is closed: extending it means regenerating the corpus and
/// retraining. [`CipherScheme::ALL`] fixes the canonical class order used for
/// corpus labels, model class lists, and probability vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherScheme {
    /// Polyalphabetic substitution (repeating-keyword shifts)
    Vigenere,
    /// Monoalphabetic substitution (random letter bijection)
    Substitution,
    /// Columnar transposition
    Transposition,
    /// Block cipher without chaining, base64-encoded
    Modern,
}

impl CipherScheme {
    /// All schemes in canonical order
    pub const ALL: [CipherScheme; 4] = [
        CipherScheme::Vigenere,
        CipherScheme::Substitution,
        CipherScheme::Transposition,
        CipherScheme::Modern,
    ];

    /// Stable name used on the wire and in model artifacts
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherScheme::Vigenere => "Vigenere",
            CipherScheme::Substitution => "Substitution",
            CipherScheme::Transposition => "Transposition",
            CipherScheme::Modern => "Modern",
        }
    }

    /// Position in the canonical order
    pub fn index(&self) -> usize {
        match self {
            CipherScheme::Vigenere => 0,
            CipherScheme::Substitution => 1,
            CipherScheme::Transposition => 2,
            CipherScheme::Modern => 3,
        }
    }
}

impl fmt::Display for CipherScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encrypt a plaintext under `scheme`, drawing the scheme-specific parameter
/// (keyword, substitution alphabet, column count, key) from `rng`.
pub fn encrypt_sample<R: Rng>(scheme: CipherScheme, plaintext: &str, rng: &mut R) -> String {
    match scheme {
        CipherScheme::Vigenere => {
            let keyword = VIGENERE_KEYWORDS
                .choose(rng)
                .copied()
                .unwrap_or(VIGENERE_KEYWORDS[0]);
            vigenere_encrypt(plaintext, keyword)
        }
        CipherScheme::Substitution => substitution_encrypt(plaintext, rng),
        CipherScheme::Transposition => {
            let cols = rng.gen_range(3..=6);
            transposition_encrypt(plaintext, cols)
        }
        CipherScheme::Modern => modern_encrypt(plaintext, rng),
    }
}

/// Vigenère encryption: uppercase letters shifted by the repeating keyword.
///
/// The keyword position advances with the absolute character index, so
/// non-alphabetic characters (passed through unchanged) still consume a
/// keyword letter.
pub fn vigenere_encrypt(plaintext: &str, keyword: &str) -> String {
    let key: Vec<u8> = keyword
        .bytes()
        .map(|b| b.to_ascii_uppercase() - b'A')
        .collect();
    debug_assert!(!key.is_empty(), "vigenere keyword must be non-empty");

    plaintext
        .to_uppercase()
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if c.is_ascii_uppercase() {
                let shift = key[i % key.len()];
                (((c as u8 - b'A' + shift) % 26) + b'A') as char
            } else {
                c
            }
        })
        .collect()
}

/// Monoalphabetic substitution under a freshly drawn uniform bijection of A-Z
pub fn substitution_encrypt<R: Rng>(plaintext: &str, rng: &mut R) -> String {
    let mut mapping: Vec<u8> = (b'A'..=b'Z').collect();
    mapping.shuffle(rng);

    plaintext
        .to_uppercase()
        .chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                mapping[(c as u8 - b'A') as usize] as char
            } else {
                c
            }
        })
        .collect()
}

/// Columnar transposition: spaces stripped, rows of `cols` characters, read
/// out column by column. Missing cells in the short trailing row are skipped.
pub fn transposition_encrypt(plaintext: &str, cols: usize) -> String {
    debug_assert!(cols > 0, "column count must be positive");
    let stripped: Vec<char> = plaintext.chars().filter(|&c| c != ' ').collect();

    let mut out = String::with_capacity(stripped.len());
    for col in 0..cols {
        for row in stripped.chunks(cols) {
            if col < row.len() {
                out.push(row[col]);
            }
        }
    }
    out
}

/// Modern block-cipher encoding: PKCS#7 pad, AES-128 under a fresh random
/// key with each block encrypted independently, then base64.
pub fn modern_encrypt<R: Rng>(plaintext: &str, rng: &mut R) -> String {
    let mut key = [0u8; BLOCK_SIZE];
    rng.fill(&mut key[..]);
    let cipher = Aes128::new(GenericArray::from_slice(&key));

    let mut data = plaintext.as_bytes().to_vec();
    let pad = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    data.resize(data.len() + pad, pad as u8);

    for block in data.chunks_mut(BLOCK_SIZE) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }
    BASE64.encode(&data)
}
