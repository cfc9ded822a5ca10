//! Lexicon configuration: the alphabet and maximum token length that
//! together define the total token vocabulary.

use crate::error::{ModelError, Result};

/// Alphabet plus maximum token length.
///
/// The alphabet is stored deduplicated, preserving first-occurrence order.
/// That order is significant: token generation enumerates symbols in it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LexiconConfig {
    alphabet: String,
    #[serde(rename = "maxLength")]
    max_length: usize,
}

impl LexiconConfig {
    /// Build a config from raw user input.
    ///
    /// Deduplicates the alphabet (first occurrence wins) and validates the
    /// invariants: non-empty alphabet, `max_length >= 1`.
    pub fn new(alphabet: &str, max_length: usize) -> Result<Self> {
        let alphabet = dedupe_alphabet(alphabet);
        if alphabet.is_empty() {
            return Err(ModelError::EmptyAlphabet);
        }
        if max_length == 0 {
            return Err(ModelError::InvalidMaxLength);
        }
        Ok(Self {
            alphabet,
            max_length,
        })
    }

    pub fn alphabet(&self) -> &str {
        &self.alphabet
    }

    /// Alphabet symbols in generation order.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.alphabet.chars()
    }

    pub fn symbol_count(&self) -> usize {
        self.alphabet.chars().count()
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for LexiconConfig {
    /// The default snapshot lexicon: binary alphabet, max length 3.
    fn default() -> Self {
        Self {
            alphabet: "01".to_string(),
            max_length: 3,
        }
    }
}

/// Remove duplicate characters, keeping the first occurrence of each.
pub fn dedupe_alphabet(raw: &str) -> String {
    let mut seen = Vec::new();
    let mut out = String::new();
    for ch in raw.chars() {
        if !seen.contains(&ch) {
            seen.push(ch);
            out.push(ch);
        }
    }
    out
}
