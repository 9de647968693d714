use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{CrackError, Result};

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Lowercase letters followed by digits.
pub const DEFAULT_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// An ordered alphabet of unique characters. Position in the charset is the
/// digit value used when enumerating candidates.
#[derive(Clone, PartialEq, Eq)]
pub struct Charset {
    chars: Vec<char>,
}

impl Charset {
    /// Build a charset from `chars`, keeping their order.
    ///
    /// Fails on an empty string or when a character appears twice: duplicates
    /// would make the enumerator hash identical candidates more than once.
    pub fn new(chars: &str) -> Result<Self> {
        if chars.is_empty() {
            return Err(CrackError::invalid("charset must not be empty"));
        }

        let mut seen = HashSet::with_capacity(chars.len());
        let mut out = Vec::with_capacity(chars.len());
        for c in chars.chars() {
            if !seen.insert(c) {
                return Err(CrackError::invalid(format!(
                    "charset contains duplicate character {c:?}"
                )));
            }
            out.push(c);
        }

        Ok(Self { chars: out })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn get(&self, digit: usize) -> Option<char> {
        self.chars.get(digit).copied()
    }

    pub fn position(&self, c: char) -> Option<usize> {
        self.chars.iter().position(|&x| x == c)
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self {
            chars: DEFAULT_CHARSET.chars().collect(),
        }
    }
}

impl FromStr for Charset {
    type Err = CrackError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Charset({:?})", self.to_string())
    }
}
