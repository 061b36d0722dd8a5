//! Cipher Engine — letter substitution over the fixed A–Z alphabet.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WheelError;

/// Number of letters on each ring.
pub const ALPHABET_LEN: usize = 26;

/// The fixed ring alphabet, index 0..25.
pub const ALPHABET: [char; ALPHABET_LEN] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Degrees between two neighbouring ring slots.
pub const DEGREES_PER_LETTER: f64 = 360.0 / ALPHABET_LEN as f64;

/// A position in the alphabet. Only `A`..=`Z` map to a `Letter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Letter(u8);

impl Letter {
    pub fn from_char(ch: char) -> Option<Self> {
        if ch.is_ascii_uppercase() {
            Some(Letter(ch as u8 - b'A'))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn to_char(self) -> char {
        ALPHABET[self.index()]
    }

    /// Move this letter `shift` places around the ring.
    pub fn shifted(self, shift: Shift) -> Letter {
        Letter((self.0 + shift.value()) % ALPHABET_LEN as u8)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A validated shift in `0..=25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Shift(u8);

impl Shift {
    pub const MAX: u8 = (ALPHABET_LEN - 1) as u8;

    pub fn new(value: i64) -> Result<Self, WheelError> {
        if (0..=Self::MAX as i64).contains(&value) {
            Ok(Shift(value as u8))
        } else {
            Err(WheelError::ShiftOutOfRange(value))
        }
    }

    /// Parse slider input. Surrounding whitespace is ignored; anything that is
    /// not an integer, or falls outside the range, is rejected.
    pub fn parse(raw: &str) -> Result<Self, WheelError> {
        let value: i64 = raw.trim().parse().map_err(|_| WheelError::InvalidShift {
            raw: raw.to_string(),
        })?;
        Self::new(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// The shift that undoes this one.
    pub fn inverse(self) -> Shift {
        Shift((ALPHABET_LEN as u8 - self.0) % ALPHABET_LEN as u8)
    }

    /// Outer-ring rotation for this shift, in degrees.
    pub fn rotation_degrees(self) -> f64 {
        self.0 as f64 * DEGREES_PER_LETTER
    }
}

impl Default for Shift {
    fn default() -> Self {
        Shift(4)
    }
}

impl TryFrom<i64> for Shift {
    type Error = WheelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Shift::new(value)
    }
}

impl From<Shift> for u8 {
    fn from(shift: Shift) -> u8 {
        shift.0
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encrypt a single character. Anything outside `A`..=`Z` passes through.
pub fn encrypt_letter(ch: char, shift: Shift) -> char {
    match Letter::from_char(ch) {
        Some(letter) => letter.shifted(shift).to_char(),
        None => ch,
    }
}

pub fn encrypt_text(text: &str, shift: Shift) -> String {
    text.chars().map(|ch| encrypt_letter(ch, shift)).collect()
}

pub fn decrypt_text(text: &str, shift: Shift) -> String {
    encrypt_text(text, shift.inverse())
}

/// Text-field normalization: everything is upper-cased on entry.
pub fn normalize_input(text: &str) -> String {
    text.to_uppercase()
}
