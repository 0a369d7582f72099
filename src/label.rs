//! Letter labels produced by the classifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the 26 fingerspelled letters, or the blank (no sign) sentinel.
///
/// Variant order is the canonical label order: `Blank` first, then `A`..`Z`.
/// This matches the primary model's output layout and is the tie-break order
/// when two labels share the top score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterLabel {
    #[serde(rename = "blank")]
    Blank,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
}

use LetterLabel::*;

impl LetterLabel {
    /// All 27 labels in canonical order.
    pub const ALL: [LetterLabel; 27] = [
        Blank, A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    ];

    /// The 26 letters, without `Blank`.
    pub const LETTERS: [LetterLabel; 26] = [
        A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    ];

    /// Position in canonical order (`Blank` = 0, `A` = 1, ..., `Z` = 26).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label at a canonical index, if in range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Letter label for an ASCII character, case-insensitive.
    pub fn from_char(c: char) -> Option<Self> {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let offset = (c.to_ascii_uppercase() as u8 - b'A') as usize;
        Self::LETTERS.get(offset).copied()
    }

    pub fn is_blank(self) -> bool {
        self == Blank
    }

    /// The letter as a `char`; `None` for `Blank`.
    pub fn as_char(self) -> Option<char> {
        match self {
            Blank => None,
            letter => Some((b'A' + (letter.index() - 1) as u8) as char),
        }
    }

    pub fn as_str(self) -> &'static str {
        const NAMES: [&str; 27] = [
            "blank", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O",
            "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
        ];
        NAMES[self.index()]
    }
}

impl fmt::Display for LetterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLabelError(pub String);

impl fmt::Display for ParseLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown label '{}' (expected A-Z or 'blank')", self.0)
    }
}

impl std::error::Error for ParseLabelError {}

impl FromStr for LetterLabel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("blank") {
            return Ok(Blank);
        }
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c).ok_or_else(|| ParseLabelError(s.to_string())),
            _ => Err(ParseLabelError(s.to_string())),
        }
    }
}

/// Concatenate letters into a word, skipping any `Blank`.
pub fn spell(letters: &[LetterLabel]) -> String {
    letters.iter().filter_map(|l| l.as_char()).collect()
}
