//! Alphabet: bidirectional mapping between characters and dense indices.

use std::collections::HashMap;
use std::fmt;

use crate::error::EnigmaError;

/// Characters that cannot appear in an alphabet because the cycle and
/// settings notations reserve them.
const RESERVED: [char; 3] = ['(', ')', '*'];

/// An ordered set of distinct characters indexed `0..size()`.
///
/// Immutable after construction. Machines, rotors and permutations share
/// one alphabet through an `Arc`.
#[derive(Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
    index: HashMap<char, usize>,
}

impl Alphabet {
    /// Builds an alphabet from the characters of `chars`, in order.
    ///
    /// # Errors
    /// - [`EnigmaError::InvalidAlphabet`] if `chars` is empty or contains
    ///   whitespace, `(`, `)` or `*`.
    /// - [`EnigmaError::DuplicateAlphabetChar`] if a character repeats.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::Alphabet;
    ///
    /// let alpha = Alphabet::new("ABCD").unwrap();
    /// assert_eq!(alpha.size(), 4);
    /// assert_eq!(alpha.to_int('C').unwrap(), 2);
    /// assert!(Alphabet::new("ABA").is_err());
    /// ```
    pub fn new(chars: &str) -> Result<Self, EnigmaError> {
        if chars.is_empty() {
            return Err(EnigmaError::InvalidAlphabet(
                "alphabet must not be empty".to_string(),
            ));
        }
        let mut list = Vec::with_capacity(chars.len());
        let mut index = HashMap::with_capacity(chars.len());
        for c in chars.chars() {
            if c.is_whitespace() || RESERVED.contains(&c) {
                return Err(EnigmaError::InvalidAlphabet(format!(
                    "character {:?} is not allowed",
                    c
                )));
            }
            if index.insert(c, list.len()).is_some() {
                return Err(EnigmaError::DuplicateAlphabetChar(c));
            }
            list.push(c);
        }
        Ok(Alphabet { chars: list, index })
    }

    /// Returns the number of characters.
    pub fn size(&self) -> usize {
        self.chars.len()
    }

    /// Returns true iff `c` is in the alphabet.
    pub fn contains(&self, c: char) -> bool {
        self.index.contains_key(&c)
    }

    /// Returns the character at `index`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `index >= size()`.
    pub fn to_char(&self, index: usize) -> Result<char, EnigmaError> {
        self.chars
            .get(index)
            .copied()
            .ok_or(EnigmaError::IndexOutOfRange {
                index,
                size: self.size(),
            })
    }

    /// Returns the index of `c`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::CharacterNotInAlphabet`] if `c` is absent.
    pub fn to_int(&self, c: char) -> Result<usize, EnigmaError> {
        self.index
            .get(&c)
            .copied()
            .ok_or(EnigmaError::CharacterNotInAlphabet(c))
    }

    /// Iterates the characters in index order.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }

    /// Reduces any signed offset modulo `size()` to a valid index.
    pub(crate) fn wrap(&self, p: i64) -> usize {
        p.rem_euclid(self.size() as i64) as usize
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Alphabet({})", self)
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
