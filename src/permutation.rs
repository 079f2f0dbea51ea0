//! Permutation: a bijection over alphabet indices in cycle notation.
//!
//! A permutation is written as parenthesized groups of characters such as
//! `(BACD) (EF)`, each group a closed orbit: every character maps to the
//! one after it, and the last wraps to the first. Characters left out of
//! every group are fixed points. Whitespace is ignored.

use std::fmt;
use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;

/// A permutation of the indices of an [`Alphabet`].
///
/// The explicitly written cycles are kept as parsed; forward and inverse
/// lookup tables are derived from them once at construction so that
/// [`permute`](Self::permute) and [`invert`](Self::invert) are O(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    alphabet: Arc<Alphabet>,
    cycles: Vec<Vec<usize>>,
    forward: Vec<usize>,
    backward: Vec<usize>,
}

impl Permutation {
    /// Parses `cycles` as cycle notation over `alphabet`.
    ///
    /// # Errors
    /// - [`EnigmaError::MalformedCycles`] for unbalanced or nested
    ///   parentheses, text outside a cycle, or an empty cycle.
    /// - [`EnigmaError::CharacterNotInAlphabet`] for a cycle character
    ///   outside `alphabet`.
    /// - [`EnigmaError::RepeatedCycleChar`] if a character appears twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use enigma::{Alphabet, Permutation};
    ///
    /// let alpha = Arc::new(Alphabet::new("ABCDEF").unwrap());
    /// let perm = Permutation::new("(BACD) (EF)", &alpha).unwrap();
    /// assert_eq!(perm.permute_char('B').unwrap(), 'A');
    /// assert_eq!(perm.invert_char('B').unwrap(), 'D');
    /// assert!(perm.derangement());
    /// ```
    pub fn new(cycles: &str, alphabet: &Arc<Alphabet>) -> Result<Self, EnigmaError> {
        let parsed = parse_cycles(cycles, alphabet)?;
        let size = alphabet.size();
        let mut forward: Vec<usize> = (0..size).collect();
        let mut backward: Vec<usize> = (0..size).collect();
        for cycle in &parsed {
            let len = cycle.len();
            for (j, &from) in cycle.iter().enumerate() {
                let to = cycle[(j + 1) % len];
                forward[from] = to;
                backward[to] = from;
            }
        }
        Ok(Permutation {
            alphabet: Arc::clone(alphabet),
            cycles: parsed,
            forward,
            backward,
        })
    }

    /// The identity permutation over `alphabet` (no cycles).
    pub fn identity(alphabet: &Arc<Alphabet>) -> Self {
        let size = alphabet.size();
        Permutation {
            alphabet: Arc::clone(alphabet),
            cycles: Vec::new(),
            forward: (0..size).collect(),
            backward: (0..size).collect(),
        }
    }

    /// Returns the alphabet this permutation is bound to.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Returns the size of the alphabet permuted.
    pub fn size(&self) -> usize {
        self.alphabet.size()
    }

    /// Returns the explicitly written cycles, as alphabet indices.
    pub fn cycles(&self) -> &[Vec<usize>] {
        &self.cycles
    }

    /// Maps `index` to the index of the next character in its cycle.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `index >= size()`.
    pub fn permute(&self, index: usize) -> Result<usize, EnigmaError> {
        self.forward
            .get(index)
            .copied()
            .ok_or(EnigmaError::IndexOutOfRange {
                index,
                size: self.size(),
            })
    }

    /// Maps `index` to the index of the previous character in its cycle.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `index >= size()`.
    pub fn invert(&self, index: usize) -> Result<usize, EnigmaError> {
        self.backward
            .get(index)
            .copied()
            .ok_or(EnigmaError::IndexOutOfRange {
                index,
                size: self.size(),
            })
    }

    /// Character form of [`permute`](Self::permute).
    pub fn permute_char(&self, c: char) -> Result<char, EnigmaError> {
        let index = self.alphabet.to_int(c)?;
        self.alphabet.to_char(self.permute(index)?)
    }

    /// Character form of [`invert`](Self::invert).
    pub fn invert_char(&self, c: char) -> Result<char, EnigmaError> {
        let index = self.alphabet.to_int(c)?;
        self.alphabet.to_char(self.invert(index)?)
    }

    /// Returns true unless some written cycle has length exactly 1.
    ///
    /// Characters omitted from every cycle are fixed points too, but they
    /// are not considered here: only explicit one-character cycles count.
    pub fn derangement(&self) -> bool {
        self.cycles.iter().all(|cycle| cycle.len() != 1)
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cycle) in self.cycles.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "(")?;
            for &index in cycle {
                let c = self.alphabet.to_char(index).map_err(|_| fmt::Error)?;
                write!(f, "{}", c)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Splits cycle notation into cycles of alphabet indices.
fn parse_cycles(text: &str, alphabet: &Alphabet) -> Result<Vec<Vec<usize>>, EnigmaError> {
    let mut cycles = Vec::new();
    let mut seen = vec![false; alphabet.size()];
    let mut current: Option<Vec<usize>> = None;

    for c in text.chars().filter(|c| !c.is_whitespace()) {
        match (c, current.as_mut()) {
            ('(', None) => current = Some(Vec::new()),
            ('(', Some(_)) => {
                return Err(EnigmaError::MalformedCycles(format!(
                    "nested '(' in {:?}",
                    text
                )))
            }
            (')', None) => {
                return Err(EnigmaError::MalformedCycles(format!(
                    "unmatched ')' in {:?}",
                    text
                )))
            }
            (')', Some(cycle)) => {
                if cycle.is_empty() {
                    return Err(EnigmaError::MalformedCycles(format!(
                        "empty cycle in {:?}",
                        text
                    )));
                }
                cycles.push(std::mem::take(cycle));
                current = None;
            }
            (_, None) => {
                return Err(EnigmaError::MalformedCycles(format!(
                    "character {:?} outside of a cycle in {:?}",
                    c, text
                )))
            }
            (_, Some(cycle)) => {
                let index = alphabet.to_int(c)?;
                if seen[index] {
                    return Err(EnigmaError::RepeatedCycleChar(c));
                }
                seen[index] = true;
                cycle.push(index);
            }
        }
    }

    if current.is_some() {
        return Err(EnigmaError::MalformedCycles(format!(
            "unclosed cycle in {:?}",
            text
        )));
    }
    Ok(cycles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    fn alpha(chars: &str) -> Arc<Alphabet> {
        Arc::new(Alphabet::new(chars).unwrap())
    }

    /// Checks that `perm` maps `from[i]` to `to[i]` for every position.
    fn check_perm(perm: &Permutation, from: &str, to: &str) {
        let alphabet = perm.alphabet().clone();
        for (c, e) in from.chars().zip(to.chars()) {
            let ci = alphabet.to_int(c).unwrap();
            let ei = alphabet.to_int(e).unwrap();
            assert_eq!(perm.permute_char(c).unwrap(), e, "wrong translation of '{}'", c);
            assert_eq!(perm.invert_char(e).unwrap(), c, "wrong inverse of '{}'", e);
            assert_eq!(perm.permute(ci).unwrap(), ei);
            assert_eq!(perm.invert(ei).unwrap(), ci);
        }
    }

    #[test]
    fn test_identity() {
        let a = alpha(UPPER);
        let perm = Permutation::new("", &a).unwrap();
        check_perm(&perm, UPPER, UPPER);
        assert_eq!(perm, Permutation::identity(&a));
    }

    #[test]
    fn test_small_cycle() {
        let perm = Permutation::new("(BACD)", &alpha("ABCD")).unwrap();
        check_perm(&perm, "ABCD", "CADB");
    }

    #[test]
    fn test_rotor_i() {
        let perm = Permutation::new(
            "(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)",
            &alpha(UPPER),
        )
        .unwrap();
        check_perm(&perm, UPPER, "EKMFLGDQVZNTOWYHXUSPAIBRCJ");
        assert!(!perm.derangement());
    }

    #[test]
    fn test_whitespace_insignificant() {
        let a = alpha("ABCDEF");
        let spaced = Permutation::new("  ( A B ) (C\tD) ", &a).unwrap();
        let tight = Permutation::new("(AB)(CD)", &a).unwrap();
        assert_eq!(spaced, tight);
        assert_eq!(tight.to_string(), "(AB) (CD)");
    }

    #[test]
    fn test_absent_characters_are_fixed() {
        let perm = Permutation::new("(AB)", &alpha("ABCDE")).unwrap();
        check_perm(&perm, "ABCDE", "BACDE");
    }

    #[test]
    fn test_derangement() {
        let a = alpha("ABCDEF");
        assert!(Permutation::new("(ABCD)(EF)", &a).unwrap().derangement());
        assert!(!Permutation::new("(ABCD)(E)", &a).unwrap().derangement());
    }

    #[test]
    fn test_derangement_ignores_implicit_fixed_points() {
        let a = alpha("ABCDEF");
        let perm = Permutation::new("(ABCD)", &a).unwrap();
        assert_eq!(perm.permute(4).unwrap(), 4);
        assert!(perm.derangement());
    }

    #[test]
    fn test_out_of_range_index() {
        let perm = Permutation::new("(AB)", &alpha("ABC")).unwrap();
        assert_eq!(
            perm.permute(3),
            Err(EnigmaError::IndexOutOfRange { index: 3, size: 3 })
        );
        assert_eq!(
            perm.invert(9),
            Err(EnigmaError::IndexOutOfRange { index: 9, size: 3 })
        );
    }

    #[test]
    fn test_malformed_cycles() {
        let a = alpha("ABCD");
        for bad in ["(AB", "AB)", "((AB))", "(AB) C", "()", "(A)(B"] {
            assert!(
                matches!(
                    Permutation::new(bad, &a),
                    Err(EnigmaError::MalformedCycles(_))
                ),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_character_outside_alphabet() {
        assert_eq!(
            Permutation::new("(AZ)", &alpha("ABCD")),
            Err(EnigmaError::CharacterNotInAlphabet('Z'))
        );
    }

    #[test]
    fn test_repeated_character() {
        assert_eq!(
            Permutation::new("(AB) (BC)", &alpha("ABCD")),
            Err(EnigmaError::RepeatedCycleChar('B'))
        );
    }
}
