//! Rotors and the rotor pool.
//!
//! A [`Rotor`] wraps a [`Permutation`] with a rotational setting and an
//! optional ring offset. Its capabilities (rotation, reflection, notches)
//! depend on its [`RotorKind`].
//!
//! Rotors live in a [`RotorPool`] and are referenced by [`RotorId`].
//! Machine slots hold ids into the pool rather than copies, so the
//! settings mutated during conversion are the pool's own state.

use std::fmt;
use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::permutation::Permutation;

/// Index of a rotor within a [`RotorPool`].
///
/// Ids are only issued by [`RotorPool::add`] and [`RotorPool::find`]:
///
/// ```compile_fail
/// let id = enigma::RotorId(99);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RotorId(pub(crate) usize);

/// Rotation and reflection capability of a rotor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorKind {
    /// Non-rotating rotor that folds the signal back through the stack.
    Reflector,
    /// Non-rotating rotor with no notches.
    Fixed,
    /// Ratchet-driven rotor. `notches` holds the alphabet characters at
    /// which the rotor lets its left neighbour advance.
    Moving { notches: String },
}

impl RotorKind {
    /// Parses a type tag: `M<notches>`, `N` or `R`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::InvalidRotorType`] if the tag is empty or
    /// starts with another letter.
    pub fn from_tag(tag: &str) -> Result<Self, EnigmaError> {
        let mut chars = tag.chars();
        match chars.next() {
            Some('M') => Ok(RotorKind::Moving {
                notches: chars.as_str().to_string(),
            }),
            Some('N') => Ok(RotorKind::Fixed),
            Some('R') => Ok(RotorKind::Reflector),
            _ => Err(EnigmaError::InvalidRotorType(tag.to_string())),
        }
    }
}

/// A single rotor: a permutation plus a mutable rotational offset.
#[derive(Debug, Clone)]
pub struct Rotor {
    name: String,
    kind: RotorKind,
    permutation: Permutation,
    setting: usize,
    ring: Option<usize>,
}

impl Rotor {
    /// Creates a rotor named `name` at setting 0 with no ring.
    ///
    /// # Errors
    /// Returns [`EnigmaError::CharacterNotInAlphabet`] if a notch of a
    /// moving rotor is not in the permutation's alphabet.
    pub fn new(
        name: impl Into<String>,
        kind: RotorKind,
        permutation: Permutation,
    ) -> Result<Self, EnigmaError> {
        if let RotorKind::Moving { notches } = &kind {
            for c in notches.chars() {
                permutation.alphabet().to_int(c)?;
            }
        }
        Ok(Rotor {
            name: name.into(),
            kind,
            permutation,
            setting: 0,
            ring: None,
        })
    }

    /// Shorthand for a [`RotorKind::Moving`] rotor.
    pub fn moving(
        name: impl Into<String>,
        permutation: Permutation,
        notches: &str,
    ) -> Result<Self, EnigmaError> {
        Self::new(
            name,
            RotorKind::Moving {
                notches: notches.to_string(),
            },
            permutation,
        )
    }

    /// Shorthand for a [`RotorKind::Fixed`] rotor.
    pub fn fixed(name: impl Into<String>, permutation: Permutation) -> Self {
        Rotor {
            name: name.into(),
            kind: RotorKind::Fixed,
            permutation,
            setting: 0,
            ring: None,
        }
    }

    /// Shorthand for a [`RotorKind::Reflector`].
    pub fn reflector(name: impl Into<String>, permutation: Permutation) -> Self {
        Rotor {
            name: name.into(),
            kind: RotorKind::Reflector,
            permutation,
            setting: 0,
            ring: None,
        }
    }

    /// Builds a rotor from its configuration descriptor: name, type tag
    /// and cycle notation.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use enigma::{Alphabet, Rotor};
    ///
    /// let alpha = Arc::new(Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZ").unwrap());
    /// let rotor = Rotor::from_descriptor("I", "MQ", "(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)", &alpha).unwrap();
    /// assert!(rotor.rotates());
    /// assert_eq!(rotor.notches(), "Q");
    /// ```
    pub fn from_descriptor(
        name: &str,
        tag: &str,
        cycles: &str,
        alphabet: &Arc<Alphabet>,
    ) -> Result<Self, EnigmaError> {
        let kind = RotorKind::from_tag(tag)?;
        let permutation = Permutation::new(cycles, alphabet)?;
        Self::new(name, kind, permutation)
    }

    /// Returns the rotor's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rotor's capability kind.
    pub fn kind(&self) -> &RotorKind {
        &self.kind
    }

    /// Returns the alphabet the rotor is wired over.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        self.permutation.alphabet()
    }

    /// Returns the rotor's wiring.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// Returns the alphabet size.
    pub fn size(&self) -> usize {
        self.permutation.size()
    }

    /// Returns true iff the rotor has a ratchet and can move.
    pub fn rotates(&self) -> bool {
        matches!(self.kind, RotorKind::Moving { .. })
    }

    /// Returns true iff the rotor reflects.
    pub fn reflecting(&self) -> bool {
        matches!(self.kind, RotorKind::Reflector)
    }

    /// Returns the notch characters; empty for non-moving rotors.
    pub fn notches(&self) -> &str {
        match &self.kind {
            RotorKind::Moving { notches } => notches,
            RotorKind::Reflector | RotorKind::Fixed => "",
        }
    }

    /// Returns true iff the character at the current setting is a notch.
    pub fn at_notch(&self) -> bool {
        let alphabet = self.alphabet();
        self.notches()
            .chars()
            .any(|c| alphabet.to_int(c).is_ok_and(|n| n == self.setting))
    }

    /// Advances one position if the rotor moves; no-op otherwise.
    pub fn advance(&mut self) {
        if self.rotates() {
            self.setting = (self.setting + 1) % self.size();
        }
    }

    /// Current rotational setting.
    pub fn setting(&self) -> usize {
        self.setting
    }

    /// Current ring offset, if one was set.
    pub fn ring(&self) -> Option<usize> {
        self.ring
    }

    /// Sets the rotational setting to `posn`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `posn >= size()`.
    pub fn set(&mut self, posn: usize) -> Result<(), EnigmaError> {
        if posn >= self.size() {
            return Err(EnigmaError::IndexOutOfRange {
                index: posn,
                size: self.size(),
            });
        }
        self.setting = posn;
        Ok(())
    }

    /// Sets the rotational setting to the index of `c`.
    pub fn set_char(&mut self, c: char) -> Result<(), EnigmaError> {
        let posn = self.alphabet().to_int(c)?;
        self.set(posn)
    }

    /// Sets the ring offset to the index of `c`.
    pub fn set_ring(&mut self, c: char) -> Result<(), EnigmaError> {
        self.ring = Some(self.alphabet().to_int(c)?);
        Ok(())
    }

    /// Removes the ring offset.
    pub fn clear_ring(&mut self) {
        self.ring = None;
    }

    /// Converts `p` through the permutation, right to left.
    ///
    /// Computes `permute(p + setting - ring) - setting + ring` modulo the
    /// alphabet size, with `ring` taken as 0 when unset.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `p >= size()`.
    pub fn convert_forward(&self, p: usize) -> Result<usize, EnigmaError> {
        self.convert_with(p, |i| self.permutation.permute(i))
    }

    /// Converts `e` through the inverse permutation, left to right.
    ///
    /// # Errors
    /// Returns [`EnigmaError::IndexOutOfRange`] if `e >= size()`.
    pub fn convert_backward(&self, e: usize) -> Result<usize, EnigmaError> {
        self.convert_with(e, |i| self.permutation.invert(i))
    }

    fn convert_with<F>(&self, p: usize, map: F) -> Result<usize, EnigmaError>
    where
        F: Fn(usize) -> Result<usize, EnigmaError>,
    {
        if p >= self.size() {
            return Err(EnigmaError::IndexOutOfRange {
                index: p,
                size: self.size(),
            });
        }
        let alphabet = self.alphabet();
        let offset = self.setting as i64 - self.ring.unwrap_or(0) as i64;
        let result = map(alphabet.wrap(p as i64 + offset))?;
        Ok(alphabet.wrap(result as i64 - offset))
    }
}

impl fmt::Display for Rotor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rotor {}", self.name)
    }
}

/// Arena owning every configured rotor, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct RotorPool {
    rotors: Vec<Rotor>,
}

impl RotorPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        RotorPool { rotors: Vec::new() }
    }

    /// Adds `rotor` to the pool.
    ///
    /// # Errors
    /// Returns [`EnigmaError::DuplicateRotorName`] if a rotor with the
    /// same name is already present.
    pub fn add(&mut self, rotor: Rotor) -> Result<RotorId, EnigmaError> {
        if self.find(rotor.name()).is_some() {
            return Err(EnigmaError::DuplicateRotorName(rotor.name().to_string()));
        }
        let id = RotorId(self.rotors.len());
        self.rotors.push(rotor);
        Ok(id)
    }

    /// Returns the id of the rotor named `name`, if any.
    pub fn find(&self, name: &str) -> Option<RotorId> {
        self.rotors
            .iter()
            .position(|r| r.name() == name)
            .map(RotorId)
    }

    /// Returns the rotor with the given id.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this pool.
    pub fn get(&self, id: RotorId) -> &Rotor {
        &self.rotors[id.0]
    }

    /// Mutable form of [`get`](Self::get).
    pub fn get_mut(&mut self, id: RotorId) -> &mut Rotor {
        &mut self.rotors[id.0]
    }

    /// Returns the number of rotors in the pool.
    pub fn len(&self) -> usize {
        self.rotors.len()
    }

    /// Returns true if the pool holds no rotors.
    pub fn is_empty(&self) -> bool {
        self.rotors.is_empty()
    }

    /// Iterates over the rotors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Rotor> {
        self.rotors.iter()
    }
}
