//! Machine: rotor stack, plugboard, stepping and the conversion pipeline.
//!
//! Each character goes through:
//!
//! ```text
//! step rotors → plugboard → slots n-1..0 forward → slots 1..n-1 backward → plugboard
//! ```
//!
//! Stepping runs once before every character, including the first, so a
//! machine is a stateful session: the same input converted twice in a row
//! gives different output. Replaying a message requires re-applying the
//! same initial settings first.

use std::sync::Arc;

use tracing::debug;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::permutation::Permutation;
use crate::rotor::{Rotor, RotorId, RotorPool};
use crate::trace::{NoTrace, Pass, TraceEvent, TraceSink};

/// A rotor cipher machine.
///
/// Slot 0 holds the reflector; slot `num_rotors() - 1` holds the fastest
/// rotor. Slots are ids into the machine's own [`RotorPool`].
#[derive(Debug, Clone)]
pub struct Machine {
    alphabet: Arc<Alphabet>,
    num_rotors: usize,
    pawls: usize,
    pool: RotorPool,
    slots: Vec<RotorId>,
    plugboard: Permutation,
}

impl Machine {
    /// Creates a machine with `num_rotors` slots and `pawls` pawls over
    /// `alphabet`, owning every rotor in `rotors`.
    ///
    /// No rotors are bound and the plugboard is the identity until
    /// [`insert_rotors`](Self::insert_rotors) and
    /// [`set_plugboard`](Self::set_plugboard) are called.
    ///
    /// # Errors
    /// - [`EnigmaError::InvalidRotorCount`] if `num_rotors < 2`.
    /// - [`EnigmaError::InvalidPawlCount`] unless `0 < pawls < num_rotors`.
    /// - [`EnigmaError::AlphabetMismatch`] if a rotor uses another alphabet.
    /// - [`EnigmaError::DuplicateRotorName`] if two rotors share a name.
    pub fn new<I>(
        alphabet: Arc<Alphabet>,
        num_rotors: usize,
        pawls: usize,
        rotors: I,
    ) -> Result<Self, EnigmaError>
    where
        I: IntoIterator<Item = Rotor>,
    {
        if num_rotors < 2 {
            return Err(EnigmaError::InvalidRotorCount(num_rotors));
        }
        if pawls == 0 || pawls >= num_rotors {
            return Err(EnigmaError::InvalidPawlCount { pawls, num_rotors });
        }
        let mut pool = RotorPool::new();
        for rotor in rotors {
            if **rotor.alphabet() != *alphabet {
                return Err(EnigmaError::AlphabetMismatch(rotor.name().to_string()));
            }
            pool.add(rotor)?;
        }
        debug!(
            num_rotors,
            pawls,
            available = pool.len(),
            "machine configured"
        );
        let plugboard = Permutation::identity(&alphabet);
        Ok(Machine {
            alphabet,
            num_rotors,
            pawls,
            pool,
            slots: Vec::with_capacity(num_rotors),
            plugboard,
        })
    }

    /// Returns the machine alphabet.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Number of rotor slots.
    pub fn num_rotors(&self) -> usize {
        self.num_rotors
    }

    /// Number of pawls.
    pub fn num_pawls(&self) -> usize {
        self.pawls
    }

    /// Every rotor available to this machine.
    pub fn pool(&self) -> &RotorPool {
        &self.pool
    }

    /// Returns the rotor bound at `slot`, or `None` if the slot is unbound
    /// or out of range.
    pub fn get_rotor(&self, slot: usize) -> Option<&Rotor> {
        self.slots.get(slot).map(|&id| self.pool.get(id))
    }

    /// Current settings of slots 1.., rendered as alphabet characters.
    pub fn positions(&self) -> String {
        self.slots
            .iter()
            .skip(1)
            .filter_map(|&id| self.alphabet.to_char(self.pool.get(id).setting()).ok())
            .collect()
    }

    /// Binds the rotors named `names` to the slots, `names[0]` being the
    /// reflector.
    ///
    /// Nothing is rebound unless every name resolves.
    ///
    /// # Errors
    /// - [`EnigmaError::WrongSlotCount`] if `names.len() != num_rotors()`.
    /// - [`EnigmaError::UnmatchedRotor`] if a name is not in the pool.
    /// - [`EnigmaError::DuplicateRotor`] if a name is given twice.
    /// - [`EnigmaError::MissingReflector`] if `names[0]` does not reflect.
    pub fn insert_rotors<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), EnigmaError> {
        if names.len() != self.num_rotors {
            return Err(EnigmaError::WrongSlotCount {
                expected: self.num_rotors,
                found: names.len(),
            });
        }
        let mut slots = Vec::with_capacity(self.num_rotors);
        for name in names {
            let name = name.as_ref();
            let id = self
                .pool
                .find(name)
                .ok_or_else(|| EnigmaError::UnmatchedRotor(name.to_string()))?;
            if slots.contains(&id) {
                return Err(EnigmaError::DuplicateRotor(name.to_string()));
            }
            slots.push(id);
        }
        let reflector = self.pool.get(slots[0]);
        if !reflector.reflecting() {
            return Err(EnigmaError::MissingReflector(reflector.name().to_string()));
        }
        debug!(
            rotors = ?names.iter().map(|n| n.as_ref()).collect::<Vec<_>>(),
            "rotors inserted"
        );
        self.slots = slots;
        Ok(())
    }

    /// Sets slots 1.. from `setting`, one character per slot, leftmost
    /// first. The reflector is never set.
    ///
    /// # Errors
    /// - [`EnigmaError::NoRotorsBound`] if no rotors are inserted.
    /// - [`EnigmaError::SettingLength`] unless `setting` has
    ///   `num_rotors() - 1` characters.
    /// - [`EnigmaError::CharacterNotInAlphabet`] for a foreign character.
    pub fn set_rotors(&mut self, setting: &str) -> Result<(), EnigmaError> {
        self.check_slot_string(setting, |expected, found| EnigmaError::SettingLength {
            expected,
            found,
        })?;
        for (&id, c) in self.slots[1..].iter().zip(setting.chars()) {
            self.pool.get_mut(id).set_char(c)?;
        }
        Ok(())
    }

    /// Sets the ring offset of slots 1.. from `ring`, one character per
    /// slot, leftmost first.
    ///
    /// # Errors
    /// Same as [`set_rotors`](Self::set_rotors), reporting
    /// [`EnigmaError::RingLength`] for a length mismatch.
    pub fn insert_ring(&mut self, ring: &str) -> Result<(), EnigmaError> {
        self.check_slot_string(ring, |expected, found| EnigmaError::RingLength {
            expected,
            found,
        })?;
        for (&id, c) in self.slots[1..].iter().zip(ring.chars()) {
            self.pool.get_mut(id).set_ring(c)?;
        }
        Ok(())
    }

    /// Removes the ring offset from every bound rotor.
    pub fn clear_rings(&mut self) {
        for &id in &self.slots {
            self.pool.get_mut(id).clear_ring();
        }
    }

    /// Returns the current plugboard.
    pub fn plugboard(&self) -> &Permutation {
        &self.plugboard
    }

    /// Installs `plugboard`, applied before and after the rotor stack.
    ///
    /// # Errors
    /// Returns [`EnigmaError::AlphabetMismatch`] if `plugboard` uses
    /// another alphabet.
    pub fn set_plugboard(&mut self, plugboard: Permutation) -> Result<(), EnigmaError> {
        if **plugboard.alphabet() != *self.alphabet {
            return Err(EnigmaError::AlphabetMismatch("plugboard".to_string()));
        }
        self.plugboard = plugboard;
        Ok(())
    }

    /// Steps the rotors once.
    ///
    /// The rightmost rotor always advances. Every rotor at a notch whose
    /// left neighbour rotates advances together with that neighbour. All
    /// notch checks see the settings from before the step.
    ///
    /// # Errors
    /// Returns [`EnigmaError::NoRotorsBound`] if no rotors are inserted.
    pub fn advance_rotors(&mut self) -> Result<(), EnigmaError> {
        if self.slots.is_empty() {
            return Err(EnigmaError::NoRotorsBound);
        }
        let last = self.slots.len() - 1;
        let mut marked = vec![false; self.slots.len()];
        marked[last] = true;
        for i in (1..=last).rev() {
            let rotor = self.pool.get(self.slots[i]);
            let left = self.pool.get(self.slots[i - 1]);
            if rotor.at_notch() && left.rotates() {
                marked[i] = true;
                marked[i - 1] = true;
            }
        }
        for (slot, &id) in self.slots.iter().enumerate() {
            if marked[slot] {
                self.pool.get_mut(id).advance();
            }
        }
        Ok(())
    }

    /// Converts the character index `c`, stepping the rotors first.
    ///
    /// # Errors
    /// - [`EnigmaError::IndexOutOfRange`] if `c` is not an alphabet index.
    /// - [`EnigmaError::NoRotorsBound`] if no rotors are inserted.
    pub fn convert(&mut self, c: usize) -> Result<usize, EnigmaError> {
        self.convert_with(c, &mut NoTrace)
    }

    /// [`convert`](Self::convert), reporting each stage to `sink`.
    pub fn convert_with<S>(&mut self, c: usize, sink: &mut S) -> Result<usize, EnigmaError>
    where
        S: TraceSink + ?Sized,
    {
        if c >= self.alphabet.size() {
            return Err(EnigmaError::IndexOutOfRange {
                index: c,
                size: self.alphabet.size(),
            });
        }
        self.advance_rotors()?;
        let tracing = sink.enabled();
        if tracing {
            let settings: Vec<usize> = self.slots[1..]
                .iter()
                .map(|&id| self.pool.get(id).setting())
                .collect();
            sink.record(TraceEvent::Stepped {
                settings: &settings,
            });
            sink.record(TraceEvent::Input(c));
        }

        let mut c = self.plugboard.permute(c)?;
        if tracing {
            sink.record(TraceEvent::Plugboard(c));
        }
        for (slot, &id) in self.slots.iter().enumerate().rev() {
            c = self.pool.get(id).convert_forward(c)?;
            if tracing {
                sink.record(TraceEvent::Rotor {
                    slot,
                    pass: Pass::Forward,
                    output: c,
                });
            }
        }
        for (slot, &id) in self.slots.iter().enumerate().skip(1) {
            c = self.pool.get(id).convert_backward(c)?;
            if tracing {
                sink.record(TraceEvent::Rotor {
                    slot,
                    pass: Pass::Backward,
                    output: c,
                });
            }
        }
        let c = self.plugboard.permute(c)?;
        if tracing {
            sink.record(TraceEvent::Output(c));
        }
        Ok(c)
    }

    /// Converts a whole message, dropping spaces and advancing the rotors
    /// once per remaining character.
    ///
    /// Every character is checked before any rotor moves.
    ///
    /// # Errors
    /// - [`EnigmaError::CharacterNotInAlphabet`] for a foreign character.
    /// - [`EnigmaError::NoRotorsBound`] if no rotors are inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::config::MachineConfig;
    ///
    /// let config = MachineConfig::parse(
    ///     "ABCDEFGHIJKLMNOPQRSTUVWXYZ 3 2
    ///      I MQ (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
    ///      II ME (FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q)
    ///      B R (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)",
    /// )
    /// .unwrap();
    /// let mut machine = config.build().unwrap();
    ///
    /// machine.insert_rotors(&["B", "II", "I"]).unwrap();
    /// machine.set_rotors("AA").unwrap();
    /// let cipher = machine.convert_message("HELLO WORLD").unwrap();
    ///
    /// machine.set_rotors("AA").unwrap();
    /// assert_eq!(machine.convert_message(&cipher).unwrap(), "HELLOWORLD");
    /// ```
    pub fn convert_message(&mut self, msg: &str) -> Result<String, EnigmaError> {
        self.convert_message_with(msg, &mut NoTrace)
    }

    /// [`convert_message`](Self::convert_message), reporting each
    /// character's stages to `sink`.
    pub fn convert_message_with<S>(&mut self, msg: &str, sink: &mut S) -> Result<String, EnigmaError>
    where
        S: TraceSink + ?Sized,
    {
        let indices = msg
            .chars()
            .filter(|&c| c != ' ')
            .map(|c| self.alphabet.to_int(c))
            .collect::<Result<Vec<_>, _>>()?;
        if self.slots.is_empty() && !indices.is_empty() {
            return Err(EnigmaError::NoRotorsBound);
        }
        let mut converted = String::with_capacity(indices.len());
        for index in indices {
            let out = self.convert_with(index, sink)?;
            converted.push(self.alphabet.to_char(out)?);
        }
        Ok(converted)
    }

    /// Checks that `text` holds one alphabet character per slot 1..
    fn check_slot_string<F>(&self, text: &str, length_error: F) -> Result<(), EnigmaError>
    where
        F: FnOnce(usize, usize) -> EnigmaError,
    {
        if self.slots.is_empty() {
            return Err(EnigmaError::NoRotorsBound);
        }
        let expected = self.num_rotors - 1;
        let found = text.chars().count();
        if found != expected {
            return Err(length_error(expected, found));
        }
        for c in text.chars() {
            self.alphabet.to_int(c)?;
        }
        Ok(())
    }
}
