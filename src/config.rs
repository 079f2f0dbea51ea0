//! Textual configuration: machine description and settings lines.
//!
//! A machine description is a whitespace-separated token stream:
//!
//! ```text
//! ABCDEFGHIJKLMNOPQRSTUVWXYZ     alphabet
//! 5 3                            rotor slots, pawls
//! I MQ (AELTPHQXRU) (BKNW) ...   name, type tag, cycle tokens
//! B R (AE) (BN) (CK) ...
//! ```
//!
//! A settings line selects rotors and their positions for the messages
//! that follow it:
//!
//! ```text
//! * B Beta III IV I AXLE [RING] (HQ) (EX) (IP) (TR) (BY)
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::alphabet::Alphabet;
use crate::error::EnigmaError;
use crate::machine::Machine;
use crate::permutation::Permutation;
use crate::rotor::Rotor;

/// Parsed machine description.
#[derive(Debug, Clone)]
pub struct MachineConfig {
    alphabet: Arc<Alphabet>,
    num_rotors: usize,
    pawls: usize,
    rotors: Vec<Rotor>,
}

impl MachineConfig {
    /// Parses a machine description.
    ///
    /// # Errors
    /// - [`EnigmaError::Config`] for missing or non-numeric counts and
    ///   truncated rotor descriptors.
    /// - [`EnigmaError::InvalidPawlCount`] if `pawls >= slots`.
    /// - [`EnigmaError::MalformedCycles`] for an unclosed cycle token.
    /// - Any alphabet, rotor type or permutation error from the parts.
    pub fn parse(text: &str) -> Result<Self, EnigmaError> {
        let mut tokens = text.split_whitespace().peekable();

        let alphabet = tokens
            .next()
            .ok_or_else(|| EnigmaError::Config("configuration file truncated".to_string()))?;
        let alphabet = Arc::new(Alphabet::new(alphabet)?);
        let num_rotors = parse_count(tokens.next(), "number of rotors")?;
        let pawls = parse_count(tokens.next(), "number of pawls")?;
        if num_rotors < 2 {
            return Err(EnigmaError::InvalidRotorCount(num_rotors));
        }
        if pawls == 0 || pawls >= num_rotors {
            return Err(EnigmaError::InvalidPawlCount { pawls, num_rotors });
        }

        let mut rotors: Vec<Rotor> = Vec::new();
        while let Some(name) = tokens.next() {
            let tag = tokens.next().ok_or_else(|| {
                EnigmaError::Config(format!("bad rotor description for '{}'", name))
            })?;
            let mut cycles = String::new();
            while let Some(token) = tokens.next_if(|t| is_cycle_token(t)) {
                cycles.push_str(token);
                cycles.push(' ');
            }
            if let Some(token) = tokens.peek().filter(|t| t.starts_with('(')) {
                return Err(EnigmaError::MalformedCycles(token.to_string()));
            }
            if rotors.iter().any(|r| r.name() == name) {
                return Err(EnigmaError::DuplicateRotorName(name.to_string()));
            }
            rotors.push(Rotor::from_descriptor(name, tag, &cycles, &alphabet)?);
        }

        debug!(
            alphabet = %alphabet,
            num_rotors,
            pawls,
            rotors = rotors.len(),
            "configuration parsed"
        );
        Ok(MachineConfig {
            alphabet,
            num_rotors,
            pawls,
            rotors,
        })
    }

    /// Returns the machine alphabet.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Returns the number of rotor slots.
    pub fn num_rotors(&self) -> usize {
        self.num_rotors
    }

    /// Returns the number of pawls.
    pub fn pawls(&self) -> usize {
        self.pawls
    }

    /// Returns the configured rotors in file order.
    pub fn rotors(&self) -> &[Rotor] {
        &self.rotors
    }

    /// Builds a fresh machine owning copies of the configured rotors.
    ///
    /// Each call yields an independent session.
    pub fn build(&self) -> Result<Machine, EnigmaError> {
        Machine::new(
            Arc::clone(&self.alphabet),
            self.num_rotors,
            self.pawls,
            self.rotors.iter().cloned(),
        )
    }
}

/// Parsed settings line: rotor names, initial positions, optional ring
/// and plugboard cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub rotors: Vec<String>,
    pub positions: String,
    pub ring: Option<String>,
    pub plugboard: String,
}

impl Settings {
    /// Parses a settings line for a machine with `num_rotors` slots.
    ///
    /// The token after the positions is a ring setting unless it contains
    /// `(`; everything after that is plugboard cycle notation.
    ///
    /// # Errors
    /// - [`EnigmaError::Config`] if the line does not start with `*` or is
    ///   missing rotor names or positions.
    /// - [`EnigmaError::DuplicateRotor`] if a rotor name repeats.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::config::Settings;
    ///
    /// let s = Settings::parse("* B Beta III IV I AXLE (HQ) (EX)", 5).unwrap();
    /// assert_eq!(s.rotors, ["B", "Beta", "III", "IV", "I"]);
    /// assert_eq!(s.positions, "AXLE");
    /// assert_eq!(s.ring, None);
    /// assert_eq!(s.plugboard, "(HQ) (EX)");
    /// ```
    pub fn parse(line: &str, num_rotors: usize) -> Result<Self, EnigmaError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.first() != Some(&"*") {
            return Err(EnigmaError::Config(
                "settings line must begin with '*'".to_string(),
            ));
        }
        if tokens.len() < num_rotors + 2 {
            return Err(EnigmaError::Config(format!(
                "settings line needs {} rotor names and a setting",
                num_rotors
            )));
        }

        let rotors: Vec<String> = tokens[1..=num_rotors]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for (i, name) in rotors.iter().enumerate() {
            if rotors[i + 1..].contains(name) {
                return Err(EnigmaError::DuplicateRotor(name.clone()));
            }
        }
        let positions = tokens[num_rotors + 1].to_string();

        let mut rest = &tokens[num_rotors + 2..];
        let ring = match rest.first() {
            Some(token) if !token.contains('(') => {
                rest = &rest[1..];
                Some(token.to_string())
            }
            _ => None,
        };

        Ok(Settings {
            rotors,
            positions,
            ring,
            plugboard: rest.join(" "),
        })
    }

    /// Applies these settings to `machine`: binds rotors, sets positions,
    /// installs the ring if one is given, and installs the plugboard.
    ///
    /// A line without a ring leaves the rings of the bound rotors as they
    /// were. The plugboard is parsed before anything is mutated.
    pub fn apply(&self, machine: &mut Machine) -> Result<(), EnigmaError> {
        let plugboard = Permutation::new(&self.plugboard, machine.alphabet())?;
        machine.insert_rotors(self.rotors.as_slice())?;
        machine.set_rotors(&self.positions)?;
        if let Some(ring) = &self.ring {
            machine.insert_ring(ring)?;
        }
        machine.set_plugboard(plugboard)?;
        debug!(
            rotors = ?self.rotors,
            positions = %self.positions,
            ring = ?self.ring,
            plugboard = %self.plugboard,
            "settings applied"
        );
        Ok(())
    }
}

fn is_cycle_token(token: &str) -> bool {
    token.starts_with('(') && token.ends_with(')')
}

fn parse_count(token: Option<&str>, what: &str) -> Result<usize, EnigmaError> {
    let token = token.ok_or_else(|| EnigmaError::Config(format!("missing {}", what)))?;
    token
        .parse()
        .map_err(|_| EnigmaError::Config(format!("{} must be a number, got '{}'", what, token)))
}
