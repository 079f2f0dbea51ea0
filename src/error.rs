//! Error types for the Enigma simulator.

use thiserror::Error;

/// Broad classes of failure, used by front ends to decide how far an
/// error propagates (one message group or the whole run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed alphabet, configuration text, or rotor/pawl counts.
    Configuration,
    /// Unknown rotor name, wrong slot count, or missing reflector.
    RotorBinding,
    /// Settings or ring string of the wrong length or alphabet.
    Setting,
    /// Malformed cycle notation or out-of-alphabet cycle characters.
    Permutation,
    /// Stepping or converting without the required rotors bound.
    State,
}

/// Errors produced by the Enigma simulator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnigmaError {
    /// The alphabet string is empty or contains an illegal character.
    #[error("Invalid alphabet: {0}")]
    InvalidAlphabet(String),
    /// A character appears more than once in the alphabet.
    #[error("Duplicate character '{0}' in alphabet")]
    DuplicateAlphabetChar(char),
    /// A character is not part of the machine alphabet.
    #[error("Character '{0}' is not in the alphabet")]
    CharacterNotInAlphabet(char),
    /// An index lies outside `[0, size)`.
    #[error("Index {index} is outside the alphabet range 0..{size}")]
    IndexOutOfRange { index: usize, size: usize },
    /// Fewer than two rotor slots were requested.
    #[error("A machine needs at least 2 rotor slots, got {0}")]
    InvalidRotorCount(usize),
    /// The pawl count violates `0 < pawls < num_rotors`.
    #[error("Pawl count {pawls} must satisfy 0 < pawls < {num_rotors}")]
    InvalidPawlCount { pawls: usize, num_rotors: usize },
    /// A rotor type tag did not start with `M`, `N` or `R`.
    #[error("Invalid rotor type '{0}'")]
    InvalidRotorType(String),
    /// Two rotors in the pool share a name.
    #[error("Duplicate rotor name '{0}' in configuration")]
    DuplicateRotorName(String),
    /// A rotor was built over a different alphabet than its machine.
    #[error("Rotor '{0}' uses a different alphabet than the machine")]
    AlphabetMismatch(String),
    /// The configuration or settings text could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),
    /// A requested rotor name is not present in the pool.
    #[error("Unmatched rotor '{0}'")]
    UnmatchedRotor(String),
    /// The number of rotor names differs from the number of slots.
    #[error("Expected {expected} rotor names, got {found}")]
    WrongSlotCount { expected: usize, found: usize },
    /// The same rotor was requested for two slots.
    #[error("Rotor '{0}' is bound to more than one slot")]
    DuplicateRotor(String),
    /// The rotor bound at slot 0 does not reflect.
    #[error("First rotor '{0}' must be a reflector")]
    MissingReflector(String),
    /// The initial setting string has the wrong length.
    #[error("Setting must be {expected} characters long, got {found}")]
    SettingLength { expected: usize, found: usize },
    /// The ring string has the wrong length.
    #[error("Ring setting must be {expected} characters long, got {found}")]
    RingLength { expected: usize, found: usize },
    /// Cycle notation could not be parsed.
    #[error("Malformed cycle notation: {0}")]
    MalformedCycles(String),
    /// A character appears in more than one cycle.
    #[error("Character '{0}' appears in more than one cycle")]
    RepeatedCycleChar(char),
    /// No rotors are bound to the machine slots.
    #[error("There must be rotors bound before stepping or converting")]
    NoRotorsBound,
}

impl EnigmaError {
    /// Returns the taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnigmaError::InvalidAlphabet(_)
            | EnigmaError::DuplicateAlphabetChar(_)
            | EnigmaError::InvalidRotorCount(_)
            | EnigmaError::InvalidPawlCount { .. }
            | EnigmaError::InvalidRotorType(_)
            | EnigmaError::DuplicateRotorName(_)
            | EnigmaError::AlphabetMismatch(_)
            | EnigmaError::Config(_) => ErrorKind::Configuration,
            EnigmaError::UnmatchedRotor(_)
            | EnigmaError::WrongSlotCount { .. }
            | EnigmaError::DuplicateRotor(_)
            | EnigmaError::MissingReflector(_) => ErrorKind::RotorBinding,
            EnigmaError::CharacterNotInAlphabet(_)
            | EnigmaError::SettingLength { .. }
            | EnigmaError::RingLength { .. } => ErrorKind::Setting,
            EnigmaError::MalformedCycles(_) | EnigmaError::RepeatedCycleChar(_) => {
                ErrorKind::Permutation
            }
            EnigmaError::IndexOutOfRange { .. } | EnigmaError::NoRotorsBound => ErrorKind::State,
        }
    }
}
