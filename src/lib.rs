//! Rotor cipher machine simulator.
//!
//! Simulates an Enigma-style polyalphabetic substitution machine: a
//! plugboard and a stack of rotors, each a permutation of the alphabet
//! shifted by its current setting. Converting a character steps the
//! rotors, then sends the signal through the plugboard, right to left
//! through every rotor into the reflector, back left to right, and
//! through the plugboard again. Because the reflector is an involution,
//! the same settings that encipher a message also decipher it.
//!
//! # Architecture
//!
//! ```text
//! Alphabet     (characters ↔ indices)
//!     ↓ shared through Arc
//! Permutation  (cycle notation, permute / invert)
//!     ↓ owned by
//! Rotor        (Reflector | Fixed | Moving{notches}, setting, ring)
//!     ↓ owned by RotorPool, referenced by RotorId
//! Machine      (slots, plugboard, stepping, conversion pipeline)
//! ```
//!
//! The `config`, `session` and `utils` modules are the textual front end:
//! configuration parsing, settings lines and grouped output.
//!
//! # Examples
//!
//! Encipher and decipher with the same settings:
//!
//! ```
//! use enigma::config::{MachineConfig, Settings};
//!
//! let config = MachineConfig::parse(
//!     "ABCDEFGHIJKLMNOPQRSTUVWXYZ 5 3
//!      I MQ (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//!      IV MJ (AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU)
//!      III MV (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)
//!      Beta N (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//!      B R (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)",
//! )
//! .unwrap();
//! let settings = Settings::parse("* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)", 5).unwrap();
//!
//! let mut machine = config.build().unwrap();
//! settings.apply(&mut machine).unwrap();
//! let cipher = machine.convert_message("FROM HIS SHOULDER HIAWATHA").unwrap();
//! assert_eq!(cipher, "QVPQSOKOILPUBKJZPISFXDW");
//!
//! settings.apply(&mut machine).unwrap();
//! assert_eq!(machine.convert_message(&cipher).unwrap(), "FROMHISSHOULDERHIAWATHA");
//! ```
//!
//! Build a machine directly from core types:
//!
//! ```
//! use std::sync::Arc;
//! use enigma::{Alphabet, Machine, Permutation, Rotor};
//!
//! let alpha = Arc::new(Alphabet::new("ABCD").unwrap());
//! let rotors = vec![
//!     Rotor::reflector("R", Permutation::new("(AC) (BD)", &alpha).unwrap()),
//!     Rotor::moving("M", Permutation::new("(ABCD)", &alpha).unwrap(), "D").unwrap(),
//! ];
//! let mut machine = Machine::new(alpha, 2, 1, rotors).unwrap();
//! machine.insert_rotors(&["R", "M"]).unwrap();
//! machine.set_rotors("A").unwrap();
//! let out = machine.convert(0).unwrap();
//! assert!(out < 4);
//! ```

#![deny(clippy::all)]

pub mod alphabet;
pub mod config;
pub mod error;
pub mod machine;
pub mod permutation;
pub mod rotor;
pub mod session;
pub mod trace;
pub mod utils;

pub use alphabet::Alphabet;
pub use error::{EnigmaError, ErrorKind};
pub use machine::Machine;
pub use permutation::Permutation;
pub use rotor::{Rotor, RotorId, RotorKind, RotorPool};
pub use trace::{LineTrace, NoTrace, Pass, TraceEvent, TraceSink, TracingSink};
