//! Regression tests for the public API.
//!
//! Expected ciphertexts are frozen snapshots taken with the historical
//! rotor set below: any change in output indicates a regression.
//!
//! Coverage:
//! - `Permutation` (cycle parsing, derangement)
//! - `Rotor` (notches, stepping capability)
//! - `Machine` (stepping, conversion, ring settings, plugboard)
//! - `config::{MachineConfig, Settings}`
//! - `session::Session`
//! - `EnigmaError::kind`

use std::sync::Arc;

use enigma::config::{MachineConfig, Settings};
use enigma::session::Session;
use enigma::{Alphabet, EnigmaError, ErrorKind, Machine, Permutation, Rotor, TraceEvent};

const DEFAULT_CONF: &str = "
 ABCDEFGHIJKLMNOPQRSTUVWXYZ
 5 3
 I MQ      (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
 II ME     (FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q)
 III MV    (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)
 IV MJ     (AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU)
 V MZ      (AVOLDRWFIUQ)(BZKSMNHYC) (EGTJPX)
 Beta N    (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
 Gamma N   (AFNJHE) (BSQWPCOZVYXIRL) (DKMT) (GU)
 B R       (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)
 C R       (AR) (BD) (CO) (EJ) (FN) (GT) (HK) (IV) (LM) (PW) (QZ) (SX) (UY)
";

/// Same rotor set on a three-slot machine with one pawl.
fn three_slot_machine() -> Machine {
    let five = MachineConfig::parse(DEFAULT_CONF).unwrap();
    Machine::new(
        five.alphabet().clone(),
        3,
        1,
        five.rotors().iter().cloned(),
    )
    .unwrap()
}

fn configured(settings: &str) -> Machine {
    let config = MachineConfig::parse(DEFAULT_CONF).unwrap();
    let mut machine = config.build().unwrap();
    Settings::parse(settings, config.num_rotors())
        .unwrap()
        .apply(&mut machine)
        .unwrap();
    machine
}

// ═══════════════════════════════════════════════════════════════════════
// Permutation
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn permutation_derangement_examples() {
    let alpha = Arc::new(Alphabet::new("ABCDEF").unwrap());
    assert!(Permutation::new("(ABCD)(EF)", &alpha).unwrap().derangement());
    assert!(!Permutation::new("(ABCD)(E)", &alpha).unwrap().derangement());
}

#[test]
fn permutation_historical_rotor_derangements() {
    let config = MachineConfig::parse(DEFAULT_CONF).unwrap();
    let deranged: Vec<(&str, bool)> = config
        .rotors()
        .iter()
        .map(|r| (r.name(), r.permutation().derangement()))
        .collect();
    assert_eq!(
        deranged,
        [
            ("I", false),
            ("II", false),
            ("III", false),
            ("IV", true),
            ("V", true),
            ("Beta", true),
            ("Gamma", true),
            ("B", true),
            ("C", true),
        ]
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Rotor
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn rotor_notch_at_q_only() {
    let config = MachineConfig::parse(DEFAULT_CONF).unwrap();
    let mut rotor: Rotor = config.rotors()[0].clone();
    assert_eq!(rotor.notches(), "Q");
    let hits: Vec<usize> = (0..26)
        .filter(|&posn| {
            rotor.set(posn).unwrap();
            rotor.at_notch()
        })
        .collect();
    assert_eq!(hits, vec![16]);
}

// ═══════════════════════════════════════════════════════════════════════
// Machine — stepping
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn stepping_carry_from_fast_rotor() {
    let mut machine = three_slot_machine();
    machine.insert_rotors(&["B", "II", "I"]).unwrap();
    machine.set_rotors("AQ").unwrap();
    machine.advance_rotors().unwrap();
    assert_eq!(machine.positions(), "BR");
}

#[test]
fn stepping_double_step() {
    let mut machine = configured("* B Beta I II III AADU");
    let mut seen = Vec::new();
    for _ in 0..4 {
        machine.advance_rotors().unwrap();
        seen.push(machine.positions());
    }
    assert_eq!(seen, ["AADV", "AAEW", "ABFX", "ABFY"]);
}

#[test]
fn stepping_reflector_never_moves() {
    let mut machine = configured("* B Beta III IV I AXLE");
    for _ in 0..500 {
        machine.advance_rotors().unwrap();
    }
    assert_eq!(machine.get_rotor(0).unwrap().setting(), 0);
    assert_eq!(machine.get_rotor(1).unwrap().setting(), 0);
}

// ═══════════════════════════════════════════════════════════════════════
// Machine — conversion snapshots
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn hello_three_slots_snapshot() {
    let mut machine = three_slot_machine();
    let apply = |m: &mut Machine| {
        m.insert_rotors(&["B", "IV", "III"]).unwrap();
        m.set_rotors("AB").unwrap();
        m.set_plugboard(Permutation::new("(AB) (CD)", m.alphabet()).unwrap())
            .unwrap();
    };

    apply(&mut machine);
    assert_eq!(machine.convert_message("HELLO").unwrap(), "TFAFV");
    assert_eq!(machine.positions(), "AG");

    apply(&mut machine);
    assert_eq!(machine.convert_message("TFAFV").unwrap(), "HELLO");

    apply(&mut machine);
    assert_eq!(machine.convert_message("HELLO WORLD").unwrap(), "TFAFVSJMDI");
    assert_eq!(machine.positions(), "AL");
}

#[test]
fn hiawatha_snapshot() {
    let settings = "* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)";
    let mut machine = configured(settings);
    assert_eq!(
        machine.convert_message("FROM HIS SHOULDER HIAWATHA").unwrap(),
        "QVPQSOKOILPUBKJZPISFXDW"
    );
    assert_eq!(machine.positions(), "AXMB");

    let mut machine = configured(settings);
    assert_eq!(
        machine.convert_message("QVPQS OKOIL PUBKJ ZPISF XDW").unwrap(),
        "FROMHISSHOULDERHIAWATHA"
    );
}

#[test]
fn ring_all_a_matches_no_ring() {
    let mut machine = configured("* B Beta III IV I AXLE AAAA (HQ) (EX) (IP) (TR) (BY)");
    assert_eq!(
        machine.convert_message("FROMHISSHOULDERHIAWATHA").unwrap(),
        "QVPQSOKOILPUBKJZPISFXDW"
    );
}

#[test]
fn ring_setting_snapshot() {
    let settings = "* B Beta III IV I AXLE ABCD (HQ) (EX) (IP) (TR) (BY)";
    let mut machine = configured(settings);
    assert_eq!(
        machine.convert_message("FROMHISSHOULDERHIAWATHA").unwrap(),
        "ESAICLOMBWNPTWZTEUNUSZS"
    );

    let mut machine = configured(settings);
    assert_eq!(
        machine.convert_message("ESAICLOMBWNPTWZTEUNUSZS").unwrap(),
        "FROMHISSHOULDERHIAWATHA"
    );
}

#[test]
fn conversion_is_stateful() {
    let mut machine = configured("* B Beta III IV I AXLE");
    let first = machine.convert_message("AAAAA").unwrap();
    let second = machine.convert_message("AAAAA").unwrap();
    assert_ne!(first, second);
}

#[test]
fn no_character_maps_to_itself() {
    let mut machine = configured("* C Gamma V II I ZZZZ (AZ) (BY)");
    let plain: String = std::iter::repeat("ABCDEFGHIJKLMNOPQRSTUVWXYZ")
        .take(20)
        .collect();
    let cipher = machine.convert_message(&plain).unwrap();
    for (p, c) in plain.chars().zip(cipher.chars()) {
        assert_ne!(p, c);
    }
}

#[test]
fn trace_observes_each_character() {
    let mut machine = configured("* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)");
    let mut outputs = Vec::new();
    let mut sink = |event: TraceEvent<'_>| {
        if let TraceEvent::Output(c) = event {
            outputs.push(c);
        }
    };
    let text = machine.convert_message_with("FROM", &mut sink).unwrap();
    let alpha = machine.alphabet().clone();
    let traced: String = outputs.iter().map(|&c| alpha.to_char(c).unwrap()).collect();
    assert_eq!(traced, text);
    assert_eq!(text, "QVPQ");
}

// ═══════════════════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn session_end_to_end() {
    let mut machine = MachineConfig::parse(DEFAULT_CONF).unwrap().build().unwrap();
    let input = "\
* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)
FROM HIS SHOULDER HIAWATHA

* B Beta III IV I AXLE ABCD (HQ) (EX) (IP) (TR) (BY)
FROMHISSHOULDERHIAWATHA
";
    let mut output = Vec::new();
    Session::new(&mut machine)
        .run(input.as_bytes(), &mut output, std::io::sink())
        .unwrap();
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "QVPQS OKOIL PUBKJ ZPISF XDW\n\nESAIC LOMBW NPTWZ TEUNU SZS\n"
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn error_taxonomy() {
    let config = MachineConfig::parse(DEFAULT_CONF).unwrap();
    let mut machine = config.build().unwrap();

    let err = machine.convert(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);

    let err = machine.insert_rotors(&["B", "Beta", "III", "IV", "VI"]).unwrap_err();
    assert_eq!(err, EnigmaError::UnmatchedRotor("VI".into()));
    assert_eq!(err.kind(), ErrorKind::RotorBinding);

    let err = machine.insert_rotors(&["I", "Beta", "III", "IV", "II"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RotorBinding);

    machine.insert_rotors(&["B", "Beta", "III", "IV", "I"]).unwrap();
    let err = machine.set_rotors("AXL").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Setting);
    let err = machine.set_rotors("AXLe").unwrap_err();
    assert_eq!(err, EnigmaError::CharacterNotInAlphabet('e'));

    let err = Permutation::new("(AB", config.alphabet()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permutation);

    let err = MachineConfig::parse("ABC 2 2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
