//! Message session: drives a machine over a stream of input lines.
//!
//! Lines starting with `*` are settings lines and reconfigure the machine.
//! Every other line is a message, converted with the current state and
//! written in groups of five. Empty lines are echoed as empty lines.

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::EnigmaError;
use crate::machine::Machine;
use crate::trace::{LineTrace, TracingSink};
use crate::utils::groups::group_five;

/// Errors produced while running a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {source}")]
    Enigma { line: usize, source: EnigmaError },
}

/// A machine plus the per-line processing rules.
///
/// Without the verbose trace, conversions are still reported to `tracing`
/// at TRACE level.
pub struct Session<'m> {
    machine: &'m mut Machine,
    trace: Option<LineTrace>,
    events: TracingSink,
}

impl<'m> Session<'m> {
    /// Creates a non-verbose session driving `machine`.
    pub fn new(machine: &'m mut Machine) -> Self {
        let events = TracingSink::new(machine.alphabet().clone());
        Session {
            machine,
            trace: None,
            events,
        }
    }

    /// Enables or disables the per-character verbose trace.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.trace = verbose.then(|| LineTrace::new(self.machine.alphabet().clone()));
        self
    }

    /// Processes one input line.
    ///
    /// Returns the line to print, or `None` for settings lines and for
    /// messages that convert to nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::config::MachineConfig;
    /// use enigma::session::Session;
    ///
    /// let config = MachineConfig::parse("ABCD 2 1 X MA (ABCD) R R (AB) (CD)").unwrap();
    /// let mut machine = config.build().unwrap();
    /// let mut session = Session::new(&mut machine);
    ///
    /// assert_eq!(session.process_line("* R X A").unwrap(), None);
    /// assert_eq!(session.process_line("").unwrap(), Some(String::new()));
    /// assert!(session.process_line("ABCDAB").unwrap().is_some());
    /// ```
    pub fn process_line(&mut self, line: &str) -> Result<Option<String>, EnigmaError> {
        if line.is_empty() {
            return Ok(Some(String::new()));
        }
        if line.starts_with('*') {
            let settings = Settings::parse(line, self.machine.num_rotors())?;
            settings.apply(self.machine)?;
            return Ok(None);
        }
        let converted = match self.trace.as_mut() {
            Some(trace) => self.machine.convert_message_with(line, trace)?,
            None => self.machine.convert_message_with(line, &mut self.events)?,
        };
        if converted.is_empty() {
            Ok(None)
        } else {
            Ok(Some(group_five(&converted)))
        }
    }

    /// Removes and returns the verbose trace lines recorded so far.
    pub fn take_trace(&mut self) -> Vec<String> {
        self.trace
            .as_mut()
            .map(LineTrace::take_lines)
            .unwrap_or_default()
    }

    /// Processes every line of `input`, writing converted messages to
    /// `output` and verbose trace lines to `trace_out`.
    ///
    /// Stops at the first failing line.
    pub fn run<R, W, T>(
        &mut self,
        input: R,
        mut output: W,
        mut trace_out: T,
    ) -> Result<(), SessionError>
    where
        R: BufRead,
        W: Write,
        T: Write,
    {
        for (number, line) in input.lines().enumerate() {
            let line = line?;
            let line = line.strip_suffix('\r').unwrap_or(&line);
            let result = self.process_line(line);
            for trace in self.take_trace() {
                writeln!(trace_out, "{}", trace)?;
            }
            match result {
                Ok(Some(text)) => writeln!(output, "{}", text)?,
                Ok(None) => {}
                Err(source) => {
                    warn!(line = number + 1, error = %source, "conversion failed");
                    return Err(SessionError::Enigma {
                        line: number + 1,
                        source,
                    });
                }
            }
        }
        output.flush()?;
        debug!("session finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;

    const CONFIG: &str = "
        ABCDEFGHIJKLMNOPQRSTUVWXYZ
        5 3
        I MQ      (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
        IV MJ     (AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU)
        III MV    (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)
        Beta N    (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
        B R       (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)
    ";

    fn run(input: &str, verbose: bool) -> (Result<(), SessionError>, String, String) {
        let mut machine = MachineConfig::parse(CONFIG).unwrap().build().unwrap();
        let mut output = Vec::new();
        let mut trace = Vec::new();
        let result = Session::new(&mut machine)
            .verbose(verbose)
            .run(input.as_bytes(), &mut output, &mut trace);
        (
            result,
            String::from_utf8(output).unwrap(),
            String::from_utf8(trace).unwrap(),
        )
    }

    #[test]
    fn test_run_converts_and_groups() {
        let input = "* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)\n\
                     FROM HIS SHOULDER HIAWATHA\n\
                     \n\
                     * B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)\n\
                     QVPQS OKOIL PUBKJ ZPISF XDW\n";
        let (result, output, trace) = run(input, false);
        result.unwrap();
        assert_eq!(
            output,
            "QVPQS OKOIL PUBKJ ZPISF XDW\n\nFROMH ISSHO ULDER HIAWA THA\n"
        );
        assert!(trace.is_empty());
    }

    #[test]
    fn test_run_handles_crlf() {
        let input = "* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)\r\nFROM\r\n";
        let (result, output, _) = run(input, false);
        result.unwrap();
        assert_eq!(output, "QVPQ\n");
    }

    #[test]
    fn test_run_verbose_trace() {
        let input = "* B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)\nFR\n";
        let (result, _, trace) = run(input, true);
        result.unwrap();
        let lines: Vec<&str> = trace.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[AXLF] F -> F -> "));
        assert!(lines[0].ends_with(" -> Q"));
        assert!(lines[1].starts_with("[AXLG] R -> T -> "));
        assert!(lines[1].ends_with(" -> V"));
    }

    #[test]
    fn test_message_before_settings_fails() {
        let (result, output, _) = run("HELLO\n", false);
        match result {
            Err(SessionError::Enigma { line, source }) => {
                assert_eq!(line, 1);
                assert_eq!(source, EnigmaError::NoRotorsBound);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(output.is_empty());
    }

    #[test]
    fn test_bad_settings_reports_line() {
        let input = "* B Beta III IV I AXLE\nAAAA\n* B Beta III IV VI AXLE\n";
        let (result, output, _) = run(input, false);
        match result {
            Err(SessionError::Enigma { line, source }) => {
                assert_eq!(line, 3);
                assert_eq!(source, EnigmaError::UnmatchedRotor("VI".into()));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn test_ring_persists_across_settings_lines() {
        let input = "* B Beta III IV I AXLE ABCD (HQ) (EX) (IP) (TR) (BY)\n\
                     A\n\
                     * B Beta III IV I AXLE (HQ) (EX) (IP) (TR) (BY)\n\
                     FROMHISSHOULDERHIAWATHA\n";
        let (result, output, _) = run(input, false);
        result.unwrap();
        assert_eq!(output.lines().count(), 2);
        assert_eq!(
            output.lines().last().unwrap(),
            "ESAIC LOMBW NPTWZ TEUNU SZS"
        );
    }

    #[test]
    fn test_spaces_only_line_prints_nothing() {
        let mut machine = MachineConfig::parse(CONFIG).unwrap().build().unwrap();
        let mut session = Session::new(&mut machine);
        session.process_line("* B Beta III IV I AXLE").unwrap();
        assert_eq!(session.process_line("   ").unwrap(), None);
    }
}
