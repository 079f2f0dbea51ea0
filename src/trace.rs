//! Per-character trace of a machine conversion.
//!
//! [`Machine::convert_with`](crate::Machine::convert_with) reports every
//! stage of the pipeline to a [`TraceSink`]. The core itself never writes
//! anywhere; the sink decides what to do with the events.

use std::sync::Arc;

use crate::alphabet::Alphabet;

/// Direction of a pass through the rotor stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Forward,
    Backward,
}

/// One observable stage of a single-character conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent<'a> {
    /// Rotor settings of slots 1.. after stepping.
    Stepped { settings: &'a [usize] },
    /// Index entering the machine.
    Input(usize),
    /// Index after the first plugboard pass.
    Plugboard(usize),
    /// Index leaving the rotor in `slot` during `pass`.
    Rotor { slot: usize, pass: Pass, output: usize },
    /// Index leaving the machine.
    Output(usize),
}

/// Receiver of [`TraceEvent`]s.
pub trait TraceSink {
    /// Handles one event.
    fn record(&mut self, event: TraceEvent<'_>);

    /// Returns false if the sink discards everything, letting the machine
    /// skip building events.
    fn enabled(&self) -> bool {
        true
    }
}

impl<F> TraceSink for F
where
    F: FnMut(TraceEvent<'_>),
{
    fn record(&mut self, event: TraceEvent<'_>) {
        self(event)
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn record(&mut self, _event: TraceEvent<'_>) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Sink that forwards events to `tracing` at TRACE level.
///
/// Reports itself disabled unless a subscriber accepts TRACE events.
#[derive(Debug, Clone)]
pub struct TracingSink {
    alphabet: Arc<Alphabet>,
}

impl TracingSink {
    /// Creates a sink that renders indices with `alphabet`.
    pub fn new(alphabet: Arc<Alphabet>) -> Self {
        TracingSink { alphabet }
    }

    fn ch(&self, index: usize) -> char {
        self.alphabet.to_char(index).unwrap_or('?')
    }
}

impl TraceSink for TracingSink {
    fn enabled(&self) -> bool {
        tracing::enabled!(tracing::Level::TRACE)
    }

    fn record(&mut self, event: TraceEvent<'_>) {
        match event {
            TraceEvent::Stepped { settings } => {
                let positions: String = settings.iter().map(|&s| self.ch(s)).collect();
                tracing::trace!(%positions, "rotors stepped");
            }
            TraceEvent::Input(c) => tracing::trace!(input = %self.ch(c), "convert"),
            TraceEvent::Plugboard(c) => tracing::trace!(output = %self.ch(c), "plugboard"),
            TraceEvent::Rotor { slot, pass, output } => {
                tracing::trace!(slot, ?pass, output = %self.ch(output), "rotor")
            }
            TraceEvent::Output(c) => tracing::trace!(output = %self.ch(c), "converted"),
        }
    }
}

/// Sink that renders each conversion as one line, in the form
/// `[AXLE] H -> Q -> ... -> T`.
#[derive(Debug, Clone)]
pub struct LineTrace {
    alphabet: Arc<Alphabet>,
    current: String,
    lines: Vec<String>,
}

impl LineTrace {
    /// Creates an empty trace over `alphabet`.
    pub fn new(alphabet: Arc<Alphabet>) -> Self {
        LineTrace {
            alphabet,
            current: String::new(),
            lines: Vec::new(),
        }
    }

    /// Removes and returns the lines completed so far.
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    fn push(&mut self, index: usize) {
        let c = self.alphabet.to_char(index).unwrap_or('?');
        self.current.push(c);
    }
}

impl TraceSink for LineTrace {
    fn record(&mut self, event: TraceEvent<'_>) {
        match event {
            TraceEvent::Stepped { settings } => {
                self.current.clear();
                self.current.push('[');
                for &s in settings {
                    self.push(s);
                }
                self.current.push_str("] ");
            }
            TraceEvent::Input(c) | TraceEvent::Plugboard(c) => {
                self.push(c);
                self.current.push_str(" -> ");
            }
            TraceEvent::Rotor { output, .. } => {
                self.push(output);
                self.current.push_str(" -> ");
            }
            TraceEvent::Output(c) => {
                self.push(c);
                self.lines.push(std::mem::take(&mut self.current));
            }
        }
    }
}
