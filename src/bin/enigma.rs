//! Command-line front end.
//!
//! ```text
//! enigma [--verbose] CONFIG [INPUT [OUTPUT]]
//! ```
//!
//! Reads the machine description from CONFIG, then converts the messages
//! in INPUT (default: stdin) and writes them to OUTPUT (default: stdout).
//! With `--verbose`, every character's path through the machine is
//! printed to stderr.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use enigma::config::MachineConfig;
use enigma::session::Session;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: enigma [--verbose] CONFIG [INPUT [OUTPUT]]";

struct Args {
    verbose: bool,
    config: String,
    input: Option<String>,
    output: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut verbose = false;
    let mut positional = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--verbose" => verbose = true,
            "-h" | "--help" => bail!(USAGE),
            _ if arg.starts_with("--") => bail!("unknown option {}\n{}", arg, USAGE),
            _ => positional.push(arg),
        }
    }
    if positional.is_empty() || positional.len() > 3 {
        bail!(USAGE);
    }
    let mut positional = positional.into_iter();
    Ok(Args {
        verbose,
        config: positional.next().unwrap_or_default(),
        input: positional.next(),
        output: positional.next(),
    })
}

fn run() -> Result<()> {
    let args = parse_args()?;

    let text = fs::read_to_string(&args.config)
        .with_context(|| format!("could not open {}", args.config))?;
    let config = MachineConfig::parse(&text)?;
    let mut machine = config.build()?;
    info!(config = %args.config, rotors = config.rotors().len(), "machine ready");

    let input: Box<dyn io::BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("could not open {}", path))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("could not open {}", path))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    Session::new(&mut machine)
        .verbose(args.verbose)
        .run(input, output, io::stderr())?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
