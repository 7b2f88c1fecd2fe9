#![deny(unsafe_code)]

use std::error::Error;
use std::ffi::{OsStr, OsString};
use std::fmt::{self, Display, Formatter};
use std::fs;

use clap::ArgAction::Set;
use clap::Parser;
use tracing::{event, span, Level};
use tracing_subscriber::prelude::*;

use base::prelude::{Instruction, INSTRUCTION_BYTES};
use cfoasm::{disassemble, DisassemblyError};

const ABOUT: &str = "Disassembler for compiled CFO sequencer programs";

/// Disassembler for compiled CFO sequencer programs
#[derive(Parser, Debug)]
#[clap(version, about=ABOUT, long_about = None)]
struct Cli {
    /// File from which the binary program is read
    #[clap(action=Set)]
    input: OsString,
}

#[derive(Debug)]
enum Fail {
    ReadFailed(String),
    Generic(String),
    BadProgram(DisassemblyError),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fail::Generic(message) | Fail::ReadFailed(message) => f.write_str(message),
            Fail::BadProgram(e) => write!(f, "input is not a valid program: {e}"),
        }
    }
}

impl Error for Fail {}

fn print_instruction(offset: usize, instruction: &Instruction) {
    print!("{offset:>08x}|");
    for byte in instruction.to_bytes() {
        print!(" {byte:02x}");
    }
    println!(" | {instruction}");
}

fn disassemble_file(input_file_name: &OsStr) -> Result<(), Fail> {
    let bytes = fs::read(input_file_name)
        .map_err(|e| Fail::ReadFailed(format!("failed to read input file: {e}")))?;
    let instructions = disassemble(&bytes).map_err(Fail::BadProgram)?;
    event!(
        Level::DEBUG,
        "decoded {} instructions from {} bytes",
        instructions.len(),
        bytes.len()
    );
    for (n, instruction) in instructions.iter().enumerate() {
        print_instruction(n * INSTRUCTION_BYTES, instruction);
    }
    Ok(())
}

fn run_disassembler() -> Result<(), Fail> {
    let cli = Cli::parse();
    // See
    // https://docs.rs/tracing-subscriber/0.3/tracing_subscriber/fmt/index.html#filtering-events-with-environment-variables
    // for instructions on how to select which trace messages get
    // printed.
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
    {
        Err(e) => {
            return Err(Fail::Generic(format!(
                "failed to initialise tracing filter (perhaps there is a problem with environment variables): {e}"
            )));
        }
        Ok(layer) => layer,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let span = span!(Level::ERROR, "disassemble", input=?cli.input);
    let _enter = span.enter();
    disassemble_file(&cli.input)
}

fn main() {
    match run_disassembler() {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
