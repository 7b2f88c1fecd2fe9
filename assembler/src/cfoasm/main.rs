use std::error::Error;
use std::ffi::OsString;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use clap::ArgAction::{Set, SetTrue};
use clap::Parser;
use tracing::{event, span, Level};
use tracing_subscriber::prelude::*;

use cfoasm::{
    compile_file, resolve_options, AssemblerFailure, CompilerOptions, ConfigFile, OutputOptions,
};

/// Compiler for CFO timing scripts
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// File from which the timing script is read.
    #[clap(action = Set)]
    input: OsString,

    /// File to which the binary program is written.
    #[clap(action = Set, short = 'o', long)]
    output: OsString,

    /// When set, print a listing of the generated instructions.
    #[clap(action = SetTrue, long)]
    list: bool,

    /// YAML file holding compiler settings.
    #[clap(action = Set, long)]
    config: Option<PathBuf>,

    /// Sequencer clock frequency in Hz (overrides the configuration
    /// file).
    #[clap(action = Set, long)]
    clock_frequency: Option<u64>,
}

#[derive(Debug)]
enum Fail {
    /// We initialised the compiler but then it failed.
    AsmFail(AssemblerFailure),
    /// We were not able to correctly initialise the compiler.
    InitialisationFailure(String),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fail::AsmFail(assembler_failure) => assembler_failure.fmt(f),
            Fail::InitialisationFailure(msg) => f.write_str(msg.as_str()),
        }
    }
}

impl Error for Fail {}

fn compiler_options(cli: &Cli) -> Result<CompilerOptions, AssemblerFailure> {
    let config: Option<ConfigFile> = match cli.config.as_deref() {
        Some(path) => Some(ConfigFile::load(path)?),
        None => None,
    };
    resolve_options(config.as_ref(), cli.clock_frequency)
}

fn run_compiler() -> Result<(), Fail> {
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
            return Err(Fail::InitialisationFailure(format!(
                "failed to initialise tracing filter (perhaps there is a problem with environment variables): {e}"
            )));
        }
        Ok(layer) => layer,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let span = span!(Level::ERROR, "compile", input=?cli.input, output=?cli.output);
    let _enter = span.enter();
    let options = compiler_options(&cli).map_err(Fail::AsmFail)?;
    let output_path = PathBuf::from(&cli.output);
    let output_options = OutputOptions { list: cli.list };
    let result = compile_file(&cli.input, &output_path, &options, output_options)
        .map(|_| ())
        .map_err(Fail::AsmFail);
    if let Err(e) = &result {
        event!(Level::ERROR, "compilation failed: {:?}", e);
    } else {
        event!(Level::INFO, "compilation succeeded");
    }
    result
}

fn main() {
    match run_compiler() {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
