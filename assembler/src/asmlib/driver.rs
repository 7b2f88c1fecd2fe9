//! The compile driver runs each line of a program through the
//! decoder, the macro expander, the validator and the parameter
//! calculator, and collects the encoded instructions.
use std::ffi::OsStr;
use std::fs;
use std::mem;
use std::path::Path;

use tracing::{event, span, Level};

use base::prelude::Instruction;

use super::calculator::derive_parameter;
use super::config::CompilerOptions;
use super::decoder::{decode_line, InstructionRecord, Statement};
use super::diagnostics::{CompileError, Diagnostic};
use super::lexer::read_words;
use super::listing::{Listing, ListingLine};
use super::loopstack::LoopStack;
use super::macros::expand;
use super::source::SourceProgram;
use super::types::{AssemblerFailure, IoAction, IoFailed, IoTarget, LineNumber};
use super::validator::validate;

mod output;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    // TODO: Also allow the listing to go to a file.
    pub list: bool,
}

/// The result of a successful compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
    bytes: Vec<u8>,
    instructions: Vec<Instruction>,
    warnings: Vec<Diagnostic>,
    listing: Listing,
}

impl CompiledProgram {
    /// The binary program, 8 bytes per instruction.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.instructions.iter()
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }
}

/// The mutable state of a single compilation.  Each call to
/// [`CompilerState::compile`] starts from a clean slate, so one
/// instance can be reused for several programs.
#[derive(Debug)]
pub struct CompilerState {
    options: CompilerOptions,
    loops: LoopStack,
    bytes: Vec<u8>,
    instructions: Vec<Instruction>,
    warnings: Vec<Diagnostic>,
    listing: Listing,
}

impl CompilerState {
    pub fn new(options: CompilerOptions) -> CompilerState {
        CompilerState {
            options,
            loops: LoopStack::default(),
            bytes: Vec::new(),
            instructions: Vec::new(),
            warnings: Vec::new(),
            listing: Listing::default(),
        }
    }

    /// Discard everything left over from a previous compilation.
    pub fn reset(&mut self) {
        self.loops.clear();
        self.bytes.clear();
        self.instructions.clear();
        self.warnings.clear();
        self.listing = Listing::default();
    }

    /// Compile a whole program.
    ///
    /// # Errors
    ///
    /// Returns the first fatal problem found.  No partial output
    /// survives a failed compilation.
    pub fn compile(&mut self, body: &str) -> Result<CompiledProgram, CompileError> {
        self.reset();
        match self.compile_lines(body) {
            Ok(()) => Ok(CompiledProgram {
                bytes: mem::take(&mut self.bytes),
                instructions: mem::take(&mut self.instructions),
                warnings: mem::take(&mut self.warnings),
                listing: mem::take(&mut self.listing),
            }),
            Err(e) => {
                event!(Level::DEBUG, "compilation failed: {e}");
                self.reset();
                Err(e)
            }
        }
    }

    fn compile_lines(&mut self, body: &str) -> Result<(), CompileError> {
        let source = SourceProgram::new(body);
        for (line, text) in source.numbered_lines() {
            self.compile_line(line, text)?;
        }
        match self.loops.innermost() {
            Some(open) => Err(CompileError::UnterminatedLoop { line: open }),
            None => Ok(()),
        }
    }

    fn compile_line(&mut self, line: LineNumber, text: &str) -> Result<(), CompileError> {
        let words = read_words(line, text)?;
        if words.is_empty() {
            return Ok(());
        }
        match decode_line(line, &words, &mut self.warnings)? {
            Statement::Primitive(record) => self.emit(&record, text),
            Statement::Macro(invocation) => {
                for record in expand(&invocation, &mut self.warnings)? {
                    self.emit(&record, text)?;
                }
                Ok(())
            }
        }
    }

    fn emit(&mut self, record: &InstructionRecord, source: &str) -> Result<(), CompileError> {
        validate(record, &mut self.warnings)?;
        let parameter =
            derive_parameter(record, &mut self.loops, &self.options, &mut self.warnings)?;
        let instruction = Instruction::new(record.opcode, parameter);
        event!(
            Level::DEBUG,
            "line {}: emitting {instruction} at offset {}",
            record.line,
            self.bytes.len()
        );
        self.bytes.extend_from_slice(&instruction.to_bytes());
        self.instructions.push(instruction);
        self.listing.push_line(ListingLine {
            line: record.line,
            source: source.trim().to_string(),
            synthetic: record.synthetic,
            instruction,
        });
        Ok(())
    }
}

/// Compile a program held in memory.
///
/// # Errors
///
/// Returns the first fatal problem found in the program.
pub fn compile_source(
    body: &str,
    options: &CompilerOptions,
) -> Result<CompiledProgram, CompileError> {
    CompilerState::new(*options).compile(body)
}

/// Compile the program in `input_file`, writing the binary to
/// `output_file`.
///
/// # Errors
///
/// Fails if the input cannot be read, the program does not compile,
/// or the output cannot be written.
pub fn compile_file(
    input_file: &OsStr,
    output_file: &Path,
    options: &CompilerOptions,
    output_options: OutputOptions,
) -> Result<CompiledProgram, AssemblerFailure> {
    let span = span!(Level::ERROR, "compile_file", input=?input_file, output=?output_file);
    let _enter = span.enter();

    let input_path = Path::new(input_file);
    let body = fs::read_to_string(input_path).map_err(|e| {
        AssemblerFailure::Io(IoFailed {
            action: IoAction::Read,
            target: IoTarget::File(input_path.to_path_buf()),
            error: e,
        })
    })?;
    let program = compile_source(&body, options).map_err(|error| AssemblerFailure::Compile {
        filename: input_file.to_owned(),
        error,
    })?;
    event!(
        Level::INFO,
        "compiled {} instructions ({} bytes) with {} warnings",
        program.instruction_count(),
        program.bytes().len(),
        program.warnings().len()
    );
    if output_options.list {
        output::write_listing(program.listing())?;
    }
    output::write_program(output_file, program.bytes())?;
    Ok(program)
}
