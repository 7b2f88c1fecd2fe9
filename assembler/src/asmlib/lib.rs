//! Compiler for CFO timing scripts.
//!
//! A script is a sequence of lines, each holding one sequencer
//! instruction or macro.  The compiler turns it into a flat buffer
//! of 8-byte instructions ready to be handed to the hardware.
#![warn(unreachable_pub)]
#![deny(unsafe_code)]
#![warn(clippy::manual_string_new)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::return_self_not_must_use)]
#![warn(clippy::wildcard_imports)]
#![warn(clippy::bool_to_int_with_if)]
#![warn(clippy::match_same_arms)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::items_after_statements)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::unreadable_literal)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)] // fix later
#![allow(clippy::cast_precision_loss)] // fix later
#![allow(clippy::doc_markdown)] // fix soon
#![allow(clippy::module_name_repetitions)] // fix soon

mod calculator;
mod config;
mod decoder;
mod diagnostics;
mod disassembler;
mod driver;
mod lexer;
mod listing;
mod loopstack;
mod macros;
mod source;
mod types;
mod validator;

pub use config::{resolve_options, CompilerOptions, ConfigFile, DEFAULT_CLOCK_FREQUENCY};
pub use diagnostics::{CompileError, Diagnostic, LoopMismatch, Severity};
pub use disassembler::{disassemble, DisassemblyError};
pub use driver::{compile_file, compile_source, CompiledProgram, CompilerState, OutputOptions};
pub use listing::{Listing, ListingLine};
pub use macros::MacroKind;
pub use types::{AssemblerFailure, IoAction, IoFailed, IoTarget, LineNumber};
