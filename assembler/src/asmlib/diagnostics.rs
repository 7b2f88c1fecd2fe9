//! Warnings and fatal errors produced while compiling.
//!
//! Every problem the compiler finds is tied to a source line and to
//! the instruction (or macro) keyword on that line.  Warnings are
//! collected and returned alongside the compiled program.  A fatal
//! error stops the compilation; the partially-built output is
//! discarded.
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use tracing::{event, Level};

use base::prelude::Opcode;

use super::macros::MacroKind;
use super::types::LineNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Fatal,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Fatal => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: LineNumber,
    /// The instruction or macro keyword the diagnostic is about.
    /// Empty when the line could not be read far enough to find one.
    pub instruction: String,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn warning(line: LineNumber, instruction: &str, message: String) -> Diagnostic {
        Diagnostic {
            line,
            instruction: instruction.to_string(),
            message,
            severity: Severity::Warning,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        if !self.instruction.is_empty() {
            write!(f, "{}: ", self.instruction)?;
        }
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Record a warning, also logging it.
pub(crate) fn warn(
    warnings: &mut Vec<Diagnostic>,
    line: LineNumber,
    instruction: &str,
    message: String,
) {
    let diagnostic = Diagnostic::warning(line, instruction, message);
    event!(Level::WARN, "{diagnostic}");
    warnings.push(diagnostic);
}

/// Which way round a LOOP / DO_LOOP pairing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMismatch {
    /// A DO_LOOP was found when no LOOP was open.
    MoreDoLoopThanLoop,
    /// An END was found while a LOOP was still open.
    FewerDoLoopThanLoop,
}

impl Display for LoopMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoopMismatch::MoreDoLoopThanLoop => "more DO_LOOP than LOOP",
            LoopMismatch::FewerDoLoopThanLoop => "fewer DO_LOOP than LOOP",
        })
    }
}

/// A fatal compilation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The line could not be split into words (for example it
    /// contains a lone '/').
    SyntaxError {
        line: LineNumber,
        column: Option<usize>,
        msg: String,
    },
    UnknownInstruction {
        line: LineNumber,
        keyword: String,
    },
    /// The argument keyword is not one this instruction accepts.
    InvalidArgument {
        line: LineNumber,
        opcode: Opcode,
        argument: String,
    },
    InvalidParameter {
        line: LineNumber,
        opcode: Opcode,
        msg: String,
    },
    InvalidIdentifier {
        line: LineNumber,
        opcode: Opcode,
        identifier: String,
    },
    /// A macro invocation has the wrong shape; nothing was emitted
    /// for it.
    MacroArgument {
        line: LineNumber,
        kind: MacroKind,
        msg: String,
    },
    LoopMismatch {
        line: LineNumber,
        opcode: Opcode,
        mismatch: LoopMismatch,
    },
    /// The program ended while the LOOP at `line` was still open.
    UnterminatedLoop {
        line: LineNumber,
    },
    MalformedNumber {
        line: LineNumber,
        instruction: String,
        token: String,
    },
}

impl CompileError {
    pub fn line(&self) -> LineNumber {
        match self {
            CompileError::SyntaxError { line, .. }
            | CompileError::UnknownInstruction { line, .. }
            | CompileError::InvalidArgument { line, .. }
            | CompileError::InvalidParameter { line, .. }
            | CompileError::InvalidIdentifier { line, .. }
            | CompileError::MacroArgument { line, .. }
            | CompileError::LoopMismatch { line, .. }
            | CompileError::UnterminatedLoop { line }
            | CompileError::MalformedNumber { line, .. } => *line,
        }
    }

    pub fn instruction(&self) -> String {
        match self {
            CompileError::SyntaxError { .. } => String::new(),
            CompileError::UnknownInstruction { keyword, .. } => keyword.clone(),
            CompileError::InvalidArgument { opcode, .. }
            | CompileError::InvalidParameter { opcode, .. }
            | CompileError::InvalidIdentifier { opcode, .. }
            | CompileError::LoopMismatch { opcode, .. } => opcode.to_string(),
            CompileError::MacroArgument { kind, .. } => kind.to_string(),
            CompileError::UnterminatedLoop { .. } => Opcode::Loop.to_string(),
            CompileError::MalformedNumber { instruction, .. } => instruction.clone(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            CompileError::SyntaxError { column, msg, .. } => match column {
                Some(col) => format!("column {col}: {msg}"),
                None => msg.clone(),
            },
            CompileError::UnknownInstruction { keyword, .. } => {
                format!("'{keyword}' is not a known instruction or macro")
            }
            CompileError::InvalidArgument {
                opcode, argument, ..
            } => {
                format!("{opcode} does not accept the argument '{argument}'")
            }
            CompileError::InvalidParameter { msg, .. }
            | CompileError::MacroArgument { msg, .. } => msg.clone(),
            CompileError::InvalidIdentifier {
                opcode, identifier, ..
            } => {
                format!("{opcode} does not accept the identifier '{identifier}'")
            }
            CompileError::LoopMismatch { mismatch, .. } => mismatch.to_string(),
            CompileError::UnterminatedLoop { .. } => {
                "LOOP has no matching DO_LOOP before the end of the program".to_string()
            }
            CompileError::MalformedNumber { token, .. } => {
                format!("'{token}' is not a valid number")
            }
        }
    }

    /// Express this error in the same form as a warning.
    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic {
            line: self.line(),
            instruction: self.instruction(),
            message: self.message(),
            severity: Severity::Fatal,
        }
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diagnostic())
    }
}

impl Error for CompileError {}

#[test]
fn test_warning_display() {
    let w = Diagnostic::warning(3, "INC", "identifier 'x' is ignored".to_string());
    assert_eq!(w.to_string(), "line 3: INC: warning: identifier 'x' is ignored");
}

#[test]
fn test_error_display() {
    let e = CompileError::LoopMismatch {
        line: 7,
        opcode: Opcode::End,
        mismatch: LoopMismatch::FewerDoLoopThanLoop,
    };
    assert_eq!(e.to_string(), "line 7: END: error: fewer DO_LOOP than LOOP");
    assert_eq!(e.diagnostic().severity, Severity::Fatal);
}

#[test]
fn test_syntax_error_without_instruction() {
    let e = CompileError::SyntaxError {
        line: 2,
        column: Some(5),
        msg: "unexpected '/'".to_string(),
    };
    assert_eq!(e.to_string(), "line 2: error: column 5: unexpected '/'");
}
