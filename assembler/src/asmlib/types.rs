use std::error::Error;
use std::ffi::OsString;
use std::fmt::{self, Display, Formatter};
use std::io::Error as IoError;
use std::path::PathBuf;

use super::diagnostics::CompileError;

/// Source line numbers count from 1.
pub type LineNumber = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoAction {
    Read,
    Write,
}

impl Display for IoAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoAction::Read => "read",
            IoAction::Write => "write",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoTarget {
    File(PathBuf),
    Stdout,
}

impl Display for IoTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IoTarget::File(name) => write!(f, "file {}", name.display()),
            IoTarget::Stdout => f.write_str("standard output"),
        }
    }
}

#[derive(Debug)]
pub struct IoFailed {
    pub action: IoAction,
    pub target: IoTarget,
    pub error: IoError,
}

impl Display for IoFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let IoFailed {
            action,
            target,
            error,
        } = self;
        write!(f, "failed to {action} {target}: {error}")
    }
}

impl Error for IoFailed {}

/// Everything that can go wrong when compiling a file, as opposed to
/// compiling a string (for which see [`CompileError`]).
#[derive(Debug)]
pub enum AssemblerFailure {
    Io(IoFailed),
    Compile {
        filename: OsString,
        error: CompileError,
    },
    BadConfiguration(String),
}

impl Display for AssemblerFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            AssemblerFailure::Io(e) => write!(f, "I/O error: {e}"),
            AssemblerFailure::Compile { filename, error } => {
                write!(f, "{}: {error}", filename.to_string_lossy())
            }
            AssemblerFailure::BadConfiguration(msg) => {
                write!(f, "bad configuration: {msg}")
            }
        }
    }
}

impl Error for AssemblerFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AssemblerFailure::Io(e) => Some(e),
            AssemblerFailure::Compile { error, .. } => Some(error),
            AssemblerFailure::BadConfiguration(_) => None,
        }
    }
}
