use std::fmt::{self, Display, Formatter};

use base::prelude::Instruction;

use super::types::LineNumber;

/// A human-readable record of what the compiler generated for each
/// source line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Listing {
    lines: Vec<ListingLine>,
}

impl Listing {
    pub(crate) fn push_line(&mut self, line: ListingLine) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[ListingLine] {
        &self.lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLine {
    pub line: LineNumber,
    /// The source text of the line (trimmed).
    pub source: String,
    /// True when the instruction came out of a macro expansion.
    pub synthetic: bool,
    pub instruction: Instruction,
}

impl Display for ListingLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let marker = if self.synthetic { '+' } else { ' ' };
        write!(f, "{:>5}{marker}| {:<40}|", self.line, self.source)?;
        for byte in self.instruction.to_bytes() {
            write!(f, " {byte:02x}")?;
        }
        write!(f, " | {}", self.instruction)
    }
}

impl Display for Listing {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
