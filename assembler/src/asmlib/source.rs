//! Representation of the original input.
use super::types::LineNumber;

/// The program text, as an ordered sequence of lines.
#[derive(Debug)]
pub(crate) struct SourceProgram<'s> {
    lines: Vec<&'s str>,
}

impl<'s> SourceProgram<'s> {
    pub(crate) fn new(body: &'s str) -> SourceProgram<'s> {
        SourceProgram {
            lines: body.lines().collect(),
        }
    }

    /// Iterate over the lines of the program, together with their
    /// (1-based) line numbers.
    pub(crate) fn numbered_lines(&self) -> impl Iterator<Item = (LineNumber, &'s str)> + '_ {
        (1..).zip(self.lines.iter().copied())
    }
}

#[test]
fn test_line_numbers_start_at_one() {
    let source = SourceProgram::new("START 1\n\nEND\n");
    let numbered: Vec<(LineNumber, &str)> = source.numbered_lines().collect();
    assert_eq!(numbered, [(1, "START 1"), (2, ""), (3, "END")]);
}

#[test]
fn test_crlf_line_endings() {
    let source = SourceProgram::new("START 1\r\nEND\r\n");
    let numbered: Vec<(LineNumber, &str)> = source.numbered_lines().collect();
    assert_eq!(numbered, [(1, "START 1"), (2, "END")]);
}
