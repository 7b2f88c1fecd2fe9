//! Turns the words of a source line into either a primitive
//! instruction or a macro invocation.
//!
//! A primitive instruction line has the shape
//!
//! ```text
//! KEYWORD [ PARAM | ARGUMENT [PARAM] ] [IDENTIFIER]
//! ```
//!
//! where a word beginning with a digit is a parameter and any other
//! word in that position is an argument keyword.  For example
//! `LOOP count=3 times` has the argument keyword `count`, the
//! parameter 3 and the identifier `times`.
use std::sync::LazyLock;

use regex::Regex;

use base::prelude::Opcode;

use super::diagnostics::{warn, CompileError, Diagnostic};
use super::lexer::Word;
use super::macros::MacroKind;
use super::types::LineNumber;


/// One primitive instruction, as written in the source (or as
/// synthesised by a macro).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InstructionRecord {
    pub(crate) opcode: Opcode,
    pub(crate) argument: Option<String>,
    pub(crate) parameter: i64,
    pub(crate) identifier: Option<String>,
    pub(crate) line: LineNumber,
    /// Set for instructions generated by macro expansion.
    pub(crate) synthetic: bool,
}

impl InstructionRecord {
    pub(crate) fn argument_is(&self, keyword: &str) -> bool {
        self.argument.as_deref() == Some(keyword)
    }

    pub(crate) fn mnemonic(&self) -> &'static str {
        self.opcode.mnemonic()
    }
}

/// A macro invocation: the macro keyword is followed by a flat list
/// of alternating keyword and value words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MacroInvocation {
    pub(crate) kind: MacroKind,
    pub(crate) args: Vec<String>,
    pub(crate) line: LineNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Statement {
    Primitive(InstructionRecord),
    Macro(MacroInvocation),
}

const NUMBER_PATTERN: &str = "^(0[xX][0-9a-fA-F]+|[0-9]+)$";

static NUMBER_RX: LazyLock<Regex> = LazyLock::new(|| match Regex::new(NUMBER_PATTERN) {
    Ok(rx) => rx,
    Err(e) => panic!("'{NUMBER_PATTERN}' is not a valid regular expression: {e}"),
});

/// Convert a numeric word.  Decimal and `0x`-prefixed hexadecimal
/// are accepted.
pub(crate) fn parse_number(
    line: LineNumber,
    instruction: &str,
    token: &str,
) -> Result<i64, CompileError> {
    let malformed = || CompileError::MalformedNumber {
        line,
        instruction: instruction.to_string(),
        token: token.to_string(),
    };
    if !NUMBER_RX.is_match(token) {
        return Err(malformed());
    }
    let parsed = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex_digits) => i64::from_str_radix(hex_digits, 16),
        None => token.parse::<i64>(),
    };
    parsed.map_err(|_| malformed())
}

fn warn_about_trailing_words(
    line: LineNumber,
    keyword: &str,
    trailing: &[Word],
    warnings: &mut Vec<Diagnostic>,
) {
    if let Some(first) = trailing.first() {
        let ignored: Vec<&str> = trailing.iter().map(Word::as_str).collect();
        warn(
            warnings,
            line,
            keyword,
            format!(
                "ignoring unexpected text '{}' starting at column {}",
                ignored.join(" "),
                first.column
            ),
        );
    }
}

fn decode_macro(
    line: LineNumber,
    kind: MacroKind,
    rest: &[Word],
    warnings: &mut Vec<Diagnostic>,
) -> Result<Statement, CompileError> {
    let wanted = kind.argument_count();
    if rest.len() < wanted {
        return Err(CompileError::MacroArgument {
            line,
            kind,
            msg: format!(
                "{kind} needs {wanted} argument words but only {} were given",
                rest.len()
            ),
        });
    }
    let (args, trailing) = rest.split_at(wanted);
    warn_about_trailing_words(line, kind.keyword(), trailing, warnings);
    Ok(Statement::Macro(MacroInvocation {
        kind,
        args: args.iter().map(|w| w.text.clone()).collect(),
        line,
    }))
}

fn decode_primitive(
    line: LineNumber,
    opcode: Opcode,
    rest: &[Word],
    warnings: &mut Vec<Diagnostic>,
) -> Result<Statement, CompileError> {
    let mnemonic = opcode.mnemonic();
    let mut words = rest.iter();
    let mut argument: Option<String> = None;
    let mut parameter: i64 = 0;
    match words.next() {
        None => (),
        Some(w) if w.starts_with_digit() => {
            parameter = parse_number(line, mnemonic, w.as_str())?;
        }
        Some(w) => {
            argument = Some(w.text.clone());
            // An argument keyword with no value leaves the parameter
            // at zero, and a following non-numeric word is the
            // identifier (as in `WAIT NEXT cycles`).
            if let Some(value) = words
                .as_slice()
                .first()
                .filter(|v| v.starts_with_digit())
            {
                parameter = parse_number(line, mnemonic, value.as_str())?;
                words.next();
            }
        }
    }
    let identifier: Option<String> = words.next().map(|w| w.text.clone());
    warn_about_trailing_words(line, mnemonic, words.as_slice(), warnings);
    Ok(Statement::Primitive(InstructionRecord {
        opcode,
        argument,
        parameter,
        identifier,
        line,
        synthetic: false,
    }))
}

/// Decode a (non-empty) list of words.
pub(crate) fn decode_line(
    line: LineNumber,
    words: &[Word],
    warnings: &mut Vec<Diagnostic>,
) -> Result<Statement, CompileError> {
    let Some((keyword, rest)) = words.split_first() else {
        return Err(CompileError::SyntaxError {
            line,
            column: None,
            msg: "expected an instruction".to_string(),
        });
    };
    if let Some(kind) = MacroKind::from_keyword(keyword.as_str()) {
        return decode_macro(line, kind, rest, warnings);
    }
    match Opcode::from_mnemonic(keyword.as_str()) {
        Some(opcode) => decode_primitive(line, opcode, rest, warnings),
        None => Err(CompileError::UnknownInstruction {
            line,
            keyword: keyword.text.clone(),
        }),
    }
}
