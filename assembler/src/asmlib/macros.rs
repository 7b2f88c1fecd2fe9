//! Macros expand into one or more primitive instructions.
//!
//! There is currently one macro, SLICE, which writes a value into a
//! bit-field of the event window tag:
//!
//! ```text
//! SLICE bitposition=P bitwidth=W event_tag=T
//! ```
//!
//! Bit positions count from 1 (the least significant bit).  The
//! macro clears bits P..P+W-1 of the tag with an AND and then sets
//! them to T with an OR.
use std::fmt::{self, Display, Formatter};

use tracing::{event, Level};

use base::prelude::{Opcode, Unsigned48Bit};

use super::decoder::{parse_number, InstructionRecord, MacroInvocation};
use super::diagnostics::{warn, CompileError, Diagnostic};

/// The largest event tag a SLICE may write.
const MAX_SLICE_EVENT_TAG: i64 = 1536;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKind {
    Slice,
}

impl MacroKind {
    pub(crate) fn from_keyword(keyword: &str) -> Option<MacroKind> {
        match keyword {
            "SLICE" => Some(MacroKind::Slice),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            MacroKind::Slice => "SLICE",
        }
    }

    /// The number of words following the macro keyword.
    pub(crate) fn argument_count(&self) -> usize {
        match self {
            MacroKind::Slice => 6,
        }
    }
}

impl Display for MacroKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SliceArguments {
    /// 1-based position of the least significant bit of the field.
    position: u32,
    width: u32,
    tag: Unsigned48Bit,
}

fn slice_error(invocation: &MacroInvocation, msg: String) -> CompileError {
    CompileError::MacroArgument {
        line: invocation.line,
        kind: invocation.kind,
        msg,
    }
}

fn expect_keyword(
    invocation: &MacroInvocation,
    got: &str,
    expected: &str,
) -> Result<(), CompileError> {
    if got == expected {
        Ok(())
    } else {
        Err(slice_error(
            invocation,
            format!("expected the argument '{expected}' but found '{got}'"),
        ))
    }
}

fn slice_number(
    invocation: &MacroInvocation,
    name: &str,
    token: &str,
) -> Result<i64, CompileError> {
    parse_number(invocation.line, invocation.kind.keyword(), token)
        .map_err(|_| slice_error(invocation, format!("{name} '{token}' is not a valid number")))
}

fn field_bounds(
    invocation: &MacroInvocation,
    name: &str,
    value: i64,
) -> Result<u32, CompileError> {
    match u32::try_from(value) {
        Ok(n) if (1..=Unsigned48Bit::BITS).contains(&n) => Ok(n),
        _ => Err(slice_error(
            invocation,
            format!("{name} {value} is outside the range 1 to {}", Unsigned48Bit::BITS),
        )),
    }
}

/// Check every argument of a SLICE before anything is emitted.
fn slice_arguments(invocation: &MacroInvocation) -> Result<SliceArguments, CompileError> {
    let [position_kw, position, width_kw, width, tag_kw, tag] = invocation.args.as_slice() else {
        return Err(slice_error(
            invocation,
            format!(
                "{} needs {} argument words but {} were given",
                invocation.kind,
                invocation.kind.argument_count(),
                invocation.args.len()
            ),
        ));
    };
    expect_keyword(invocation, position_kw, "bitposition")?;
    let position = field_bounds(
        invocation,
        "bitposition",
        slice_number(invocation, "bitposition", position)?,
    )?;
    expect_keyword(invocation, width_kw, "bitwidth")?;
    let width = field_bounds(
        invocation,
        "bitwidth",
        slice_number(invocation, "bitwidth", width)?,
    )?;
    if position + width - 1 > Unsigned48Bit::BITS {
        return Err(slice_error(
            invocation,
            format!(
                "a field of {width} bits starting at bit {position} does not fit into {} bits",
                Unsigned48Bit::BITS
            ),
        ));
    }
    expect_keyword(invocation, tag_kw, "event_tag")?;
    let tag = slice_number(invocation, "event_tag", tag)?;
    if tag > MAX_SLICE_EVENT_TAG {
        return Err(slice_error(
            invocation,
            format!("event_tag {tag} is larger than the maximum of {MAX_SLICE_EVENT_TAG}"),
        ));
    }
    Ok(SliceArguments {
        position,
        width,
        tag: Unsigned48Bit::from_i128_wrapping(i128::from(tag)),
    })
}

fn synthetic(
    invocation: &MacroInvocation,
    opcode: Opcode,
    value: Unsigned48Bit,
) -> InstructionRecord {
    InstructionRecord {
        opcode,
        argument: None,
        parameter: i64::from(value),
        identifier: None,
        line: invocation.line,
        synthetic: true,
    }
}

fn expand_slice(
    invocation: &MacroInvocation,
    warnings: &mut Vec<Diagnostic>,
) -> Result<Vec<InstructionRecord>, CompileError> {
    let SliceArguments {
        position,
        width,
        tag,
    } = slice_arguments(invocation)?;
    let field_ones: Unsigned48Bit =
        Unsigned48Bit::MAX.shifted_right(Unsigned48Bit::BITS - width);
    if tag > field_ones {
        warn(
            warnings,
            invocation.line,
            invocation.kind.keyword(),
            format!(
                "event_tag {tag} does not fit into {width} bits; the excess bits spill out of the field"
            ),
        );
    }
    let and_mask: Unsigned48Bit = !field_ones.shifted_left(position - 1);
    let or_mask: Unsigned48Bit = tag.shifted_left(position - 1);
    event!(
        Level::DEBUG,
        "line {}: {} expands to AND {and_mask:#x}, OR {or_mask:#x}",
        invocation.line,
        invocation.kind
    );
    Ok(vec![
        synthetic(invocation, Opcode::And, and_mask),
        synthetic(invocation, Opcode::Or, or_mask),
    ])
}

/// Expand a macro invocation into primitive instructions.  Either
/// all of the instructions are returned, or none are.
pub(crate) fn expand(
    invocation: &MacroInvocation,
    warnings: &mut Vec<Diagnostic>,
) -> Result<Vec<InstructionRecord>, CompileError> {
    match invocation.kind {
        MacroKind::Slice => expand_slice(invocation, warnings),
    }
}
