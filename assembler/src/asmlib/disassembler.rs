//! Convert a binary program back into instructions.
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use base::prelude::{DisassemblyFailure, Instruction, INSTRUCTION_BYTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisassemblyError {
    /// The input length is not a multiple of the instruction size;
    /// `count` bytes are left over starting at `offset`.
    TrailingBytes { offset: usize, count: usize },
    /// The word at `offset` is not a valid instruction.
    BadWord {
        offset: usize,
        failure: DisassemblyFailure,
    },
}

impl Display for DisassemblyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DisassemblyError::TrailingBytes { offset, count } => write!(
                f,
                "{count} trailing bytes at offset {offset:#x} do not form a whole instruction"
            ),
            DisassemblyError::BadWord { offset, failure } => {
                write!(f, "bad instruction at offset {offset:#x}: {failure}")
            }
        }
    }
}

impl Error for DisassemblyError {}

/// Decode a binary program.
///
/// # Errors
///
/// Fails on the first word which is not a valid instruction, or if
/// the input does not hold a whole number of instructions.
pub fn disassemble(bytes: &[u8]) -> Result<Vec<Instruction>, DisassemblyError> {
    let chunks = bytes.chunks_exact(INSTRUCTION_BYTES);
    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        return Err(DisassemblyError::TrailingBytes {
            offset: bytes.len() - remainder.len(),
            count: remainder.len(),
        });
    }
    chunks
        .enumerate()
        .map(|(n, chunk)| {
            let offset = n * INSTRUCTION_BYTES;
            <&[u8; INSTRUCTION_BYTES]>::try_from(chunk)
                .map_err(|_| DisassemblyError::TrailingBytes {
                    offset,
                    count: chunk.len(),
                })
                .and_then(|word| {
                    Instruction::try_from(word)
                        .map_err(|failure| DisassemblyError::BadWord { offset, failure })
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base::prelude::{Opcode, Unsigned48Bit};

    #[test]
    fn test_disassemble() {
        let bytes = [
            0x01, 0x00, 0, 0, 0, 0, 0, 0x05, //
            0x0A, 0x00, 0, 0, 0, 0x01, 0x38, 0x80, //
        ];
        assert_eq!(
            disassemble(&bytes),
            Ok(vec![
                Instruction::new(Opcode::Start, Unsigned48Bit::from(5_u8)),
                Instruction::new(Opcode::Wait, Unsigned48Bit::from(80_000_u32)),
            ])
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(disassemble(&[]), Ok(vec![]));
    }

    #[test]
    fn test_trailing_bytes() {
        let bytes = [0x0B, 0x00, 0, 0, 0, 0, 0, 0, 0x01, 0x00, 0x00];
        assert_eq!(
            disassemble(&bytes),
            Err(DisassemblyError::TrailingBytes {
                offset: 8,
                count: 3
            })
        );
    }

    #[test]
    fn test_bad_words_report_their_offset() {
        let bytes = [
            0x0B, 0x00, 0, 0, 0, 0, 0, 0, //
            0x0C, 0x00, 0, 0, 0, 0, 0, 0, //
        ];
        assert_eq!(
            disassemble(&bytes),
            Err(DisassemblyError::BadWord {
                offset: 8,
                failure: DisassemblyFailure::InvalidOpcode(0x0C),
            })
        );
        let bytes = [0x03, 0x01, 0, 0, 0, 0, 0, 1];
        assert_eq!(
            disassemble(&bytes),
            Err(DisassemblyError::BadWord {
                offset: 0,
                failure: DisassemblyFailure::NonZeroReservedByte(0x01),
            })
        );
    }
}
