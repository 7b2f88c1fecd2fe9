//! Binary and symbolic representations of sequencer instructions.
//!
//! A sequencer instruction occupies 8 bytes.  They look like this
//! (byte 0 is the first byte sent to the hardware):
//!
//! |Opcode |Reserved|Parameter            |
//! |-------|--------|---------------------|
//! |1 byte | 1 byte | 6 bytes, big-endian |
//! |  (0)  |  (1)   |       (2-7)         |
//!
//! The reserved byte is always zero.  The parameter is a 48-bit
//! unsigned quantity (see [`Unsigned48Bit`]) whose meaning depends
//! on the opcode: an event tag, a loop count, a number of clock
//! ticks to wait, a backward jump distance, or a bit mask.
//!
//! An instruction stream is just a concatenation of these words;
//! there is no header and no framing beyond the 8-byte instruction
//! boundaries.

use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

#[cfg(test)]
use test_strategy::{proptest, Arbitrary};

use super::parameter::Unsigned48Bit;

/// The number of bytes occupied by a single instruction.
pub const INSTRUCTION_BYTES: usize = 8;

/// The value of byte 1 of every instruction word.
pub const RESERVED_BYTE: u8 = 0x00;

/// The operations understood by the sequencer.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Opcode {
    Noop = 0,
    /// Begin a new event window; the parameter is the event mode.
    Start = 1,
    DataRequest = 2,
    /// Increment the event window tag.
    Inc = 3,
    Set = 4,
    /// Bitwise-AND the event window tag with the parameter.
    And = 5,
    /// Bitwise-OR the event window tag with the parameter.
    Or = 6,
    Loop = 7,
    /// Jump back (by the number of source lines given in the
    /// parameter) to the matching `Loop`.
    DoLoop = 8,
    Repeat = 9,
    /// Wait for the given number of clock ticks.  The all-ones
    /// parameter means "wait for the next event marker".
    Wait = 10,
    End = 11,
}

impl Opcode {
    pub const ALL: [Opcode; 12] = [
        Opcode::Noop,
        Opcode::Start,
        Opcode::DataRequest,
        Opcode::Inc,
        Opcode::Set,
        Opcode::And,
        Opcode::Or,
        Opcode::Loop,
        Opcode::DoLoop,
        Opcode::Repeat,
        Opcode::Wait,
        Opcode::End,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// The keyword which names this operation in source code.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Noop => "NOOP",
            Opcode::Start => "START",
            Opcode::DataRequest => "DATA_REQUEST",
            Opcode::Inc => "INC",
            Opcode::Set => "SET",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Loop => "LOOP",
            Opcode::DoLoop => "DO_LOOP",
            Opcode::Repeat => "REPEAT",
            Opcode::Wait => "WAIT",
            Opcode::End => "END",
        }
    }

    /// Look up an operation by its source keyword.  Keywords are
    /// case-sensitive.
    pub fn from_mnemonic(s: &str) -> Option<Opcode> {
        Opcode::ALL.into_iter().find(|op| op.mnemonic() == s)
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl TryFrom<u8> for Opcode {
    type Error = DisassemblyFailure;
    fn try_from(opcode: u8) -> Result<Opcode, DisassemblyFailure> {
        use Opcode::*;
        match opcode {
            0 => Ok(Noop),
            1 => Ok(Start),
            2 => Ok(DataRequest),
            3 => Ok(Inc),
            4 => Ok(Set),
            5 => Ok(And),
            6 => Ok(Or),
            7 => Ok(Loop),
            8 => Ok(DoLoop),
            9 => Ok(Repeat),
            10 => Ok(Wait),
            11 => Ok(End),
            _ => Err(DisassemblyFailure::InvalidOpcode(opcode)),
        }
    }
}

/// A sequencer instruction: an operation and its (already fully
/// computed) parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Instruction {
    opcode: Opcode,
    parameter: Unsigned48Bit,
}

impl Instruction {
    pub fn new(opcode: Opcode, parameter: Unsigned48Bit) -> Instruction {
        Instruction { opcode, parameter }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn parameter(&self) -> Unsigned48Bit {
        self.parameter
    }

    /// The binary form of the instruction, as sent to the hardware.
    pub fn to_bytes(&self) -> [u8; INSTRUCTION_BYTES] {
        let p = self.parameter.to_be_bytes();
        [
            self.opcode.number(),
            RESERVED_BYTE,
            p[0],
            p[1],
            p[2],
            p[3],
            p[4],
            p[5],
        ]
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.opcode, self.parameter)
    }
}

impl TryFrom<&[u8; INSTRUCTION_BYTES]> for Instruction {
    type Error = DisassemblyFailure;
    fn try_from(word: &[u8; INSTRUCTION_BYTES]) -> Result<Instruction, DisassemblyFailure> {
        let opcode = Opcode::try_from(word[0])?;
        if word[1] != RESERVED_BYTE {
            return Err(DisassemblyFailure::NonZeroReservedByte(word[1]));
        }
        let parameter =
            Unsigned48Bit::from_be_bytes([word[2], word[3], word[4], word[5], word[6], word[7]]);
        Ok(Instruction { opcode, parameter })
    }
}

/// Signals that an 8-byte word could not be converted to an
/// [`Instruction`].
#[derive(PartialEq, Eq, Clone, Copy)]
pub enum DisassemblyFailure {
    /// Byte 0 of the word does not correspond to a known opcode.
    InvalidOpcode(u8),

    /// Byte 1 of the word should be zero but isn't.
    NonZeroReservedByte(u8),
}

impl Debug for DisassemblyFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let value = match self {
            DisassemblyFailure::InvalidOpcode(n) => {
                f.write_str("InvalidOpcode")?;
                n
            }
            DisassemblyFailure::NonZeroReservedByte(n) => {
                f.write_str("NonZeroReservedByte")?;
                n
            }
        };
        write!(f, "({value:#04x})")
    }
}

impl Display for DisassemblyFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DisassemblyFailure::InvalidOpcode(n) => {
                write!(f, "{n:#04x} is not a valid opcode")
            }
            DisassemblyFailure::NonZeroReservedByte(n) => {
                write!(f, "reserved byte should be zero but is {n:#04x}")
            }
        }
    }
}

impl Error for DisassemblyFailure {}

#[test]
fn test_opcode_numbers() {
    for (n, op) in Opcode::ALL.iter().enumerate() {
        assert_eq!(usize::from(op.number()), n);
        assert_eq!(Opcode::try_from(op.number()), Ok(*op));
    }
    assert_eq!(
        Opcode::try_from(12),
        Err(DisassemblyFailure::InvalidOpcode(12))
    );
}

#[test]
fn test_mnemonic_lookup() {
    assert_eq!(Opcode::from_mnemonic("DO_LOOP"), Some(Opcode::DoLoop));
    assert_eq!(Opcode::from_mnemonic("DATA_REQUEST"), Some(Opcode::DataRequest));
    assert_eq!(Opcode::from_mnemonic("do_loop"), None);
    assert_eq!(Opcode::from_mnemonic("SLICE"), None);
    for op in Opcode::ALL {
        assert_eq!(Opcode::from_mnemonic(&op.to_string()), Some(op));
    }
}

#[test]
fn test_start_encoding() {
    let inst = Instruction::new(Opcode::Start, Unsigned48Bit::from(5_u8));
    assert_eq!(inst.to_bytes(), [0x01, 0x00, 0, 0, 0, 0, 0, 0x05]);
}

#[test]
fn test_wait_encoding() {
    let inst = Instruction::new(Opcode::Wait, Unsigned48Bit::from(80000_u32));
    assert_eq!(inst.to_bytes(), [0x0A, 0x00, 0, 0, 0, 0x01, 0x38, 0x80]);
}

#[test]
fn test_reserved_byte_must_be_zero() {
    let word: [u8; 8] = [0x01, 0x10, 0, 0, 0, 0, 0, 0];
    assert_eq!(
        Instruction::try_from(&word),
        Err(DisassemblyFailure::NonZeroReservedByte(0x10))
    );
}

#[test]
fn test_display() {
    let inst = Instruction::new(Opcode::DoLoop, Unsigned48Bit::from(4_u8));
    assert_eq!(inst.to_string(), "DO_LOOP 4");
}

#[cfg(test)]
#[derive(Debug, Arbitrary)]
struct EncodingInput {
    opcode: Opcode,
    #[strategy(0..=0xFFFF_FFFF_FFFF_u64)]
    parameter: u64,
}

#[cfg(test)]
#[proptest]
fn reversible_disassembly(input: EncodingInput) {
    let inst = Instruction::new(input.opcode, Unsigned48Bit::from_masked(input.parameter));
    let bytes = inst.to_bytes();
    assert_eq!(bytes[0], input.opcode.number());
    assert_eq!(bytes[1], RESERVED_BYTE);
    match Instruction::try_from(&bytes) {
        Ok(disassembled) => {
            assert_eq!(disassembled, inst);
        }
        Err(e) => {
            panic!("input {input:?} encoded to {bytes:?} but that could not be disassembled ({e})");
        }
    }
}
