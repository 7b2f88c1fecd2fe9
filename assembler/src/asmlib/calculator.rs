//! Computes the parameter value which is actually encoded into each
//! instruction.
//!
//! Mostly the encoded value is just the parameter written in the
//! source.  The exceptions are WAIT (whose parameter may be given in
//! physical time units and has to be converted to clock ticks),
//! DO_LOOP (whose parameter is the distance back to the matching
//! LOOP) and a few sentinel forms such as `WAIT NEXT`.
use base::prelude::{Opcode, Unsigned48Bit};

use super::config::CompilerOptions;
use super::decoder::InstructionRecord;
use super::diagnostics::{warn, CompileError, Diagnostic, LoopMismatch};
use super::loopstack::LoopStack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeUnit {
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl TimeUnit {
    fn from_identifier(identifier: &str) -> Option<TimeUnit> {
        match identifier {
            "sec" => Some(TimeUnit::Seconds),
            "ms" => Some(TimeUnit::Milliseconds),
            "us" => Some(TimeUnit::Microseconds),
            "ns" => Some(TimeUnit::Nanoseconds),
            _ => None,
        }
    }

    fn per_second(self) -> i128 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Milliseconds => 1_000,
            TimeUnit::Microseconds => 1_000_000,
            TimeUnit::Nanoseconds => 1_000_000_000,
        }
    }
}

/// The parameter as written in the source.  Values too wide for the
/// instruction word are truncated to their low 48 bits, with a
/// warning.
fn written_parameter(
    record: &InstructionRecord,
    warnings: &mut Vec<Diagnostic>,
) -> Unsigned48Bit {
    match Unsigned48Bit::try_from(record.parameter) {
        Ok(value) => value,
        Err(e) => {
            let truncated = Unsigned48Bit::from_i128_wrapping(i128::from(record.parameter));
            warn(
                warnings,
                record.line,
                record.mnemonic(),
                format!("{e}; encoding {truncated:#x} instead"),
            );
            truncated
        }
    }
}

fn wait_ticks(
    record: &InstructionRecord,
    options: &CompilerOptions,
    warnings: &mut Vec<Diagnostic>,
) -> Unsigned48Bit {
    match record.identifier.as_deref() {
        None if record.argument_is("NEXT") => Unsigned48Bit::MAX,
        None => Unsigned48Bit::ONE,
        Some(identifier) => match TimeUnit::from_identifier(identifier) {
            None => written_parameter(record, warnings),
            Some(unit) => {
                // A u64 times an i64 always fits in an i128.
                let scaled = i128::from(options.clock_frequency) * i128::from(record.parameter);
                let ticks = scaled / unit.per_second();
                if unit == TimeUnit::Nanoseconds && scaled % unit.per_second() != 0 {
                    let tick_ns = 1.0e9 / options.clock_frequency as f64;
                    warn(
                        warnings,
                        record.line,
                        record.mnemonic(),
                        format!(
                            "{} ns is not a multiple of the {tick_ns} ns clock period; waiting {ticks} ticks instead",
                            record.parameter
                        ),
                    );
                }
                Unsigned48Bit::from_i128_wrapping(ticks)
            }
        },
    }
}

/// Work out the value to encode for `record`, updating the stack of
/// open loops as LOOP and DO_LOOP instructions go by.
pub(crate) fn derive_parameter(
    record: &InstructionRecord,
    loops: &mut LoopStack,
    options: &CompilerOptions,
    warnings: &mut Vec<Diagnostic>,
) -> Result<Unsigned48Bit, CompileError> {
    match record.opcode {
        Opcode::Inc => {
            if record.parameter == 0 || record.argument_is("event_tag") {
                Ok(Unsigned48Bit::ONE)
            } else {
                Ok(written_parameter(record, warnings))
            }
        }
        Opcode::Wait => Ok(wait_ticks(record, options, warnings)),
        Opcode::Loop => {
            loops.push(record.line);
            Ok(written_parameter(record, warnings))
        }
        Opcode::DoLoop => match loops.pop() {
            Some(start) => Ok(Unsigned48Bit::from(record.line.saturating_sub(start))),
            None => Err(CompileError::LoopMismatch {
                line: record.line,
                opcode: record.opcode,
                mismatch: LoopMismatch::MoreDoLoopThanLoop,
            }),
        },
        Opcode::End => {
            if loops.is_empty() {
                Ok(Unsigned48Bit::ZERO)
            } else {
                Err(CompileError::LoopMismatch {
                    line: record.line,
                    opcode: record.opcode,
                    mismatch: LoopMismatch::FewerDoLoopThanLoop,
                })
            }
        }
        Opcode::DataRequest => {
            if record.argument_is("CURRENT") {
                Ok(Unsigned48Bit::MAX)
            } else {
                Ok(written_parameter(record, warnings))
            }
        }
        Opcode::Noop
        | Opcode::Start
        | Opcode::Set
        | Opcode::And
        | Opcode::Or
        | Opcode::Repeat => Ok(written_parameter(record, warnings)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base::u48;

    fn record(
        opcode: Opcode,
        argument: Option<&str>,
        parameter: i64,
        identifier: Option<&str>,
        line: u32,
    ) -> InstructionRecord {
        InstructionRecord {
            opcode,
            argument: argument.map(str::to_string),
            parameter,
            identifier: identifier.map(str::to_string),
            line,
            synthetic: false,
        }
    }

    fn derive(r: &InstructionRecord) -> (Result<Unsigned48Bit, CompileError>, Vec<Diagnostic>) {
        let mut loops = LoopStack::default();
        let mut warnings = Vec::new();
        let result = derive_parameter(r, &mut loops, &CompilerOptions::default(), &mut warnings);
        (result, warnings)
    }

    fn derive_ok(r: &InstructionRecord) -> Unsigned48Bit {
        match derive(r).0 {
            Ok(value) => value,
            Err(e) => panic!("unexpected error for {r:?}: {e}"),
        }
    }

    #[test]
    fn test_inc() {
        assert_eq!(derive_ok(&record(Opcode::Inc, None, 0, None, 1)), u48!(1));
        assert_eq!(
            derive_ok(&record(Opcode::Inc, Some("event_tag"), 9, None, 1)),
            u48!(1)
        );
        assert_eq!(
            derive_ok(&record(Opcode::Inc, Some("event_by"), 9, None, 1)),
            u48!(9)
        );
    }

    #[test]
    fn test_wait_without_unit() {
        assert_eq!(
            derive_ok(&record(Opcode::Wait, Some("period"), 500, None, 1)),
            u48!(1)
        );
        assert_eq!(
            derive_ok(&record(Opcode::Wait, Some("NEXT"), 0, None, 1)),
            Unsigned48Bit::MAX
        );
    }

    #[test]
    fn test_wait_units() {
        // The default clock runs at 40MHz.
        let cases: &[(&str, i64, u64)] = &[
            ("sec", 2, 80_000_000),
            ("ms", 2, 80_000),
            ("us", 3, 120),
            ("ns", 100, 4),
            ("cycles", 17, 17),
        ];
        for (unit, parameter, expected) in cases {
            assert_eq!(
                derive_ok(&record(Opcode::Wait, Some("period"), *parameter, Some(*unit), 1)),
                Unsigned48Bit::from_masked(*expected),
                "WAIT period={parameter} {unit}"
            );
        }
    }

    #[test]
    fn test_wait_inexact_nanoseconds() {
        let (result, warnings) = derive(&record(Opcode::Wait, Some("period"), 30, Some("ns"), 6));
        assert_eq!(result, Ok(u48!(1)));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 6);
        assert!(
            warnings[0].message.contains("25 ns"),
            "unexpected message {}",
            warnings[0].message
        );

        let (_, warnings) = derive(&record(Opcode::Wait, Some("period"), 75, Some("ns"), 6));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_wait_uses_configured_clock() {
        let options = CompilerOptions {
            clock_frequency: 1_000,
        };
        let mut loops = LoopStack::default();
        let mut warnings = Vec::new();
        let r = record(Opcode::Wait, Some("period"), 3, Some("sec"), 1);
        assert_eq!(
            derive_parameter(&r, &mut loops, &options, &mut warnings),
            Ok(u48!(3000))
        );
    }

    #[test]
    fn test_loop_distance() {
        let mut loops = LoopStack::default();
        let mut warnings = Vec::new();
        let options = CompilerOptions::default();
        let outer = record(Opcode::Loop, Some("count"), 2, Some("times"), 1);
        let inner = record(Opcode::Loop, Some("count"), 5, Some("times"), 3);
        let inner_end = record(Opcode::DoLoop, None, 0, None, 6);
        let outer_end = record(Opcode::DoLoop, None, 0, None, 9);
        assert_eq!(
            derive_parameter(&outer, &mut loops, &options, &mut warnings),
            Ok(u48!(2))
        );
        assert_eq!(
            derive_parameter(&inner, &mut loops, &options, &mut warnings),
            Ok(u48!(5))
        );
        assert_eq!(
            derive_parameter(&inner_end, &mut loops, &options, &mut warnings),
            Ok(u48!(3))
        );
        assert_eq!(
            derive_parameter(&outer_end, &mut loops, &options, &mut warnings),
            Ok(u48!(8))
        );
        assert!(loops.is_empty());
    }

    #[test]
    fn test_do_loop_without_loop() {
        assert_eq!(
            derive(&record(Opcode::DoLoop, None, 0, None, 4)).0,
            Err(CompileError::LoopMismatch {
                line: 4,
                opcode: Opcode::DoLoop,
                mismatch: LoopMismatch::MoreDoLoopThanLoop,
            })
        );
    }

    #[test]
    fn test_end_with_open_loop() {
        let mut loops = LoopStack::default();
        loops.push(1);
        let mut warnings = Vec::new();
        assert_eq!(
            derive_parameter(
                &record(Opcode::End, None, 0, None, 5),
                &mut loops,
                &CompilerOptions::default(),
                &mut warnings
            ),
            Err(CompileError::LoopMismatch {
                line: 5,
                opcode: Opcode::End,
                mismatch: LoopMismatch::FewerDoLoopThanLoop,
            })
        );
        assert_eq!(
            derive_ok(&record(Opcode::End, None, 7, Some("x"), 5)),
            Unsigned48Bit::ZERO
        );
    }

    #[test]
    fn test_oversized_parameter_is_truncated_with_a_warning() {
        let oversized = record(Opcode::Set, Some("event_tag"), 0x1_0000_0000_0005, None, 8);
        let (result, warnings) = derive(&oversized);
        assert_eq!(result, Ok(u48!(5)));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 8);
        assert!(
            warnings[0].message.contains("does not fit into a 48-bit parameter"),
            "unexpected message {}",
            warnings[0].message
        );

        let widest = record(Opcode::Set, Some("event_tag"), 0xFFFF_FFFF_FFFF, None, 8);
        let (result, warnings) = derive(&widest);
        assert_eq!(result, Ok(Unsigned48Bit::MAX));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_data_request() {
        assert_eq!(
            derive_ok(&record(Opcode::DataRequest, Some("CURRENT"), 0, None, 1)),
            Unsigned48Bit::MAX
        );
        assert_eq!(
            derive_ok(&record(Opcode::DataRequest, Some("request_tag"), 12, None, 1)),
            u48!(12)
        );
    }
}
