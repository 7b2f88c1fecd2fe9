//! Per-instruction semantic checks.
//!
//! Each instruction kind accepts a particular set of argument
//! keywords and identifiers, and some of them need a non-zero
//! parameter.  Violations are either fatal or only worth a warning;
//! the rules are written out as one `match` over [`Opcode`] so that
//! adding an opcode forces a decision about how to check it.
use base::prelude::Opcode;

use super::decoder::InstructionRecord;
use super::diagnostics::{warn, CompileError, Diagnostic};

/// Units accepted after a WAIT parameter.
const WAIT_UNITS: &[&str] = &["cycles", "ns", "us", "ms", "sec"];

fn allow_arguments(record: &InstructionRecord, allowed: &[&str]) -> Result<(), CompileError> {
    match record.argument.as_deref() {
        None => Ok(()),
        Some(arg) if allowed.contains(&arg) => Ok(()),
        Some(arg) => Err(CompileError::InvalidArgument {
            line: record.line,
            opcode: record.opcode,
            argument: arg.to_string(),
        }),
    }
}

fn require_nonzero_parameter(record: &InstructionRecord) -> Result<(), CompileError> {
    if record.parameter == 0 {
        Err(CompileError::InvalidParameter {
            line: record.line,
            opcode: record.opcode,
            msg: format!("{} needs a non-zero parameter", record.opcode),
        })
    } else {
        Ok(())
    }
}

fn warn_if_parameter_unused(record: &InstructionRecord, warnings: &mut Vec<Diagnostic>) {
    if record.parameter != 0 && record.identifier.is_none() {
        warn(
            warnings,
            record.line,
            record.mnemonic(),
            format!(
                "{} takes no parameter; the value {} is ignored",
                record.opcode, record.parameter
            ),
        );
    }
}

/// Check one instruction.  Fatal problems are returned as an error;
/// anything less serious is appended to `warnings`.
pub(crate) fn validate(
    record: &InstructionRecord,
    warnings: &mut Vec<Diagnostic>,
) -> Result<(), CompileError> {
    match record.opcode {
        Opcode::Noop => Ok(()),
        Opcode::Start => {
            allow_arguments(record, &["event_mode"])?;
            require_nonzero_parameter(record)
        }
        Opcode::DataRequest => {
            allow_arguments(record, &["request_tag", "CURRENT"])?;
            if record.argument_is("CURRENT") {
                Ok(())
            } else {
                require_nonzero_parameter(record)
            }
        }
        Opcode::Inc => {
            allow_arguments(record, &["event_by", "event_tag"])?;
            if let Some(identifier) = record.identifier.as_deref() {
                warn(
                    warnings,
                    record.line,
                    record.mnemonic(),
                    format!("identifier '{identifier}' is ignored"),
                );
            }
            Ok(())
        }
        Opcode::Set | Opcode::And | Opcode::Or => {
            allow_arguments(record, &["event_tag"])?;
            // A macro computes its masks, and an all-zero mask is
            // meaningful there.
            if record.synthetic {
                Ok(())
            } else {
                require_nonzero_parameter(record)
            }
        }
        Opcode::Loop => {
            allow_arguments(record, &["count"])?;
            require_nonzero_parameter(record)?;
            match record.identifier.as_deref() {
                None | Some("times") => Ok(()),
                Some(other) => Err(CompileError::InvalidIdentifier {
                    line: record.line,
                    opcode: record.opcode,
                    identifier: other.to_string(),
                }),
            }
        }
        Opcode::DoLoop => {
            if record.parameter != 0 {
                warn(
                    warnings,
                    record.line,
                    record.mnemonic(),
                    format!(
                        "the jump distance is computed from the matching LOOP; the value {} is ignored",
                        record.parameter
                    ),
                );
            }
            Ok(())
        }
        Opcode::Wait => {
            allow_arguments(record, &["period", "NEXT"])?;
            if let Some(unit) = record.identifier.as_deref() {
                if !WAIT_UNITS.contains(&unit) {
                    warn(
                        warnings,
                        record.line,
                        record.mnemonic(),
                        format!(
                            "'{unit}' is not a known unit (expected one of {}); the parameter is taken as a count of clock ticks",
                            WAIT_UNITS.join(", ")
                        ),
                    );
                }
            }
            Ok(())
        }
        Opcode::Repeat | Opcode::End => {
            warn_if_parameter_unused(record, warnings);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        opcode: Opcode,
        argument: Option<&str>,
        parameter: i64,
        identifier: Option<&str>,
    ) -> InstructionRecord {
        InstructionRecord {
            opcode,
            argument: argument.map(str::to_string),
            parameter,
            identifier: identifier.map(str::to_string),
            line: 10,
            synthetic: false,
        }
    }

    fn check(r: &InstructionRecord) -> (Result<(), CompileError>, Vec<Diagnostic>) {
        let mut warnings = Vec::new();
        let result = validate(r, &mut warnings);
        (result, warnings)
    }

    #[test]
    fn test_start_rules() {
        assert_eq!(
            check(&record(Opcode::Start, Some("event_mode"), 5, None)),
            (Ok(()), vec![])
        );
        assert!(matches!(
            check(&record(Opcode::Start, Some("event_mode"), 0, None)).0,
            Err(CompileError::InvalidParameter { line: 10, .. })
        ));
        assert!(matches!(
            check(&record(Opcode::Start, Some("count"), 5, None)).0,
            Err(CompileError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_data_request_current_allows_zero() {
        assert_eq!(
            check(&record(Opcode::DataRequest, Some("CURRENT"), 0, None)).0,
            Ok(())
        );
        assert!(matches!(
            check(&record(Opcode::DataRequest, Some("request_tag"), 0, None)).0,
            Err(CompileError::InvalidParameter { .. })
        ));
        assert!(matches!(
            check(&record(Opcode::DataRequest, None, 0, None)).0,
            Err(CompileError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_inc_identifier_is_only_a_warning() {
        let (result, warnings) = check(&record(Opcode::Inc, Some("event_by"), 2, Some("x")));
        assert_eq!(result, Ok(()));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 10);
    }

    #[test]
    fn test_logic_operations_need_a_parameter() {
        for opcode in [Opcode::Set, Opcode::And, Opcode::Or] {
            assert!(matches!(
                check(&record(opcode, Some("event_tag"), 0, None)).0,
                Err(CompileError::InvalidParameter { .. })
            ));
            assert!(matches!(
                check(&record(opcode, Some("period"), 1, None)).0,
                Err(CompileError::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn test_synthetic_masks_may_be_zero() {
        let mut r = record(Opcode::And, None, 0, None);
        r.synthetic = true;
        assert_eq!(check(&r), (Ok(()), vec![]));
    }

    #[test]
    fn test_loop_rules() {
        assert_eq!(
            check(&record(Opcode::Loop, Some("count"), 3, Some("times"))),
            (Ok(()), vec![])
        );
        assert!(matches!(
            check(&record(Opcode::Loop, Some("count"), 0, Some("times"))).0,
            Err(CompileError::InvalidParameter { .. })
        ));
        match check(&record(Opcode::Loop, Some("count"), 3, Some("cycles"))).0 {
            Err(CompileError::InvalidIdentifier { identifier, .. }) => {
                assert_eq!(identifier, "cycles");
            }
            other => panic!("expected an invalid identifier error, got {other:?}"),
        }
    }

    #[test]
    fn test_do_loop_parameter_warning() {
        let (result, warnings) = check(&record(Opcode::DoLoop, None, 4, None));
        assert_eq!(result, Ok(()));
        assert_eq!(warnings.len(), 1);
        assert_eq!(check(&record(Opcode::DoLoop, None, 0, None)), (Ok(()), vec![]));
    }

    #[test]
    fn test_wait_rules() {
        for unit in ["cycles", "ns", "us", "ms", "sec"] {
            assert_eq!(
                check(&record(Opcode::Wait, Some("period"), 2, Some(unit))),
                (Ok(()), vec![]),
                "unit {unit} should be accepted silently"
            );
        }
        let (result, warnings) = check(&record(Opcode::Wait, Some("period"), 2, Some("fortnights")));
        assert_eq!(result, Ok(()));
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            check(&record(Opcode::Wait, Some("count"), 2, None)).0,
            Err(CompileError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_end_and_repeat_parameter_warning() {
        for opcode in [Opcode::End, Opcode::Repeat] {
            let (result, warnings) = check(&record(opcode, None, 1, None));
            assert_eq!(result, Ok(()));
            assert_eq!(warnings.len(), 1);
            assert_eq!(check(&record(opcode, None, 1, Some("x"))), (Ok(()), vec![]));
        }
    }
}
