use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use cfoasm::{compile_file, AssemblerFailure, CompileError, CompilerOptions, OutputOptions};

fn get_test_input_file_name(relative_to_manifest: &str) -> PathBuf {
    let mut location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    location.push(relative_to_manifest);
    if location.exists() {
        location
    } else {
        panic!(
            "Cannot find input {relative_to_manifest}: {} does not exist",
            location.display()
        );
    }
}

fn get_temp_output_file_name() -> tempfile::TempPath {
    tempfile::Builder::new()
        .suffix(".bin")
        .tempfile()
        .expect("should be able to create a temporary file")
        .into_temp_path()
}

fn files_are_identical(expected: &OsStr, got: &OsStr) -> Result<(), String> {
    fn must_read(name: &OsStr) -> Vec<u8> {
        let mut file = File::open(name)
            .unwrap_or_else(|e| panic!("should be able to open test file {name:?}: {e}"));
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .unwrap_or_else(|e| panic!("should be able to read test file {name:?}: {e}"));
        contents
    }

    let expected_bytes = must_read(expected);
    let got_bytes = must_read(got);
    if expected_bytes.len() != got_bytes.len() {
        return Err(format!(
            "wrong file length: {:?} is {} bytes but {:?} is {} bytes",
            expected,
            expected_bytes.len(),
            got,
            got_bytes.len()
        ));
    }
    for (offset, (expected_byte, got_byte)) in
        expected_bytes.iter().zip(got_bytes.iter()).enumerate()
    {
        if expected_byte != got_byte {
            return Err(format!(
                "difference at position {offset}: expected byte {expected_byte:#04x} but got {got_byte:#04x}"
            ));
        }
    }
    Ok(())
}

fn compiler_golden_output_test(
    input_relative_path: &str,
    golden_output_relative_path: &str,
) -> Result<(), String> {
    let input = get_test_input_file_name(input_relative_path);
    let golden = get_test_input_file_name(golden_output_relative_path);
    let actual_output = get_temp_output_file_name();

    match compile_file(
        input.as_os_str(),
        &actual_output,
        &CompilerOptions::default(),
        OutputOptions::default(),
    ) {
        Ok(program) => {
            if !program.warnings().is_empty() {
                return Err(format!(
                    "unexpected warnings compiling {input_relative_path}: {:?}",
                    program.warnings()
                ));
            }
            files_are_identical(golden.as_os_str(), actual_output.as_os_str()).map_err(|e| {
                format!(
                    "{} and {} are not identical: {e}",
                    golden.display(),
                    actual_output.display(),
                )
            })
        }
        Err(e) => Err(format!("failed to compile {input_relative_path}: {e}")),
    }
}

#[test]
fn golden_output_compiling_timing_program() {
    compiler_golden_output_test("testdata/timing.cfo", "testdata/timing.bin")
        .expect("actual and golden outputs should have been identical");
}

#[test]
fn unbalanced_loop_fails_to_compile() {
    let input = get_test_input_file_name("testdata/unbalanced.cfo");
    let actual_output = get_temp_output_file_name();
    match compile_file(
        input.as_os_str(),
        &actual_output,
        &CompilerOptions::default(),
        OutputOptions::default(),
    ) {
        Err(AssemblerFailure::Compile { error, .. }) => {
            assert_eq!(error.line(), 4);
            assert!(matches!(error, CompileError::LoopMismatch { .. }));
        }
        Err(other) => panic!("expected a compilation error, got {other}"),
        Ok(program) => panic!("unbalanced program compiled to {:?}", program.bytes()),
    }
}

#[test]
fn missing_input_is_an_io_failure() {
    let actual_output = get_temp_output_file_name();
    let result = compile_file(
        OsStr::new("testdata/does-not-exist.cfo"),
        &actual_output,
        &CompilerOptions::default(),
        OutputOptions::default(),
    );
    assert!(matches!(result, Err(AssemblerFailure::Io(_))));
}
