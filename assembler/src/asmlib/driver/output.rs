use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{event, Level};

use super::super::listing::Listing;
use super::super::types::{AssemblerFailure, IoAction, IoFailed, IoTarget};

fn write_failure(target: IoTarget) -> impl FnOnce(io::Error) -> AssemblerFailure {
    move |e| {
        AssemblerFailure::Io(IoFailed {
            action: IoAction::Write,
            target,
            error: e,
        })
    }
}

/// Write the compiled program to `output_file_name`, replacing
/// anything already there.
pub(super) fn write_program(output_file_name: &Path, bytes: &[u8]) -> Result<(), AssemblerFailure> {
    let target = IoTarget::File(output_file_name.to_path_buf());
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(output_file_name)
        .map_err(write_failure(target.clone()))?;
    let mut writer = BufWriter::new(file);
    let mut inner = || -> Result<(), io::Error> {
        writer.write_all(bytes)?;
        writer.flush()
    };
    inner().map_err(write_failure(target))?;
    event!(
        Level::DEBUG,
        "wrote {} bytes to {}",
        bytes.len(),
        output_file_name.display()
    );
    Ok(())
}

pub(super) fn write_listing(listing: &Listing) -> Result<(), AssemblerFailure> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write!(handle, "{listing}")
        .and_then(|()| handle.flush())
        .map_err(write_failure(IoTarget::Stdout))
}
