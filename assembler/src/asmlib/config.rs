//! Compiler settings.
//!
//! Settings come from built-in defaults, optionally overridden by a
//! YAML configuration file, optionally overridden again from the
//! command line.  For example:
//!
//! ```yaml
//! clock_frequency: 50000000
//! ```
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{event, Level};

use super::types::{AssemblerFailure, IoAction, IoFailed, IoTarget};

/// The CFO clock runs at 40MHz unless configured otherwise.
pub const DEFAULT_CLOCK_FREQUENCY: u64 = 40_000_000;

/// Settings which affect the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Clock frequency in Hz, used to convert WAIT periods given in
    /// time units into clock ticks.
    pub clock_frequency: u64,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            clock_frequency: DEFAULT_CLOCK_FREQUENCY,
        }
    }
}

/// The contents of a configuration file.  Every setting is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub clock_frequency: Option<u64>,
}

impl ConfigFile {
    /// Parse the text of a configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the text is not valid YAML or names an unknown setting.
    pub fn parse(text: &str) -> Result<ConfigFile, AssemblerFailure> {
        serde_yaml::from_str(text).map_err(|e| AssemblerFailure::BadConfiguration(e.to_string()))
    }

    /// Read a configuration file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or cannot be parsed.
    pub fn load(path: &Path) -> Result<ConfigFile, AssemblerFailure> {
        event!(Level::DEBUG, "reading configuration from {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| {
            AssemblerFailure::Io(IoFailed {
                action: IoAction::Read,
                target: IoTarget::File(path.to_path_buf()),
                error: e,
            })
        })?;
        ConfigFile::parse(&text).map_err(|e| match e {
            AssemblerFailure::BadConfiguration(msg) => {
                AssemblerFailure::BadConfiguration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }
}

/// Combine the defaults, the configuration file (if any) and an
/// explicit clock frequency (if any), later sources taking priority.
///
/// # Errors
///
/// Fails if the resulting clock frequency is zero.
pub fn resolve_options(
    config: Option<&ConfigFile>,
    clock_frequency: Option<u64>,
) -> Result<CompilerOptions, AssemblerFailure> {
    let mut options = CompilerOptions::default();
    if let Some(freq) = config.and_then(|c| c.clock_frequency) {
        options.clock_frequency = freq;
    }
    if let Some(freq) = clock_frequency {
        options.clock_frequency = freq;
    }
    if options.clock_frequency == 0 {
        return Err(AssemblerFailure::BadConfiguration(
            "the clock frequency must not be zero".to_string(),
        ));
    }
    event!(
        Level::DEBUG,
        "using a clock frequency of {} Hz",
        options.clock_frequency
    );
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(
            resolve_options(None, None).unwrap(),
            CompilerOptions {
                clock_frequency: 40_000_000
            }
        );
    }

    #[test]
    fn test_config_file_overrides_default() {
        let config = ConfigFile::parse("clock_frequency: 50000000\n").unwrap();
        assert_eq!(
            resolve_options(Some(&config), None).unwrap().clock_frequency,
            50_000_000
        );
    }

    #[test]
    fn test_command_line_overrides_config_file() {
        let config = ConfigFile::parse("clock_frequency: 50000000\n").unwrap();
        assert_eq!(
            resolve_options(Some(&config), Some(1000))
                .unwrap()
                .clock_frequency,
            1000
        );
    }

    #[test]
    fn test_empty_config_file() {
        let config = ConfigFile::parse("{}").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_unknown_setting_rejected() {
        assert!(matches!(
            ConfigFile::parse("clock_speed: 5\n"),
            Err(AssemblerFailure::BadConfiguration(_))
        ));
    }

    #[test]
    fn test_zero_frequency_rejected() {
        assert!(matches!(
            resolve_options(None, Some(0)),
            Err(AssemblerFailure::BadConfiguration(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            ConfigFile::load(&missing),
            Err(AssemblerFailure::Io(IoFailed {
                action: IoAction::Read,
                ..
            }))
        ));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfo.yaml");
        fs::write(&path, "clock_frequency: 125000000\n").unwrap();
        assert_eq!(
            ConfigFile::load(&path).unwrap().clock_frequency,
            Some(125_000_000)
        );
    }
}
