//! Errors from building parameter words out of native integers.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// A native integer which cannot be used as a 48-bit instruction
/// parameter.  The rejected value is kept for the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterRangeError {
    TooLarge(u64),
    Negative(i64),
}

impl Display for ParameterRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParameterRangeError::TooLarge(n) => {
                write!(f, "{n} (hex {n:#x}) does not fit into a 48-bit parameter")
            }
            ParameterRangeError::Negative(n) => {
                write!(f, "{n} is negative but parameters are unsigned")
            }
        }
    }
}

impl Error for ParameterRangeError {}
