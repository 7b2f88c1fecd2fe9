//! The prelude exports the structs which are useful in representing
//! sequencer instructions.  Providing this prelude is the main
//! purpose of the base crate.
pub use super::error::ParameterRangeError;
pub use super::instruction::*;
pub use super::parameter::Unsigned48Bit;
pub use super::u48;
