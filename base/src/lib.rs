//! The `base` crate defines the sequencer-related things which are
//! useful in both the instruction compiler and other associated
//! tools.  The idea is that if you want to write a disassembler or
//! feed compiled programs to the hardware, you would depend on the
//! base crate but would not need to depend on the compiler library
//! itself.

mod error;
mod parameter;

pub mod instruction;
pub mod prelude;
pub use crate::error::ParameterRangeError;
pub use crate::parameter::Unsigned48Bit;

#[macro_export]
macro_rules! u48 {
    ($n:expr) => {
        $crate::prelude::Unsigned48Bit::new::<{ $n }>()
    };
}

#[test]
fn test_u48() {
    use prelude::Unsigned48Bit;
    let m: Unsigned48Bit = u48!(40_u64);
    let n: Unsigned48Bit = Unsigned48Bit::from(40_u32);
    assert_eq!(m, n);

    let p: Unsigned48Bit = u48!(1u64 << 47);
    let q: Unsigned48Bit =
        Unsigned48Bit::try_from(1u64 << 47).expect("test data should be in range");
    assert_eq!(p, q);
}
