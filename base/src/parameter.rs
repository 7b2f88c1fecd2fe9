//! The sequencer's instruction word carries a 48-bit unsigned
//! parameter.  `Unsigned48Bit` represents it.  Values are stored in
//! a `u64` whose top 16 bits are always zero.
//!
//! Arithmetic on parameters is modular: the hardware only ever sees
//! the low 48 bits, so anything computed at a greater width (for
//! example a clock-frequency multiplication) is reduced modulo 2^48
//! with [`Unsigned48Bit::from_masked`] or
//! [`Unsigned48Bit::from_i128_wrapping`].

use std::fmt::{self, Debug, Display, Formatter, LowerHex};
use std::ops::Not;

use super::error::ParameterRangeError;


#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Unsigned48Bit {
    pub(crate) bits: u64,
}

/// This macro implements conversions from native types to
/// Unsigned48Bit which are always possible (e.g. From<u32>).
macro_rules! from_native_type_to_self {
    ($($from:ty)*) => {
        $(
            impl From<$from> for Unsigned48Bit {
                fn from(n: $from) -> Self {
                    Self {
                        bits: n.into(),
                    }
                }
            }
        )*
    }
}

from_native_type_to_self!(u8 u16 u32);

impl TryFrom<u64> for Unsigned48Bit {
    type Error = ParameterRangeError;

    fn try_from(n: u64) -> Result<Self, ParameterRangeError> {
        if n > Self::VALUE_BITS {
            Err(ParameterRangeError::TooLarge(n))
        } else {
            Ok(Self { bits: n })
        }
    }
}

impl TryFrom<i64> for Unsigned48Bit {
    type Error = ParameterRangeError;

    fn try_from(n: i64) -> Result<Self, ParameterRangeError> {
        match u64::try_from(n) {
            Ok(unsigned) => Self::try_from(unsigned),
            Err(_) => Err(ParameterRangeError::Negative(n)),
        }
    }
}

impl Unsigned48Bit {
    pub const BITS: u32 = 48;
    const MODULUS: u64 = 1 << Self::BITS;
    const VALUE_BITS: u64 = Self::MODULUS - 1;

    pub const MAX: Self = Self {
        bits: Self::VALUE_BITS,
    };
    pub const ZERO: Self = Self { bits: 0 };
    pub const ONE: Self = Self { bits: 1 };

    // Out-of-range values fail at compile time.  It's pub so that it
    // can be used in u48!().
    pub const fn new<const N: u64>() -> Unsigned48Bit {
        struct Helper<const M: u64>;
        impl<const M: u64> Helper<M> {
            const U: Unsigned48Bit = {
                if M > Unsigned48Bit::VALUE_BITS {
                    panic!("input value is out of range")
                } else {
                    Unsigned48Bit { bits: M }
                }
            };
        }
        Helper::<N>::U
    }

    /// Keep only the low 48 bits of `n`.
    pub const fn from_masked(n: u64) -> Unsigned48Bit {
        Unsigned48Bit {
            bits: n & Self::VALUE_BITS,
        }
    }

    /// Reduce `n` modulo 2^48.  Negative values wrap around in the
    /// two's-complement manner, so -1 becomes [`Unsigned48Bit::MAX`].
    pub fn from_i128_wrapping(n: i128) -> Unsigned48Bit {
        let reduced = n.rem_euclid(i128::from(Self::MODULUS));
        // rem_euclid guarantees 0 <= reduced < 2^48.
        Unsigned48Bit {
            bits: reduced as u64,
        }
    }

    pub const fn bits(&self) -> u64 {
        self.bits
    }

    pub const fn is_zero(&self) -> bool {
        self.bits == 0
    }

    /// Shift left by `n` places, discarding bits shifted beyond bit
    /// 47.  Shifting by 48 or more places yields zero.
    #[must_use]
    pub const fn shifted_left(self, n: u32) -> Unsigned48Bit {
        if n >= Self::BITS {
            Self::ZERO
        } else {
            Self::from_masked(self.bits << n)
        }
    }

    /// Shift right by `n` places.  Shifting by 48 or more places
    /// yields zero.
    #[must_use]
    pub const fn shifted_right(self, n: u32) -> Unsigned48Bit {
        if n >= Self::BITS {
            Self::ZERO
        } else {
            Unsigned48Bit {
                bits: self.bits >> n,
            }
        }
    }

    /// The parameter as it appears in an instruction word: six
    /// bytes, most significant first.
    pub const fn to_be_bytes(self) -> [u8; 6] {
        let b = self.bits.to_be_bytes();
        [b[2], b[3], b[4], b[5], b[6], b[7]]
    }

    pub const fn from_be_bytes(bytes: [u8; 6]) -> Unsigned48Bit {
        Unsigned48Bit {
            bits: u64::from_be_bytes([
                0, 0, bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5],
            ]),
        }
    }
}

impl From<Unsigned48Bit> for u64 {
    fn from(n: Unsigned48Bit) -> u64 {
        n.bits
    }
}

impl From<Unsigned48Bit> for i64 {
    fn from(n: Unsigned48Bit) -> i64 {
        // The top 16 bits are always clear, so this cannot overflow.
        n.bits as i64
    }
}

impl From<Unsigned48Bit> for i128 {
    fn from(n: Unsigned48Bit) -> i128 {
        i128::from(n.bits)
    }
}

impl Not for Unsigned48Bit {
    type Output = Unsigned48Bit;

    fn not(self) -> Unsigned48Bit {
        Unsigned48Bit::from_masked(!self.bits)
    }
}

impl Debug for Unsigned48Bit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#014x}", self.bits)
    }
}

impl Display for Unsigned48Bit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.bits, f)
    }
}

impl LowerHex for Unsigned48Bit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        LowerHex::fmt(&self.bits, f)
    }
}
