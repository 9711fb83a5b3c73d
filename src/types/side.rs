// vertex_core/src/types/side.rs

use std::fmt;

/// Order side, stored in a single byte. `Invalid` is the wire sentinel for
/// a record that was never populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Side {
    Invalid = 0,
    Buy = 1,
    Sell = -1,
}

impl Side {
    /// The opposite side; `Invalid` maps to itself.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
            Side::Invalid => Side::Invalid,
        }
    }

    /// Sign multiplier used when comparing aggressor price against resting
    /// price: Buy = +1, Sell = -1, Invalid = 0.
    pub fn sign(&self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
            Side::Invalid => 0,
        }
    }

    pub fn as_i8(&self) -> i8 {
        *self as i8
    }

    pub fn from_i8(value: i8) -> Side {
        match value {
            1 => Side::Buy,
            -1 => Side::Sell,
            _ => Side::Invalid,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
            Side::Invalid => write!(f, "INVALID"),
        }
    }
}
