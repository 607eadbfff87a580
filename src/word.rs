//! Fixed-width unsigned words.
//!
//! Every register and memory cell of the machine is one of these. Arithmetic
//! always reduces modulo 2^bits, and each result remembers whether *that*
//! operation lost anything to the mask. The interpreter reads the flag to
//! derive VF; it is never accumulated across operations.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

macro_rules! word_type {
    ($(#[$meta:meta])* $name:ident, $prim:ty, $bits:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default)]
        pub struct $name {
            value: $prim,
            wrapped: bool,
        }

        #[allow(clippy::should_implement_trait)]
        impl $name {
            pub const BITS: u32 = $bits;
            pub const MAX: $name = $name { value: <$prim>::MAX, wrapped: false };
            pub const ZERO: $name = $name { value: 0, wrapped: false };

            /// mask `raw` to the word width; `wrapped` is set if that changed it
            pub fn new(raw: i64) -> Self {
                let value = raw as $prim;
                $name {
                    value,
                    wrapped: i64::from(value) != raw,
                }
            }

            pub fn value(self) -> $prim {
                self.value
            }

            /// did the operation that produced this value overflow or underflow?
            pub fn wrapped(self) -> bool {
                self.wrapped
            }

            pub fn add(self, rhs: impl Into<$name>) -> Self {
                Self::new(i64::from(self.value) + i64::from(rhs.into().value))
            }

            /// wraps exactly when the minuend is smaller than the subtrahend
            pub fn sub(self, rhs: impl Into<$name>) -> Self {
                Self::new(i64::from(self.value) - i64::from(rhs.into().value))
            }

            pub fn mul(self, rhs: impl Into<$name>) -> Self {
                Self::new(i64::from(self.value) * i64::from(rhs.into().value))
            }

            pub fn shift_left(self, by: u32) -> Self {
                if by >= Self::BITS {
                    return $name {
                        value: 0,
                        wrapped: self.value != 0,
                    };
                }
                Self::new(i64::from(self.value) << by)
            }

            pub fn shift_right(self, by: u32) -> Self {
                $name {
                    value: self.value.checked_shr(by).unwrap_or(0),
                    wrapped: false,
                }
            }

            pub fn and(self, rhs: impl Into<$name>) -> Self {
                Self::new(i64::from(self.value & rhs.into().value))
            }

            pub fn or(self, rhs: impl Into<$name>) -> Self {
                Self::new(i64::from(self.value | rhs.into().value))
            }

            pub fn xor(self, rhs: impl Into<$name>) -> Self {
                Self::new(i64::from(self.value ^ rhs.into().value))
            }

            /// `None` when dividing by zero
            pub fn div(self, rhs: impl Into<$name>) -> Option<Self> {
                let rhs = rhs.into().value;
                self.value.checked_div(rhs).map(|v| Self::new(i64::from(v)))
            }

            /// `None` when dividing by zero
            pub fn rem(self, rhs: impl Into<$name>) -> Option<Self> {
                let rhs = rhs.into().value;
                self.value.checked_rem(rhs).map(|v| Self::new(i64::from(v)))
            }
        }

        impl From<$prim> for $name {
            fn from(value: $prim) -> Self {
                $name { value, wrapped: false }
            }
        }

        impl From<$name> for $prim {
            fn from(word: $name) -> Self {
                word.value
            }
        }

        impl From<$name> for usize {
            fn from(word: $name) -> Self {
                word.value as usize
            }
        }

        // equality and ordering look at the number only, never the flag
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.value == other.value
            }
        }

        impl Eq for $name {}

        impl PartialEq<$prim> for $name {
            fn eq(&self, other: &$prim) -> bool {
                self.value == *other
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.value.cmp(&other.value)
            }
        }

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.value.hash(state);
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self.value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self.value)
            }
        }

        impl fmt::LowerHex for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::LowerHex::fmt(&self.value, f)
            }
        }

        impl fmt::UpperHex for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::UpperHex::fmt(&self.value, f)
            }
        }
    };
}

word_type!(
    /// 8-bit word: general registers, timers, memory cells
    Byte,
    u8,
    8
);

word_type!(
    /// 16-bit word: I, PC, stack entries and instructions
    Short,
    u16,
    16
);

impl Short {
    /// big-endian join, `(high << 8) | low`
    pub fn from_bytes(high: Byte, low: Byte) -> Self {
        Short::from(u16::from_be_bytes([high.value(), low.value()]))
    }

    pub fn high(self) -> Byte {
        Byte::from((self.value() >> 8) as u8)
    }

    pub fn low(self) -> Byte {
        Byte::from(self.value() as u8)
    }
}

impl From<Byte> for Short {
    fn from(byte: Byte) -> Self {
        Short::from(u16::from(byte.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_masks() {
        let b = Byte::new(0x1ff);
        assert_eq!(b.value(), 0xff);
        assert!(b.wrapped());

        let b = Byte::new(0x7f);
        assert_eq!(b.value(), 0x7f);
        assert!(!b.wrapped());

        let s = Short::new(-1);
        assert_eq!(s.value(), 0xffff);
        assert!(s.wrapped());
    }

    #[test]
    fn test_byte_increment_wraps_only_at_max() {
        for raw in 0..=u8::MAX {
            let next = Byte::from(raw).add(1u8);
            assert_eq!(next.wrapped(), raw == 0xff, "wrapped flag for {:#x}", raw);
            assert_eq!(next.value(), raw.wrapping_add(1));
        }
    }

    #[test]
    fn test_short_increment_wraps_only_at_max() {
        for raw in 0..=u16::MAX {
            let next = Short::from(raw).add(1u16);
            assert_eq!(next.wrapped(), raw == 0xffff);
            assert_eq!(next.value(), raw.wrapping_add(1));
        }
    }

    #[test]
    fn test_sub_borrow() {
        let d = Byte::from(5).sub(3u8);
        assert_eq!(d, 2);
        assert!(!d.wrapped());

        let d = Byte::from(3).sub(5u8);
        assert_eq!(d, 0xfe);
        assert!(d.wrapped());

        let d = Byte::from(3).sub(3u8);
        assert_eq!(d, 0);
        assert!(!d.wrapped());
    }

    #[test]
    fn test_flag_is_per_operation() {
        let overflowed = Byte::from(0xff).add(2u8);
        assert!(overflowed.wrapped());
        let next = overflowed.add(1u8);
        assert_eq!(next, 2);
        assert!(!next.wrapped());
    }

    #[test]
    fn test_mul_and_shifts() {
        let m = Byte::from(0x80).mul(2u8);
        assert_eq!(m, 0);
        assert!(m.wrapped());

        let m = Byte::from(0x10).mul(4u8);
        assert_eq!(m, 0x40);
        assert!(!m.wrapped());

        let l = Byte::from(0xc1).shift_left(1);
        assert_eq!(l, 0x82);
        assert!(l.wrapped());

        let r = Byte::from(0x03).shift_right(1);
        assert_eq!(r, 0x01);
        assert!(!r.wrapped());

        assert_eq!(Short::from(0x1234).shift_left(16), 0);
        assert!(Short::from(0x1234).shift_left(16).wrapped());
        assert_eq!(Byte::from(0xff).shift_right(9), 0);
    }

    #[test]
    fn test_bitwise() {
        let a = Byte::from(0b1100);
        assert_eq!(a.and(0b1010u8), 0b1000);
        assert_eq!(a.or(0b1010u8), 0b1110);
        assert_eq!(a.xor(0b1010u8), 0b0110);
    }

    #[test]
    fn test_div_rem() {
        assert_eq!(Byte::from(157).div(10u8), Some(Byte::from(15)));
        assert_eq!(Byte::from(157).rem(10u8), Some(Byte::from(7)));
        assert_eq!(Byte::from(1).rem(0u8), None);
        assert_eq!(Short::from(1).div(0u16), None);
    }

    #[test]
    fn test_equality_ignores_flag() {
        let wrapped = Byte::new(0x100);
        assert!(wrapped.wrapped());
        assert_eq!(wrapped, Byte::from(0));
        assert!(Byte::from(3) < Byte::from(200));
    }

    #[test]
    fn test_short_from_bytes() {
        let s = Short::from_bytes(Byte::from(0x12), Byte::from(0x34));
        assert_eq!(s, 0x1234);
        assert_eq!(s.high(), 0x12);
        assert_eq!(s.low(), 0x34);
        assert_eq!(Short::from(Byte::from(0xab)), 0x00ab);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format!("{}", Byte::from(0x0f)), "0xf");
        assert_eq!(format!("{:04X}", Short::from(0xbeef)), "BEEF");
    }
}
