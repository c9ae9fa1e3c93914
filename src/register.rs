//! Typed register / bit-field primitives shared by the SPI drivers

use core::{convert::TryFrom, marker::PhantomData};

use crate::errors::Error;

/// Register with a fixed SPI address
pub trait Register {
    /// Register address (for multi-byte registers, the address of the MSB)
    const ADDR: u16;

    /// Transfer length in bytes
    const LEN: u8 = 1;
}

/// Register marker types
macro_rules! gen_register_marker {
    ($(#[$meta:meta])* $r:ident, $addr:expr) => {
        gen_register_marker!($(#[$meta])* $r, $addr, 1);
    };
    ($(#[$meta:meta])* $r:ident, $addr:expr, $len:expr) => {
        $(#[$meta])*
        #[derive(Debug,Copy,Clone)]
        pub struct $r {}

        impl $crate::register::Register for $r {
            const ADDR: u16 = $addr;
            const LEN: u8 = $len;
        }
    };
}


/// Single register word
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Reg<R> {
    /// Register word, right aligned
    pub w: u32,
    phantom: PhantomData<R>,
}

impl<R> Default for Reg<R> {
    #[inline]
    fn default() -> Self {
        Reg::new(0)
    }
}

/// Bit operations on register words
impl<R> Reg<R> {
    #[inline]
    pub fn new(w: u32) -> Self {
        Reg { w, phantom: PhantomData }
    }

    /// Decodes a bit-field, fails if an enum field holds an unknown encoding.
    #[inline]
    pub fn get<F>(self: &Self) -> Result<F, Error>
    where F: Sized + BitField<R> + TryFrom<u32>,
          Error: From<<F as TryFrom<u32>>::Error>,
    {
        Ok(F::try_from(F::field().extract(self.w))?)
    }

    #[inline]
    pub fn set<F>(mut self: Self, f: F) -> Self
    where F: Sized + BitField<R> + Into<u32>
    {
        self.w = F::field().insert(self.w, f.into());
        self
    }
}


/// Bit-field position within a register word.
///
/// Used directly where the register is only known at run time
/// (channel indexed registers).
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Field {
    pub num_bits: u8,
    pub offset: u8,
}

impl Field {
    pub const fn new(num_bits: u8, offset: u8) -> Self {
        Field { num_bits, offset }
    }

    /// Right aligned mask
    #[inline]
    pub fn mask(self: Self) -> u32 {
        !(0xFFFF_FFFFu32 << self.num_bits)
    }

    /// Mask in register position
    #[inline]
    pub fn reg_mask(self: Self) -> u32 {
        self.mask() << self.offset
    }

    /// Value shifted into register position
    #[inline]
    pub fn bits(self: Self, v: u32) -> u32 {
        (v & self.mask()) << self.offset
    }

    #[inline]
    pub fn extract(self: Self, w: u32) -> u32 {
        (w >> self.offset) & self.mask()
    }

    #[inline]
    pub fn insert(self: Self, w: u32, v: u32) -> u32 {
        (w & !self.reg_mask()) | self.bits(v)
    }
}


/// Bit-field of register `R`
pub trait BitField<R> {
    /// Number of bits in the bit field
    fn num_bits() -> u8;

    /// Offset from 0
    fn offset() -> u8;

    #[inline]
    fn mask() -> u32 {
        Self::field().mask()
    }

    #[inline]
    fn field() -> Field {
        Field::new(Self::num_bits(), Self::offset())
    }
}

/// Generate BitField implementation
macro_rules! gen_bitfield_impl {
    ($r:ty, $n:ident, $nb:tt, $off:tt) => {
        impl $crate::register::BitField<$r> for $n {
            #[inline] fn num_bits() -> u8 { $nb }
            #[inline] fn offset() -> u8 { $off }
        }
    }
}

/// Small bitfield-encoded numbers boilerplate
macro_rules! gen_bitfield_struct {
    ($(#[$meta:meta])*, $r:ty, $n:ident, $v:ty, $nb:tt, $off:tt) => {
        $(#[$meta])*
        #[derive(Debug,Copy,Clone,PartialEq,Eq)]
        pub struct $n(pub $v);

        gen_bitfield_impl!($r, $n, $nb, $off);

        impl From<u32> for $n { #[inline] fn from(x: u32) -> Self { $n(x as $v) } }
        impl From<$n> for u32 { #[inline] fn from(x: $n) -> u32 { x.0 as u32 } }
    };
}

/// Single bit on/off boilerplate
macro_rules! gen_bitfield_flag {
    ($(#[$meta:meta])*, $r:ty, $n:ident, $off:tt) => {
        $(#[$meta])*
        #[derive(Debug,Copy,Clone,PartialEq,Eq)]
        pub struct $n(pub bool);

        gen_bitfield_impl!($r, $n, 1, $off);

        impl From<u32> for $n { #[inline] fn from(x: u32) -> Self { $n(x != 0) } }
        impl From<$n> for u32 { #[inline] fn from(x: $n) -> u32 { x.0 as u32 } }
    };
}

/// Enumerated bitfield boilerplate, unknown encodings fail to decode
macro_rules! gen_bitfield_enum {
    ($(#[$meta:meta])*, $r:ty, $n:ident, $nb:tt, $off:tt,
     { $( $(#[$vmeta:meta])* $v:ident = $x:expr ),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug,Copy,Clone,PartialEq,Eq)]
        pub enum $n {
            $( $(#[$vmeta])* $v = $x ),+
        }

        gen_bitfield_impl!($r, $n, $nb, $off);

        impl core::convert::TryFrom<u32> for $n {
            type Error = $crate::errors::Error;

            #[inline]
            fn try_from(x: u32) -> Result<Self, Self::Error> {
                match x {
                    $( x if x == $x => Ok($n::$v), )+
                    _ => Err($crate::errors::Error::InvalidFieldValue),
                }
            }
        }

        impl From<$n> for u32 { #[inline] fn from(x: $n) -> u32 { x as u32 } }
    };
}
