//! Typed bit-field descriptors and their generic accessors.
//!
//! A field is a newtype carrying its value plus a static description: the
//! register segments it spans (MSB first, offsets from a channel base), its
//! maximum value and an optional channel index. Every access runs through
//! [`Adrv9025::set_at`] / [`Adrv9025::get_at`] and so through the caches.

use embedded_hal::{
    digital::v2::OutputPin,
    blocking::spi::{Transfer, Write},
};

use crate::errors::*;

use super::cache::END_OF_FIELD;
use super::device::Adrv9025;

/// Most register segments a field may span
pub const SEGMENTS_MAX: usize = 8;

/// One register of a bit-field
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Segment {
    /// Register offset from the channel base
    pub offset: u16,
    pub mask: u8,
    /// Lowest bit of `mask`
    pub start: u8,
}

impl Segment {
    /// Covers the whole register
    #[inline]
    pub fn is_full(self: &Self) -> bool {
        self.mask == 0xFF && self.start == 0
    }
}

/// Register block a field lives in
pub trait Channel: Copy {
    fn base(self: Self) -> u16;
}

/// Bit-field descriptor
pub trait Field: Sized + Copy {
    type Channel: Channel;

    /// Registers holding the field, most significant first
    const SEGMENTS: &'static [Segment];

    /// Largest value the field accepts
    const MAX: u64;

    /// (instances, address stride) of channel-indexed fields
    const INDEX: Option<(u8, u16)> = None;

    fn raw(self: Self) -> u64;

    fn from_raw(v: u64) -> Self;
}

/// Field can be read back
pub trait Readable: Field {}

/// Field can be written
pub trait Writable: Field {}


/// Channel base address enum, raw addresses convert with an address check
macro_rules! gen_channel_enum {
    ($(#[$meta:meta])* $n:ident { $( $(#[$vmeta:meta])* $v:ident = $base:expr ),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug,Copy,Clone,PartialEq,Eq)]
        #[repr(u16)]
        pub enum $n {
            $( $(#[$vmeta])* $v = $base ),+
        }

        impl $crate::adrv9025::bitfield::Channel for $n {
            #[inline] fn base(self: Self) -> u16 { self as u16 }
        }

        impl core::convert::TryFrom<u16> for $n {
            type Error = $crate::errors::Error;

            #[inline]
            fn try_from(x: u16) -> Result<Self, Self::Error> {
                match x {
                    $( x if x == $base => Ok($n::$v), )+
                    _ => Err($crate::errors::Error::InvalidAddress),
                }
            }
        }
    };
}

macro_rules! gen_field_access {
    (rw $n:ident) => {
        impl $crate::adrv9025::bitfield::Readable for $n {}
        impl $crate::adrv9025::bitfield::Writable for $n {}
    };
    (ro $n:ident) => {
        impl $crate::adrv9025::bitfield::Readable for $n {}
    };
    (wo $n:ident) => {
        impl $crate::adrv9025::bitfield::Writable for $n {}
    };
}

/// Field table of one channel type.
///
/// ```text
/// bitfields! { Chan;
///     /// doc
///     rw Name: u16 = MAX, [indexed COUNT * STRIDE,] [(offset, mask, start), ...];
/// }
/// ```
macro_rules! bitfields {
    ($c:ty;
     $( $(#[$meta:meta])*
        $access:ident $n:ident : $v:ty = $max:expr,
        $( indexed $count:literal * $stride:literal, )?
        [ $( ($off:expr, $mask:expr, $start:expr) ),+ $(,)? ]; )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug,Copy,Clone,PartialEq,Eq)]
            pub struct $n(pub $v);

            impl $crate::adrv9025::bitfield::Field for $n {
                type Channel = $c;

                const SEGMENTS: &'static [$crate::adrv9025::bitfield::Segment] = &[
                    $( $crate::adrv9025::bitfield::Segment { offset: $off, mask: $mask, start: $start }, )+
                ];

                const MAX: u64 = $max;

                $( const INDEX: Option<(u8, u16)> = Some(($count, $stride)); )?

                #[inline] fn raw(self: Self) -> u64 { self.0 as u64 }
                #[inline] fn from_raw(v: u64) -> Self { $n(v as $v) }
            }

            gen_field_access!($access $n);
        )*
    };
}


/// Address of the first register of a field instance
fn field_address<F: Field>(ch: F::Channel, index: u8) -> Result<u16, Error> {
    #[cfg(feature = "bitfield-addr-check")]
    {
        let count = F::INDEX.map_or(1, |(count, _)| count);
        if index >= count {
            return Err(Error::InvalidChannel);
        }
    }

    let stride = F::INDEX.map_or(0, |(_, stride)| stride);
    Ok(ch.base().wrapping_add((index as u16).wrapping_mul(stride)))
}


impl<SPI, CS, E> Adrv9025<SPI, CS>
where SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
      CS: OutputPin,
{
    /// Writes a field of `ch`
    pub fn set<F: Writable>(self: &mut Self, ch: F::Channel, f: F) -> Result<(), Error> {
        self.set_at(ch, 0, f)
    }

    /// Reads a field of `ch`.
    ///
    /// With the global read cache the read is only queued and the value
    /// returned is 0, see [`Adrv9025::read_cache_flush`].
    pub fn get<F: Readable>(self: &mut Self, ch: F::Channel) -> Result<F, Error> {
        self.get_at(ch, 0)
    }

    /// Writes instance `index` of a channel-indexed field
    pub fn set_at<F: Writable>(self: &mut Self, ch: F::Channel, index: u8, f: F) -> Result<(), Error> {
        log::trace!("adrv9025 set {} {:#06x}[{}]", core::any::type_name::<F>(), ch.base(), index);

        let raw = f.raw();
        #[cfg(feature = "bitfield-value-check")]
        {
            if raw > F::MAX {
                return Err(Error::InvalidParameter);
            }
        }

        let addr = field_address::<F>(ch, index)?;

        self.write_cache_init()?;

        let n = F::SEGMENTS.len();
        for (i, s) in F::SEGMENTS.iter().enumerate() {
            let byte = (raw >> (8 * (n - 1 - i))) as u8;
            let reg = addr.wrapping_add(s.offset);
            if s.is_full() {
                self.byte_write(reg, byte)?;
            } else {
                self.field_write(reg, byte, s.mask, s.start)?;
            }
        }

        self.write_cache_flush()
    }

    /// Reads instance `index` of a channel-indexed field
    pub fn get_at<F: Readable>(self: &mut Self, ch: F::Channel, index: u8) -> Result<F, Error> {
        log::trace!("adrv9025 get {} {:#06x}[{}]", core::any::type_name::<F>(), ch.base(), index);

        let addr = field_address::<F>(ch, index)?;

        self.read_cache_init()?;

        let n = F::SEGMENTS.len().min(SEGMENTS_MAX);
        let mut bytes = [0u8; SEGMENTS_MAX];
        for ((i, s), b) in F::SEGMENTS.iter().enumerate().zip(bytes.iter_mut()) {
            let end = if i == n - 1 { END_OF_FIELD } else { 0 };
            let reg = addr.wrapping_add(s.offset);
            let v = if s.is_full() {
                self.byte_read(reg, end)?
            } else {
                self.field_read(reg, s.mask, s.start | end)?
            };
            *b = v.unwrap_or(0);
        }

        let raw = self.read_assemble_data(&bytes[..n])?;
        Ok(F::from_raw(raw))
    }
}


#[cfg(test)]
mod tests {
    use core::convert::TryFrom;
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::mock::*;
    use crate::adrv9025::{testing, CacheConfig, ReadCacheState, WriteCacheState};

    gen_channel_enum!(Block { A = 0x2000, B = 0x2800 });

    bitfields! { Block;
        rw Wide: u16 = 1023, [(0x34, 0x03, 0), (0x33, 0xFF, 0)];
        rw Nibble: u8 = 15, [(0x99, 0xF0, 4)];
        ro Status: u8 = 1, [(0xA2, 0x01, 0)];
        wo Strobe: u8 = 1, [(0x96, 0x01, 0)];
        rw Lane: u8 = 127, indexed 4 * 1, [(0x5D, 0x7F, 0)];
        rw Word: u32 = 0xFFFF_FFFF, [(0x89, 0xFF, 0), (0x8A, 0xFF, 0), (0x8B, 0xFF, 0), (0x8C, 0xFF, 0)];
    }

    fn device() -> (Adrv9025<FakeSpi, FakePin>, Rc<RefCell<SpiState>>) {
        testing::device(CacheConfig::default())
    }

    #[test]
    fn channel_addresses() {
        assert_eq!(Block::B.base(), 0x2800);
        assert_eq!(Block::try_from(0x2000u16), Ok(Block::A));
        assert_eq!(Block::try_from(0x2400u16), Err(Error::InvalidAddress));
    }

    #[test]
    fn multi_register_field() {
        let (mut dev, state) = device();
        state.borrow_mut().set_reg(0x2034, 0xFC);

        dev.set(Block::A, Wide(0x221)).unwrap();
        assert_eq!(state.borrow().writes(), vec![(0x2034, 0xFE), (0x2033, 0x21)]);
        assert_eq!(dev.get::<Wide>(Block::A), Ok(Wide(0x221)));
    }

    #[test]
    fn shifted_field() {
        let (mut dev, state) = device();
        state.borrow_mut().set_reg(0x2899, 0x03);
        dev.set(Block::B, Nibble(0xA)).unwrap();
        assert_eq!(state.borrow().reg(0x2899), 0xA3);
        assert_eq!(dev.get::<Nibble>(Block::B), Ok(Nibble(0xA)));
        state.borrow_mut().set_reg(0x20A2, 0x03);
        assert_eq!(dev.get::<Status>(Block::A), Ok(Status(1)));
        dev.set(Block::A, Strobe(1)).unwrap();
        assert_eq!(state.borrow().reg(0x2096), 0x01);
    }

    #[test]
    fn word_field() {
        let (mut dev, state) = device();
        dev.set(Block::A, Word(0x1234_5678)).unwrap();
        {
            let st = state.borrow();
            assert_eq!((st.reg(0x2089), st.reg(0x208C)), (0x12, 0x78));
        }
        assert_eq!(dev.get::<Word>(Block::A), Ok(Word(0x1234_5678)));
    }

    #[cfg(feature = "bitfield-value-check")]
    #[test]
    fn value_range() {
        let (mut dev, state) = device();
        assert_eq!(dev.set(Block::A, Nibble(16)), Err(Error::InvalidParameter));
        assert_eq!(dev.set(Block::A, Wide(1024)), Err(Error::InvalidParameter));
        assert!(state.borrow().transactions.is_empty());
    }

    #[test]
    fn indexed_field() {
        let (mut dev, state) = device();
        dev.set_at(Block::B, 2, Lane(0x45)).unwrap();
        assert_eq!(state.borrow().reg(0x285F), 0x45);
        assert_eq!(dev.get_at::<Lane>(Block::B, 2), Ok(Lane(0x45)));
    }

    #[cfg(feature = "bitfield-addr-check")]
    #[test]
    fn index_range() {
        let (mut dev, state) = device();
        assert_eq!(dev.set_at(Block::B, 4, Lane(1)), Err(Error::InvalidChannel));
        assert_eq!(dev.set_at(Block::B, 1, Nibble(1)), Err(Error::InvalidChannel));
        assert_eq!(dev.get_at::<Lane>(Block::A, 4), Err(Error::InvalidChannel));
        assert!(state.borrow().transactions.is_empty());
    }

    #[test]
    fn bitfield_caches_batch_each_access() {
        let (mut dev, state) = device();
        dev.write_cache_enable(WriteCacheState::BitField).unwrap();
        dev.read_cache_enable(ReadCacheState::BitField).unwrap();

        dev.set(Block::A, Wide(0x3FF)).unwrap();
        assert_eq!(state.borrow().transactions.len(), 1);
        assert_eq!(dev.get::<Wide>(Block::A), Ok(Wide(0x3FF)));
        assert_eq!(state.borrow().transactions.len(), 2);
    }

    #[test]
    fn global_caches_defer() {
        let (mut dev, state) = device();
        dev.write_cache_enable(WriteCacheState::Global).unwrap();
        dev.set(Block::A, Nibble(3)).unwrap();
        dev.set(Block::B, Nibble(4)).unwrap();
        assert!(state.borrow().transactions.is_empty());
        dev.write_cache_flush().unwrap();
        assert_eq!(state.borrow().transactions.len(), 1);

        dev.read_cache_enable(ReadCacheState::Global).unwrap();
        assert_eq!(dev.get::<Nibble>(Block::A), Ok(Nibble(0)));
        assert_eq!(dev.get::<Wide>(Block::B), Ok(Wide(0)));
        let mut out = [0u64; 2];
        assert_eq!(dev.read_cache_flush(&mut out), Ok(2));
        assert_eq!(out, [3, 0]);
    }
}
