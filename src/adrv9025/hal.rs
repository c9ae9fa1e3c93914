//! ADRV9025 SPI transport: transaction packing, hardware read-modify-write
//! and retries.
//!
//! A plain register access is one 3-byte frame. A masked write without a
//! read goes through the HW-RMW engine: four frames loading the target
//! address, mask and data into the staging registers (12 bytes).

use embedded_hal::{
    digital::v2::OutputPin,
    blocking::spi::{Transfer, Write},
};

use crate::errors::*;
use crate::spi::{frame, FRAME_LEN};

use super::device::Adrv9025;

/// Plain register access frame
pub const SPI_BYTES: usize = FRAME_LEN;

/// HW-RMW masked write sequence
pub const HW_RMW_BYTES: usize = 4 * FRAME_LEN;

/// Largest SPI transaction
pub const SPI_ARRAY_SIZE: usize = 255;

/// Attempts per SPI transaction
pub const SPI_RETRIES: usize = 3;

/// HW-RMW staging registers
pub const HW_RMW_LO_ADDR: u16 = 0x113;
pub const HW_RMW_HI_ADDR: u16 = 0x114;
pub const HW_RMW_MASK: u16 = 0x115;
pub const HW_RMW_DATA: u16 = 0x116;

/// Cache word layout: `AAAA_MM_DD`
pub const CACHE_ADDR_SHIFT: u32 = 16;
pub const CACHE_MASK_SHIFT: u32 = 8;


/// Packs a cache word
#[inline]
pub fn cache_word(addr: u16, mask: u8, data: u8) -> u32 {
    ((addr as u32) << CACHE_ADDR_SHIFT) | ((mask as u32) << CACHE_MASK_SHIFT) | data as u32
}

/// Unpacks a cache word into (address, mask, data)
#[inline]
pub fn cache_word_parts(w: u32) -> (u16, u8, u8) {
    ((w >> CACHE_ADDR_SHIFT) as u16, (w >> CACHE_MASK_SHIFT) as u8, w as u8)
}


/// Packed bytes of one SPI transaction
pub struct SpiBuffer {
    data: [u8; SPI_ARRAY_SIZE],
    len: usize,
}

impl SpiBuffer {
    pub fn new() -> Self {
        SpiBuffer { data: [0; SPI_ARRAY_SIZE], len: 0 }
    }

    pub fn as_slice(self: &Self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn len(self: &Self) -> usize {
        self.len
    }

    pub fn is_empty(self: &Self) -> bool {
        self.len == 0
    }

    /// Appends one register access.
    ///
    /// A full mask packs a plain frame. Any other mask packs a HW-RMW
    /// sequence, which is always a write and needs `hw_rmw`.
    pub fn pack(self: &mut Self, addr: u16, mask: u8, data: u8, read: bool, hw_rmw: bool) -> Result<(), Error> {
        if mask == 0xFF {
            return self.push(frame(read, addr, data));
        }

        if !hw_rmw {

            return Err(Error::HwRmwUnavailable);

        }
        if self.len + HW_RMW_BYTES > SPI_ARRAY_SIZE {
            return Err(Error::BufferOverflow);
        }

        self.push(frame(false, HW_RMW_LO_ADDR, addr as u8))?;
        self.push(frame(false, HW_RMW_HI_ADDR, (addr >> 8) as u8))?;
        self.push(frame(false, HW_RMW_MASK, mask))?;
        self.push(frame(false, HW_RMW_DATA, data))
    }

    fn push(self: &mut Self, f: [u8; FRAME_LEN]) -> Result<(), Error> {
        if self.len + FRAME_LEN > SPI_ARRAY_SIZE {
            return Err(Error::BufferOverflow);
        }
        self.data[self.len..self.len + FRAME_LEN].copy_from_slice(&f);
        self.len += FRAME_LEN;
        Ok(())
    }
}


impl<SPI, CS, E> Adrv9025<SPI, CS>
where SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
      CS: OutputPin,
{
    /// Immediate register write
    pub fn spi_byte_write(self: &mut Self, addr: u16, data: u8) -> Result<(), Error> {
        log::debug!("adrv9025 wr {:#06x} <- {:#04x}", addr, data);
        let mut buf = SpiBuffer::new();
        buf.pack(addr, 0xFF, data, false, self.cache.hw_rmw_enabled())?;
        self.write_retry(buf.as_slice())
    }

    /// Immediate register read
    pub fn spi_byte_read(self: &mut Self, addr: u16) -> Result<u8, Error> {
        self.check_readable()?;
        let mut buf = SpiBuffer::new();
        buf.pack(addr, 0xFF, 0, true, self.cache.hw_rmw_enabled())?;
        let mut rx = [0u8; SPI_BYTES];
        self.read_retry(buf.as_slice(), &mut rx)?;
        log::debug!("adrv9025 rd {:#06x} -> {:#04x}", addr, rx[2]);
        Ok(rx[2])
    }

    /// Writes cache words (`AAAA_MM_DD`) in a single transaction
    pub fn spi_cache_write(self: &mut Self, entries: &[u32]) -> Result<(), Error> {
        let mut buf = SpiBuffer::new();
        for w in entries {
            let (addr, mask, data) = cache_word_parts(*w);
            log::debug!("adrv9025 wr {:#06x} <- {:#04x} mask {:#04x}", addr, data, mask);
            buf.pack(addr, mask, data, false, self.cache.hw_rmw_enabled())?;
        }
        if buf.is_empty() {
            return Ok(());
        }
        self.write_retry(buf.as_slice())
    }

    /// Reads the registers of cache words in a single transaction.
    ///
    /// `out` receives the raw bytes clocked in, the value of entry `i`
    /// is `out[3 * i + 2]`.
    pub fn spi_cache_read(self: &mut Self, entries: &[u32], out: &mut [u8]) -> Result<(), Error> {
        self.check_readable()?;
        let mut buf = SpiBuffer::new();
        for w in entries {
            let (addr, _, _) = cache_word_parts(*w);
            buf.pack(addr, 0xFF, 0, true, self.cache.hw_rmw_enabled())?;
        }
        if out.len() < buf.len() {
            return Err(Error::BufferOverflow);
        }
        if buf.is_empty() {
            return Ok(());
        }
        self.read_retry(buf.as_slice(), out)
    }

    /// Writes `value` into the `mask` bits of a register, `value` is
    /// shifted to `start_bit` first.
    ///
    /// Uses the HW-RMW engine when present, else a read followed by a
    /// write (refused when write-only).
    pub fn spi_field_write(self: &mut Self, addr: u16, value: u8, mask: u8, start_bit: u8) -> Result<(), Error> {
        if start_bit > 7 {
            return Err(Error::StartBitRange);
        }
        let bits = (value << start_bit) & mask;

        if self.cache.hw_rmw_enabled() {
            let mut buf = SpiBuffer::new();
            buf.pack(addr, mask, bits, false, true)?;
            self.write_retry(buf.as_slice())
        } else {
            if self.cache.wr_only() {
                return Err(Error::WriteOnly);
            }
            let old = self.spi_byte_read(addr)?;
            self.spi_byte_write(addr, (old & !mask) | bits)
        }
    }

    /// Reads the `mask` bits of a register, right aligned.
    /// Only the low nibble of `start_bit` is used.
    pub fn spi_field_read(self: &mut Self, addr: u16, mask: u8, start_bit: u8) -> Result<u8, Error> {
        let r = self.spi_byte_read(addr)?;
        Ok(((r & mask) as u32 >> (start_bit & 0x0F)) as u8)
    }

    fn check_readable(self: &Self) -> Result<(), Error> {
        if self.cache.wr_only() { Err(Error::WriteOnly) } else { Ok(()) }
    }

    fn write_retry(self: &mut Self, tx: &[u8]) -> Result<(), Error> {
        let mut res = Ok(());
        for attempt in 1..=SPI_RETRIES {
            res = self.bus.write(tx);
            if res.is_ok() {
                break;
            }
            log::warn!("adrv9025 spi write failed, attempt {}", attempt);
        }
        res
    }

    fn read_retry(self: &mut Self, tx: &[u8], rx: &mut [u8]) -> Result<(), Error> {
        let rx = &mut rx[..tx.len()];
        let mut res = Ok(());
        for attempt in 1..=SPI_RETRIES {
            rx.copy_from_slice(tx);
            res = self.bus.write_and_read(rx);
            if res.is_ok() {
                break;
            }
            log::warn!("adrv9025 spi read failed, attempt {}", attempt);
        }
        res
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::adrv9025::{testing::device, CacheConfig};

    #[test]
    fn pack_plain_and_rmw() {
        let mut b = SpiBuffer::new();
        b.pack(0x2034, 0xFF, 0x5A, false, false).unwrap();
        b.pack(0x2034, 0xFF, 0x00, true, false).unwrap();
        assert_eq!(b.as_slice(), &[0x20, 0x34, 0x5A, 0xA0, 0x34, 0x00]);

        let mut b = SpiBuffer::new();
        b.pack(0x2034, 0x03, 0x01, false, true).unwrap();
        assert_eq!(b.as_slice(), &[
            0x01, 0x13, 0x34,
            0x01, 0x14, 0x20,
            0x01, 0x15, 0x03,
            0x01, 0x16, 0x01,
        ]);
    }

    #[test]
    fn pack_rmw_needs_engine() {
        let mut b = SpiBuffer::new();
        assert_eq!(b.pack(0x2034, 0x03, 0x01, false, false), Err(Error::HwRmwUnavailable));
        assert!(b.is_empty());
    }

    #[test]
    fn pack_overflow() {
        let mut b = SpiBuffer::new();
        for _ in 0..SPI_ARRAY_SIZE / SPI_BYTES {
            b.pack(0x10, 0xFF, 0, false, true).unwrap();
        }
        assert_eq!(b.len(), SPI_ARRAY_SIZE);
        assert_eq!(b.pack(0x10, 0xFF, 0, false, true), Err(Error::BufferOverflow));

        let mut b = SpiBuffer::new();
        for _ in 0..(SPI_ARRAY_SIZE - 6) / SPI_BYTES {
            b.pack(0x10, 0xFF, 0, false, true).unwrap();
        }
        assert_eq!(b.pack(0x10, 0x0F, 0, false, true), Err(Error::BufferOverflow));
    }

    #[test]
    fn cache_words() {
        assert_eq!(cache_word(0x2034, 0x03, 0x01), 0x2034_0301);
        assert_eq!(cache_word_parts(0x2034_0301), (0x2034, 0x03, 0x01));
    }

    #[test]
    fn byte_access() {
        let (mut dev, state) = device(CacheConfig::default());
        dev.spi_byte_write(0x1234, 0xA5).unwrap();
        assert_eq!(dev.spi_byte_read(0x1234), Ok(0xA5));
        assert_eq!(state.borrow().transactions[1], vec![0x92, 0x34, 0x00]);
    }

    #[test]
    fn field_write_hw_rmw() {
        let (mut dev, state) = device(CacheConfig::default());
        state.borrow_mut().set_reg(0x2099, 0xF1);
        dev.spi_field_write(0x2099, 0x5, 0xF0, 4).unwrap();
        let st = state.borrow();
        assert_eq!(st.reg(0x2099), 0x51);
        assert_eq!(st.transactions.len(), 1);
        assert!(st.reads().is_empty());
    }

    #[test]
    fn field_write_manual_rmw() {
        let config = CacheConfig { hw_rmw_enabled: false, ..CacheConfig::default() };
        let (mut dev, state) = device(config);
        state.borrow_mut().set_reg(0x2099, 0xF1);
        dev.spi_field_write(0x2099, 0x5, 0xF0, 4).unwrap();
        let st = state.borrow();
        assert_eq!(st.reg(0x2099), 0x51);
        assert_eq!(st.reads(), vec![0x2099]);
        assert_eq!(st.writes(), vec![(0x2099, 0x51)]);
    }

    #[test]
    fn field_write_start_bit() {
        let (mut dev, _state) = device(CacheConfig::default());
        assert_eq!(dev.spi_field_write(0x10, 1, 0x01, 8), Err(Error::StartBitRange));
    }

    #[test]
    fn field_read_ignores_marker() {
        let (mut dev, state) = device(CacheConfig::default());
        state.borrow_mut().set_reg(0x2088, 0xC5);
        assert_eq!(dev.spi_field_read(0x2088, 0xC0, 0xC6), Ok(3));
    }

    #[test]
    fn write_only_refuses_reads() {
        let config = CacheConfig { hw_rmw_enabled: false, wr_only: true, merge_distance: 0 };
        let (mut dev, state) = device(config);
        assert_eq!(dev.spi_byte_read(0x10), Err(Error::WriteOnly));
        assert_eq!(dev.spi_field_read(0x10, 0x01, 0), Err(Error::WriteOnly));
        assert_eq!(dev.spi_field_write(0x10, 1, 0x01, 0), Err(Error::WriteOnly));
        let mut out = [0u8; 3];
        assert_eq!(dev.spi_cache_read(&[0x0010_FF00], &mut out), Err(Error::WriteOnly));
        assert!(state.borrow().transactions.is_empty());
    }

    #[test]
    fn cache_transactions() {
        let (mut dev, state) = device(CacheConfig::default());
        state.borrow_mut().set_reg(0x2034, 0xFC);
        dev.spi_cache_write(&[cache_word(0x2033, 0xFF, 0x64), cache_word(0x2034, 0x03, 0x01)]).unwrap();
        assert_eq!(state.borrow().transactions.len(), 1);
        assert_eq!(state.borrow().transactions[0].len(), SPI_BYTES + HW_RMW_BYTES);

        let mut out = [0u8; 6];
        dev.spi_cache_read(&[cache_word(0x2034, 0x03, 0), cache_word(0x2033, 0xFF, 0xC0)], &mut out).unwrap();
        assert_eq!((out[2], out[5]), (0xFD, 0x64));
        assert_eq!(state.borrow().transactions.len(), 2);
    }

    #[test]
    fn retries_failed_transactions() {
        let (mut dev, state) = device(CacheConfig::default());
        state.borrow_mut().fail_next = 2;
        dev.spi_byte_write(0x10, 0x01).unwrap();
        assert_eq!(state.borrow().transactions.len(), 3);
        assert_eq!(state.borrow().reg(0x10), 0x01);

        state.borrow_mut().fail_next = 2;
        state.borrow_mut().set_reg(0x11, 0x42);
        assert_eq!(dev.spi_byte_read(0x11), Ok(0x42));

        state.borrow_mut().fail_next = 3;
        assert_eq!(dev.spi_byte_write(0x10, 0x02), Err(Error::Spi));
        assert_eq!(state.borrow().reg(0x10), 0x01);
    }
}
