//! Bit-field read and write caches.
//!
//! Write entries are `AAAA_MM_DD` words (address, mask, data), read entries
//! `AAAA_MM_SS` words where the start-bit byte carries [`END_OF_FIELD`] on the
//! last register of a bit-field. Both caches are bounded by what fits in one
//! SPI transaction.

use core::convert::TryFrom;

use embedded_hal::{
    digital::v2::OutputPin,
    blocking::spi::{Transfer, Write},
};

use crate::errors::*;

use super::device::{Adrv9025, CacheConfig};
use super::hal::{cache_word, cache_word_parts, HW_RMW_BYTES, SPI_ARRAY_SIZE, SPI_BYTES};

/// Entries per cache
pub const CACHE_SIZE: usize = SPI_ARRAY_SIZE / SPI_BYTES;

/// Start-bit marker of the last register of a bit-field
pub const END_OF_FIELD: u8 = 0xC0;

/// Start-bit bytes above this carry the end marker
const END_MARKER_MIN: u8 = 0x0C;


#[derive(Debug,Copy,Clone,PartialEq,Eq,PartialOrd,Ord)]
pub enum WriteCacheState {
    /// Every write goes out immediately, masked writes by manual RMW
    Off = 0,
    /// Masked writes go out immediately through the HW-RMW registers
    HwRmw = 1,
    /// Writes of one bit-field go out in a single transaction
    BitField = 2,
    /// Writes are queued until [`Adrv9025::write_cache_flush`]
    Global = 3,
    /// As `Global`, writes to a queued register are merged into its entry
    GlobalMerge = 4,
}

impl TryFrom<u8> for WriteCacheState {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self, Error> {
        match v {
            0 => Ok(WriteCacheState::Off),
            1 => Ok(WriteCacheState::HwRmw),
            2 => Ok(WriteCacheState::BitField),
            3 => Ok(WriteCacheState::Global),
            4 => Ok(WriteCacheState::GlobalMerge),
            _ => Err(Error::InvalidParameter),
        }
    }
}

#[derive(Debug,Copy,Clone,PartialEq,Eq,PartialOrd,Ord)]
pub enum ReadCacheState {
    /// Every read goes out immediately
    Off = 0,
    /// Reads of one bit-field go out in a single transaction
    BitField = 1,
    /// Reads are queued until [`Adrv9025::read_cache_flush`]
    Global = 2,
}

impl TryFrom<u8> for ReadCacheState {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self, Error> {
        match v {
            0 => Ok(ReadCacheState::Off),
            1 => Ok(ReadCacheState::BitField),
            2 => Ok(ReadCacheState::Global),
            _ => Err(Error::InvalidParameter),
        }
    }
}


/// Cache contents and settings of one device
#[derive(Debug,Clone)]
pub struct CacheInfo {
    wr_cache: [u32; CACHE_SIZE],
    wr_idx: usize,
    spi_wr_cnt: usize,
    rd_cache: [u32; CACHE_SIZE],
    rd_idx: usize,
    spi_rd_cnt: usize,
    wr_state: WriteCacheState,
    rd_state: ReadCacheState,
    wr_flush_en: bool,
    merge_distance: usize,
    hw_rmw_enabled: bool,
    wr_only: bool,
}

impl CacheInfo {
    pub fn new(config: CacheConfig) -> Self {
        CacheInfo {
            wr_cache: [0; CACHE_SIZE],
            wr_idx: 0,
            spi_wr_cnt: 0,
            rd_cache: [0; CACHE_SIZE],
            rd_idx: 0,
            spi_rd_cnt: 0,
            wr_state: WriteCacheState::Off,
            rd_state: ReadCacheState::Off,
            wr_flush_en: true,
            merge_distance: config.merge_distance,
            hw_rmw_enabled: config.hw_rmw_enabled,
            wr_only: config.wr_only,
        }
    }

    pub fn hw_rmw_enabled(self: &Self) -> bool {
        self.hw_rmw_enabled
    }

    pub fn wr_only(self: &Self) -> bool {
        self.wr_only
    }

    pub fn wr_state(self: &Self) -> WriteCacheState {
        self.wr_state
    }

    pub fn rd_state(self: &Self) -> ReadCacheState {
        self.rd_state
    }

    pub fn merge_distance(self: &Self) -> usize {
        self.merge_distance
    }

    pub fn flush_enabled(self: &Self) -> bool {
        self.wr_flush_en
    }

    /// Queued write entries
    pub fn write_entries(self: &Self) -> &[u32] {
        &self.wr_cache[..self.wr_idx]
    }

    /// Queued read entries
    pub fn read_entries(self: &Self) -> &[u32] {
        &self.rd_cache[..self.rd_idx]
    }

    /// SPI bytes the queued writes take
    pub fn write_spi_bytes(self: &Self) -> usize {
        self.spi_wr_cnt
    }

    /// SPI bytes the queued reads take
    pub fn read_spi_bytes(self: &Self) -> usize {
        self.spi_rd_cnt
    }

    fn check_write_state(self: &Self, state: WriteCacheState) -> Result<(), Error> {
        if state > WriteCacheState::HwRmw && !self.hw_rmw_enabled && !self.wr_only {
            Err(Error::CacheUnavailable)
        } else {
            Ok(())
        }
    }

    fn take_writes(self: &mut Self) -> ([u32; CACHE_SIZE], usize) {
        let taken = (self.wr_cache, self.wr_idx);
        self.wr_idx = 0;
        self.spi_wr_cnt = 0;
        taken
    }

    fn take_reads(self: &mut Self) -> ([u32; CACHE_SIZE], usize) {
        let taken = (self.rd_cache, self.rd_idx);
        self.rd_idx = 0;
        self.spi_rd_cnt = 0;
        taken
    }
}


impl<SPI, CS, E> Adrv9025<SPI, CS>
where SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
      CS: OutputPin,
{
    /// Selects the write cache state.
    ///
    /// States queuing masked writes need the HW-RMW engine, unless the
    /// interface is write-only. Merging looks back at least one entry.
    pub fn write_cache_enable(self: &mut Self, state: WriteCacheState) -> Result<(), Error> {
        self.cache.check_write_state(state)?;
        if state == WriteCacheState::GlobalMerge && self.cache.merge_distance == 0 {
            self.cache.merge_distance = 1;
        }
        log::debug!("adrv9025 write cache {:?}", state);
        self.cache.wr_state = state;
        Ok(())
    }

    pub fn read_cache_enable(self: &mut Self, state: ReadCacheState) -> Result<(), Error> {
        log::debug!("adrv9025 read cache {:?}", state);
        self.cache.rd_state = state;
        Ok(())
    }

    /// Prepares the read cache for one bit-field access, leftover
    /// per-bit-field entries are read and dropped.
    pub fn read_cache_init(self: &mut Self) -> Result<(), Error> {
        if self.cache.rd_state == ReadCacheState::BitField {
            self.read_cache_flush(&mut [])?;
        }
        Ok(())
    }

    /// Prepares the write cache for one bit-field access.
    ///
    /// Per-bit-field caching sends leftovers and lets the access flush
    /// itself, global caching keeps the access from flushing.
    pub fn write_cache_init(self: &mut Self) -> Result<(), Error> {
        self.cache.check_write_state(self.cache.wr_state)?;
        if self.cache.wr_state == WriteCacheState::BitField {
            self.write_cache_flush()?;
            self.cache.wr_flush_en = true;
        } else {
            self.cache.wr_flush_en = false;
        }
        Ok(())
    }

    /// Writes a whole register through the write cache
    pub fn byte_write(self: &mut Self, addr: u16, val: u8) -> Result<(), Error> {
        let state = self.cache.wr_state;

        if state == WriteCacheState::GlobalMerge {
            let n = self.cache.wr_idx;
            if let Some(e) = self.cache.wr_cache[..n].iter_mut().find(|e| cache_word_parts(**e).0 == addr) {
                *e = cache_word(addr, 0xFF, val);
                return Ok(());
            }
        }

        if state > WriteCacheState::HwRmw {
            self.queue_write(cache_word(addr, 0xFF, val), SPI_BYTES)?;
        }
        if state < WriteCacheState::BitField {
            self.spi_byte_write(addr, val)?;
        }
        Ok(())
    }

    /// Writes `val` shifted to `start_bit` into the `mask` bits of a
    /// register through the write cache.
    ///
    /// Without the HW-RMW engine every state falls back to an immediate
    /// read-modify-write.
    pub fn field_write(self: &mut Self, addr: u16, val: u8, mask: u8, start_bit: u8) -> Result<(), Error> {
        if start_bit > 7 {
            return Err(Error::StartBitRange);
        }

        let mut state = self.cache.wr_state;
        if state > WriteCacheState::Off && !self.cache.hw_rmw_enabled {
            state = WriteCacheState::Off;
        }
        let bits = (val << start_bit) & mask;

        if state == WriteCacheState::GlobalMerge {
            let n = self.cache.wr_idx;
            let from = n.saturating_sub(self.cache.merge_distance);
            if let Some(e) = self.cache.wr_cache[from..n].iter_mut().find(|e| cache_word_parts(**e).0 == addr) {
                let (_, old_mask, old_data) = cache_word_parts(*e);
                *e = cache_word(addr, old_mask | mask, (old_data & !mask) | bits);
                return Ok(());
            }
        }

        match state {
            WriteCacheState::Off => {
                if self.cache.wr_only {
                    return Err(Error::WriteOnly);
                }
                let old = self.spi_byte_read(addr)?;
                self.spi_byte_write(addr, (old & !mask) | bits)
            },
            WriteCacheState::HwRmw => self.spi_cache_write(&[cache_word(addr, mask, bits)]),
            _ => self.queue_write(cache_word(addr, mask, bits), HW_RMW_BYTES),
        }
    }

    /// Reads a whole register through the read cache.
    ///
    /// `end` is [`END_OF_FIELD`] on the last register of a bit-field.
    /// Returns `None` when the read was queued.
    pub fn byte_read(self: &mut Self, addr: u16, end: u8) -> Result<Option<u8>, Error> {
        if self.cache.wr_only {
            return Err(Error::WriteOnly);
        }
        if self.cache.rd_state > ReadCacheState::Off {
            self.queue_read(cache_word(addr, 0xFF, end))?;
            Ok(None)
        } else {
            self.spi_byte_read(addr).map(Some)
        }
    }

    /// Reads the `mask` bits of a register through the read cache.
    ///
    /// `start_bit` may carry [`END_OF_FIELD`]. Returns `None` when the read
    /// was queued.
    pub fn field_read(self: &mut Self, addr: u16, mask: u8, start_bit: u8) -> Result<Option<u8>, Error> {
        if self.cache.wr_only {
            return Err(Error::WriteOnly);
        }
        if self.cache.rd_state > ReadCacheState::Off {
            self.queue_read(cache_word(addr, mask, start_bit))?;
            Ok(None)
        } else {
            self.spi_field_read(addr, mask, start_bit).map(Some)
        }
    }

    /// Value of a bit-field read through the read cache.
    ///
    /// `bytes` are the immediate reads, MSB first, used when the read cache
    /// is off. Global caching returns 0, values come from
    /// [`Adrv9025::read_cache_flush`].
    pub fn read_assemble_data(self: &mut Self, bytes: &[u8]) -> Result<u64, Error> {
        match self.cache.rd_state {
            ReadCacheState::Off => Ok(bytes.iter().fold(0u64, |v, b| (v << 8) | *b as u64)),
            ReadCacheState::BitField => {
                let mut v = [0u64; 1];
                self.read_cache_flush(&mut v)?;
                Ok(v[0])
            },
            ReadCacheState::Global => Ok(0),
        }
    }

    /// Reads every queued register in one transaction and assembles the
    /// bit-field values into `out` in queue order.
    ///
    /// Returns the number of bit-fields read, values that don't fit in
    /// `out` are dropped.
    pub fn read_cache_flush(self: &mut Self, out: &mut [u64]) -> Result<usize, Error> {
        if self.cache.wr_only {
            return Err(Error::WriteOnly);
        }
        if self.cache.spi_rd_cnt > SPI_ARRAY_SIZE {
            return Err(Error::BufferOverflow);
        }

        let (entries, n) = self.cache.take_reads();
        if n == 0 {
            return Ok(0);
        }

        let mut rx = [0u8; SPI_ARRAY_SIZE];
        self.spi_cache_read(&entries[..n], &mut rx[..n * SPI_BYTES])?;

        let mut count = 0;
        let mut value = 0u64;
        for (i, e) in entries[..n].iter().enumerate() {
            let (_, mask, mut start) = cache_word_parts(*e);
            let end = start > END_MARKER_MIN;
            if end {
                start &= !END_OF_FIELD;
            }
            if start > 7 {
                return Err(Error::StartBitRange);
            }

            value = (value << 8) | ((rx[i * SPI_BYTES + 2] & mask) >> start) as u64;
            if end {
                if let Some(slot) = out.get_mut(count) {
                    *slot = value;
                }
                count += 1;
                value = 0;
            }
        }
        Ok(count)
    }

    /// Sends every queued write in one transaction unless a bit-field access
    /// in progress holds the flush back. Flushing is enabled afterwards.
    pub fn write_cache_flush(self: &mut Self) -> Result<(), Error> {
        if self.cache.spi_wr_cnt > SPI_ARRAY_SIZE {
            return Err(Error::BufferOverflow);
        }

        let res = if self.cache.wr_flush_en && self.cache.wr_idx > 0 {
            let (entries, n) = self.cache.take_writes();
            self.spi_cache_write(&entries[..n])
        } else {
            Ok(())
        };
        self.cache.wr_flush_en = true;
        res
    }

    /// Queues a write entry, a full cache is sent first.
    fn queue_write(self: &mut Self, word: u32, reserve: usize) -> Result<(), Error> {
        if self.cache.spi_wr_cnt + reserve >= SPI_ARRAY_SIZE || self.cache.wr_idx >= CACHE_SIZE {
            let flush_en = self.cache.wr_flush_en;
            self.cache.wr_flush_en = true;
            self.write_cache_flush()?;
            self.cache.wr_flush_en = flush_en;
        }

        let (_, mask, _) = cache_word_parts(word);
        self.cache.wr_cache[self.cache.wr_idx] = word;
        self.cache.wr_idx += 1;
        self.cache.spi_wr_cnt += if mask == 0xFF { SPI_BYTES } else { HW_RMW_BYTES };
        Ok(())
    }

    fn queue_read(self: &mut Self, word: u32) -> Result<(), Error> {
        if self.cache.spi_rd_cnt + SPI_BYTES >= SPI_ARRAY_SIZE || self.cache.rd_idx >= CACHE_SIZE {
            return Err(Error::CacheFull);
        }

        self.cache.rd_cache[self.cache.rd_idx] = word;
        self.cache.rd_idx += 1;
        self.cache.spi_rd_cnt += SPI_BYTES;
        Ok(())
    }
}
