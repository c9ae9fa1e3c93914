///! ADRV9025 device handle

use embedded_hal::{
    digital::v2::OutputPin,
    blocking::spi::{Transfer, Write},
};

use crate::spi::SpiInterface;

use super::cache::CacheInfo;

/// SPI interface capabilities, fixed at construction
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct CacheConfig {
    /// The part performs masked writes through the HW-RMW registers
    pub hw_rmw_enabled: bool,
    /// SDO is not wired, every read is refused
    pub wr_only: bool,
    /// How many cache entries back a merging write looks for its register
    pub merge_distance: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig { hw_rmw_enabled: true, wr_only: false, merge_distance: 0 }
    }
}


/// ADRV9025 bit-field access layer
pub struct Adrv9025<SPI, CS> {
    pub(super) bus: SpiInterface<SPI, CS>,
    pub(super) cache: CacheInfo,
}


impl<SPI, CS, E> Adrv9025<SPI, CS>
where SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
      CS: OutputPin,
{
    /// Both caches start off.
    ///
    /// `spi` - SPI bus (`CPOL` = 0, `CPHA` = 0, 4-wire unless `config.wr_only`)
    /// `cs` - chip select pin
    pub fn new(spi: SPI, cs: CS, config: CacheConfig) -> Self {
        Adrv9025 { bus: SpiInterface::new(spi, cs), cache: CacheInfo::new(config) }
    }

    /// Gives back the bus and the chip select pin, queued writes are lost.
    pub fn release(self: Self) -> (SPI, CS) {
        self.bus.release()
    }

    pub fn cache_info(self: &Self) -> &CacheInfo {
        &self.cache
    }
}
