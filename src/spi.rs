//! 3-wire "AD9xxx" SPI framing shared by the converter drivers.
//!
//! Every register access is a 24-bit frame: a 16-bit instruction
//! (R/W bit + 15-bit address) followed by one data byte.

use embedded_hal::{
    digital::v2::OutputPin,
    blocking::spi::{Transfer, Write},
};

use crate::errors::*;

/// Instruction read bit
pub const READ: u16 = 1 << 15;

/// Instruction address bits
pub const ADDR_MASK: u16 = 0x7FFF;

/// Frame length, instruction + data
pub const FRAME_LEN: usize = 3;

/// Builds one register access frame
#[inline]
pub fn frame(read: bool, addr: u16, data: u8) -> [u8; FRAME_LEN] {
    let instr = (addr & ADDR_MASK) | if read { READ } else { 0 };
    [(instr >> 8) as u8, (instr & 0xFF) as u8, data]
}


/// SPI bus plus its chip select line
pub struct SpiInterface<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS, E> SpiInterface<SPI, CS>
where SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
      CS: OutputPin,
{
    /// `spi` - SPI bus (`CPOL` = 0, `CPHA` = 0)
    /// `cs` - active low chip select
    pub fn new(spi: SPI, cs: CS) -> Self {
        SpiInterface { spi, cs }
    }

    /// Full duplex transfer, `buf` is replaced with the bytes clocked in.
    pub fn write_and_read(self: &mut Self, buf: &mut [u8]) -> Result<(), Error> {
        self.select()?;
        let res = self.spi.transfer(buf).map(|_| ()).map_err(|_| Error::Spi);
        self.deselect()?;
        res
    }

    /// Write only transfer
    pub fn write(self: &mut Self, buf: &[u8]) -> Result<(), Error> {
        self.select()?;
        let res = self.spi.write(buf).map_err(|_| Error::Spi);
        self.deselect()?;
        res
    }

    /// Writes one byte to a register
    pub fn write_reg(self: &mut Self, addr: u16, val: u8) -> Result<(), Error> {
        log::debug!("spi wr {:#06x} <- {:#04x}", addr, val);
        let mut buf = frame(false, addr, val);
        self.write_and_read(&mut buf)
    }

    /// Reads one byte from a register
    pub fn read_reg(self: &mut Self, addr: u16) -> Result<u8, Error> {
        let mut buf = frame(true, addr, 0);
        self.write_and_read(&mut buf)?;
        log::debug!("spi rd {:#06x} -> {:#04x}", addr, buf[2]);
        Ok(buf[2])
    }

    /// Gives back the bus and the chip select pin
    pub fn release(self: Self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    #[inline(always)]
    fn select(self: &mut Self) -> Result<(), Error> {
        self.cs.set_low().map_err(|_| Error::Pin)
    }

    #[inline(always)]
    fn deselect(self: &mut Self) -> Result<(), Error> {
        self.cs.set_high().map_err(|_| Error::Pin)
    }
}
