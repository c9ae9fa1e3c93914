///! AD9467 device

use core::convert::TryFrom;

use embedded_hal::{
    digital::v2::OutputPin,
    blocking::spi::{Transfer, Write},
};

use crate::errors::*;
use crate::register::*;
use crate::spi::SpiInterface;

use super::constants::*;
use super::register::*;

/// AD9467 device
pub struct Ad9467<SPI, CS> {
    bus: SpiInterface<SPI, CS>,
}


impl<SPI, CS, E> Ad9467<SPI, CS>
where SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
      CS: OutputPin,
{
    /// Creates the device, no register access.
    ///
    /// `spi` - SPI bus (`CPOL` = 0, `CPHA` = 0, SDIO wired for full duplex)
    /// `cs` - chip select pin
    pub fn new(spi: SPI, cs: CS) -> Self {
        Ad9467 { bus: SpiInterface::new(spi, cs) }
    }

    /// Creates the device and puts it in a known state:
    /// test mode off, outputs enabled, offset binary format.
    pub fn setup(spi: SPI, cs: CS) -> Result<Self, Error> {
        let mut dev = Self::new(spi, cs);
        dev.write(TestIo::ADDR, 0x00)?;
        dev.write(OutMode::ADDR, OUT_MODE_DEFAULT)?;
        dev.transfer()?;
        log::info!("AD9467 ready");
        Ok(dev)
    }

    /// Gives back the bus and the chip select pin
    pub fn release(self: Self) -> (SPI, CS) {
        self.bus.release()
    }

    /// Writes a register
    #[inline]
    pub fn write(self: &mut Self, addr: u16, val: u8) -> Result<(), Error> {
        self.bus.write_reg(addr, val)
    }

    /// Reads a register
    #[inline]
    pub fn read(self: &mut Self, addr: u16) -> Result<u8, Error> {
        self.bus.read_reg(addr)
    }

    /// Replaces the `mask` bits of a register with `bits`, leaves the rest alone.
    pub fn set_bits_to_reg(self: &mut Self, addr: u16, bits: u8, mask: u8) -> Result<(), Error> {
        let old = self.read(addr)?;
        self.write(addr, (old & !mask) | (bits & mask))
    }

    /// Reads a typed register
    pub fn read_reg<R: Register>(self: &mut Self) -> Result<Reg<R>, Error> {
        Ok(Reg::new(self.read(R::ADDR)? as u32))
    }

    /// Read-modify-write of a single bit-field
    pub fn update<R, F>(self: &mut Self, f: F) -> Result<(), Error>
    where R: Register,
          F: BitField<R> + Into<u32>,
    {
        let mask = F::field().reg_mask() as u8;
        let bits = F::field().bits(f.into()) as u8;
        self.set_bits_to_reg(R::ADDR, bits, mask)
    }

    /// Reads a single bit-field
    pub fn field<R, F>(self: &mut Self) -> Result<F, Error>
    where R: Register,
          F: BitField<R> + TryFrom<u32>,
          Error: From<<F as TryFrom<u32>>::Error>,
    {
        self.read_reg::<R>()?.get::<F>()
    }

    pub fn chip_id(self: &mut Self) -> Result<u8, Error> {
        Ok(self.field::<ChipId, ChipIdValue>()?.0)
    }

    /// Fails unless the part answers with the AD9467 chip id
    pub fn verify_chip_id(self: &mut Self) -> Result<(), Error> {
        let found = self.chip_id()?;
        if found != CHIP_ID {
            log::error!("unexpected chip id {:#04x}", found);
            return Err(Error::PartId { expected: CHIP_ID, found });
        }
        Ok(())
    }

    pub fn set_power_mode(self: &mut Self, mode: PowerMode) -> Result<(), Error> {
        self.update::<Modes, _>(mode)
    }

    pub fn power_mode(self: &mut Self) -> Result<PowerMode, Error> {
        self.field::<Modes, _>()
    }

    pub fn set_test_mode(self: &mut Self, mode: TestMode) -> Result<(), Error> {
        self.update::<TestIo, _>(mode)
    }

    pub fn test_mode(self: &mut Self) -> Result<TestMode, Error> {
        self.field::<TestIo, _>()
    }

    /// Holds (or releases) the PN9 sequence generator in reset
    pub fn reset_pn9(self: &mut Self, rst: Pn9Reset) -> Result<(), Error> {
        self.update::<TestIo, _>(rst)
    }

    pub fn pn9_reset(self: &mut Self) -> Result<Pn9Reset, Error> {
        self.field::<TestIo, _>()
    }

    /// Holds (or releases) the PN23 sequence generator in reset
    pub fn reset_pn23(self: &mut Self, rst: Pn23Reset) -> Result<(), Error> {
        self.update::<TestIo, _>(rst)
    }

    pub fn pn23_reset(self: &mut Self) -> Result<Pn23Reset, Error> {
        self.field::<TestIo, _>()
    }

    pub fn set_external_ref(self: &mut Self, r: Reference) -> Result<(), Error> {
        self.update::<AdcInput, _>(r)
    }

    pub fn external_ref(self: &mut Self) -> Result<Reference, Error> {
        self.field::<AdcInput, _>()
    }

    pub fn set_analog_input_disconnect(self: &mut Self, d: AnalogDisconnect) -> Result<(), Error> {
        self.update::<AdcInput, _>(d)
    }

    pub fn analog_input_disconnect(self: &mut Self) -> Result<AnalogDisconnect, Error> {
        self.field::<AdcInput, _>()
    }

    /// Digital offset, -128 ..= 127 LSBs
    pub fn set_offset_adj(self: &mut Self, adj: i8) -> Result<(), Error> {
        self.write(Offset::ADDR, adj as u8)
    }

    pub fn offset_adj(self: &mut Self) -> Result<i8, Error> {
        Ok(self.field::<Offset, OffsetAdjust>()?.0 as i8)
    }

    pub fn set_output_disable(self: &mut Self, d: OutputDisable) -> Result<(), Error> {
        self.update::<OutMode, _>(d)
    }

    pub fn output_disable(self: &mut Self) -> Result<OutputDisable, Error> {
        self.field::<OutMode, _>()
    }

    pub fn set_output_invert(self: &mut Self, i: OutputInvert) -> Result<(), Error> {
        self.update::<OutMode, _>(i)
    }

    pub fn output_invert(self: &mut Self) -> Result<OutputInvert, Error> {
        self.field::<OutMode, _>()
    }

    pub fn set_output_format(self: &mut Self, f: OutputFormat) -> Result<(), Error> {
        self.update::<OutMode, _>(f)
    }

    pub fn output_format(self: &mut Self) -> Result<OutputFormat, Error> {
        self.field::<OutMode, _>()
    }

    pub fn set_coarse_lvds_adj(self: &mut Self, adj: CoarseLvds) -> Result<(), Error> {
        self.update::<OutAdj, _>(adj)
    }

    pub fn coarse_lvds_adj(self: &mut Self) -> Result<CoarseLvds, Error> {
        self.field::<OutAdj, _>()
    }

    pub fn set_output_current_adj(self: &mut Self, adj: OutputCurrent) -> Result<(), Error> {
        self.update::<OutAdj, _>(adj)
    }

    pub fn output_current_adj(self: &mut Self) -> Result<OutputCurrent, Error> {
        self.field::<OutAdj, _>()
    }

    pub fn set_dco_clock_invert(self: &mut Self, i: DcoInvert) -> Result<(), Error> {
        self.update::<OutPhase, _>(i)
    }

    pub fn dco_clock_invert(self: &mut Self) -> Result<DcoInvert, Error> {
        self.field::<OutPhase, _>()
    }

    /// DCO delay in ps, 0 disables the delay line.
    ///
    /// The delay line has 100 ps steps starting at 100 ps, values are
    /// rounded down to a step (1 ..= 99 ps gives 100 ps).
    pub fn set_dco_output_clock_delay(self: &mut Self, delay_ps: u16) -> Result<(), Error> {
        if delay_ps > DCO_DELAY_MAX_PS {
            return Err(Error::InvalidParameter);
        }

        let r = if delay_ps == 0 {
            Reg::<OutDelay>::default()
        } else {
            let steps = (delay_ps.max(DCO_DELAY_STEP_PS) - DCO_DELAY_STEP_PS) / DCO_DELAY_STEP_PS;
            Reg::<OutDelay>::default()
                .set(DcoDelayEnable::Enabled)
                .set(DcoDelay(steps as u8))
        };
        self.write(OutDelay::ADDR, r.w as u8)
    }

    pub fn dco_output_clock_delay(self: &mut Self) -> Result<u16, Error> {
        let r = self.read_reg::<OutDelay>()?;
        match r.get::<DcoDelayEnable>()? {
            DcoDelayEnable::Disabled => Ok(0),
            DcoDelayEnable::Enabled => {
                let DcoDelay(d) = r.get()?;
                Ok(d as u16 * DCO_DELAY_STEP_PS + DCO_DELAY_STEP_PS)
            }
        }
    }

    pub fn set_full_scale_range(self: &mut Self, r: FullScaleRange) -> Result<(), Error> {
        self.update::<VRef, _>(r)
    }

    pub fn full_scale_range(self: &mut Self) -> Result<FullScaleRange, Error> {
        self.field::<VRef, _>()
    }

    pub fn set_analog_input_coupling(self: &mut Self, c: InputCoupling) -> Result<(), Error> {
        self.update::<AnalogInput, _>(c)
    }

    pub fn analog_input_coupling(self: &mut Self) -> Result<InputCoupling, Error> {
        self.field::<AnalogInput, _>()
    }

    /// Input buffer current 1, -100 ..= 530 % in 10 % steps
    pub fn set_buffer_current_1(self: &mut Self, percent: i16) -> Result<(), Error> {
        let code = buffer_current_code(percent)?;
        self.update::<BuffCurrent1, _>(BufferCurrent1(code))
    }

    pub fn buffer_current_1(self: &mut Self) -> Result<i16, Error> {
        let BufferCurrent1(code) = self.field::<BuffCurrent1, _>()?;
        Ok(buffer_current_percent(code))
    }

    /// Input buffer current 2, -100 ..= 530 % in 10 % steps
    pub fn set_buffer_current_2(self: &mut Self, percent: i16) -> Result<(), Error> {
        let code = buffer_current_code(percent)?;
        self.update::<BuffCurrent2, _>(BufferCurrent2(code))
    }

    pub fn buffer_current_2(self: &mut Self) -> Result<i16, Error> {
        let BufferCurrent2(code) = self.field::<BuffCurrent2, _>()?;
        Ok(buffer_current_percent(code))
    }

    /// Starts a shadow to active register transfer, see [`Self::poll_transfer`].
    pub fn start_transfer(self: &mut Self) -> Result<(), Error> {
        let r = Reg::<DeviceUpdate>::default().set(SoftwareTransfer::Pending);
        self.write(DeviceUpdate::ADDR, r.w as u8)
    }

    /// `WouldBlock` until the device clears the transfer bit
    pub fn poll_transfer(self: &mut Self) -> nb::Result<(), Error> {
        match self.field::<DeviceUpdate, SoftwareTransfer>()? {
            SoftwareTransfer::Idle => Ok(()),
            SoftwareTransfer::Pending => Err(nb::Error::WouldBlock),
        }
    }

    /// Transfers the shadow registers to the active ones.
    /// Blocking call, gives up after a bounded number of polls.
    pub fn transfer(self: &mut Self) -> Result<(), Error> {
        self.start_transfer()?;
        for _ in 0..TRANSFER_POLL_LIMIT {
            match self.poll_transfer() {
                Ok(()) => return Ok(()),
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
        log::warn!("AD9467 transfer bit stuck");
        Err(Error::Timeout)
    }
}


/// Buffer current percentage to its 6-bit register code
fn buffer_current_code(percent: i16) -> Result<u8, Error> {
    if !(BUFFER_CURRENT_MIN..=BUFFER_CURRENT_MAX).contains(&percent) {
        return Err(Error::InvalidParameter);
    }
    Ok(((percent / BUFFER_CURRENT_STEP) as u8) & 0x3F)
}

fn buffer_current_percent(code: u8) -> i16 {
    let v = if code > BUFFER_CURRENT_CODE_MAX { code as i16 - 0x40 } else { code as i16 };
    v * BUFFER_CURRENT_STEP
}
