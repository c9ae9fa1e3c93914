///! AD9517 device

use core::convert::TryFrom;

use embedded_hal::{
    blocking::delay::DelayMs,
    digital::v2::OutputPin,
    blocking::spi::{Transfer, Write},
};

use crate::errors::*;
use crate::register::*;
use crate::spi::SpiInterface;

use super::config::*;
use super::constants::*;
use super::frequency::*;
use super::register::*;

/// Output driver power state.
///
/// LVDS/CMOS outputs only know `Normal` and `TotalPowerDown`.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum PowerMode {
    Normal = 0,
    /// Partial power-down, reference on, for outputs without load resistors
    SafePowerDown = 1,
    PartialPowerDown = 2,
    TotalPowerDown = 3,
}

impl TryFrom<u32> for PowerMode {
    type Error = Error;

    fn try_from(x: u32) -> Result<Self, Error> {
        match x {
            0 => Ok(PowerMode::Normal),
            1 => Ok(PowerMode::SafePowerDown),
            2 => Ok(PowerMode::PartialPowerDown),
            3 => Ok(PowerMode::TotalPowerDown),
            _ => Err(Error::InvalidFieldValue),
        }
    }
}


/// AD9517 device
pub struct Ad9517<SPI, CS> {
    bus: SpiInterface<SPI, CS>,
    config: Config,
    pll: Option<PllPlan>,
}


impl<SPI, CS, E> Ad9517<SPI, CS>
where SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
      CS: OutputPin,
{
    /// Creates the device, no register access.
    pub fn new(spi: SPI, cs: CS, config: Config) -> Self {
        Ad9517 { bus: SpiInterface::new(spi, cs), config, pll: None }
    }

    /// Creates the device and configures it from `config`.
    ///
    /// When the VCO drives the distribution the PLL is locked to
    /// `config.int_vco_freq` and the VCO calibrated, which takes 88 ms of `delay`.
    pub fn setup<D>(spi: SPI, cs: CS, config: Config, delay: &mut D) -> Result<Self, Error>
    where D: DelayMs<u16>
    {
        let mut dev = Self::new(spi, cs, config);

        let PartIdValue(found) = dev.field::<PartId, _>()?;
        let expected = config.part.part_id();
        if found != expected {
            log::error!("unexpected part id {:#04x}", found);
            return Err(Error::PartId { expected, found });
        }

        dev.write(SerialPortConfig::ADDR, 1, (SOFT_RESET | LONG_INSTRUCTION) as u32)?;
        dev.update()?;
        dev.write(SerialPortConfig::ADDR, 1, LONG_INSTRUCTION as u32)?;
        dev.update()?;

        dev.write_reg(Reg::<PllCtrl7>::default()
            .set(DiffRef(config.diff_ref_en))
            .set(Ref1PowerOn(config.ref_1_power_on))
            .set(Ref2PowerOn(config.ref_2_power_on))
            .set(UseRefSelPin(config.ref_sel_pin_en))
            .set(SelectRef2(config.ref_2_en)))?;

        dev.write_reg(Reg::<InputClks>::default()
            .set(SelVcoClk(config.vco_clk_sel))
            .set(PowerDownVcoClk(config.power_down_vco_clk)))?;

        for (addr, ch) in LVPECL_OUT.iter().zip(config.lvpecl.iter()) {
            dev.write(*addr, 1, lvpecl_out_bits(ch))?;
        }

        for (addr, ch) in LVDS_CMOS_OUT.iter().zip(config.lvds_cmos.iter()) {
            dev.write(*addr, 1, lvds_cmos_out_bits(ch))?;
        }

        if config.vco_clk_sel {
            dev.vco_frequency(config.int_vco_freq)?;

            dev.write_reg(Reg::<PfdChargePump>::default()
                .set(PllPowerDown::Normal)
                .set(ChargePumpMode::Normal)
                .set(ChargePumpCurrent(7))
                .set(PfdPolarity::Positive))?;

            // calibration starts on the CAL_NOW rising edge
            let r = dev.read_reg::<PllCtrl3>()?;
            dev.write_reg(r.set(VcoCalNow(false)))?;
            dev.update()?;
            dev.write_reg(r.set(VcoCalNow(true)))?;
            dev.update()?;
            delay.delay_ms(VCO_CAL_DELAY_MS);
        }

        log::info!("AD9517 ready");
        Ok(dev)
    }

    /// Gives back the bus and the chip select pin
    pub fn release(self: Self) -> (SPI, CS) {
        self.bus.release()
    }

    pub fn config(self: &Self) -> &Config {
        &self.config
    }

    /// Last programmed PLL counters
    pub fn pll_state(self: &Self) -> Option<PllPlan> {
        self.pll
    }

    /// Writes `len` bytes of `val`, MSB first at `addr`, descending addresses.
    pub fn write(self: &mut Self, addr: u16, len: u8, val: u32) -> Result<(), Error> {
        for i in 0..len {
            let byte = (val >> ((len - i - 1) * 8)) as u8;
            self.bus.write_reg(addr - i as u16, byte)?;
        }
        Ok(())
    }

    /// Reads `len` bytes, MSB first at `addr`, descending addresses.
    pub fn read(self: &mut Self, addr: u16, len: u8) -> Result<u32, Error> {
        let mut val = 0u32;
        for i in 0..len {
            val = (val << 8) | self.bus.read_reg(addr - i as u16)? as u32;
        }
        Ok(val)
    }

    /// Writes a typed register
    pub fn write_reg<R: Register>(self: &mut Self, r: Reg<R>) -> Result<(), Error> {
        self.write(R::ADDR, R::LEN, r.w)
    }

    /// Reads a typed register
    pub fn read_reg<R: Register>(self: &mut Self) -> Result<Reg<R>, Error> {
        Ok(Reg::new(self.read(R::ADDR, R::LEN)?))
    }

    /// Read-modify-write of a single bit-field
    pub fn update_field<R, F>(self: &mut Self, f: F) -> Result<(), Error>
    where R: Register,
          F: BitField<R> + Into<u32>,
    {
        let r = self.read_reg::<R>()?;
        self.write_reg(r.set(f))
    }

    /// Reads a single bit-field
    pub fn field<R, F>(self: &mut Self) -> Result<F, Error>
    where R: Register,
          F: BitField<R> + TryFrom<u32>,
          Error: From<<F as TryFrom<u32>>::Error>,
    {
        self.read_reg::<R>()?.get::<F>()
    }

    /// Copies the buffer registers to the active ones
    pub fn update(self: &mut Self) -> Result<(), Error> {
        self.write_reg(Reg::<UpdateAllRegs>::default().set(UpdateAll(true)))
    }

    /// Locks the PLL to `hz`, returns the frequency actually synthesized.
    ///
    /// Registers take effect on the next [`Self::update`].
    pub fn vco_frequency(self: &mut Self, hz: u64) -> Result<u64, Error> {
        if !self.config.part.vco_range().contains(&hz) {
            return Err(Error::InvalidFrequency);
        }

        let plan = PllPlan::new(self.config.reference_hz(), hz)?;

        self.update_field::<PllCtrl1, _>(Prescaler(plan.prescaler_code))?;
        self.write_reg(Reg::<ACounter>::default().set(ACount(plan.a_counter as u8)))?;
        self.write_reg(Reg::<BCounter>::default().set(BCount(plan.b_counter as u16)))?;
        self.write_reg(Reg::<RCounter>::default().set(RCount(plan.r_counter as u16)))?;

        log::info!("VCO {} Hz: R {} P {} B {} A {}",
                   plan.vco_hz, plan.r_counter, plan.prescaler_p, plan.b_counter, plan.a_counter);

        self.config.int_vco_freq = plan.vco_hz;
        self.pll = Some(plan);
        Ok(plan.vco_hz)
    }

    /// Sets an output frequency, returns the frequency actually produced.
    ///
    /// `channel` - 0 ..= 3 LVPECL, 4 ..= 7 LVDS/CMOS.
    /// Outputs sharing a divider (0/1, 2/3, 4/5, 6/7) share the frequency.
    pub fn frequency(self: &mut Self, channel: u8, hz: u64) -> Result<u64, Error> {
        let kind = OutputKind::of_channel(channel)?;
        let input_hz = if self.config.vco_clk_sel { self.config.int_vco_freq } else { self.config.ext_clk_freq };
        let plan = ChannelPlan::new(input_hz, self.config.vco_clk_sel, kind, hz)?;

        let clks = self.read_reg::<InputClks>()?;
        let bypass = plan.vco_divider == 1 && !clks.get::<SelVcoClk>()?.0;
        self.write_reg(clks.set(BypassVcoDivider(bypass)))?;
        if !bypass {
            self.write_reg(Reg::<VcoDivider>::default().set(VcoDividerCode(plan.vco_divider.saturating_sub(VCO_DIVIDER_MIN))))?;
        }

        match kind {
            OutputKind::Lvpecl => {
                let (cycles, bypass) = LVPECL_DIVIDER[(channel / 2) as usize];
                if plan.divider == 1 {
                    self.modify(bypass, DIVIDER_BYPASS, 1)?;
                } else {
                    self.modify(bypass, DIVIDER_BYPASS, 0)?;
                    self.write(cycles, 1, cycles_bits(plan.divider))?;
                }
            }
            OutputKind::LvdsCmos => {
                let base = LVDS_CMOS_DIVIDER[((channel - LVPECL_CHANNELS) / 2) as usize];
                let bypass = base + LVDS_CMOS_DIV_BYPASS;
                if plan.divider == 1 {
                    self.modify(bypass, BYPASS_DIVIDER_2, 1)?;
                    self.modify(bypass, BYPASS_DIVIDER_1, 1)?;
                } else if plan.divider <= DIVIDER_MAX {
                    self.modify(bypass, BYPASS_DIVIDER_2, 1)?;
                    self.modify(bypass, BYPASS_DIVIDER_1, 0)?;
                    self.write(base + LVDS_CMOS_DIV_CYCLES_1, 1, cycles_bits(plan.divider))?;
                } else {
                    let (d1, d2) = split_divider(plan.divider).ok_or(Error::InvalidFrequency)?;
                    self.modify(bypass, BYPASS_DIVIDER_2, 0)?;
                    self.modify(bypass, BYPASS_DIVIDER_1, 0)?;
                    self.write(base + LVDS_CMOS_DIV_CYCLES_1, 1, cycles_bits(d1))?;
                    self.write(base + LVDS_CMOS_DIV_CYCLES_2, 1, cycles_bits(d2))?;
                }
            }
        }

        log::debug!("OUT{} {} Hz (VCO div {}, div {})", channel, plan.out_hz, plan.vco_divider, plan.divider);
        Ok(plan.out_hz)
    }

    /// Sets the divider phase offset of an output, in input clock cycles.
    ///
    /// LVPECL takes 0 ..= 15, LVDS/CMOS 0 ..= 30 (spread over both dividers).
    pub fn phase(self: &mut Self, channel: u8, phase: u8) -> Result<(), Error> {
        match OutputKind::of_channel(channel)? {
            OutputKind::Lvpecl => {
                if phase > LVPECL_PHASE_MAX {
                    return Err(Error::InvalidParameter);
                }
                let (_, reg) = LVPECL_DIVIDER[(channel / 2) as usize];
                self.modify(reg, DIVIDER_PHASE_OFFSET, phase as u32)
            }
            OutputKind::LvdsCmos => {
                if phase > LVDS_CMOS_PHASE_MAX {
                    return Err(Error::InvalidParameter);
                }
                let base = LVDS_CMOS_DIVIDER[((channel - LVPECL_CHANNELS) / 2) as usize];
                let half = (phase / 2) as u32;
                let w = PHASE_OFFSET_DIVIDER_2.bits(half + (phase % 2) as u32)
                    | PHASE_OFFSET_DIVIDER_1.bits(half);
                self.write(base + LVDS_CMOS_DIV_PHASE, 1, w)
            }
        }
    }

    /// Rewrites the output driver register with the configured channel
    /// settings and `mode`.
    pub fn set_power_mode(self: &mut Self, channel: u8, mode: PowerMode) -> Result<(), Error> {
        match OutputKind::of_channel(channel)? {
            OutputKind::Lvpecl => {
                let ch = self.config.lvpecl[channel as usize];
                let w = LVPECL_POWER_DOWN.insert(lvpecl_out_bits(&ch), mode as u32);
                self.write(LVPECL_OUT[channel as usize], 1, w)
            }
            OutputKind::LvdsCmos => {
                let off = match mode {
                    PowerMode::Normal => 0,
                    PowerMode::TotalPowerDown => 1,
                    _ => return Err(Error::InvalidParameter),
                };
                let idx = (channel - LVPECL_CHANNELS) as usize;
                let ch = self.config.lvds_cmos[idx];
                let w = LVDS_CMOS_POWER_DOWN.insert(lvds_cmos_out_bits(&ch), off);
                self.write(LVDS_CMOS_OUT[idx], 1, w)
            }
        }
    }

    pub fn power_mode(self: &mut Self, channel: u8) -> Result<PowerMode, Error> {
        match OutputKind::of_channel(channel)? {
            OutputKind::Lvpecl => {
                let w = self.read(LVPECL_OUT[channel as usize], 1)?;
                PowerMode::try_from(LVPECL_POWER_DOWN.extract(w))
            }
            OutputKind::LvdsCmos => {
                let w = self.read(LVDS_CMOS_OUT[(channel - LVPECL_CHANNELS) as usize], 1)?;
                match LVDS_CMOS_POWER_DOWN.extract(w) {
                    0 => Ok(PowerMode::Normal),
                    _ => Ok(PowerMode::TotalPowerDown),
                }
            }
        }
    }

    /// Read-modify-write of a channel indexed bit-field
    fn modify(self: &mut Self, addr: u16, f: Field, v: u32) -> Result<(), Error> {
        let old = self.read(addr, 1)?;
        self.write(addr, 1, f.insert(old, v))
    }
}


fn lvpecl_out_bits(ch: &LvpeclChannel) -> u32 {
    LVPECL_INVERT.bits(ch.out_invert_en as u32)
        | LVPECL_DIFF_VOLTAGE.bits(ch.out_diff_voltage as u32)
}

fn lvds_cmos_out_bits(ch: &LvdsCmosChannel) -> u32 {
    LVDS_CMOS_INVERT.bits(ch.out_invert as u32)
        | LVDS_CMOS_CMOS_B.bits(ch.cmos_b_en as u32)
        | LVDS_CMOS_SELECT.bits(ch.logic_level as u32)
        | LVDS_CMOS_CURRENT.bits(ch.out_lvds_current as u32)
}

/// Divider low/high cycles register word
fn cycles_bits(divider: u32) -> u32 {
    let (low, high) = duty_cycles(divider);
    DIVIDER_LOW_CYCLES.bits(low) | DIVIDER_HIGH_CYCLES.bits(high)
}
