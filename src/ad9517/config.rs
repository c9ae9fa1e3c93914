///! Board level configuration

use core::ops::RangeInclusive;

/// AD9517 variants, discriminant is the PART_ID register value
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum PartType {
    Ad9517_1 = 0x51,
    Ad9517_2 = 0x91,
    Ad9517_3 = 0x53,
    Ad9517_4 = 0xD3,
}

impl PartType {
    pub fn part_id(self: Self) -> u8 {
        self as u8
    }

    /// Internal VCO tuning range, Hz
    pub fn vco_range(self: Self) -> RangeInclusive<u64> {
        match self {
            PartType::Ad9517_1 => 2_300_000_000 ..= 2_650_000_000,
            PartType::Ad9517_2 => 2_050_000_000 ..= 2_330_000_000,
            PartType::Ad9517_3 => 1_750_000_000 ..= 2_250_000_000,
            PartType::Ad9517_4 => 1_450_000_000 ..= 1_800_000_000,
        }
    }
}


/// LVPECL differential output swing
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum LvpeclDiffVoltage {
    Mv400 = 0,
    Mv600 = 1,
    Mv780 = 2,
    Mv960 = 3,
}

/// LVPECL output settings
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct LvpeclChannel {
    pub out_invert_en: bool,
    pub out_diff_voltage: LvpeclDiffVoltage,
}

impl Default for LvpeclChannel {
    fn default() -> Self {
        LvpeclChannel { out_invert_en: false, out_diff_voltage: LvpeclDiffVoltage::Mv780 }
    }
}

#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum LogicLevel {
    Lvds = 0,
    Cmos = 1,
}

/// LVDS output current
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum LvdsCurrent {
    Ma1p75 = 0,
    Ma3p5 = 1,
    Ma5p25 = 2,
    Ma7p0 = 3,
}

/// LVDS/CMOS output settings
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct LvdsCmosChannel {
    /// Output polarity, 3 bits (CMOS A / CMOS B / LVDS)
    pub out_invert: u8,
    pub logic_level: LogicLevel,
    /// CMOS B output enable
    pub cmos_b_en: bool,
    pub out_lvds_current: LvdsCurrent,
}

impl Default for LvdsCmosChannel {
    fn default() -> Self {
        LvdsCmosChannel {
            out_invert: 0,
            logic_level: LogicLevel::Lvds,
            cmos_b_en: false,
            out_lvds_current: LvdsCurrent::Ma3p5,
        }
    }
}


/// Platform data, mirrors how the board wires the part.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Config {
    pub part: PartType,

    /// External clock on the CLK input, Hz
    pub ext_clk_freq: u64,
    /// Internal VCO frequency, Hz. Updated when the VCO is programmed.
    pub int_vco_freq: u64,
    /// Distribution is driven by the VCO rather than the CLK input
    pub vco_clk_sel: bool,
    pub power_down_vco_clk: bool,

    pub ref_1_freq: u64,
    pub ref_2_freq: u64,
    pub diff_ref_en: bool,
    pub ref_1_power_on: bool,
    pub ref_2_power_on: bool,
    /// Reference is picked by the REF_SEL pin
    pub ref_sel_pin_en: bool,
    /// REF_SEL pin level, high selects REF2
    pub ref_sel_pin: bool,
    /// REF2 selected by register when the pin is not used
    pub ref_2_en: bool,

    pub lvpecl: [LvpeclChannel; 4],
    pub lvds_cmos: [LvdsCmosChannel; 4],
}

impl Default for Config {
    /// AD9517-4 running its VCO at 1.5 GHz off a 25 MHz REF1
    fn default() -> Self {
        Config {
            part: PartType::Ad9517_4,
            ext_clk_freq: 250_000_000,
            int_vco_freq: 1_500_000_000,
            vco_clk_sel: true,
            power_down_vco_clk: false,
            ref_1_freq: 25_000_000,
            ref_2_freq: 0,
            diff_ref_en: false,
            ref_1_power_on: true,
            ref_2_power_on: false,
            ref_sel_pin_en: false,
            ref_sel_pin: false,
            ref_2_en: false,
            lvpecl: [LvpeclChannel::default(); 4],
            lvds_cmos: [LvdsCmosChannel::default(); 4],
        }
    }
}

impl Config {
    /// Reference frequency the PLL runs from, Hz
    pub fn reference_hz(self: &Self) -> u64 {
        let ref2 = if self.ref_sel_pin_en { self.ref_sel_pin } else { self.ref_2_en };
        if ref2 { self.ref_2_freq } else { self.ref_1_freq }
    }

    pub fn part(mut self: Self, part: PartType) -> Self {
        self.part = part;
        self
    }

    /// Drive the distribution from the internal VCO at `hz`
    pub fn vco(mut self: Self, hz: u64) -> Self {
        self.vco_clk_sel = true;
        self.int_vco_freq = hz;
        self
    }

    /// Drive the distribution from the CLK input at `hz`
    pub fn external_clock(mut self: Self, hz: u64) -> Self {
        self.vco_clk_sel = false;
        self.ext_clk_freq = hz;
        self
    }

    pub fn ref_1(mut self: Self, hz: u64) -> Self {
        self.ref_1_freq = hz;
        self.ref_1_power_on = true;
        self
    }

    /// REF2 at `hz`, selected by register
    pub fn ref_2(mut self: Self, hz: u64) -> Self {
        self.ref_2_freq = hz;
        self.ref_2_power_on = true;
        self.ref_2_en = true;
        self
    }

    pub fn lvpecl_channel(mut self: Self, idx: usize, ch: LvpeclChannel) -> Self {
        self.lvpecl[idx] = ch;
        self
    }

    pub fn lvds_cmos_channel(mut self: Self, idx: usize, ch: LvdsCmosChannel) -> Self {
        self.lvds_cmos[idx] = ch;
        self
    }
}
