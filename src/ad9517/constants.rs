//! AD9517 limits and channel indexed register layout

use crate::register::Field;

/// Maximum phase frequency detector input, Hz
pub const PFD_FREQ_MAX: u64 = 100_000_000;

/// Above this PFD frequency the antibacklash pulse width must be widened
pub const PFD_FREQ_ANTIBACKLASH: u64 = 50_000_000;

/// Maximum frequency into the channel dividers, Hz
pub const CHAN_DIV_FREQ_MAX: u64 = 1_600_000_000;

/// VCO divider range when the VCO drives the distribution
pub const VCO_DIVIDER_MIN: u8 = 2;
pub const VCO_DIVIDER_MAX: u8 = 6;

/// Largest single channel divider
pub const DIVIDER_MAX: u32 = 32;

/// LVDS/CMOS outputs cascade two dividers
pub const LVDS_CMOS_DIVIDER_MAX: u32 = DIVIDER_MAX * DIVIDER_MAX;

/// Dual modulus prescaler values and their maximum input frequency
pub const PRESCALERS: [(u8, u64); 5] = [
    (2, 200_000_000),
    (4, 1_000_000_000),
    (8, 2_400_000_000),
    (16, 3_000_000_000),
    (32, 3_000_000_000),
];

/// Prescaler register code of `PRESCALERS[0]`
pub const PRESCALER_CODE_BASE: u8 = 2;

/// B counter minimum in dual modulus mode
pub const B_COUNTER_MIN: u32 = 3;

/// 14-bit R counter
pub const R_COUNTER_MAX: u32 = 0x3FFF;

/// VCO calibration time, ms
pub const VCO_CAL_DELAY_MS: u16 = 88;

/// SERIAL_PORT_CONFIG soft reset, mirrored bits
pub const SOFT_RESET: u8 = (1 << 5) | (1 << 2);

/// SERIAL_PORT_CONFIG long instruction, mirrored bits
pub const LONG_INSTRUCTION: u8 = (1 << 4) | (1 << 3);

/// Number of LVPECL outputs (channels 0 ..= 3)
pub const LVPECL_CHANNELS: u8 = 4;

/// Number of LVDS/CMOS outputs (channels 4 ..= 7)
pub const LVDS_CMOS_CHANNELS: u8 = 4;


/// LVPECL output driver registers, OUT0 ..= OUT3
pub const LVPECL_OUT: [u16; 4] = [0x0F0, 0x0F1, 0x0F4, 0x0F5];

pub const LVPECL_INVERT: Field = Field::new(1, 4);
pub const LVPECL_DIFF_VOLTAGE: Field = Field::new(2, 2);
pub const LVPECL_POWER_DOWN: Field = Field::new(2, 0);

/// LVDS/CMOS output driver registers, OUT4 ..= OUT7
pub const LVDS_CMOS_OUT: [u16; 4] = [0x140, 0x141, 0x142, 0x143];

pub const LVDS_CMOS_INVERT: Field = Field::new(3, 5);
pub const LVDS_CMOS_CMOS_B: Field = Field::new(1, 4);
pub const LVDS_CMOS_SELECT: Field = Field::new(1, 3);
pub const LVDS_CMOS_CURRENT: Field = Field::new(2, 1);
pub const LVDS_CMOS_POWER_DOWN: Field = Field::new(1, 0);


/// LVPECL dividers 0 (OUT0/OUT1) and 1 (OUT2/OUT3): cycles, bypass/phase
pub const LVPECL_DIVIDER: [(u16, u16); 2] = [(0x190, 0x191), (0x196, 0x197)];

pub const DIVIDER_LOW_CYCLES: Field = Field::new(4, 4);
pub const DIVIDER_HIGH_CYCLES: Field = Field::new(4, 0);
pub const DIVIDER_BYPASS: Field = Field::new(1, 7);
pub const DIVIDER_PHASE_OFFSET: Field = Field::new(4, 0);

/// LVDS/CMOS dividers 2 (OUT4/OUT5) and 3 (OUT6/OUT7), first of four registers:
/// divider 1 cycles, phase offsets, divider 2 cycles, bypass
pub const LVDS_CMOS_DIVIDER: [u16; 2] = [0x199, 0x19E];

pub const LVDS_CMOS_DIV_CYCLES_1: u16 = 0;
pub const LVDS_CMOS_DIV_PHASE: u16 = 1;
pub const LVDS_CMOS_DIV_CYCLES_2: u16 = 2;
pub const LVDS_CMOS_DIV_BYPASS: u16 = 3;

pub const PHASE_OFFSET_DIVIDER_2: Field = Field::new(4, 4);
pub const PHASE_OFFSET_DIVIDER_1: Field = Field::new(4, 0);
pub const BYPASS_DIVIDER_2: Field = Field::new(1, 5);
pub const BYPASS_DIVIDER_1: Field = Field::new(1, 4);

/// Largest LVDS/CMOS phase offset, split over both dividers
pub const LVDS_CMOS_PHASE_MAX: u8 = 30;

/// Largest LVPECL phase offset
pub const LVPECL_PHASE_MAX: u8 = 15;
