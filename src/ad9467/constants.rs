//! AD9467 limits and fixed values

/// CHIP_ID register contents
pub const CHIP_ID: u8 = 0x50;

/// OUT_MODE after setup: LVDS, output enabled, not inverted, offset binary
pub const OUT_MODE_DEFAULT: u8 = 0x08;

/// DCO output clock delay, ps
pub const DCO_DELAY_MAX_PS: u16 = 3200;
pub const DCO_DELAY_STEP_PS: u16 = 100;

/// Input buffer current adjustment, % of nominal
pub const BUFFER_CURRENT_MIN: i16 = -100;
pub const BUFFER_CURRENT_MAX: i16 = 530;
pub const BUFFER_CURRENT_STEP: i16 = 10;

/// Largest positive 6-bit buffer current code, larger codes are negative
pub const BUFFER_CURRENT_CODE_MAX: u8 = 53;

/// Device update reads before giving up on the SW transfer bit
pub const TRANSFER_POLL_LIMIT: u16 = 1000;
