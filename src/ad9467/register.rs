//! AD9467 register map

gen_register_marker!(
    /// SPI port configuration
    ChipPortConfig, 0x00);
gen_register_marker!(
    /// Read-only chip id, 0x50
    ChipId, 0x01);
gen_register_marker!(
    /// Read-only speed grade
    ChipGrade, 0x02);
gen_register_marker!(
    /// Power modes
    Modes, 0x08);
gen_register_marker!(
    /// Test modes and PN generator resets
    TestIo, 0x0D);
gen_register_marker!(
    /// ADC input configuration
    AdcInput, 0x0F);
gen_register_marker!(
    /// Digital offset adjust
    Offset, 0x10);
gen_register_marker!(
    /// Output mode
    OutMode, 0x14);
gen_register_marker!(
    /// Output drive adjust
    OutAdj, 0x15);
gen_register_marker!(
    /// Data clock output phase
    OutPhase, 0x16);
gen_register_marker!(
    /// Data clock output delay
    OutDelay, 0x17);
gen_register_marker!(
    /// Full-scale input range
    VRef, 0x18);
gen_register_marker!(
    /// Analog input coupling
    AnalogInput, 0x2C);
gen_register_marker!(
    /// Input buffer current 1
    BuffCurrent1, 0x36);
gen_register_marker!(
    /// Input buffer current 2
    BuffCurrent2, 0x107);
gen_register_marker!(
    /// Device update, transfers shadow registers to the active ones
    DeviceUpdate, 0xFF);


gen_bitfield_struct!(, ChipId, ChipIdValue, u8, 8, 0);

gen_bitfield_enum!(
    /// Internal power-down mode
    , Modes, PowerMode, 2, 0, {
        Normal = 0,
        FullPowerDown = 1,
        Standby = 2,
    }
);

gen_bitfield_enum!(
    /// Output test pattern
    , TestIo, TestMode, 4, 0, {
        Off = 0,
        MidscaleShort = 1,
        PositiveFullScale = 2,
        NegativeFullScale = 3,
        Checkerboard = 4,
        Pn23 = 5,
        Pn9 = 6,
        OneZeroToggle = 7,
    }
);

gen_bitfield_enum!(
    /// PN9 (short) sequence generator reset
    , TestIo, Pn9Reset, 1, 4, { Run = 0, Hold = 1 }
);

gen_bitfield_enum!(
    /// PN23 (long) sequence generator reset
    , TestIo, Pn23Reset, 1, 5, { Run = 0, Hold = 1 }
);

gen_bitfield_enum!(
    /// Voltage reference source
    , AdcInput, Reference, 1, 7, { Internal = 0, External = 1 }
);

gen_bitfield_enum!(
    /// Disconnects the analog input from the ADC core
    , AdcInput, AnalogDisconnect, 1, 2, { Connected = 0, Disconnected = 1 }
);

gen_bitfield_struct!(
    /// Digital offset, two's complement LSBs
    , Offset, OffsetAdjust, u8, 8, 0
);

gen_bitfield_enum!(
    , OutMode, OutputDisable, 1, 4, { Enabled = 0, Disabled = 1 }
);

gen_bitfield_enum!(
    , OutMode, OutputInvert, 1, 2, { Normal = 0, Inverted = 1 }
);

gen_bitfield_enum!(
    /// Output data format
    , OutMode, OutputFormat, 2, 0, {
        OffsetBinary = 0,
        TwosComplement = 1,
        GrayCode = 2,
    }
);

gen_bitfield_enum!(
    /// Coarse LVDS output drive
    , OutAdj, CoarseLvds, 1, 3, {
        /// 3.0 mA
        Nominal = 0,
        /// 1.71 mA
        Reduced = 1,
    }
);

gen_bitfield_enum!(
    /// LVDS output current
    , OutAdj, OutputCurrent, 3, 0, {
        Ma3p0 = 1,
        Ma2p79 = 2,
        Ma2p57 = 3,
        Ma2p35 = 4,
        Ma2p14 = 5,
        Ma1p93 = 6,
        Ma1p71 = 7,
    }
);

gen_bitfield_enum!(
    , OutPhase, DcoInvert, 1, 7, { Normal = 0, Inverted = 1 }
);

gen_bitfield_enum!(
    , OutDelay, DcoDelayEnable, 1, 7, { Disabled = 0, Enabled = 1 }
);

gen_bitfield_struct!(
    /// DCO delay, (n + 1) * 100 ps
    , OutDelay, DcoDelay, u8, 5, 0
);

gen_bitfield_enum!(
    /// Full-scale input voltage, peak to peak
    , VRef, FullScaleRange, 4, 0, {
        V2p0 = 0x0,
        V2p1 = 0x6,
        V2p2 = 0x7,
        V2p3 = 0x8,
        V2p4 = 0x9,
        V2p5 = 0xA,
    }
);

gen_bitfield_enum!(
    , AnalogInput, InputCoupling, 1, 2, { Ac = 0, Dc = 1 }
);

gen_bitfield_struct!(
    /// 6-bit two's complement, 10 % of nominal per LSB
    , BuffCurrent1, BufferCurrent1, u8, 6, 2
);

gen_bitfield_struct!(
    /// 6-bit two's complement, 10 % of nominal per LSB
    , BuffCurrent2, BufferCurrent2, u8, 6, 2
);

gen_bitfield_enum!(
    /// Software transfer bit, self clearing
    , DeviceUpdate, SoftwareTransfer, 1, 0, { Idle = 0, Pending = 1 }
);


impl FullScaleRange {
    /// Range in millivolts peak to peak
    pub fn millivolts(self: Self) -> u16 {
        match self {
            FullScaleRange::V2p0 => 2000,
            _ => 2100 + (self as u16 - FullScaleRange::V2p1 as u16) * 100,
        }
    }

    /// Exact match only, 2000 or 2100 ..= 2500 in 100 mV steps
    pub fn from_millivolts(mv: u16) -> Option<Self> {
        match mv {
            2000 => Some(FullScaleRange::V2p0),
            2100 => Some(FullScaleRange::V2p1),
            2200 => Some(FullScaleRange::V2p2),
            2300 => Some(FullScaleRange::V2p3),
            2400 => Some(FullScaleRange::V2p4),
            2500 => Some(FullScaleRange::V2p5),
            _ => None,
        }
    }
}
