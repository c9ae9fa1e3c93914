//! AD9517 fixed address registers

gen_register_marker!(SerialPortConfig, 0x000);
gen_register_marker!(PartId, 0x003);
gen_register_marker!(
    /// PFD polarity, charge pump and PLL power-down
    PfdChargePump, 0x010);
gen_register_marker!(
    /// 14-bit R divider, MSB at 0x012
    RCounter, 0x012, 2);
gen_register_marker!(ACounter, 0x013);
gen_register_marker!(
    /// 13-bit B counter, MSB at 0x015
    BCounter, 0x015, 2);
gen_register_marker!(PllCtrl1, 0x016);
gen_register_marker!(PllCtrl3, 0x018);
gen_register_marker!(
    /// Reference input selection
    PllCtrl7, 0x01C);
gen_register_marker!(VcoDivider, 0x1E0);
gen_register_marker!(
    /// Distribution clock source
    InputClks, 0x1E1);
gen_register_marker!(
    /// Self clearing, copies buffer registers to the active ones
    UpdateAllRegs, 0x232);


gen_bitfield_struct!(, PartId, PartIdValue, u8, 8, 0);

gen_bitfield_enum!(
    , PfdChargePump, PllPowerDown, 2, 0, {
        Normal = 0,
        AsyncPowerDown = 1,
        SyncPowerDown = 3,
    }
);

gen_bitfield_enum!(
    , PfdChargePump, ChargePumpMode, 2, 2, {
        HighImpedance = 0,
        ForceSource = 1,
        ForceSink = 2,
        Normal = 3,
    }
);

gen_bitfield_struct!(
    /// 0.6 mA per LSB (5.1 kΩ CPRSET), code 7 = 4.8 mA
    , PfdChargePump, ChargePumpCurrent, u8, 3, 4
);

gen_bitfield_enum!(
    , PfdChargePump, PfdPolarity, 1, 7, { Positive = 0, Negative = 1 }
);

gen_bitfield_struct!(, RCounter, RCount, u16, 14, 0);
gen_bitfield_struct!(, ACounter, ACount, u8, 6, 0);
gen_bitfield_struct!(, BCounter, BCount, u16, 13, 0);

gen_bitfield_struct!(
    /// Prescaler code: 2 = 2/3, 3 = 4/5, 4 = 8/9, 5 = 16/17, 6 = 32/33
    , PllCtrl1, Prescaler, u8, 3, 0
);

gen_bitfield_flag!(
    /// Rising edge starts a VCO calibration
    , PllCtrl3, VcoCalNow, 0
);

gen_bitfield_flag!(, PllCtrl7, DiffRef, 0);
gen_bitfield_flag!(, PllCtrl7, Ref1PowerOn, 1);
gen_bitfield_flag!(, PllCtrl7, Ref2PowerOn, 2);
gen_bitfield_flag!(, PllCtrl7, UseRefSelPin, 5);
gen_bitfield_flag!(, PllCtrl7, SelectRef2, 6);

gen_bitfield_struct!(
    /// VCO divider minus 2
    , VcoDivider, VcoDividerCode, u8, 3, 0
);

gen_bitfield_flag!(, InputClks, BypassVcoDivider, 0);
gen_bitfield_flag!(, InputClks, SelVcoClk, 1);
gen_bitfield_flag!(, InputClks, PowerDownVcoClk, 2);

gen_bitfield_flag!(, UpdateAllRegs, UpdateAll, 0);
