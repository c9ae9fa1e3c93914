#![deny(unsafe_code)]
#![no_main]
#![no_std]

extern crate panic_halt; // panic handler

use cortex_m;
use cortex_m_rt::entry;
use stm32f4xx_hal as hal;

use cortex_m_semihosting::hprintln;

use crate::hal::{
    prelude::*,
    stm32,
    spi::Spi,
};

use embedded_hal::spi::MODE_0;

use adi_converters::{
    ad9467::{Ad9467, register::{TestMode, Pn9Reset}},
    ad9517::{Ad9517, Config, config::PartType},
};


#[entry]
fn main() -> ! {
    let dp = stm32::Peripherals::take().unwrap();
    let cp = cortex_m::peripheral::Peripherals::take().unwrap();

    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.use_hse(8.mhz()).sysclk(168.mhz()).pclk1(42.mhz()).pclk2(84.mhz()).freeze();

    let gpioa = dp.GPIOA.split();
    let mut led1 = gpioa.pa6.into_push_pull_output();

    let mut delay = hal::delay::Delay::new(cp.SYST, clocks);

    let gpiob = dp.GPIOB.split();
    let cs_clk = gpiob.pb10.into_push_pull_output();
    let cs_adc = gpiob.pb11.into_push_pull_output();

    let sck = gpiob.pb13.into_alternate_af5();
    let miso = gpiob.pb14.into_alternate_af5();
    let mosi = gpiob.pb15.into_alternate_af5();

    let spi = Spi::spi2(
        dp.SPI2,
        (sck, miso, mosi),
        MODE_0,
        stm32f4xx_hal::time::KiloHertz(1000).into(),
        clocks,
    );

    // Clock generator first, the ADC needs its sample clock
    let config = Config::default()
        .part(PartType::Ad9517_4)
        .ref_1(25_000_000)
        .vco(1_500_000_000);

    let mut clk = Ad9517::setup(spi, cs_clk, config, &mut delay).unwrap();
    let f_adc = clk.frequency(0, 250_000_000).unwrap();
    hprintln!("AD9517 VCO {:?} => ADC clock {} Hz", clk.pll_state(), f_adc).unwrap();
    let (spi, cs_clk) = clk.release();

    let mut adc = Ad9467::setup(spi, cs_adc).unwrap();
    adc.verify_chip_id().unwrap();
    adc.set_test_mode(TestMode::Pn9).unwrap();
    adc.reset_pn9(Pn9Reset::Run).unwrap();
    adc.transfer().unwrap();
    hprintln!("AD9467 test mode {:?}", adc.test_mode().unwrap()).unwrap();

    let (_spi, _cs_adc) = adc.release();
    let _ = cs_clk;

    loop {
        led1.set_high().unwrap();
        delay.delay_ms(1000_u32);
        led1.set_low().unwrap();
        delay.delay_ms(1000_u32);
    }
}
