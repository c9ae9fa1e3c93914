//! Simulated SPI register file for unit tests

use std::{
    cell::{Cell, RefCell},
    convert::Infallible,
    rc::Rc,
    vec::Vec,
};

use embedded_hal::{
    blocking::{delay::DelayMs, spi::{Transfer, Write}},
    digital::v2::OutputPin,
};

/// Address registers of a hardware read-modify-write engine
#[derive(Debug, Copy, Clone)]
pub struct RmwRegs {
    pub lo_addr: u16,
    pub hi_addr: u16,
    pub mask: u16,
    pub data: u16,
}

#[derive(Debug)]
pub struct SpiState {
    /// Register file, indexed by 15-bit address
    pub regs: Vec<u8>,
    /// Bytes sent, one entry per bus transaction
    pub transactions: Vec<Vec<u8>>,
    /// Number of upcoming transactions to fail
    pub fail_next: usize,
    /// (address, bits) cleared right after being written
    pub self_clearing: Vec<(u16, u8)>,
    pub hw_rmw: Option<RmwRegs>,
    rmw_addr: u16,
    rmw_mask: u8,
}

impl SpiState {
    pub fn reg(&self, addr: u16) -> u8 {
        self.regs[addr as usize]
    }

    pub fn set_reg(&mut self, addr: u16, val: u8) {
        self.regs[addr as usize] = val;
    }

    /// Register write frames (address, data) in bus order
    pub fn writes(&self) -> Vec<(u16, u8)> {
        self.frames().into_iter().filter(|f| !f.0).map(|f| (f.1, f.2)).collect()
    }

    /// Register read frames in bus order
    pub fn reads(&self) -> Vec<u16> {
        self.frames().into_iter().filter(|f| f.0).map(|f| f.1).collect()
    }

    fn frames(&self) -> Vec<(bool, u16, u8)> {
        self.transactions
            .iter()
            .flat_map(|t| t.chunks(3).filter(|c| c.len() == 3).map(decode).collect::<Vec<_>>())
            .collect()
    }

    fn process(&mut self, words: &mut [u8]) {
        for chunk in words.chunks_mut(3).filter(|c| c.len() == 3) {
            let (read, addr, data) = decode(chunk);
            if read {
                chunk[2] = self.reg(addr);
            } else {
                self.write(addr, data);
            }
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        if let Some(rmw) = self.hw_rmw {
            if addr == rmw.lo_addr {
                self.rmw_addr = (self.rmw_addr & 0xFF00) | val as u16;
            } else if addr == rmw.hi_addr {
                self.rmw_addr = (self.rmw_addr & 0x00FF) | ((val as u16) << 8);
            } else if addr == rmw.mask {
                self.rmw_mask = val;
            } else if addr == rmw.data {
                let a = self.rmw_addr;
                let old = self.reg(a);
                self.set_reg(a, (old & !self.rmw_mask) | (val & self.rmw_mask));
            }
        }
        self.set_reg(addr, val);
        for (a, bits) in self.self_clearing.iter() {
            if *a == addr {
                self.regs[addr as usize] &= !bits;
            }
        }
    }
}

fn decode(c: &[u8]) -> (bool, u16, u8) {
    (c[0] & 0x80 != 0, (((c[0] & 0x7F) as u16) << 8) | c[1] as u16, c[2])
}

#[derive(Debug, PartialEq)]
pub struct FakeError;

/// SPI bus backed by [`SpiState`]
pub struct FakeSpi {
    state: Rc<RefCell<SpiState>>,
}

impl FakeSpi {
    pub fn new() -> (Self, Rc<RefCell<SpiState>>) {
        let state = Rc::new(RefCell::new(SpiState {
            regs: vec![0; 0x8000],
            transactions: Vec::new(),
            fail_next: 0,
            self_clearing: Vec::new(),
            hw_rmw: None,
            rmw_addr: 0,
            rmw_mask: 0,
        }));
        (FakeSpi { state: state.clone() }, state)
    }

    fn run(&mut self, words: &mut [u8]) -> Result<(), FakeError> {
        let mut st = self.state.borrow_mut();
        st.transactions.push(words.to_vec());
        if st.fail_next > 0 {
            st.fail_next -= 1;
            return Err(FakeError);
        }
        st.process(words);
        Ok(())
    }
}

impl Transfer<u8> for FakeSpi {
    type Error = FakeError;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], FakeError> {
        self.run(words)?;
        Ok(words)
    }
}

impl Write<u8> for FakeSpi {
    type Error = FakeError;

    fn write(&mut self, words: &[u8]) -> Result<(), FakeError> {
        let mut copy = words.to_vec();
        self.run(&mut copy)
    }
}

/// Output pin remembering its level and the number of level changes
#[derive(Clone)]
pub struct FakePin {
    high: Rc<Cell<bool>>,
    toggles: Rc<Cell<usize>>,
}

impl FakePin {
    pub fn new() -> Self {
        FakePin { high: Rc::new(Cell::new(true)), toggles: Rc::new(Cell::new(0)) }
    }

    pub fn is_high(&self) -> bool {
        self.high.get()
    }

    pub fn toggles(&self) -> usize {
        self.toggles.get()
    }
}

impl OutputPin for FakePin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high.set(false);
        self.toggles.set(self.toggles.get() + 1);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high.set(true);
        self.toggles.set(self.toggles.get() + 1);
        Ok(())
    }
}

/// Delay provider adding up the requested time
#[derive(Default)]
pub struct FakeDelay {
    pub total_ms: u32,
}

impl DelayMs<u16> for FakeDelay {
    fn delay_ms(&mut self, ms: u16) {
        self.total_ms += ms as u32;
    }
}
