//! Register map of the Keystone timer64 block.
//!
//! Layout follows TI SPRUGV5A. Only the fields needed to run the block as a
//! single 64-bit general purpose timer are used; the watchdog, reload and
//! capture registers are kept so the offsets line up with the silicon.

use bitflags::bitflags;
use numeric_enum_macro::numeric_enum;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::register_structs;
use tock_registers::registers::ReadWrite;

use super::sequence::Step;

/// Size of the register window the driver touches.
pub const REGS_SIZE: usize = 0x48;

register_structs! {
    KeystoneTimerRegs {
        (0x00 => _reserved0),
        /// Emulation management and clock speed.
        (0x04 => emumgt_clkspd: ReadWrite<u32>),
        (0x08 => _reserved1),
        /// Counter, low and high words.
        (0x10 => cntlo: ReadWrite<u32>),
        (0x14 => cnthi: ReadWrite<u32>),
        /// Period, low and high words.
        (0x18 => prdlo: ReadWrite<u32>),
        (0x1c => prdhi: ReadWrite<u32>),
        /// Timer control.
        (0x20 => tcr: ReadWrite<u32>),
        /// Timer global control.
        (0x24 => tgcr: ReadWrite<u32>),
        /// Watchdog timer control.
        (0x28 => wdtcr: ReadWrite<u32>),
        (0x2c => _reserved2),
        (0x34 => rello: ReadWrite<u32>),
        (0x38 => relhi: ReadWrite<u32>),
        (0x3c => caplo: ReadWrite<u32>),
        (0x40 => caphi: ReadWrite<u32>),
        /// Interrupt control and status.
        (0x44 => intctlstat: ReadWrite<u32>),
        (0x48 => @END),
    }
}

numeric_enum! {
    #[repr(usize)]
    /// A timer register, named by its byte offset in the block.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum TimerReg {
        EmuMgtClkSpd = 0x04,
        CntLo = 0x10,
        CntHi = 0x14,
        PrdLo = 0x18,
        PrdHi = 0x1c,
        Tcr = 0x20,
        Tgcr = 0x24,
        WdTcr = 0x28,
        RelLo = 0x34,
        RelHi = 0x38,
        CapLo = 0x3c,
        CapHi = 0x40,
        IntCtlStat = 0x44,
    }
}

bitflags! {
    /// Timer control register.
    pub struct Tcr: u32 {
        /// ENAMODE12 = 1: run once up to the period, then stop.
        const ENAMODE_ONESHOT = 1 << 6;
        /// ENAMODE12 = 2: run continuously, reloading at the period.
        const ENAMODE_CONTINUOUS = 1 << 7;
        const ENAMODE = Self::ENAMODE_ONESHOT.bits | Self::ENAMODE_CONTINUOUS.bits;
    }
}

bitflags! {
    /// Timer global control register. All zero means "in reset, 64-bit mode".
    pub struct Tgcr: u32 {
        const TIM12RS = 1 << 0;
        const TIM34RS = 1 << 1;
        const UNRESET = Self::TIM12RS.bits | Self::TIM34RS.bits;
    }
}

bitflags! {
    /// Interrupt control and status register.
    pub struct IntCtlStat: u32 {
        const PRDINTEN12 = 1 << 0;
        /// Pending status, cleared by writing 1.
        const PRDINTSTAT12 = 1 << 1;
        const ACK = Self::PRDINTEN12.bits | Self::PRDINTSTAT12.bits;
    }
}

/// Enable mode programmed by an armed timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutMode {
    OneShot,
    Periodic,
}

impl TimeoutMode {
    /// The `TCR` enable mode bits for this mode.
    pub const fn tcr(self) -> Tcr {
        match self {
            Self::OneShot => Tcr::ENAMODE_ONESHOT,
            Self::Periodic => Tcr::ENAMODE_CONTINUOUS,
        }
    }
}

/// Access to one timer block's registers.
///
/// Reads and writes must reach the device in program order and must never
/// be cached or merged; the counter changes under the driver's feet and most
/// writes have side effects.
pub trait TimerRegisters {
    fn read(&self, reg: TimerReg) -> u32;
    fn write(&self, reg: TimerReg, value: u32);
    /// Wait until every earlier write has reached the device.
    fn barrier(&self);

    /// Execute a register sequence in order.
    fn run(&self, steps: &[Step]) {
        for step in steps {
            match *step {
                Step::Write(reg, value) => self.write(reg, value),
                Step::Barrier => self.barrier(),
            }
        }
    }
}

impl<R: TimerRegisters + ?Sized> TimerRegisters for &R {
    fn read(&self, reg: TimerReg) -> u32 {
        (**self).read(reg)
    }

    fn write(&self, reg: TimerReg, value: u32) {
        (**self).write(reg, value)
    }

    fn barrier(&self) {
        (**self).barrier()
    }
}

/// Memory-mapped registers of a timer block.
#[derive(Debug)]
pub struct KeystoneMmio {
    base_vaddr: usize,
}

impl KeystoneMmio {
    /// # Safety
    ///
    /// `base_vaddr` must point at a mapped, uncached device region of at
    /// least [`REGS_SIZE`] bytes that stays mapped for the lifetime of the
    /// returned value and that no other driver instance accesses.
    pub const unsafe fn new(base_vaddr: usize) -> Self {
        Self { base_vaddr }
    }

    const fn regs(&self) -> &KeystoneTimerRegs {
        unsafe { &*(self.base_vaddr as *const _) }
    }

    fn reg(&self, reg: TimerReg) -> &ReadWrite<u32> {
        let regs = self.regs();
        match reg {
            TimerReg::EmuMgtClkSpd => &regs.emumgt_clkspd,
            TimerReg::CntLo => &regs.cntlo,
            TimerReg::CntHi => &regs.cnthi,
            TimerReg::PrdLo => &regs.prdlo,
            TimerReg::PrdHi => &regs.prdhi,
            TimerReg::Tcr => &regs.tcr,
            TimerReg::Tgcr => &regs.tgcr,
            TimerReg::WdTcr => &regs.wdtcr,
            TimerReg::RelLo => &regs.rello,
            TimerReg::RelHi => &regs.relhi,
            TimerReg::CapLo => &regs.caplo,
            TimerReg::CapHi => &regs.caphi,
            TimerReg::IntCtlStat => &regs.intctlstat,
        }
    }
}

impl TimerRegisters for KeystoneMmio {
    fn read(&self, reg: TimerReg) -> u32 {
        self.reg(reg).get()
    }

    fn write(&self, reg: TimerReg, value: u32) {
        self.reg(reg).set(value)
    }

    fn barrier(&self) {
        dmb();
    }
}

/// Data memory barrier.
#[inline(always)]
pub fn dmb() {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "arm")] {
            unsafe { core::arch::asm!("dmb", options(nostack, preserves_flags)) }
        } else if #[cfg(target_arch = "aarch64")] {
            unsafe { core::arch::asm!("dmb sy", options(nostack, preserves_flags)) }
        } else if #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))] {
            unsafe { core::arch::asm!("fence iorw, iorw", options(nostack, preserves_flags)) }
        } else {
            core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
        }
    }
}
