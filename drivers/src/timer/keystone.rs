//! Keystone timer64 block run as one 64-bit timer.

use super::regs::{IntCtlStat, KeystoneMmio, Tcr, TimeoutMode, TimerReg, TimerRegisters};
use super::sequence::{arm_sequence, reset_sequence};
use super::{MIN_TICKS, NANOS_PER_SEC, TICKS_PER_SECOND};
use crate::scheme::{Scheme, TimerProperties, TimerScheme};
use crate::{DeviceError, DeviceResult};

const MODULE: &str = "keystone-timer";

/// Capabilities shared by every Keystone timer instance.
pub const KEYSTONE_TIMER_PROPERTIES: TimerProperties = TimerProperties {
    upcounter: false,
    timeouts: true,
    relative_timeouts: true,
    periodic_timeouts: true,
    absolute_timeouts: false,
    // only CNTLO is reported by `get_time`
    bit_width: 32,
    irqs: 1,
};

/// Convert a duration to timer ticks, rounding down.
///
/// The product is taken in 128 bits, so every `u64` duration converts
/// exactly. The result fits in 64 bits because the clock runs below 1 GHz.
pub const fn ns_to_ticks(ns: u64) -> u64 {
    (ns as u128 * TICKS_PER_SECOND as u128 / NANOS_PER_SEC as u128) as u64
}

/// Everything the platform layer hands over to bind a timer.
#[derive(Debug)]
pub struct TimerConfig<R> {
    pub regs: R,
    pub irq: usize,
}

impl TimerConfig<KeystoneMmio> {
    /// # Safety
    ///
    /// See [`KeystoneMmio::new`].
    pub unsafe fn from_vaddr(base_vaddr: usize, irq: usize) -> Self {
        Self {
            regs: KeystoneMmio::new(base_vaddr),
            irq,
        }
    }
}

/// One timer block and the interrupt line it raises.
///
/// The driver takes no locks. A caller that reprograms a running timer must
/// keep its interrupt from being handled meanwhile, for example with
/// [`with_irq_masked`](super::with_irq_masked).
pub struct KeystoneTimer<R> {
    regs: R,
    irq: usize,
}

impl<R: TimerRegisters> KeystoneTimer<R> {
    /// Bind a timer and bring it to a known state.
    pub fn new(config: TimerConfig<R>) -> Self {
        let timer = Self {
            regs: config.regs,
            irq: config.irq,
        };
        timer.reset();
        timer
    }

    pub fn irq(&self) -> usize {
        self.irq
    }

    /// Stop the timer, clear the counter and enable its interrupt.
    pub fn reset(&self) {
        self.regs.run(&reset_sequence());
    }

    /// Resume counting in every enable mode. Period and counter are untouched.
    pub fn enable(&self) {
        let tcr = self.regs.read(TimerReg::Tcr);
        self.regs.write(TimerReg::Tcr, tcr | Tcr::ENAMODE.bits());
    }

    /// Stop counting. Period and counter are untouched.
    pub fn disable(&self) {
        let tcr = self.regs.read(TimerReg::Tcr);
        self.regs.write(TimerReg::Tcr, tcr & !Tcr::ENAMODE.bits());
    }

    /// Arm a timeout `ns` nanoseconds long and start counting from zero.
    ///
    /// Fails with [`DeviceError::InvalidParam`] without touching the device
    /// when `ns` is shorter than two ticks.
    ///
    /// # Interrupt exclusion
    ///
    /// The sequence is not atomic with respect to this timer's interrupt.
    /// The caller must keep [`KeystoneTimer::ack_irq`] from running on
    /// another context until this returns.
    pub fn set_timeout(&self, ns: u64, mode: TimeoutMode) -> DeviceResult {
        let ticks = ns_to_ticks(ns);
        if ticks < MIN_TICKS {
            debug!("{MODULE}: reject {ns}ns timeout: {ticks} ticks");
            return Err(DeviceError::InvalidParam);
        }
        trace!("{MODULE}: arm {mode:?} timeout of {ticks} ticks on irq {}", self.irq);
        let tcr = self.regs.read(TimerReg::Tcr);
        self.regs.run(&arm_sequence(tcr, ticks, mode));
        Ok(())
    }

    /// The low counter word. It may be stale by the time it is used.
    pub fn counter(&self) -> u64 {
        self.regs.read(TimerReg::CntLo) as u64
    }

    /// Clear the pending status so the line can assert again.
    pub fn ack_irq(&self) {
        self.regs.write(TimerReg::IntCtlStat, IntCtlStat::ACK.bits());
    }
}

impl<R: TimerRegisters + Send + Sync> Scheme for KeystoneTimer<R> {
    fn name(&self) -> &str {
        "keystone-timer64"
    }

    fn handle_irq(&self, _irq_num: usize) {
        self.ack_irq();
    }
}

impl<R: TimerRegisters + Send + Sync> TimerScheme for KeystoneTimer<R> {
    fn properties(&self) -> TimerProperties {
        KEYSTONE_TIMER_PROPERTIES
    }

    fn start(&self) -> DeviceResult {
        self.enable();
        Ok(())
    }

    fn stop(&self) -> DeviceResult {
        self.disable();
        Ok(())
    }

    fn get_time(&self) -> u64 {
        self.counter()
    }

    fn oneshot_relative(&self, ns: u64) -> DeviceResult {
        self.set_timeout(ns, TimeoutMode::OneShot)
    }

    fn periodic(&self, ns: u64) -> DeviceResult {
        self.set_timeout(ns, TimeoutMode::Periodic)
    }

    /// `n` must be 0: the block has a single line.
    fn get_nth_irq(&self, _n: usize) -> usize {
        self.irq
    }
}
