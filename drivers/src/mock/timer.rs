use alloc::vec::Vec;

use spin::Mutex;

use crate::timer::regs::{IntCtlStat, Tcr, Tgcr, TimerReg, TimerRegisters, REGS_SIZE};

/// One register access as seen by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(TimerReg),
    Write(TimerReg, u32),
    Barrier,
}

struct BlockState {
    words: [u32; REGS_SIZE / 4],
    log: Vec<Access>,
}

impl BlockState {
    fn get(&self, reg: TimerReg) -> u32 {
        self.words[usize::from(reg) / 4]
    }

    fn set(&mut self, reg: TimerReg, value: u32) {
        self.words[usize::from(reg) / 4] = value;
    }

    fn get64(&self, lo: TimerReg, hi: TimerReg) -> u64 {
        (self.get(hi) as u64) << 32 | self.get(lo) as u64
    }

    fn set64(&mut self, lo: TimerReg, hi: TimerReg, value: u64) {
        self.set(lo, value as u32);
        self.set(hi, (value >> 32) as u32);
    }

    /// Device-side effect of a bus write.
    fn store(&mut self, reg: TimerReg, value: u32) {
        match reg {
            TimerReg::IntCtlStat => {
                let old = IntCtlStat::from_bits_truncate(self.get(reg));
                let new = IntCtlStat::from_bits_truncate(value);
                let pending = old & IntCtlStat::PRDINTSTAT12 & !new;
                let enable = new & IntCtlStat::PRDINTEN12;
                self.set(reg, (pending | enable).bits());
            }
            _ => self.set(reg, value),
        }
    }
}

/// A timer64 block backed by plain memory.
///
/// Every access through [`TimerRegisters`] is logged. `INTCTLSTAT` keeps its
/// pending bit until a 1 is written to it, and [`MockTimerBlock::advance`]
/// counts the way the hardware does in one-shot and continuous mode.
pub struct MockTimerBlock {
    inner: Mutex<BlockState>,
}

impl MockTimerBlock {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BlockState {
                words: [0; REGS_SIZE / 4],
                log: Vec::new(),
            }),
        }
    }

    pub fn accesses(&self) -> Vec<Access> {
        self.inner.lock().log.clone()
    }

    pub fn writes(&self) -> Vec<(TimerReg, u32)> {
        self.inner
            .lock()
            .log
            .iter()
            .filter_map(|a| match *a {
                Access::Write(reg, value) => Some((reg, value)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_log(&self) {
        self.inner.lock().log.clear();
    }

    /// Read a register without logging or side effects.
    pub fn peek(&self, reg: TimerReg) -> u32 {
        self.inner.lock().get(reg)
    }

    /// Overwrite a register without logging or side effects.
    pub fn poke(&self, reg: TimerReg, value: u32) {
        self.inner.lock().set(reg, value);
    }

    pub fn counter(&self) -> u64 {
        self.inner.lock().get64(TimerReg::CntLo, TimerReg::CntHi)
    }

    pub fn period(&self) -> u64 {
        self.inner.lock().get64(TimerReg::PrdLo, TimerReg::PrdHi)
    }

    pub fn irq_pending(&self) -> bool {
        IntCtlStat::from_bits_truncate(self.peek(TimerReg::IntCtlStat))
            .contains(IntCtlStat::PRDINTSTAT12)
    }

    /// The interrupt line is high while status is pending and enabled.
    pub fn irq_asserted(&self) -> bool {
        IntCtlStat::from_bits_truncate(self.peek(TimerReg::IntCtlStat)).contains(IntCtlStat::ACK)
    }

    /// Let `ticks` clock cycles elapse.
    pub fn advance(&self, mut ticks: u64) {
        let mut s = self.inner.lock();
        while ticks > 0 {
            let tcr = Tcr::from_bits_truncate(s.get(TimerReg::Tcr));
            let mode = tcr & Tcr::ENAMODE;
            let tgcr = Tgcr::from_bits_truncate(s.get(TimerReg::Tgcr));
            if mode.is_empty() || !tgcr.contains(Tgcr::UNRESET) {
                return;
            }
            let period = s.get64(TimerReg::PrdLo, TimerReg::PrdHi);
            let counter = s.get64(TimerReg::CntLo, TimerReg::CntHi);
            let remaining = period.saturating_sub(counter).max(1);
            if ticks < remaining {
                s.set64(TimerReg::CntLo, TimerReg::CntHi, counter + ticks);
                return;
            }
            ticks -= remaining;
            let stat = s.get(TimerReg::IntCtlStat) | IntCtlStat::PRDINTSTAT12.bits();
            s.set(TimerReg::IntCtlStat, stat);
            if mode == Tcr::ENAMODE_ONESHOT {
                // one-shot stops at the period and drops back to disabled
                s.set64(TimerReg::CntLo, TimerReg::CntHi, period);
                s.set(TimerReg::Tcr, (tcr - Tcr::ENAMODE).bits());
            } else {
                s.set64(TimerReg::CntLo, TimerReg::CntHi, 0);
            }
        }
    }
}

impl Default for MockTimerBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerRegisters for MockTimerBlock {
    fn read(&self, reg: TimerReg) -> u32 {
        let mut s = self.inner.lock();
        s.log.push(Access::Read(reg));
        s.get(reg)
    }

    fn write(&self, reg: TimerReg, value: u32) {
        let mut s = self.inner.lock();
        s.log.push(Access::Write(reg, value));
        s.store(reg, value);
    }

    fn barrier(&self) {
        self.inner.lock().log.push(Access::Barrier);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn running(block: &MockTimerBlock, mode: u32, period: u64) {
        block.write(TimerReg::Tgcr, 0x03);
        block.write(TimerReg::IntCtlStat, 0x01);
        block.write(TimerReg::PrdLo, period as u32);
        block.write(TimerReg::PrdHi, (period >> 32) as u32);
        block.write(TimerReg::Tcr, mode);
    }

    #[test]
    fn test_status_write_one_to_clear() {
        let block = MockTimerBlock::new();
        running(&block, 0x80, 10);
        block.advance(10);
        assert!(block.irq_pending());

        block.write(TimerReg::IntCtlStat, 0x01);
        assert!(block.irq_pending());
        block.write(TimerReg::IntCtlStat, 0x03);
        assert!(!block.irq_pending());
        assert_eq!(block.read(TimerReg::IntCtlStat), 0x01);
    }

    #[test]
    fn test_masked_status_does_not_assert() {
        let block = MockTimerBlock::new();
        running(&block, 0x80, 10);
        block.write(TimerReg::IntCtlStat, 0x00);
        block.advance(25);
        assert!(block.irq_pending());
        assert!(!block.irq_asserted());
    }

    #[test]
    fn test_counting_modes() {
        let block = MockTimerBlock::new();
        running(&block, 0x80, 10);
        block.advance(25);
        assert_eq!(block.counter(), 5);

        let block = MockTimerBlock::new();
        running(&block, 0x40, 10);
        block.advance(25);
        assert_eq!(block.counter(), 10);
        assert_eq!(block.peek(TimerReg::Tcr), 0);
    }

    #[test]
    fn test_held_in_reset() {
        let block = MockTimerBlock::new();
        running(&block, 0x80, 10);
        block.write(TimerReg::Tgcr, 0);
        block.advance(25);
        assert_eq!(block.counter(), 0);
        assert!(!block.irq_pending());
    }

    #[test]
    fn test_log() {
        let block = MockTimerBlock::new();
        block.write(TimerReg::Tcr, 1);
        block.barrier();
        block.read(TimerReg::CntLo);
        block.poke(TimerReg::CntHi, 9);
        assert_eq!(
            block.accesses(),
            [
                Access::Write(TimerReg::Tcr, 1),
                Access::Barrier,
                Access::Read(TimerReg::CntLo),
            ]
        );
        assert_eq!(block.writes(), [(TimerReg::Tcr, 1)]);
        block.clear_log();
        assert!(block.accesses().is_empty());
    }
}
