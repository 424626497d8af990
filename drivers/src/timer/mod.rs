//! Timer device drivers.

mod keystone;
mod pool;
pub mod regs;
pub mod sequence;

pub use keystone::{ns_to_ticks, KeystoneTimer, TimerConfig, KEYSTONE_TIMER_PROPERTIES};
pub use pool::TimerPool;
pub use regs::{KeystoneMmio, TimeoutMode, TimerReg, TimerRegisters};

use crate::scheme::IrqScheme;
use crate::DeviceResult;

const MODULE: &str = "timer";

/// Keystone II timer64 input clock.
pub const TICKS_PER_SECOND: u64 = 204_800_000;
pub const NANOS_PER_SEC: u64 = 1_000_000_000;
/// Shortest period the counter reliably reloads at.
pub const MIN_TICKS: u64 = 2;
/// Timer64 blocks on a Keystone II SoC.
pub const NTIMERS: usize = 20;

/// Run `f` with `irq_num` masked at the interrupt controller.
///
/// This is how callers keep a timer's interrupt handler away while they
/// reprogram it. The line is left in the mask state it had before the call,
/// so a caller that already masked it keeps it masked. If reading the state
/// or masking fails `f` is not run. Once `f` has run its result is returned
/// even if unmasking fails.
pub fn with_irq_masked<T>(
    ic: &dyn IrqScheme,
    irq_num: usize,
    f: impl FnOnce() -> T,
) -> DeviceResult<T> {
    let was_masked = ic.is_masked(irq_num)?;
    if !was_masked {
        ic.mask(irq_num)?;
    }
    let ret = f();
    if !was_masked {
        if let Err(err) = ic.unmask(irq_num) {
            warn!("{MODULE}: failed to unmask irq {irq_num}: {err:?}");
        }
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockIrqController, MockTimerBlock};
    use crate::scheme::Scheme;
    use crate::DeviceError;

    /// A controller whose lines can be masked but never unmasked again.
    struct StuckMask(MockIrqController);

    impl Scheme for StuckMask {
        fn name(&self) -> &str {
            "stuck-mask"
        }
    }

    impl IrqScheme for StuckMask {
        fn is_valid_irq(&self, irq_num: usize) -> bool {
            self.0.is_valid_irq(irq_num)
        }

        fn is_masked(&self, irq_num: usize) -> DeviceResult<bool> {
            self.0.is_masked(irq_num)
        }

        fn mask(&self, irq_num: usize) -> DeviceResult {
            self.0.mask(irq_num)
        }

        fn unmask(&self, _irq_num: usize) -> DeviceResult {
            Err(DeviceError::NotSupported)
        }
    }

    #[test]
    fn reprogram_with_line_masked() {
        let ic = MockIrqController::new(32..128);
        let block = MockTimerBlock::new();
        let mut pool: TimerPool<&MockTimerBlock> = TimerPool::new();
        let config = TimerConfig { regs: &block, irq: 66 };
        let timer = pool.get_timer(3, config).unwrap();
        ic.unmask(66).unwrap();

        let ret = with_irq_masked(&ic, timer.irq(), || {
            assert_eq!(ic.is_masked(66), Ok(true));
            timer.set_timeout(5_000_000, TimeoutMode::Periodic)
        });
        assert_eq!(ret, Ok(Ok(())));
        assert_eq!(ic.is_masked(66), Ok(false));
        assert_eq!(block.period(), ns_to_ticks(5_000_000));
    }

    #[test]
    fn masked_line_stays_masked() {
        let ic = MockIrqController::new(32..128);
        let block = MockTimerBlock::new();
        let timer = KeystoneTimer::new(TimerConfig { regs: &block, irq: 66 });
        assert_eq!(ic.is_masked(66), Ok(true));

        let ret = with_irq_masked(&ic, 66, || {
            timer.set_timeout(5_000_000, TimeoutMode::Periodic)
        });
        assert_eq!(ret, Ok(Ok(())));
        assert_eq!(ic.is_masked(66), Ok(true));
        assert_eq!(block.period(), ns_to_ticks(5_000_000));
    }

    #[test]
    fn unmask_failure_keeps_result() {
        let ic = StuckMask(MockIrqController::new(32..128));
        ic.0.unmask(66).unwrap();
        let block = MockTimerBlock::new();
        let timer = KeystoneTimer::new(TimerConfig { regs: &block, irq: 66 });

        let ret = with_irq_masked(&ic, 66, || {
            timer.set_timeout(5_000_000, TimeoutMode::OneShot)
        });
        assert_eq!(ret, Ok(Ok(())));
        assert_eq!(ic.is_masked(66), Ok(true));
        assert_eq!(block.period(), ns_to_ticks(5_000_000));
    }

    #[test]
    fn mask_failure_skips_reprogram() {
        let ic = MockIrqController::new(32..128);
        let block = MockTimerBlock::new();
        let timer = KeystoneTimer::new(TimerConfig { regs: &block, irq: 7 });
        block.clear_log();

        let ret = with_irq_masked(&ic, timer.irq(), || {
            timer.set_timeout(5_000_000, TimeoutMode::OneShot)
        });
        assert_eq!(ret, Err(DeviceError::InvalidParam));
        assert!(block.accesses().is_empty());
    }
}
