//! Ordered register programming sequences.
//!
//! The timer only behaves when some writes have retired before later ones are
//! issued, so each multi-write operation is built as a list of steps and run
//! in one pass by [`TimerRegisters::run`](super::regs::TimerRegisters::run).

use super::regs::{IntCtlStat, Tcr, Tgcr, TimeoutMode, TimerReg};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Write(TimerReg, u32),
    /// Earlier writes must reach the device before later ones.
    Barrier,
}

pub const RESET_STEPS: usize = 7;
pub const ARM_STEPS: usize = 9;

/// Disable the timer, cycle the block through reset and enable its interrupt.
pub const fn reset_sequence() -> [Step; RESET_STEPS] {
    [
        // disabled, internal clock source
        Step::Write(TimerReg::Tcr, 0),
        Step::Barrier,
        // reset as one 64-bit timer, no prescaler
        Step::Write(TimerReg::Tgcr, 0),
        Step::Write(TimerReg::Tgcr, Tgcr::UNRESET.bits()),
        Step::Write(TimerReg::CntLo, 0),
        Step::Write(TimerReg::CntHi, 0),
        Step::Write(TimerReg::IntCtlStat, IntCtlStat::PRDINTEN12.bits()),
    ]
}

/// Reprogram the period and restart counting from zero in `mode`.
///
/// `tcr` is the control register as read just before the sequence runs;
/// bits outside the enable mode field are carried over. The counter must
/// be stopped before the counter and period words change.
pub const fn arm_sequence(tcr: u32, ticks: u64, mode: TimeoutMode) -> [Step; ARM_STEPS] {
    let off = tcr & !Tcr::ENAMODE.bits();
    let on = off | mode.tcr().bits();
    [
        Step::Write(TimerReg::Tcr, off),
        Step::Barrier,
        Step::Write(TimerReg::CntLo, 0),
        Step::Write(TimerReg::CntHi, 0),
        Step::Write(TimerReg::PrdLo, ticks as u32),
        Step::Write(TimerReg::PrdHi, (ticks >> 32) as u32),
        // drop any status left over from the previous timeout
        Step::Write(TimerReg::IntCtlStat, IntCtlStat::ACK.bits()),
        Step::Barrier,
        Step::Write(TimerReg::Tcr, on),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(steps: &[Step], want: Step) -> usize {
        steps.iter().position(|s| *s == want).unwrap()
    }

    #[test]
    fn reset_disables_before_reset() {
        let steps = reset_sequence();
        assert_eq!(steps[0], Step::Write(TimerReg::Tcr, 0));
        assert_eq!(steps[1], Step::Barrier);
        assert_eq!(
            &steps[2..4],
            &[
                Step::Write(TimerReg::Tgcr, 0),
                Step::Write(TimerReg::Tgcr, 0x03)
            ]
        );
        assert_eq!(steps[6], Step::Write(TimerReg::IntCtlStat, 0x01));
    }

    #[test]
    fn arm_orders_disable_program_enable() {
        let steps = arm_sequence(0x0000_0cc4, 0x1_2345_6789, TimeoutMode::Periodic);
        let disable = position(&steps, Step::Write(TimerReg::Tcr, 0x0000_0c04));
        let prdlo = position(&steps, Step::Write(TimerReg::PrdLo, 0x2345_6789));
        let prdhi = position(&steps, Step::Write(TimerReg::PrdHi, 0x1));
        let ack = position(&steps, Step::Write(TimerReg::IntCtlStat, 0x03));
        let enable = position(&steps, Step::Write(TimerReg::Tcr, 0x0000_0c84));

        assert_eq!(disable, 0);
        assert_eq!(steps[disable + 1], Step::Barrier);
        assert!(disable < prdlo && prdlo < prdhi && prdhi < ack);
        assert_eq!(steps[enable - 1], Step::Barrier);
        assert_eq!(enable, ARM_STEPS - 1);
    }

    #[test]
    fn arm_replaces_previous_mode() {
        let steps = arm_sequence(0x80, 100, TimeoutMode::OneShot);
        assert_eq!(steps[0], Step::Write(TimerReg::Tcr, 0x00));
        assert_eq!(steps[ARM_STEPS - 1], Step::Write(TimerReg::Tcr, 0x40));
    }
}
