use super::keystone::{KeystoneTimer, TimerConfig};
use super::regs::TimerRegisters;
use super::NTIMERS;
use crate::{DeviceError, DeviceResult};

const MODULE: &str = "timer-pool";

/// Fixed set of timer slots, one per timer block on the platform.
///
/// Slots are bound on first request and live as long as the pool.
pub struct TimerPool<R, const N: usize = NTIMERS> {
    slots: [Option<KeystoneTimer<R>>; N],
}

impl<R: TimerRegisters, const N: usize> TimerPool<R, N> {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Bind timer `id` to `config`, reset it and return it.
    ///
    /// Requesting a bound `id` again rebinds the same slot and resets the
    /// hardware once more.
    ///
    /// The returned handle keeps the pool mutably borrowed, so no other slot
    /// can be bound and [`handle_irq`](Self::handle_irq) cannot be called
    /// while it is alive. Drop it after setup and look timers up again with
    /// [`get`](Self::get), which only borrows the pool shared.
    pub fn get_timer(
        &mut self,
        id: usize,
        config: TimerConfig<R>,
    ) -> DeviceResult<&KeystoneTimer<R>> {
        let slot = match self.slots.get_mut(id) {
            Some(slot) => slot,
            None => {
                warn!("{MODULE}: timer id {id} out of range 0..{}", N);
                return Err(DeviceError::InvalidParam);
            }
        };
        info!("{MODULE}: bind timer {id} to irq {}", config.irq);
        Ok(&*slot.insert(KeystoneTimer::new(config)))
    }

    /// A timer bound earlier, without touching the hardware.
    pub fn get(&self, id: usize) -> Option<&KeystoneTimer<R>> {
        self.slots.get(id)?.as_ref()
    }

    /// Acknowledge the interrupt on the timer wired to `irq_num`.
    pub fn handle_irq(&self, irq_num: usize) -> DeviceResult {
        let timer = self
            .slots
            .iter()
            .flatten()
            .find(|timer| timer.irq() == irq_num)
            .ok_or(DeviceError::InvalidParam)?;
        timer.ack_irq();
        Ok(())
    }
}

impl<R: TimerRegisters, const N: usize> Default for TimerPool<R, N> {
    fn default() -> Self {
        Self::new()
    }
}
