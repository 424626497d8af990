use super::Scheme;
use crate::{DeviceError, DeviceResult};

/// Static capabilities a timer reports to the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerProperties {
    /// The counter counts up rather than down from a loaded value.
    pub upcounter: bool,
    /// The timer can raise timeouts at all.
    pub timeouts: bool,
    pub relative_timeouts: bool,
    pub periodic_timeouts: bool,
    pub absolute_timeouts: bool,
    /// Significant bits returned by [`TimerScheme::get_time`].
    pub bit_width: u32,
    /// Number of interrupt lines, see [`TimerScheme::get_nth_irq`].
    pub irqs: u32,
}

/// The function table a kernel scheduler uses to drive a hardware timer.
///
/// `handle_irq` comes from [`Scheme`] and must be called once for every
/// interrupt delivered on one of the timer's lines.
pub trait TimerScheme: Scheme {
    fn properties(&self) -> TimerProperties;

    fn start(&self) -> DeviceResult;
    fn stop(&self) -> DeviceResult;

    /// Current raw counter value.
    fn get_time(&self) -> u64;

    /// Fire once at an absolute counter time, in nanoseconds.
    fn oneshot_absolute(&self, _ns: u64) -> DeviceResult {
        Err(DeviceError::NotSupported)
    }
    /// Fire once, `ns` nanoseconds from now.
    fn oneshot_relative(&self, ns: u64) -> DeviceResult;
    /// Fire every `ns` nanoseconds.
    fn periodic(&self, ns: u64) -> DeviceResult;

    fn get_nth_irq(&self, n: usize) -> usize;
}
