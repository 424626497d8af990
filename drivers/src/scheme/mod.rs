//! Device-facing traits implemented by drivers and consumed by the kernel.

mod irq;
mod timer;

pub use irq::IrqScheme;
pub use timer::{TimerProperties, TimerScheme};

pub trait Scheme: Send + Sync {
    fn name(&self) -> &str;
    fn handle_irq(&self, _irq_num: usize) {}
}
