//! Mock devices, including a timer block and an interrupt controller.

mod irq;
mod timer;

pub use irq::MockIrqController;
pub use timer::{Access, MockTimerBlock};
