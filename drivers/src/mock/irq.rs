use alloc::collections::BTreeSet;
use core::ops::Range;

use spin::Mutex;

use crate::scheme::{IrqScheme, Scheme};
use crate::{DeviceError, DeviceResult};

/// An interrupt controller that only remembers which lines are masked.
/// Every line starts masked.
pub struct MockIrqController {
    irq_range: Range<usize>,
    unmasked: Mutex<BTreeSet<usize>>,
}

impl MockIrqController {
    pub fn new(irq_range: Range<usize>) -> Self {
        Self {
            irq_range,
            unmasked: Mutex::new(BTreeSet::new()),
        }
    }
}

impl Scheme for MockIrqController {
    fn name(&self) -> &str {
        "mock-irq"
    }
}

impl IrqScheme for MockIrqController {
    fn is_valid_irq(&self, irq_num: usize) -> bool {
        self.irq_range.contains(&irq_num)
    }

    fn is_masked(&self, irq_num: usize) -> DeviceResult<bool> {
        if self.is_valid_irq(irq_num) {
            Ok(!self.unmasked.lock().contains(&irq_num))
        } else {
            Err(DeviceError::InvalidParam)
        }
    }

    fn mask(&self, irq_num: usize) -> DeviceResult {
        if self.is_valid_irq(irq_num) {
            self.unmasked.lock().remove(&irq_num);
            Ok(())
        } else {
            Err(DeviceError::InvalidParam)
        }
    }

    fn unmask(&self, irq_num: usize) -> DeviceResult {
        if self.is_valid_irq(irq_num) {
            self.unmasked.lock().insert(irq_num);
            Ok(())
        } else {
            Err(DeviceError::InvalidParam)
        }
    }
}
