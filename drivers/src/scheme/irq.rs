use super::Scheme;
use crate::DeviceResult;

pub trait IrqScheme: Scheme {
    fn is_valid_irq(&self, irq_num: usize) -> bool;

    /// Whether `irq_num` is currently masked.
    fn is_masked(&self, irq_num: usize) -> DeviceResult<bool>;
    fn mask(&self, irq_num: usize) -> DeviceResult;
    fn unmask(&self, irq_num: usize) -> DeviceResult;
}
