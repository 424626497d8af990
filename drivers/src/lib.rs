//! Driver for the TI Keystone 64-bit timer block.
//!
//! The crate models the timer's register map, arms periodic and one-shot
//! timeouts, and acknowledges its interrupt. Mapping the device and routing
//! its interrupt line belong to the platform layer.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
extern crate log;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub mod scheme;
pub mod timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// Invalid parameter.
    InvalidParam,
    /// The operation is not supported by this device.
    NotSupported,
}

pub type DeviceResult<T = ()> = core::result::Result<T, DeviceError>;
