// Upstair - Board Drivers
//
// Register-level drivers for the peripherals on the shared I2C bus plus the
// radio and battery ADC.  Firmware build only.

pub mod battery;
pub mod display;
pub mod imu;
pub mod radio;

use std::sync::{Mutex, MutexGuard, PoisonError};

use esp_idf_hal::i2c::I2cDriver;

/// Thread-safe handle to a shared I2C bus.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;

/// Lock the bus.  A panicked holder leaves no half-written register state
/// worth refusing, so poisoning is ignored.
pub fn lock_bus(bus: SharedBus) -> MutexGuard<'static, I2cDriver<'static>> {
    bus.lock().unwrap_or_else(PoisonError::into_inner)
}
