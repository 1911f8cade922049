// Upstair - MPU6050 Accelerometer Driver
//
// Register-level driver over the shared I2C bus.  Only the accelerometer is
// used; the gyro stays in its power-on configuration.

use anyhow::Context;

use upstair::config::*;
use upstair::events::Sample;

use super::{lock_bus, SharedBus};

// MPU6050 register addresses
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_CONFIG: u8 = 0x1A;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // Start of 6-byte accel burst
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_EXPECTED: u8 = 0x68;

pub struct Mpu6050 {
    bus: SharedBus,
}

impl Mpu6050 {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&self) -> bool {
        let mut bus = lock_bus(self.bus);
        let mut buf = [0u8; 1];
        match bus.write_read(I2C_ADDR_MPU6050, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS) {
            Ok(()) => buf[0] == WHO_AM_I_EXPECTED,
            Err(_) => false,
        }
    }

    /// Wake the sensor and configure accel ±8 g with the 21 Hz DLPF.
    pub fn init(&self) -> anyhow::Result<()> {
        let mut bus = lock_bus(self.bus);

        // Wake up (clear SLEEP bit)
        bus.write(I2C_ADDR_MPU6050, &[REG_PWR_MGMT_1, 0x00], I2C_TIMEOUT_TICKS)
            .context("MPU6050 wake")?;

        // DLPF bandwidth 21 Hz
        bus.write(I2C_ADDR_MPU6050, &[REG_CONFIG, 0x04], I2C_TIMEOUT_TICKS)
            .context("MPU6050 DLPF")?;

        // Accelerometer: ±8 g
        bus.write(I2C_ADDR_MPU6050, &[REG_ACCEL_CONFIG, 0x10], I2C_TIMEOUT_TICKS)
            .context("MPU6050 accel range")?;

        log::info!("MPU6050 initialised (±8g, DLPF 21Hz)");
        Ok(())
    }

    /// Burst-read the three accelerometer axes, in g.
    pub fn read_accel(&self) -> anyhow::Result<Sample> {
        let mut bus = lock_bus(self.bus);
        let mut raw = [0u8; 6];
        bus.write_read(I2C_ADDR_MPU6050, &[REG_ACCEL_XOUT_H], &mut raw, I2C_TIMEOUT_TICKS)?;

        Ok(Sample::new(
            i16::from_be_bytes([raw[0], raw[1]]) as f32 / ACCEL_SCALE_8G,
            i16::from_be_bytes([raw[2], raw[3]]) as f32 / ACCEL_SCALE_8G,
            i16::from_be_bytes([raw[4], raw[5]]) as f32 / ACCEL_SCALE_8G,
        ))
    }
}
