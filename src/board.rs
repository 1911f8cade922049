// Upstair - Board Platform
//
// Binds the control core to the Xiao ESP32-C3 peripherals.

use esp_idf_hal::gpio::{AnyIOPin, Input, PinDriver};

use upstair::config::*;
use upstair::events::Sample;
use upstair::input::ButtonLine;
use upstair::platform::{Frame, Platform};
use upstair::power::battery_percent;

use crate::drivers::battery::BatteryMonitor;
use crate::drivers::display::OledDisplay;
use crate::drivers::imu::Mpu6050;
use crate::drivers::radio::RadioTx;

pub struct Board {
    pub imu: Mpu6050,
    pub display: OledDisplay,
    pub battery: BatteryMonitor,
    pub radio: RadioTx,
    last_battery_level: u8,
}

impl Board {
    pub fn new(imu: Mpu6050, display: OledDisplay, battery: BatteryMonitor, radio: RadioTx) -> Self {
        Self {
            imu,
            display,
            battery,
            radio,
            last_battery_level: 100,
        }
    }
}

impl Platform for Board {
    fn read_accelerometer(&mut self) -> anyhow::Result<Sample> {
        self.imu.read_accel()
    }

    fn read_battery_level(&mut self) -> u8 {
        match self.battery.read_millivolts() {
            Ok(mv) => self.last_battery_level = battery_percent(mv),
            Err(e) => log::warn!("Battery read error: {}", e),
        }
        self.last_battery_level
    }

    fn broadcast(&mut self, payload: &[u8]) -> anyhow::Result<()> {
        self.radio.broadcast(payload)
    }

    fn render(&mut self, frame: &Frame<'_>) {
        if let Err(e) = self.display.show(frame) {
            log::error!("Display error: {}", e);
        }
    }

    fn shutdown(&mut self) {
        let _ = self.display.turn_off();
        enter_deep_sleep();
    }
}

/// Push button wired to ground with the internal pull-up enabled.
pub struct ActiveLow(pub PinDriver<'static, AnyIOPin, Input>);

impl ButtonLine for ActiveLow {
    fn is_pressed(&self) -> bool {
        self.0.is_low()
    }
}

/// Configure GPIO wakeup on a primary button press and enter deep sleep.
/// This function does not return.
pub fn enter_deep_sleep() -> ! {
    log::info!("Entering deep sleep - wake on button press (GPIO{})", PIN_BUTTON_PRIMARY);
    unsafe {
        esp_idf_sys::esp_deep_sleep_enable_gpio_wakeup(
            1u64 << PIN_BUTTON_PRIMARY,
            esp_idf_sys::esp_deepsleep_gpio_wake_up_mode_t_ESP_GPIO_WAKEUP_GPIO_LOW,
        );
        esp_idf_sys::esp_deep_sleep_start();
    }
}
