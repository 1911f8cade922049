// Upstair - Firmware Entry Point
//
// Boot sequence (ESP32-C3):
//   1. Bring up the shared I2C bus, the MPU6050 and the OLED.
//   2. Start Wi-Fi in station mode and ESP-NOW on top of it.
//   3. Spawn the button, receive and application tasks.
//
// The application task owns the board from then on and puts it into deep
// sleep on a confirmed shutdown or when auto-sleep expires.
//
// On a host the same tasks run against the simulator instead.

#[cfg(target_os = "espidf")]
mod board;
#[cfg(target_os = "espidf")]
mod drivers;

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    host::run()
}

// ---------------------------------------------------------------------------
// Firmware
// ---------------------------------------------------------------------------

#[cfg(target_os = "espidf")]
mod firmware {
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use anyhow::Context;
    use esp_idf_hal::gpio::{IOPin, PinDriver, Pull};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_hal::task::thread::ThreadSpawnConfiguration;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use upstair::app::App;
    use upstair::config::*;
    use upstair::events::ButtonEvent;
    use upstair::input::InputManager;
    use upstair::mailbox::mailbox;
    use upstair::tasks;

    use crate::board::{enter_deep_sleep, ActiveLow, Board};
    use crate::drivers::battery::BatteryMonitor;
    use crate::drivers::display::OledDisplay;
    use crate::drivers::imu::Mpu6050;
    use crate::drivers::radio;

    pub fn run() -> anyhow::Result<()> {
        // Link esp-idf-sys runtime patches and initialise logging.
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
        log::info!("Upstair firmware starting");

        // ---- Peripherals --------------------------------------------------
        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;

        // ---- I2C bus (shared between OLED and MPU6050) --------------------
        let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio6, // SDA
            peripherals.pins.gpio7, // SCL
            &i2c_config,
        )?;
        // SAFETY: The I2C peripheral is a singleton obtained from `Peripherals::take()`.
        // It lives for the entire programme duration (firmware never exits).
        let i2c_bus: &'static Mutex<I2cDriver<'static>> =
            Box::leak(Box::new(Mutex::new(unsafe { core::mem::transmute(i2c) })));

        // ---- Devices ------------------------------------------------------
        let mut display = OledDisplay::new(i2c_bus);
        if !display.is_connected() {
            log::error!("OLED not responding at 0x{:02X}", I2C_ADDR_OLED);
        }
        display.init().context("OLED init")?;

        let imu = Mpu6050::new(i2c_bus);
        if !imu.is_connected() {
            log::error!("MPU6050 not responding at 0x{:02X}", I2C_ADDR_MPU6050);
            // A board without its sensor has nothing to track.
            enter_deep_sleep();
        }
        imu.init()?;

        let battery = BatteryMonitor::new().context("battery ADC")?;
        let (_wifi, radio_tx, radio_rx) = radio::start(peripherals.modem, sysloop, nvs)?;

        let board = Board::new(imu, display, battery, radio_tx);

        // ---- Buttons (pull-up, active LOW) --------------------------------
        let mut primary = PinDriver::input(peripherals.pins.gpio3.downgrade())?;
        primary.set_pull(Pull::Up)?;
        let mut secondary = PinDriver::input(peripherals.pins.gpio4.downgrade())?;
        secondary.set_pull(Pull::Up)?;

        // ---- Channels / shared state --------------------------------------
        let (button_tx, button_rx) = mpsc::channel();
        let (inbox_writer, inbox_reader) = mailbox();

        // ---- Spawn tasks (map to FreeRTOS tasks via std::thread) ----------

        // Button polling
        let secondary_tx = button_tx.clone();
        thread::Builder::new()
            .name("input".into())
            .stack_size(STACK_COMM)
            .spawn(move || {
                let mut inputs = [
                    InputManager::new(ActiveLow(primary), ButtonEvent::Primary, button_tx),
                    InputManager::new(ActiveLow(secondary), ButtonEvent::Secondary, secondary_tx),
                ];
                let poll_interval = Duration::from_millis(UI_POLL_INTERVAL_MS);
                loop {
                    for input in inputs.iter_mut() {
                        input.update();
                    }
                    thread::sleep(poll_interval);
                }
            })?;

        // Receive task.  Lower priority than the application task.
        ThreadSpawnConfiguration {
            name: Some(b"comm\0"),
            stack_size: STACK_COMM,
            priority: PRIORITY_COMM,
            ..Default::default()
        }
        .set()?;
        thread::Builder::new()
            .stack_size(STACK_COMM)
            .spawn(move || {
                tasks::comm::comm_task(radio_rx, inbox_writer, Duration::from_millis(COMM_POLL_INTERVAL_MS))
            })?;

        // Application task
        ThreadSpawnConfiguration {
            name: Some(b"app\0"),
            stack_size: STACK_APP,
            priority: PRIORITY_APP,
            ..Default::default()
        }
        .set()?;
        thread::Builder::new().stack_size(STACK_APP).spawn(move || {
            let mut board = board;
            tasks::app::app_task(
                App::new(inbox_reader),
                &mut board,
                button_rx,
                Duration::from_millis(TICK_INTERVAL_MS),
            );
            // Deep sleep should not return; make sure we never run on.
            enter_deep_sleep();
        })?;
        ThreadSpawnConfiguration::default().set()?;

        // Main thread has nothing left to do - park it forever, keeping the
        // Wi-Fi driver alive.
        loop {
            thread::sleep(Duration::from_secs(60));
        }
    }
}

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use log::{LevelFilter, Log, Metadata, Record};

    use upstair::app::App;
    use upstair::config::*;
    use upstair::events::{ButtonEvent, Message, Received, Sample};
    use upstair::mailbox::mailbox;
    use upstair::sim::{sim_radio, Motion, SimPlatform};
    use upstair::tasks;

    /// Sensor reads spent climbing before the wearer stands still.
    const CLIMB_READS: u32 = 200;

    struct StderrLogger;

    impl Log for StderrLogger {
        fn enabled(&self, metadata: &Metadata<'_>) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record<'_>) {
            if self.enabled(record.metadata()) {
                eprintln!("{:<5} {}: {}", record.level(), record.target(), record.args());
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: StderrLogger = StderrLogger;

    pub fn run() -> anyhow::Result<()> {
        log::set_logger(&LOGGER).map_err(|e| anyhow::anyhow!("logger: {}", e))?;
        log::set_max_level(LevelFilter::Info);
        log::info!("Upstair simulation starting");

        let (inbox_writer, inbox_reader) = mailbox();
        let (radio_tx, radio_rx) = sim_radio();
        thread::Builder::new().name("comm".into()).spawn(move || {
            tasks::comm::comm_task(radio_rx, inbox_writer, Duration::from_millis(COMM_POLL_INTERVAL_MS))
        })?;

        for (i, text) in ["Go team!", "Stairs > lift"].into_iter().enumerate() {
            let _ = radio_tx.send(Received {
                sender: [0x24, 0x6f, 0x28, 0, 0, i as u8],
                message: Message::from(text),
            });
        }

        // Menu -> Settings, enable auto-sleep, back to Main.
        let (button_tx, button_rx) = mpsc::channel();
        for event in [
            ButtonEvent::Primary,
            ButtonEvent::Primary,
            ButtonEvent::Primary,
            ButtonEvent::Primary,
            ButtonEvent::Secondary,
            ButtonEvent::Secondary,
            ButtonEvent::Primary,
            ButtonEvent::Primary,
            ButtonEvent::Secondary,
        ] {
            let _ = button_tx.send(event);
        }

        let mut platform = SimPlatform::new(Motion::Custom(Box::new(|read| {
            if read < CLIMB_READS {
                let jolt = if read % 2 == 0 { 0.6 } else { -0.6 };
                Some(Sample::new(jolt, 0.1, 1.0))
            } else {
                Some(Sample::new(0.0, 0.0, 1.0))
            }
        })))
        .with_battery(87);

        let app = tasks::app::app_task(App::new(inbox_reader), &mut platform, button_rx, Duration::from_millis(1));

        println!("ticks run:      {}", app.tick());
        println!("score:          {}", app.score());
        println!("broadcasts:     {}", platform.broadcasts.len());
        println!("frames drawn:   {}", platform.frames.len());
        if let Some(last) = platform.frames.last() {
            println!("inbox:          {:?} (unread: {})", last.messages, last.unread);
        }
        println!("shut down:      {}", platform.shut_down);
        Ok(())
    }
}
