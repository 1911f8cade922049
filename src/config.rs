// Upstair - Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V) with MPU6050 and SSD1306

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_BUTTON_PRIMARY: i32 = 3;   // D1/A1 - Button 1: menu / back (INPUT_PULLUP, active LOW)
pub const PIN_BUTTON_SECONDARY: i32 = 4; // D2/A2 - Button 2: select / power (INPUT_PULLUP, active LOW)
pub const PIN_I2C_SDA: i32 = 6;          // D4    - I2C data line
pub const PIN_I2C_SCL: i32 = 7;          // D5    - I2C clock line
pub const PIN_BATTERY_ADC: u32 = 2;      // D0/A0 - Battery voltage (ADC)

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 1024

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------
pub const STACK_APP: usize = 8192;
pub const STACK_COMM: usize = 4096;
pub const PRIORITY_APP: u8 = 2; // pre-empts the receive task
pub const PRIORITY_COMM: u8 = 1;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------
pub const TICK_INTERVAL_MS: u64 = 50;       // application tick, ~20 Hz
pub const COMM_POLL_INTERVAL_MS: u64 = 5;   // receive task idle poll
pub const UI_POLL_INTERVAL_MS: u64 = 10;    // button poll
pub const DEBOUNCE_MS: u64 = 50;

// Periods below are counted in application ticks.
pub const SAMPLE_PERIOD: u32 = 2;           // 10 Hz sensor reads
pub const FRAME_PERIOD: u32 = 3;            // ~6.7 Hz redraws
pub const BATTERY_PERIOD: u32 = 15;
pub const SCORE_PERIOD: u32 = 20;           // about once per second
pub const SEND_COOLDOWN_TICKS: u32 = SAMPLE_PERIOD * 80; // 160 ticks = 8 s
pub const AUTO_SLEEP_TICKS: u32 = 1800;     // 90 s without input or motion

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------
pub const MAILBOX_CAPACITY: usize = 6;
pub const MAX_TEXT_LEN: usize = 16;         // characters that fit on one line
pub const INSPIRE_MESSAGE: &str = "I'm so fit!";
pub const BROADCAST_ADDR: [u8; 6] = [0xFF; 6];

// ---------------------------------------------------------------------------
// Step detection
// ---------------------------------------------------------------------------
pub const MA_N: usize = 8;                  // moving-average window per axis
pub const MOTION_THRESHOLD: f32 = 0.19;     // g, deviation from baseline counted as a shake
pub const STAIRS_LIMIT: f32 = 5.0;          // shakiness at or above this -> Stairs
pub const IDLE_LIMIT: f32 = 3.0;            // shakiness below this -> Idle
pub const MAX_SHAKINESS: f32 = 7.0;
pub const MIN_SHAKINESS: f32 = 0.0;
pub const SHAKINESS_RISE: f32 = 0.7;
pub const SHAKINESS_DROP: f32 = 0.5;

// ---------------------------------------------------------------------------
// Menus
// ---------------------------------------------------------------------------
pub const MAIN_MENU_LEN: u8 = 4;

// ---------------------------------------------------------------------------
// Battery / MPU6050 Scale Factors
// ---------------------------------------------------------------------------
pub const BATTERY_EMPTY_MV: u32 = 3300;
pub const BATTERY_FULL_MV: u32 = 4200;
pub const ACCEL_SCALE_8G: f32 = 4096.0;     // LSB/g at ±8 g
