// Upstair - SSD1306 OLED Driver
//
// Pushes a page-ordered `FrameBuffer` to the 128x64 panel over the shared
// I2C bus.  Drawing happens off-bus in `upstair::render`.

use anyhow::Context;

use upstair::config::*;
use upstair::platform::Frame;
use upstair::render::{draw_frame, FrameBuffer};

use super::{lock_bus, SharedBus};

const CONTROL_CMD: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

const INIT_SEQUENCE: &[u8] = &[
    0xAE, // display off
    0xD5, 0x80, // clock divide
    0xA8, 0x3F, // multiplex 64
    0xD3, 0x00, // no offset
    0x40, // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing
    0xA1, // segment remap
    0xC8, // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge
    0xDB, 0x40, // VCOMH
    0xA4, // follow RAM
    0xA6, // normal (not inverted)
    0xAF, // display on
];

pub struct OledDisplay {
    bus: SharedBus,
    buffer: FrameBuffer,
}

impl OledDisplay {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            bus,
            buffer: FrameBuffer::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        let mut bus = lock_bus(self.bus);
        bus.write(I2C_ADDR_OLED, &[CONTROL_CMD, 0xE3], I2C_TIMEOUT_TICKS).is_ok() // NOP
    }

    pub fn init(&mut self) -> anyhow::Result<()> {
        for &cmd in INIT_SEQUENCE {
            self.command(cmd).context("SSD1306 init")?;
        }
        self.flush()
    }

    /// Draw `frame` and push it to the panel.
    pub fn show(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        // FrameBuffer drawing cannot fail.
        let _ = draw_frame(&mut self.buffer, frame);
        self.flush()
    }

    pub fn turn_off(&mut self) -> anyhow::Result<()> {
        self.command(0xAE)
    }

    fn command(&mut self, cmd: u8) -> anyhow::Result<()> {
        let mut bus = lock_bus(self.bus);
        bus.write(I2C_ADDR_OLED, &[CONTROL_CMD, cmd], I2C_TIMEOUT_TICKS)?;
        Ok(())
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        // Full-screen column and page window.
        for cmd in [0x21, 0, (SCREEN_WIDTH - 1) as u8, 0x22, 0, (SCREEN_HEIGHT / 8 - 1) as u8] {
            self.command(cmd)?;
        }

        let mut bus = lock_bus(self.bus);
        let mut packet = [0u8; SCREEN_WIDTH as usize + 1];
        packet[0] = CONTROL_DATA;
        for page in self.buffer.as_bytes().chunks(SCREEN_WIDTH as usize) {
            packet[1..].copy_from_slice(page);
            bus.write(I2C_ADDR_OLED, &packet, I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }
}
