// Upstair - System Events & Data Types

use heapless::String;

use crate::config::MAX_TEXT_LEN;

// ---------------------------------------------------------------------------
// Sensor Data (3-axis accelerometer reading, in g)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Sample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

// ---------------------------------------------------------------------------
// Activity Classification
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Activity {
    #[default]
    Idle,
    Stairs,
    /// Recognised by downstream consumers but never produced by the classifier.
    Elevator,
}

impl Activity {
    /// Human-readable label shown on the home screen.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Stairs => "stairs!",
            Self::Elevator => "elevator",
        }
    }
}

// ---------------------------------------------------------------------------
// Button Events - sent to the application task via channel
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Button 1: open menu, move cursor, go back.
    Primary,
    /// Button 2: select, toggle, power off.
    Secondary,
}

// ---------------------------------------------------------------------------
// Radio Messages
// ---------------------------------------------------------------------------

/// Text payload of at most [`MAX_TEXT_LEN`] bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    text: String<MAX_TEXT_LEN>,
}

impl Message {
    /// Decode a radio payload. Stops at the first NUL, replaces invalid UTF-8
    /// and truncates on a character boundary once the line is full.
    pub fn from_payload(payload: &[u8]) -> Self {
        let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
        let decoded = std::string::String::from_utf8_lossy(&payload[..end]);

        let mut text = String::new();
        for c in decoded.chars() {
            if text.push(c).is_err() {
                break;
            }
        }
        Self { text }
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::from_payload(text.as_bytes())
    }
}

/// Hardware address of the transmitting device.
pub type SenderId = [u8; 6];

/// A message as handed over by the radio, before the sender is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    pub sender: SenderId,
    pub message: Message,
}
