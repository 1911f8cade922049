// Upstair - Collaborator Interfaces
//
// Everything the control core needs from the board.  The firmware binary
// implements these over ESP-IDF drivers; `sim` implements them for host runs
// and tests.

use crate::events::{Activity, Message, Received, Sample};
use crate::view::Navigation;

/// What the screen should show after an UpdateScreen action.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub activity: Activity,
    pub nav: Navigation,
    pub auto_sleep: bool,
    pub battery_level: u8,
    pub score: u16,
    pub messages: &'a [Message],
    pub unread: bool,
}

/// Peripherals used by the application task.
pub trait Platform {
    /// One accelerometer reading, in g.
    fn read_accelerometer(&mut self) -> anyhow::Result<Sample>;

    /// Battery charge, 0..=100.
    fn read_battery_level(&mut self) -> u8;

    /// Send `payload` to every device in range.
    fn broadcast(&mut self, payload: &[u8]) -> anyhow::Result<()>;

    fn render(&mut self, frame: &Frame<'_>);

    /// Power everything down.  On hardware this does not return.
    fn shutdown(&mut self);
}

/// Radio receive path, owned by the receive task.
pub trait RadioReceiver {
    /// A received message is waiting.
    fn receive_flag(&mut self) -> bool;

    /// Take the next waiting message, if any.
    fn receive(&mut self) -> Option<Received>;
}
