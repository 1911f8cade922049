// Upstair - Receive Task
//
// Low-priority task that moves messages from the radio into the mailbox.
// A full mailbox drops the message; the radio is never left waiting.

use std::thread;
use std::time::Duration;

use crate::mailbox::MailboxWriter;
use crate::platform::RadioReceiver;

/// Result of one poll of the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// Nothing was waiting.
    Idle,
    Stored,
    /// Received but the mailbox was full.
    Dropped,
}

/// Check the radio once and store whatever arrived.
pub fn poll_once<R: RadioReceiver>(radio: &mut R, inbox: &MailboxWriter) -> Poll {
    if !radio.receive_flag() {
        return Poll::Idle;
    }
    let Some(received) = radio.receive() else {
        return Poll::Idle;
    };

    // The sender is only of interest for diagnostics; it is not stored.
    if inbox.try_append(received.message) {
        log::debug!("Message stored from {:02x?}", received.sender);
        Poll::Stored
    } else {
        log::debug!("Mailbox full, dropped message from {:02x?}", received.sender);
        Poll::Dropped
    }
}

/// Receive loop.  Never returns.
pub fn comm_task<R: RadioReceiver>(mut radio: R, inbox: MailboxWriter, idle_interval: Duration) -> ! {
    log::info!("Comm task started");

    loop {
        if poll_once(&mut radio, &inbox) == Poll::Idle {
            thread::sleep(idle_interval);
        }
    }
}
