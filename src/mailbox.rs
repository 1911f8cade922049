// Upstair - Inbound Mailbox
//
// Bounded store of received text messages shared between the receive task
// (single writer) and the application task (single reader).
//
// The store is append-only: once `MAILBOX_CAPACITY` messages have arrived,
// every further message is dropped until the device restarts.  It is not a
// ring buffer, and older messages are never evicted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use heapless::Vec;

use crate::config::MAILBOX_CAPACITY;
use crate::events::Message;

/// Messages in arrival order, as seen by the application task.
pub type Snapshot = Vec<Message, MAILBOX_CAPACITY>;

struct Shared {
    messages: Mutex<Snapshot>,
    unread: AtomicBool,
}

impl Shared {
    // A panic in the other task must not take the inbox down with it; the
    // vector is always structurally valid, so the poisoned guard is usable.
    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create an empty mailbox and return its two endpoints.
///
/// Neither endpoint is `Clone`, so there is exactly one writer and one reader.
pub fn mailbox() -> (MailboxWriter, MailboxReader) {
    let shared = Arc::new(Shared {
        messages: Mutex::new(Vec::new()),
        unread: AtomicBool::new(false),
    });
    (
        MailboxWriter {
            shared: Arc::clone(&shared),
        },
        MailboxReader { shared },
    )
}

// ---------------------------------------------------------------------------
// Receive side
// ---------------------------------------------------------------------------
pub struct MailboxWriter {
    shared: Arc<Shared>,
}

impl MailboxWriter {
    /// Store `message` if there is room.  Returns `false` and drops the
    /// message when the mailbox is full.  Never waits for space.
    pub fn try_append(&self, message: Message) -> bool {
        let mut messages = self.shared.lock();
        if messages.push(message).is_err() {
            return false;
        }
        // Raised while the lock is held so a reader that sees the flag also
        // sees the message.
        self.shared.unread.store(true, Ordering::Release);
        true
    }

    pub fn is_full(&self) -> bool {
        self.shared.lock().is_full()
    }
}

// ---------------------------------------------------------------------------
// Application side
// ---------------------------------------------------------------------------
pub struct MailboxReader {
    shared: Arc<Shared>,
}

impl MailboxReader {
    /// Copy of every stored message, oldest first.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.lock().clone()
    }

    /// Clear the unread flag.  Messages stay stored for display.
    pub fn mark_all_read(&self) {
        self.shared.unread.store(false, Ordering::Release);
    }

    pub fn has_unread(&self) -> bool {
        self.shared.unread.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.shared.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn msg(i: usize) -> Message {
        Message::from(format!("msg {i}").as_str())
    }

    #[test]
    fn six_messages_fit_in_arrival_order() {
        let (writer, reader) = mailbox();
        assert!(reader.is_empty());

        for i in 0..6 {
            assert!(writer.try_append(msg(i)));
        }
        let snapshot = reader.snapshot();
        assert_eq!(snapshot.len(), 6);
        for (i, m) in snapshot.iter().enumerate() {
            assert_eq!(m, &msg(i));
        }
    }

    #[test]
    fn seventh_message_is_dropped_without_overwriting() {
        let (writer, reader) = mailbox();
        for i in 0..6 {
            writer.try_append(msg(i));
        }
        assert!(writer.is_full());
        assert!(!writer.try_append(msg(6)));

        let snapshot = reader.snapshot();
        assert_eq!(snapshot.len(), 6);
        assert_eq!(snapshot.last(), Some(&msg(5)));
    }

    #[test]
    fn mark_all_read_keeps_messages() {
        let (writer, reader) = mailbox();
        assert!(!reader.has_unread());

        writer.try_append(msg(0));
        assert!(reader.has_unread());

        reader.mark_all_read();
        assert!(!reader.has_unread());
        assert_eq!(reader.len(), 1);
    }

    #[test]
    fn dropped_message_does_not_raise_unread() {
        let (writer, reader) = mailbox();
        for i in 0..6 {
            writer.try_append(msg(i));
        }
        reader.mark_all_read();
        assert!(!writer.try_append(msg(6)));
        assert!(!reader.has_unread());
    }

    #[test]
    fn concurrent_appends_never_exceed_capacity() {
        let (writer, reader) = mailbox();

        let producer = thread::spawn(move || {
            let mut accepted = 0;
            for i in 0..50 {
                if writer.try_append(msg(i)) {
                    accepted += 1;
                }
                thread::yield_now();
            }
            accepted
        });

        // Every snapshot taken mid-flight is a prefix of the arrival order
        // made of complete messages.
        let mut last_len = 0;
        while !producer.is_finished() {
            let snapshot = reader.snapshot();
            assert!(snapshot.len() <= MAILBOX_CAPACITY);
            assert!(snapshot.len() >= last_len);
            for (i, m) in snapshot.iter().enumerate() {
                assert_eq!(m, &msg(i));
            }
            last_len = snapshot.len();
            reader.mark_all_read();
        }

        assert_eq!(producer.join().unwrap(), MAILBOX_CAPACITY);
        assert_eq!(reader.len(), MAILBOX_CAPACITY);
    }
}
