// Upstair - Button Input Manager
//
// Debounced press detection for one button.  Polled at ~100 Hz; each stable
// press edge sends one `ButtonEvent` to the application task.

use std::sync::mpsc::Sender;
use std::time::Instant;

use crate::config::DEBOUNCE_MS;
use crate::events::ButtonEvent;

/// Raw level of a button line.
pub trait ButtonLine {
    /// `true` while the button is held down.
    fn is_pressed(&self) -> bool;
}

pub struct InputManager<L> {
    line: L,
    event: ButtonEvent,
    tx: Sender<ButtonEvent>,

    // Debounce state
    last_raw: bool,
    last_change: Instant,

    button_down: bool,
}

impl<L: ButtonLine> InputManager<L> {
    pub fn new(line: L, event: ButtonEvent, tx: Sender<ButtonEvent>) -> Self {
        Self {
            line,
            event,
            tx,
            last_raw: false,
            last_change: Instant::now(),
            button_down: false,
        }
    }

    /// Call every ~10 ms from the input poll loop.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// [`InputManager::update`] with an explicit clock reading.
    pub fn update_at(&mut self, now: Instant) {
        let pressed = self.line.is_pressed();

        // ---- debounce filter ----
        if pressed != self.last_raw {
            self.last_change = now;
        }
        self.last_raw = pressed;

        let stable_ms = now.saturating_duration_since(self.last_change).as_millis() as u64;
        if stable_ms < DEBOUNCE_MS {
            // Signal still bouncing - wait.
            return;
        }

        // ---- button pressed edge ----
        if pressed && !self.button_down {
            // The app task owns the receiver for the life of the device; a send
            // error only happens during shutdown.
            let _ = self.tx.send(self.event);
        }
        self.button_down = pressed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::mpsc;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct FakeLine(Rc<Cell<bool>>);

    impl ButtonLine for FakeLine {
        fn is_pressed(&self) -> bool {
            self.0.get()
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn stable_press_emits_one_event() {
        let line = FakeLine::default();
        let (tx, rx) = mpsc::channel();
        let mut input = InputManager::new(line.clone(), ButtonEvent::Primary, tx);
        let t0 = Instant::now();

        line.0.set(true);
        for step in 0..20 {
            input.update_at(t0 + ms(step * 10));
        }
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), [ButtonEvent::Primary]);
    }

    #[test]
    fn bounce_shorter_than_debounce_is_ignored() {
        let line = FakeLine::default();
        let (tx, rx) = mpsc::channel();
        let mut input = InputManager::new(line.clone(), ButtonEvent::Secondary, tx);
        let t0 = Instant::now();

        for step in 0..10 {
            line.0.set(step % 2 == 0);
            input.update_at(t0 + ms(step * 10));
        }
        line.0.set(false);
        input.update_at(t0 + ms(200));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn release_and_press_again_emits_again() {
        let line = FakeLine::default();
        let (tx, rx) = mpsc::channel();
        let mut input = InputManager::new(line.clone(), ButtonEvent::Primary, tx);
        let t0 = Instant::now();

        line.0.set(true);
        input.update_at(t0);
        input.update_at(t0 + ms(60));
        line.0.set(false);
        input.update_at(t0 + ms(100));
        input.update_at(t0 + ms(160));
        line.0.set(true);
        input.update_at(t0 + ms(200));
        input.update_at(t0 + ms(260));

        assert_eq!(rx.try_iter().count(), 2);
    }
}
