// Upstair - Application Task
//
// Runs the state machine once per tick at a fixed period.  Button events that
// arrived since the last tick are applied first.  A tick that overruns simply
// delays the next one; missed ticks are not caught up.

use std::sync::mpsc::Receiver;
use std::thread;
use std::time::{Duration, Instant};

use crate::app::{App, Flow};
use crate::events::ButtonEvent;
use crate::platform::Platform;

/// Drive `app` until it shuts down, then hand it back.
pub fn app_task<P: Platform>(
    mut app: App,
    platform: &mut P,
    buttons: Receiver<ButtonEvent>,
    interval: Duration,
) -> App {
    log::info!("App task started ({} ms tick)", interval.as_millis());

    loop {
        let tick_start = Instant::now();

        // Drain all pending button presses (non-blocking).
        while let Ok(event) = buttons.try_recv() {
            app.handle_button(event);
        }

        if app.step(platform) == Flow::Shutdown {
            log::info!("App task stopped at tick {}", app.tick());
            return app;
        }

        // Sleep for the remainder of the tick.
        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use crate::events::ButtonEvent;
    use crate::mailbox::mailbox;
    use crate::sim::{Motion, SimPlatform};
    use crate::view::View;

    #[test]
    fn confirmed_shutdown_ends_the_task() {
        let (_writer, reader) = mailbox();
        let (tx, rx) = mpsc::channel();
        let mut platform = SimPlatform::new(Motion::Still);

        tx.send(ButtonEvent::Secondary).unwrap();
        tx.send(ButtonEvent::Secondary).unwrap();

        let app = app_task(App::new(reader), &mut platform, rx, Duration::ZERO);
        assert!(platform.shut_down);
        assert_eq!(app.view(), View::ConfirmShutdown);
    }

    #[test]
    fn closed_button_channel_is_not_fatal() {
        let (_writer, reader) = mailbox();
        let (tx, rx) = mpsc::channel::<ButtonEvent>();
        drop(tx);
        let mut platform = SimPlatform::new(Motion::Still);

        let mut app = App::new(reader);
        // Shutdown is requested directly so the loop terminates.
        app.handle_button(ButtonEvent::Secondary);
        app.handle_button(ButtonEvent::Secondary);
        let app = app_task(app, &mut platform, rx, Duration::from_millis(1));
        assert!(platform.shut_down);
        assert_eq!(app.tick(), 0);
    }
}
