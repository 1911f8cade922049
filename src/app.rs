// Upstair - Application State Machine
//
// One `step` per scheduler tick.  Tick-count triggers pick the state, the state
// runs its action, then the cooldown counters advance.  Triggers overwrite each
// other in order (sensor read, redraw, sleep), so only one action runs per tick
// and a pending SendMessage can be pre-empted by a redraw.  That ordering is
// what the device has always done and is kept as is.

use crate::config::*;
use crate::events::{Activity, ButtonEvent};
use crate::limiter::RateLimiter;
use crate::mailbox::MailboxReader;
use crate::motion::{ClassifierConfig, MotionDetector};
use crate::platform::{Frame, Platform};
use crate::power::SleepTimer;
use crate::view::{MenuItem, Navigation, SettingsItem, View};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppState {
    /// Nothing to do this tick.
    #[default]
    Idle,
    ReadSensors,
    /// Broadcast an inspirational message, rate limited.
    SendMessage,
    UpdateScreen,
    /// Shut the device down.  Terminal.
    Sleep,
}

/// Whether the scheduler should keep ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

pub struct App {
    state: AppState,
    tick: u32,
    nav: Navigation,
    detector: MotionDetector,
    limiter: RateLimiter,
    sleep: SleepTimer,
    inbox: MailboxReader,
    battery_level: u8,
    score: u16,
    shutdown_requested: bool,
}

impl App {
    pub fn new(inbox: MailboxReader) -> Self {
        Self::with_config(inbox, ClassifierConfig::default())
    }

    pub fn with_config(inbox: MailboxReader, config: ClassifierConfig) -> Self {
        Self {
            state: AppState::Idle,
            tick: 0,
            nav: Navigation::default(),
            detector: MotionDetector::new(config),
            limiter: RateLimiter::new(),
            sleep: SleepTimer::default(),
            inbox,
            battery_level: 0,
            score: 0,
            shutdown_requested: false,
        }
    }

    // -----------------------------------------------------------------------
    // Scheduler entry point
    // -----------------------------------------------------------------------

    /// Run one tick.
    pub fn step<P: Platform>(&mut self, platform: &mut P) -> Flow {
        if self.state == AppState::Sleep && self.shutdown_requested {
            return Flow::Shutdown;
        }

        self.evaluate_triggers(platform);

        if self.run_state(platform) == Flow::Shutdown {
            return Flow::Shutdown;
        }

        self.limiter.tick();
        self.sleep.tick();
        self.tick = self.tick.wrapping_add(1);
        Flow::Continue
    }

    fn evaluate_triggers<P: Platform>(&mut self, platform: &mut P) {
        let t = self.tick;

        if t % SAMPLE_PERIOD == 0 {
            self.state = AppState::ReadSensors;
        }

        if t % FRAME_PERIOD == 0 {
            self.state = AppState::UpdateScreen;
        }

        if t % BATTERY_PERIOD == 0 {
            self.battery_level = platform.read_battery_level();
        }

        if self.detector.activity() == Activity::Stairs && t % SCORE_PERIOD == 0 {
            self.score = self.score.saturating_add(1);
        }

        // Opening the inbox counts as reading it.
        if self.nav.view == View::Messages && self.inbox.has_unread() {
            self.inbox.mark_all_read();
        }

        if self.sleep.expired() || self.shutdown_requested {
            self.state = AppState::Sleep;
        }
    }

    fn run_state<P: Platform>(&mut self, platform: &mut P) -> Flow {
        match self.state {
            AppState::Idle => {}

            AppState::ReadSensors => {
                self.state = AppState::Idle;
                match platform.read_accelerometer() {
                    Ok(sample) => {
                        let result = self.detector.update(sample);
                        if result.motion {
                            self.sleep.reset();
                        }
                        if result.activity == Activity::Stairs {
                            self.state = AppState::SendMessage;
                        }
                    }
                    Err(e) => {
                        log::warn!("Accelerometer read failed, skipping tick {}: {}", self.tick, e);
                    }
                }
            }

            AppState::SendMessage => {
                if self.limiter.try_send(SEND_COOLDOWN_TICKS) {
                    match platform.broadcast(INSPIRE_MESSAGE.as_bytes()) {
                        Ok(()) => log::info!("Broadcast sent: {:?}", INSPIRE_MESSAGE),
                        Err(e) => log::warn!("Broadcast failed: {}", e),
                    }
                }
                self.state = AppState::Idle;
            }

            AppState::UpdateScreen => {
                let messages = self.inbox.snapshot();
                platform.render(&Frame {
                    activity: self.detector.activity(),
                    nav: self.nav,
                    auto_sleep: self.sleep.auto_sleep(),
                    battery_level: self.battery_level,
                    score: self.score,
                    messages: &messages,
                    unread: self.inbox.has_unread(),
                });
                self.state = AppState::Idle;
            }

            AppState::Sleep => {
                log::info!("Shutting down after {} ticks", self.tick);
                self.shutdown_requested = true;
                platform.shutdown();
                return Flow::Shutdown;
            }
        }
        Flow::Continue
    }

    // -----------------------------------------------------------------------
    // Buttons
    // -----------------------------------------------------------------------

    /// Apply a button press.  Every press counts as user activity.
    pub fn handle_button(&mut self, event: ButtonEvent) {
        if self.state == AppState::Sleep {
            return;
        }
        self.sleep.reset();

        match (event, self.nav.view) {
            (ButtonEvent::Primary, View::Main) => self.change_view(View::Menu),
            (ButtonEvent::Primary, View::Menu) => {
                self.nav.menu.advance();
                self.state = AppState::UpdateScreen;
            }
            (ButtonEvent::Primary, View::Messages | View::Stats | View::Settings) => {
                self.change_view(View::Menu)
            }
            (ButtonEvent::Primary, View::ConfirmShutdown) => self.change_view(View::Main),

            (ButtonEvent::Secondary, View::Main) => self.change_view(View::ConfirmShutdown),
            (ButtonEvent::Secondary, View::Menu) => {
                let target = self.nav.selected().target();
                self.change_view(target);
            }
            (ButtonEvent::Secondary, View::Settings) => match self.nav.selected_setting() {
                SettingsItem::AutoSleep => {
                    let enabled = self.sleep.toggle_auto_sleep();
                    log::info!("Auto-sleep {}", if enabled { "enabled" } else { "disabled" });
                    self.state = AppState::UpdateScreen;
                }
            },
            (ButtonEvent::Secondary, View::ConfirmShutdown) => {
                log::info!("Shutdown confirmed");
                self.shutdown_requested = true;
            }
            (ButtonEvent::Secondary, View::Messages | View::Stats) => {}
        }
    }

    fn change_view(&mut self, view: View) {
        self.nav.view = view;
        self.state = AppState::UpdateScreen;
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn view(&self) -> View {
        self.nav.view
    }

    pub fn selected_menu_item(&self) -> MenuItem {
        self.nav.selected()
    }

    pub fn activity(&self) -> Activity {
        self.detector.activity()
    }

    pub fn shakiness(&self) -> f32 {
        self.detector.shakiness()
    }

    pub fn score(&self) -> u16 {
        self.score
    }

    pub fn battery_level(&self) -> u8 {
        self.battery_level
    }

    pub fn auto_sleep(&self) -> bool {
        self.sleep.auto_sleep()
    }

    pub fn sleep_countdown(&self) -> u32 {
        self.sleep.countdown()
    }

    pub fn send_cooldown(&self) -> u32 {
        self.limiter.remaining()
    }

    pub fn has_unread(&self) -> bool {
        self.inbox.has_unread()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Message, Sample};
    use crate::mailbox::mailbox;
    use crate::sim::{Motion, SimPlatform};

    fn app() -> (App, crate::mailbox::MailboxWriter) {
        let (writer, reader) = mailbox();
        (App::new(reader), writer)
    }

    fn run(app: &mut App, platform: &mut SimPlatform, ticks: u32) {
        for _ in 0..ticks {
            assert_eq!(app.step(platform), Flow::Continue);
        }
    }

    fn enable_auto_sleep(app: &mut App) {
        // Main -> Menu, cursor to Settings, open it, toggle.
        app.handle_button(ButtonEvent::Primary);
        for _ in 0..3 {
            app.handle_button(ButtonEvent::Primary);
        }
        assert_eq!(app.selected_menu_item(), MenuItem::Settings);
        app.handle_button(ButtonEvent::Secondary);
        assert_eq!(app.view(), View::Settings);
        app.handle_button(ButtonEvent::Secondary);
        assert!(app.auto_sleep());
    }

    #[test]
    fn tick_zero_redraws_and_reads_battery() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Still).with_battery(77);

        app.step(&mut platform);
        assert_eq!(platform.frames.len(), 1);
        assert_eq!(platform.sensor_reads, 0);
        assert_eq!(app.battery_level(), 77);
    }

    #[test]
    fn one_action_per_tick() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Still);
        run(&mut app, &mut platform, 12);

        // Ticks 0..12: sample triggers at 0,2,4,6,8,10 but 0 and 6 redraw instead.
        assert_eq!(platform.sensor_reads, 4);
        // Frame triggers at 0,3,6,9.
        assert_eq!(platform.frames.len(), 4);
    }

    #[test]
    fn battery_is_read_every_fifteenth_tick() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Still);
        run(&mut app, &mut platform, 31);
        assert_eq!(platform.battery_reads, 3); // ticks 0, 15, 30
    }

    #[test]
    fn climbing_sends_one_broadcast_per_cooldown() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Climbing);
        run(&mut app, &mut platform, 400);

        assert_eq!(app.activity(), Activity::Stairs);
        assert!(!platform.broadcasts.is_empty());
        assert!(platform.broadcasts.len() <= 3);
        assert!(platform.broadcasts.iter().all(|b| b == INSPIRE_MESSAGE.as_bytes()));
        assert!(app.score() > 0);
    }

    #[test]
    fn send_queued_before_a_frame_tick_is_lost_until_the_next_read() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Climbing);

        // Find a SendMessage queued on an even tick t whose successor t+1 is a
        // frame tick, at a moment when the cooldown would allow a send.
        let mut queued = false;
        for _ in 0..1000 {
            assert_eq!(app.step(&mut platform), Flow::Continue);
            if app.state() == AppState::SendMessage
                && app.tick() % FRAME_PERIOD == 0
                && app.send_cooldown() == 0
            {
                queued = true;
                break;
            }
        }
        assert!(queued, "no SendMessage ever queued ahead of a frame tick");
        assert_eq!(app.activity(), Activity::Stairs);
        let sent = platform.broadcasts.len();
        let frames = platform.frames.len();

        // t+1: the frame trigger overwrites the pending send.
        app.step(&mut platform);
        assert_eq!(platform.broadcasts.len(), sent);
        assert_eq!(platform.frames.len(), frames + 1);
        assert_eq!(app.state(), AppState::Idle);

        // t+2: the next Stairs read queues it again.
        app.step(&mut platform);
        assert_eq!(app.state(), AppState::SendMessage);

        // t+3: not a frame or sample tick, so the send goes out.
        app.step(&mut platform);
        assert_eq!(platform.broadcasts.len(), sent + 1);
        assert_eq!(app.send_cooldown(), SEND_COOLDOWN_TICKS - 1);
    }

    #[test]
    fn activity_falls_back_to_idle_after_climbing_stops() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Climbing);
        run(&mut app, &mut platform, 100);
        assert_eq!(app.activity(), Activity::Stairs);

        platform.set_motion(Motion::Still);
        run(&mut app, &mut platform, 100);
        assert_eq!(app.activity(), Activity::Idle);
        let score = app.score();
        run(&mut app, &mut platform, 100);
        assert_eq!(app.score(), score);
    }

    #[test]
    fn resting_never_broadcasts_or_scores() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Still);
        run(&mut app, &mut platform, 400);

        assert_eq!(app.activity(), Activity::Idle);
        assert!(platform.broadcasts.is_empty());
        assert_eq!(app.score(), 0);
    }

    #[test]
    fn failed_sensor_read_skips_the_tick() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Broken);
        run(&mut app, &mut platform, 50);
        assert!(platform.sensor_reads > 0);
        assert_eq!(app.shakiness(), 0.0);
        assert_eq!(app.state(), AppState::Idle);
    }

    #[test]
    fn auto_sleep_is_off_at_boot() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Still);
        run(&mut app, &mut platform, AUTO_SLEEP_TICKS * 2);
        assert!(!platform.shut_down);
    }

    #[test]
    fn countdown_reaching_zero_sleeps_on_next_tick() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Still);
        enable_auto_sleep(&mut app);
        assert_eq!(app.sleep_countdown(), AUTO_SLEEP_TICKS);

        run(&mut app, &mut platform, AUTO_SLEEP_TICKS);
        assert_eq!(app.sleep_countdown(), 0);
        assert!(!platform.shut_down);

        assert_eq!(app.step(&mut platform), Flow::Shutdown);
        assert!(platform.shut_down);
        assert_eq!(app.state(), AppState::Sleep);

        // Terminal: nothing else runs.
        let frames = platform.frames.len();
        assert_eq!(app.step(&mut platform), Flow::Shutdown);
        assert_eq!(platform.frames.len(), frames);
    }

    #[test]
    fn button_press_postpones_sleep() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Still);
        enable_auto_sleep(&mut app);

        run(&mut app, &mut platform, AUTO_SLEEP_TICKS - 10);
        app.handle_button(ButtonEvent::Primary);
        assert_eq!(app.sleep_countdown(), AUTO_SLEEP_TICKS);
        run(&mut app, &mut platform, 100);
        assert!(!platform.shut_down);
    }

    #[test]
    fn motion_postpones_sleep() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Climbing);
        enable_auto_sleep(&mut app);
        run(&mut app, &mut platform, AUTO_SLEEP_TICKS * 2);
        assert!(!platform.shut_down);
    }

    #[test]
    fn confirmed_shutdown_wins_over_triggers() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Still);

        app.handle_button(ButtonEvent::Secondary);
        assert_eq!(app.view(), View::ConfirmShutdown);
        app.handle_button(ButtonEvent::Secondary);

        // Tick 0 would redraw, but shutdown takes priority.
        assert_eq!(app.step(&mut platform), Flow::Shutdown);
        assert!(platform.shut_down);
        assert!(platform.frames.is_empty());
    }

    #[test]
    fn cancelling_shutdown_returns_home() {
        let (mut app, _w) = app();
        app.handle_button(ButtonEvent::Secondary);
        app.handle_button(ButtonEvent::Primary);
        assert_eq!(app.view(), View::Main);
        assert_eq!(app.state(), AppState::UpdateScreen);
    }

    #[test]
    fn menu_navigation_opens_each_view() {
        let (mut app, _w) = app();
        app.handle_button(ButtonEvent::Primary);
        assert_eq!(app.view(), View::Menu);

        for expected in [View::Main, View::Messages, View::Stats, View::Settings] {
            app.handle_button(ButtonEvent::Secondary);
            assert_eq!(app.view(), expected);
            // Back to the menu, then move the cursor on.
            app.handle_button(ButtonEvent::Primary);
            assert_eq!(app.view(), View::Menu);
            app.handle_button(ButtonEvent::Primary);
        }
    }

    #[test]
    fn opening_messages_marks_them_read() {
        let (mut app, writer) = app();
        let mut platform = SimPlatform::new(Motion::Still);

        writer.try_append(Message::from("hi there"));
        run(&mut app, &mut platform, 3);
        assert!(app.has_unread());
        assert!(platform.frames.last().unwrap().unread);

        // Menu -> cursor to Messages -> open.
        app.handle_button(ButtonEvent::Primary);
        app.handle_button(ButtonEvent::Primary);
        app.handle_button(ButtonEvent::Secondary);
        assert_eq!(app.view(), View::Messages);

        run(&mut app, &mut platform, 3);
        assert!(!app.has_unread());
        let frame = platform.frames.last().unwrap();
        assert_eq!(frame.view, View::Messages);
        assert_eq!(frame.messages, ["hi there"]);
        assert!(!frame.unread);
    }

    #[test]
    fn countdowns_advance_every_tick() {
        let (mut app, _w) = app();
        let mut platform = SimPlatform::new(Motion::Custom(Box::new(|_| {
            Some(Sample::new(0.0, 0.0, 1.0))
        })));
        enable_auto_sleep(&mut app);
        run(&mut app, &mut platform, 10);
        assert_eq!(app.sleep_countdown(), AUTO_SLEEP_TICKS - 10);
        assert_eq!(app.tick(), 10);
    }
}
