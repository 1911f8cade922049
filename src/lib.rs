// Upstair - Stair Activity Tracker Core
//
// Target-independent control core: motion classification, the tick-driven
// application state machine, the shared mailbox and the two long-running
// tasks.  Board drivers live in the firmware binary.

pub mod app;
pub mod config;
pub mod events;
pub mod filter;
pub mod input;
pub mod limiter;
pub mod mailbox;
pub mod motion;
pub mod platform;
pub mod power;
pub mod render;
#[cfg(not(target_os = "espidf"))]
pub mod sim;
pub mod tasks;
pub mod view;
