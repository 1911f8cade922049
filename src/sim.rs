// Upstair - Host Simulator
//
// In-memory collaborators for running the core off-target: scripted motion,
// recorded radio traffic and recorded frames.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use anyhow::anyhow;

use crate::events::{Received, Sample};
use crate::platform::{Frame, Platform, RadioReceiver};
use crate::view::View;

/// Motion script for the simulated accelerometer, indexed by read count.
pub enum Motion {
    /// Lying flat on a table.
    Still,
    /// Wrist swinging on a staircase: alternating jolts along x.
    Climbing,
    /// Every read fails.
    Broken,
    Custom(Box<dyn FnMut(u32) -> Option<Sample> + Send>),
}

impl Motion {
    fn sample(&mut self, read: u32) -> Option<Sample> {
        match self {
            Self::Still => Some(Sample::new(0.0, 0.0, 1.0)),
            Self::Climbing => {
                let jolt = if read % 2 == 0 { 0.6 } else { -0.6 };
                Some(Sample::new(jolt, 0.1, 1.0))
            }
            Self::Broken => None,
            Self::Custom(script) => script(read),
        }
    }
}

/// Owned copy of a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub view: View,
    pub activity: crate::events::Activity,
    pub battery_level: u8,
    pub score: u16,
    pub messages: Vec<String>,
    pub unread: bool,
}

pub struct SimPlatform {
    motion: Motion,
    battery_level: u8,
    pub sensor_reads: u32,
    pub battery_reads: u32,
    pub broadcasts: Vec<Vec<u8>>,
    pub frames: Vec<RecordedFrame>,
    pub shut_down: bool,
}

impl SimPlatform {
    pub fn new(motion: Motion) -> Self {
        Self {
            motion,
            battery_level: 100,
            sensor_reads: 0,
            battery_reads: 0,
            broadcasts: Vec::new(),
            frames: Vec::new(),
            shut_down: false,
        }
    }

    pub fn with_battery(mut self, level: u8) -> Self {
        self.battery_level = level;
        self
    }

    pub fn set_motion(&mut self, motion: Motion) {
        self.motion = motion;
    }
}

impl Platform for SimPlatform {
    fn read_accelerometer(&mut self) -> anyhow::Result<Sample> {
        let read = self.sensor_reads;
        self.sensor_reads += 1;
        self.motion
            .sample(read)
            .ok_or_else(|| anyhow!("simulated I2C transport error"))
    }

    fn read_battery_level(&mut self) -> u8 {
        self.battery_reads += 1;
        self.battery_level
    }

    fn broadcast(&mut self, payload: &[u8]) -> anyhow::Result<()> {
        self.broadcasts.push(payload.to_vec());
        Ok(())
    }

    fn render(&mut self, frame: &Frame<'_>) {
        self.frames.push(RecordedFrame {
            view: frame.nav.view,
            activity: frame.activity,
            battery_level: frame.battery_level,
            score: frame.score,
            messages: frame.messages.iter().map(|m| m.as_str().to_owned()).collect(),
            unread: frame.unread,
        });
    }

    fn shutdown(&mut self) {
        self.shut_down = true;
    }
}

/// Simulated radio receive path fed through a channel.
pub struct SimRadio {
    rx: Receiver<Received>,
    pending: Option<Received>,
}

/// Create a simulated radio and the handle used to "transmit" to it.
pub fn sim_radio() -> (Sender<Received>, SimRadio) {
    let (tx, rx) = mpsc::channel();
    (tx, SimRadio { rx, pending: None })
}

impl RadioReceiver for SimRadio {
    fn receive_flag(&mut self) -> bool {
        if self.pending.is_none() {
            match self.rx.try_recv() {
                Ok(received) => self.pending = Some(received),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => {}
            }
        }
        self.pending.is_some()
    }

    fn receive(&mut self) -> Option<Received> {
        self.receive_flag();
        self.pending.take()
    }
}
