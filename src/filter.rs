// Upstair - Moving-Average Filter
//
// Fixed-width rolling mean per axis.  The accelerometer baseline produced here
// is what the motion classifier compares each raw sample against.

use crate::events::Sample;

/// Rolling arithmetic mean over the last `N` values.
///
/// The window starts zero-filled; every push evicts the oldest value.
#[derive(Debug, Clone)]
pub struct MovingAverage<const N: usize> {
    buffer: [f32; N],
    index: usize,
}

impl<const N: usize> MovingAverage<N> {
    const NON_EMPTY: () = assert!(N > 0, "moving-average window must hold at least one sample");

    pub fn new() -> Self {
        // Evaluated at compile time for every instantiated N.
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        Self {
            buffer: [0.0; N],
            index: 0,
        }
    }

    /// Push a value and return the mean of the window.
    pub fn push(&mut self, value: f32) -> f32 {
        self.buffer[self.index] = value;
        self.index = (self.index + 1) % N;
        self.mean()
    }

    /// Mean of the current window contents.
    ///
    /// Summed from scratch so rounding error cannot accumulate over hours of
    /// sampling.
    pub fn mean(&self) -> f32 {
        self.buffer.iter().sum::<f32>() / N as f32
    }
}

impl<const N: usize> Default for MovingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Which accelerometer axis a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// One [`MovingAverage`] per axis plus the warm-up bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct AxisFilter<const N: usize> {
    x: MovingAverage<N>,
    y: MovingAverage<N>,
    z: MovingAverage<N>,
    samples_seen: u32,
}

impl<const N: usize> AxisFilter<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a single axis value and return that axis' mean.
    ///
    /// Does not advance the warm-up counter; use [`AxisFilter::push`] for
    /// complete samples.
    pub fn push_axis(&mut self, axis: Axis, value: f32) -> f32 {
        match axis {
            Axis::X => self.x.push(value),
            Axis::Y => self.y.push(value),
            Axis::Z => self.z.push(value),
        }
    }

    /// Push a full sample.  Returns the per-axis baseline once warm, `None`
    /// while fewer than `N - 1` samples have been observed.
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        self.samples_seen = self.samples_seen.saturating_add(1);

        let baseline = Sample {
            x: self.push_axis(Axis::X, sample.x),
            y: self.push_axis(Axis::Y, sample.y),
            z: self.push_axis(Axis::Z, sample.z),
        };

        self.is_warm().then_some(baseline)
    }

    pub fn is_warm(&self) -> bool {
        self.samples_seen as usize >= N.saturating_sub(1)
    }

    pub fn samples_seen(&self) -> u32 {
        self.samples_seen
    }
}
