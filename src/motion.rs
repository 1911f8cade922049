// Upstair - Motion Classifier
//
// Compares each raw sample against the moving-average baseline.  Deviations
// beyond the threshold build up a bounded "shakiness" score; the activity is
// picked from that score with two thresholds so it does not flap.

use crate::config::*;
use crate::events::{Activity, Sample};
use crate::filter::AxisFilter;

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Step-detector calibration.  Defaults are the values tuned on the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    /// How large a deviation from the baseline counts as a shake (g).
    pub threshold: f32,
    /// Shakiness at or above this switches to Stairs.
    pub stairs_limit: f32,
    /// Shakiness below this switches back to Idle.
    pub idle_limit: f32,
    pub max_shakiness: f32,
    pub min_shakiness: f32,
    /// How fast shakiness rises.
    pub rise: f32,
    /// How fast shakiness drops back.
    pub drop: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold: MOTION_THRESHOLD,
            stairs_limit: STAIRS_LIMIT,
            idle_limit: IDLE_LIMIT,
            max_shakiness: MAX_SHAKINESS,
            min_shakiness: MIN_SHAKINESS,
            rise: SHAKINESS_RISE,
            drop: SHAKINESS_DROP,
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Outcome of one classifier step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub shakiness: f32,
    pub activity: Activity,
    /// Shakiness rose on this step.  The user is moving, so the idle-sleep
    /// countdown should be re-armed.
    pub motion: bool,
}

#[derive(Debug, Clone)]
pub struct MotionClassifier {
    config: ClassifierConfig,
    shakiness: f32,
    activity: Activity,
}

impl MotionClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            shakiness: config.min_shakiness,
            activity: Activity::Idle,
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn shakiness(&self) -> f32 {
        self.shakiness
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    /// True when any axis of `sample` is further than the threshold from
    /// `baseline`.
    pub fn threshold_exceeded(&self, sample: &Sample, baseline: &Sample) -> bool {
        let t = self.config.threshold;
        (baseline.x - sample.x).abs() > t
            || (baseline.y - sample.y).abs() > t
            || (baseline.z - sample.z).abs() > t
    }

    /// Update shakiness from one sample and re-evaluate the activity.
    pub fn classify(&mut self, sample: &Sample, baseline: &Sample) -> Classification {
        let c = self.config;
        let mut motion = false;

        if self.threshold_exceeded(sample, baseline) && self.shakiness <= c.max_shakiness - c.rise {
            self.shakiness += c.rise;
            motion = true;
        } else if self.shakiness >= c.min_shakiness + c.drop {
            self.shakiness -= c.drop;
        }

        self.apply_hysteresis();
        Classification {
            shakiness: self.shakiness,
            activity: self.activity,
            motion,
        }
    }

    /// Idle -> Stairs at `stairs_limit`, Stairs -> Idle below `idle_limit`,
    /// unchanged in between.
    pub fn apply_hysteresis(&mut self) -> Activity {
        if self.shakiness >= self.config.stairs_limit {
            self.activity = Activity::Stairs;
        } else if self.shakiness < self.config.idle_limit {
            self.activity = Activity::Idle;
        }
        self.activity
    }
}

impl Default for MotionClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Filter + classifier
// ---------------------------------------------------------------------------

/// Feeds raw samples through the baseline filter and, once it is warm, the
/// classifier.
#[derive(Debug, Clone, Default)]
pub struct MotionDetector {
    filter: AxisFilter<MA_N>,
    classifier: MotionClassifier,
}

impl MotionDetector {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            filter: AxisFilter::new(),
            classifier: MotionClassifier::new(config),
        }
    }

    /// Process one raw sample.  During warm-up shakiness is left untouched but
    /// the activity is still re-evaluated.
    pub fn update(&mut self, sample: Sample) -> Classification {
        match self.filter.push(sample) {
            Some(baseline) => self.classifier.classify(&sample, &baseline),
            None => Classification {
                shakiness: self.classifier.shakiness(),
                activity: self.classifier.apply_hysteresis(),
                motion: false,
            },
        }
    }

    pub fn shakiness(&self) -> f32 {
        self.classifier.shakiness()
    }

    pub fn activity(&self) -> Activity {
        self.classifier.activity()
    }
}
