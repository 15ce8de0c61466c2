//! Environment collaborator interface

use ndarray::{Array1, Array3};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Result of a single environment step
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Observation after the action was applied
    pub observation: Array1<f32>,
    /// Reward signal
    pub reward: f32,
    /// Whether the episode ended with this step
    pub terminated: bool,
    /// Additional info from the environment
    pub info: StepInfo,
}

impl StepOutcome {
    pub fn new(observation: Array1<f32>, reward: f32, terminated: bool) -> Self {
        StepOutcome {
            observation,
            reward,
            terminated,
            info: StepInfo::default(),
        }
    }
}

/// Additional information from a step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepInfo {
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// A rendered RGB frame, laid out `[channels, height, width]`
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub pixels: Array3<u8>,
}

impl Frame {
    /// Build a frame from a `[height, width, channels]` buffer, the layout
    /// simulators usually render into.
    pub fn from_hwc(pixels: Array3<u8>) -> Self {
        Frame {
            pixels: pixels.permuted_axes([2, 0, 1]),
        }
    }

    pub fn channels(&self) -> usize {
        self.pixels.shape()[0]
    }

    pub fn height(&self) -> usize {
        self.pixels.shape()[1]
    }

    pub fn width(&self) -> usize {
        self.pixels.shape()[2]
    }
}

/// Episodic, discrete-action environment.
///
/// The trainer queries the sizes once at startup to shape the estimator and
/// then alternates `reset` and `step`. Errors from `reset` and `step` end the
/// training run.
pub trait Environment {
    /// Length of every observation vector
    fn observation_size(&self) -> usize;

    /// Number of discrete actions; legal actions are `0..action_count()`
    fn action_count(&self) -> usize;

    /// Start a new episode and return its initial observation
    fn reset(&mut self) -> Result<Array1<f32>>;

    /// Apply `action` and advance the simulation by one step
    fn step(&mut self, action: usize) -> Result<StepOutcome>;

    /// Render the current state. Only used for visualisation.
    fn render(&mut self) -> Result<Option<Frame>> {
        Ok(None)
    }

    /// Seed the environment's own randomness
    fn seed(&mut self, _seed: u64) {}

    /// Release any resources held by the environment
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
