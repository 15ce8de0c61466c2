//! # Visualisation
//!
//! Sinks that receive one [`EpisodeReport`] at the end of every episode.
//! A failing sink never stops training: the trainer logs the error and
//! carries on.

pub mod export;

use serde::Serialize;
use tracing::info;

use crate::environment::Frame;
use crate::error::Result;

pub use export::{CsvVisualizer, JsonLinesVisualizer};

/// Per-episode data handed to a [`Visualizer`].
///
/// `loss` and `reward` are normalised by the episode length; the moving
/// averages are over the per-episode totals.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeReport {
    pub episode: usize,
    pub loss: f32,
    pub moving_loss: f32,
    pub reward: f32,
    pub moving_reward: f32,
    pub length: usize,
    pub moving_length: f32,
    #[serde(skip)]
    pub frame: Option<Frame>,
}

pub trait Visualizer {
    fn update(&mut self, report: &EpisodeReport) -> Result<()>;
}

impl<V: Visualizer + ?Sized> Visualizer for Box<V> {
    fn update(&mut self, report: &EpisodeReport) -> Result<()> {
        (**self).update(report)
    }
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVisualizer;

impl Visualizer for NoopVisualizer {
    fn update(&mut self, _report: &EpisodeReport) -> Result<()> {
        Ok(())
    }
}

/// Writes each report as a structured `tracing` event.
#[derive(Debug, Clone, Default)]
pub struct LogVisualizer {
    pub label: String,
}

impl LogVisualizer {
    pub fn new(label: impl Into<String>) -> Self {
        LogVisualizer { label: label.into() }
    }
}

impl Visualizer for LogVisualizer {
    fn update(&mut self, report: &EpisodeReport) -> Result<()> {
        info!(
            target: "deepq::visualization",
            label = %self.label,
            episode = report.episode,
            loss = report.loss,
            moving_loss = report.moving_loss,
            reward = report.reward,
            moving_reward = report.moving_reward,
            length = report.length,
            moving_length = report.moving_length,
            frame = report.frame.is_some(),
            "episode report"
        );
        Ok(())
    }
}
