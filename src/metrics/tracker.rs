use serde::{Deserialize, Serialize};

use super::aggregator::StatisticAggregator;

/// Moving averages of the three per-episode statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub loss: f32,
    pub reward: f32,
    pub length: f32,
}

/// Tracks per-episode totals over a sliding window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeStatistics {
    pub losses: StatisticAggregator,
    pub rewards: StatisticAggregator,
    pub durations: StatisticAggregator,
}

impl EpisodeStatistics {
    pub fn new(window: usize) -> Self {
        EpisodeStatistics {
            losses: StatisticAggregator::new(window),
            rewards: StatisticAggregator::new(window),
            durations: StatisticAggregator::new(window),
        }
    }

    /// Record the totals of one finished episode
    pub fn record(&mut self, loss: f32, reward: f32, length: usize) {
        self.losses.append(loss);
        self.rewards.append(reward);
        self.durations.append(length as f32);
    }

    pub fn summary(&self, window: usize) -> EpisodeSummary {
        EpisodeSummary {
            loss: self.losses.moving_average(window),
            reward: self.rewards.moving_average(window),
            length: self.durations.moving_average(window),
        }
    }

    pub fn episodes_recorded(&self) -> usize {
        self.rewards.len()
    }
}
