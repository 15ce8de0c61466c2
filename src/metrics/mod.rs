pub mod aggregator;
pub mod tracker;

pub use aggregator::StatisticAggregator;
pub use tracker::{EpisodeStatistics, EpisodeSummary};
