use crate::metrics::{EpisodeStatistics, StatisticAggregator};

#[test]
fn test_moving_average_grows_then_slides() {
    let mut aggregator = StatisticAggregator::new(3);
    let mut averages = Vec::new();
    for v in [1.0, 2.0, 3.0, 4.0] {
        aggregator.append(v);
        averages.push(aggregator.moving_average(3));
    }
    assert_eq!(averages, vec![1.0, 1.5, 2.0, 3.0]);
}

#[test]
fn test_empty_aggregator_averages_to_zero() {
    let aggregator = StatisticAggregator::new(5);
    assert_eq!(aggregator.moving_average(5), 0.0);
    assert!(aggregator.latest().is_none());
}

#[test]
fn test_window_smaller_than_capacity() {
    let mut aggregator = StatisticAggregator::new(10);
    for v in 1..=6 {
        aggregator.append(v as f32);
    }
    assert_eq!(aggregator.moving_average(2), 5.5);
    assert_eq!(aggregator.moving_average(100), 3.5);
}

#[test]
fn test_capacity_evicts_oldest() {
    let mut aggregator = StatisticAggregator::new(2);
    aggregator.append(10.0);
    aggregator.append(20.0);
    aggregator.append(30.0);
    assert_eq!(aggregator.len(), 2);
    assert_eq!(aggregator.values().collect::<Vec<_>>(), vec![20.0, 30.0]);
    assert_eq!(aggregator.latest(), Some(30.0));
}

#[test]
fn test_episode_statistics_summary() {
    let mut stats = EpisodeStatistics::new(2);
    stats.record(1.0, 10.0, 10);
    stats.record(3.0, 20.0, 30);
    stats.record(5.0, 30.0, 50);

    let summary = stats.summary(2);
    assert_eq!(summary.loss, 4.0);
    assert_eq!(summary.reward, 25.0);
    assert_eq!(summary.length, 40.0);
    assert_eq!(stats.episodes_recorded(), 2);
}
