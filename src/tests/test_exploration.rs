use ndarray::array;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activations::Activation;
use crate::error::DqnError;
use crate::exploration::{greedy_action, sample_action, EpsilonSchedule};
use crate::layers::{DenseLayer, WeightInit};
use crate::network::NeuralNetwork;

/// One linear layer computing `Q(s) = s * W`, so the greedy action is known.
fn linear_estimator(weights: ndarray::Array2<f32>) -> NeuralNetwork {
    let mut rng = StdRng::seed_from_u64(0);
    let (inputs, outputs) = weights.dim();
    let layer = DenseLayer::new(inputs, outputs, Activation::Linear, WeightInit::Zeros, &mut rng)
        .unwrap()
        .with_weights(weights);
    NeuralNetwork::from_layers(vec![layer]).unwrap()
}

#[test]
fn test_greedy_action_picks_max() {
    assert_eq!(greedy_action(array![0.1, 0.7, 0.3].view()).unwrap(), 1);
    assert_eq!(greedy_action(array![-5.0, -2.0].view()).unwrap(), 1);
}

#[test]
fn test_greedy_action_ties_go_to_lowest_index() {
    assert_eq!(greedy_action(array![0.5, 0.9, 0.9, 0.2].view()).unwrap(), 1);
}

#[test]
fn test_greedy_action_skips_nan() {
    assert_eq!(greedy_action(array![f32::NAN, 0.2, 0.1].view()).unwrap(), 1);
    assert!(greedy_action(array![f32::NAN].view()).is_err());
}

#[test]
fn test_zero_epsilon_is_always_greedy() {
    let estimator = linear_estimator(array![[0.0, 1.0, 0.5], [0.0, 1.0, 0.5]]);
    let schedule = EpsilonSchedule::Constant { epsilon: 0.0 };
    let mut rng = StdRng::seed_from_u64(3);

    for t in 0..200 {
        let action = sample_action(&estimator, array![1.0, 1.0].view(), &schedule, 3, t, &mut rng).unwrap();
        assert_eq!(action, 1);
    }
}

#[test]
fn test_full_epsilon_is_uniform() {
    let estimator = linear_estimator(array![[0.0, 1.0, 0.5, 0.2]]);
    let schedule = EpsilonSchedule::Constant { epsilon: 1.0 };
    let mut rng = StdRng::seed_from_u64(11);

    let mut counts = [0usize; 4];
    let draws = 8000;
    for t in 0..draws {
        let action = sample_action(&estimator, array![1.0].view(), &schedule, 4, t, &mut rng).unwrap();
        counts[action] += 1;
    }
    // Each action should get roughly a quarter of the draws.
    for &count in &counts {
        let share = count as f32 / draws as f32;
        assert!((share - 0.25).abs() < 0.03, "share {} too far from uniform", share);
    }
}

#[test]
fn test_sample_action_rejects_empty_action_set() {
    let estimator = linear_estimator(array![[1.0]]);
    let schedule = EpsilonSchedule::default();
    let mut rng = StdRng::seed_from_u64(0);
    let result = sample_action(&estimator, array![1.0].view(), &schedule, 0, 0, &mut rng);
    assert!(matches!(result, Err(DqnError::InvalidParameter { .. })));
}

#[test]
fn test_sample_action_checks_value_width() {
    let estimator = linear_estimator(array![[1.0, 2.0]]);
    let schedule = EpsilonSchedule::Constant { epsilon: 0.0 };
    let mut rng = StdRng::seed_from_u64(0);
    let result = sample_action(&estimator, array![1.0].view(), &schedule, 3, 0, &mut rng);
    assert!(matches!(result, Err(DqnError::DimensionMismatch { .. })));
}

#[test]
fn test_exponential_schedule() {
    let schedule = EpsilonSchedule::default();
    assert!((schedule.epsilon(0) - 0.99).abs() < 1e-6);
    let expected = 0.05 + 0.94 * (-1.0f32).exp();
    assert!((schedule.epsilon(500) - expected).abs() < 1e-5);
    assert!((schedule.epsilon(1_000_000) - 0.05).abs() < 1e-6);
}

#[test]
fn test_linear_schedule() {
    let schedule = EpsilonSchedule::Linear { start: 1.0, end: 0.1, steps: 100 };
    assert_eq!(schedule.epsilon(0), 1.0);
    assert!((schedule.epsilon(50) - 0.55).abs() < 1e-6);
    assert!((schedule.epsilon(100) - 0.1).abs() < 1e-6);
    assert!((schedule.epsilon(5000) - 0.1).abs() < 1e-6);
}

#[test]
fn test_schedules_never_increase() {
    let schedules = [
        EpsilonSchedule::default(),
        EpsilonSchedule::Linear { start: 0.9, end: 0.0, steps: 300 },
        EpsilonSchedule::Constant { epsilon: 0.3 },
    ];
    for schedule in &schedules {
        let mut previous = schedule.epsilon(0);
        for t in 1..2000 {
            let current = schedule.epsilon(t);
            assert!(current <= previous, "{:?} increased at t={}", schedule, t);
            assert!((0.0..=1.0).contains(&current));
            previous = current;
        }
    }
}

#[test]
fn test_schedule_validation() {
    assert!(EpsilonSchedule::default().validate().is_ok());
    assert!(EpsilonSchedule::Constant { epsilon: 1.5 }.validate().is_err());
    assert!(EpsilonSchedule::Linear { start: 0.1, end: 0.9, steps: 10 }.validate().is_err());
    assert!(EpsilonSchedule::Exponential { start: 0.9, end: 0.1, decay: 0.0 }.validate().is_err());
}

#[test]
fn test_schedule_serde_names() {
    let schedule: EpsilonSchedule =
        serde_json::from_str(r#"{ "KIND": "LINEAR", "START": 1.0, "END": 0.05, "STEPS": 20000 }"#).unwrap();
    assert_eq!(schedule, EpsilonSchedule::Linear { start: 1.0, end: 0.05, steps: 20000 });
}
