use std::collections::HashSet;

use ndarray::array;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::DqnError;
use crate::replay_buffer::{ReplayMemory, Transition};

fn transition(i: usize) -> Transition {
    Transition::new(array![i as f32], i, i as f32, Some(array![(i + 1) as f32]))
}

#[test]
fn test_replay_memory_push_and_sample() {
    let mut memory = ReplayMemory::new(10);
    let experience = Transition::new(array![0.5, -0.5], 0, 1.0, Some(array![0.6, -0.4]));
    memory.push(experience.clone());
    assert_eq!(memory.len(), 1);

    let mut rng = StdRng::seed_from_u64(0);
    let sample = memory.sample(1, &mut rng).unwrap();
    assert_eq!(sample[0], &experience);
}

#[test]
fn test_replay_memory_overwrites_oldest() {
    let mut memory = ReplayMemory::new(5);
    for i in 1..=7 {
        memory.push(transition(i));
    }

    assert_eq!(memory.len(), 5);
    assert!(memory.is_full());
    let actions: Vec<usize> = memory.iter().map(|t| t.action()).collect();
    assert_eq!(actions, vec![3, 4, 5, 6, 7]);
}

#[test]
fn test_replay_memory_len_before_full() {
    let mut memory = ReplayMemory::new(4);
    assert!(memory.is_empty());
    for i in 0..3 {
        memory.push(transition(i));
        assert_eq!(memory.len(), i + 1);
    }
    assert!(!memory.is_full());
    assert_eq!(memory.capacity(), 4);
}

#[test]
fn test_sample_returns_distinct_transitions() {
    let mut memory = ReplayMemory::new(50);
    for i in 0..50 {
        memory.push(transition(i));
    }

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let batch = memory.sample(32, &mut rng).unwrap();
        assert_eq!(batch.len(), 32);
        let distinct: HashSet<usize> = batch.iter().map(|t| t.action()).collect();
        assert_eq!(distinct.len(), 32);
    }
}

#[test]
fn test_sample_whole_memory() {
    let mut memory = ReplayMemory::new(8);
    for i in 0..8 {
        memory.push(transition(i));
    }
    let mut rng = StdRng::seed_from_u64(1);
    let batch = memory.sample(8, &mut rng).unwrap();
    let mut actions: Vec<usize> = batch.iter().map(|t| t.action()).collect();
    actions.sort_unstable();
    assert_eq!(actions, (0..8).collect::<Vec<_>>());
}

#[test]
fn test_sample_more_than_stored_fails() {
    let mut memory = ReplayMemory::new(10);
    for i in 0..3 {
        memory.push(transition(i));
    }
    let mut rng = StdRng::seed_from_u64(0);
    match memory.sample(4, &mut rng) {
        Err(DqnError::InsufficientSamples { requested, available }) => {
            assert_eq!(requested, 4);
            assert_eq!(available, 3);
        }
        other => panic!("expected InsufficientSamples, got {:?}", other.map(|b| b.len())),
    }
}

#[test]
fn test_terminal_transition_has_no_next_state() {
    let t = Transition::terminal(array![1.0, 2.0], 1, -1.0);
    assert!(!t.is_non_terminal());
    assert!(t.next_state().is_none());

    let t = Transition::new(array![1.0, 2.0], 1, -1.0, Some(array![3.0, 4.0]));
    assert!(t.is_non_terminal());
    assert_eq!(t.next_state().unwrap(), array![3.0, 4.0].view());
}

#[test]
fn test_clear() {
    let mut memory = ReplayMemory::new(3);
    for i in 0..5 {
        memory.push(transition(i));
    }
    memory.clear();
    assert!(memory.is_empty());
    memory.push(transition(9));
    assert_eq!(memory.iter().next().unwrap().action(), 9);
}

#[test]
#[should_panic]
fn test_zero_capacity_panics() {
    let _ = ReplayMemory::new(0);
}
