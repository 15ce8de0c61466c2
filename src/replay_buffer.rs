use ndarray::{Array1, ArrayView1};
use rand::seq::index;
use rand::Rng;

use crate::error::{DqnError, Result};

/// One step of experience.
///
/// A transition is terminal exactly when it has no successor state, so the
/// "next state present iff non-terminal" rule cannot be broken.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    state: Array1<f32>,
    action: usize,
    reward: f32,
    next_state: Option<Array1<f32>>,
}

impl Transition {
    pub fn new(
        state: Array1<f32>,
        action: usize,
        reward: f32,
        next_state: Option<Array1<f32>>,
    ) -> Self {
        Transition { state, action, reward, next_state }
    }

    /// A transition that ended the episode.
    pub fn terminal(state: Array1<f32>, action: usize, reward: f32) -> Self {
        Self::new(state, action, reward, None)
    }

    pub fn state(&self) -> ArrayView1<'_, f32> {
        self.state.view()
    }

    pub fn action(&self) -> usize {
        self.action
    }

    pub fn reward(&self) -> f32 {
        self.reward
    }

    pub fn next_state(&self) -> Option<ArrayView1<'_, f32>> {
        self.next_state.as_ref().map(Array1::view)
    }

    pub fn is_non_terminal(&self) -> bool {
        self.next_state.is_some()
    }
}

/// Fixed-capacity experience replay memory.
///
/// Pushes append until the memory is full; after that each push overwrites
/// the oldest stored transition. Sampling draws distinct slots uniformly at
/// random.
#[derive(Clone, Debug)]
pub struct ReplayMemory {
    buffer: Vec<Transition>,
    capacity: usize,
    position: usize,
}

impl ReplayMemory {
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay memory capacity must be positive");
        ReplayMemory {
            buffer: Vec::with_capacity(capacity),
            capacity,
            position: 0,
        }
    }

    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(transition);
        } else {
            self.buffer[self.position] = transition;
        }
        self.position = (self.position + 1) % self.capacity;
    }

    /// Draw `batch_size` distinct transitions uniformly at random.
    ///
    /// Asking for more transitions than are stored is an error; the batch is
    /// never silently shortened.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<Vec<&Transition>> {
        if batch_size > self.buffer.len() {
            return Err(DqnError::InsufficientSamples {
                requested: batch_size,
                available: self.buffer.len(),
            });
        }
        Ok(index::sample(rng, self.buffer.len(), batch_size)
            .into_iter()
            .map(|i| &self.buffer[i])
            .collect())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored transitions from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> + '_ {
        let split = if self.is_full() { self.position } else { 0 };
        self.buffer[split..].iter().chain(self.buffer[..split].iter())
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.position = 0;
    }
}
