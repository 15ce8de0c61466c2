//! # Optimisation Step
//!
//! Turns a sampled batch of transitions into one gradient update of the
//! online estimator.
//!
//! The regression target of a transition is
//! `reward + discount * max_a Q_next(next_state, a)` when the transition is
//! non-terminal and just `reward` when it is terminal. `Q_next` is the
//! online estimator, or the target estimator when Double DQN is enabled.
//! The next-state pass goes through [`Estimator::predict`], so the target
//! is a constant as far as the update is concerned.

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{DqnError, Result};
use crate::estimator::Estimator;
use crate::loss::HuberLoss;
use crate::optimizer::{GradientClipper, Optimizer};
use crate::replay_buffer::Transition;

/// Learning hyper-parameters of a single optimisation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearnerConfig {
    pub discount_factor: f32,
    pub double_dqn: bool,
}

/// A batch of transitions transposed into parallel arrays.
#[derive(Debug, Clone)]
pub struct TransitionBatch {
    /// `[B, state_size]`
    pub states: Array2<f32>,
    pub actions: Vec<usize>,
    /// `[B]`
    pub rewards: Array1<f32>,
    pub non_terminal: Vec<bool>,
    /// `[N, state_size]`, one row per non-terminal transition, in batch order
    pub next_states: Array2<f32>,
}

impl TransitionBatch {
    pub fn from_transitions(transitions: &[&Transition]) -> Result<Self> {
        let first = transitions.first().ok_or(DqnError::EmptyBatch)?;
        let state_size = first.state().len();
        let batch_size = transitions.len();

        let non_terminal: Vec<bool> = transitions.iter().map(|t| t.is_non_terminal()).collect();
        let num_non_terminal = non_terminal.iter().filter(|&&nt| nt).count();

        let mut states = Array2::zeros((batch_size, state_size));
        let mut next_states = Array2::zeros((num_non_terminal, state_size));
        let mut actions = Vec::with_capacity(batch_size);
        let mut rewards = Array1::zeros(batch_size);

        let mut next_row = 0;
        for (i, transition) in transitions.iter().enumerate() {
            check_width(transition.state(), state_size)?;
            states.row_mut(i).assign(&transition.state());
            actions.push(transition.action());
            rewards[i] = transition.reward();

            if let Some(next_state) = transition.next_state() {
                check_width(next_state, state_size)?;
                next_states.row_mut(next_row).assign(&next_state);
                next_row += 1;
            }
        }

        Ok(TransitionBatch {
            states,
            actions,
            rewards,
            non_terminal,
            next_states,
        })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn num_non_terminal(&self) -> usize {
        self.next_states.nrows()
    }
}

fn check_width(state: ArrayView1<f32>, expected: usize) -> Result<()> {
    if state.len() != expected {
        return Err(DqnError::dimension_mismatch(
            format!("state of length {}", expected),
            format!("state of length {}", state.len()),
        ));
    }
    Ok(())
}

/// Bootstrapped value of every row: the max next-state value for
/// non-terminal rows, exactly zero for terminal rows.
pub fn next_state_values<E>(estimator: &E, batch: &TransitionBatch) -> Result<Array1<f32>>
where
    E: Estimator + ?Sized,
{
    let mut values = Array1::zeros(batch.len());
    if batch.num_non_terminal() == 0 {
        return Ok(values);
    }

    let q_next = estimator.predict(batch.next_states.view())?;
    let mut rows = q_next.rows().into_iter();
    for (value, &non_terminal) in values.iter_mut().zip(&batch.non_terminal) {
        if non_terminal {
            let row = rows
                .next()
                .ok_or_else(|| {
                    DqnError::dimension_mismatch(
                        batch.num_non_terminal().to_string(),
                        q_next.nrows().to_string(),
                    )
                })?;
            *value = row.fold(f32::NEG_INFINITY, |max, &q| max.max(q));
        }
    }
    Ok(values)
}

/// Regression targets `reward + discount * V_next`.
pub fn td_targets(
    rewards: &Array1<f32>,
    next_values: &Array1<f32>,
    discount_factor: f32,
) -> Array1<f32> {
    rewards + &(next_values * discount_factor)
}

/// Run one optimisation step on `transitions` and return the loss.
///
/// The sequence is fixed: forward the states through the online estimator,
/// build the targets from a single gradient-free next-state pass, zero the
/// gradients, back-propagate the Huber loss, clip, and let the optimizer
/// update the online parameters. A batch with no non-terminal transition is
/// rejected before any parameter is touched.
pub fn optimize_model<E, O>(
    online: &mut E,
    target: &E,
    optimizer: &mut O,
    clipper: &GradientClipper,
    transitions: &[&Transition],
    config: &LearnerConfig,
) -> Result<f32>
where
    E: Estimator,
    O: Optimizer + ?Sized,
{
    let batch = TransitionBatch::from_transitions(transitions)?;
    if batch.num_non_terminal() == 0 {
        return Err(DqnError::NoNonTerminalTransitions);
    }

    let num_actions = online.num_actions();
    if let Some(&action) = batch.actions.iter().find(|&&a| a >= num_actions) {
        return Err(DqnError::InvalidAction { action, num_actions });
    }

    let q_values = online.forward(batch.states.view())?;
    let q_taken: Array1<f32> = batch
        .actions
        .iter()
        .enumerate()
        .map(|(row, &action)| q_values[[row, action]])
        .collect();

    let next_values = if config.double_dqn {
        next_state_values(target, &batch)?
    } else {
        next_state_values(&*online, &batch)?
    };
    let targets = td_targets(&batch.rewards, &next_values, config.discount_factor);

    let loss_fn = HuberLoss::default();
    let loss = loss_fn.compute(q_taken.view(), targets.view())?;
    let loss_grad = loss_fn.gradient(q_taken.view(), targets.view())?;

    let mut output_grads = Array2::zeros(q_values.dim());
    for (row, (&action, &g)) in batch.actions.iter().zip(loss_grad.iter()).enumerate() {
        output_grads[[row, action]] = g;
    }

    online.zero_grad();
    online.backward(output_grads.view())?;
    let mut parameters = online.parameters_mut();
    clipper.clip(&mut parameters);
    optimizer.step(&mut parameters)?;

    Ok(loss)
}
