//! # Exploration
//!
//! Epsilon-greedy action selection with an epsilon that decays with the
//! number of environment steps taken so far.

use ndarray::{ArrayView1, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DqnError, Result};
use crate::estimator::Estimator;

/// Exploration rate as a function of the global step count.
///
/// Every variant is monotonically non-increasing in `t`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "KIND", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EpsilonSchedule {
    /// `end + (start - end) * exp(-t / decay)`
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    Exponential { start: f32, end: f32, decay: f32 },

    /// Linear interpolation from `start` to `end` over `steps`, then flat.
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    Linear { start: f32, end: f32, steps: u64 },

    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    Constant { epsilon: f32 },
}

impl EpsilonSchedule {
    /// Epsilon after `t` steps, clamped to `[0, 1]`.
    pub fn epsilon(&self, t: u64) -> f32 {
        let value = match *self {
            EpsilonSchedule::Exponential { start, end, decay } => {
                end + (start - end) * (-(t as f64) / decay as f64).exp() as f32
            }
            EpsilonSchedule::Linear { start, end, steps } => {
                if steps == 0 || t >= steps {
                    end
                } else {
                    let progress = t as f32 / steps as f32;
                    start + (end - start) * progress
                }
            }
            EpsilonSchedule::Constant { epsilon } => epsilon,
        };
        value.clamp(0.0, 1.0)
    }

    pub fn validate(&self) -> Result<()> {
        let in_unit = |name: &str, v: f32| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                let reason = format!("{} is outside [0, 1]", v);
                Err(DqnError::invalid_parameter(name.to_string(), reason))
            }
        };
        match *self {
            EpsilonSchedule::Exponential { start, end, decay } => {
                in_unit("EXPLORATION.START", start)?;
                in_unit("EXPLORATION.END", end)?;
                if end > start {
                    return Err(DqnError::invalid_parameter(
                        "EXPLORATION",
                        "epsilon must not increase over time",
                    ));
                }
                if !(decay > 0.0) || !decay.is_finite() {
                    return Err(DqnError::invalid_parameter(
                        "EXPLORATION.DECAY".to_string(),
                        format!("decay must be a positive number of steps, got {}", decay),
                    ));
                }
                Ok(())
            }
            EpsilonSchedule::Linear { start, end, .. } => {
                in_unit("EXPLORATION.START", start)?;
                in_unit("EXPLORATION.END", end)?;
                if end > start {
                    return Err(DqnError::invalid_parameter(
                        "EXPLORATION",
                        "epsilon must not increase over time",
                    ));
                }
                Ok(())
            }
            EpsilonSchedule::Constant { epsilon } => in_unit("EXPLORATION.EPSILON", epsilon),
        }
    }
}

impl Default for EpsilonSchedule {
    fn default() -> Self {
        EpsilonSchedule::Exponential {
            start: 0.99,
            end: 0.05,
            decay: 500.0,
        }
    }
}

/// Index of the largest value; ties go to the lowest index and NaN never wins.
pub fn greedy_action(values: ArrayView1<f32>) -> Result<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, best_value)) if v <= best_value => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i).ok_or_else(|| {
        DqnError::invalid_parameter("values", "no comparable value estimate to choose from")
    })
}

/// Epsilon-greedy choice among `0..num_actions`.
///
/// With probability `schedule.epsilon(total_steps)` a uniformly random
/// action is returned; otherwise the state is evaluated with
/// [`Estimator::predict`] and the greedy action is taken.
pub fn sample_action<E, R>(
    estimator: &E,
    state: ArrayView1<f32>,
    schedule: &EpsilonSchedule,
    num_actions: usize,
    total_steps: u64,
    rng: &mut R,
) -> Result<usize>
where
    E: Estimator + ?Sized,
    R: Rng + ?Sized,
{
    if num_actions == 0 {
        return Err(DqnError::invalid_parameter("num_actions", "the action set is empty"));
    }

    let epsilon = schedule.epsilon(total_steps);
    if rng.gen::<f32>() < epsilon {
        return Ok(rng.gen_range(0..num_actions));
    }

    let values = estimator.predict(state.insert_axis(Axis(0)))?;
    if values.ncols() != num_actions {
        return Err(DqnError::dimension_mismatch(
            format!("{} action values", num_actions),
            format!("{} action values", values.ncols()),
        ));
    }
    greedy_action(values.row(0))
}
