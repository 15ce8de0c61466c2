//! # Estimator Interface
//!
//! An estimator maps a batch of state vectors (`[batch, input_size]`) to a
//! batch of per-action value estimates (`[batch, num_actions]`). The
//! training engine only ever talks to the value function through this
//! trait: the online and the target instance, the action sampler and the
//! optimisation step are all written against it.
//!
//! Two forward passes exist on purpose:
//!
//! - [`Estimator::forward`] takes `&mut self` and records whatever the
//!   backward pass needs. It is only used on the states whose values are
//!   being regressed.
//! - [`Estimator::predict`] takes `&self`. It cannot touch parameters or
//!   recorded activations, which is how "no gradient flows through this
//!   pass" is expressed for action selection and for bootstrapped targets.

use ndarray::{ArrayD, ArrayView2, ArrayViewMutD, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{DqnError, Result};

/// A trainable tensor together with its gradient buffer.
pub struct Parameter<'a> {
    pub value: ArrayViewMutD<'a, f32>,
    pub grad: ArrayViewMutD<'a, f32>,
}

/// Ordered snapshot of every parameter tensor of an estimator.
///
/// Used both for target synchronisation and for checkpoints, so copying
/// one is a bit-exact clone of the parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDict {
    pub tensors: Vec<ArrayD<f32>>,
}

impl StateDict {
    pub fn new(tensors: Vec<ArrayD<f32>>) -> Self {
        StateDict { tensors }
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Total number of scalar parameters
    pub fn num_parameters(&self) -> usize {
        self.tensors.iter().map(|t| t.len()).sum()
    }

    /// Check that `other` has the same number of tensors with the same shapes.
    pub fn check_compatible(&self, other: &StateDict) -> Result<()> {
        if self.tensors.len() != other.tensors.len() {
            return Err(DqnError::dimension_mismatch(
                format!("{} tensors", self.tensors.len()),
                format!("{} tensors", other.tensors.len()),
            ));
        }
        for (mine, theirs) in self.tensors.iter().zip(&other.tensors) {
            if mine.shape() != theirs.shape() {
                return Err(DqnError::dimension_mismatch(
                    format!("{:?}", mine.shape()),
                    format!("{:?}", theirs.shape()),
                ));
            }
        }
        Ok(())
    }
}

/// Value-function approximator consumed by the training engine.
pub trait Estimator {
    /// Width of the state vectors accepted by the estimator
    fn input_size(&self) -> usize;

    /// Number of value estimates produced per state
    fn num_actions(&self) -> usize;

    /// Training forward pass. Records the activations `backward` will need.
    fn forward(&mut self, states: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Inference-only forward pass.
    fn predict(&self, states: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Back-propagate dL/d output of the last `forward` call and accumulate
    /// the parameter gradients.
    fn backward(&mut self, output_grads: ArrayView2<f32>) -> Result<()>;

    /// Reset every gradient buffer to zero.
    fn zero_grad(&mut self);

    /// Parameters paired with their gradients, in a stable order.
    fn parameters_mut(&mut self) -> Vec<Parameter<'_>>;

    /// Copy of the parameter values.
    fn state_dict(&self) -> StateDict;

    /// Overwrite every parameter with the values in `state`.
    fn load_state_dict(&mut self, state: &StateDict) -> Result<()>;

    /// Make `self` an exact copy of `source`'s parameters.
    fn sync_from(&mut self, source: &Self) -> Result<()>
    where
        Self: Sized,
    {
        self.load_state_dict(&source.state_dict())
    }
}
