use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;

use super::initialization::WeightInit;
use crate::activations::Activation;
use crate::error::{DqnError, Result};
use crate::estimator::Parameter;

/// A fully connected (dense) layer.
///
/// Besides its weights and biases the layer owns one gradient buffer per
/// parameter. `backward_batch` accumulates into those buffers and
/// `zero_grad` resets them, so an optimiser can read (and a clipper can
/// rewrite) the gradients between the backward pass and the update.
#[derive(Clone, Debug)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
    weight_grads: Array2<f32>,
    bias_grads: Array1<f32>,
    pre_activation_output: Option<Array2<f32>>,
    inputs: Option<Array2<f32>>,
}

impl DenseLayer {
    /// Create a new dense layer, drawing its initial weights from `rng`.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        let weights = init.initialize_weights((input_size, output_size), rng)?;
        let biases = init.initialize_biases(output_size);
        Ok(DenseLayer {
            weight_grads: Array2::zeros(weights.dim()),
            bias_grads: Array1::zeros(biases.dim()),
            weights,
            biases,
            activation,
            pre_activation_output: None,
            inputs: None,
        })
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Self {
        assert_eq!(weights.dim(), self.weights.dim());
        self.weights = weights;
        self
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Self {
        assert_eq!(biases.dim(), self.biases.dim());
        self.biases = biases;
        self
    }

    /// Training forward pass: caches the inputs and pre-activations needed by `backward_batch`.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let pre_activation = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        let mut outputs = pre_activation.clone();
        self.activation.apply_batch(&mut outputs);
        self.inputs = Some(inputs.to_owned());
        self.pre_activation_output = Some(pre_activation);
        outputs
    }

    /// Inference forward pass. Leaves the layer untouched.
    pub fn predict_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Accumulate parameter gradients for `output_errors` (dL/d output) and
    /// return dL/d input for the previous layer.
    pub fn backward_batch(&mut self, output_errors: ArrayView2<f32>) -> Result<Array2<f32>> {
        let (inputs, pre_activation) = match (&self.inputs, &self.pre_activation_output) {
            (Some(inputs), Some(pre_activation)) => (inputs, pre_activation),
            _ => {
                return Err(DqnError::invalid_parameter(
                    "backward",
                    "forward_batch() must be called before backward_batch()",
                ))
            }
        };
        if output_errors.dim() != pre_activation.dim() {
            return Err(DqnError::dimension_mismatch(
                format!("{:?}", pre_activation.dim()),
                format!("{:?}", output_errors.dim()),
            ));
        }

        let derivative = self.activation.derivative_batch(pre_activation.view());
        let adjusted_error = &output_errors * &derivative;
        self.weight_grads += &inputs.t().dot(&adjusted_error);
        self.bias_grads += &adjusted_error.sum_axis(Axis(0));

        Ok(adjusted_error.dot(&self.weights.t()))
    }

    /// Reset both gradient buffers to zero.
    pub fn zero_grad(&mut self) {
        if self.weight_grads.dim() == self.weights.dim() {
            self.weight_grads.fill(0.0);
        } else {
            self.weight_grads = Array2::zeros(self.weights.dim());
        }
        if self.bias_grads.dim() == self.biases.dim() {
            self.bias_grads.fill(0.0);
        } else {
            self.bias_grads = Array1::zeros(self.biases.dim());
        }
    }

    pub fn weight_grads(&self) -> &Array2<f32> {
        &self.weight_grads
    }

    pub fn bias_grads(&self) -> &Array1<f32> {
        &self.bias_grads
    }

    /// Weights and biases paired with their gradient buffers.
    pub fn parameters_mut(&mut self) -> [Parameter<'_>; 2] {
        let DenseLayer { weights, biases, weight_grads, bias_grads, .. } = self;
        [
            Parameter {
                value: weights.view_mut().into_dyn(),
                grad: weight_grads.view_mut().into_dyn(),
            },
            Parameter {
                value: biases.view_mut().into_dyn(),
                grad: bias_grads.view_mut().into_dyn(),
            },
        ]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }
}
