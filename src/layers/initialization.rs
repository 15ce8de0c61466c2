use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::{Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{DqnError, Result};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeightInit {
    /// Xavier/Glorot uniform initialization
    XavierUniform,

    /// He/Kaiming uniform initialization (for ReLU)
    HeUniform,

    /// He/Kaiming normal initialization (for ReLU)
    HeNormal,

    /// Uniform distribution with custom range
    Uniform { min: f32, max: f32 },

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Initialize a `[fan_in, fan_out]` weight matrix from the given generator.
    pub fn initialize_weights<R: Rng + ?Sized>(
        &self,
        shape: (usize, usize),
        rng: &mut R,
    ) -> Result<Array2<f32>> {
        let (fan_in, fan_out) = shape;
        if fan_in == 0 || fan_out == 0 {
            return Err(DqnError::invalid_parameter(
                "layer_shape".to_string(),
                format!("layers need at least one input and one output, got {:?}", shape),
            ));
        }

        let weights = match self {
            WeightInit::XavierUniform => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Array2::random_using(shape, Uniform::new(-limit, limit), rng)
            }
            WeightInit::HeUniform => {
                let limit = (6.0 / fan_in as f32).sqrt();
                Array2::random_using(shape, Uniform::new(-limit, limit), rng)
            }
            WeightInit::HeNormal => {
                let std = (2.0 / fan_in as f32).sqrt();
                let normal = Normal::new(0.0, std).map_err(|e| {
                    DqnError::invalid_parameter("he_normal_std".to_string(), e.to_string())
                })?;
                Array2::random_using(shape, normal, rng)
            }
            WeightInit::Uniform { min, max } => {
                if !(min < max) {
                    return Err(DqnError::invalid_parameter(
                        "uniform_range".to_string(),
                        format!("min ({}) must be smaller than max ({})", min, max),
                    ));
                }
                Array2::random_using(shape, Uniform::new(*min, *max), rng)
            }
            WeightInit::Zeros => Array2::zeros(shape),
        };
        Ok(weights)
    }

    /// Biases always start at zero.
    pub fn initialize_biases(&self, size: usize) -> Array1<f32> {
        Array1::zeros(size)
    }

    /// Get the recommended initialization for an activation function
    pub fn for_activation(activation: &Activation) -> Self {
        match activation {
            Activation::Relu | Activation::LeakyRelu { .. } => WeightInit::HeNormal,
            Activation::Tanh | Activation::Sigmoid | Activation::Linear => {
                WeightInit::XavierUniform
            }
        }
    }
}
