//! # Activation Functions Module
//!
//! Element-wise non-linearities applied by the estimator's dense layers.
//! Every activation is evaluated on whole batches (`[batch, units]`) because
//! both the training pass and the inference pass of the estimator work on
//! batches of states.
//!
//! ## Available Activations
//!
//! - **ReLU**: `max(0, x)` - default for hidden layers
//! - **Linear**: identity - used for the Q-value output layer
//! - **Tanh**: hyperbolic tangent
//! - **Sigmoid**: `1 / (1 + e^(-x))`
//! - **LeakyReLU**: ReLU with a small negative slope
//!
//! ## Usage Example
//!
//! ```rust
//! use deepq::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![[1.0, -0.5, 0.0, 2.0]];
//! Activation::Relu.apply_batch(&mut data);
//! assert_eq!(data, array![[1.0, 0.0, 0.0, 2.0]]);
//! ```

pub mod functions;

pub use functions::Activation;
