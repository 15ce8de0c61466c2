use ndarray::{Array2, ArrayView2, Ix1, Ix2};
use rand::Rng;

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use crate::estimator::{Estimator, Parameter, StateDict};
use crate::layers::{DenseLayer, WeightInit};

/// A multi-layer perceptron value estimator.
///
/// Hidden layers use the activation they were built with; the Q-value head
/// is expected to be linear so that value estimates are unbounded.
///
/// # Examples
///
/// ```
/// use deepq::estimator::Estimator;
/// use deepq::network::NeuralNetwork;
/// use ndarray::array;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let network = NeuralNetwork::mlp(4, &[32, 32], 2, &mut rng).unwrap();
/// let values = network.predict(array![[0.1, -0.2, 0.3, 0.0]].view()).unwrap();
/// assert_eq!(values.dim(), (1, 2));
/// ```
#[derive(Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
}

impl NeuralNetwork {
    /// Create a new neural network with the given layer sizes and activations.
    ///
    /// `layer_sizes` includes the input and output widths, so it needs one
    /// more entry than `activations`.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(DqnError::invalid_parameter(
                "layer_sizes".to_string(),
                format!("need at least an input and an output size, got {:?}", layer_sizes),
            ));
        }
        if layer_sizes.len() - 1 != activations.len() {
            return Err(DqnError::dimension_mismatch(
                format!("{} activations", layer_sizes.len() - 1),
                format!("{} activations", activations.len()),
            ));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| {
                let init = WeightInit::for_activation(&activation);
                DenseLayer::new(window[0], window[1], activation, init, &mut *rng)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(NeuralNetwork { layers })
    }

    /// ReLU hidden layers followed by a linear Q-value head.
    pub fn mlp<R: Rng + ?Sized>(
        input_size: usize,
        hidden: &[usize],
        num_actions: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let mut layer_sizes = Vec::with_capacity(hidden.len() + 2);
        layer_sizes.push(input_size);
        layer_sizes.extend_from_slice(hidden);
        layer_sizes.push(num_actions);

        let mut activations = vec![Activation::Relu; hidden.len()];
        activations.push(Activation::Linear);

        Self::new(&layer_sizes, &activations, rng)
    }

    /// Build a network from pre-built layers, checking that consecutive widths line up.
    pub fn from_layers(layers: Vec<DenseLayer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(DqnError::invalid_parameter("layers", "a network needs at least one layer"));
        }
        for pair in layers.windows(2) {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(DqnError::dimension_mismatch(
                    pair[0].output_size().to_string(),
                    pair[1].input_size().to_string(),
                ));
            }
        }
        Ok(NeuralNetwork { layers })
    }

    /// Input width followed by every layer's output width
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![self.input_size()];
        sizes.extend(self.layers.iter().map(DenseLayer::output_size));
        sizes
    }

    fn check_input(&self, states: &ArrayView2<f32>) -> Result<()> {
        if states.ncols() != self.input_size() {
            return Err(DqnError::dimension_mismatch(
                format!("states with {} features", self.input_size()),
                format!("states with {} features", states.ncols()),
            ));
        }
        Ok(())
    }
}

impl Estimator for NeuralNetwork {
    fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    fn num_actions(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    fn forward(&mut self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(&states)?;
        let mut current_output = states.to_owned();
        for layer in &mut self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        Ok(current_output)
    }

    fn predict(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(&states)?;
        let mut current_output = states.to_owned();
        for layer in &self.layers {
            current_output = layer.predict_batch(current_output.view());
        }
        Ok(current_output)
    }

    fn backward(&mut self, output_grads: ArrayView2<f32>) -> Result<()> {
        let mut current_error = output_grads.to_owned();
        for layer in self.layers.iter_mut().rev() {
            current_error = layer.backward_batch(current_error.view())?;
        }
        Ok(())
    }

    fn zero_grad(&mut self) {
        for layer in &mut self.layers {
            layer.zero_grad();
        }
    }

    fn parameters_mut(&mut self) -> Vec<Parameter<'_>> {
        self.layers.iter_mut().flat_map(|layer| layer.parameters_mut()).collect()
    }

    fn state_dict(&self) -> StateDict {
        let tensors = self
            .layers
            .iter()
            .flat_map(|layer| [layer.weights.clone().into_dyn(), layer.biases.clone().into_dyn()])
            .collect();
        StateDict::new(tensors)
    }

    fn load_state_dict(&mut self, state: &StateDict) -> Result<()> {
        self.state_dict().check_compatible(state)?;

        for (layer, pair) in self.layers.iter_mut().zip(state.tensors.chunks(2)) {
            let weights = pair[0]
                .view()
                .into_dimensionality::<Ix2>()
                .map_err(|e| {
                    DqnError::dimension_mismatch("2-d weights".to_string(), e.to_string())
                })?;
            let biases = pair[1]
                .view()
                .into_dimensionality::<Ix1>()
                .map_err(|e| {
                    DqnError::dimension_mismatch("1-d biases".to_string(), e.to_string())
                })?;
            layer.weights.assign(&weights);
            layer.biases.assign(&biases);
        }
        Ok(())
    }
}
