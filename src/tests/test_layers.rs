use ndarray::{array, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activations::Activation;
use crate::layers::{DenseLayer, WeightInit};

fn layer(weights: Array2<f32>, activation: Activation) -> DenseLayer {
    let mut rng = StdRng::seed_from_u64(0);
    let (inputs, outputs) = weights.dim();
    DenseLayer::new(inputs, outputs, activation, WeightInit::Zeros, &mut rng)
        .unwrap()
        .with_weights(weights)
}

#[test]
fn test_dense_layer_creation() {
    let mut rng = StdRng::seed_from_u64(1);
    let layer = DenseLayer::new(3, 4, Activation::Relu, WeightInit::HeNormal, &mut rng).unwrap();
    assert_eq!(layer.weights.shape(), [3, 4]);
    assert_eq!(layer.biases.shape(), [4]);
    assert_eq!(layer.input_size(), 3);
    assert_eq!(layer.output_size(), 4);
    assert!(layer.biases.iter().all(|&b| b == 0.0));
}

#[test]
fn test_zero_sized_layer_is_rejected() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(DenseLayer::new(0, 4, Activation::Relu, WeightInit::HeNormal, &mut rng).is_err());
}

#[test]
fn test_forward_and_predict_agree() {
    let mut layer = layer(array![[1.0, -1.0], [2.0, 0.5]], Activation::Relu).with_biases(array![0.5, 0.0]);
    let inputs = array![[1.0, 1.0], [-1.0, 2.0]];

    let predicted = layer.predict_batch(inputs.view());
    let forwarded = layer.forward_batch(inputs.view());
    assert_eq!(predicted, forwarded);
    assert_eq!(forwarded, array![[3.5, 0.0], [3.5, 2.0]]);
}

#[test]
fn test_backward_accumulates_gradients() {
    let mut layer = layer(array![[1.0], [2.0]], Activation::Linear);
    let inputs = array![[1.0, 3.0]];
    layer.forward_batch(inputs.view());

    let input_error = layer.backward_batch(array![[0.5]].view()).unwrap();
    assert_eq!(layer.weight_grads(), &array![[0.5], [1.5]]);
    assert_eq!(layer.bias_grads(), &array![0.5]);
    assert_eq!(input_error, array![[0.5, 1.0]]);

    layer.backward_batch(array![[0.5]].view()).unwrap();
    assert_eq!(layer.weight_grads(), &array![[1.0], [3.0]]);

    layer.zero_grad();
    assert!(layer.weight_grads().iter().all(|&g| g == 0.0));
    assert!(layer.bias_grads().iter().all(|&g| g == 0.0));
}

#[test]
fn test_backward_requires_forward() {
    let mut layer = layer(array![[1.0]], Activation::Linear);
    assert!(layer.backward_batch(array![[1.0]].view()).is_err());
}

#[test]
fn test_backward_checks_dimensions() {
    let mut layer = layer(array![[1.0, 1.0]], Activation::Linear);
    layer.forward_batch(array![[1.0]].view());
    assert!(layer.backward_batch(array![[1.0]].view()).is_err());
}

#[test]
fn test_predict_does_not_record_activations() {
    let mut layer = layer(array![[1.0]], Activation::Linear);
    layer.predict_batch(array![[1.0]].view());
    assert!(layer.backward_batch(array![[1.0]].view()).is_err());
}

#[test]
fn test_initialization_ranges() {
    let mut rng = StdRng::seed_from_u64(5);
    let weights = WeightInit::XavierUniform.initialize_weights((10, 20), &mut rng).unwrap();
    let limit = (6.0f32 / 30.0).sqrt();
    assert!(weights.iter().all(|w| w.abs() <= limit));

    let weights = WeightInit::Uniform { min: -0.1, max: 0.1 }.initialize_weights((4, 4), &mut rng).unwrap();
    assert!(weights.iter().all(|w| (-0.1..0.1).contains(w)));

    assert!(WeightInit::Uniform { min: 1.0, max: 0.0 }.initialize_weights((2, 2), &mut rng).is_err());
    assert_eq!(WeightInit::for_activation(&Activation::Relu), WeightInit::HeNormal);
    assert_eq!(WeightInit::for_activation(&Activation::Linear), WeightInit::XavierUniform);
}
