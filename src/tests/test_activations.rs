use ndarray::array;
use crate::activations::Activation;

#[test]
fn test_relu_activation() {
    let mut input = array![[-1.0, 0.0, 1.0, 2.0]];
    Activation::Relu.apply_batch(&mut input);
    assert_eq!(input, array![[0.0, 0.0, 1.0, 2.0]]);
}

#[test]
fn test_linear_is_identity() {
    let mut input = array![[-3.5, 0.0], [1.25, 7.0]];
    Activation::Linear.apply_batch(&mut input);
    assert_eq!(input, array![[-3.5, 0.0], [1.25, 7.0]]);
}

#[test]
fn test_sigmoid_activation() {
    let mut input = array![[0.0]];
    Activation::Sigmoid.apply_batch(&mut input);
    assert!((input[[0, 0]] - 0.5).abs() < 1e-6);
}

#[test]
fn test_tanh_activation() {
    let mut input = array![[0.0, 100.0]];
    Activation::Tanh.apply_batch(&mut input);
    assert_eq!(input[[0, 0]], 0.0);
    assert!((input[[0, 1]] - 1.0).abs() < 1e-6);
}

#[test]
fn test_leaky_relu() {
    let mut input = array![[-1.0, 0.0, 1.0]];
    Activation::LeakyRelu { alpha: 0.01 }.apply_batch(&mut input);
    assert_eq!(input, array![[-0.01, 0.0, 1.0]]);
}

#[test]
fn test_derivatives() {
    let x = array![[-2.0, 3.0]];
    assert_eq!(Activation::Relu.derivative_batch(x.view()), array![[0.0, 1.0]]);
    assert_eq!(Activation::Linear.derivative_batch(x.view()), array![[1.0, 1.0]]);
    assert_eq!(
        Activation::LeakyRelu { alpha: 0.1 }.derivative_batch(x.view()),
        array![[0.1, 1.0]]
    );

    let sig = Activation::Sigmoid.derivative_batch(array![[0.0]].view());
    assert!((sig[[0, 0]] - 0.25).abs() < 1e-6);
    let tanh = Activation::Tanh.derivative_batch(array![[0.0]].view());
    assert!((tanh[[0, 0]] - 1.0).abs() < 1e-6);
}

#[test]
fn test_default_is_relu() {
    assert_eq!(Activation::default(), Activation::Relu);
}
