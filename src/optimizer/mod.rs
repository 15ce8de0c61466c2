//! # Optimizers
//!
//! Update rules applied to an estimator's parameters once gradients have
//! been computed (and clipped). An optimizer keeps one state tensor per
//! parameter, allocated on the first `step` and matched by position after
//! that, so it stays bound to the estimator it was first stepped with.

pub mod gradient_clipper;

use ndarray::{ArrayD, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{DqnError, Result};
use crate::estimator::Parameter;

pub use gradient_clipper::GradientClipper;

pub trait Optimizer {
    /// Apply one update to every parameter using its current gradient.
    fn step(&mut self, parameters: &mut [Parameter<'_>]) -> Result<()>;

    fn learning_rate(&self) -> f32;
}

/// Which update rule a training run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizerKind {
    Sgd,
    Adam,
    RmsProp,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
    RMSProp(RMSProp),
}

impl OptimizerWrapper {
    /// Build the optimizer named by `kind`. `alpha` is RMSProp's smoothing
    /// constant and `epsilon` the denominator guard of RMSProp and Adam.
    pub fn from_kind(kind: OptimizerKind, learning_rate: f32, alpha: f32, epsilon: f32) -> Self {
        match kind {
            OptimizerKind::Sgd => OptimizerWrapper::SGD(SGD::new(learning_rate)),
            OptimizerKind::Adam => {
                OptimizerWrapper::Adam(Adam::new(learning_rate, 0.9, 0.999, epsilon))
            }
            OptimizerKind::RmsProp => {
                OptimizerWrapper::RMSProp(RMSProp::new(learning_rate, alpha, epsilon))
            }
        }
    }
}

impl Optimizer for OptimizerWrapper {
    fn step(&mut self, parameters: &mut [Parameter<'_>]) -> Result<()> {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.step(parameters),
            OptimizerWrapper::Adam(optimizer) => optimizer.step(parameters),
            OptimizerWrapper::RMSProp(optimizer) => optimizer.step(parameters),
        }
    }

    fn learning_rate(&self) -> f32 {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.learning_rate(),
            OptimizerWrapper::Adam(optimizer) => optimizer.learning_rate(),
            OptimizerWrapper::RMSProp(optimizer) => optimizer.learning_rate(),
        }
    }
}

/// Allocate zeroed state on first use, then insist the parameter layout never changes.
fn ensure_state(state: &mut Vec<ArrayD<f32>>, parameters: &[Parameter<'_>]) -> Result<()> {
    if state.is_empty() {
        *state = parameters.iter().map(|p| ArrayD::zeros(p.value.raw_dim())).collect();
        return Ok(());
    }
    if state.len() != parameters.len() {
        return Err(DqnError::dimension_mismatch(
            format!("{} parameters", state.len()),
            format!("{} parameters", parameters.len()),
        ));
    }
    for (s, p) in state.iter().zip(parameters) {
        if s.shape() != p.value.shape() {
            return Err(DqnError::dimension_mismatch(
                format!("{:?}", s.shape()),
                format!("{:?}", p.value.shape()),
            ));
        }
    }
    Ok(())
}

/// Plain gradient descent
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SGD {
    pub learning_rate: f32,
}

impl SGD {
    pub fn new(learning_rate: f32) -> SGD {
        SGD { learning_rate }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, parameters: &mut [Parameter<'_>]) -> Result<()> {
        let lr = self.learning_rate;
        for param in parameters.iter_mut() {
            param.value.zip_mut_with(&param.grad, |w, &g| *w -= lr * g);
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m: Vec<ArrayD<f32>>,
    v: Vec<ArrayD<f32>>,
    pub t: i32,
}

impl Adam {
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: Vec::new(),
            v: Vec::new(),
            t: 0,
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, parameters: &mut [Parameter<'_>]) -> Result<()> {
        ensure_state(&mut self.m, parameters)?;
        ensure_state(&mut self.v, parameters)?;
        self.t += 1;

        let (lr, beta1, beta2, eps) = (self.learning_rate, self.beta1, self.beta2, self.epsilon);
        let bias_correction1 = 1.0 - beta1.powi(self.t);
        let bias_correction2 = 1.0 - beta2.powi(self.t);

        for ((param, m), v) in parameters.iter_mut().zip(self.m.iter_mut()).zip(self.v.iter_mut()) {
            Zip::from(&mut param.value)
                .and(&param.grad)
                .and(m)
                .and(v)
                .for_each(|w, &g, m, v| {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    let m_hat = *m / bias_correction1;
                    let v_hat = *v / bias_correction2;
                    *w -= lr * m_hat / (v_hat.sqrt() + eps);
                });
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

/// RMSProp optimizer
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RMSProp {
    pub learning_rate: f32,
    /// Smoothing constant of the squared-gradient average
    pub alpha: f32,
    pub epsilon: f32,
    square_avg: Vec<ArrayD<f32>>,
}

impl RMSProp {
    pub fn new(learning_rate: f32, alpha: f32, epsilon: f32) -> Self {
        RMSProp {
            learning_rate,
            alpha,
            epsilon,
            square_avg: Vec::new(),
        }
    }
}

impl Optimizer for RMSProp {
    fn step(&mut self, parameters: &mut [Parameter<'_>]) -> Result<()> {
        ensure_state(&mut self.square_avg, parameters)?;

        let (lr, alpha, eps) = (self.learning_rate, self.alpha, self.epsilon);
        for (param, square_avg) in parameters.iter_mut().zip(self.square_avg.iter_mut()) {
            Zip::from(&mut param.value)
                .and(&param.grad)
                .and(square_avg)
                .for_each(|w, &g, s| {
                    *s = alpha * *s + (1.0 - alpha) * g * g;
                    *w -= lr * g / (s.sqrt() + eps);
                });
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}
