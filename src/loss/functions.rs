use ndarray::{Array1, ArrayView1};

use crate::error::{DqnError, Result};

/// Huber loss (smooth L1)
///
/// Quadratic for residuals within `delta`, linear beyond it. With
/// `delta = 1` this is PyTorch's `smooth_l1_loss`. The loss is averaged
/// over the batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HuberLoss {
    pub delta: f32,
}

impl HuberLoss {
    pub fn new(delta: f32) -> Self {
        HuberLoss { delta }
    }

    fn check(predictions: &ArrayView1<f32>, targets: &ArrayView1<f32>) -> Result<()> {
        if predictions.len() != targets.len() {
            return Err(DqnError::dimension_mismatch(
                predictions.len().to_string(),
                targets.len().to_string(),
            ));
        }
        if predictions.is_empty() {
            return Err(DqnError::EmptyBatch);
        }
        Ok(())
    }

    /// Mean Huber loss between `predictions` and `targets`.
    pub fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Result<f32> {
        Self::check(&predictions, &targets)?;
        let delta = self.delta;
        let total: f32 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(&p, &t)| {
                let abs_x = (p - t).abs();
                if abs_x <= delta {
                    0.5 * abs_x * abs_x
                } else {
                    delta * abs_x - 0.5 * delta * delta
                }
            })
            .sum();
        Ok(total / predictions.len() as f32)
    }

    /// d(mean loss) / d(prediction) for every element.
    pub fn gradient(
        &self,
        predictions: ArrayView1<f32>,
        targets: ArrayView1<f32>,
    ) -> Result<Array1<f32>> {
        Self::check(&predictions, &targets)?;
        let delta = self.delta;
        let batch_size = predictions.len() as f32;
        let diff = &predictions - &targets;
        Ok(diff.mapv(|x| if x.abs() <= delta { x } else { delta * x.signum() }) / batch_size)
    }
}

impl Default for HuberLoss {
    fn default() -> Self {
        Self::new(1.0)
    }
}
