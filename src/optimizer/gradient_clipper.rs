use crate::estimator::Parameter;

/// Gradient clipping methods, applied between the backward pass and the optimizer step
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientClipper {
    /// Clamp every gradient element into `[min, max]`
    ClipByValue { min: f32, max: f32 },

    /// Rescale all gradients together when their joint L2 norm exceeds `max_norm`
    ClipByGlobalNorm { max_norm: f32 },

    /// No clipping
    None,
}

impl GradientClipper {
    /// Element-wise clamp into `[-bound, bound]`.
    pub fn symmetric(bound: f32) -> Self {
        GradientClipper::ClipByValue { min: -bound, max: bound }
    }

    /// Clip the gradient of every parameter in place.
    pub fn clip(&self, parameters: &mut [Parameter<'_>]) {
        match *self {
            GradientClipper::ClipByValue { min, max } => {
                for param in parameters.iter_mut() {
                    param.grad.mapv_inplace(|g| g.max(min).min(max));
                }
            }

            GradientClipper::ClipByGlobalNorm { max_norm } => {
                let global_norm = Self::global_norm(parameters);
                if global_norm > max_norm {
                    let scale = max_norm / global_norm;
                    for param in parameters.iter_mut() {
                        param.grad.mapv_inplace(|g| g * scale);
                    }
                }
            }

            GradientClipper::None => {}
        }
    }

    /// Compute global norm of all gradients
    pub fn global_norm(parameters: &[Parameter<'_>]) -> f32 {
        parameters
            .iter()
            .map(|p| p.grad.iter().map(|&x| x * x).sum::<f32>())
            .sum::<f32>()
            .sqrt()
    }
}

impl Default for GradientClipper {
    fn default() -> Self {
        Self::symmetric(1.0)
    }
}
