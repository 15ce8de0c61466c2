//! # deepq - Deep Q-Network Training Engine
//!
//! `deepq` trains a value-based agent (DQN, optionally Double DQN) against
//! an episodic, discrete-action environment using experience replay and a
//! periodically synchronised target estimator.
//!
//! ## Key Features
//!
//! - **Replay memory**: fixed-capacity ring buffer with uniform sampling without replacement
//! - **Exploration**: epsilon-greedy action selection with decaying epsilon schedules
//! - **Optimisation step**: terminal masking, optional Double DQN target, Huber loss and
//!   gradient clipping
//! - **Training loop**: warm-up, learning cadence, target sync, checkpoints and solved detection
//! - **Pluggable collaborators**: environments, estimators, visualisers and model stores are traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deepq::config::TrainingConfig;
//! use deepq::persistence::FileModelStore;
//! use deepq::trainer::Trainer;
//! use deepq::visualization::LogVisualizer;
//! # use deepq::environment::{Environment, StepOutcome};
//! # use ndarray::{array, Array1};
//! # struct CartPole;
//! # impl Environment for CartPole {
//! #     fn observation_size(&self) -> usize { 4 }
//! #     fn action_count(&self) -> usize { 2 }
//! #     fn reset(&mut self) -> deepq::Result<Array1<f32>> { Ok(array![0.0, 0.0, 0.0, 0.0]) }
//! #     fn step(&mut self, _action: usize) -> deepq::Result<StepOutcome> {
//! #         Ok(StepOutcome::new(array![0.0, 0.0, 0.0, 0.0], 1.0, true))
//! #     }
//! # }
//!
//! deepq::logging::init_tracing("deepq=info")?;
//!
//! let config = TrainingConfig::from_json_file("cartpole.json")?;
//! let mut env = CartPole;
//! let mut trainer = Trainer::for_environment(
//!     &env,
//!     config,
//!     Box::new(LogVisualizer::new("cartpole")),
//!     Box::new(FileModelStore::new()),
//! )?;
//!
//! let summary = trainer.train(&mut env)?;
//! println!("{:?} after {} episodes", summary.phase, summary.episodes_completed);
//! # Ok::<(), deepq::DqnError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions used by the estimator
//! - [`config`] - Typed training configuration
//! - [`environment`] - Environment interface
//! - [`error`] - Error types and result handling
//! - [`estimator`] - Value-function estimator interface
//! - [`exploration`] - Epsilon schedules and action selection
//! - [`layers`] - Dense layer and weight initialisation
//! - [`learner`] - The optimisation step
//! - [`logging`] - Tracing subscriber setup
//! - [`loss`] - Huber loss
//! - [`metrics`] - Windowed episode statistics
//! - [`network`] - Multi-layer perceptron estimator
//! - [`optimizer`] - Optimizers and gradient clipping
//! - [`persistence`] - Model checkpoints
//! - [`replay_buffer`] - Transitions and replay memory
//! - [`trainer`] - The training loop
//! - [`visualization`] - Per-episode report sinks

pub mod activations;
pub mod config;
pub mod environment;
pub mod error;
pub mod estimator;
pub mod exploration;
pub mod layers;
pub mod learner;
pub mod logging;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod persistence;
pub mod replay_buffer;
pub mod trainer;
pub mod visualization;

pub use config::TrainingConfig;
pub use environment::{Environment, StepOutcome};
pub use error::{DqnError, Result};
pub use estimator::{Estimator, StateDict};
pub use network::NeuralNetwork;
pub use replay_buffer::{ReplayMemory, Transition};
pub use trainer::{Trainer, TrainingPhase, TrainingSummary};

#[cfg(test)]
mod tests;
