//! # Configuration
//!
//! Every option the training engine recognises, with its type and default.
//! Configuration files are JSON objects keyed by the upper-case option
//! names, e.g.
//!
//! ```json
//! {
//!   "GYM_ENVIRONMENT": "CartPole-v0",
//!   "BATCH_SIZE": 64,
//!   "DOUBLE_DQN": true,
//!   "EXPLORATION": { "KIND": "LINEAR", "START": 1.0, "END": 0.05, "STEPS": 20000 }
//! }
//! ```
//!
//! Omitted options keep their defaults, unknown options are rejected, and
//! [`TrainingConfig::validate`] is run once before training starts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DqnError, Result};
use crate::exploration::EpsilonSchedule;
use crate::learner::LearnerConfig;
use crate::optimizer::{GradientClipper, OptimizerKind, OptimizerWrapper};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// Name used to label checkpoints and visualisation output
    pub config_name: String,
    /// Identifier of the environment being trained on
    pub gym_environment: String,
    pub num_episodes: usize,
    pub batch_size: usize,
    pub replay_memory_size: usize,
    pub learning_rate: f32,
    pub optimizer: OptimizerKind,
    /// RMSProp smoothing constant
    pub optimizer_alpha: f32,
    /// Denominator guard for RMSProp and Adam
    pub optimizer_epsilon: f32,
    pub discount_factor: f32,
    /// Bootstrap next-state values from the target estimator and keep it in sync
    pub double_dqn: bool,
    /// Steps collected before the first optimisation step
    pub initial_observation_period: u64,
    /// Steps between optimisation steps
    pub learning_frequency: u64,
    /// Steps between target estimator synchronisations
    pub sync_target_model_frequency: u64,
    /// Clamp rewards into `[-1, 1]` before storing them
    pub clip_reward: bool,
    /// Reward moving average at which the task counts as solved
    pub solved_reward: f32,
    pub moving_average_window: usize,
    /// Episodes between checkpoints
    pub save_model_interval: usize,
    pub random_seed: u64,
    pub exploration: EpsilonSchedule,
    /// Element-wise gradient bound; `0` disables clipping
    pub gradient_clip: f32,
    pub hidden_layers: Vec<usize>,
    /// Frame cap per episode; `0` means unlimited
    pub max_steps_per_episode: usize,
    /// Render every frame while training
    pub render_environment: bool,
    /// Attach a rendered frame to each episode report
    pub render_episode_end: bool,
    pub model_directory: PathBuf,
    pub load_previous_model_if_available: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            config_name: "dqn".to_string(),
            gym_environment: "CartPole-v0".to_string(),
            num_episodes: 4000,
            batch_size: 32,
            replay_memory_size: 10_000,
            learning_rate: 0.00025,
            optimizer: OptimizerKind::RmsProp,
            optimizer_alpha: 0.95,
            optimizer_epsilon: 0.01,
            discount_factor: 0.99,
            double_dqn: true,
            initial_observation_period: 1000,
            learning_frequency: 4,
            sync_target_model_frequency: 1000,
            clip_reward: false,
            solved_reward: 195.0,
            moving_average_window: 100,
            save_model_interval: 100,
            random_seed: 6,
            exploration: EpsilonSchedule::default(),
            gradient_clip: 1.0,
            hidden_layers: vec![64, 64],
            max_steps_per_episode: 0,
            render_environment: false,
            render_episode_end: false,
            model_directory: PathBuf::from("models"),
            load_previous_model_if_available: false,
        }
    }
}

fn positive<T: PartialOrd + Default + std::fmt::Display>(name: &str, value: T) -> Result<()> {
    if value > T::default() {
        Ok(())
    } else {
        let reason = format!("must be positive, got {}", value);
        Err(DqnError::invalid_parameter(name.to_string(), reason))
    }
}

impl TrainingConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the training loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        positive("NUM_EPISODES", self.num_episodes)?;
        positive("BATCH_SIZE", self.batch_size)?;
        positive("REPLAY_MEMORY_SIZE", self.replay_memory_size)?;
        positive("LEARNING_FREQUENCY", self.learning_frequency)?;
        positive("SYNC_TARGET_MODEL_FREQUENCY", self.sync_target_model_frequency)?;
        positive("MOVING_AVERAGE_WINDOW", self.moving_average_window)?;
        positive("SAVE_MODEL_INTERVAL", self.save_model_interval)?;

        if self.batch_size > self.replay_memory_size {
            return Err(DqnError::invalid_parameter(
                "BATCH_SIZE".to_string(),
                format!(
                    "batch of {} can never be drawn from a replay memory of {}",
                    self.batch_size, self.replay_memory_size
                ),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(DqnError::invalid_parameter(
                "LEARNING_RATE".to_string(),
                format!("must be a positive finite number, got {}", self.learning_rate),
            ));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(DqnError::invalid_parameter(
                "DISCOUNT_FACTOR".to_string(),
                format!("must lie in [0, 1], got {}", self.discount_factor),
            ));
        }
        if !(0.0..1.0).contains(&self.optimizer_alpha) {
            return Err(DqnError::invalid_parameter(
                "OPTIMIZER_ALPHA".to_string(),
                format!("must lie in [0, 1), got {}", self.optimizer_alpha),
            ));
        }
        if !(self.optimizer_epsilon.is_finite() && self.optimizer_epsilon > 0.0) {
            return Err(DqnError::invalid_parameter(
                "OPTIMIZER_EPSILON".to_string(),
                format!("must be a positive finite number, got {}", self.optimizer_epsilon),
            ));
        }
        if !(self.gradient_clip.is_finite() && self.gradient_clip >= 0.0) {
            return Err(DqnError::invalid_parameter(
                "GRADIENT_CLIP".to_string(),
                format!("must be a non-negative finite number, got {}", self.gradient_clip),
            ));
        }
        if self.solved_reward.is_nan() {
            return Err(DqnError::invalid_parameter("SOLVED_REWARD", "must not be NaN"));
        }
        if self.hidden_layers.iter().any(|&units| units == 0) {
            return Err(DqnError::invalid_parameter(
                "HIDDEN_LAYERS",
                "every hidden layer needs at least one unit",
            ));
        }
        self.exploration.validate()
    }

    pub fn learner_config(&self) -> LearnerConfig {
        LearnerConfig {
            discount_factor: self.discount_factor,
            double_dqn: self.double_dqn,
        }
    }

    pub fn build_optimizer(&self) -> OptimizerWrapper {
        OptimizerWrapper::from_kind(
            self.optimizer,
            self.learning_rate,
            self.optimizer_alpha,
            self.optimizer_epsilon,
        )
    }

    pub fn gradient_clipper(&self) -> GradientClipper {
        if self.gradient_clip > 0.0 {
            GradientClipper::symmetric(self.gradient_clip)
        } else {
            GradientClipper::None
        }
    }
}
