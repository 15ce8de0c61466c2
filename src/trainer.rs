//! # Training Loop
//!
//! [`Trainer`] drives an [`Environment`] episode by episode, fills the
//! replay memory, runs the optimisation step on a fixed cadence, keeps the
//! target estimator in sync and reports progress.
//!
//! A run moves through four phases:
//!
//! ```text
//! Warmup --(enough steps and transitions)--> Learning --+--> Solved
//!                                                       +--> Exhausted
//! ```
//!
//! `Solved` is entered once the moving average of the episode rewards
//! reaches `SOLVED_REWARD`; `Exhausted` once `NUM_EPISODES` episodes have
//! been played. Both stop the loop and persist the final estimator.

use std::time::{Duration, Instant};

use ndarray::{Array1, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::TrainingConfig;
use crate::environment::{Environment, Frame};
use crate::error::{DqnError, Result};
use crate::estimator::Estimator;
use crate::exploration::{greedy_action, sample_action};
use crate::learner::{optimize_model, LearnerConfig};
use crate::metrics::EpisodeStatistics;
use crate::network::NeuralNetwork;
use crate::optimizer::{GradientClipper, OptimizerWrapper};
use crate::persistence::ModelStore;
use crate::replay_buffer::{ReplayMemory, Transition};
use crate::visualization::{EpisodeReport, Visualizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingPhase {
    /// Collecting transitions, no learning yet
    Warmup,
    /// Periodic optimisation and target synchronisation
    Learning,
    Solved,
    Exhausted,
}

impl TrainingPhase {
    pub fn is_finished(&self) -> bool {
        matches!(self, TrainingPhase::Solved | TrainingPhase::Exhausted)
    }
}

/// Process-wide counters of a training run and the cadence checks derived
/// from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    /// Environment steps over all episodes
    pub total_steps_taken: u64,
    /// Index of the episode being played; between episodes, the next one to play
    pub episode_index: usize,
    pub phase: TrainingPhase,
}

impl Default for TrainingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingSession {
    pub fn new() -> Self {
        TrainingSession {
            total_steps_taken: 0,
            episode_index: 0,
            phase: TrainingPhase::Warmup,
        }
    }

    /// Past the observation period with at least one full batch stored.
    pub fn learning_enabled(&self, memory_len: usize, config: &TrainingConfig) -> bool {
        self.total_steps_taken > config.initial_observation_period
            && memory_len >= config.batch_size
    }

    /// Whether an optimisation step is due after the current step.
    pub fn should_optimize(&self, memory_len: usize, config: &TrainingConfig) -> bool {
        self.learning_enabled(memory_len, config)
            && self.total_steps_taken % config.learning_frequency == 0
    }

    pub fn should_sync_target(&self, config: &TrainingConfig) -> bool {
        config.double_dqn && self.total_steps_taken % config.sync_target_model_frequency == 0
    }

    /// Checkpoint cadence, evaluated once at the end of each episode.
    pub fn should_checkpoint(&self, config: &TrainingConfig) -> bool {
        self.episode_index % config.save_model_interval == 0
    }
}

/// Totals of one played episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    pub reward: f32,
    pub length: usize,
    /// Ended by the environment rather than by the step cap
    pub terminated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub phase: TrainingPhase,
    pub episodes_completed: usize,
    pub total_steps_taken: u64,
    pub optimization_steps: u64,
    pub target_syncs: u64,
    pub final_reward_average: f32,
    pub elapsed: Duration,
}

/// Owns every piece of mutable training state.
pub struct Trainer<N: Estimator> {
    online: N,
    target: N,
    optimizer: OptimizerWrapper,
    clipper: GradientClipper,
    learner_config: LearnerConfig,
    memory: ReplayMemory,
    statistics: EpisodeStatistics,
    session: TrainingSession,
    rng: StdRng,
    config: TrainingConfig,
    visualizer: Box<dyn Visualizer>,
    model_store: Box<dyn ModelStore>,
    optimization_steps: u64,
    target_syncs: u64,
}

impl<N: Estimator> Trainer<N> {
    /// Build a trainer around an online and a target estimator of the same
    /// architecture.
    ///
    /// The configuration is validated, the previous model is restored when
    /// `LOAD_PREVIOUS_MODEL_IF_AVAILABLE` is set and one exists, and the
    /// target is made an exact copy of the online estimator.
    pub fn new(
        mut online: N,
        mut target: N,
        config: TrainingConfig,
        visualizer: Box<dyn Visualizer>,
        model_store: Box<dyn ModelStore>,
    ) -> Result<Self> {
        config.validate()?;

        if config.load_previous_model_if_available {
            match model_store.load_model(&config) {
                Ok(state) => {
                    online.load_state_dict(&state)?;
                    info!(parameters = state.num_parameters(), "restored previous model");
                }
                Err(DqnError::ModelNotFound(location)) => {
                    info!(location = %location.display(), "no previous model, starting fresh");
                }
                Err(e) => return Err(e),
            }
        }
        target.sync_from(&online)?;

        Ok(Trainer {
            optimizer: config.build_optimizer(),
            clipper: config.gradient_clipper(),
            learner_config: config.learner_config(),
            memory: ReplayMemory::new(config.replay_memory_size),
            statistics: EpisodeStatistics::new(config.moving_average_window),
            session: TrainingSession::new(),
            rng: StdRng::seed_from_u64(config.random_seed),
            online,
            target,
            config,
            visualizer,
            model_store,
            optimization_steps: 0,
            target_syncs: 0,
        })
    }

    pub fn online(&self) -> &N {
        &self.online
    }

    pub fn target(&self) -> &N {
        &self.target
    }

    pub fn into_online(self) -> N {
        self.online
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn statistics(&self) -> &EpisodeStatistics {
        &self.statistics
    }

    pub fn session(&self) -> &TrainingSession {
        &self.session
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn optimization_steps(&self) -> u64 {
        self.optimization_steps
    }

    pub fn target_syncs(&self) -> u64 {
        self.target_syncs
    }

    /// Play episodes until the task is solved or the episode budget is
    /// spent, then persist the online estimator and close `env`.
    ///
    /// A trainer that already reached `Solved` or `Exhausted` plays nothing
    /// and returns a summary with zero episodes.
    ///
    /// Environment, estimator and final-save errors end the run. Failures
    /// of the visualiser and of periodic checkpoints are logged and ignored.
    pub fn train<V: Environment + ?Sized>(&mut self, env: &mut V) -> Result<TrainingSummary> {
        if self.session.phase.is_finished() {
            warn!(phase = ?self.session.phase, "training already finished, nothing to do");
            return Ok(self.summary(0, Duration::ZERO));
        }
        if env.observation_size() != self.online.input_size() {
            return Err(DqnError::dimension_mismatch(
                format!("observations of length {}", self.online.input_size()),
                format!("observations of length {}", env.observation_size()),
            ));
        }
        if env.action_count() != self.online.num_actions() {
            return Err(DqnError::dimension_mismatch(
                format!("{} actions", self.online.num_actions()),
                format!("{} actions", env.action_count()),
            ));
        }

        let started = Instant::now();
        env.seed(self.config.random_seed);
        info!(
            environment = %self.config.gym_environment,
            episodes = self.config.num_episodes,
            double_dqn = self.config.double_dqn,
            "training started"
        );

        let mut episodes_completed = 0;
        for episode in self.session.episode_index..self.config.num_episodes {
            self.session.episode_index = episode;
            info!(
                "Episode {}/{} | Total steps taken {}",
                episode,
                self.config.num_episodes - 1,
                self.session.total_steps_taken
            );

            let (outcome, episode_loss) = self.run_episode(env)?;
            episodes_completed += 1;
            self.finish_episode(env, &outcome, episode_loss);
            self.session.episode_index = episode + 1;

            let reward_average = self
                .statistics
                .rewards
                .moving_average(self.config.moving_average_window);
            if reward_average >= self.config.solved_reward {
                info!(episode, reward_average, "solved");
                self.session.phase = TrainingPhase::Solved;
                break;
            }
        }
        if !self.session.phase.is_finished() {
            self.session.phase = TrainingPhase::Exhausted;
        }

        let path = self.model_store.save_model(&self.online.state_dict(), &self.config)?;
        if let Err(e) = env.close() {
            warn!(error = %e, "failed to close environment");
        }
        let elapsed = started.elapsed();
        info!(
            phase = ?self.session.phase,
            model = %path.display(),
            "Training done, time elapsed: {}m {}s",
            elapsed.as_secs() / 60,
            elapsed.as_secs() % 60
        );

        Ok(self.summary(episodes_completed, elapsed))
    }

    fn summary(&self, episodes_completed: usize, elapsed: Duration) -> TrainingSummary {
        TrainingSummary {
            phase: self.session.phase,
            episodes_completed,
            total_steps_taken: self.session.total_steps_taken,
            optimization_steps: self.optimization_steps,
            target_syncs: self.target_syncs,
            final_reward_average: self
                .statistics
                .rewards
                .moving_average(self.config.moving_average_window),
            elapsed,
        }
    }

    fn run_episode<V: Environment + ?Sized>(
        &mut self,
        env: &mut V,
    ) -> Result<(EpisodeOutcome, f32)> {
        let mut state = env.reset()?;
        let mut episode_reward = 0.0;
        let mut episode_loss = 0.0;
        let mut length = 0;

        loop {
            if self.config.render_environment {
                if let Err(e) = env.render() {
                    warn!(error = %e, "render failed");
                }
            }

            let action = sample_action(
                &self.online,
                state.view(),
                &self.config.exploration,
                self.online.num_actions(),
                self.session.total_steps_taken,
                &mut self.rng,
            )?;
            let step = env.step(action)?;
            let reward = if self.config.clip_reward {
                step.reward.clamp(-1.0, 1.0)
            } else {
                step.reward
            };
            length += 1;
            let step_cap = self.config.max_steps_per_episode;
            let truncated = !step.terminated && step_cap > 0 && length >= step_cap;

            let next_state = if step.terminated { None } else { Some(step.observation) };
            self.memory.push(Transition::new(state, action, reward, next_state.clone()));
            self.session.total_steps_taken += 1;

            let loss = self.learn()?;
            episode_reward += reward;
            episode_loss += loss;

            if self.session.should_sync_target(&self.config) {
                self.target.sync_from(&self.online)?;
                self.target_syncs += 1;
                info!(
                    total_steps = self.session.total_steps_taken,
                    "*** Target model synchronised ***"
                );
            }

            debug!(
                frame = length,
                action,
                reward,
                loss,
                epsilon = self.config.exploration.epsilon(self.session.total_steps_taken),
                "step"
            );

            match next_state {
                Some(next) if !truncated => state = next,
                _ => {
                    let outcome = EpisodeOutcome {
                        reward: episode_reward,
                        length,
                        terminated: step.terminated,
                    };
                    return Ok((outcome, episode_loss));
                }
            }
        }
    }

    /// Run an optimisation step if one is due and return its loss.
    fn learn(&mut self) -> Result<f32> {
        if self.session.phase == TrainingPhase::Warmup
            && self.session.learning_enabled(self.memory.len(), &self.config)
        {
            info!(total_steps = self.session.total_steps_taken, "warm-up finished, learning");
            self.session.phase = TrainingPhase::Learning;
        }
        if !self.session.should_optimize(self.memory.len(), &self.config) {
            return Ok(0.0);
        }

        let batch = self.memory.sample(self.config.batch_size, &mut self.rng)?;
        if !batch.iter().any(|t| t.is_non_terminal()) {
            warn!(
                batch_size = batch.len(),
                "sampled batch has no non-terminal transition, skipping update"
            );
            return Ok(0.0);
        }

        let loss = optimize_model(
            &mut self.online,
            &self.target,
            &mut self.optimizer,
            &self.clipper,
            &batch,
            &self.learner_config,
        )?;
        self.optimization_steps += 1;
        Ok(loss)
    }

    fn finish_episode<V: Environment + ?Sized>(
        &mut self,
        env: &mut V,
        outcome: &EpisodeOutcome,
        episode_loss: f32,
    ) {
        let window = self.config.moving_average_window;
        self.statistics.record(episode_loss, outcome.reward, outcome.length);
        let averages = self.statistics.summary(window);

        let frame: Option<Frame> = if self.config.render_episode_end {
            env.render().unwrap_or_else(|e| {
                warn!(error = %e, "end of episode render failed");
                None
            })
        } else {
            None
        };

        let length = outcome.length.max(1) as f32;
        let report = EpisodeReport {
            episode: self.session.episode_index,
            loss: episode_loss / length,
            moving_loss: averages.loss,
            reward: outcome.reward / length,
            moving_reward: averages.reward,
            length: outcome.length,
            moving_length: averages.length,
            frame,
        };
        if let Err(e) = self.visualizer.update(&report) {
            warn!(error = %e, episode = report.episode, "visualiser update failed");
        }

        if self.session.should_checkpoint(&self.config) {
            match self.model_store.save_model(&self.online.state_dict(), &self.config) {
                Ok(path) => debug!(path = %path.display(), "checkpoint saved"),
                Err(e) => warn!(error = %e, "checkpoint failed"),
            }
        }

        info!(
            episode = self.session.episode_index,
            length = outcome.length,
            reward = outcome.reward,
            terminated = outcome.terminated,
            moving_reward = averages.reward,
            moving_length = averages.length,
            moving_loss = averages.loss,
            "episode finished"
        );
    }
}

impl Trainer<NeuralNetwork> {
    /// Trainer with a freshly initialised MLP sized for `env`, seeded from
    /// `RANDOM_SEED`.
    pub fn for_environment<V: Environment + ?Sized>(
        env: &V,
        config: TrainingConfig,
        visualizer: Box<dyn Visualizer>,
        model_store: Box<dyn ModelStore>,
    ) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.random_seed);
        let online = NeuralNetwork::mlp(
            env.observation_size(),
            &config.hidden_layers,
            env.action_count(),
            &mut rng,
        )?;
        let target = online.clone();
        Self::new(online, target, config, visualizer, model_store)
    }
}

/// Play `episodes` greedy episodes without learning or exploration.
///
/// `max_steps` caps every episode; `0` means unlimited. The environment is
/// left open.
pub fn evaluate<E, V>(
    estimator: &E,
    env: &mut V,
    episodes: usize,
    max_steps: usize,
) -> Result<Vec<EpisodeOutcome>>
where
    E: Estimator + ?Sized,
    V: Environment + ?Sized,
{
    let mut outcomes = Vec::with_capacity(episodes);
    for _ in 0..episodes {
        let mut state: Array1<f32> = env.reset()?;
        let mut reward = 0.0;
        let mut length = 0;
        let terminated = loop {
            let values = estimator.predict(state.view().insert_axis(Axis(0)))?;
            let action = greedy_action(values.row(0))?;
            let step = env.step(action)?;
            reward += step.reward;
            length += 1;
            if step.terminated {
                break true;
            }
            if max_steps > 0 && length >= max_steps {
                break false;
            }
            state = step.observation;
        };
        outcomes.push(EpisodeOutcome {
            reward,
            length,
            terminated,
        });
    }
    Ok(outcomes)
}
