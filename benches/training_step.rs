//! Hot paths of a training run: replay sampling, one optimisation step and
//! a short CartPole training run.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use deepq::environment::{Environment, StepOutcome};
use deepq::learner::{optimize_model, LearnerConfig};
use deepq::optimizer::{GradientClipper, OptimizerKind, OptimizerWrapper};
use deepq::persistence::MemoryModelStore;
use deepq::visualization::NoopVisualizer;
use deepq::{NeuralNetwork, ReplayMemory, Trainer, TrainingConfig, Transition};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Simple CartPole environment
struct CartPole {
    x: f32,
    x_dot: f32,
    theta: f32,
    theta_dot: f32,
    steps: usize,
    rng: StdRng,
}

impl CartPole {
    fn new() -> Self {
        CartPole {
            x: 0.0,
            x_dot: 0.0,
            theta: 0.0,
            theta_dot: 0.0,
            steps: 0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    fn state(&self) -> Array1<f32> {
        Array1::from_vec(vec![self.x, self.x_dot, self.theta, self.theta_dot])
    }
}

impl Environment for CartPole {
    fn observation_size(&self) -> usize {
        4
    }

    fn action_count(&self) -> usize {
        2
    }

    fn reset(&mut self) -> deepq::Result<Array1<f32>> {
        self.x = self.rng.gen_range(-0.05..0.05);
        self.x_dot = self.rng.gen_range(-0.05..0.05);
        self.theta = self.rng.gen_range(-0.05..0.05);
        self.theta_dot = self.rng.gen_range(-0.05..0.05);
        self.steps = 0;
        Ok(self.state())
    }

    fn step(&mut self, action: usize) -> deepq::Result<StepOutcome> {
        let force = if action == 1 { 10.0 } else { -10.0 };
        let gravity = 9.8;
        let mass_pole = 0.1;
        let total_mass = 1.0 + mass_pole;
        let length = 0.5;
        let pole_mass_length = mass_pole * length;
        let dt = 0.02;

        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let temp = (force + pole_mass_length * self.theta_dot.powi(2) * sin_theta) / total_mass;
        let theta_acc = (gravity * sin_theta - cos_theta * temp)
            / (length * (4.0 / 3.0 - mass_pole * cos_theta.powi(2) / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        self.x += self.x_dot * dt;
        self.x_dot += x_acc * dt;
        self.theta += self.theta_dot * dt;
        self.theta_dot += theta_acc * dt;
        self.steps += 1;

        let terminated = self.x.abs() > 2.4 || self.theta.abs() > 0.209 || self.steps >= 200;
        Ok(StepOutcome::new(self.state(), 1.0, terminated))
    }

    fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

fn filled_memory(capacity: usize, rng: &mut StdRng) -> ReplayMemory {
    let mut memory = ReplayMemory::new(capacity);
    for i in 0..capacity {
        let state = Array1::from_shape_fn(4, |_| rng.gen_range(-1.0..1.0));
        let next_state = if i % 20 == 19 {
            None
        } else {
            Some(Array1::from_shape_fn(4, |_| rng.gen_range(-1.0..1.0)))
        };
        memory.push(Transition::new(state, rng.gen_range(0..2), 1.0, next_state));
    }
    memory
}

fn bench_replay_sample(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let memory = filled_memory(10_000, &mut rng);

    c.bench_function("replay_sample_32", |b| {
        b.iter(|| black_box(memory.sample(32, &mut rng).unwrap().len()))
    });
}

fn bench_optimize_model(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let memory = filled_memory(10_000, &mut rng);
    let mut online = NeuralNetwork::mlp(4, &[64, 64], 2, &mut rng).unwrap();
    let target = online.clone();
    let mut optimizer = OptimizerWrapper::from_kind(OptimizerKind::RmsProp, 0.00025, 0.95, 0.01);
    let clipper = GradientClipper::symmetric(1.0);
    let config = LearnerConfig {
        discount_factor: 0.99,
        double_dqn: true,
    };

    c.bench_function("optimize_model_batch_32", |b| {
        b.iter_batched(
            || memory.sample(32, &mut rng).unwrap(),
            |batch| {
                let loss =
                    optimize_model(&mut online, &target, &mut optimizer, &clipper, &batch, &config);
                black_box(loss.unwrap())
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_cartpole_training(c: &mut Criterion) {
    let config = TrainingConfig {
        num_episodes: 5,
        replay_memory_size: 1000,
        initial_observation_period: 32,
        learning_frequency: 1,
        sync_target_model_frequency: 100,
        solved_reward: f32::INFINITY,
        ..TrainingConfig::default()
    };

    let mut group = c.benchmark_group("cartpole");
    group.sample_size(10);
    group.bench_function("train_5_episodes", |b| {
        b.iter(|| {
            let mut env = CartPole::new();
            let mut trainer = Trainer::for_environment(
                &env,
                config.clone(),
                Box::new(NoopVisualizer),
                Box::new(MemoryModelStore::new()),
            )
            .unwrap();
            black_box(trainer.train(&mut env).unwrap())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_replay_sample, bench_optimize_model, bench_cartpole_training);
criterion_main!(benches);
