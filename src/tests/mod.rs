// Test modules for all components
pub mod test_activations;
pub mod test_exploration;
pub mod test_layers;
pub mod test_metrics;
pub mod test_replay_buffer;
