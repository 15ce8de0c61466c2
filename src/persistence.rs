//! # Model Persistence
//!
//! Checkpoints are [`StateDict`]s serialised with `bincode`. The file store
//! names each checkpoint `<CONFIG_NAME>-<unix millis>.model` inside
//! `MODEL_DIRECTORY` and treats the most recently modified `.model` file as
//! "the previous model".

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::config::TrainingConfig;
use crate::error::{DqnError, Result};
use crate::estimator::StateDict;

pub const MODEL_EXTENSION: &str = "model";

pub trait ModelStore {
    /// Persist `state` and return where it was written.
    fn save_model(&mut self, state: &StateDict, config: &TrainingConfig) -> Result<PathBuf>;

    /// Load the most recent model for `config`.
    fn load_model(&self, config: &TrainingConfig) -> Result<StateDict>;
}

/// Stores checkpoints as files under `MODEL_DIRECTORY`.
#[derive(Debug, Clone, Default)]
pub struct FileModelStore;

impl FileModelStore {
    pub fn new() -> Self {
        FileModelStore
    }

    /// Most recently modified `*.model` file in `directory`, if any.
    pub fn latest_model_path(directory: &Path) -> Result<Option<PathBuf>> {
        if !directory.is_dir() {
            return Ok(None);
        }

        let mut latest: Option<(SystemTime, PathBuf)> = None;
        for entry in fs::read_dir(directory)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MODEL_EXTENSION) {
                continue;
            }
            let modified = fs::metadata(&path)?.modified()?;
            // File names carry a millisecond timestamp, so they break mtime ties.
            let newer = match &latest {
                Some((time, best)) => modified > *time || (modified == *time && path > *best),
                None => true,
            };
            if newer {
                latest = Some((modified, path));
            }
        }
        Ok(latest.map(|(_, path)| path))
    }

    pub fn read_state_dict(path: &Path) -> Result<StateDict> {
        let data = fs::read(path)?;
        Ok(bincode::deserialize(&data)?)
    }

    pub fn write_state_dict(state: &StateDict, path: &Path) -> Result<()> {
        let serialized = bincode::serialize(state)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    fn checkpoint_path(config: &TrainingConfig) -> Result<PathBuf> {
        let mut millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| DqnError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
            .as_millis();

        // Bump the stamp on collision so names keep sorting in save order.
        loop {
            let path = config
                .model_directory
                .join(format!("{}-{}.{}", config.config_name, millis, MODEL_EXTENSION));
            if !path.exists() {
                return Ok(path);
            }
            millis += 1;
        }
    }
}

impl ModelStore for FileModelStore {
    fn save_model(&mut self, state: &StateDict, config: &TrainingConfig) -> Result<PathBuf> {
        fs::create_dir_all(&config.model_directory)?;
        let path = Self::checkpoint_path(config)?;
        Self::write_state_dict(state, &path)?;
        debug!(path = %path.display(), parameters = state.num_parameters(), "model saved");
        Ok(path)
    }

    fn load_model(&self, config: &TrainingConfig) -> Result<StateDict> {
        let path = Self::latest_model_path(&config.model_directory)?
            .ok_or_else(|| DqnError::ModelNotFound(config.model_directory.clone()))?;
        debug!(path = %path.display(), "loading model");
        Self::read_state_dict(&path)
    }
}

/// Keeps every saved model in memory. Handy for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryModelStore {
    pub saved: Vec<StateDict>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStore for MemoryModelStore {
    fn save_model(&mut self, state: &StateDict, config: &TrainingConfig) -> Result<PathBuf> {
        self.saved.push(state.clone());
        Ok(PathBuf::from(format!("memory://{}/{}", config.config_name, self.saved.len())))
    }

    fn load_model(&self, config: &TrainingConfig) -> Result<StateDict> {
        self.saved
            .last()
            .cloned()
            .ok_or_else(|| {
                DqnError::ModelNotFound(PathBuf::from(format!("memory://{}", config.config_name)))
            })
    }
}
