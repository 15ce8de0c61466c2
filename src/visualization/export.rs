use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{EpisodeReport, Visualizer};
use crate::error::{DqnError, Result};

const CSV_HEADER: &str = "episode,loss,moving_loss,reward,moving_reward,length,moving_length";

fn open_append(path: &Path) -> Result<(File, bool)> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let is_new = !path.exists() || std::fs::metadata(path)?.len() == 0;
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok((file, is_new))
}

/// Appends one CSV row per episode. The header is written once, when the
/// file is created.
#[derive(Debug)]
pub struct CsvVisualizer {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CsvVisualizer {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (file, is_new) = open_append(&path)?;
        let mut writer = BufWriter::new(file);
        if is_new {
            writeln!(writer, "{}", CSV_HEADER)?;
            writer.flush()?;
        }
        Ok(CsvVisualizer { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Visualizer for CsvVisualizer {
    fn update(&mut self, report: &EpisodeReport) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{}",
            report.episode,
            report.loss,
            report.moving_loss,
            report.reward,
            report.moving_reward,
            report.length,
            report.moving_length
        )
        .and_then(|_| self.writer.flush())
        .map_err(|e| DqnError::Visualization(format!("{}: {}", self.path.display(), e)))
    }
}

/// Appends each report as one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesVisualizer {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonLinesVisualizer {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (file, _) = open_append(&path)?;
        Ok(JsonLinesVisualizer {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Visualizer for JsonLinesVisualizer {
    fn update(&mut self, report: &EpisodeReport) -> Result<()> {
        let line = serde_json::to_string(report)?;
        writeln!(self.writer, "{}", line)
            .and_then(|_| self.writer.flush())
            .map_err(|e| DqnError::Visualization(format!("{}: {}", self.path.display(), e)))
    }
}
