use crate::pipeline::PredictionRecord;
use crate::stream::PredictionSnapshot;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Latest predictions, kept in memory and mirrored to a JSON file.
///
/// Owned by the scheduler task, so writes never interleave.
pub struct PredictionStore {
    path: PathBuf,
    snapshot: PredictionSnapshot,
}

impl PredictionStore {
    /// Open the store, restoring the previous snapshot if one was saved.
    /// A missing file starts empty; a corrupt file is an error.
    pub fn open(path: &Path) -> Result<Self> {
        let snapshot = match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse predictions file: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PredictionSnapshot::default(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read predictions file: {}", path.display()))
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            snapshot,
        })
    }

    pub fn snapshot(&self) -> &PredictionSnapshot {
        &self.snapshot
    }

    /// Replace the stored predictions and persist them.
    pub fn replace(&mut self, records: Vec<PredictionRecord>) -> Result<&PredictionSnapshot> {
        self.save(PredictionSnapshot::new(records))?;
        Ok(&self.snapshot)
    }

    /// Persist `snapshot`, then make it current. On a write failure the
    /// previous snapshot stays current, matching what is on disk.
    pub fn save(&mut self, snapshot: PredictionSnapshot) -> Result<()> {
        self.persist(&snapshot)?;
        self.snapshot = snapshot;
        Ok(())
    }

    /// Write to a sibling temp file, then rename over the target.
    fn persist(&self, snapshot: &PredictionSnapshot) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write predictions file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace predictions file: {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), count = snapshot.predictions.len(), "predictions saved");
        Ok(())
    }
}
