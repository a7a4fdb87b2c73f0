//! Persistence boundary for findings and annotations.

use std::path::{Path, PathBuf};

use crate::error::SaveError;
use crate::model::SavePayload;

/// Destination for a session's save payload.
pub trait FindingsSink {
    /// Persist `payload` for the submission with the given id.
    fn save(&mut self, submission_id: &str, payload: &SavePayload) -> Result<(), SaveError>;
}

impl<F> FindingsSink for F
where
    F: FnMut(&str, &SavePayload) -> Result<(), SaveError>,
{
    fn save(&mut self, submission_id: &str, payload: &SavePayload) -> Result<(), SaveError> {
        self(submission_id, payload)
    }
}

/// Sink writing each save as `<submission id>.json` into a directory.
///
/// The file holds the request body the backend expects, `{"findings": ...}`.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a save for `submission_id` is written to.
    pub fn path_for(&self, submission_id: &str) -> PathBuf {
        let name: String = submission_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FindingsSink for JsonFileSink {
    fn save(&mut self, submission_id: &str, payload: &SavePayload) -> Result<(), SaveError> {
        if submission_id.is_empty() {
            return Err(SaveError::Rejected("submission has no id".to_string()));
        }
        let body = payload
            .to_request_json()
            .map_err(|e| SaveError::Rejected(e.to_string()))?;
        let path = self.path_for(submission_id);
        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(&path, body))
            .map_err(|e| SaveError::Transport(format!("{}: {}", path.display(), e)))?;
        log::info!("Wrote findings for '{}' to {:?}", submission_id, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Findings, ImageAnnotations};

    #[test]
    fn test_path_sanitized() {
        let sink = JsonFileSink::new("/tmp/out");
        assert_eq!(sink.path_for("65f0c1"), PathBuf::from("/tmp/out/65f0c1.json"));
        assert_eq!(sink.path_for("../x"), PathBuf::from("/tmp/out/___x.json"));
    }

    #[test]
    fn test_json_file_sink_writes_request_body() {
        let dir = std::env::temp_dir().join(format!("toothmark-sink-{}", std::process::id()));
        let mut sink = JsonFileSink::new(&dir);
        let payload = SavePayload::new(Findings::default(), vec![ImageAnnotations::default()]);

        sink.save("s1", &payload).unwrap();
        let written = std::fs::read_to_string(sink.path_for("s1")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["findings"]["annotations"].as_array().unwrap().len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_rejects_missing_id() {
        let mut sink = JsonFileSink::new(std::env::temp_dir());
        let payload = SavePayload::new(Findings::default(), Vec::new());
        assert!(matches!(sink.save("", &payload), Err(SaveError::Rejected(_))));
    }
}
