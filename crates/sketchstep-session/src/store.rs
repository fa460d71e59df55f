//! Persistence of session records against the uploaded image they came from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::guide::is_valid_session_id;
use crate::records::SessionRecord;

/// File name of the record inside a session directory.
pub const RECORD_FILE: &str = "session.json";

/// A session record tagged with the identity of its source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Caller-chosen identity of the uploaded image.
    pub image_id: String,
    /// The generated session.
    pub session: SessionRecord,
}

/// Somewhere session records can be kept.
pub trait RecordStore {
    /// Store `record` for the image identified by `image_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the record cannot be written.
    fn save(&self, image_id: &str, record: &SessionRecord) -> Result<(), SessionError>;

    /// Fetch the record for `session_id`, if one was stored.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if a stored record exists but cannot be read.
    fn load(&self, session_id: &str) -> Result<Option<StoredSession>, SessionError>;
}

/// Stores each record as `<root>/<session_id>/session.json`, next to the
/// step images.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// A store rooted at the same directory passed to guide generation.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the record file for `session_id`.
    #[must_use]
    pub fn record_path(&self, session_id: &str) -> PathBuf {
        self.root.join(session_id).join(RECORD_FILE)
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RecordStore for JsonFileStore {
    fn save(&self, image_id: &str, record: &SessionRecord) -> Result<(), SessionError> {
        check_id(&record.session_id)?;
        let path = self.record_path(&record.session_id);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| SessionError::io(dir, e))?;
        }
        let stored = StoredSession {
            image_id: image_id.to_string(),
            session: record.clone(),
        };
        let json = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&path, json).map_err(|e| SessionError::io(&path, e))?;
        tracing::debug!(path = %path.display(), image_id, "saved session record");
        Ok(())
    }

    fn load(&self, session_id: &str) -> Result<Option<StoredSession>, SessionError> {
        check_id(session_id)?;
        let path = self.record_path(session_id);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::io(&path, e)),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }
}

fn check_id(session_id: &str) -> Result<(), SessionError> {
    if is_valid_session_id(session_id) {
        Ok(())
    } else {
        Err(SessionError::InvalidSessionId(session_id.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sketchstep_pipeline::ToneSummary;
    use sketchstep_render::PaperSize;

    use super::*;

    fn record(id: &str) -> SessionRecord {
        SessionRecord {
            session_id: id.to_string(),
            total_steps: 0,
            image_width: 1024,
            image_height: 768,
            paper_size: PaperSize::A3,
            grid_divisions: 10,
            tone_distribution: ToneSummary::default(),
            steps: Vec::new(),
        }
    }

    #[test]
    fn saved_record_can_be_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.save("upload-1", &record("0123456789ab")).unwrap();

        assert!(dir.path().join("0123456789ab").join(RECORD_FILE).is_file());
        let loaded = store.load("0123456789ab").unwrap().unwrap();
        assert_eq!(loaded.image_id, "upload-1");
        assert_eq!(loaded.session, record("0123456789ab"));
    }

    #[test]
    fn missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load("nope").unwrap().is_none());
    }

    #[test]
    fn corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let path = store.record_path("bad");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(store.load("bad"), Err(SessionError::Record(_))));
    }

    #[test]
    fn path_like_session_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store"));
        assert!(matches!(
            store.save("upload", &record("../outside")),
            Err(SessionError::InvalidSessionId(_))
        ));
        assert!(matches!(store.load(""), Err(SessionError::InvalidSessionId(_))));
        assert!(!dir.path().join("outside").exists());
    }
}
