//! File-backed checkout session store.
//!
//! One small JSON document, written via temp file + rename so a crash
//! mid-write leaves either the old session or the new one.

use std::io;
use std::path::PathBuf;

use cw_core::ports::{SessionStoreError, SessionStorePort};
use cw_core::CheckoutSession;

const SESSION_DIR: &str = "checkout";
const SESSION_FILE: &str = "session.json";

#[derive(Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(app_data_root: PathBuf) -> Self {
        let path = app_data_root.join(SESSION_DIR).join(SESSION_FILE);
        Self { path }
    }

    /// Point at an explicit file rather than the default layout.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStorePort for FileSessionStore {
    fn load_session(&self) -> Result<Option<CheckoutSession>, SessionStoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(SessionStoreError::Store(format!(
                    "failed to read session file: {err}"
                )))
            }
        };
        let session = serde_json::from_str(&content)
            .map_err(|err| SessionStoreError::Corrupt(format!("invalid session file: {err}")))?;
        Ok(Some(session))
    }

    fn store_session(&self, session: &CheckoutSession) -> Result<(), SessionStoreError> {
        let parent = self.path.parent().ok_or_else(|| {
            SessionStoreError::Store("session path missing parent directory".to_string())
        })?;
        std::fs::create_dir_all(parent).map_err(|err| {
            SessionStoreError::Store(format!("failed to create session dir: {err}"))
        })?;

        let content = serde_json::to_string_pretty(session)
            .map_err(|err| SessionStoreError::Store(format!("failed to encode session: {err}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content).map_err(|err| {
            SessionStoreError::Store(format!("failed to write session temp file: {err}"))
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|err| {
            SessionStoreError::Store(format!("failed to commit session file: {err}"))
        })?;

        Ok(())
    }

    fn clear_session(&self) -> Result<(), SessionStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SessionStoreError::Store(format!(
                "failed to remove session file: {err}"
            ))),
        }
    }
}
