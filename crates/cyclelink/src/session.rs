//! Ride session identity.
//!
//! Each ride runs under a UUID that tags every uploaded sample. The
//! identifier is persisted in key-value storage so an interrupted process
//! resumes the same session, and removed when the rider ends the ride.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::storage::{StorageBackend, StorageError};

/// Storage key holding the active session identifier.
const SESSION_KEY: &str = "track_session_id";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

/// One ride's persistent identity, opened at ride start and cleared at the
/// end. Holding the object is holding the session; `clear` consumes it.
pub struct TrackSession {
    id: Uuid,
    backend: Arc<dyn StorageBackend>,
}

impl TrackSession {
    /// Return the persisted session or mint and persist a fresh one.
    ///
    /// A stored value that does not parse as a UUID is replaced rather than
    /// reported, so corrupt state never wedges a ride.
    pub fn open(backend: Arc<dyn StorageBackend>) -> Result<Self, SessionError> {
        if let Some(stored) = backend.get_string(SESSION_KEY)? {
            match Uuid::parse_str(stored.trim()) {
                Ok(id) => {
                    debug!("resuming track session {id}");
                    return Ok(Self { id, backend });
                }
                Err(_) => {
                    warn!("stored session id '{stored}' is not a UUID, replacing it");
                }
            }
        }

        let id = Uuid::new_v4();
        backend.set_string(SESSION_KEY, &id.to_string())?;
        debug!("created track session {id}");
        Ok(Self { id, backend })
    }

    /// The session identifier, stable for the object's lifetime.
    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// End the session. The next [`TrackSession::open`] mints a new identity.
    pub fn clear(self) -> Result<(), SessionError> {
        self.backend.remove(SESSION_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStorage;
    use tempfile::TempDir;

    fn create_test_backend(dir: &TempDir) -> Arc<dyn StorageBackend> {
        Arc::new(FileStorage::new_with_path(Some(dir.path().join("storage.json"))).unwrap())
    }

    #[test]
    fn test_open_is_get_or_create() {
        let dir = TempDir::new().unwrap();
        let backend = create_test_backend(&dir);

        let first = TrackSession::open(backend.clone()).unwrap();
        let id = first.id();

        // A second open against the same storage resumes, not re-mints.
        let second = TrackSession::open(backend).unwrap();
        assert_eq!(second.id(), id);
    }

    #[test]
    fn test_clear_mints_new_identity_next_time() {
        let dir = TempDir::new().unwrap();
        let backend = create_test_backend(&dir);

        let session = TrackSession::open(backend.clone()).unwrap();
        let old_id = session.id();
        session.clear().unwrap();

        assert_eq!(backend.get_string("track_session_id").unwrap(), None);
        let next = TrackSession::open(backend).unwrap();
        assert_ne!(next.id(), old_id);
    }

    #[test]
    fn test_corrupt_stored_value_is_replaced() {
        let dir = TempDir::new().unwrap();
        let backend = create_test_backend(&dir);
        backend
            .set_string("track_session_id", "definitely-not-a-uuid")
            .unwrap();

        let session = TrackSession::open(backend.clone()).unwrap();
        let stored = backend.get_string("track_session_id").unwrap().unwrap();
        assert_eq!(stored, session.id().to_string());
    }

    #[test]
    fn test_identity_survives_process_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");

        let id = {
            let backend: Arc<dyn StorageBackend> =
                Arc::new(FileStorage::new_with_path(Some(path.clone())).unwrap());
            TrackSession::open(backend).unwrap().id()
        };

        let backend: Arc<dyn StorageBackend> =
            Arc::new(FileStorage::new_with_path(Some(path)).unwrap());
        assert_eq!(TrackSession::open(backend).unwrap().id(), id);
    }
}
