//! Concurrent session table.
//!
//! Sessions are keyed by [`SessionId`]. Each one sits behind its own mutex,
//! so calls on a session are serialized while different sessions run in
//! parallel. The table lock is held only long enough to find the session.

use crate::config::SessionConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::session::Session;
use imgpipe_ops::OperationRegistry;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

/// Opaque session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Owns every open session.
pub struct SessionManager {
    registry: Arc<OperationRegistry>,
    config: SessionConfig,
    next_id: AtomicU64,
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
}

impl SessionManager {
    /// Creates a manager whose sessions share `registry` and `config`.
    pub fn new(registry: Arc<OperationRegistry>, config: SessionConfig) -> Self {
        Self {
            registry,
            config,
            next_id: AtomicU64::new(1),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a new empty session.
    pub fn create(&self) -> SessionId {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let session = Session::new(Arc::clone(&self.registry), self.config.clone());
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(Mutex::new(session)));
        debug!(%id, "Opened session");
        id
    }

    /// Runs `f` with exclusive access to session `id`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::UnknownSession`] if `id` is not open.
    pub fn with_session<R>(&self, id: SessionId, f: impl FnOnce(&mut Session) -> R) -> PipelineResult<R> {
        let session = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(PipelineError::UnknownSession(id))?;
        let mut guard = session.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&mut guard))
    }

    /// Closes session `id`. Returns `false` if it was not open.
    pub fn close(&self, id: SessionId) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        if removed {
            debug!(%id, "Closed session");
        }
        removed
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no session is open.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Open session ids, ascending.
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort();
        ids
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Arc::new(OperationRegistry::builtin()), SessionConfig::default())
    }
}
