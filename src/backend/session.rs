//! Scoped connections.

use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::debug;

use super::{BackendError, BackendResult, DataBackend};

/// A connected backend that disconnects when dropped.
///
/// ```ignore
/// let session = Session::open(factory.create(None).backend)?;
/// let tables = session.get_available_tables()?;
/// // disconnected here, on every exit path
/// ```
pub struct Session {
    backend: Box<dyn DataBackend>,
}

impl Session {
    /// Connect the backend and take ownership of it.
    pub fn open(mut backend: Box<dyn DataBackend>) -> BackendResult<Self> {
        if !backend.is_connected() && !backend.connect() {
            return Err(BackendError::ConnectionFailed {
                backend: backend.provider().as_str(),
            });
        }
        debug!(provider = %backend.provider(), "session opened");
        Ok(Self { backend })
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.backend.provider())
            .field("connected", &self.backend.is_connected())
            .finish()
    }
}

impl Deref for Session {
    type Target = dyn DataBackend;

    fn deref(&self) -> &Self::Target {
        self.backend.as_ref()
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.backend.as_mut()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!(provider = %self.backend.provider(), "session closed");
        self.backend.disconnect();
    }
}
