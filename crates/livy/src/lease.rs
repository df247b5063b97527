//! Scoped ownership of one remote Livy session.
//!
//! A [`SessionLease`] is created as soon as the gateway assigns a session
//! id. Deletion is issued exactly once: by [`SessionLease::release`] on
//! the normal path, or from `Drop` if the owning future is abandoned
//! before it gets there.

use std::sync::Arc;
use std::time::Duration;

use salespark_core::types::SessionId;

use crate::gateway::Gateway;

pub struct SessionLease {
    gateway: Arc<dyn Gateway>,
    session_id: SessionId,
    released: bool,
}

impl SessionLease {
    pub fn new(gateway: Arc<dyn Gateway>, session_id: SessionId) -> Self {
        Self {
            gateway,
            session_id,
            released: false,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Delete the session, then wait `grace` so the gateway can reclaim
    /// the Spark application before the caller moves on.
    pub async fn release(mut self, grace: Duration) {
        self.released = true;
        tracing::info!(session_id = self.session_id, "Releasing Livy session");
        self.gateway.delete_session(self.session_id).await;
        if !grace.is_zero() {
            tokio::time::sleep(grace).await;
        }
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let session_id = self.session_id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(session_id, "Session lease dropped unreleased, deleting in background");
                let gateway = Arc::clone(&self.gateway);
                handle.spawn(async move {
                    gateway.delete_session(session_id).await;
                });
            }
            Err(_) => {
                tracing::error!(session_id, "Session lease dropped outside a runtime, session leaked");
            }
        }
    }
}
