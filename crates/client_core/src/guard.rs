use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::session::{SessionHandle, TokenStore};

/// Ends the session when the server rejects the bearer token.
#[async_trait]
pub trait SessionGuard: Send + Sync {
    async fn on_unauthorized(&self);
    /// False once the session has ended, whoever ended it.
    async fn is_active(&self) -> bool;
}

/// Clears the persisted token and marks the shared session signed out.
pub struct StoreSessionGuard {
    session: SessionHandle,
    store: Arc<dyn TokenStore>,
}

impl StoreSessionGuard {
    pub fn new(session: SessionHandle, store: Arc<dyn TokenStore>) -> Self {
        Self { session, store }
    }
}

#[async_trait]
impl SessionGuard for StoreSessionGuard {
    async fn on_unauthorized(&self) {
        self.session.write().await.end();
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear stored token");
        }
        info!("session ended after unauthorized response");
    }

    async fn is_active(&self) -> bool {
        self.session.read().await.is_authenticated()
    }
}
