//! Shared application state

use std::sync::Arc;

use crate::config::ChatConfig;
use crate::error::Result;
use crate::session::ChatSession;

/// State handed to every request handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ChatConfig,
    session: ChatSession,
}

impl AppState {
    /// Build state with an Ollama-backed session.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let session = ChatSession::with_ollama(config.clone())?;
        Ok(Self::with_session(config, session))
    }

    /// Build state around an existing session, whatever its providers.
    pub fn with_session(config: ChatConfig, session: ChatSession) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, session }),
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.inner.session
    }

    pub fn config(&self) -> &ChatConfig {
        &self.inner.config
    }
}
