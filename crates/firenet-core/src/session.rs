// ── Session management ──
//
// Owns the Firenet client (and through it the cookie jar) together with
// the account credentials. Logins are single-flight: concurrent callers
// that all saw the same expired session share one login round trip.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use secrecy::SecretString;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use firenet_api::FirenetClient;

use crate::error::CoreError;

/// Session state observable by hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session yet, or the last one was rejected with HTTP 401.
    Disconnected,
    /// A login is in progress.
    Connecting,
    /// The last login succeeded and no request has been rejected since.
    Connected,
    /// The last login attempt failed.
    Failed,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Login and session bookkeeping for one Firenet account.
pub struct SessionManager {
    client: Arc<FirenetClient>,
    email: String,
    password: SecretString,
    state: watch::Sender<ConnectionState>,
    /// Held for the duration of a login round trip.
    login_lock: Mutex<()>,
    /// Bumped after every successful login.
    generation: AtomicU64,
}

impl SessionManager {
    pub fn new(client: Arc<FirenetClient>, email: String, password: SecretString) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            client,
            email,
            password,
            state,
            login_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// The session-bearing client all remote calls go through.
    pub fn client(&self) -> &FirenetClient {
        &self.client
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Number of successful logins so far. Read this *before* a request so
    /// a later [`relogin`](Self::relogin) can tell whether someone else has
    /// already renewed the session.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Record that the service rejected the current session.
    pub fn mark_expired(&self) {
        self.state.send_replace(ConnectionState::Disconnected);
    }

    /// Log in unconditionally (waiting for any login already running).
    pub async fn login(&self) -> Result<(), CoreError> {
        let _guard = self.login_lock.lock().await;
        self.login_locked().await
    }

    /// Log in again after a request observed an expired session.
    ///
    /// `seen_generation` is the value of [`generation`](Self::generation)
    /// taken before the rejected request. If another task has completed a
    /// login since then, that session is reused instead of logging in twice.
    pub async fn relogin(&self, seen_generation: u64) -> Result<(), CoreError> {
        let _guard = self.login_lock.lock().await;
        if self.generation() != seen_generation && self.is_connected() {
            debug!("session already renewed by a concurrent login");
            return Ok(());
        }
        self.login_locked().await
    }

    async fn login_locked(&self) -> Result<(), CoreError> {
        self.state.send_replace(ConnectionState::Connecting);
        info!("connecting to Firenet");

        match self.client.login(&self.email, &self.password).await {
            Ok(()) => {
                self.generation.fetch_add(1, Ordering::AcqRel);
                self.state.send_replace(ConnectionState::Connected);
                info!("connected to Firenet");
                Ok(())
            }
            Err(e) => {
                self.state.send_replace(ConnectionState::Failed);
                warn!(error = %e, "connecting to Firenet failed");
                Err(e.into())
            }
        }
    }
}
