// ── Remote protocol adapter ──
//
// The two stove operations on top of the session: fetch status, and push a
// control change with Firenet's fetch-modify-post pattern. HTTP 401 is
// answered with a single-flight re-login and a retry of the whole
// operation, bounded by `max_relogin_retries`.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::convert::{apply_change, snapshot_from_status};
use crate::error::CoreError;
use crate::model::{ControlChange, StoveSnapshot};
use crate::session::SessionManager;

/// Stove operations with re-login handling.
pub struct RemoteAdapter {
    session: Arc<SessionManager>,
    max_relogin_retries: u32,
    /// Serializes fetch-modify-post sequences so two writes can't post
    /// controls built from the same base revision.
    write_lock: Mutex<()>,
}

impl RemoteAdapter {
    pub fn new(session: Arc<SessionManager>, max_relogin_retries: u32) -> Self {
        Self {
            session,
            max_relogin_retries,
            write_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// `GET status` and map it onto a snapshot.
    pub async fn fetch_status(&self) -> Result<StoveSnapshot, CoreError> {
        let client = self.session.client();
        debug!("updating Firenet status");
        let status = self
            .with_relogin("fetch status", move || client.get_status())
            .await?;
        snapshot_from_status(&status)
    }

    /// Fetch the current controls, overwrite one field, post them back.
    ///
    /// Firenet only accepts complete control sets, and the `revision` of
    /// the fetched set must go back unchanged so the service can reject
    /// writes based on outdated state.
    pub async fn push_control(&self, change: ControlChange) -> Result<(), CoreError> {
        let _write = self.write_lock.lock().await;
        let client = self.session.client();

        self.with_relogin("push control", move || async move {
            let mut status = client.get_status().await?;
            apply_change(&mut status.controls, &change);
            debug!(
                field = change.field(),
                revision = ?status.revision(),
                "posting controls"
            );
            client.post_controls(&status.controls).await
        })
        .await?;

        info!(field = change.field(), value = %change.value(), "control set");
        Ok(())
    }

    /// Run `call`, re-logging in and retrying on an expired session.
    async fn with_relogin<T, F, Fut>(&self, op: &'static str, mut call: F) -> Result<T, CoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, firenet_api::Error>>,
    {
        let mut attempts = 0;
        loop {
            let seen = self.session.generation();
            match call().await {
                Err(e) if e.is_auth_expired() => {
                    // A login that finished while this call was out already
                    // replaced the rejected session.
                    if self.session.generation() == seen {
                        self.session.mark_expired();
                    }
                    if attempts >= self.max_relogin_retries {
                        warn!(op, attempts, "session still rejected, giving up");
                        return Err(CoreError::SessionExpired { attempts });
                    }
                    attempts += 1;
                    debug!(op, attempt = attempts, "login required");
                    self.session.relogin(seen).await?;
                }
                Err(e) => {
                    warn!(op, error = %e, "Firenet request failed");
                    return Err(e.into());
                }
                Ok(value) => return Ok(value),
            }
        }
    }
}
