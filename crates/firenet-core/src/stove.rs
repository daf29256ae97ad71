// ── Stove facade ──
//
// The host-facing entry point. Reads are coalesced behind one status
// fetch at a time; writes go straight to the remote adapter.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use firenet_api::transport::{TlsMode, TransportConfig};
use firenet_api::FirenetClient;

use crate::coalesce::{Admission, ReadCoalescer};
use crate::config::{StoveConfig, TlsVerification};
use crate::convert::control_for;
use crate::error::CoreError;
use crate::model::{Attribute, AttributeValue, StoveSnapshot};
use crate::remote::RemoteAdapter;
use crate::session::{ConnectionState, SessionManager};

/// The main entry point for hosts.
///
/// Cheaply cloneable via `Arc<StoveInner>`. One `Stove` per physical
/// stove; every clone shares the session, cache, and read queue.
#[derive(Clone)]
pub struct Stove {
    inner: Arc<StoveInner>,
}

struct StoveInner {
    config: StoveConfig,
    remote: RemoteAdapter,
    reads: ReadCoalescer,
}

impl Stove {
    /// Create a new stove handle. Does NOT log in -- call
    /// [`connect()`](Self::connect), or let the first request log in when
    /// the service answers 401.
    pub fn new(config: StoveConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = FirenetClient::new(
            config.resolved_base_url()?,
            config.stove_id.clone(),
            &transport,
        )?;
        let session = Arc::new(SessionManager::new(
            Arc::new(client),
            config.email.clone(),
            config.password.clone(),
        ));
        let remote = RemoteAdapter::new(session, config.max_relogin_retries);
        let reads = ReadCoalescer::new(config.freshness);

        Ok(Self {
            inner: Arc::new(StoveInner {
                config,
                remote,
                reads,
            }),
        })
    }

    /// Access the stove configuration.
    pub fn config(&self) -> &StoveConfig {
        &self.inner.config
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    fn session(&self) -> &SessionManager {
        self.inner.remote.session()
    }

    // ── Session ──────────────────────────────────────────────────

    /// Log in now instead of on the first rejected request.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.session().login().await
    }

    /// Subscribe to session state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.session().subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.session().is_connected()
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Read one attribute, from cache if fresh, otherwise from the next
    /// status fetch (shared with any other reads waiting on it).
    pub async fn get_attribute(&self, attribute: Attribute) -> Result<AttributeValue, CoreError> {
        let snapshot = self.read(Some(attribute)).await?;
        let value = snapshot.attribute(attribute);
        debug!(stove = %self.name(), %attribute, %value, "attribute read");
        Ok(value)
    }

    /// The whole status snapshot, with the same caching and coalescing as
    /// attribute reads.
    pub async fn status(&self) -> Result<Arc<StoveSnapshot>, CoreError> {
        self.read(None).await
    }

    /// Discard the cached snapshot's freshness and read again.
    pub async fn refresh(&self) -> Result<Arc<StoveSnapshot>, CoreError> {
        self.inner.reads.invalidate();
        self.read(None).await
    }

    /// The last fetched snapshot regardless of age, without any I/O.
    pub fn cached(&self) -> Option<Arc<StoveSnapshot>> {
        self.inner.reads.cached()
    }

    async fn read(&self, attribute: Option<Attribute>) -> Result<Arc<StoveSnapshot>, CoreError> {
        match self.inner.reads.admit(attribute) {
            Admission::Cached(snapshot) => Ok(snapshot),
            Admission::Queued { reply, start_fetch } => {
                if start_fetch {
                    self.spawn_fetch();
                }
                reply.await.map_err(|_| CoreError::FetchAbandoned)?
            }
        }
    }

    /// Run the status fetch on its own task so it always resolves the
    /// queue, even if the reader that triggered it is dropped. Fetches again
    /// while reads admitted after a write are still waiting.
    fn spawn_fetch(&self) {
        let stove = self.clone();
        tokio::spawn(async move {
            loop {
                let result = stove.inner.remote.fetch_status().await.map(Arc::new);
                if let Err(ref e) = result {
                    warn!(stove = %stove.name(), error = %e, "updating status failed");
                }
                if !stove.inner.reads.complete(result).refetch {
                    break;
                }
            }
        });
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Write one attribute.
    ///
    /// `Active` and `HeatingThresholdTemperature` are pushed to Firenet;
    /// `TargetHeaterCoolerState` is accepted without a remote call; the
    /// measured attributes are read-only. Values are forwarded verbatim.
    pub async fn set_attribute(
        &self,
        attribute: Attribute,
        value: AttributeValue,
    ) -> Result<(), CoreError> {
        debug!(stove = %self.name(), %attribute, %value, "attribute write");

        let Some(change) = control_for(attribute, value)? else {
            debug!(%attribute, "write has no remote effect");
            return Ok(());
        };

        self.inner.remote.push_control(change).await?;
        // The cached snapshot predates the write.
        self.inner.reads.invalidate();
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn build_transport(config: &StoveConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        cookie_jar: None,
    }
    .with_cookie_jar()
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
