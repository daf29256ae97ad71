// Firenet HTTP client
//
// Wraps `reqwest::Client` with Firenet URL construction and response
// classification. The login flow lives in `auth.rs` as an inherent impl
// to keep this module focused on the stove endpoints.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::cookie::{CookieStore, Jar};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, preview};
use crate::models::{Controls, StoveStatus, controls_form};
use crate::transport::TransportConfig;

/// Raw HTTP client for a single stove on the Firenet web service.
///
/// Every method performs exactly one round trip and maps the HTTP outcome
/// onto [`Error`]. The session cookie is held in an explicit jar owned by
/// this client, so two clients never share a session by accident.
pub struct FirenetClient {
    http: reqwest::Client,
    base_url: Url,
    stove_id: String,
    /// Session cookie store. Populated by `login`, read by every request.
    cookie_jar: Arc<Jar>,
}

impl FirenetClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (Firenet auth requires cookies). `base_url` is the
    /// service root, e.g. `https://www.rika-firenet.com`.
    pub fn new(base_url: Url, stove_id: String, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone().unwrap_or_default();
        let config = TransportConfig {
            cookie_jar: Some(Arc::clone(&cookie_jar)),
            ..config
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            stove_id,
            cookie_jar,
        })
    }

    /// The stove identifier this client talks to.
    pub fn stove_id(&self) -> &str {
        &self.stove_id
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The `Cookie` header value currently held for the service, if any.
    pub fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookie_jar.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a service-level URL: `{base}/{path}`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))?)
    }

    /// Build a stove-scoped URL: `{base}/api/client/{stove}/{path}`.
    pub(crate) fn stove_url(&self, path: &str) -> Result<Url, Error> {
        self.url(&format!("api/client/{}/{path}", self.stove_id))
    }

    // ── Stove endpoints ──────────────────────────────────────────────

    /// Fetch the current stove status.
    ///
    /// `GET /api/client/{stove}/status`
    ///
    /// Success requires HTTP 200 *and* the stove id somewhere in the body;
    /// Firenet serves an HTML page with status 200 for some failures.
    pub async fn get_status(&self) -> Result<StoveStatus, Error> {
        let url = self.stove_url("status")?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        self.classify(status, &body)?;

        if !body.contains(&self.stove_id) {
            return Err(Error::MalformedResponse {
                message: format!(
                    "status body does not mention stove {} (body preview: {:?})",
                    self.stove_id,
                    preview(&body)
                ),
            });
        }

        let parsed: StoveStatus = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;
        trace!(revision = ?parsed.revision(), "status parsed");
        Ok(parsed)
    }

    /// Submit a complete control set.
    ///
    /// `POST /api/client/{stove}/controls` with the whole `controls`
    /// object as a form body. Firenet has no per-field endpoint, so the
    /// caller is expected to send the last fetched object with its
    /// `revision` untouched.
    pub async fn post_controls(&self, controls: &Controls) -> Result<(), Error> {
        let url = self.stove_url("controls")?;
        debug!(fields = controls.len(), "POST {}", url);

        let resp = self.http.post(url).form(&controls_form(controls)).send().await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        self.classify(status, &body)
    }

    /// Map an HTTP status onto the Firenet error model.
    fn classify(&self, status: StatusCode, body: &str) -> Result<(), Error> {
        match status {
            StatusCode::OK => Ok(()),
            StatusCode::UNAUTHORIZED => Err(Error::SessionExpired),
            StatusCode::INTERNAL_SERVER_ERROR => {
                warn!(
                    stove = %self.stove_id,
                    "Firenet reported an internal server error; is the stove linked to this account?"
                );
                Err(Error::RemoteServer {
                    status: status.as_u16(),
                    message: preview(body).to_owned(),
                })
            }
            other => Err(Error::UnexpectedStatus {
                status: other.as_u16(),
            }),
        }
    }
}
