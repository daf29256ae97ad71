use thiserror::Error;

/// Top-level error type for the `firenet-api` crate.
///
/// Covers every outcome a single Firenet round trip can classify:
/// login rejection, session expiry, server errors, unexpected payloads,
/// and transport failures. `firenet-core` maps these into its own
/// domain errors and decides which ones are worth a re-login.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login did not produce the dashboard page (wrong credentials,
    /// account locked, maintenance page, ...).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The session cookie is missing, expired, or revoked (HTTP 401).
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Remote ──────────────────────────────────────────────────────
    /// HTTP 500. Firenet answers this when the stove is not linked to
    /// the account, as well as on genuine server faults.
    #[error("Firenet server error (HTTP {status}): {message}")]
    RemoteServer { status: u16, message: String },

    /// HTTP 200 but the body is not the expected stove payload.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Any status the protocol does not assign a meaning to.
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the session has expired
    /// and a fresh login might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

/// Cut a response body down to something that fits in a log line.
pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
