// ── Core error types ──
//
// User-facing errors from firenet-core. These are NOT transport-specific --
// hosts never see reqwest errors or JSON parse failures directly.
// The `From<firenet_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.
//
// `CoreError` is `Clone`: one failed status fetch is delivered to every
// read that was queued behind it.

use thiserror::Error;

use crate::model::Attribute;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach Firenet at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session still rejected after {attempts} re-login attempt(s)")]
    SessionExpired { attempts: u32 },

    #[error("Firenet request timed out")]
    Timeout,

    // ── Remote errors ────────────────────────────────────────────────
    #[error("Firenet server error (HTTP {status}): {message}")]
    RemoteServer { status: u16, message: String },

    #[error("Malformed Firenet response: {message}")]
    MalformedResponse { message: String },

    // ── Attribute errors ─────────────────────────────────────────────
    #[error("{attribute} is read-only")]
    ReadOnly { attribute: Attribute },

    #[error("Invalid value for {attribute}: {reason}")]
    InvalidValue { attribute: Attribute, reason: String },

    #[error("Status fetch ended without a result")]
    FetchAbandoned,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if the failure came from the credentials rather than
    /// from the service or the network.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::SessionExpired { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<firenet_api::Error> for CoreError {
    fn from(err: firenet_api::Error) -> Self {
        match err {
            firenet_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            firenet_api::Error::SessionExpired => CoreError::SessionExpired { attempts: 0 },
            firenet_api::Error::RemoteServer { status, message } => {
                CoreError::RemoteServer { status, message }
            }
            firenet_api::Error::MalformedResponse { message } => {
                CoreError::MalformedResponse { message }
            }
            firenet_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
            firenet_api::Error::UnexpectedStatus { status } => CoreError::MalformedResponse {
                message: format!("unexpected HTTP status {status}"),
            },
            firenet_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            firenet_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            firenet_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
        }
    }
}
