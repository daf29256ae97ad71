// ── Runtime stove configuration ──
//
// These types describe *how* to reach one stove on Firenet.
// They carry credential data and connection tuning, but never touch disk.
// The CLI (or any other host) constructs a `StoveConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// Default age after which a cached status snapshot is refetched.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_millis(1000);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (intercepting proxies, test rigs).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single stove.
///
/// Built by the host, passed to `Stove` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct StoveConfig {
    /// Firenet base URL; `None` means the public service at
    /// [`firenet_api::DEFAULT_BASE_URL`].
    pub base_url: Option<Url>,
    /// Stove identifier as shown in the Firenet web UI.
    pub stove_id: String,
    /// Firenet account email.
    pub email: String,
    /// Firenet account password.
    pub password: SecretString,
    /// Display name for logs and host UIs.
    pub name: String,
    /// How long a fetched status snapshot is served from cache.
    pub freshness: Duration,
    /// How many re-login-and-retry rounds a single operation may spend
    /// on HTTP 401 before giving up.
    pub max_relogin_retries: u32,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl StoveConfig {
    /// Config for the public Firenet service with default tuning.
    pub fn new(stove_id: impl Into<String>, email: impl Into<String>, password: SecretString) -> Self {
        let stove_id = stove_id.into();
        Self {
            base_url: None,
            name: format!("Stove {stove_id}"),
            stove_id,
            email: email.into(),
            password,
            freshness: DEFAULT_FRESHNESS,
            max_relogin_retries: 1,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn with_max_relogin_retries(mut self, retries: u32) -> Self {
        self.max_relogin_retries = retries;
        self
    }

    /// The base URL requests go to.
    pub fn resolved_base_url(&self) -> Result<Url, CoreError> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Url::parse(firenet_api::DEFAULT_BASE_URL).map_err(|e| CoreError::Config {
                message: format!("invalid default base URL: {e}"),
            }),
        }
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_public_service() {
        let config = StoveConfig::new("12345", "me@example.com", SecretString::from("pw".to_string()));
        assert!(config.base_url.is_none());
        assert_eq!(
            config.resolved_base_url().unwrap().as_str(),
            "https://www.rika-firenet.com/"
        );
        assert_eq!(config.freshness, Duration::from_millis(1000));
        assert_eq!(config.max_relogin_retries, 1);
        assert_eq!(config.name, "Stove 12345");
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn explicit_base_url_wins() {
        let url = Url::parse("http://127.0.0.1:8080").unwrap();
        let config = StoveConfig::new("12345", "me@example.com", SecretString::from("pw".to_string()))
            .with_base_url(url.clone());
        assert_eq!(config.resolved_base_url().unwrap(), url);
    }
}
