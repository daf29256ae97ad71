//! Shared configuration for Firenet tools.
//!
//! TOML profiles, password resolution (env + keyring + plaintext),
//! and translation to `firenet_core::StoveConfig`. The CLI layers its
//! flag overrides on top of [`ProfileOverrides`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use firenet_core::{StoveConfig, TlsVerification};

/// Keyring service name; entries are keyed `<profile>/password`.
pub const KEYRING_SERVICE: &str = "firenet";

/// Environment variable holding the account email.
pub const EMAIL_ENV: &str = "FIRENET_EMAIL";

/// Environment variable holding the account password.
pub const PASSWORD_ENV: &str = "FIRENET_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' has no {field} configured")]
    Missing { profile: String, field: &'static str },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{0}' not found")]
    UnknownProfile(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named stove profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// The profile name to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// The configuration as TOML, with plaintext passwords masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        #[derive(Serialize)]
        struct Redacted<'a> {
            default_profile: &'a str,
            defaults: &'a Defaults,
            profiles: BTreeMap<&'a str, Profile>,
        }

        let profiles = self
            .profiles
            .iter()
            .map(|(name, profile)| {
                let mut profile = profile.clone();
                if profile.password.is_some() {
                    profile.password = Some("****".into());
                }
                (name.as_str(), profile)
            })
            .collect();

        let redacted = Redacted {
            default_profile: self.active_profile_name(),
            defaults: &self.defaults,
            profiles,
        };
        Ok(toml::to_string_pretty(&redacted)?)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Status cache freshness in milliseconds.
    #[serde(default = "default_freshness_ms")]
    pub freshness_ms: u64,

    #[serde(default = "default_relogin_retries")]
    pub max_relogin_retries: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
            freshness_ms: default_freshness_ms(),
            max_relogin_retries: default_relogin_retries(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
#[allow(clippy::cast_possible_truncation)]
fn default_freshness_ms() -> u64 {
    firenet_core::DEFAULT_FRESHNESS.as_millis() as u64
}
fn default_relogin_retries() -> u32 {
    1
}

/// A named stove profile.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Stove identifier from the Firenet web UI.
    pub stove_id: Option<String>,

    /// Firenet account email.
    pub email: Option<String>,

    /// Password (plaintext — prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Display name.
    pub name: Option<String>,

    /// Override the Firenet base URL.
    pub base_url: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override cache freshness (milliseconds).
    pub freshness_ms: Option<u64>,
}

/// Values that take precedence over the profile, typically CLI flags.
#[derive(Debug, Default, Clone)]
pub struct ProfileOverrides {
    pub stove_id: Option<String>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
    pub base_url: Option<String>,
    pub insecure: bool,
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "firenet", "firenet").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("firenet");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from `path` + `FIRENET_` environment variables.
///
/// Nested keys use a double underscore: `FIRENET_DEFAULTS__TIMEOUT=10`.
/// A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FIRENET_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Credential resolution ───────────────────────────────────────────

/// Where secrets come from. [`SystemSecrets`] reads the process
/// environment and the OS keyring.
pub trait SecretSource {
    fn env(&self, key: &str) -> Option<String>;
    fn keyring(&self, profile_name: &str) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSecrets;

impl SecretSource for SystemSecrets {
    fn env(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn keyring(&self, profile_name: &str) -> Option<String> {
        keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
            .and_then(|entry| entry.get_password())
            .ok()
    }
}

/// Resolve the account password without CLI flags.
///
/// Order: the profile's `password_env` variable, the system keyring,
/// `FIRENET_PASSWORD`, then plaintext in the profile.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
    secrets: &impl SecretSource,
) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.password_env {
        if let Some(val) = secrets.env(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(pw) = secrets.keyring(profile_name) {
        return Ok(SecretString::from(pw));
    }

    if let Some(pw) = secrets.env(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Build a `StoveConfig` from a profile (which may be empty when no config
/// file exists), the global defaults, and overrides.
pub fn profile_to_stove_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    overrides: &ProfileOverrides,
    secrets: &impl SecretSource,
) -> Result<StoveConfig, ConfigError> {
    let stove_id = overrides
        .stove_id
        .clone()
        .or_else(|| profile.stove_id.clone())
        .or_else(|| secrets.env("FIRENET_STOVE_ID"))
        .ok_or_else(|| ConfigError::Missing {
            profile: profile_name.into(),
            field: "stove_id",
        })?;

    let email = overrides
        .email
        .clone()
        .or_else(|| profile.email.clone())
        .or_else(|| secrets.env(EMAIL_ENV))
        .ok_or_else(|| ConfigError::Missing {
            profile: profile_name.into(),
            field: "email",
        })?;

    let password = match overrides.password {
        Some(ref pw) => pw.clone(),
        None => resolve_password(profile, profile_name, secrets)?,
    };

    let mut config = StoveConfig::new(stove_id, email, password);

    if let Some(raw) = overrides.base_url.as_ref().or(profile.base_url.as_ref()) {
        let url = raw.parse().map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
        config = config.with_base_url(url);
    }

    if let Some(ref name) = profile.name {
        config = config.with_name(name.clone());
    }

    config.tls = if overrides.insecure || profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    config.timeout = Duration::from_secs(
        overrides
            .timeout
            .or(profile.timeout)
            .unwrap_or(defaults.timeout),
    );

    Ok(config
        .with_freshness(Duration::from_millis(
            profile.freshness_ms.unwrap_or(defaults.freshness_ms),
        ))
        .with_max_relogin_retries(defaults.max_relogin_retries))
}

/// Look up `profile_name` (or the default profile) and build its
/// `StoveConfig`. A missing default profile is treated as empty so flags
/// and environment variables alone can describe the stove.
pub fn resolve_stove_config(
    config: &Config,
    profile_name: Option<&str>,
    overrides: &ProfileOverrides,
    secrets: &impl SecretSource,
) -> Result<StoveConfig, ConfigError> {
    let (name, profile) = match profile_name {
        Some(name) => (
            name,
            config
                .profiles
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownProfile(name.into()))?,
        ),
        None => {
            let name = config.active_profile_name();
            (name, config.profiles.get(name).cloned().unwrap_or_default())
        }
    };

    profile_to_stove_config(&profile, name, &config.defaults, overrides, secrets)
}
