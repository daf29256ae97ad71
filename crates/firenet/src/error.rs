//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use firenet_config::ConfigError;
use firenet_core::{Attribute, CoreError};

/// Process exit codes.
pub mod exit_code {
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const REMOTE: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to Firenet at {url}")]
    #[diagnostic(
        code(firenet::connection_failed),
        help(
            "Check your network connection.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(firenet::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Firenet login failed: {message}")]
    #[diagnostic(
        code(firenet::auth_failed),
        help(
            "Verify the email and password of your Firenet account.\n\
             The password is read from password_env, the keyring, FIRENET_PASSWORD, \
             or the profile."
        )
    )]
    AuthFailed { message: String },

    #[error("Firenet kept rejecting the session after {attempts} re-login attempt(s)")]
    #[diagnostic(
        code(firenet::session_expired),
        help("Firenet may be throttling logins. Wait a few minutes and try again.")
    )]
    SessionExpired { attempts: u32 },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(firenet::no_credentials),
        help(
            "Set FIRENET_PASSWORD, store it in the keyring under service 'firenet' \
             as '{profile}/password', or add password_env to the profile."
        )
    )]
    NoCredentials { profile: String },

    // ── Remote ───────────────────────────────────────────────────────

    #[error("Firenet error (HTTP {status}): {message}")]
    #[diagnostic(
        code(firenet::remote_error),
        help("Check that the stove ID is correct and the stove is online.")
    )]
    Remote { status: u16, message: String },

    #[error("Unexpected response from Firenet: {message}")]
    #[diagnostic(code(firenet::malformed_response))]
    MalformedResponse { message: String },

    // ── Attributes ───────────────────────────────────────────────────

    #[error("{attribute} is read-only")]
    #[diagnostic(
        code(firenet::read_only),
        help("Only active and heating-threshold-temperature can be changed.")
    )]
    ReadOnly { attribute: Attribute },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(firenet::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No {field} configured")]
    #[diagnostic(
        code(firenet::no_config),
        help(
            "Pass --{flag}, set {env}, or add it to profile '{profile}' in\n\
             {path}"
        )
    )]
    MissingSetting {
        field: String,
        flag: String,
        env: String,
        profile: String,
        path: String,
    },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(firenet::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(firenet::config))]
    Config(ConfigError),

    // ── Internal ─────────────────────────────────────────────────────

    #[error("Internal error: {0}")]
    #[diagnostic(code(firenet::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(firenet::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::SessionExpired { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::Remote { .. } | Self::MalformedResponse { .. } => exit_code::REMOTE,
            Self::ReadOnly { .. }
            | Self::Validation { .. }
            | Self::MissingSetting { .. }
            | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout => CliError::Timeout,
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::SessionExpired { attempts } => CliError::SessionExpired { attempts },
            CoreError::RemoteServer { status, message } => CliError::Remote { status, message },
            CoreError::MalformedResponse { message } => CliError::MalformedResponse { message },
            CoreError::ReadOnly { attribute } => CliError::ReadOnly { attribute },
            CoreError::InvalidValue { attribute, reason } => CliError::Validation {
                field: attribute.to_string(),
                reason,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },
            CoreError::FetchAbandoned => CliError::Internal("status fetch was abandoned".into()),
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { profile, field } => {
                let (flag, env) = match field {
                    "stove_id" => ("stove-id", "FIRENET_STOVE_ID"),
                    "email" => ("email", firenet_config::EMAIL_ENV),
                    other => (other, ""),
                };
                CliError::MissingSetting {
                    field: field.replace('_', " "),
                    flag: flag.into(),
                    env: env.into(),
                    profile,
                    path: firenet_config::config_path().display().to_string(),
                }
            }
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile(name) => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            other => CliError::Config(other),
        }
    }
}
