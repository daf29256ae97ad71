//! CLI configuration -- thin wrapper around `firenet_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--stove-id, --email, --base-url, etc.).

use firenet_config::{ConfigError, ProfileOverrides, SystemSecrets};
use firenet_core::StoveConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use firenet_config::{Config, config_path, load_config};

/// Translate global flags into overrides for the shared resolver.
fn overrides(global: &GlobalOpts) -> ProfileOverrides {
    ProfileOverrides {
        stove_id: global.stove_id.clone(),
        email: global.email.clone(),
        password: None,
        base_url: global.base_url.clone(),
        insecure: global.insecure,
        timeout: global.timeout,
    }
}

/// Build a `StoveConfig` from the config file, profile, and CLI overrides.
///
/// With no config file, flags and `FIRENET_*` variables alone must
/// describe the stove.
pub fn build_stove_config(global: &GlobalOpts) -> Result<StoveConfig, CliError> {
    let cfg = load_config()?;

    firenet_config::resolve_stove_config(
        &cfg,
        global.profile.as_deref(),
        &overrides(global),
        &SystemSecrets,
    )
    .map_err(|err| match err {
        ConfigError::UnknownProfile(name) => CliError::ProfileNotFound {
            name,
            available: available_profiles(&cfg),
        },
        other => other.into(),
    })
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
