//! Clap derive structures for the `firenet` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

use firenet_core::Attribute;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// firenet -- read and control RIKA stoves through Firenet
#[derive(Debug, Parser)]
#[command(
    name = "firenet",
    version,
    about = "Read and control RIKA stoves through Firenet",
    long_about = "Talks to the RIKA Firenet web service the way a home-automation\n\
        host does: attributes are read from a short-lived status cache and\n\
        concurrent reads share a single status fetch.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Stove profile to use
    #[arg(long, short = 'p', env = "FIRENET_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Stove ID (overrides profile)
    #[arg(long, short = 's', env = "FIRENET_STOVE_ID", global = true)]
    pub stove_id: Option<String>,

    /// Firenet account email (overrides profile)
    #[arg(long, short = 'e', env = "FIRENET_EMAIL", global = true)]
    pub email: Option<String>,

    /// Firenet base URL (overrides profile)
    #[arg(long, env = "FIRENET_BASE_URL", global = true, hide_env = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FIRENET_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', env = "FIRENET_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "FIRENET_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show every attribute of the stove
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Read one attribute
    Get(GetArgs),

    /// Write one attribute
    Set(SetArgs),

    /// Poll every attribute at a fixed interval
    Watch(WatchArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Stove commands ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Bypass the status cache
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Attribute name, e.g. `active` or `current-temperature`
    #[arg(value_parser = parse_attribute)]
    pub attribute: Attribute,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Attribute name, e.g. `active` or `heating-threshold-temperature`
    #[arg(value_parser = parse_attribute)]
    pub attribute: Attribute,

    /// New value: on/off/true/false for `active`, degrees for temperatures
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between polls
    #[arg(long, short = 'i', default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Stop after this many polls
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the current configuration (passwords masked)
    Show,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

/// Accepts `CurrentTemperature`, `current-temperature`, `current_temperature`
/// and any casing thereof.
pub fn parse_attribute(raw: &str) -> Result<Attribute, String> {
    let compact: String = raw.chars().filter(|c| !matches!(c, '-' | '_')).collect();
    compact.parse().map_err(|_| {
        let known: Vec<String> = <Attribute as strum::IntoEnumIterator>::iter()
            .map(|a| kebab(a.as_ref()))
            .collect();
        format!("unknown attribute '{raw}' (expected one of: {})", known.join(", "))
    })
}

/// `HeatingThresholdTemperature` -> `heating-threshold-temperature`.
pub fn kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn attribute_names_accept_several_spellings() {
        for raw in [
            "HeatingThresholdTemperature",
            "heating-threshold-temperature",
            "heating_threshold_temperature",
            "HEATINGTHRESHOLDTEMPERATURE",
        ] {
            assert_eq!(
                parse_attribute(raw),
                Ok(Attribute::HeatingThresholdTemperature)
            );
        }
    }

    #[test]
    fn unknown_attribute_lists_the_known_ones() {
        let err = parse_attribute("fan-speed").unwrap_err();
        assert!(err.contains("current-heater-cooler-state"), "{err}");
    }

    #[test]
    fn kebab_case_conversion() {
        assert_eq!(kebab("Active"), "active");
        assert_eq!(kebab("CurrentTemperature"), "current-temperature");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
