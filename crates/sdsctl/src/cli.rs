use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use sds_core::config::{AuthMode, DEFAULT_TIMEOUT_SECS};
use sds_core::ProviderConfig;
use tracing::Level;

macro_rules! env_prefix {
    () => {
        "SOLIDSERVER_"
    };
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub connection: Connection,

    /// JSON file holding the local state
    #[arg(long, value_name = "PATH", default_value = "sds-state.json", env = "SDS_STATE_PATH")]
    pub state_path: PathBuf,

    /// Set the loglevel of the application
    #[arg(
        value_enum,
        short = 'l',
        long,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL",
        env = "SDS_LOG_LEVEL"
    )]
    pub log_level: Loglevel,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create, update or replace a resource so it matches a JSON configuration
    Apply {
        /// Local name of the resource (e.g. zones.internal)
        address: String,
        /// Resource type (see `sdsctl types`)
        resource_type: String,
        /// JSON file with the resource fields
        config: PathBuf,
    },

    /// Read a managed resource back from the appliance
    Refresh { address: String },

    /// Delete a managed resource from the appliance
    Destroy { address: String },

    /// Start managing an existing appliance object
    Import {
        address: String,
        resource_type: String,
        /// Object id on the appliance
        oid: String,
    },

    /// Print the local state of one or every resource
    Show { address: Option<String> },

    /// List the resource types and their fields
    Types,
}

impl Command {
    /// Whether the command talks to the appliance
    pub fn needs_connection(&self) -> bool {
        !matches!(self, Command::Show { .. } | Command::Types)
    }
}

/// Appliance connection settings
#[derive(Debug, Args)]
pub struct Connection {
    /// Appliance host name or address
    #[arg(long, value_name = "HOST", env = concat!(env_prefix!(), "HOST"))]
    pub host: Option<String>,

    #[arg(long, value_name = "USERNAME", default_value = "", env = concat!(env_prefix!(), "USERNAME"))]
    pub username: String,

    #[arg(
        long,
        value_name = "PASSWORD",
        default_value = "",
        hide_env_values = true,
        env = concat!(env_prefix!(), "PASSWORD")
    )]
    pub password: String,

    /// Authentication mode: native, basic or token
    #[arg(long, value_name = "MODE", default_value = "native", env = concat!(env_prefix!(), "AUTH"))]
    pub auth: AuthMode,

    /// API token used by the token authentication mode
    #[arg(long, value_name = "TOKEN", hide_env_values = true, env = concat!(env_prefix!(), "TOKEN"))]
    pub token: Option<String>,

    /// Verify the appliance TLS certificate
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set,
        env = concat!(env_prefix!(), "SSLVERIFY")
    )]
    pub ssl_verify: bool,

    /// PEM bundle of additional trusted root certificates
    #[arg(long, value_name = "PATH", env = concat!(env_prefix!(), "ADDITIONAL_TRUST_CERTS_FILE"))]
    pub additional_trust_certs_file: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS, env = concat!(env_prefix!(), "TIMEOUT"))]
    pub timeout: u64,

    /// Appliance version (e.g. 710); discovered when not set
    #[arg(long = "sds-version", value_name = "VERSION", env = concat!(env_prefix!(), "VERSION"))]
    pub appliance_version: Option<u32>,
}

impl Connection {
    /// Validated provider configuration
    pub fn provider_config(&self) -> sds_core::Result<ProviderConfig> {
        let host = self
            .host
            .clone()
            .ok_or_else(|| sds_core::Error::config("SOLIDSERVER_HOST is required"))?;

        let mut config = ProviderConfig::new(host, self.username.as_str(), self.password.as_str())
            .with_auth(self.auth)
            .with_ssl_verify(self.ssl_verify);
        config.token = self.token.clone();
        config.additional_trust_certs_file = self.additional_trust_certs_file.clone();
        config.timeout_secs = self.timeout;
        config.version = self.appliance_version;

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Loglevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Loglevel> for Level {
    fn from(level: Loglevel) -> Self {
        match level {
            Loglevel::Trace => Level::TRACE,
            Loglevel::Debug => Level::DEBUG,
            Loglevel::Info => Level::INFO,
            Loglevel::Warn => Level::WARN,
            Loglevel::Error => Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sdsctl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn connection_flags_build_a_config() {
        let cli = parse(&[
            "--host",
            "sds.example.com",
            "--username",
            "ipmadmin",
            "--password",
            "secret",
            "--ssl-verify",
            "false",
            "--sds-version",
            "710",
            "refresh",
            "zones.fwd",
        ]);

        let config = cli.connection.provider_config().unwrap();
        assert_eq!(config.host, "sds.example.com");
        assert_eq!(config.auth, AuthMode::Native);
        assert!(!config.ssl_verify);
        assert_eq!(config.version, Some(710));
        assert!(cli.command.needs_connection());
    }

    #[test]
    fn token_auth_without_token_is_a_config_error() {
        let cli = parse(&["--host", "sds.example.com", "--auth", "token", "types"]);

        let err = cli.connection.provider_config().unwrap_err();
        assert!(matches!(err, sds_core::Error::Config(_)));
    }

    #[test]
    fn local_commands_need_no_connection() {
        assert!(!parse(&["types"]).command.needs_connection());
        assert!(!parse(&["show"]).command.needs_connection());
        assert!(parse(&["import", "pools.a", "solidserver_app_pool", "5"])
            .command
            .needs_connection());
    }

    #[test]
    fn unknown_auth_mode_is_rejected() {
        let result = Cli::try_parse_from(["sdsctl", "--auth", "kerberos", "types"]);
        assert!(result.is_err());
    }
}
