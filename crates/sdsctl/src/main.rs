// # sdsctl - SOLIDserver resource lifecycle tool
//
// Thin front end over `sds-core`: it parses the command line, builds the
// client and engine, runs one lifecycle operation and prints the result as
// JSON on stdout. Logs go to stderr.
//
// ## Configuration
//
// Every connection flag can also be set from the environment:
//
// - `SOLIDSERVER_HOST`: Appliance host name or address
// - `SOLIDSERVER_USERNAME` / `SOLIDSERVER_PASSWORD`: Account for native and basic auth
// - `SOLIDSERVER_AUTH`: native, basic or token
// - `SOLIDSERVER_TOKEN`: API token for token auth
// - `SOLIDSERVER_SSLVERIFY`: Verify the TLS certificate (default: true)
// - `SOLIDSERVER_ADDITIONAL_TRUST_CERTS_FILE`: Extra PEM root certificates
// - `SOLIDSERVER_TIMEOUT`: Request timeout in seconds
// - `SOLIDSERVER_VERSION`: Appliance version, skips discovery
// - `SDS_STATE_PATH`: State file (default: sds-state.json)
// - `SDS_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export SOLIDSERVER_HOST=sds.example.com
// export SOLIDSERVER_USERNAME=ipmadmin
// export SOLIDSERVER_PASSWORD=secret
//
// sdsctl apply zones.fwd solidserver_dns_forward_zone fwd.json
// sdsctl refresh zones.fwd
// sdsctl destroy zones.fwd
// ```

mod cli;

use std::collections::BTreeMap;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use sds_client::SolidServer;
use sds_core::{
    ApplyOutcome, Engine, FileStateStore, Method, Parameters, RawResponse, RefreshOutcome,
    ResourceRegistry, Transport,
};
use serde_json::{Value, json};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Command};

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum SdsExitCode {
    Success = 0,
    /// Invalid flags, environment, input file or resource configuration
    ConfigError = 1,
    /// The operation failed against the appliance or the state file
    RuntimeError = 2,
}

impl From<SdsExitCode> for ExitCode {
    fn from(code: SdsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl SdsExitCode {
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<sds_core::Error>() {
            Some(
                sds_core::Error::Config(_)
                | sds_core::Error::InvalidInput(_)
                | sds_core::Error::Registry(_),
            ) => SdsExitCode::ConfigError,
            _ => SdsExitCode::RuntimeError,
        }
    }
}

/// Stand-in transport for commands that never reach the appliance
struct Disconnected;

#[async_trait]
impl Transport for Disconnected {
    async fn request(
        &self,
        method: Method,
        path: &str,
        _params: &Parameters,
    ) -> sds_core::Result<RawResponse> {
        Err(sds_core::Error::transport(format!(
            "{} {} attempted without a connection",
            method, path
        )))
    }

    fn version(&self) -> u32 {
        0
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                SdsExitCode::ConfigError.into()
            } else {
                SdsExitCode::Success.into()
            };
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::from(cli.log_level))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SdsExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SdsExitCode::RuntimeError.into();
        }
    };

    match rt.block_on(run(cli)) {
        Ok(output) => {
            println!("{}", output);
            SdsExitCode::Success.into()
        }
        Err(e) => {
            error!("{:#}", e);
            SdsExitCode::for_error(&e).into()
        }
    }
}

/// Run one command and return its JSON report
async fn run(cli: Cli) -> Result<String> {
    let transport: Arc<dyn Transport> = if cli.command.needs_connection() {
        let config = cli.connection.provider_config()?;
        Arc::new(SolidServer::connect(&config).await?)
    } else {
        Arc::new(Disconnected)
    };

    let registry = Arc::new(ResourceRegistry::new());
    sds_resources::register(&registry, transport);

    let store = FileStateStore::new(&cli.state_path)
        .await
        .with_context(|| format!("opening state file {}", cli.state_path.display()))?;
    let engine = Engine::new(registry, Box::new(store));

    let report = match cli.command {
        Command::Apply {
            address,
            resource_type,
            config,
        } => {
            let raw = std::fs::read_to_string(&config).map_err(|e| {
                sds_core::Error::config(format!("cannot read {}: {}", config.display(), e))
            })?;
            let desired: Value = serde_json::from_str(&raw).map_err(|e| {
                sds_core::Error::config(format!("{} is not valid JSON: {}", config.display(), e))
            })?;

            let outcome = engine.apply(&address, &resource_type, &desired).await?;
            info!("{}: {:?}", address, outcome);
            apply_report(&address, &outcome)
        }
        Command::Refresh { address } => match engine.refresh(&address).await? {
            RefreshOutcome::Refreshed(record) => {
                json!({ "address": address, "outcome": "refreshed", "record": record })
            }
            RefreshOutcome::Gone => json!({ "address": address, "outcome": "gone" }),
        },
        Command::Destroy { address } => {
            engine.destroy(&address).await?;
            json!({ "address": address, "outcome": "destroyed" })
        }
        Command::Import {
            address,
            resource_type,
            oid,
        } => {
            let record = engine.import(&address, &resource_type, &oid).await?;
            json!({ "address": address, "outcome": "imported", "record": record })
        }
        Command::Show { address: Some(address) } => {
            let record = engine.state(&address).await?.ok_or_else(|| {
                sds_core::Error::invalid_input(format!("no state for address '{}'", address))
            })?;
            serde_json::to_value(record)?
        }
        Command::Show { address: None } => {
            let mut records = BTreeMap::new();
            for address in engine.addresses().await? {
                if let Some(record) = engine.state(&address).await? {
                    records.insert(address, record);
                }
            }
            serde_json::to_value(records)?
        }
        Command::Types => describe_types(engine.registry())?,
    };

    engine.flush().await?;
    Ok(serde_json::to_string_pretty(&report)?)
}

fn apply_report(address: &str, outcome: &ApplyOutcome) -> Value {
    match outcome {
        ApplyOutcome::Created { id } => {
            json!({ "address": address, "outcome": "created", "id": id })
        }
        ApplyOutcome::Updated { id } => {
            json!({ "address": address, "outcome": "updated", "id": id })
        }
        ApplyOutcome::Replaced {
            previous_id,
            id,
            changed,
        } => json!({
            "address": address,
            "outcome": "replaced",
            "previous_id": previous_id,
            "id": id,
            "changed": changed,
        }),
        ApplyOutcome::Unchanged { id } => {
            json!({ "address": address, "outcome": "unchanged", "id": id })
        }
    }
}

/// Field documentation of every registered type
fn describe_types(registry: &ResourceRegistry) -> Result<Value> {
    let mut types = serde_json::Map::new();
    for name in registry.list_resources() {
        let resource = registry.resource(name)?;
        let fields: Vec<Value> = resource
            .schema()
            .fields()
            .iter()
            .map(|field| {
                json!({
                    "name": field.name,
                    "kind": format!("{:?}", field.kind).to_lowercase(),
                    "required": field.required,
                    "force_new": field.force_new,
                    "default": field.default,
                    "description": field.description,
                })
            })
            .collect();
        types.insert(
            name.to_string(),
            json!({ "supports_update": resource.supports_update(), "fields": fields }),
        );
    }
    Ok(Value::Object(types))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_exit_code_1() {
        let err = anyhow::Error::from(sds_core::Error::config("SOLIDSERVER_HOST is required"));
        assert!(matches!(SdsExitCode::for_error(&err), SdsExitCode::ConfigError));

        let err = anyhow::Error::from(sds_core::Error::invalid_input("name: required"))
            .context("applying zones.fwd");
        assert!(matches!(SdsExitCode::for_error(&err), SdsExitCode::ConfigError));
    }

    #[test]
    fn appliance_errors_map_to_exit_code_2() {
        let err = anyhow::Error::from(sds_core::Error::transport("connection refused"));
        assert!(matches!(SdsExitCode::for_error(&err), SdsExitCode::RuntimeError));

        let err = anyhow::anyhow!("state file is read-only");
        assert!(matches!(SdsExitCode::for_error(&err), SdsExitCode::RuntimeError));
    }

    #[test]
    fn types_are_described_without_a_connection() {
        let registry = ResourceRegistry::new();
        sds_resources::register(&registry, Arc::new(Disconnected));

        let types = describe_types(&registry).unwrap();

        assert_eq!(types["solidserver_ip_mac"]["supports_update"], json!(false));
        let zone_fields = types["solidserver_dns_forward_zone"]["fields"].as_array().unwrap();
        assert_eq!(zone_fields[0]["name"], json!("dnsserver"));
        assert_eq!(zone_fields[0]["required"], json!(true));
    }

    #[test]
    fn replacement_report_lists_changed_fields() {
        let outcome = ApplyOutcome::Replaced {
            previous_id: "4".to_string(),
            id: "9".to_string(),
            changed: vec!["name".to_string()],
        };

        let report = apply_report("zones.fwd", &outcome);

        assert_eq!(report["outcome"], json!("replaced"));
        assert_eq!(report["changed"], json!(["name"]));
    }
}
