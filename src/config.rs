use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

/// Emulator address used when nothing else says where Spanner lives
pub const DEFAULT_EMULATOR_HOST: &str = "localhost:9010";

#[derive(Debug, Clone)]
pub struct Config {
    pub service_host: String,
    pub service_port: u16,
    pub debug: bool,
    pub store: StoreConfig,
}

/// Which Store Adapter backend to run against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    Spanner(SpannerSettings),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannerSettings {
    /// `host:port` of an emulator, `None` for production Spanner
    pub emulator_host: Option<String>,
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl SpannerSettings {
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

/// Platform service binding blob, as found in `VCAP_SERVICES`
#[derive(Debug, Deserialize)]
struct ServiceBinding {
    credentials: BindingCredentials,
}

#[derive(Debug, Default, Deserialize)]
struct BindingCredentials {
    hostname: Option<String>,
    port: Option<BindingPort>,
    project: Option<String>,
    instance: Option<String>,
    database: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BindingPort {
    Number(u16),
    Text(String),
}

impl BindingPort {
    fn as_string(&self) -> String {
        match self {
            BindingPort::Number(port) => port.to_string(),
            BindingPort::Text(port) => port.clone(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_port = lookup("PORT")
            .unwrap_or_else(|| "5000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number (0-65535)")?;

        let service_host = lookup("SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let debug = lookup("DEBUG")
            .map(|value| matches!(value.as_str(), "True" | "true" | "1"))
            .unwrap_or(false);

        let store = match lookup("STORE_BACKEND").as_deref() {
            None | Some("spanner") => StoreConfig::Spanner(spanner_settings(&lookup)?),
            Some("memory") => StoreConfig::Memory,
            Some(other) => bail!("STORE_BACKEND must be 'spanner' or 'memory', got '{}'", other),
        };

        Ok(Config {
            service_host,
            service_port,
            debug,
            store,
        })
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        match &self.store {
            StoreConfig::Memory => tracing::info!("  Store backend: in-memory"),
            StoreConfig::Spanner(spanner) => {
                tracing::info!("  Store backend: spanner");
                tracing::info!(
                    "  Spanner emulator: {}",
                    spanner
                        .emulator_host
                        .as_deref()
                        .unwrap_or("disabled (using production)")
                );
                tracing::info!("  Spanner database: {}", spanner.database_path());
            }
        }
        tracing::info!("  Debug: {}", self.debug);
        tracing::info!("  Service listening on: {}:{}", self.service_host, self.service_port);
    }
}

fn spanner_settings<F>(lookup: &F) -> Result<SpannerSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let binding = match lookup("VCAP_SERVICES") {
        Some(raw) => {
            tracing::info!("Using VCAP_SERVICES for Spanner credentials");
            Some(spanner_binding(&raw)?)
        }
        None => None,
    };

    let explicit_host = lookup("SPANNER_EMULATOR_HOST").or_else(|| {
        let host = lookup("SPANNER_HOST")?;
        let port = lookup("SPANNER_PORT").unwrap_or_else(|| "9010".to_string());
        Some(format!("{}:{}", host, port))
    });

    let emulator_host = match (explicit_host, &binding) {
        (Some(host), _) => Some(host),
        (None, Some(creds)) => creds.hostname.as_ref().map(|hostname| match &creds.port {
            Some(port) => format!("{}:{}", hostname, port.as_string()),
            None => hostname.clone(),
        }),
        (None, None) => Some(DEFAULT_EMULATOR_HOST.to_string()),
    };

    let creds = binding.unwrap_or_default();
    let required = |key: &str, bound: Option<String>| -> Result<String> {
        lookup(key)
            .or(bound)
            .with_context(|| format!("{} environment variable is required", key))
    };

    Ok(SpannerSettings {
        emulator_host,
        project: required("SPANNER_PROJECT", creds.project)?,
        instance: required("SPANNER_INSTANCE", creds.instance)?,
        database: required("SPANNER_DATABASE", creds.database)?,
    })
}

fn spanner_binding(raw: &str) -> Result<BindingCredentials> {
    let mut services: HashMap<String, Vec<ServiceBinding>> =
        serde_json::from_str(raw).context("VCAP_SERVICES is not valid JSON")?;

    services
        .remove("spanner")
        .and_then(|bindings| bindings.into_iter().next())
        .map(|binding| binding.credentials)
        .context("VCAP_SERVICES has no 'spanner' service binding")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SPANNER_PROJECT", "test-project"),
        ("SPANNER_INSTANCE", "test-instance"),
        ("SPANNER_DATABASE", "test-database"),
    ];

    fn spanner(config: &Config) -> &SpannerSettings {
        match &config.store {
            StoreConfig::Spanner(settings) => settings,
            other => panic!("expected spanner store, got {:?}", other),
        }
    }

    #[test]
    fn test_config_with_all_vars() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("SPANNER_EMULATOR_HOST", "emulator:9010"),
            ("PORT", "8080"),
            ("SERVICE_HOST", "127.0.0.1"),
            ("DEBUG", "True"),
        ]);

        let config = Config::from_lookup(lookup_from(&vars)).unwrap();

        assert_eq!(config.service_port, 8080);
        assert_eq!(config.service_host, "127.0.0.1");
        assert!(config.debug);
        let settings = spanner(&config);
        assert_eq!(settings.emulator_host.as_deref(), Some("emulator:9010"));
        assert_eq!(
            settings.database_path(),
            "projects/test-project/instances/test-instance/databases/test-database"
        );
    }

    #[test]
    fn test_config_with_defaults() {
        let config = Config::from_lookup(lookup_from(&REQUIRED)).unwrap();

        assert_eq!(config.service_port, 5000);
        assert_eq!(config.service_host, "0.0.0.0");
        assert!(!config.debug);
        assert_eq!(
            spanner(&config).emulator_host.as_deref(),
            Some(DEFAULT_EMULATOR_HOST)
        );
    }

    #[test]
    fn test_explicit_host_and_port() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([("SPANNER_HOST", "spanner"), ("SPANNER_PORT", "9020")]);

        let config = Config::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(spanner(&config).emulator_host.as_deref(), Some("spanner:9020"));
    }

    #[test]
    fn test_service_binding_supplies_credentials() {
        let vcap = r#"{"spanner":[{"credentials":{"project":"p","instance":"i","database":"d"}}]}"#;
        let config = Config::from_lookup(lookup_from(&[("VCAP_SERVICES", vcap)])).unwrap();

        let settings = spanner(&config);
        assert_eq!(settings.emulator_host, None);
        assert_eq!(settings.project, "p");
        assert_eq!(settings.instance, "i");
        assert_eq!(settings.database, "d");
    }

    #[test]
    fn test_service_binding_with_hostname_and_override() {
        let vcap = r#"{"spanner":[{"credentials":{"hostname":"bound","port":"9011","project":"p","instance":"i","database":"d"}}]}"#;
        let vars = [("VCAP_SERVICES", vcap), ("SPANNER_DATABASE", "override-db")];

        let config = Config::from_lookup(lookup_from(&vars)).unwrap();

        let settings = spanner(&config);
        assert_eq!(settings.emulator_host.as_deref(), Some("bound:9011"));
        assert_eq!(settings.database, "override-db");
    }

    #[test]
    fn test_service_binding_without_spanner() {
        let vars = [("VCAP_SERVICES", r#"{"rediscloud":[]}"#)];
        let error = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(error.to_string().contains("spanner"));
    }

    #[test]
    fn test_missing_required_var() {
        let vars = [
            ("SPANNER_PROJECT", "test-project"),
            ("SPANNER_INSTANCE", "test-instance"),
        ];

        let error = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(error.to_string().contains("SPANNER_DATABASE"));
    }

    #[test]
    fn test_memory_backend_needs_no_spanner_vars() {
        let config = Config::from_lookup(lookup_from(&[("STORE_BACKEND", "memory")])).unwrap();
        assert_eq!(config.store, StoreConfig::Memory);
    }

    #[test]
    fn test_unknown_backend() {
        let error = Config::from_lookup(lookup_from(&[("STORE_BACKEND", "redis")])).unwrap_err();
        assert!(error.to_string().contains("STORE_BACKEND"));
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "not-a-number"));

        let error = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(error.to_string().contains("PORT"));
    }

    #[test]
    fn test_port_out_of_range() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "99999"));

        assert!(Config::from_lookup(lookup_from(&vars)).is_err());
    }
}
