//! Configuration sources and the resolved [`Settings`].
//!
//! Every source is first turned into a [`ConfigLayer`] of optional values;
//! layers are stacked with [`ConfigLayer::or`] (CLI and process environment,
//! then `.env`, then TOML) and defaults are applied last.

#[cfg(feature = "cli")]
pub mod cli;
pub mod dotenv;
pub mod toml_config;

use crate::adapters::runtime::RuntimeHome;
use crate::core::endpoint::{FixedResolver, UdpProbeResolver, DEFAULT_PROBE_TARGET};
use crate::core::master::{build_master_url, MasterUrl};
use crate::core::report::ReportFormat;
use crate::domain::model::SessionConfig;
use crate::domain::ports::EndpointResolver;
use crate::utils::error::{Result, SmokeError};
use crate::utils::validation::{self, Validate};
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub use dotenv::DotEnv;
pub use toml_config::TomlConfig;

pub mod env_keys {
    pub const MASTER: &str = "SPARK_MASTER";
    pub const MASTER_IP: &str = "SPARK_MASTER_IP";
    pub const MASTER_API_PORT: &str = "SPARK_MASTER_API_PORT";
    pub const MASTER_UI_PORT: &str = "SPARK_MASTER_UI_PORT";
    pub const APP_NAME: &str = "SPARK_APP_NAME";
    pub const DRIVER_HOST: &str = "SPARK_DRIVER_HOST";
    pub const DRIVER_BIND_ADDRESS: &str = "SPARK_DRIVER_BIND_ADDRESS";
    pub const JAVA_HOME: &str = "JAVA_HOME";
}

pub const DEFAULT_APP_NAME: &str = "Spark Scalability Test";
pub const DEFAULT_BIND_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_MASTER_UI_PORT: u16 = 8080;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_DATASET_SIZE: i64 = 100_000;
pub const DEFAULT_PARTITIONS: usize = 10;
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

// 平方後不得溢位 i64
const MAX_DATASET_SIZE: i64 = 100_000_000;
const MAX_PARTITIONS: usize = 10_000;

/// One configuration source with every value optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigLayer {
    pub master: Option<String>,
    pub master_ip: Option<String>,
    pub master_port: Option<u16>,
    pub master_ui_port: Option<u16>,
    pub connect_timeout_secs: Option<u64>,
    pub app_name: Option<String>,
    pub console_progress: Option<bool>,
    pub driver_host: Option<String>,
    pub bind_address: Option<String>,
    pub probe_target: Option<String>,
    pub java_home: Option<PathBuf>,
    pub dataset_size: Option<i64>,
    pub partitions: Option<usize>,
    pub sample_size: Option<usize>,
    pub monitor: Option<bool>,
}

fn parse_value<T>(field: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| SmokeError::InvalidConfigValueError {
            field: field.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

impl ConfigLayer {
    /// Values from `self`, falling back to `fallback` field by field.
    ///
    /// The master endpoint is taken as a unit: once `self` names one (a URL or
    /// a host), neither the URL nor the host of `fallback` is used. A port alone
    /// still pairs with a host from below.
    pub fn or(self, fallback: ConfigLayer) -> ConfigLayer {
        let (master, master_ip) = if self.master.is_some() || self.master_ip.is_some() {
            (self.master, self.master_ip)
        } else {
            (fallback.master, fallback.master_ip)
        };

        ConfigLayer {
            master,
            master_ip,
            master_port: self.master_port.or(fallback.master_port),
            master_ui_port: self.master_ui_port.or(fallback.master_ui_port),
            connect_timeout_secs: self.connect_timeout_secs.or(fallback.connect_timeout_secs),
            app_name: self.app_name.or(fallback.app_name),
            console_progress: self.console_progress.or(fallback.console_progress),
            driver_host: self.driver_host.or(fallback.driver_host),
            bind_address: self.bind_address.or(fallback.bind_address),
            probe_target: self.probe_target.or(fallback.probe_target),
            java_home: self.java_home.or(fallback.java_home),
            dataset_size: self.dataset_size.or(fallback.dataset_size),
            partitions: self.partitions.or(fallback.partitions),
            sample_size: self.sample_size.or(fallback.sample_size),
            monitor: self.monitor.or(fallback.monitor),
        }
    }

    /// Builds a layer from environment-style variables (`.env` or process env).
    pub fn from_env_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(ConfigLayer {
            master: get(env_keys::MASTER),
            master_ip: get(env_keys::MASTER_IP),
            master_port: get(env_keys::MASTER_API_PORT)
                .map(|v| parse_value(env_keys::MASTER_API_PORT, &v))
                .transpose()?,
            master_ui_port: get(env_keys::MASTER_UI_PORT)
                .map(|v| parse_value(env_keys::MASTER_UI_PORT, &v))
                .transpose()?,
            app_name: get(env_keys::APP_NAME),
            driver_host: get(env_keys::DRIVER_HOST),
            bind_address: get(env_keys::DRIVER_BIND_ADDRESS),
            java_home: get(env_keys::JAVA_HOME).map(PathBuf::from),
            ..ConfigLayer::default()
        })
    }

    pub fn from_dotenv(env: &DotEnv) -> Result<Self> {
        Self::from_env_lookup(|key| env.get(key).map(str::to_string))
    }
}

/// Fully resolved configuration for one smoke run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub master: MasterUrl,
    pub app_name: String,
    pub console_progress: bool,
    pub driver_host: Option<Ipv4Addr>,
    pub bind_address: IpAddr,
    pub probe_target: SocketAddr,
    pub runtime_home: Option<RuntimeHome>,
    pub master_ui_port: Option<u16>,
    pub connect_timeout: Duration,
    pub dataset_size: i64,
    pub partitions: usize,
    pub sample_size: usize,
    pub report: Option<PathBuf>,
    pub monitor: bool,
}

impl Settings {
    pub fn from_layer(layer: ConfigLayer) -> Result<Self> {
        let master = resolve_master(&layer)?;

        let driver_host = layer
            .driver_host
            .as_deref()
            .map(|h| validation::validate_ipv4("driver.host", h))
            .transpose()?;

        let bind_address = match layer.bind_address.as_deref() {
            Some(raw) => parse_value::<IpAddr>("driver.bind_address", raw)?,
            None => DEFAULT_BIND_ADDRESS,
        };

        let probe_target = match layer.probe_target.as_deref() {
            Some(raw) => validation::validate_socket_addr("driver.probe_target", raw)?,
            None => DEFAULT_PROBE_TARGET,
        };

        // 本機模式不需要 Java runtime
        let runtime_home = match (&master, layer.java_home) {
            (MasterUrl::Local { .. }, _) => None,
            (_, Some(path)) => Some(RuntimeHome::new(path)),
            (_, None) => Some(RuntimeHome::platform_default()),
        };

        let master_ui_port = match layer.master_ui_port {
            Some(0) => None,
            Some(port) => Some(port),
            None => Some(DEFAULT_MASTER_UI_PORT),
        };

        let settings = Settings {
            master,
            app_name: layer
                .app_name
                .unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            console_progress: layer.console_progress.unwrap_or(true),
            driver_host,
            bind_address,
            probe_target,
            runtime_home,
            master_ui_port,
            connect_timeout: Duration::from_secs(
                layer
                    .connect_timeout_secs
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ),
            dataset_size: layer.dataset_size.unwrap_or(DEFAULT_DATASET_SIZE),
            partitions: layer.partitions.unwrap_or(DEFAULT_PARTITIONS),
            sample_size: layer.sample_size.unwrap_or(DEFAULT_SAMPLE_SIZE),
            report: None,
            monitor: layer.monitor.unwrap_or(false),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_report(mut self, report: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = &report {
            ReportFormat::from_path(path)?;
        }
        self.report = report;
        Ok(self)
    }

    /// Resolver for the driver host: the configured address, or a UDP probe.
    pub fn resolver(&self) -> Box<dyn EndpointResolver> {
        match self.driver_host {
            Some(ip) => Box::new(FixedResolver(ip)),
            None => Box::new(UdpProbeResolver::new(self.probe_target)),
        }
    }

    pub fn session_config(&self, driver_host: Ipv4Addr) -> SessionConfig {
        SessionConfig {
            master: self.master.clone(),
            app_name: self.app_name.clone(),
            console_progress: self.console_progress,
            driver_host,
            driver_bind_address: self.bind_address,
            runtime_home: self.runtime_home.as_ref().map(|h| h.path().to_path_buf()),
            master_ui_port: self.master_ui_port,
            connect_timeout: self.connect_timeout,
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("app.name", &self.app_name)?;
        validation::validate_range("job.dataset_size", self.dataset_size, 1, MAX_DATASET_SIZE)?;
        validation::validate_range("job.partitions", self.partitions, 1, MAX_PARTITIONS)?;
        validation::validate_range(
            "master.connect_timeout_seconds",
            self.connect_timeout.as_secs(),
            1,
            300,
        )?;
        Ok(())
    }
}

fn resolve_master(layer: &ConfigLayer) -> Result<MasterUrl> {
    if let Some(url) = &layer.master {
        return MasterUrl::parse(url);
    }

    let host = validation::validate_required_field(env_keys::MASTER_IP, &layer.master_ip)
        .map_err(|_| SmokeError::MissingConfigError {
            field: format!(
                "{} (or {} with {})",
                env_keys::MASTER,
                env_keys::MASTER_IP,
                env_keys::MASTER_API_PORT
            ),
        })?;
    validation::validate_host(env_keys::MASTER_IP, host)?;
    let port = validation::validate_required_field(env_keys::MASTER_API_PORT, &layer.master_port)?;

    MasterUrl::parse(&build_master_url(host, *port))
}

#[cfg(feature = "cli")]
pub use cli::CliArgs;

#[cfg(feature = "cli")]
impl Settings {
    /// Stacks CLI/process env over `.env` over TOML.
    pub fn load(args: &CliArgs) -> Result<Self> {
        let dotenv = match &args.env_file {
            Some(path) => DotEnv::from_file(path)?,
            None => DotEnv::from_optional_file(".env")?,
        };

        let toml_layer = match &args.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                let config = TomlConfig::from_file(path)?;
                config.validate()?;
                config.to_layer()
            }
            None => ConfigLayer::default(),
        };

        let layer = args
            .to_layer()
            .or(ConfigLayer::from_dotenv(&dotenv)?)
            .or(toml_layer);

        Settings::from_layer(layer)?.with_report(args.report.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_layer(vars: &[(&str, &str)]) -> ConfigLayer {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigLayer::from_env_lookup(|key| map.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_master_url_from_ip_and_port() {
        let layer = env_layer(&[("SPARK_MASTER_IP", "10.0.0.5"), ("SPARK_MASTER_API_PORT", "7077")]);
        let settings = Settings::from_layer(layer).unwrap();
        assert_eq!(settings.master.to_string(), "spark://10.0.0.5:7077");
    }

    #[test]
    fn test_defaults() {
        let layer = ConfigLayer {
            master: Some("local[*]".to_string()),
            ..ConfigLayer::default()
        };
        let settings = Settings::from_layer(layer).unwrap();

        assert_eq!(settings.app_name, DEFAULT_APP_NAME);
        assert!(settings.console_progress);
        assert_eq!(settings.bind_address.to_string(), "0.0.0.0");
        assert_eq!(settings.probe_target, DEFAULT_PROBE_TARGET);
        assert_eq!(settings.dataset_size, 100_000);
        assert_eq!(settings.partitions, 10);
        assert_eq!(settings.sample_size, 10);
        assert_eq!(settings.master_ui_port, Some(8080));
        assert!(settings.runtime_home.is_none());
        assert!(settings.driver_host.is_none());
    }

    #[test]
    fn test_missing_master_port() {
        let layer = env_layer(&[("SPARK_MASTER_IP", "10.0.0.5")]);
        let err = Settings::from_layer(layer).unwrap_err();
        assert!(
            matches!(err, SmokeError::MissingConfigError { ref field } if field == "SPARK_MASTER_API_PORT")
        );
    }

    #[test]
    fn test_missing_master_entirely() {
        let err = Settings::from_layer(ConfigLayer::default()).unwrap_err();
        assert!(matches!(err, SmokeError::MissingConfigError { .. }));
    }

    #[test]
    fn test_bad_port_in_env() {
        let map: HashMap<String, String> =
            [("SPARK_MASTER_API_PORT".to_string(), "seven".to_string())].into();
        let err = ConfigLayer::from_env_lookup(|key| map.get(key).cloned()).unwrap_err();
        assert!(matches!(err, SmokeError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_layer_precedence() {
        let cli = ConfigLayer {
            master_ip: Some("10.0.0.9".to_string()),
            ..ConfigLayer::default()
        };
        let dotenv = env_layer(&[
            ("SPARK_MASTER_IP", "10.0.0.5"),
            ("SPARK_MASTER_API_PORT", "7077"),
        ]);
        let toml = ConfigLayer {
            master_port: Some(9999),
            app_name: Some("from toml".to_string()),
            ..ConfigLayer::default()
        };

        let settings = Settings::from_layer(cli.or(dotenv).or(toml)).unwrap();
        assert_eq!(settings.master.to_string(), "spark://10.0.0.9:7077");
        assert_eq!(settings.app_name, "from toml");
    }

    #[test]
    fn test_higher_host_hides_lower_master_url() {
        let cli = ConfigLayer {
            master_ip: Some("10.0.0.9".to_string()),
            master_port: Some(7077),
            ..ConfigLayer::default()
        };
        let toml = ConfigLayer {
            master: Some("local[2]".to_string()),
            ..ConfigLayer::default()
        };
        let settings = Settings::from_layer(cli.or(toml)).unwrap();
        assert_eq!(settings.master.to_string(), "spark://10.0.0.9:7077");

        // URL above a host/port pair wins the same way
        let cli = ConfigLayer {
            master: Some("local".to_string()),
            ..ConfigLayer::default()
        };
        let dotenv = env_layer(&[
            ("SPARK_MASTER_IP", "10.0.0.5"),
            ("SPARK_MASTER_API_PORT", "7077"),
        ]);
        let merged = cli.or(dotenv);
        assert_eq!(merged.master_ip, None);
        assert!(Settings::from_layer(merged).unwrap().master.is_local());
    }

    #[test]
    fn test_ipv6_master_ip() {
        let layer = env_layer(&[("SPARK_MASTER_IP", "::1"), ("SPARK_MASTER_API_PORT", "7077")]);
        let settings = Settings::from_layer(layer).unwrap();
        assert_eq!(settings.master, MasterUrl::standalone("::1", 7077));
        assert_eq!(settings.master.to_string(), "spark://[::1]:7077");
    }

    #[test]
    fn test_explicit_master_wins_over_ip_and_port() {
        let layer = ConfigLayer {
            master: Some("local[2]".to_string()),
            master_ip: Some("10.0.0.5".to_string()),
            master_port: Some(7077),
            ..ConfigLayer::default()
        };
        assert!(Settings::from_layer(layer).unwrap().master.is_local());
    }

    #[test]
    fn test_runtime_home_for_standalone() {
        let layer = ConfigLayer {
            master: Some("spark://10.0.0.5:7077".to_string()),
            java_home: Some(PathBuf::from("/opt/jdk-22")),
            ..ConfigLayer::default()
        };
        let settings = Settings::from_layer(layer).unwrap();
        let config = settings.session_config(Ipv4Addr::new(10, 0, 0, 20));
        assert_eq!(config.runtime_home, Some(PathBuf::from("/opt/jdk-22")));

        let layer = ConfigLayer {
            master: Some("spark://10.0.0.5:7077".to_string()),
            ..ConfigLayer::default()
        };
        assert_eq!(
            Settings::from_layer(layer).unwrap().runtime_home,
            Some(RuntimeHome::platform_default())
        );
    }

    #[test]
    fn test_driver_host_override_uses_fixed_resolver() {
        let layer = ConfigLayer {
            master: Some("local".to_string()),
            driver_host: Some("192.168.50.7".to_string()),
            ..ConfigLayer::default()
        };
        let settings = Settings::from_layer(layer).unwrap();
        assert_eq!(
            settings.resolver().resolve().unwrap(),
            Ipv4Addr::new(192, 168, 50, 7)
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        for layer in [
            ConfigLayer {
                driver_host: Some("not-an-ip".to_string()),
                ..ConfigLayer::default()
            },
            ConfigLayer {
                partitions: Some(0),
                ..ConfigLayer::default()
            },
            ConfigLayer {
                dataset_size: Some(-1),
                ..ConfigLayer::default()
            },
            ConfigLayer {
                bind_address: Some("0.0.0".to_string()),
                ..ConfigLayer::default()
            },
            ConfigLayer {
                connect_timeout_secs: Some(0),
                ..ConfigLayer::default()
            },
        ] {
            let layer = layer.or(ConfigLayer {
                master: Some("local".to_string()),
                ..ConfigLayer::default()
            });
            assert!(Settings::from_layer(layer).is_err());
        }
    }

    #[test]
    fn test_session_options() {
        let layer = env_layer(&[("SPARK_MASTER_IP", "10.0.0.5"), ("SPARK_MASTER_API_PORT", "7077")]);
        let settings = Settings::from_layer(layer).unwrap();
        let options = settings.session_config(Ipv4Addr::new(10, 0, 0, 20)).options();

        let get = |key: &str| {
            options
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("spark.master"), Some("spark://10.0.0.5:7077"));
        assert_eq!(get("spark.app.name"), Some("Spark Scalability Test"));
        assert_eq!(get("spark.ui.showConsoleProgress"), Some("true"));
        assert_eq!(get("spark.driver.host"), Some("10.0.0.20"));
        assert_eq!(get("spark.driver.bindAddress"), Some("0.0.0.0"));
    }

    #[test]
    fn test_report_extension_checked() {
        let settings = Settings::from_layer(ConfigLayer {
            master: Some("local".to_string()),
            ..ConfigLayer::default()
        })
        .unwrap();
        assert!(settings
            .clone()
            .with_report(Some(PathBuf::from("run.json")))
            .is_ok());
        assert!(settings.with_report(Some(PathBuf::from("run.xml"))).is_err());
    }
}
