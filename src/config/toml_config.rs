use crate::config::ConfigLayer;
use crate::utils::error::{Result, SmokeError};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub master: MasterSection,
    #[serde(default)]
    pub driver: DriverSection,
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub job: JobSection,
    #[serde(default)]
    pub runtime: RuntimeSection,
    #[serde(default)]
    pub monitoring: MonitoringSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MasterSection {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub ui_port: Option<u16>,
    pub connect_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverSection {
    pub host: Option<String>,
    pub bind_address: Option<String>,
    pub probe_target: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    pub name: Option<String>,
    pub show_console_progress: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSection {
    pub dataset_size: Option<i64>,
    pub partitions: Option<usize>,
    pub sample_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeSection {
    pub java_home: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitoringSection {
    pub enabled: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::from_toml_str_with(content, |name| std::env::var(name).ok())
    }

    /// 同上，但由 `lookup` 提供 `${VAR}` 的值
    pub fn from_toml_str_with<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let processed_content = Self::substitute_env_vars(content, lookup)?;

        toml::from_str(&processed_content).map_err(|e| SmokeError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SPARK_MASTER_IP})，未設定的變數保持原樣
    fn substitute_env_vars<F>(content: &str, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SmokeError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn to_layer(&self) -> ConfigLayer {
        ConfigLayer {
            master: self.master.url.clone(),
            master_ip: self.master.host.clone(),
            master_port: self.master.port,
            master_ui_port: self.master.ui_port,
            connect_timeout_secs: self.master.connect_timeout_seconds,
            app_name: self.app.name.clone(),
            console_progress: self.app.show_console_progress,
            driver_host: self.driver.host.clone(),
            bind_address: self.driver.bind_address.clone(),
            probe_target: self.driver.probe_target.clone(),
            java_home: self.runtime.java_home.clone(),
            dataset_size: self.job.dataset_size,
            partitions: self.job.partitions,
            sample_size: self.job.sample_size,
            monitor: self.monitoring.enabled,
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(host) = &self.master.host {
            crate::utils::validation::validate_host("master.host", host)?;
        }
        if let Some(partitions) = self.job.partitions {
            crate::utils::validation::validate_positive_number("job.partitions", partitions, 1)?;
        }
        if let Some(addr) = &self.driver.probe_target {
            crate::utils::validation::validate_socket_addr("driver.probe_target", addr)?;
        }
        Ok(())
    }
}
