use crate::config::{env_keys, ConfigLayer};
use crate::utils::logger::LogFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "spark-smoke")]
#[command(version)]
#[command(about = "Checks cluster connectivity and runs a small partitioned map job")]
pub struct CliArgs {
    /// Full master URL (spark://HOST:PORT, local, local[N], local[*])
    #[arg(long, env = env_keys::MASTER)]
    pub master: Option<String>,

    /// Master host, combined with --master-port when --master is not given
    #[arg(long, env = env_keys::MASTER_IP)]
    pub master_ip: Option<String>,

    #[arg(long, env = env_keys::MASTER_API_PORT)]
    pub master_port: Option<u16>,

    /// Master web UI port used to read cluster status (0 disables)
    #[arg(long, env = env_keys::MASTER_UI_PORT)]
    pub master_ui_port: Option<u16>,

    /// Seconds to wait for the master to answer
    #[arg(long)]
    pub connect_timeout: Option<u64>,

    #[arg(long, env = env_keys::APP_NAME)]
    pub app_name: Option<String>,

    /// Disable per-partition progress output
    #[arg(long)]
    pub no_progress: bool,

    /// Address advertised to workers; skips local address detection
    #[arg(long, env = env_keys::DRIVER_HOST)]
    pub driver_host: Option<String>,

    #[arg(long, env = env_keys::DRIVER_BIND_ADDRESS)]
    pub bind_address: Option<String>,

    /// IP:PORT used to pick the outbound interface
    #[arg(long)]
    pub probe_target: Option<String>,

    #[arg(long, env = env_keys::JAVA_HOME)]
    pub java_home: Option<PathBuf>,

    /// .env file to read (defaults to ./.env when present)
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub dataset_size: Option<i64>,

    #[arg(long)]
    pub partitions: Option<usize>,

    /// Number of leading results to print
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Write a .json or .csv report
    #[arg(long)]
    pub report: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    /// Resolve and print the configuration without opening a session
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn to_layer(&self) -> ConfigLayer {
        ConfigLayer {
            master: self.master.clone(),
            master_ip: self.master_ip.clone(),
            master_port: self.master_port,
            master_ui_port: self.master_ui_port,
            connect_timeout_secs: self.connect_timeout,
            app_name: self.app_name.clone(),
            console_progress: self.no_progress.then_some(false),
            driver_host: self.driver_host.clone(),
            bind_address: self.bind_address.clone(),
            probe_target: self.probe_target.clone(),
            java_home: self.java_home.clone(),
            dataset_size: self.dataset_size,
            partitions: self.partitions,
            sample_size: self.sample_size,
            monitor: self.monitor.then_some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_to_layer() {
        let args = CliArgs::try_parse_from([
            "spark-smoke",
            "--master",
            "local[2]",
            "--no-progress",
            "--partitions",
            "4",
            "--report",
            "out/run.json",
        ])
        .unwrap();

        let layer = args.to_layer();
        assert_eq!(layer.master.as_deref(), Some("local[2]"));
        assert_eq!(layer.console_progress, Some(false));
        assert_eq!(layer.partitions, Some(4));
        assert_eq!(layer.monitor, None);
        assert_eq!(args.report, Some(PathBuf::from("out/run.json")));
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(CliArgs::try_parse_from(["spark-smoke", "--master-port", "99999"]).is_err());
    }
}
