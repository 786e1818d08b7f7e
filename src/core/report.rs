use crate::domain::model::{ClusterStatus, ExecutionLocation, PartitionStat};
use crate::utils::error::{Result, SmokeError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::net::Ipv4Addr;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

impl ReportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ReportFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(ReportFormat::Csv),
            _ => Err(SmokeError::InvalidConfigValueError {
                field: "report".to_string(),
                value: path.display().to_string(),
                reason: "Report file must end in .json or .csv".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub app_name: String,
    pub driver_host: Ipv4Addr,
    pub master_url: String,
    pub engine: String,
    pub execution: ExecutionLocation,
    pub cluster: Option<ClusterStatus>,
    pub sample: Vec<i64>,
    pub total: usize,
    pub partitions: Vec<PartitionStat>,
    pub elapsed_ms: u64,
    pub completed_at: DateTime<Utc>,
}

impl JobReport {
    /// The result lines printed after a run: the sample, then the count.
    pub fn result_lines(&self) -> [String; 2] {
        [
            format!("{:?}", self.sample),
            format!("Total results: {}", self.total),
        ]
    }

    pub fn print_results<W: Write>(&self, out: &mut W) -> Result<()> {
        for line in self.result_lines() {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        match ReportFormat::from_path(path)? {
            ReportFormat::Json => {
                let json = serde_json::to_string_pretty(self)?;
                std::fs::write(path, json)?;
            }
            // CSV 只輸出各分區統計
            ReportFormat::Csv => {
                let mut writer = csv::Writer::from_path(path)?;
                for stat in &self.partitions {
                    writer.serialize(stat)?;
                }
                writer.flush()?;
            }
        }

        tracing::debug!("Report written to {}", path.display());
        Ok(())
    }
}
