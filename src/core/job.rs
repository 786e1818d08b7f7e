use crate::config::Settings;
use crate::core::report::JobReport;
use crate::domain::model::MapJob;
use crate::domain::ports::{ComputeEngine, EndpointResolver};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::Utc;
use std::io::Write;
use std::time::Instant;

/// Drives one smoke run: resolve the driver address, open a session, square
/// the sample dataset across partitions, report and release the session.
pub struct SmokeTest {
    engine: Box<dyn ComputeEngine>,
    resolver: Box<dyn EndpointResolver>,
    settings: Settings,
    monitor: SystemMonitor,
}

impl SmokeTest {
    pub fn new(
        engine: Box<dyn ComputeEngine>,
        resolver: Box<dyn EndpointResolver>,
        settings: Settings,
    ) -> Self {
        Self::new_with_monitoring(engine, resolver, settings, false)
    }

    pub fn new_with_monitoring(
        engine: Box<dyn ComputeEngine>,
        resolver: Box<dyn EndpointResolver>,
        settings: Settings,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            engine,
            resolver,
            settings,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<JobReport> {
        let mut stdout = std::io::stdout();
        self.run_with_output(&mut stdout).await
    }

    pub async fn run_with_output<W: Write>(&self, out: &mut W) -> Result<JobReport> {
        let started = Instant::now();

        let driver_host = self.resolver.resolve()?;
        writeln!(out, "Detected driver IP: {}", driver_host)?;

        let config = self.settings.session_config(driver_host);
        writeln!(out, "Spark master URL: {}", config.master)?;
        for (key, value) in config.options() {
            tracing::debug!("session option {} = {}", key, value);
        }

        self.monitor.log_stats("Session setup");
        tracing::info!(
            "🔌 Requesting session '{}' from {} engine",
            config.app_name,
            self.engine.name()
        );
        let mut session = self.engine.get_or_create(&config).await?;
        let info = session.info();
        tracing::info!("✅ Session ready on {} ({})", info.master, info.execution);

        let job = MapJob::squares(self.settings.dataset_size, self.settings.partitions);
        tracing::info!(
            "🚀 Submitting map over {} elements in {} partitions",
            job.len(),
            job.num_slices
        );

        let outcome = match session.map_collect(&job).await {
            Ok(output) => {
                self.monitor.log_stats("Collect");
                let report = JobReport {
                    app_name: info.app_name.clone(),
                    driver_host,
                    master_url: info.master.clone(),
                    engine: info.engine.clone(),
                    execution: info.execution,
                    cluster: info.cluster.clone(),
                    sample: output
                        .values
                        .iter()
                        .take(self.settings.sample_size)
                        .copied()
                        .collect(),
                    total: output.values.len(),
                    partitions: output.partitions,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                    completed_at: Utc::now(),
                };
                report.print_results(out).map(|_| report)
            }
            Err(e) => Err(e),
        };

        // 不論工作成敗都要釋放 session，工作錯誤優先回報
        let stopped = session.stop().await;
        let report = match (outcome, stopped) {
            (Ok(report), Ok(())) => report,
            (Ok(_), Err(stop_err)) => return Err(stop_err),
            (Err(job_err), Err(stop_err)) => {
                tracing::warn!("Failed to stop session after job error: {}", stop_err);
                return Err(job_err);
            }
            (Err(job_err), Ok(())) => return Err(job_err),
        };

        if let Some(path) = &self.settings.report {
            report.write_to(path)?;
            tracing::info!("📁 Report saved to: {}", path.display());
        }

        writeln!(out, "Job completed successfully.")?;
        self.monitor.log_final_stats();
        Ok(report)
    }
}
