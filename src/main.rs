use clap::Parser;
use spark_smoke::utils::error::ErrorSeverity;
use spark_smoke::utils::logger;
use spark_smoke::{engine_for, CliArgs, Settings, SmokeError, SmokeTest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose, args.log_format);

    tracing::info!("Starting spark-smoke v{}", env!("CARGO_PKG_VERSION"));
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let settings = match Settings::load(&args) {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };

    if args.dry_run {
        print_settings(&settings);
        tracing::info!("🔍 DRY RUN MODE - no session will be opened");
        return Ok(());
    }

    if settings.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let engine = engine_for(&settings.master);
    let resolver = settings.resolver();
    let monitor_enabled = settings.monitor;
    let smoke = SmokeTest::new_with_monitoring(engine, resolver, settings, monitor_enabled);

    match smoke.run().await {
        Ok(report) => {
            tracing::info!(
                "✅ {} results collected from {} partitions in {}ms",
                report.total,
                report.partitions.len(),
                report.elapsed_ms
            );
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn print_settings(settings: &Settings) {
    match settings.driver_host {
        Some(ip) => println!("Driver host (configured): {}", ip),
        None => println!("Driver host: detect via {}", settings.probe_target),
    }
    println!("Spark master URL: {}", settings.master);
    println!("Application: {}", settings.app_name);
    println!("Bind address: {}", settings.bind_address);
    println!(
        "Job: {} elements in {} partitions",
        settings.dataset_size, settings.partitions
    );
    if let Some(home) = &settings.runtime_home {
        println!("Java runtime: {}", home.path().display());
    }
}

fn exit_with(e: &SmokeError) -> ! {
    tracing::error!(
        "❌ Smoke test failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    if let Some(source) = std::error::Error::source(e) {
        tracing::debug!("caused by: {}", source);
    }

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 依錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}

