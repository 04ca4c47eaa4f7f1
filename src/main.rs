use clap::Parser;
use fakenews_etl::utils::logger;
use fakenews_etl::{run_stages, CliConfig, EtlError, LocalStorage};

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting fakenews-etl ({:?})", cli.command);
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let params = match cli.load_params() {
        Ok(params) => params,
        Err(e) => exit_with(e),
    };

    let monitor_enabled = cli.monitor_enabled(&params);
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 輸出目錄由 LocalStorage 在第一次寫入時建立，設定錯誤時不留下任何目錄
    let storage = LocalStorage::new(params.output_dir());

    match run_stages(cli.command.stages(), &storage, &params, monitor_enabled) {
        Ok(outputs) => {
            for output in &outputs {
                println!("📁 {}", output);
            }
            tracing::info!("✅ Pipeline completed successfully!");
            println!("✅ Pipeline completed successfully!");
            Ok(())
        }
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: EtlError) -> ! {
    tracing::error!(
        "❌ Pipeline failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    std::process::exit(e.severity().exit_code())
}
