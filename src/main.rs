use anyhow::Context;
use certificate_qr::core::ConfigProvider;
use certificate_qr::utils::error::{CertError, ErrorSeverity};
use certificate_qr::utils::{logger, validation::Validate};
use certificate_qr::{CertificateEngine, CliArgs};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting certificate-qr");

    let settings = match args.into_settings() {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };
    tracing::debug!("Effective settings: {:?}", settings);

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    // 字型與 HTTP client 在處理任何記錄前建立
    let engine = match CertificateEngine::from_config(&settings) {
        Ok(engine) => engine.with_monitoring(settings.monitor),
        Err(e) => exit_with(&e),
    };

    match engine.run(settings.input_file()).await {
        Ok(report) => {
            if let Some(path) = &settings.summary {
                let json = serde_json::to_string_pretty(&report)?;
                std::fs::write(path, json)
                    .with_context(|| format!("failed to write run summary to {}", path))?;
                tracing::info!("📝 Run summary saved to: {}", path);
            }

            tracing::info!("✅ Certificate generation completed successfully!");
            println!(
                "✅ {} certificate(s) saved to: {}",
                report.files_on_disk(),
                settings.output_folder()
            );
            if !report.skipped.is_empty() {
                println!("⏭️ {} record(s) skipped", report.skipped.len());
            }
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn exit_with(e: &CertError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Certificate generation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Critical => 3,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High | ErrorSeverity::Low => 1,
    };
    std::process::exit(exit_code);
}
