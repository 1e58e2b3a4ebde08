use clap::Parser;
use docfill_etl::utils::error::ErrorSeverity;
use docfill_etl::utils::{logger, validation::Validate};
use docfill_etl::{CliConfig, DocumentPipeline, EtlEngine, GeneratorConfig, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting docfill-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let generator = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading layout from: {}", path);
            let generator = GeneratorConfig::from_file(path)?;
            generator.validate()?;
            generator
        }
        None => GeneratorConfig::default(),
    };

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // Inputs are read from the paths as given; outputs land under --output.
    let input = LocalStorage::new(String::new());
    let output = LocalStorage::new(config.output.clone());
    let bundle = config.zip;
    let pipeline = DocumentPipeline::new(input, output, config, generator).with_bundle(bundle);

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            println!("✅ Generated {} document(s)", summary.written.len());
            println!("📁 Output saved to: {}", summary.output_path);
            for failure in &summary.failed {
                eprintln!("⚠️  {}: {}", failure.institution, failure.message);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
