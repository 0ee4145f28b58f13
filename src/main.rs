use clap::Parser;
use pubtrend::config::{LogFormat, OutputFormat, Settings, SourceSettings};
use pubtrend::domain::ports::CredentialStore;
use pubtrend::utils::{logger, validation::Validate};
use pubtrend::{
    ApiClient, ApiPublicationSource, CliConfig, FileSession, InMemorySession, JsonFileSource,
    PublicationTrendAnalyzer, TrendEngine, TrendError, TrendReport,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    match config.log_format {
        LogFormat::Text => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(config.verbose),
    }
    tracing::info!("Starting pubtrend");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    match run(&config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!(
                "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.severity().exit_code());
        }
    }
}

async fn run(config: &CliConfig) -> Result<(), TrendError> {
    config.validate()?;
    let toml = config.load_toml()?;
    let settings = config.resolve(toml.as_ref())?;

    let analyzer = match settings.current_year {
        Some(year) => PublicationTrendAnalyzer::with_current_year(year),
        None => PublicationTrendAnalyzer::new(),
    };

    let report = match &settings.source {
        SourceSettings::File(path) => {
            TrendEngine::new(JsonFileSource::new(path), analyzer).run().await?
        }
        SourceSettings::Api {
            base_url,
            timeout,
            scope,
        } => {
            let session = open_session(&settings)?;
            let client = ApiClient::new(base_url.clone(), session).with_timeout(*timeout)?;
            if let Some(dir) = &settings.report_dir {
                let saved = client.download_report(scope, dir).await?;
                println!("📄 Report saved to: {}", saved.display());
            }
            let source = ApiPublicationSource::new(client, scope.clone());
            TrendEngine::new(source, analyzer).run().await?
        }
    };

    print_report(&report, settings.format)
}

fn open_session(settings: &Settings) -> Result<Arc<dyn CredentialStore>, TrendError> {
    match &settings.session_file {
        Some(path) => {
            let session = FileSession::load(path)?;
            session.merge(settings.access_token.clone(), settings.refresh_token.clone())?;
            tracing::debug!("Using session file {}", session.path().display());
            Ok(Arc::new(session))
        }
        None => Ok(Arc::new(InMemorySession::new(
            settings.access_token.clone(),
            settings.refresh_token.clone(),
        ))),
    }
}

fn print_report(report: &TrendReport, format: OutputFormat) -> Result<(), TrendError> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => println!("{}", report),
    }
    Ok(())
}
