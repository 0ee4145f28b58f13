use crate::core::analyzer::PublicationTrendAnalyzer;
use crate::domain::model::TrendReport;
use crate::domain::ports::PublicationSource;
use crate::utils::error::Result;

pub struct TrendEngine<S: PublicationSource> {
    source: S,
    analyzer: PublicationTrendAnalyzer,
}

impl<S: PublicationSource> TrendEngine<S> {
    pub fn new(source: S, analyzer: PublicationTrendAnalyzer) -> Self {
        Self { source, analyzer }
    }

    pub fn analyzer(&self) -> &PublicationTrendAnalyzer {
        &self.analyzer
    }

    pub async fn run(&self) -> Result<TrendReport> {
        tracing::info!("Fetching publications...");
        let publications = self.source.fetch_publications().await?;
        tracing::info!("Fetched {} publications", publications.len());

        tracing::info!(
            "Analyzing publication history up to {}",
            self.analyzer.current_year()
        );
        let report = self.analyzer.report(&publications);

        if report.skipped > 0 {
            tracing::warn!(
                "{} publications were left out (unparseable or future-dated year)",
                report.skipped
            );
        }
        tracing::info!(
            "Predicted {} publications next year, trend {} ({:+.2}/year)",
            report.predicted_next_year,
            report.trend,
            report.growth
        );

        Ok(report)
    }
}
