use crate::domain::model::{PublicationRecord, Trend, TrendReport, TrendResult, YearBuckets};
use chrono::Datelike;

/// Average year-over-year change above which activity counts as growing
/// (and below the negated value, declining).
pub const TREND_THRESHOLD: f64 = 0.1;

/// Number of most recent year-over-year deltas averaged for the projection.
pub const RECENT_WINDOW: usize = 2;

/// Next-year publication forecasting over a user's publication history.
///
/// Every call recomputes from the records passed in; the only state is the
/// cutoff year used to drop future-dated entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationTrendAnalyzer {
    current_year: i32,
}

impl Default for PublicationTrendAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PublicationTrendAnalyzer {
    pub fn new() -> Self {
        Self {
            current_year: chrono::Local::now().year(),
        }
    }

    pub fn with_current_year(current_year: i32) -> Self {
        Self { current_year }
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// Groups records by parsed year, dropping unparseable and future years.
    pub fn bucket_by_year(&self, publications: &[PublicationRecord]) -> YearBuckets {
        let mut buckets = YearBuckets::default();

        for publication in publications {
            match publication.parsed_year() {
                None => buckets.skipped_unparseable += 1,
                Some(year) if year > self.current_year => buckets.skipped_future += 1,
                Some(year) => buckets.add(year),
            }
        }

        tracing::debug!(
            "Bucketed {} publications into {} years (skipped {} unparseable, {} future)",
            buckets.total,
            buckets.len(),
            buckets.skipped_unparseable,
            buckets.skipped_future
        );
        tracing::debug!("Grouped by year: {:?}", buckets.counts);

        buckets
    }

    /// Expected publication count for the year after the latest observed one.
    pub fn predict_next_year(&self, publications: &[PublicationRecord]) -> u32 {
        let buckets = self.bucket_by_year(publications);
        predict_from_buckets(&buckets)
    }

    pub fn analyze_trend(&self, publications: &[PublicationRecord]) -> TrendResult {
        let buckets = self.bucket_by_year(publications);
        trend_from_buckets(&buckets)
    }

    /// Least-squares line through (year, count) evaluated one year past the
    /// latest observed year. Not floored at zero.
    pub fn predict_with_linear_regression(&self, publications: &[PublicationRecord]) -> i64 {
        let buckets = self.bucket_by_year(publications);
        regression_from_buckets(&buckets)
    }

    pub fn report(&self, publications: &[PublicationRecord]) -> TrendReport {
        let buckets = self.bucket_by_year(publications);
        let TrendResult { trend, growth } = trend_from_buckets(&buckets);

        TrendReport {
            current_year: self.current_year,
            predicted_next_year: predict_from_buckets(&buckets),
            regression_estimate: regression_from_buckets(&buckets),
            trend,
            growth,
            total: buckets.total,
            skipped: buckets.skipped(),
            buckets: buckets.counts,
        }
    }
}

/// `Math.round` semantics: halves round toward positive infinity.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn recent_average_change(buckets: &YearBuckets) -> Option<f64> {
    let deltas = buckets.deltas();
    if deltas.is_empty() {
        return None;
    }

    let recent = &deltas[deltas.len().saturating_sub(RECENT_WINDOW)..];
    let sum: i64 = recent.iter().sum();
    Some(sum as f64 / recent.len() as f64)
}

fn predict_from_buckets(buckets: &YearBuckets) -> u32 {
    let (Some(avg_change), Some((latest_year, latest_count))) =
        (recent_average_change(buckets), buckets.latest())
    else {
        // Zero or one year of history: average per year, which is just the total.
        let years = buckets.len().max(1);
        let prediction = round_half_up(buckets.total as f64 / years as f64);
        tracing::debug!("Not enough history, predicting average: {}", prediction);
        return prediction as u32;
    };

    let prediction = round_half_up(latest_count as f64 + avg_change).max(0.0);
    tracing::debug!(
        "Latest year {} had {} publications, average recent change {:.2}, predicting {}",
        latest_year,
        latest_count,
        avg_change,
        prediction
    );

    prediction as u32
}

fn trend_from_buckets(buckets: &YearBuckets) -> TrendResult {
    let Some(avg_change) = recent_average_change(buckets) else {
        return TrendResult::stable();
    };

    let trend = if avg_change > TREND_THRESHOLD {
        Trend::Growing
    } else if avg_change < -TREND_THRESHOLD {
        Trend::Declining
    } else {
        Trend::Stable
    };

    tracing::debug!("Trend analysis: {} (growth {:.2})", trend, avg_change);

    TrendResult {
        trend,
        growth: avg_change,
    }
}

fn regression_from_buckets(buckets: &YearBuckets) -> i64 {
    if buckets.len() < 2 {
        return buckets.latest().map(|(_, count)| count as i64).unwrap_or(0);
    }

    let n = buckets.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (&year, &count) in &buckets.counts {
        let (x, y) = (f64::from(year), count as f64);
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;

    let next_year = buckets.latest().map(|(year, _)| year + 1).unwrap_or_default();
    round_half_up(slope * f64::from(next_year) + intercept) as i64
}
