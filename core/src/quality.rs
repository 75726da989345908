//! Data-quality findings. Advisory only.
//!
//! Nothing here fails or blocks a forecast. The report travels alongside
//! the forecast so the presentation layer can show what was imputed and
//! what may make the projection less reliable.

use crate::{
    arithmetic::{round_to, safe_divide},
    record::KeywordRecord,
};
use serde::{Deserialize, Serialize};

/// Average position above which the report flags weak rankings.
pub const HIGH_AVG_POSITION: f64 = 50.0;
/// Keywords below this volume are flagged as very low volume.
pub const LOW_VOLUME: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_keywords: usize,
    pub avg_position:   f64,
    pub total_clicks:   u64,
    pub total_volume:   u64,
    pub avg_difficulty: f64,
    /// clamp(100 − avg_position / 10, 0, 100).
    pub quality_score:  f64,
    pub rows_imputed:   usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub summary:         String,
    /// Rows touched by at least one finding.
    pub affected_rows:   usize,
    pub issues:          Vec<String>,
    pub recommendations: Vec<String>,
}

pub fn summarize(records: &[KeywordRecord]) -> DataSummary {
    if records.is_empty() {
        return DataSummary::default();
    }
    let n = records.len() as f64;
    let avg_position = safe_divide(records.iter().map(|r| r.current_position).sum::<f64>(), n, 0.0);
    let avg_difficulty = safe_divide(records.iter().map(|r| r.keyword_difficulty).sum::<f64>(), n, 0.0);

    DataSummary {
        total_keywords: records.len(),
        avg_position:   round_to(avg_position, 2),
        total_clicks:   records.iter().map(|r| r.clicks).sum(),
        total_volume:   records.iter().map(|r| r.search_volume).sum(),
        avg_difficulty: round_to(avg_difficulty, 2),
        quality_score:  round_to((100.0 - avg_position / 10.0).clamp(0.0, 100.0), 1),
        rows_imputed:   records.iter().filter(|r| r.has_imputed_values).count(),
    }
}

pub fn quality_report(records: &[KeywordRecord]) -> QualityReport {
    if records.is_empty() {
        return QualityReport {
            summary:         "No data available".into(),
            affected_rows:   0,
            issues:          Vec::new(),
            recommendations: Vec::new(),
        };
    }

    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    let imputed = records.iter().filter(|r| r.has_imputed_values).count();
    if imputed > 0 {
        issues.push(format!("{imputed} rows contained missing values (handled)"));
        recommendations.push("Consider data export settings to minimize missing values".into());
    }

    let summary = summarize(records);
    if summary.avg_position > HIGH_AVG_POSITION {
        issues.push(format!("Average position is high ({:.1})", summary.avg_position));
        recommendations
            .push("Focus on improving rankings for better forecasting accuracy".into());
    }

    let low_volume = records.iter().filter(|r| r.search_volume < LOW_VOLUME).count();
    if low_volume > 0 {
        issues.push(format!("{low_volume} keywords have very low search volume"));
        recommendations.push("Consider filtering out very low-volume keywords".into());
    }

    let affected_rows = records
        .iter()
        .filter(|r| r.has_imputed_values || r.search_volume < LOW_VOLUME)
        .count();

    if !issues.is_empty() {
        log::info!("quality: {} issues across {affected_rows} rows", issues.len());
    }

    QualityReport {
        summary: format!(
            "Analyzed {} keywords with {} issues identified",
            records.len(),
            issues.len()
        ),
        affected_rows,
        issues,
        recommendations,
    }
}
