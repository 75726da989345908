//! Reconciliation: joins search-console rows with keyword-metrics rows
//! into the keyword table the forecaster consumes.
//!
//! Input rows are already column-normalised; file parsing and header
//! aliasing happen before this point. Missing numeric values are imputed
//! and the affected rows flagged so the quality report can surface them.
//!
//! Output contract: one record per keyword (best position wins), ordered
//! by position then keyword.

use crate::{
    arithmetic::safe_divide,
    error::{SeoError, SeoResult},
    record::{KeywordRecord, UNKNOWN_URL},
    types::Position,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const IMPUTED_DIFFICULTY: f64 = 50.0;
pub const IMPUTED_POSITION: Position = 100.0;

/// One row of a search-console performance export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConsoleRow {
    pub query:       String,
    #[serde(default)]
    pub clicks:      Option<f64>,
    #[serde(default)]
    pub impressions: Option<f64>,
}

/// One row of a third-party keyword-metrics export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMetricsRow {
    pub keyword:            String,
    #[serde(default)]
    pub search_volume:      Option<f64>,
    #[serde(default)]
    pub keyword_difficulty: Option<f64>,
    #[serde(default)]
    pub position:           Option<f64>,
    #[serde(default)]
    pub url:                Option<String>,
    #[serde(default)]
    pub cpc:                Option<f64>,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Non-negative whole count, or None when missing/invalid.
fn count(value: Option<f64>) -> Option<u64> {
    finite(value).map(|v| v.max(0.0).round() as u64)
}

struct CleanTraffic {
    clicks:      u64,
    impressions: u64,
    imputed:     bool,
}

fn clean_traffic(row: &SearchConsoleRow) -> CleanTraffic {
    let clicks = count(row.clicks);
    let impressions = count(row.impressions);
    CleanTraffic {
        imputed:     clicks.is_none() || impressions.is_none(),
        clicks:      clicks.unwrap_or(0),
        impressions: impressions.unwrap_or(0),
    }
}

/// Merge the two exports on the trimmed keyword (inner join).
pub fn reconcile(
    console: &[SearchConsoleRow],
    metrics: &[KeywordMetricsRow],
) -> SeoResult<Vec<KeywordRecord>> {
    let mut traffic_by_query: HashMap<&str, Vec<CleanTraffic>> = HashMap::new();
    let mut dropped = 0usize;
    for row in console {
        let query = row.query.trim();
        if query.is_empty() {
            dropped += 1;
            continue;
        }
        traffic_by_query.entry(query).or_default().push(clean_traffic(row));
    }

    // Keyword → best candidate so far. Ties keep the first encountered.
    let mut best: HashMap<&str, KeywordRecord> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for row in metrics {
        let keyword = row.keyword.trim();
        if keyword.is_empty() {
            dropped += 1;
            continue;
        }
        let Some(traffic_rows) = traffic_by_query.get(keyword) else {
            continue;
        };

        let volume = count(row.search_volume);
        let difficulty = finite(row.keyword_difficulty).map(|d| d.clamp(0.0, 100.0));
        let position = finite(row.position).map(|p| p.max(1.0));
        let metrics_imputed =
            volume.is_none() || difficulty.is_none() || position.is_none() || row.url.is_none();

        for traffic in traffic_rows {
            let ctr = safe_divide(traffic.clicks as f64, traffic.impressions as f64, 0.0)
                .clamp(0.0, 1.0);
            let candidate = KeywordRecord {
                keyword:            keyword.to_string(),
                clicks:             traffic.clicks,
                impressions:        traffic.impressions,
                ctr,
                current_position:   position.unwrap_or(IMPUTED_POSITION),
                search_volume:      volume.unwrap_or(0),
                keyword_difficulty: difficulty.unwrap_or(IMPUTED_DIFFICULTY),
                url:                row.url.clone().unwrap_or_else(|| UNKNOWN_URL.to_string()),
                cpc:                finite(row.cpc).filter(|c| *c >= 0.0),
                has_imputed_values: metrics_imputed || traffic.imputed,
            };

            let replace = match best.get(keyword) {
                Some(existing) => candidate.current_position < existing.current_position,
                None => {
                    order.push(keyword);
                    true
                }
            };
            if replace {
                best.insert(keyword, candidate);
            }
        }
    }

    if best.is_empty() {
        return Err(SeoError::NoMatchingKeywords);
    }

    let mut records: Vec<KeywordRecord> =
        order.into_iter().filter_map(|k| best.remove(k)).collect();
    records.sort_by(|a, b| {
        a.current_position
            .total_cmp(&b.current_position)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });

    log::info!(
        "reconcile: console={} metrics={} merged={} dropped_blank={}",
        console.len(),
        metrics.len(),
        records.len(),
        dropped,
    );
    Ok(records)
}

/// The five-keyword demonstration tables.
pub fn sample_tables() -> (Vec<SearchConsoleRow>, Vec<KeywordMetricsRow>) {
    let keywords = [
        "seo tools",
        "keyword research",
        "backlink analysis",
        "technical seo",
        "content optimization",
    ];
    let clicks = [1200.0, 800.0, 600.0, 400.0, 350.0];
    let impressions = [25_000.0, 18_000.0, 12_000.0, 8_000.0, 6_000.0];
    let volumes = [8100.0, 5400.0, 2900.0, 1600.0, 1300.0];
    let difficulties = [78.0, 65.0, 72.0, 68.0, 58.0];
    let positions = [8.5, 12.3, 15.7, 18.2, 22.1];

    let console = keywords
        .iter()
        .enumerate()
        .map(|(i, kw)| SearchConsoleRow {
            query:       kw.to_string(),
            clicks:      Some(clicks[i]),
            impressions: Some(impressions[i]),
        })
        .collect();

    let metrics = keywords
        .iter()
        .enumerate()
        .map(|(i, kw)| KeywordMetricsRow {
            keyword:            kw.to_string(),
            search_volume:      Some(volumes[i]),
            keyword_difficulty: Some(difficulties[i]),
            position:           Some(positions[i]),
            url:                Some(format!("https://example.com/{}", kw.replace(' ', "-"))),
            cpc:                None,
        })
        .collect();

    (console, metrics)
}

/// Reconciled sample table.
pub fn sample_records() -> Vec<KeywordRecord> {
    let (console, metrics) = sample_tables();
    // The sample tables always overlap.
    reconcile(&console, &metrics).unwrap_or_default()
}
