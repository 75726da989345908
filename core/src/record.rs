//! The reconciled keyword table: input contract of the forecasting core.

use crate::{
    error::{SeoError, SeoResult},
    types::{Keyword, Position},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const UNKNOWN_URL: &str = "Unknown";

/// One row of the merged search-console + keyword-metrics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub keyword:            Keyword,
    pub clicks:             u64,
    pub impressions:        u64,
    /// clicks / impressions, in [0, 1].
    pub ctr:                f64,
    pub current_position:   Position,
    pub search_volume:      u64,
    /// 0–100, higher = harder to rank for.
    pub keyword_difficulty: f64,
    #[serde(default = "unknown_url")]
    pub url:                String,
    /// Cost-per-click, when the metrics export carried one.
    #[serde(default)]
    pub cpc:                Option<f64>,
    /// Set by reconciliation when any field had to be imputed.
    #[serde(default)]
    pub has_imputed_values: bool,
}

fn unknown_url() -> String {
    UNKNOWN_URL.to_string()
}

impl KeywordRecord {
    /// Minimal record for callers that only know position and volume.
    pub fn new(keyword: impl Into<Keyword>, current_position: Position, search_volume: u64) -> Self {
        Self {
            keyword: keyword.into(),
            clicks: 0,
            impressions: 0,
            ctr: 0.0,
            current_position,
            search_volume,
            keyword_difficulty: 50.0,
            url: unknown_url(),
            cpc: None,
            has_imputed_values: false,
        }
    }

    pub fn with_traffic(mut self, clicks: u64, impressions: u64) -> Self {
        self.clicks = clicks;
        self.impressions = impressions;
        self.ctr = crate::arithmetic::safe_divide(clicks as f64, impressions as f64, 0.0).clamp(0.0, 1.0);
        self
    }

    pub fn with_difficulty(mut self, keyword_difficulty: f64) -> Self {
        self.keyword_difficulty = keyword_difficulty;
        self
    }

    pub fn with_cpc(mut self, cpc: f64) -> Self {
        self.cpc = Some(cpc);
        self
    }

    fn invalid(&self, reason: impl Into<String>) -> SeoError {
        SeoError::InvalidRecord {
            keyword: self.keyword.clone(),
            reason:  reason.into(),
        }
    }

    /// Structural checks on a single row.
    pub fn validate(&self) -> SeoResult<()> {
        if self.keyword.trim().is_empty() {
            return Err(self.invalid("keyword is empty"));
        }
        if !self.current_position.is_finite() || self.current_position < 1.0 {
            return Err(self.invalid(format!(
                "current position {} must be a finite number >= 1",
                self.current_position
            )));
        }
        if !self.keyword_difficulty.is_finite()
            || !(0.0..=100.0).contains(&self.keyword_difficulty)
        {
            return Err(self.invalid(format!(
                "keyword difficulty {} outside [0, 100]",
                self.keyword_difficulty
            )));
        }
        if !self.ctr.is_finite() || !(0.0..=1.0).contains(&self.ctr) {
            return Err(self.invalid(format!("ctr {} outside [0, 1]", self.ctr)));
        }
        Ok(())
    }
}

/// Validate a whole table: non-empty, every row valid, keywords unique.
pub fn validate_records(records: &[KeywordRecord]) -> SeoResult<()> {
    if records.is_empty() {
        return Err(SeoError::EmptyDataset);
    }
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
    for record in records {
        record.validate()?;
        if !seen.insert(record.keyword.as_str()) {
            return Err(SeoError::DuplicateKeyword {
                keyword: record.keyword.clone(),
            });
        }
    }
    Ok(())
}
