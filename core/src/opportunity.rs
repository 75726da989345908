//! Opportunity scoring: which keywords are worth optimisation effort.
//!
//! score = volume × 1/position × (100 − difficulty)/100
//!
//! Rewards high volume, an already-good position and low difficulty.
//! Keywords at position 1 have nothing left to gain and are excluded.

use crate::{
    arithmetic::safe_divide,
    config::ForecastConfig,
    ctr_model::CtrModel,
    error::{SeoError, SeoResult},
    record::{validate_records, KeywordRecord},
    types::{Keyword, Position},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub keyword:            Keyword,
    pub current_position:   Position,
    pub search_volume:      u64,
    pub keyword_difficulty: f64,
    pub opportunity_score:  f64,
    pub current_clicks_est: f64,
    /// Clicks if the keyword reached the target position.
    pub potential_clicks:   f64,
    pub click_increase:     f64,
}

/// Score a single record. Pure formula, no filtering.
pub fn opportunity_score(record: &KeywordRecord) -> f64 {
    record.search_volume as f64
        * safe_divide(1.0, record.current_position, 0.0)
        * safe_divide(100.0 - record.keyword_difficulty, 100.0, 0.0)
}

/// Rank opportunities using a CTR model built from `records` themselves.
pub fn identify_opportunities(
    records: &[KeywordRecord],
    min_volume: u64,
    max_position: Position,
    config: &ForecastConfig,
) -> SeoResult<Vec<Opportunity>> {
    if records.is_empty() {
        log::warn!("opportunity: no records supplied");
        return Ok(Vec::new());
    }
    validate_records(records)?;
    let model = CtrModel::from_records(records, &config.ctr_model);
    identify_with_model(
        records,
        min_volume,
        max_position,
        config.opportunity.target_position,
        &model,
    )
}

/// Rank opportunities against an existing CTR model.
///
/// Keeps records with `search_volume >= min_volume` and
/// `1 < current_position <= max_position`, sorted by score descending
/// (ties by keyword). An empty result is not an error.
pub fn identify_with_model(
    records: &[KeywordRecord],
    min_volume: u64,
    max_position: Position,
    target_position: Position,
    model: &CtrModel,
) -> SeoResult<Vec<Opportunity>> {
    if !max_position.is_finite() {
        return Err(SeoError::InvalidParameter {
            name:   "max_position",
            reason: format!("{max_position} must be finite"),
        });
    }

    let target_ctr = model.lookup(target_position);

    let mut ranked: Vec<Opportunity> = records
        .iter()
        .filter(|r| {
            r.search_volume >= min_volume
                && r.current_position > 1.0
                && r.current_position <= max_position
        })
        .map(|r| {
            let volume = r.search_volume as f64;
            let current_clicks_est = volume * model.lookup(r.current_position);
            let potential_clicks = volume * target_ctr;
            Opportunity {
                keyword:            r.keyword.clone(),
                current_position:   r.current_position,
                search_volume:      r.search_volume,
                keyword_difficulty: r.keyword_difficulty,
                opportunity_score:  opportunity_score(r),
                current_clicks_est,
                potential_clicks,
                click_increase:     potential_clicks - current_clicks_est,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.opportunity_score
            .total_cmp(&a.opportunity_score)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });

    if ranked.is_empty() {
        log::warn!(
            "opportunity: no keywords with volume>={min_volume} and position in (1, {max_position}]"
        );
    } else {
        log::debug!("opportunity: ranked {} keywords", ranked.len());
    }
    Ok(ranked)
}
