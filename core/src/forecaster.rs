//! Performance forecaster: projects position and click movement over a
//! time horizon under an improvement scenario.
//!
//! EXECUTION ORDER (fixed, each step consumes the previous step's output):
//!   1. Curve build         : CtrModel from the records passed in
//!   2. Time scaling        : avg_improvement × scaling(horizon_days)
//!   3. Keyword projection  : headroom cap, tier damping, CTR lookups
//!   4. Aggregate metrics   : totals, top-10 counts, percentages
//!   5. Traffic value       : per-keyword CPC, or the volume-tiered schedule
//!
//! RULES:
//!   - Every call builds its own curve. Nothing is cached across calls.
//!   - No randomness: identical inputs give bit-identical results.
//!   - Inputs are never mutated.
//!   - Structural problems fail the whole call; no partial results.

use crate::{
    arithmetic::{finite_or_zero, round_to, safe_divide},
    config::ForecastConfig,
    ctr_model::{CtrModel, CtrSource},
    error::{SeoError, SeoResult},
    record::{validate_records, KeywordRecord},
    types::{HorizonDays, Keyword, Position},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-10 boundary used for the keywords-in-top-10 counts.
pub const TOP_TEN: Position = 10.0;

/// Per-call scenario parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub horizon_days:             HorizonDays,
    pub avg_position_improvement: f64,
}

/// One row of the projection table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordForecast {
    pub keyword:            Keyword,
    pub current_position:   Position,
    /// Rounded to 1 decimal.
    pub projected_position: Position,
    pub search_volume:      u64,
    /// Rounded to 4 decimals.
    pub current_ctr:        f64,
    pub projected_ctr:      f64,
    /// Rounded to whole clicks.
    pub current_clicks:     f64,
    pub projected_clicks:   f64,
    pub click_increase:     f64,
    /// Rounded to 1 decimal.
    pub improvement_pct:    f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub horizon_days:            HorizonDays,
    pub avg_improvement:         f64,
    pub scaled_improvement:      f64,
    pub ctr_source:              CtrSource,
    pub keyword_forecasts:       Vec<KeywordForecast>,
    // Aggregates
    pub total_current_clicks:    u64,
    pub total_projected_clicks:  u64,
    pub clicks_increase_pct:     f64,
    pub traffic_value:           f64,
    pub keywords_top_10_current: usize,
    pub keywords_top_10:         usize,
    pub top10_increase:          i64,
    pub value_increase_pct:      f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name:        String,
    pub label:       String,
    pub improvement: f64,
    pub forecasts:   BTreeMap<HorizonDays, ForecastResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub scenarios: Vec<ScenarioOutcome>,
}

impl ScenarioSet {
    pub fn get(&self, name: &str, horizon_days: HorizonDays) -> Option<&ForecastResult> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| s.forecasts.get(&horizon_days))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub month:            u32,
    pub days:             HorizonDays,
    pub projected_clicks: u64,
    pub current_clicks:   u64,
    pub traffic_value:    f64,
    pub keywords_top_10:  usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiEstimate {
    pub investment:             f64,
    pub traffic_value_annual:   f64,
    pub clicks_increase_annual: i64,
    pub roi_percentage:         f64,
    pub monthly_value:          f64,
    pub payback_months:         f64,
}

#[derive(Debug, Clone, Default)]
pub struct Forecaster {
    config: ForecastConfig,
}

impl Forecaster {
    /// Wraps `config` as given. Callers building a config in code should
    /// prefer `try_new`; `ForecastConfig::load` already validates.
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// Validate `config` before wrapping it.
    pub fn try_new(config: ForecastConfig) -> SeoResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Fraction of full improvement potential realised after `horizon_days`.
    pub fn scaling(&self, horizon_days: HorizonDays) -> f64 {
        self.config.scaling.fraction_for(horizon_days)
    }

    pub fn forecast_scenario(
        &self,
        records: &[KeywordRecord],
        scenario: &ScenarioConfig,
    ) -> SeoResult<ForecastResult> {
        self.forecast(records, scenario.horizon_days, scenario.avg_position_improvement)
    }

    /// Run the full pipeline once.
    pub fn forecast(
        &self,
        records: &[KeywordRecord],
        horizon_days: HorizonDays,
        avg_improvement: f64,
    ) -> SeoResult<ForecastResult> {
        check_horizon(horizon_days)?;
        check_positive("avg_improvement", avg_improvement)?;
        validate_records(records)?;

        // 1. Curve build
        let model = CtrModel::from_records(records, &self.config.ctr_model);

        // 2. Time scaling
        let scaled_improvement = avg_improvement * self.scaling(horizon_days);

        // 3. Keyword projection
        let keyword_forecasts: Vec<KeywordForecast> = records
            .iter()
            .map(|record| self.project_keyword(record, scaled_improvement, &model))
            .collect();

        // 4. Aggregate metrics
        let total_current_clicks: u64 =
            keyword_forecasts.iter().map(|k| k.current_clicks as u64).sum();
        let total_projected_clicks: u64 =
            keyword_forecasts.iter().map(|k| k.projected_clicks as u64).sum();

        let raw_increase_pct = safe_divide(
            total_projected_clicks as f64 - total_current_clicks as f64,
            (total_current_clicks as f64).max(1.0),
            0.0,
        ) * 100.0;

        let keywords_top_10_current = keyword_forecasts
            .iter()
            .filter(|k| k.current_position <= TOP_TEN)
            .count();
        let keywords_top_10 = keyword_forecasts
            .iter()
            .filter(|k| k.projected_position <= TOP_TEN)
            .count();

        // 5. Traffic value
        let traffic_value = self.traffic_value(records, &keyword_forecasts);

        log::info!(
            "forecast: horizon={horizon_days}d improvement={avg_improvement} scaled={scaled_improvement:.3} \
             keywords={} clicks {}->{} value={traffic_value}",
            keyword_forecasts.len(),
            total_current_clicks,
            total_projected_clicks,
        );

        Ok(ForecastResult {
            horizon_days,
            avg_improvement,
            scaled_improvement,
            ctr_source: model.source(),
            keyword_forecasts,
            total_current_clicks,
            total_projected_clicks,
            clicks_increase_pct: round_to(raw_increase_pct, 1),
            traffic_value,
            keywords_top_10_current,
            keywords_top_10,
            top10_increase: keywords_top_10 as i64 - keywords_top_10_current as i64,
            value_increase_pct: round_to(
                raw_increase_pct * self.config.traffic_value.value_increase_discount,
                1,
            ),
        })
    }

    fn project_keyword(
        &self,
        record: &KeywordRecord,
        scaled_improvement: f64,
        model: &CtrModel,
    ) -> KeywordForecast {
        let current_position = record.current_position;

        // Cannot improve past position 1.
        let headroom = (current_position - 1.0).max(0.0);
        let raw_improvement = scaled_improvement.min(headroom);
        let damped_improvement = raw_improvement * self.config.damping_factor(current_position);
        let projected_position = (current_position - damped_improvement).max(1.0);

        let current_ctr = model.lookup(current_position);
        let projected_ctr = model.lookup(projected_position);

        let volume = record.search_volume as f64;
        let current_clicks = volume * current_ctr;
        let projected_clicks = volume * projected_ctr;

        let click_increase = projected_clicks - current_clicks;
        let improvement_pct =
            safe_divide(click_increase, current_clicks.max(1.0), 0.0) * 100.0;

        KeywordForecast {
            keyword: record.keyword.clone(),
            current_position,
            projected_position: round_to(projected_position, 1).max(1.0),
            search_volume: record.search_volume,
            current_ctr: round_to(current_ctr, 4),
            projected_ctr: round_to(projected_ctr, 4),
            current_clicks: round_to(current_clicks, 0),
            projected_clicks: round_to(projected_clicks, 0),
            click_increase: round_to(click_increase, 0),
            improvement_pct: round_to(improvement_pct, 1),
        }
    }

    /// Estimated value of the projected clicks, rounded to whole currency
    /// units. Never fails: non-finite intermediates count as 0.
    ///
    /// When any record carries a usable CPC the table is valued per keyword
    /// (missing figures default to `missing_keyword_cpc`); otherwise the
    /// volume-tiered schedule applies.
    pub fn traffic_value(&self, records: &[KeywordRecord], rows: &[KeywordForecast]) -> f64 {
        let tv = &self.config.traffic_value;
        let has_cpc = records
            .iter()
            .any(|r| r.cpc.is_some_and(|cpc| cpc.is_finite()));

        let total: f64 = records
            .iter()
            .zip(rows)
            .map(|(record, row)| {
                let cpc = if has_cpc {
                    record
                        .cpc
                        .filter(|cpc| cpc.is_finite() && *cpc >= 0.0)
                        .unwrap_or(tv.missing_keyword_cpc)
                } else {
                    self.tiered_cpc(row.search_volume)
                };
                finite_or_zero(row.projected_clicks * cpc)
            })
            .sum();

        round_to(finite_or_zero(total), 0)
    }

    /// Volume-tiered CPC, thresholds checked from highest to lowest.
    pub fn tiered_cpc(&self, search_volume: u64) -> f64 {
        let tv = &self.config.traffic_value;
        tv.cpc_tiers
            .iter()
            .find(|tier| search_volume >= tier.min_volume)
            .map(|tier| tier.cpc)
            .unwrap_or(tv.fallback_cpc)
    }

    /// Every configured improvement level across every canonical horizon.
    pub fn generate_scenarios(&self, records: &[KeywordRecord]) -> SeoResult<ScenarioSet> {
        let plan = &self.config.scenarios;
        let mut scenarios = Vec::with_capacity(plan.levels.len());

        for level in &plan.levels {
            let mut forecasts = BTreeMap::new();
            for &days in &plan.horizons {
                forecasts.insert(days, self.forecast(records, days, level.improvement)?);
            }
            scenarios.push(ScenarioOutcome {
                name:        level.name.clone(),
                label:       level.label.clone(),
                improvement: level.improvement,
                forecasts,
            });
        }

        log::debug!(
            "forecast: generated {} scenarios x {} horizons",
            scenarios.len(),
            plan.horizons.len()
        );
        Ok(ScenarioSet { scenarios })
    }

    /// One forecast per month at a fixed improvement rate, for charting.
    pub fn create_timeline_forecast(
        &self,
        records: &[KeywordRecord],
        improvement_rate: f64,
    ) -> SeoResult<Vec<TimelinePoint>> {
        let plan = &self.config.scenarios;
        (1..=plan.timeline_months)
            .map(|month| {
                let days = month * plan.days_per_month;
                let forecast = self.forecast(records, days, improvement_rate)?;
                Ok(TimelinePoint {
                    month,
                    days,
                    projected_clicks: forecast.total_projected_clicks,
                    current_clicks:   forecast.total_current_clicks,
                    traffic_value:    forecast.traffic_value,
                    keywords_top_10:  forecast.keywords_top_10,
                })
            })
            .collect()
    }

    /// Return on an SEO investment over the ROI horizon (a year by default).
    pub fn calculate_roi_potential(
        &self,
        records: &[KeywordRecord],
        investment: f64,
        improvement_rate: f64,
    ) -> SeoResult<RoiEstimate> {
        if !investment.is_finite() || investment < 0.0 {
            return Err(SeoError::InvalidParameter {
                name:   "investment",
                reason: format!("{investment} must be a finite, non-negative amount"),
            });
        }

        let forecast = self.forecast(records, self.config.scenarios.roi_horizon_days, improvement_rate)?;
        let traffic_value = forecast.traffic_value;

        let roi = safe_divide(traffic_value - investment, investment.max(1.0), 0.0) * 100.0;
        let monthly_value = safe_divide(traffic_value, 12.0, 0.0);
        let payback_months = safe_divide(investment, monthly_value.max(1.0), 0.0);

        Ok(RoiEstimate {
            investment,
            traffic_value_annual: traffic_value,
            clicks_increase_annual: forecast.total_projected_clicks as i64
                - forecast.total_current_clicks as i64,
            roi_percentage: round_to(roi, 1),
            monthly_value: round_to(monthly_value, 0),
            payback_months: round_to(payback_months, 1),
        })
    }
}

fn check_horizon(horizon_days: HorizonDays) -> SeoResult<()> {
    if horizon_days == 0 {
        return Err(SeoError::InvalidParameter {
            name:   "horizon_days",
            reason: "must be a positive number of days".into(),
        });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f64) -> SeoResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SeoError::InvalidParameter {
            name,
            reason: format!("{value} must be a finite, positive number"),
        });
    }
    Ok(())
}
