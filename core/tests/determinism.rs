//! Same records, same config, same parameters → byte-identical output.
//!
//! The forecasting core has no randomness and no hidden state. Any
//! divergence between two runs is a blocker.

use seo_forecast_core::{
    config::ForecastConfig,
    forecaster::Forecaster,
    opportunity::identify_opportunities,
    reconcile::sample_records,
    record::KeywordRecord,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Large enough for the empirical curve to be used.
fn wide_records() -> Vec<KeywordRecord> {
    (1..=40u64)
        .map(|i| {
            let position = 1.0 + (i as f64) * 1.7;
            KeywordRecord::new(format!("keyword {i:02}"), position, 500 + i * 37)
                .with_traffic(1_000 / i, 4_000)
                .with_difficulty((i * 7 % 100) as f64)
        })
        .collect()
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).expect("serialize")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn repeated_forecasts_are_byte_identical() {
    let forecaster = Forecaster::default();
    for records in [sample_records(), wide_records()] {
        for days in [30, 90, 180, 210, 360] {
            let a = forecaster.forecast(&records, days, 10.0).unwrap();
            let b = forecaster.forecast(&records, days, 10.0).unwrap();
            assert_eq!(
                to_json(&a), to_json(&b),
                "Forecast diverged for horizon {days}d"
            );
        }
    }
}

#[test]
fn scenarios_and_timeline_are_reproducible() {
    let forecaster = Forecaster::default();
    let records = wide_records();

    let a = forecaster.generate_scenarios(&records).unwrap();
    let b = forecaster.generate_scenarios(&records).unwrap();
    assert_eq!(to_json(&a), to_json(&b));

    let ta = forecaster.create_timeline_forecast(&records, 8.0).unwrap();
    let tb = forecaster.create_timeline_forecast(&records, 8.0).unwrap();
    assert_eq!(to_json(&ta), to_json(&tb));
}

#[test]
fn opportunity_ranking_is_reproducible() {
    let config = ForecastConfig::default();
    let records = wide_records();
    let a = identify_opportunities(&records, 0, 100.0, &config).unwrap();
    let b = identify_opportunities(&records, 0, 100.0, &config).unwrap();
    assert_eq!(to_json(&a), to_json(&b));
}

#[test]
fn forecasting_never_mutates_its_input() {
    let forecaster = Forecaster::default();
    let records = wide_records();
    let before = records.clone();

    forecaster.forecast(&records, 180, 12.0).unwrap();
    forecaster.generate_scenarios(&records).unwrap();
    forecaster.calculate_roi_potential(&records, 5_000.0, 10.0).unwrap();

    assert_eq!(records, before, "Records changed during forecasting");
}
