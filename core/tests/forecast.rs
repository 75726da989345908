use seo_forecast_core::{
    ctr_model::CtrSource,
    error::SeoError,
    forecaster::{Forecaster, ScenarioConfig},
    reconcile::sample_records,
    record::KeywordRecord,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn forecaster() -> Forecaster {
    let _ = env_logger::builder().is_test(true).try_init();
    Forecaster::default()
}

fn row<'a>(
    result: &'a seo_forecast_core::ForecastResult,
    keyword: &str,
) -> &'a seo_forecast_core::KeywordForecast {
    result
        .keyword_forecasts
        .iter()
        .find(|k| k.keyword == keyword)
        .unwrap_or_else(|| panic!("no forecast row for {keyword}"))
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn canonical_horizons_scale_the_improvement() {
    let f = forecaster();
    assert_eq!(f.scaling(90), 0.30);
    assert_eq!(f.scaling(180), 0.65);
    assert_eq!(f.scaling(360), 1.0);
    // Non-canonical horizons scale linearly over a year.
    assert!((f.scaling(210) - 210.0 / 360.0).abs() < 1e-12);
    assert!((f.scaling(30) - 30.0 / 360.0).abs() < 1e-12);

    let result = f.forecast(&sample_records(), 180, 10.0).unwrap();
    assert!((result.scaled_improvement - 6.5).abs() < 1e-9);
}

/// Keyword at 8.5, full-year horizon, 10 positions of improvement:
/// raw = min(10, 7.5) = 7.5, damped by 0.7 = 5.25, projected = 3.25.
#[test]
fn full_year_projection_for_sample_top_keyword() {
    let result = forecaster().forecast(&sample_records(), 360, 10.0).unwrap();
    assert_eq!(result.scaled_improvement, 10.0);
    assert_eq!(result.ctr_source, CtrSource::DefaultTable);

    let seo = row(&result, "seo tools");
    assert!(
        (3.2..=3.3).contains(&seo.projected_position),
        "projected_position={} expected ~3.25",
        seo.projected_position
    );
    assert_eq!(seo.current_ctr, 0.05);
    assert_eq!(seo.projected_ctr, 0.185);
    assert!(seo.projected_ctr > seo.current_ctr);
    assert!(
        seo.projected_clicks > seo.current_clicks,
        "projected {} must exceed current {}",
        seo.projected_clicks, seo.current_clicks
    );
    assert_eq!(seo.current_clicks, 405.0);
}

#[test]
fn keywords_below_top_ten_are_not_damped() {
    let result = forecaster().forecast(&sample_records(), 360, 10.0).unwrap();
    let research = row(&result, "keyword research");
    assert!((research.projected_position - 2.3).abs() < 1e-9);
    let content = row(&result, "content optimization");
    assert!((content.projected_position - 12.1).abs() < 1e-9);
}

#[test]
fn top_three_keywords_move_least() {
    let records = vec![
        KeywordRecord::new("at three", 3.0, 1_000),
        KeywordRecord::new("at two", 2.0, 1_000),
        KeywordRecord::new("at one", 1.0, 1_000),
    ];
    let result = forecaster().forecast(&records, 360, 20.0).unwrap();

    // headroom 2 × 0.4, headroom 1 × 0.4, no headroom.
    assert!((row(&result, "at three").projected_position - 2.2).abs() < 1e-9);
    assert!((row(&result, "at two").projected_position - 1.6).abs() < 1e-9);
    assert_eq!(row(&result, "at one").projected_position, 1.0);
}

#[test]
fn projected_position_never_leaves_its_range() {
    let records: Vec<KeywordRecord> = [1.0, 1.4, 2.9, 7.0, 10.0, 10.5, 33.0, 99.0, 250.0]
        .iter()
        .enumerate()
        .map(|(i, &p)| KeywordRecord::new(format!("k{i}"), p, 2_000))
        .collect();

    for days in [1, 30, 90, 180, 360, 720] {
        for improvement in [0.5, 5.0, 50.0, 1_000.0] {
            let result = forecaster().forecast(&records, days, improvement).unwrap();
            for k in &result.keyword_forecasts {
                assert!(k.projected_position >= 1.0, "{} went above 1", k.keyword);
                assert!(
                    k.projected_position <= k.current_position + 0.05,
                    "{} got worse: {} -> {}",
                    k.keyword, k.current_position, k.projected_position
                );
                assert!(k.projected_ctr > 0.0 && k.projected_ctr <= 1.0);
            }
        }
    }
}

#[test]
fn top_ten_counts_follow_projected_positions() {
    let result = forecaster().forecast(&sample_records(), 360, 10.0).unwrap();
    assert_eq!(result.keywords_top_10_current, 1);
    // 3.25, 2.3, 5.7 and 8.2 reach the top ten; 12.1 does not.
    assert_eq!(result.keywords_top_10, 4);
    assert_eq!(result.top10_increase, 3);
}

#[test]
fn aggregates_sum_the_rounded_rows() {
    let result = forecaster().forecast(&sample_records(), 180, 10.0).unwrap();
    let current: f64 = result.keyword_forecasts.iter().map(|k| k.current_clicks).sum();
    let projected: f64 = result.keyword_forecasts.iter().map(|k| k.projected_clicks).sum();
    assert_eq!(result.total_current_clicks as f64, current);
    assert_eq!(result.total_projected_clicks as f64, projected);

    let pct = (projected - current) / current * 100.0;
    assert!((result.clicks_increase_pct - pct).abs() <= 0.05);
    assert!((result.value_increase_pct - pct * 0.95).abs() <= 0.05);
}

#[test]
fn gains_grow_with_horizon_on_the_default_table() {
    let f = forecaster();
    let records = sample_records();
    let totals: Vec<u64> = [90, 180, 360]
        .into_iter()
        .map(|days| f.forecast(&records, days, 10.0).unwrap().total_projected_clicks)
        .collect();
    assert!(totals[0] <= totals[1] && totals[1] <= totals[2], "totals={totals:?}");
}

#[test]
fn traffic_value_uses_volume_tiers_without_cpc() {
    let f = forecaster();
    let result = f.forecast(&sample_records(), 360, 10.0).unwrap();
    // Every sample volume falls in the 1000-9999 tier.
    assert_eq!(result.traffic_value, (result.total_projected_clicks as f64 * 2.5).round());

    assert_eq!(f.tiered_cpc(50_000), 8.0);
    assert_eq!(f.tiered_cpc(49_999), 5.0);
    assert_eq!(f.tiered_cpc(1_000), 2.5);
    assert_eq!(f.tiered_cpc(100), 1.2);
    assert_eq!(f.tiered_cpc(99), 0.5);
    assert_eq!(f.tiered_cpc(0), 0.5);
}

#[test]
fn traffic_value_uses_keyword_cpc_when_present() {
    let records = vec![
        KeywordRecord::new("priced", 5.0, 10_000).with_cpc(3.0),
        KeywordRecord::new("unpriced", 5.0, 10_000),
    ];
    let result = forecaster().forecast(&records, 90, 2.0).unwrap();
    let clicks: Vec<f64> = result.keyword_forecasts.iter().map(|k| k.projected_clicks).collect();
    let expected = (clicks[0] * 3.0 + clicks[1] * 0.5).round();
    assert_eq!(result.traffic_value, expected);
}

#[test]
fn zero_volume_keyword_reports_zero_improvement() {
    let records = vec![KeywordRecord::new("silent", 12.0, 0)];
    let result = forecaster().forecast(&records, 360, 5.0).unwrap();
    let k = &result.keyword_forecasts[0];
    assert_eq!(k.current_clicks, 0.0);
    assert_eq!(k.projected_clicks, 0.0);
    assert_eq!(k.improvement_pct, 0.0);
    assert_eq!(result.clicks_increase_pct, 0.0);
    assert_eq!(result.traffic_value, 0.0);
}

#[test]
fn scenario_config_matches_direct_call() {
    let f = forecaster();
    let records = sample_records();
    let scenario = ScenarioConfig { horizon_days: 180, avg_position_improvement: 7.0 };
    assert_eq!(
        f.forecast_scenario(&records, &scenario).unwrap(),
        f.forecast(&records, 180, 7.0).unwrap()
    );
}

#[test]
fn empty_dataset_is_rejected() {
    let err = forecaster().forecast(&[], 90, 10.0).unwrap_err();
    assert!(matches!(err, SeoError::EmptyDataset), "got {err:?}");
}

#[test]
fn invalid_parameters_are_rejected() {
    let f = forecaster();
    let records = sample_records();
    for (days, improvement) in [(0, 10.0), (90, 0.0), (90, -3.0), (90, f64::NAN), (90, f64::INFINITY)] {
        let err = f.forecast(&records, days, improvement).unwrap_err();
        assert!(
            matches!(err, SeoError::InvalidParameter { .. }),
            "days={days} improvement={improvement} gave {err:?}"
        );
    }
}

#[test]
fn structurally_invalid_tables_are_rejected() {
    let f = forecaster();

    let duplicated = vec![
        KeywordRecord::new("same", 4.0, 100),
        KeywordRecord::new("same", 9.0, 100),
    ];
    assert!(matches!(
        f.forecast(&duplicated, 90, 5.0).unwrap_err(),
        SeoError::DuplicateKeyword { .. }
    ));

    let bad_position = vec![KeywordRecord::new("zero", 0.5, 100)];
    assert!(matches!(
        f.forecast(&bad_position, 90, 5.0).unwrap_err(),
        SeoError::InvalidRecord { .. }
    ));

    let bad_difficulty = vec![KeywordRecord::new("hard", 4.0, 100).with_difficulty(140.0)];
    assert!(matches!(
        f.forecast(&bad_difficulty, 90, 5.0).unwrap_err(),
        SeoError::InvalidRecord { .. }
    ));
}

#[test]
fn non_finite_cpc_uses_default_or_tiers() {
    let f = forecaster();

    // Some usable CPC: non-finite figures are valued at the keyword default.
    let mixed = vec![
        KeywordRecord::new("priced", 5.0, 10_000).with_cpc(3.0),
        KeywordRecord::new("nan cpc", 5.0, 10_000).with_cpc(f64::NAN),
        KeywordRecord::new("inf cpc", 5.0, 10_000).with_cpc(f64::INFINITY),
    ];
    let result = f.forecast(&mixed, 90, 2.0).unwrap();
    let clicks: Vec<f64> = result.keyword_forecasts.iter().map(|k| k.projected_clicks).collect();
    let expected = (clicks[0] * 3.0 + clicks[1] * 0.5 + clicks[2] * 0.5).round();
    assert_eq!(result.traffic_value, expected);

    // No usable CPC at all: the volume tiers apply (10 000 → 5.00).
    let all_nan = vec![
        KeywordRecord::new("nan a", 5.0, 10_000).with_cpc(f64::NAN),
        KeywordRecord::new("nan b", 5.0, 10_000).with_cpc(f64::NAN),
    ];
    let result = f.forecast(&all_nan, 90, 2.0).unwrap();
    assert_eq!(result.traffic_value, (result.total_projected_clicks as f64 * 5.0).round());
}
