use seo_forecast_core::{
    config::ForecastConfig,
    ctr_model::CtrModel,
    error::SeoError,
    opportunity::{identify_opportunities, identify_with_model, opportunity_score},
    reconcile::sample_records,
    record::KeywordRecord,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn config() -> ForecastConfig {
    ForecastConfig::default()
}

fn keywords(ranked: &[seo_forecast_core::Opportunity]) -> Vec<&str> {
    ranked.iter().map(|o| o.keyword.as_str()).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn score_rewards_volume_position_and_ease() {
    let record = KeywordRecord::new("kw", 4.0, 2_000).with_difficulty(25.0);
    // 2000 × 1/4 × 0.75
    assert!((opportunity_score(&record) - 375.0).abs() < 1e-9);

    let harder = KeywordRecord::new("kw", 4.0, 2_000).with_difficulty(100.0);
    assert_eq!(opportunity_score(&harder), 0.0);
}

#[test]
fn sample_keywords_rank_by_score() {
    let ranked = identify_opportunities(&sample_records(), 100, 30.0, &config()).unwrap();
    assert_eq!(
        keywords(&ranked),
        vec![
            "seo tools",
            "keyword research",
            "backlink analysis",
            "technical seo",
            "content optimization",
        ]
    );
    for pair in ranked.windows(2) {
        assert!(pair[0].opportunity_score >= pair[1].opportunity_score);
    }
}

#[test]
fn potential_clicks_assume_the_target_position() {
    let ranked = identify_opportunities(&sample_records(), 100, 30.0, &config()).unwrap();
    let seo = &ranked[0];
    // Default table: position 3 → 0.185, position 8.5 → 0.050.
    assert!((seo.potential_clicks - 8_100.0 * 0.185).abs() < 1e-6);
    assert!((seo.current_clicks_est - 8_100.0 * 0.050).abs() < 1e-6);
    assert!((seo.click_increase - (seo.potential_clicks - seo.current_clicks_est)).abs() < 1e-9);
}

#[test]
fn position_one_is_never_an_opportunity() {
    let mut records = sample_records();
    records.push(KeywordRecord::new("already first", 1.0, 1_000_000).with_difficulty(0.0));

    for max_position in [1.0, 10.0, 100.0] {
        let ranked = identify_opportunities(&records, 0, max_position, &config()).unwrap();
        assert!(
            ranked.iter().all(|o| o.keyword != "already first"),
            "position 1 leaked into results with max_position={max_position}"
        );
    }
}

#[test]
fn filters_are_inclusive_at_their_limits() {
    let records = vec![
        KeywordRecord::new("at limit", 30.0, 100),
        KeywordRecord::new("past limit", 30.1, 100_000),
        KeywordRecord::new("too small", 5.0, 99),
    ];
    let ranked = identify_opportunities(&records, 100, 30.0, &config()).unwrap();
    assert_eq!(keywords(&ranked), vec!["at limit"]);
}

#[test]
fn equal_scores_are_ordered_by_keyword() {
    let records = vec![
        KeywordRecord::new("zebra", 5.0, 1_000),
        KeywordRecord::new("apple", 5.0, 1_000),
        KeywordRecord::new("mango", 5.0, 1_000),
    ];
    let ranked = identify_opportunities(&records, 0, 50.0, &config()).unwrap();
    assert_eq!(keywords(&ranked), vec!["apple", "mango", "zebra"]);
}

#[test]
fn no_match_is_an_empty_list_not_an_error() {
    let ranked = identify_opportunities(&sample_records(), 1_000_000, 30.0, &config()).unwrap();
    assert!(ranked.is_empty());

    let ranked = identify_opportunities(&[], 100, 30.0, &config()).unwrap();
    assert!(ranked.is_empty());
}

#[test]
fn non_finite_max_position_is_rejected() {
    let model = CtrModel::default_table(&config().ctr_model);
    let err = identify_with_model(&sample_records(), 0, f64::NAN, 3.0, &model).unwrap_err();
    assert!(matches!(err, SeoError::InvalidParameter { name: "max_position", .. }));
}

#[test]
fn invalid_records_are_rejected() {
    let records = vec![KeywordRecord::new("broken", f64::NAN, 500)];
    let err = identify_opportunities(&records, 0, 30.0, &config()).unwrap_err();
    assert!(matches!(err, SeoError::InvalidRecord { .. }));
}
