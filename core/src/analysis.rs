//! Ranking analysis over the current (not projected) table.

use crate::{
    arithmetic::{round_to, safe_divide},
    record::KeywordRecord,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveSummary {
    pub total_keywords:      usize,
    pub keywords_top_3:      usize,
    pub keywords_top_10:     usize,
    pub keywords_top_20:     usize,
    pub avg_position:        f64,
    pub median_position:     f64,
    pub avg_difficulty:      f64,
    pub total_search_volume: u64,
    /// Volume of keywords already in the top 10.
    pub captured_volume:     u64,
    /// captured / total volume, as a percentage.
    pub market_share:        f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyBand {
    VeryEasy,
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl DifficultyBand {
    /// Upper bounds inclusive; difficulty 0 belongs to VeryEasy.
    pub fn for_difficulty(difficulty: f64) -> Option<Self> {
        if !difficulty.is_finite() || !(0.0..=100.0).contains(&difficulty) {
            return None;
        }
        Some(match difficulty {
            d if d <= 20.0 => Self::VeryEasy,
            d if d <= 40.0 => Self::Easy,
            d if d <= 60.0 => Self::Medium,
            d if d <= 80.0 => Self::Hard,
            _              => Self::VeryHard,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryEasy => "Very Easy",
            Self::Easy     => "Easy",
            Self::Medium   => "Medium",
            Self::Hard     => "Hard",
            Self::VeryHard => "Very Hard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyImpact {
    pub band:            DifficultyBand,
    pub avg_position:    f64,
    pub median_position: f64,
    pub keyword_count:   usize,
    pub avg_volume:      f64,
    pub total_volume:    u64,
}

fn mean(values: &[f64]) -> f64 {
    safe_divide(values.iter().sum::<f64>(), values.len() as f64, 0.0)
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    match sorted.len() {
        0 => 0.0,
        n if n % 2 == 1 => sorted[n / 2],
        n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

pub fn competitive_summary(records: &[KeywordRecord]) -> CompetitiveSummary {
    if records.is_empty() {
        return CompetitiveSummary::default();
    }
    let within = |limit: f64| records.iter().filter(|r| r.current_position <= limit).count();
    let positions: Vec<f64> = records.iter().map(|r| r.current_position).collect();
    let difficulties: Vec<f64> = records.iter().map(|r| r.keyword_difficulty).collect();

    let total_search_volume: u64 = records.iter().map(|r| r.search_volume).sum();
    let captured_volume: u64 = records
        .iter()
        .filter(|r| r.current_position <= 10.0)
        .map(|r| r.search_volume)
        .sum();
    let market_share =
        safe_divide(captured_volume as f64, total_search_volume as f64, 0.0) * 100.0;

    CompetitiveSummary {
        total_keywords: records.len(),
        keywords_top_3: within(3.0),
        keywords_top_10: within(10.0),
        keywords_top_20: within(20.0),
        avg_position: round_to(mean(&positions), 2),
        median_position: round_to(median(&positions), 2),
        avg_difficulty: round_to(mean(&difficulties), 2),
        total_search_volume,
        captured_volume,
        market_share: round_to(market_share, 2),
    }
}

/// Position and volume profile per difficulty band. Empty bands omitted.
pub fn difficulty_impact(records: &[KeywordRecord]) -> Vec<DifficultyImpact> {
    let bands = [
        DifficultyBand::VeryEasy,
        DifficultyBand::Easy,
        DifficultyBand::Medium,
        DifficultyBand::Hard,
        DifficultyBand::VeryHard,
    ];

    bands
        .into_iter()
        .filter_map(|band| {
            let members: Vec<&KeywordRecord> = records
                .iter()
                .filter(|r| DifficultyBand::for_difficulty(r.keyword_difficulty) == Some(band))
                .collect();
            if members.is_empty() {
                return None;
            }
            let positions: Vec<f64> = members.iter().map(|r| r.current_position).collect();
            let volumes: Vec<f64> = members.iter().map(|r| r.search_volume as f64).collect();
            Some(DifficultyImpact {
                band,
                avg_position: round_to(mean(&positions), 2),
                median_position: round_to(median(&positions), 2),
                keyword_count: members.len(),
                avg_volume: round_to(mean(&volumes), 2),
                total_volume: members.iter().map(|r| r.search_volume).sum(),
            })
        })
        .collect()
}
