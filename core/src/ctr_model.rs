//! CTR model: empirical click-through rate by ranking position.
//!
//! The curve is learned from the reconciled table: records are bucketed by
//! position (see bucket.rs) and each populated bucket keeps summary
//! statistics of its observed CTR. Lookups use the bucket mean.
//!
//! The built-in industry table is the safety net. It is used when no curve
//! was built, and when the curve rests on fewer than `min_curve_samples`
//! observations. A usable curve that lacks the looked-up bucket answers
//! with the sparse-bucket CTR instead of 0.
//!
//! Invariant: lookup() returns a finite value in (0, 1] for any input.

use crate::{
    arithmetic::{round_to, safe_divide},
    bucket::{PositionBucket, POSITION_CEILING},
    config::{CanonicalCtr, CtrModelConfig},
    record::KeywordRecord,
    types::Position,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Observed CTR statistics for one position bucket (rounded to 4 places).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    pub bucket:        PositionBucket,
    pub mean:          f64,
    pub median:        f64,
    /// Sample standard deviation; 0 for a single observation.
    pub std_dev:       f64,
    pub count:         usize,
    pub min:           f64,
    pub max:           f64,
    /// Σ(ctr × volume) / Σ(volume), 0 when the bucket has no volume.
    pub weighted_mean: f64,
}

impl BucketStats {
    fn from_observations(bucket: PositionBucket, observations: &[(f64, u64)]) -> Self {
        let count = observations.len();
        let mut ctrs: Vec<f64> = observations.iter().map(|(ctr, _)| *ctr).collect();
        ctrs.sort_by(|a, b| a.total_cmp(b));

        let mean = safe_divide(ctrs.iter().sum::<f64>(), count as f64, 0.0);

        let median = match count {
            0 => 0.0,
            n if n % 2 == 1 => ctrs[n / 2],
            n => (ctrs[n / 2 - 1] + ctrs[n / 2]) / 2.0,
        };

        let std_dev = if count > 1 {
            let squared: f64 = ctrs.iter().map(|c| (c - mean).powi(2)).sum();
            safe_divide(squared, (count - 1) as f64, 0.0).sqrt()
        } else {
            0.0
        };

        let weighted_sum: f64 = observations.iter().map(|(ctr, vol)| ctr * *vol as f64).sum();
        let total_volume: f64 = observations.iter().map(|(_, vol)| *vol as f64).sum();
        let weighted_mean = safe_divide(weighted_sum, total_volume, 0.0);

        Self {
            bucket,
            mean:          round_to(mean, 4),
            median:        round_to(median, 4),
            std_dev:       round_to(std_dev, 4),
            count,
            min:           round_to(ctrs.first().copied().unwrap_or(0.0), 4),
            max:           round_to(ctrs.last().copied().unwrap_or(0.0), 4),
            weighted_mean: round_to(weighted_mean, 4),
        }
    }
}

/// CTR-by-position curve for one dataset snapshot. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtrCurve {
    buckets:      BTreeMap<PositionBucket, BucketStats>,
    sample_count: usize,
}

impl CtrCurve {
    /// Partition records by position bucket and summarise each populated
    /// bucket. Records outside the bucket cover or with a non-finite CTR
    /// are not observations. Empty buckets are omitted.
    pub fn build(records: &[KeywordRecord]) -> Self {
        let mut grouped: BTreeMap<PositionBucket, Vec<(f64, u64)>> = BTreeMap::new();
        for record in records {
            if !record.ctr.is_finite() {
                continue;
            }
            if let Some(bucket) = PositionBucket::for_position(record.current_position) {
                grouped
                    .entry(bucket)
                    .or_default()
                    .push((record.ctr, record.search_volume));
            }
        }

        let sample_count = grouped.values().map(Vec::len).sum();
        let buckets = grouped
            .into_iter()
            .map(|(bucket, obs)| (bucket, BucketStats::from_observations(bucket, &obs)))
            .collect();

        Self { buckets, sample_count }
    }

    pub fn get(&self, bucket: PositionBucket) -> Option<&BucketStats> {
        self.buckets.get(&bucket)
    }

    /// Populated buckets, best position first.
    pub fn buckets(&self) -> impl Iterator<Item = &BucketStats> {
        self.buckets.values()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtrSource {
    /// Lookups read the dataset's own curve.
    Empirical,
    /// Lookups read the built-in industry table.
    DefaultTable,
}

#[derive(Debug, Clone)]
pub struct CtrModel {
    curve:         Option<CtrCurve>,
    /// Sorted by canonical position ascending.
    default_table: Vec<CanonicalCtr>,
    sparse_ctr:    f64,
    min_samples:   usize,
}

impl CtrModel {
    /// A model with no curve: every lookup reads the default table.
    pub fn default_table(config: &CtrModelConfig) -> Self {
        let mut default_table = config.default_table.clone();
        default_table.sort_by_key(|c| c.position);
        Self {
            curve: None,
            default_table,
            sparse_ctr: config.sparse_bucket_ctr,
            min_samples: config.min_curve_samples,
        }
    }

    /// Build the curve from `records` and wrap it in a model.
    pub fn from_records(records: &[KeywordRecord], config: &CtrModelConfig) -> Self {
        let curve = CtrCurve::build(records);
        let mut model = Self::default_table(config);

        log::debug!(
            "ctr: curve built buckets={} samples={} min_samples={}",
            curve.bucket_count(),
            curve.sample_count(),
            model.min_samples,
        );

        model.curve = Some(curve);
        if model.source() == CtrSource::DefaultTable {
            log::info!("ctr: dataset too small for an empirical curve, using default table");
        }
        model
    }

    pub fn curve(&self) -> Option<&CtrCurve> {
        self.curve.as_ref()
    }

    pub fn source(&self) -> CtrSource {
        match self.usable_curve() {
            Some(_) => CtrSource::Empirical,
            None    => CtrSource::DefaultTable,
        }
    }

    fn usable_curve(&self) -> Option<&CtrCurve> {
        self.curve
            .as_ref()
            .filter(|c| c.sample_count() >= self.min_samples.max(1))
    }

    /// Estimated CTR at `position`. Always finite and in (0, 1].
    pub fn lookup(&self, position: Position) -> f64 {
        let position = if position.is_finite() { position } else { POSITION_CEILING };

        let ctr = match self.usable_curve() {
            Some(curve) => curve
                .get(PositionBucket::covering(position))
                .map(|stats| stats.mean)
                .filter(|mean| mean.is_finite() && *mean > 0.0)
                .unwrap_or(self.sparse_ctr),
            None => self.default_ctr(position),
        };

        if ctr.is_finite() && ctr > 0.0 {
            ctr.min(1.0)
        } else {
            // Only reachable with an unvalidated config.
            0.01
        }
    }

    /// Closest canonical position by absolute distance, ties to the better
    /// (lower) position.
    fn default_ctr(&self, position: Position) -> f64 {
        let mut best: Option<(f64, f64)> = None;
        for entry in &self.default_table {
            let distance = (entry.position as f64 - position).abs();
            match best {
                Some((best_distance, _)) if distance >= best_distance => {}
                _ => best = Some((distance, entry.ctr)),
            }
        }
        best.map(|(_, ctr)| ctr).unwrap_or(self.sparse_ctr)
    }
}
