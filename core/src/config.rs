use crate::{
    error::{SeoError, SeoResult},
    types::{HorizonDays, Position},
};
use serde::{Deserialize, Serialize};

// ── Horizon scaling ────────────────────────────────────────────────

/// Horizons whose scaling must increase for every valid config.
pub const CANONICAL_HORIZONS: [HorizonDays; 3] = [90, 180, 360];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonPoint {
    pub days: HorizonDays,
    /// Fraction of the full improvement potential realised by `days`.
    pub fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingConfig {
    pub points: Vec<HorizonPoint>,
    /// Horizons that are not canonical scale as `days / default_divisor_days`.
    pub default_divisor_days: f64,
}

impl ScalingConfig {
    /// Fraction of the requested improvement realised after `days`.
    pub fn fraction_for(&self, days: HorizonDays) -> f64 {
        match self.points.iter().find(|p| p.days == days) {
            Some(point) => point.fraction,
            None        => days as f64 / self.default_divisor_days,
        }
    }
}

// ── Position-tier damping ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DampingTier {
    /// Tier applies to positions <= max_position (first match wins).
    pub max_position: Position,
    pub factor: f64,
}

// ── CTR model ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalCtr {
    pub position: u32,
    pub ctr: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtrModelConfig {
    /// Industry-average CTR by canonical position.
    pub default_table: Vec<CanonicalCtr>,
    /// Returned when a usable curve has no entry for the looked-up bucket.
    pub sparse_bucket_ctr: f64,
    /// Below this many observations the curve is ignored in favour of the
    /// default table.
    pub min_curve_samples: usize,
}

// ── Traffic value ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpcTier {
    pub min_volume: u64,
    pub cpc: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficValueConfig {
    /// Checked from highest threshold to lowest, first match wins.
    pub cpc_tiers: Vec<CpcTier>,
    /// CPC when no tier matches.
    pub fallback_cpc: f64,
    /// CPC for a keyword missing its own figure when the table carries CPC.
    pub missing_keyword_cpc: f64,
    /// value_increase_pct = clicks_increase_pct × this.
    pub value_increase_discount: f64,
}

// ── Scenario planning ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioLevel {
    pub name: String,
    pub label: String,
    pub improvement: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioPlanConfig {
    pub levels: Vec<ScenarioLevel>,
    pub horizons: Vec<HorizonDays>,
    pub timeline_months: u32,
    pub days_per_month: HorizonDays,
    pub roi_horizon_days: HorizonDays,
}

// ── Opportunity scoring ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityConfig {
    pub min_volume: u64,
    pub max_position: Position,
    /// Aspirational position used for the potential-clicks estimate.
    pub target_position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub scaling: ScalingConfig,
    pub damping: Vec<DampingTier>,
    pub ctr_model: CtrModelConfig,
    pub traffic_value: TrafficValueConfig,
    pub scenarios: ScenarioPlanConfig,
    pub opportunity: OpportunityConfig,
}

impl ForecastConfig {
    /// Load from the data/ directory.
    /// In tests, use ForecastConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/forecast/forecast_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: ForecastConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Damping multiplier for a keyword currently at `position`.
    pub fn damping_factor(&self, position: Position) -> f64 {
        self.damping
            .iter()
            .find(|tier| position <= tier.max_position)
            .map(|tier| tier.factor)
            .unwrap_or(1.0)
    }

    pub fn validate(&self) -> SeoResult<()> {
        // Scaling must increase strictly with horizon.
        let mut points: Vec<&HorizonPoint> = self.scaling.points.iter().collect();
        points.sort_by_key(|p| p.days);
        for pair in points.windows(2) {
            if pair[0].days == pair[1].days {
                return Err(SeoError::InvalidConfig(format!(
                    "scaling horizon {} listed twice",
                    pair[0].days
                )));
            }
            if pair[0].fraction >= pair[1].fraction {
                return Err(SeoError::InvalidConfig(format!(
                    "scaling must increase with horizon: {}d={} but {}d={}",
                    pair[0].days, pair[0].fraction, pair[1].days, pair[1].fraction
                )));
            }
        }
        if points.iter().any(|p| p.days == 0 || !(p.fraction.is_finite() && p.fraction > 0.0)) {
            return Err(SeoError::InvalidConfig(
                "scaling points need positive horizons and fractions".into(),
            ));
        }
        if !(self.scaling.default_divisor_days.is_finite() && self.scaling.default_divisor_days > 0.0) {
            return Err(SeoError::InvalidConfig("default_divisor_days must be positive".into()));
        }

        // The applied scaling (points plus the linear fallback) must also
        // increase across the canonical and scenario horizons.
        let horizons = &self.scenarios.horizons;
        if horizons.contains(&0) || horizons.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SeoError::InvalidConfig(
                "scenario horizons must be positive and strictly ascending".into(),
            ));
        }
        let mut checked: Vec<HorizonDays> =
            CANONICAL_HORIZONS.iter().chain(horizons).copied().collect();
        checked.sort_unstable();
        checked.dedup();
        for pair in checked.windows(2) {
            let (earlier, later) = (
                self.scaling.fraction_for(pair[0]),
                self.scaling.fraction_for(pair[1]),
            );
            if earlier >= later {
                return Err(SeoError::InvalidConfig(format!(
                    "applied scaling must increase with horizon: {}d={earlier} but {}d={later}",
                    pair[0], pair[1]
                )));
            }
        }

        if self.damping.iter().any(|t| !(t.factor > 0.0 && t.factor <= 1.0)) {
            return Err(SeoError::InvalidConfig("damping factors must lie in (0, 1]".into()));
        }

        let ctr = &self.ctr_model;
        if ctr.default_table.is_empty() {
            return Err(SeoError::InvalidConfig("default CTR table is empty".into()));
        }
        let in_unit = |v: f64| v.is_finite() && v > 0.0 && v <= 1.0;
        if ctr.default_table.iter().any(|c| !in_unit(c.ctr)) || !in_unit(ctr.sparse_bucket_ctr) {
            return Err(SeoError::InvalidConfig("CTR values must lie in (0, 1]".into()));
        }
        if ctr.min_curve_samples == 0 {
            return Err(SeoError::InvalidConfig("min_curve_samples must be at least 1".into()));
        }

        let tiers = &self.traffic_value.cpc_tiers;
        if tiers.windows(2).any(|w| w[0].min_volume <= w[1].min_volume) {
            return Err(SeoError::InvalidConfig(
                "cpc tiers must be sorted by descending min_volume".into(),
            ));
        }

        if self.scenarios.days_per_month == 0 || self.scenarios.roi_horizon_days == 0 {
            return Err(SeoError::InvalidConfig("scenario horizons must be positive".into()));
        }
        Ok(())
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        let default_table = [
            (1, 0.315), (2, 0.242), (3, 0.185), (4, 0.142), (5, 0.109),
            (6, 0.084), (7, 0.065), (8, 0.050), (9, 0.039), (10, 0.030),
            (11, 0.023), (12, 0.018), (13, 0.014), (14, 0.011), (15, 0.008),
            (20, 0.003), (30, 0.001), (50, 0.0005), (100, 0.0001),
        ]
        .into_iter()
        .map(|(position, ctr)| CanonicalCtr { position, ctr })
        .collect();

        let cpc_tiers = [(50_000, 8.00), (10_000, 5.00), (1_000, 2.50), (100, 1.20)]
            .into_iter()
            .map(|(min_volume, cpc)| CpcTier { min_volume, cpc })
            .collect();

        let levels = [
            ("conservative", "Conservative (5 positions)", 5.0),
            ("moderate",     "Moderate (10 positions)",    10.0),
            ("aggressive",   "Aggressive (15 positions)",  15.0),
        ]
        .into_iter()
        .map(|(name, label, improvement)| ScenarioLevel {
            name:  name.into(),
            label: label.into(),
            improvement,
        })
        .collect();

        Self {
            scaling: ScalingConfig {
                points: vec![
                    HorizonPoint { days: 90,  fraction: 0.30 },
                    HorizonPoint { days: 180, fraction: 0.65 },
                    HorizonPoint { days: 360, fraction: 1.0 },
                ],
                default_divisor_days: 360.0,
            },
            damping: vec![
                DampingTier { max_position: 3.0,  factor: 0.4 },
                DampingTier { max_position: 10.0, factor: 0.7 },
            ],
            ctr_model: CtrModelConfig {
                default_table,
                sparse_bucket_ctr: 0.01,
                min_curve_samples: 10,
            },
            traffic_value: TrafficValueConfig {
                cpc_tiers,
                fallback_cpc: 0.50,
                missing_keyword_cpc: 0.50,
                value_increase_discount: 0.95,
            },
            scenarios: ScenarioPlanConfig {
                levels,
                horizons: vec![90, 180, 360],
                timeline_months: 12,
                days_per_month: 30,
                roi_horizon_days: 360,
            },
            opportunity: OpportunityConfig {
                min_volume: 100,
                max_position: 30.0,
                target_position: 3.0,
            },
        }
    }
}
