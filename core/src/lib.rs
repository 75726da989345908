//! SEO performance forecasting core.
//!
//! Data flows one direction:
//!   reconciled table → CtrModel → Forecaster → aggregate / ROI metrics
//!
//! Every operation is a pure, synchronous function of its inputs.

pub mod analysis;
pub mod arithmetic;
pub mod bucket;
pub mod config;
pub mod ctr_model;
pub mod error;
pub mod forecaster;
pub mod opportunity;
pub mod quality;
pub mod reconcile;
pub mod record;
pub mod types;

pub use arithmetic::safe_divide;
pub use config::ForecastConfig;
pub use ctr_model::{CtrCurve, CtrModel, CtrSource};
pub use error::{SeoError, SeoResult};
pub use forecaster::{Forecaster, ForecastResult, KeywordForecast, ScenarioConfig};
pub use opportunity::{identify_opportunities, Opportunity};
pub use record::KeywordRecord;
