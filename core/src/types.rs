//! Shared primitive types used across the forecasting core.

/// A keyword (search query) string. Unique within a reconciled table.
pub type Keyword = String;

/// Search-ranking position. 1 = top result, lower is better.
pub type Position = f64;

/// Forecast horizon in days. Canonically 90, 180 or 360.
pub type HorizonDays = u32;
