//! Position buckets: a fixed, ordered partition of ranking positions.
//!
//! Exact positions 1–10, then 11-15, 16-20, 21-30, 31-50, 51-100.
//! Upper bounds are inclusive: position 10 belongs to "10", not "11-15";
//! position 10.2 belongs to "11-15".

use crate::types::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const POSITION_CEILING: Position = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PositionBucket {
    #[serde(rename = "1")]  P1,
    #[serde(rename = "2")]  P2,
    #[serde(rename = "3")]  P3,
    #[serde(rename = "4")]  P4,
    #[serde(rename = "5")]  P5,
    #[serde(rename = "6")]  P6,
    #[serde(rename = "7")]  P7,
    #[serde(rename = "8")]  P8,
    #[serde(rename = "9")]  P9,
    #[serde(rename = "10")] P10,
    #[serde(rename = "11-15")]  P11To15,
    #[serde(rename = "16-20")]  P16To20,
    #[serde(rename = "21-30")]  P21To30,
    #[serde(rename = "31-50")]  P31To50,
    #[serde(rename = "51-100")] P51To100,
}

impl PositionBucket {
    pub const ALL: [PositionBucket; 15] = [
        Self::P1, Self::P2, Self::P3, Self::P4, Self::P5,
        Self::P6, Self::P7, Self::P8, Self::P9, Self::P10,
        Self::P11To15, Self::P16To20, Self::P21To30, Self::P31To50, Self::P51To100,
    ];

    /// Bucket for an observed position, or None when the position lies
    /// outside the [0, 100] cover (or is not finite).
    pub fn for_position(position: Position) -> Option<Self> {
        if !position.is_finite() || !(0.0..=POSITION_CEILING).contains(&position) {
            return None;
        }
        Some(Self::covering(position))
    }

    /// Bucket used for lookups: everything at or above 1 maps somewhere,
    /// positions beyond 50 (including > 100) map to "51-100".
    pub fn covering(position: Position) -> Self {
        let upper_bounds: [(Position, Self); 14] = [
            (1.0, Self::P1), (2.0, Self::P2), (3.0, Self::P3), (4.0, Self::P4),
            (5.0, Self::P5), (6.0, Self::P6), (7.0, Self::P7), (8.0, Self::P8),
            (9.0, Self::P9), (10.0, Self::P10), (15.0, Self::P11To15),
            (20.0, Self::P16To20), (30.0, Self::P21To30), (50.0, Self::P31To50),
        ];
        upper_bounds
            .iter()
            .find(|(upper, _)| position <= *upper)
            .map(|(_, bucket)| *bucket)
            .unwrap_or(Self::P51To100)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::P1       => "1",
            Self::P2       => "2",
            Self::P3       => "3",
            Self::P4       => "4",
            Self::P5       => "5",
            Self::P6       => "6",
            Self::P7       => "7",
            Self::P8       => "8",
            Self::P9       => "9",
            Self::P10      => "10",
            Self::P11To15  => "11-15",
            Self::P16To20  => "16-20",
            Self::P21To30  => "21-30",
            Self::P31To50  => "31-50",
            Self::P51To100 => "51-100",
        }
    }
}

impl fmt::Display for PositionBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
