use crate::C;
use serde::Serialize;

const HEALTHY_NDVI: C = 0.6;
const MODERATE_NDVI: C = 0.3;

/// Vegetation health band derived from an NDVI score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VegetationHealth {
    /// NDVI ≥ 0.6
    Healthy,
    /// 0.3 ≤ NDVI < 0.6
    Moderate,
    /// NDVI < 0.3
    Poor,
    NoData,
}

impl VegetationHealth {
    pub fn from_score(ndvi: Option<C>) -> Self {
        match ndvi {
            None => Self::NoData,
            Some(score) if score >= HEALTHY_NDVI => Self::Healthy,
            Some(score) if score >= MODERATE_NDVI => Self::Moderate,
            Some(_) => Self::Poor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
            Self::NoData => "No data",
        }
    }
}
