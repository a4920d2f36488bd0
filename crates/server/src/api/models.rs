//! Response data transfer objects.

use ottometer_core::GrowUnit;
use serde::Serialize;

/// A stored grow unit together with its derived metrics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GrowUnitResponse {
    #[serde(flatten)]
    pub unit: GrowUnit,
    pub area: u64,
    pub volume: u64,
}

impl From<GrowUnit> for GrowUnitResponse {
    fn from(unit: GrowUnit) -> Self {
        Self {
            area: unit.area(),
            volume: unit.volume(),
            unit,
        }
    }
}
