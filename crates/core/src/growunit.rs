//! Grow unit record and validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reasons a grow unit is rejected before it reaches storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid dimension: width must be greater than zero")]
    InvalidDimension,

    #[error("Unknown grow medium: {0:?}")]
    UnknownGrowMedium(String),
}

/// Substrate the plants in a grow unit are rooted in.
///
/// Values outside the recognized set are kept as `Unrecognized` so that a
/// payload with a typo still decodes and is rejected by [`GrowUnit::verify`]
/// with a meaningful error instead of an opaque decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GrowMedium {
    Dirt,
    Water,
    Cocos,
    Unrecognized(String),
}

impl GrowMedium {
    /// The stored/wire name of this medium.
    pub fn as_str(&self) -> &str {
        match self {
            GrowMedium::Dirt => "dirt",
            GrowMedium::Water => "water",
            GrowMedium::Cocos => "cocos",
            GrowMedium::Unrecognized(other) => other,
        }
    }

    /// Check if this is one of the three supported media.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, GrowMedium::Unrecognized(_))
    }
}

impl Default for GrowMedium {
    fn default() -> Self {
        GrowMedium::Unrecognized(String::new())
    }
}

impl From<String> for GrowMedium {
    fn from(value: String) -> Self {
        match value.as_str() {
            "dirt" => GrowMedium::Dirt,
            "water" => GrowMedium::Water,
            "cocos" => GrowMedium::Cocos,
            _ => GrowMedium::Unrecognized(value),
        }
    }
}

impl From<&str> for GrowMedium {
    fn from(value: &str) -> Self {
        GrowMedium::from(value.to_string())
    }
}

impl From<GrowMedium> for String {
    fn from(medium: GrowMedium) -> Self {
        match medium {
            GrowMedium::Unrecognized(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for GrowMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cultivation chamber.
///
/// Field names on the wire and in storage are PascalCase (`Width`,
/// `CarbonFilter`, ...). Missing fields decode to zero/false/empty, so an
/// incomplete payload is caught by [`GrowUnit::verify`] rather than by the
/// decoder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GrowUnit {
    /// Identifier assigned by the store. Ignored on create.
    pub id: u64,
    /// Free-form label shown in the web UI.
    pub name: String,
    pub width: u64,
    pub height: u64,
    pub depth: u64,
    pub carbon_filter: bool,
    pub active_intake: bool,
    #[serde(rename = "OuttakeFanThroughputInM3H")]
    pub outtake_fan_throughput_in_m3h: u64,
    pub wattage_lamp: u64,
    pub ventilation: bool,
    pub inside: bool,
    pub grow_medium: GrowMedium,
}

impl GrowUnit {
    /// Check the record before it is persisted.
    ///
    /// Only the width and the grow medium are checked; zero fan throughput,
    /// wattage, height or depth are accepted.
    pub fn verify(&self) -> Result<(), ValidationError> {
        if self.width == 0 {
            return Err(ValidationError::InvalidDimension);
        }

        if !self.grow_medium.is_recognized() {
            return Err(ValidationError::UnknownGrowMedium(
                self.grow_medium.as_str().to_string(),
            ));
        }

        Ok(())
    }

    /// Floor area (width × depth).
    pub fn area(&self) -> u64 {
        self.width.saturating_mul(self.depth)
    }

    /// Inner volume (width × depth × height).
    pub fn volume(&self) -> u64 {
        self.area().saturating_mul(self.height)
    }

    /// Return a copy of this record carrying the given identifier.
    pub fn with_id(&self, id: u64) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}
