//! ==============================================================================
//! types.rs - sensor type taxonomy
//! ==============================================================================
//!
//! purpose:
//!     two related classifications of a sensor:
//!     - SensorSpecificType: the exact hardware/protocol variant named by the
//!       `mt` field of a weather update (e.g. "5N1x31")
//!     - SensorGeneralType: the coarse family; both five-in-one variants
//!       collapse into `fiveInOne`
//!
//! relationships:
//!     - used by: weather.rs (classifying updates), report.rs, sensor.rs
//!
//! ==============================================================================

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// exact sensor variant, as reported in a weather update's `mt` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorSpecificType {
    #[serde(rename = "tower")]
    Tower,
    #[serde(rename = "5N1x38")]
    FiveInOne38,
    #[serde(rename = "5N1x31")]
    FiveInOne31,
    #[serde(rename = "ProIn")]
    ProIn,
    #[serde(rename = "unknown")]
    Unknown,
}

/// coarse sensor family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SensorGeneralType {
    #[serde(rename = "tower")]
    Tower,
    #[serde(rename = "fiveInOne")]
    FiveInOne,
    #[serde(rename = "ProIn")]
    ProIn,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

/// type text that matches no known sensor variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedType(pub String);

impl fmt::Display for UnrecognizedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized sensor type {:?}", self.0)
    }
}

impl std::error::Error for UnrecognizedType {}

impl SensorSpecificType {
    pub const ALL: [SensorSpecificType; 5] = [
        SensorSpecificType::Tower,
        SensorSpecificType::FiveInOne38,
        SensorSpecificType::FiveInOne31,
        SensorSpecificType::ProIn,
        SensorSpecificType::Unknown,
    ];

    /// text used on the wire (`mt` field, `subTypes` entries)
    pub fn as_str(self) -> &'static str {
        match self {
            SensorSpecificType::Tower => "tower",
            SensorSpecificType::FiveInOne38 => "5N1x38",
            SensorSpecificType::FiveInOne31 => "5N1x31",
            SensorSpecificType::ProIn => "ProIn",
            SensorSpecificType::Unknown => "unknown",
        }
    }

    fn member_name(self) -> &'static str {
        match self {
            SensorSpecificType::Tower => "tower",
            SensorSpecificType::FiveInOne38 => "fiveInOne38",
            SensorSpecificType::FiveInOne31 => "fiveInOne31",
            SensorSpecificType::ProIn => "proIn",
            SensorSpecificType::Unknown => "unknown",
        }
    }

    /// look up a specific type by its wire text or its member name.
    ///
    /// matching is exact (case-sensitive). `"unknown"` is a valid type and
    /// resolves to `Unknown`; any other unmatched text is an error.
    pub fn from_text(text: &str) -> Result<Self, UnrecognizedType> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == text || t.member_name() == text)
            .ok_or_else(|| UnrecognizedType(text.to_string()))
    }

    /// like `from_text`, but unrecognized text degrades to `Unknown`
    pub fn from_text_lossy(text: &str) -> Self {
        Self::from_text(text).unwrap_or_else(|e| {
            warn!("{}, treating as unknown", e);
            SensorSpecificType::Unknown
        })
    }

    pub fn general(self) -> SensorGeneralType {
        SensorGeneralType::from_specific(self)
    }
}

impl FromStr for SensorSpecificType {
    type Err = UnrecognizedType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl fmt::Display for SensorSpecificType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SensorGeneralType {
    pub const ALL: [SensorGeneralType; 4] = [
        SensorGeneralType::Tower,
        SensorGeneralType::FiveInOne,
        SensorGeneralType::ProIn,
        SensorGeneralType::Unknown,
    ];

    /// look up a family by its wire text, ex: "fiveInOne"
    pub fn from_text(text: &str) -> Result<Self, UnrecognizedType> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == text)
            .ok_or_else(|| UnrecognizedType(text.to_string()))
    }

    /// like `from_text`, but unrecognized text degrades to `Unknown`
    pub fn from_text_lossy(text: &str) -> Self {
        Self::from_text(text).unwrap_or_else(|e| {
            warn!("{}, treating as unknown", e);
            SensorGeneralType::Unknown
        })
    }

    pub fn from_specific(specific: SensorSpecificType) -> Self {
        match specific {
            SensorSpecificType::FiveInOne31 | SensorSpecificType::FiveInOne38 => {
                SensorGeneralType::FiveInOne
            }
            SensorSpecificType::Tower => SensorGeneralType::Tower,
            SensorSpecificType::ProIn => SensorGeneralType::ProIn,
            SensorSpecificType::Unknown => SensorGeneralType::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SensorGeneralType::Tower => "tower",
            SensorGeneralType::FiveInOne => "fiveInOne",
            SensorGeneralType::ProIn => "ProIn",
            SensorGeneralType::Unknown => "unknown",
        }
    }
}

impl From<SensorSpecificType> for SensorGeneralType {
    fn from(specific: SensorSpecificType) -> Self {
        Self::from_specific(specific)
    }
}

impl fmt::Display for SensorGeneralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
