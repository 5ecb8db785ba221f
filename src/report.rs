//! ==============================================================================
//! report.rs - typed reports built from weather updates
//! ==============================================================================
//!
//! purpose:
//!     a Report is the structured, immutable snapshot of one weather update.
//!     every report carries the same base fields; `ReportDetails` holds what
//!     is specific to the sensor family that produced it.
//!
//!     which builder runs is decided by the sensor (see sensor.rs), not by
//!     re-inspecting the update here. the one exception is the five-in-one
//!     family, whose two message types carry disjoint field sets:
//!
//!         5N1x31  -> wind speed, wind direction, rain, daily rain
//!         5N1x38  -> temperature, humidity, wind speed
//!
//! ==============================================================================

use crate::types::{SensorGeneralType, SensorSpecificType};
use crate::weather::{
    parse_decimal, parse_integer, CommonFields, FiveInOneUpdate, ProInUpdate, TowerUpdate,
};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// when this report was built
    pub date: DateTime<Utc>,
    #[serde(rename = "hubID")]
    pub hub_id: String,
    #[serde(rename = "sensorID")]
    pub sensor_id: String,
    #[serde(rename = "type")]
    pub sensor_type: SensorGeneralType,
    pub barometric: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(flatten)]
    pub details: ReportDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "camelCase")]
pub enum ReportDetails {
    /// built by a sensor of unknown family
    Common,
    Tower,
    Pro {
        #[serde(rename = "waterIsPresent")]
        water_is_present: bool,
    },
    FiveInOne {
        #[serde(rename = "windSpeed")]
        wind_speed: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        rain: Option<f64>,
        #[serde(rename = "dailyRain", skip_serializing_if = "Option::is_none")]
        daily_rain: Option<f64>,
        #[serde(rename = "windDir", skip_serializing_if = "Option::is_none")]
        wind_dir: Option<i64>,
    },
}

impl Report {
    /// base report: only the fields every update carries
    pub fn common(fields: &CommonFields) -> Self {
        Report {
            date: Utc::now(),
            hub_id: fields.id.clone(),
            sensor_id: fields.sensor.clone(),
            sensor_type: SensorSpecificType::from_text_lossy(&fields.mt).general(),
            barometric: parse_decimal(&fields.baromin),
            temperature: None,
            humidity: None,
            details: ReportDetails::Common,
        }
    }

    pub fn tower(update: &TowerUpdate) -> Self {
        Report {
            details: ReportDetails::Tower,
            ..Report::common(&update.common)
        }
        .with_temperature(&update.tempf)
        .with_humidity(&update.humidity)
    }

    pub fn pro(update: &ProInUpdate) -> Self {
        Report {
            details: ReportDetails::Pro {
                water_is_present: update.water == "1",
            },
            ..Report::common(&update.common)
        }
        .with_temperature(&update.indoortempf)
        .with_humidity(&update.indoorhumidity)
    }

    pub fn five_in_one(update: &FiveInOneUpdate) -> Self {
        match update {
            FiveInOneUpdate::X31(u) => Report {
                details: ReportDetails::FiveInOne {
                    wind_speed: parse_integer(&u.windspeedmph),
                    rain: Some(parse_decimal(&u.rainin)),
                    daily_rain: Some(parse_decimal(&u.dailyrainin)),
                    wind_dir: parse_integer(&u.winddir),
                },
                ..Report::common(&u.common)
            },
            FiveInOneUpdate::X38(u) => Report {
                details: ReportDetails::FiveInOne {
                    wind_speed: parse_integer(&u.windspeedmph),
                    rain: None,
                    daily_rain: None,
                    wind_dir: None,
                },
                ..Report::common(&u.common)
            }
            .with_temperature(&u.tempf)
            .with_humidity(&u.humidity),
        }
    }

    pub fn with_temperature(mut self, temperature: &str) -> Self {
        self.temperature = Some(parse_decimal(temperature));
        self
    }

    pub fn with_humidity(mut self, humidity: &str) -> Self {
        self.humidity = Some(parse_decimal(humidity));
        self
    }
}
