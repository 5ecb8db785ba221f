//! ==============================================================================
//! sensor.rs - the sensor entity
//! ==============================================================================
//!
//! purpose:
//!     a Sensor is keyed by its id and accumulates what we learn from every
//!     weather update it sends: subtypes seen, per-hub signal/contact info and
//!     battery state. it is also the JSON shape served by the ThermoLog API.
//!
//!     each sensor has a report family fixed when it is created. the family
//!     picks the report builder:
//!
//!         tower      -> Report::tower
//!         ProIn      -> Report::pro
//!         fiveInOne  -> Report::five_in_one
//!         unknown    -> Report::common
//!
//! relationships:
//!     - uses: types.rs, weather.rs, report.rs
//!     - used by: registry.rs (owning store), api.rs (wire format), views.rs
//!
//! ==============================================================================

use crate::report::Report;
use crate::types::{SensorGeneralType, SensorSpecificType};
use crate::weather::{parse_integer, WeatherUpdate};

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

/// what one hub knows about a sensor it has heard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorHub {
    /// hub id
    pub id: String,
    /// signal strength of the sensor at this hub
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<i64>,
    /// last time this hub received a signal from the sensor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub id: String,
    #[serde(rename = "type")]
    pub sensor_type: SensorGeneralType,
    /// specific types seen from this id; only tracked for five-in-one sensors
    pub sub_types: Vec<SensorSpecificType>,
    pub name: String,
    pub hubs: Vec<SensorHub>,
    pub battery: String,
    #[serde(skip)]
    family: SensorGeneralType,
}

/// API shape of a sensor, tolerant of missing fields
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SensorRecord {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    sensor_type: Option<String>,
    #[serde(default)]
    sub_types: Vec<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    hubs: Vec<SensorHub>,
    #[serde(default)]
    battery: String,
}

impl<'de> Deserialize<'de> for Sensor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = SensorRecord::deserialize(deserializer)?;
        let sensor_type = record
            .sensor_type
            .as_deref()
            .map(SensorGeneralType::from_text_lossy)
            .unwrap_or_default();
        Ok(Sensor {
            id: record.id,
            sensor_type,
            sub_types: record
                .sub_types
                .iter()
                .map(|t| SensorSpecificType::from_text_lossy(t))
                .collect(),
            name: record.name,
            hubs: record.hubs,
            battery: record.battery,
            family: sensor_type,
        })
    }
}

impl Sensor {
    /// a sensor with no known family; builds common reports
    pub fn new() -> Self {
        Self::default()
    }

    /// create the sensor variant matching a specific type text, ex: "5N1x31"
    pub fn for_subtype(sensor_sub_type: &str) -> Self {
        Sensor {
            family: SensorSpecificType::from_text_lossy(sensor_sub_type).general(),
            ..Self::default()
        }
    }

    /// report family this sensor builds
    pub fn family(&self) -> SensorGeneralType {
        self.family
    }

    /// fold one weather update into this sensor
    pub fn apply_weather_update(&mut self, update: &WeatherUpdate) -> &mut Self {
        let common = update.common();
        self.set_id(&common.sensor)
            .update_sub_types(update.specific_type())
            .upsert_hub(&common.id, parse_integer(&common.rssi))
            .set_battery(&common.battery)
    }

    /// build the report variant for this sensor's family
    pub fn build_report(&self, update: &WeatherUpdate) -> Report {
        match (self.family, update) {
            (SensorGeneralType::Tower, WeatherUpdate::Tower(u)) => Report::tower(u),
            (SensorGeneralType::ProIn, WeatherUpdate::ProIn(u)) => Report::pro(u),
            (SensorGeneralType::FiveInOne, WeatherUpdate::FiveInOne(u)) => Report::five_in_one(u),
            (SensorGeneralType::Unknown, _) => Report::common(update.common()),
            (family, _) => {
                warn!(
                    "sensor {} ({}) got a {} update, building a common report",
                    self.id,
                    family,
                    update.general_type()
                );
                Report::common(update.common())
            }
        }
    }

    pub fn set_id(&mut self, id: &str) -> &mut Self {
        self.id = id.to_string();
        self
    }

    /// recompute the general type and remember five-in-one subtypes
    pub fn update_sub_types(&mut self, specific_type: SensorSpecificType) -> &mut Self {
        self.sensor_type = specific_type.general();

        // only five-in-one sensors alternate between subtypes
        if self.sensor_type == SensorGeneralType::FiveInOne
            && !self.sub_types.contains(&specific_type)
        {
            self.sub_types.push(specific_type);
        }
        self
    }

    pub fn find_hub(&self, hub_id: &str) -> Option<&SensorHub> {
        self.hubs.iter().find(|hub| hub.id == hub_id)
    }

    /// record a contact from a hub, replacing signal and time if already known
    pub fn upsert_hub(&mut self, hub_id: &str, signal_strength: Option<i64>) -> &mut Self {
        let now = Utc::now();
        match self.hubs.iter_mut().find(|hub| hub.id == hub_id) {
            Some(hub) => {
                hub.signal = signal_strength;
                hub.last_contact = Some(now);
            }
            None => self.hubs.push(SensorHub {
                id: hub_id.to_string(),
                signal: signal_strength,
                last_contact: Some(now),
            }),
        }
        self
    }

    pub fn set_battery(&mut self, battery: &str) -> &mut Self {
        self.battery = battery.to_string();
        self
    }

    pub fn rename(&mut self, name: &str) -> &mut Self {
        self.name = name.trim().to_string();
        self
    }

    /// name for display, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}
