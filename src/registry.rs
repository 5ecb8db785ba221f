//! ==============================================================================
//! registry.rs - owning store for sensors and hubs
//! ==============================================================================
//!
//! purpose:
//!     sensors and hubs are plain values owned here, keyed by id. a hub refers
//!     to sensors by id only. `ingest` is the one place where a weather update
//!     touches both:
//!
//!         update ─► sensor (created via Sensor::for_subtype if new)
//!                   └─ apply_weather_update
//!                ─► hub (created on first contact, named after its id)
//!                   └─ register_sensor
//!                ─► report built by the sensor's family
//!
//! ==============================================================================

use crate::hub::Hub;
use crate::report::Report;
use crate::sensor::Sensor;
use crate::weather::WeatherUpdate;

use log::info;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct Registry {
    sensors: BTreeMap<String, Sensor>,
    hubs: BTreeMap<String, Hub>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, update: &WeatherUpdate) -> Report {
        let common = update.common();

        let sensor = self
            .sensors
            .entry(common.sensor.clone())
            .or_insert_with(|| {
                info!("new sensor {} ({})", common.sensor, common.mt);
                Sensor::for_subtype(&common.mt)
            });
        sensor.apply_weather_update(update);
        let report = sensor.build_report(update);

        self.hubs
            .entry(common.id.clone())
            .or_insert_with(|| {
                info!("new hub {}", common.id);
                Hub::new(&common.id, &common.id)
            })
            .register_sensor(&common.sensor);

        report
    }

    pub fn sensor(&self, id: &str) -> Option<&Sensor> {
        self.sensors.get(id)
    }

    pub fn hub(&self, id: &str) -> Option<&Hub> {
        self.hubs.get(id)
    }

    /// sensors ordered by id
    pub fn sensors(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.values()
    }

    /// hubs ordered by id
    pub fn hubs(&self) -> impl Iterator<Item = &Hub> {
        self.hubs.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportDetails;
    use crate::types::{SensorGeneralType, SensorSpecificType};
    use std::collections::HashMap;

    fn update(hub: &str, mt: &str, rssi: &str) -> WeatherUpdate {
        let fields: HashMap<String, String> = [
            ("id", hub),
            ("sensor", "00001234"),
            ("mt", mt),
            ("rssi", rssi),
            ("battery", "normal"),
            ("baromin", "30.17"),
            ("tempf", "40.2"),
            ("humidity", "54"),
            ("windspeedmph", "5"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        WeatherUpdate::from_fields(&fields)
    }

    #[test]
    fn test_ingest_creates_sensor_and_hub() {
        let mut registry = Registry::new();
        let report = registry.ingest(&update("HUB1", "5N1x38", "2"));

        assert_eq!(
            report.details,
            ReportDetails::FiveInOne {
                wind_speed: Some(5),
                rain: None,
                daily_rain: None,
                wind_dir: None,
            }
        );

        let sensor = registry.sensor("00001234").unwrap();
        assert_eq!(sensor.family(), SensorGeneralType::FiveInOne);
        assert_eq!(registry.hub("HUB1").unwrap().sensors, vec!["00001234"]);
    }

    #[test]
    fn test_same_sensor_heard_by_two_hubs() {
        let mut registry = Registry::new();
        registry.ingest(&update("HUB1", "5N1x38", "2"));
        registry.ingest(&update("HUB2", "5N1x31", "4"));
        registry.ingest(&update("HUB1", "5N1x38", "3"));

        assert_eq!(registry.sensors().count(), 1);
        let sensor = registry.sensor("00001234").unwrap();
        assert_eq!(sensor.hubs.len(), 2);
        assert_eq!(sensor.find_hub("HUB1").and_then(|h| h.signal), Some(3));
        assert_eq!(
            sensor.sub_types,
            vec![SensorSpecificType::FiveInOne38, SensorSpecificType::FiveInOne31]
        );

        let hub_ids: Vec<&str> = registry.hubs().map(|h| h.id.as_str()).collect();
        assert_eq!(hub_ids, vec!["HUB1", "HUB2"]);
        assert_eq!(registry.hub("HUB1").unwrap().sensors.len(), 1);
    }
}
