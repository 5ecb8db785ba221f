//! hub entity: a gateway device and the ids of the sensors it has heard

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hub {
    #[serde(default)]
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub sensors: Vec<String>,
}

impl Hub {
    pub fn new(name: &str, id: &str) -> Self {
        Hub {
            name: name.to_string(),
            id: id.to_string(),
            sensors: Vec::new(),
        }
    }

    /// remember a sensor id; idempotent, keeps first-seen order
    pub fn register_sensor(&mut self, sensor_id: &str) -> &mut Self {
        if !self.sensors.iter().any(|id| id == sensor_id) {
            self.sensors.push(sensor_id.to_string());
        }
        self
    }
}
