//! ==============================================================================
//! lib.rs - thermolog dashboard library
//! ==============================================================================
//!
//! the data model and remote access used by the dashboard binary:
//!
//!     types     - specific/general sensor type taxonomy
//!     weather   - raw weather update payloads, one variant per family
//!     report    - typed reports built from weather updates
//!     sensor    - sensor entity, per-hub contact info, report dispatch
//!     hub       - hub entity
//!     registry  - owning store keyed by id; ingests weather updates
//!     api       - ThermoLog API client (errors logged, never returned)
//!     views     - html rendering
//!     config    - dashboard.toml loader
//!
//! ==============================================================================

pub mod api;
pub mod config;
pub mod hub;
pub mod registry;
pub mod report;
pub mod sensor;
pub mod types;
pub mod views;
pub mod weather;

pub use hub::Hub;
pub use report::{Report, ReportDetails};
pub use sensor::{Sensor, SensorHub};
pub use types::{SensorGeneralType, SensorSpecificType, UnrecognizedType};
pub use weather::WeatherUpdate;
