//! ==============================================================================
//! api.rs - client for the remote ThermoLog API
//! ==============================================================================
//!
//! purpose:
//!     thin async wrappers over the four endpoints the dashboard needs:
//!
//!         GET  {base}/hubs           -> Vec<Hub>
//!         GET  {base}/sensors        -> Vec<Sensor>
//!         GET  {base}/sensors/{id}   -> Sensor
//!         PUT  {base}/sensors/{id}   <- Sensor (json body)
//!
//! error policy:
//!     nothing here returns an error to the caller. any failure (connect,
//!     non-2xx status, undecodable body) is logged with the operation name and
//!     replaced by a fallback: empty list, None, or false. no retry, no
//!     timeout, no cancellation.
//!
//! ==============================================================================

use crate::hub::Hub;
use crate::sensor::Sensor;

use anyhow::{anyhow, Context, Result};
use log::{debug, error};
use reqwest::Url;
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct ThermoLogClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ThermoLogClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid ThermoLog API url {:?}", base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("ThermoLog API url {} cannot be a base", base_url));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    pub async fn get_hubs(&self) -> Vec<Hub> {
        handle_error("getHubs", self.fetch(&["hubs"]).await).unwrap_or_default()
    }

    pub async fn get_sensors(&self) -> Vec<Sensor> {
        handle_error("getSensors", self.fetch(&["sensors"]).await).unwrap_or_default()
    }

    pub async fn get_sensor(&self, sensor_id: &str) -> Option<Sensor> {
        handle_error("getSensor", self.fetch(&["sensors", sensor_id]).await)
    }

    /// PUT the full sensor; true when the API accepted it
    pub async fn update_sensor(&self, sensor: &Sensor) -> bool {
        let result = self.put(&["sensors", sensor.id.as_str()], sensor).await;
        handle_error("updateSensor", result).is_some()
    }

    async fn fetch<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments);
        debug!("GET {}", url);
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()?;
        let body = response
            .json::<T>()
            .await
            .with_context(|| format!("Unexpected response body from {}", url))?;
        Ok(body)
    }

    async fn put(&self, segments: &[&str], sensor: &Sensor) -> Result<()> {
        let url = self.endpoint(segments);
        debug!("PUT {}", url);
        self.http
            .put(url.clone())
            .json(sensor)
            .send()
            .await
            .with_context(|| format!("PUT {} failed", url))?
            .error_for_status()?;
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // checked in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// log a failed remote call and swallow the error
fn handle_error<T>(operation: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!("{} failed: {:#}", operation, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorGeneralType;

    use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// records every log line so tests can assert on diagnostics
    struct CaptureLogger;

    static CAPTURED: Mutex<Vec<(log::Level, String)>> = Mutex::new(Vec::new());
    static LOGGER: CaptureLogger = CaptureLogger;

    impl log::Log for CaptureLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            CAPTURED
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    /// install the capturing logger (once per test binary)
    fn capture_logs() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Trace);
    }

    /// error-level lines starting with `prefix`
    fn logged_errors(prefix: &str) -> Vec<String> {
        CAPTURED
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, line)| *level == log::Level::Error && line.starts_with(prefix))
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// serve a stub ThermoLog API on an ephemeral port, return its base url
    async fn stub_api() -> String {
        let app = Router::new()
            .route(
                "/api/v1/hubs",
                get(|| async {
                    Json(json!([
                        {"name": "Garage", "id": "AEB123512", "sensors": ["00001234"]}
                    ]))
                }),
            )
            .route(
                "/api/v1/sensors",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .route(
                "/api/v1/sensors/:id",
                get(|Path(id): Path<String>| async move {
                    if id == "00001234" {
                        Ok(Json(json!({
                            "id": id,
                            "type": "tower",
                            "name": "Porch",
                            "hubs": [],
                            "battery": "low"
                        })))
                    } else {
                        Err(StatusCode::NOT_FOUND)
                    }
                })
                .put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    if body["id"] == id.as_str() {
                        StatusCode::NO_CONTENT
                    } else {
                        StatusCode::BAD_REQUEST
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/v1", addr)
    }

    /// a base url nothing is listening on
    async fn dead_api() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/api/v1", addr)
    }

    #[test]
    fn test_endpoint_joins_and_escapes_segments() {
        let client = ThermoLogClient::new("http://localhost:3000/api/v1/").unwrap();
        assert_eq!(
            client.endpoint(&["sensors", "a b"]).as_str(),
            "http://localhost:3000/api/v1/sensors/a%20b"
        );
        assert!(ThermoLogClient::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_get_hubs() {
        let client = ThermoLogClient::new(&stub_api().await).unwrap();
        let hubs = client.get_hubs().await;
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0].name, "Garage");
        assert_eq!(hubs[0].sensors, vec!["00001234"]);
    }

    #[tokio::test]
    async fn test_get_sensor_and_update() {
        let client = ThermoLogClient::new(&stub_api().await).unwrap();

        let mut sensor = client.get_sensor("00001234").await.unwrap();
        assert_eq!(sensor.family(), SensorGeneralType::Tower);
        assert_eq!(sensor.battery, "low");

        sensor.rename("Front porch");
        assert!(client.update_sensor(&sensor).await);

        assert!(client.get_sensor("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_server_error_yields_empty_list() {
        let client = ThermoLogClient::new(&stub_api().await).unwrap();
        assert!(client.get_sensors().await.is_empty());
    }

    #[test]
    fn test_handle_error_logs_the_operation() {
        capture_logs();
        let result: Option<()> = handle_error("checkOperation", Err(anyhow!("boom")));

        assert!(result.is_none());
        assert_eq!(logged_errors("checkOperation"), vec!["checkOperation failed: boom"]);
        assert_eq!(handle_error("checkOperation", Ok(7)), Some(7));
    }

    #[tokio::test]
    async fn test_transport_failure_is_swallowed() {
        capture_logs();
        let client = ThermoLogClient::new(&dead_api().await).unwrap();

        assert!(client.get_sensors().await.is_empty());
        assert!(client.get_hubs().await.is_empty());
        assert!(client.get_sensor("00001234").await.is_none());
        assert!(!client.update_sensor(&Sensor::new()).await);

        assert!(!logged_errors("getSensors failed: GET ").is_empty());
        assert!(!logged_errors("updateSensor failed: PUT ").is_empty());
    }
}
