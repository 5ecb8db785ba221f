//! ==============================================================================
//! main.rs - thermolog dashboard entry point
//! ==============================================================================
//!
//! purpose:
//!     a small web dashboard for ThermoLog weather hubs and their sensors.
//!     hub and sensor data lives in the remote ThermoLog API; this process
//!     renders it and forwards edits back.
//!
//! responsibilities:
//!     - load configuration and initialize logging
//!     - serve the hub list, sensor list and sensor detail/edit views
//!     - accept raw weather updates pushed by hubs and keep a live registry
//!
//! architecture:
//!
//!     ┌──────────────────────────────────────────────────────────────┐
//!     │                    dashboard (this file)                      │
//!     │  ┌─────────────────────┐         ┌────────────────────────┐  │
//!     │  │ views               │         │ ingest                 │  │
//!     │  │ /hubs /sensors      │         │ /weatherstation/...    │  │
//!     │  │ /sensor/:id         │         │ /live /api/live        │  │
//!     │  └──────────┬──────────┘         └───────────┬────────────┘  │
//!     │             │                                │               │
//!     │      ┌──────┴──────┐                  ┌──────┴──────┐        │
//!     │      │   api.rs    │                  │ registry.rs │        │
//!     │      └──────┬──────┘                  └─────────────┘        │
//!     └─────────────┼────────────────────────────────────────────────┘
//!                   │ http (json)
//!                   ▼
//!            ThermoLog API (/hubs, /sensors)
//!
//! ==============================================================================

use anyhow::{Context, Result};
use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use log::{info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

use thermolog_dashboard::api::ThermoLogClient;
use thermolog_dashboard::registry::Registry;
use thermolog_dashboard::weather::WeatherUpdate;
use thermolog_dashboard::{config, report, views};

// ==============================================================================
// shared state
// ==============================================================================
// the api client is cheap to clone (reqwest pools connections internally).
// the registry is written by the ingest route and read by the live views,
// so it sits behind arc<rwlock<>>.

#[derive(Clone)]
struct AppState {
    client: ThermoLogClient,
    registry: Arc<RwLock<Registry>>,
}

impl AppState {
    fn new(client: ThermoLogClient) -> Self {
        Self {
            client,
            registry: Arc::new(RwLock::new(Registry::new())),
        }
    }
}

// ==============================================================================
// main entry point
// ==============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let (config, source) = config::DashboardConfig::load_or_default();
    init_logging(&config.logging.level);
    config.print_summary(&source);

    let client = ThermoLogClient::new(&config.api.base_url)?;
    let state = AppState::new(client);

    let listener = tokio::net::TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr()))?;
    info!("[STARTUP] Dashboard live at http://{}", config.listen_addr());

    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

// ==============================================================================
// web server
// ==============================================================================

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/hubs") }))
        .route("/hubs", get(hubs_handler))
        .route("/sensors", get(sensors_handler))
        .route("/sensor/:sensor_id", get(sensor_handler).post(save_sensor_handler))
        .route("/weatherstation/updateweatherstation", get(ingest_handler))
        .route("/live", get(live_handler))
        .route("/api/live", get(live_api_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn hubs_handler(State(state): State<AppState>) -> Html<String> {
    let hubs = state.client.get_hubs().await;
    Html(views::render_hubs(&hubs))
}

async fn sensors_handler(State(state): State<AppState>) -> Html<String> {
    let sensors = state.client.get_sensors().await;
    Html(views::render_sensors(&sensors))
}

async fn sensor_handler(
    State(state): State<AppState>,
    Path(sensor_id): Path<String>,
) -> Html<String> {
    let sensor = state.client.get_sensor(&sensor_id).await;
    Html(views::render_sensor_detail(&sensor_id, sensor.as_ref()))
}

/// edit form body
#[derive(Deserialize)]
struct SensorForm {
    name: String,
}

/// POST /sensor/:sensor_id - rename and PUT back, then return to the list
async fn save_sensor_handler(
    State(state): State<AppState>,
    Path(sensor_id): Path<String>,
    Form(form): Form<SensorForm>,
) -> Response {
    let Some(mut sensor) = state.client.get_sensor(&sensor_id).await else {
        return Html(views::render_sensor_detail(&sensor_id, None)).into_response();
    };

    sensor.rename(&form.name);
    if state.client.update_sensor(&sensor).await {
        info!("renamed sensor {} to {:?}", sensor.id, sensor.name);
    } else {
        warn!("sensor {} was not saved", sensor.id);
    }
    Redirect::to("/sensors").into_response()
}

/// raw push from a hub, one sensor reading per request
async fn ingest_handler(
    State(state): State<AppState>,
    Query(fields): Query<HashMap<String, String>>,
) -> Json<report::Report> {
    let update = WeatherUpdate::from_fields(&fields);
    let report = state.registry.write().await.ingest(&update);
    info!(
        "[INGEST] {} via {}: {} report",
        report.sensor_id, report.hub_id, report.sensor_type
    );
    Json(report)
}

async fn live_handler(State(state): State<AppState>) -> Html<String> {
    let registry = state.registry.read().await;
    Html(views::render_live(registry.sensors()))
}

async fn live_api_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let registry = state.registry.read().await;
    Json(serde_json::json!({
        "sensors": registry.sensors().collect::<Vec<_>>(),
        "hubs": registry.hubs().collect::<Vec<_>>(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// serve the dashboard against an api nobody listens on
    async fn spawn_dashboard() -> String {
        let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_addr = dead.local_addr().unwrap();
        drop(dead);

        let client = ThermoLogClient::new(&format!("http://{}/api/v1", dead_addr)).unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(AppState::new(client))).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_views_degrade_when_api_is_down() {
        let base = spawn_dashboard().await;

        let hubs = reqwest::get(format!("{}/hubs", base)).await.unwrap();
        assert!(hubs.status().is_success());
        assert!(hubs.text().await.unwrap().contains("No hubs."));

        let detail = reqwest::get(format!("{}/sensor/00001234", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(detail.contains("could not be loaded"));
    }

    #[tokio::test]
    async fn test_ingest_feeds_live_views() {
        let base = spawn_dashboard().await;

        let report: serde_json::Value = reqwest::get(format!(
            "{}/weatherstation/updateweatherstation?dateutc=now&action=updateraw&realtime=1\
             &id=AEB123512&mt=5N1x31&sensor=00001234&battery=normal&baromin=30.17&rssi=3\
             &windspeedmph=5&winddir=180&rainin=0.00&dailyrainin=0.00",
            base
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

        assert_eq!(report["sensorID"], "00001234");
        assert_eq!(report["type"], "fiveInOne");
        assert_eq!(report["windDir"], 180);
        assert_eq!(report["barometric"], 30.17);

        let live: serde_json::Value = reqwest::get(format!("{}/api/live", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(live["sensors"][0]["subTypes"][0], "5N1x31");
        assert_eq!(live["hubs"][0]["sensors"][0], "00001234");

        let html = reqwest::get(format!("{}/live", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("href=\"/sensor/00001234\""));
    }
}
