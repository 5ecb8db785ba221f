//! ==============================================================================
//! views.rs - server-rendered dashboard pages
//! ==============================================================================
//!
//! purpose:
//!     turns hubs and sensors into plain html. rendering is pure: handlers in
//!     main.rs fetch the data, these functions only format it.
//!
//!     pages:
//!     - hubs:          every hub and the sensor ids it has heard
//!     - sensors:       every sensor with type, battery and hub signal
//!     - sensor detail: one sensor plus a form to rename it
//!     - live:          sensors heard directly by this dashboard
//!
//! ==============================================================================

use crate::hub::Hub;
use crate::sensor::{Sensor, SensorHub};

use reqwest::Url;
use std::fmt::Write;

/// escape html special characters to prevent xss
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>ThermoLog - {title}</title></head>
<body style="font-family: system-ui; padding: 2rem;">
<nav><a href="/hubs">Hubs</a> | <a href="/sensors">Sensors</a> | <a href="/live">Live</a></nav>
<h1>{title}</h1>
{body}
</body>
</html>"#,
        title = html_escape(title),
        body = body
    )
}

pub fn render_hubs(hubs: &[Hub]) -> String {
    if hubs.is_empty() {
        return layout("Hubs", "<p>No hubs.</p>");
    }

    let mut body = String::from("<ul>\n");
    for hub in hubs {
        let sensors = hub
            .sensors
            .iter()
            .map(|id| sensor_link(id, id))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            body,
            "<li><strong>{}</strong> ({}): {}</li>",
            html_escape(&hub.name),
            html_escape(&hub.id),
            if sensors.is_empty() { "no sensors".to_string() } else { sensors }
        );
    }
    body.push_str("</ul>");
    layout("Hubs", &body)
}

pub fn render_sensors<'a, I>(sensors: I) -> String
where
    I: IntoIterator<Item = &'a Sensor>,
{
    render_sensor_table("Sensors", sensors)
}

/// sensors the dashboard heard itself through the ingest endpoint
pub fn render_live<'a, I>(sensors: I) -> String
where
    I: IntoIterator<Item = &'a Sensor>,
{
    render_sensor_table("Live", sensors)
}

fn render_sensor_table<'a, I>(title: &str, sensors: I) -> String
where
    I: IntoIterator<Item = &'a Sensor>,
{
    let mut rows = String::new();
    for sensor in sensors {
        let subtypes = sensor
            .sub_types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            sensor_link(&sensor.id, sensor.display_name()),
            sensor.sensor_type,
            subtypes,
            html_escape(&sensor.battery),
            hub_summary(&sensor.hubs)
        );
    }

    if rows.is_empty() {
        return layout(title, "<p>No sensors.</p>");
    }
    let body = format!(
        "<table>\n<tr><th>Sensor</th><th>Type</th><th>Subtypes</th><th>Battery</th><th>Hubs</th></tr>\n{}</table>",
        rows
    );
    layout(title, &body)
}

pub fn render_sensor_detail(sensor_id: &str, sensor: Option<&Sensor>) -> String {
    let Some(sensor) = sensor else {
        return layout(
            "Sensor",
            &format!(
                "<p>Sensor {} could not be loaded.</p><p><a href=\"/sensors\">Back</a></p>",
                html_escape(sensor_id)
            ),
        );
    };

    let mut body = String::new();
    let _ = writeln!(body, "<p>ID: {}</p>", html_escape(&sensor.id));
    let _ = writeln!(body, "<p>Type: {}</p>", sensor.sensor_type);
    let _ = writeln!(body, "<p>Battery: {}</p>", html_escape(&sensor.battery));
    let _ = writeln!(body, "<p>Hubs: {}</p>", hub_summary(&sensor.hubs));
    let _ = write!(
        body,
        r#"<form method="post" action="{action}">
<label>Name <input name="name" value="{name}"></label>
<button type="submit">Save</button>
</form>
<p><a href="/sensors">Back</a></p>"#,
        action = html_escape(&sensor_path(&sensor.id)),
        name = html_escape(&sensor.name)
    );
    layout(sensor.display_name(), &body)
}

fn sensor_link(id: &str, label: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        html_escape(&sensor_path(id)),
        html_escape(label)
    )
}

/// `/sensor/{id}` with the id percent-encoded as a single path segment
fn sensor_path(sensor_id: &str) -> String {
    Url::parse("http://dashboard/sensor")
        .map(|mut url| {
            if let Ok(mut path) = url.path_segments_mut() {
                path.push(sensor_id);
            }
            url.path().to_string()
        })
        .unwrap_or_else(|_| format!("/sensor/{}", sensor_id))
}

fn hub_summary(hubs: &[SensorHub]) -> String {
    hubs.iter()
        .map(|hub| {
            let signal = hub
                .signal
                .map(|s| s.to_string())
                .unwrap_or_else(|| "?".to_string());
            let seen = hub
                .last_contact
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "never".to_string());
            format!("{} (signal {}, last seen {})", html_escape(&hub.id), signal, seen)
        })
        .collect::<Vec<_>>()
        .join("<br>")
}
