//! Mission store client for the REST endpoint at `{base}/api/drone`.
//!
//! `GET` returns the last known asset state and alert history. `POST`
//! accepts either `{ "target": { "lat", "lng" } }` or `{ "alert": ... }`.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use perimeter_core::error::RepositoryError;
use perimeter_core::events::AlertRecord;
use perimeter_core::persistence::MissionRecord;
use perimeter_core::types::GeoPoint;
use perimeter_sim::MissionRepository;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpRepository {
    client: Client,
    endpoint: String,
}

impl HttpRepository {
    /// `base_url` is the server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> Result<Self, RepositoryError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| RepositoryError::Unreachable(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/drone", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, body: &Value) -> Result<(), RepositoryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .map_err(|err| RepositoryError::Unreachable(err.to_string()))?;
        check_status(&response)
    }
}

impl MissionRepository for HttpRepository {
    fn load(&self) -> Result<MissionRecord, RepositoryError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .map_err(|err| RepositoryError::Unreachable(err.to_string()))?;
        check_status(&response)?;
        let text = response
            .text()
            .map_err(|err| RepositoryError::Decode(err.to_string()))?;
        decode_record(&text)
    }

    fn save_target(&self, target: GeoPoint) -> Result<(), RepositoryError> {
        self.post(&target_body(target))
    }

    fn record_alert(&self, alert: &AlertRecord) -> Result<(), RepositoryError> {
        self.post(&alert_body(alert)?)
    }
}

fn check_status(response: &Response) -> Result<(), RepositoryError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(RepositoryError::Status(status.as_u16()))
    }
}

/// Stored record as served. History entries written by other clients may
/// not match `AlertRecord`; those are skipped rather than failing the load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecord {
    position: GeoPoint,
    altitude: f64,
    heading: f64,
    detection_radius: f64,
    #[serde(default)]
    alerts: Vec<Value>,
}

fn decode_record(text: &str) -> Result<MissionRecord, RepositoryError> {
    let wire: WireRecord =
        serde_json::from_str(text).map_err(|err| RepositoryError::Decode(err.to_string()))?;
    let total = wire.alerts.len();
    let alerts: Vec<AlertRecord> = wire
        .alerts
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    if alerts.len() < total {
        tracing::debug!(skipped = total - alerts.len(), "ignored foreign alert entries");
    }
    Ok(MissionRecord {
        position: wire.position,
        altitude: wire.altitude,
        heading: wire.heading,
        detection_radius: wire.detection_radius,
        alerts,
    })
}

fn target_body(target: GeoPoint) -> Value {
    json!({ "target": { "lat": target.lat, "lng": target.lon } })
}

fn alert_body(alert: &AlertRecord) -> Result<Value, RepositoryError> {
    let alert = serde_json::to_value(alert).map_err(|err| RepositoryError::Decode(err.to_string()))?;
    Ok(json!({ "alert": alert }))
}
