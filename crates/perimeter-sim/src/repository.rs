//! Mission store capability.
//!
//! The engine never talks to a store directly: it reads one `MissionRecord`
//! at startup and queues `PersistRequest`s for a driver to deliver.

use std::sync::Mutex;

use perimeter_core::constants::{
    DEFAULT_ASSET_ALTITUDE_M, DEFAULT_ASSET_HEADING_DEG, DEFAULT_ASSET_RADIUS_M, DEFAULT_BASE_LAT,
    DEFAULT_BASE_LON, REPOSITORY_HISTORY_CAPACITY,
};
use perimeter_core::error::RepositoryError;
use perimeter_core::events::AlertRecord;
use perimeter_core::persistence::{MissionRecord, PersistRequest};
use perimeter_core::types::GeoPoint;

/// Storage for the last commanded target and alert history.
pub trait MissionRepository: Send + Sync {
    /// Last known asset state and recent alerts, newest first.
    fn load(&self) -> Result<MissionRecord, RepositoryError>;
    fn save_target(&self, target: GeoPoint) -> Result<(), RepositoryError>;
    fn record_alert(&self, alert: &AlertRecord) -> Result<(), RepositoryError>;

    /// Route a queued request to the matching write.
    fn deliver(&self, request: &PersistRequest) -> Result<(), RepositoryError> {
        match request {
            PersistRequest::Target(target) => self.save_target(*target),
            PersistRequest::Alert(alert) => self.record_alert(alert),
        }
    }
}

/// Process-local store. History is capped and kept newest first.
#[derive(Debug)]
pub struct InMemoryRepository {
    record: Mutex<MissionRecord>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new(MissionRecord {
            position: GeoPoint::new(DEFAULT_BASE_LAT, DEFAULT_BASE_LON),
            altitude: DEFAULT_ASSET_ALTITUDE_M,
            heading: DEFAULT_ASSET_HEADING_DEG,
            detection_radius: DEFAULT_ASSET_RADIUS_M,
            alerts: Vec::new(),
        })
    }
}

impl InMemoryRepository {
    pub fn new(record: MissionRecord) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }
}

impl MissionRepository for InMemoryRepository {
    fn load(&self) -> Result<MissionRecord, RepositoryError> {
        let record = self.record.lock().map_err(|_| RepositoryError::Poisoned)?;
        Ok(record.clone())
    }

    fn save_target(&self, target: GeoPoint) -> Result<(), RepositoryError> {
        let mut record = self.record.lock().map_err(|_| RepositoryError::Poisoned)?;
        record.position = target;
        Ok(())
    }

    fn record_alert(&self, alert: &AlertRecord) -> Result<(), RepositoryError> {
        let mut record = self.record.lock().map_err(|_| RepositoryError::Poisoned)?;
        record.alerts.insert(0, alert.clone());
        record.alerts.truncate(REPOSITORY_HISTORY_CAPACITY);
        Ok(())
    }
}
