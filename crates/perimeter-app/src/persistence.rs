//! Background writer for queued mission-store updates.
//!
//! Writes are fire-and-forget: each request is delivered once, failures are
//! logged at debug level and never retried or surfaced to the operator.

use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use perimeter_core::persistence::PersistRequest;
use perimeter_sim::MissionRepository;

/// Spawn the writer thread. It exits when every sender is dropped.
pub fn spawn_writer(
    repository: Arc<dyn MissionRepository>,
) -> io::Result<(mpsc::Sender<PersistRequest>, JoinHandle<()>)> {
    let (tx, rx) = mpsc::channel::<PersistRequest>();
    let handle = std::thread::Builder::new()
        .name("perimeter-persistence".into())
        .spawn(move || run_writer(repository.as_ref(), rx))?;
    Ok((tx, handle))
}

fn run_writer(repository: &dyn MissionRepository, rx: mpsc::Receiver<PersistRequest>) {
    for request in rx {
        if let Err(err) = repository.deliver(&request) {
            tracing::debug!(%err, ?request, "mission store write dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perimeter_core::enums::Zone;
    use perimeter_core::error::RepositoryError;
    use perimeter_core::events::AlertRecord;
    use perimeter_core::persistence::MissionRecord;
    use perimeter_core::types::GeoPoint;
    use perimeter_sim::InMemoryRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_writer_delivers_in_order() {
        let repo = Arc::new(InMemoryRepository::default());
        let (tx, handle) = spawn_writer(repo.clone()).unwrap();

        let target = GeoPoint::new(14.21, 101.22);
        tx.send(PersistRequest::Target(target)).unwrap();
        for ts in [100, 200] {
            tx.send(PersistRequest::Alert(AlertRecord {
                timestamp_ms: ts,
                zone: Zone::Asset,
                intruders: vec![],
            }))
            .unwrap();
        }
        drop(tx);
        handle.join().unwrap();

        let record = repo.load().unwrap();
        assert_eq!(record.position, target);
        assert_eq!(record.alerts.len(), 2);
        assert_eq!(record.alerts[0].timestamp_ms, 200);
    }

    struct Unreachable {
        attempts: AtomicUsize,
    }

    impl MissionRepository for Unreachable {
        fn load(&self) -> Result<MissionRecord, RepositoryError> {
            Err(RepositoryError::Unreachable("offline".into()))
        }

        fn save_target(&self, _target: GeoPoint) -> Result<(), RepositoryError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(RepositoryError::Unreachable("offline".into()))
        }

        fn record_alert(&self, _alert: &AlertRecord) -> Result<(), RepositoryError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(RepositoryError::Status(500))
        }
    }

    #[test]
    fn test_failures_are_not_retried() {
        let repo = Arc::new(Unreachable {
            attempts: AtomicUsize::new(0),
        });
        let (tx, handle) = spawn_writer(repo.clone()).unwrap();
        tx.send(PersistRequest::Target(GeoPoint::new(1.0, 2.0)))
            .unwrap();
        tx.send(PersistRequest::Alert(AlertRecord {
            timestamp_ms: 0,
            zone: Zone::Base,
            intruders: vec![],
        }))
        .unwrap();
        drop(tx);
        handle.join().unwrap();

        assert_eq!(repo.attempts.load(Ordering::SeqCst), 2);
    }
}
