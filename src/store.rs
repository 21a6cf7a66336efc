use crate::carrier::{CarrierClient, events_or_empty};
use crate::error::StoreError;
use crate::models::{Event, TrackingData};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq, Eq)]
pub enum AddOutcome {
    AlreadyTracked,
    NotFound,
    /// Full history returned by the carrier, oldest first.
    Added(Vec<Event>),
}

#[derive(Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotPresent,
}

/// Tracked shipment numbers and the last event seen for each, mirrored to a
/// JSON file after every mutation.
///
/// Persistence failures are logged; the in-memory state stays authoritative.
pub struct TrackingStore {
    data: TrackingData,
    path: PathBuf,
}

impl TrackingStore {
    /// Load state from `path`. A missing or unreadable file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match read_data(&path) {
            Ok(Some(data)) => {
                tracing::info!(
                    path = %path.display(),
                    tracked = data.numbers.len(),
                    "Loaded tracking data"
                );
                data
            }
            Ok(None) => TrackingData::default(),
            Err(e) => {
                tracing::error!(path = %path.display(), "Failed to load tracking data: {e}");
                TrackingData::default()
            }
        };
        Self { data, path }
    }

    pub async fn add(&mut self, tracking_number: &str, carrier: &dyn CarrierClient) -> AddOutcome {
        if self.data.numbers.contains(tracking_number) {
            return AddOutcome::AlreadyTracked;
        }

        let events = events_or_empty(carrier, tracking_number).await;
        let Some(latest) = events.last() else {
            tracing::debug!(tracking_number = %tracking_number, "No events found for shipment");
            return AddOutcome::NotFound;
        };

        self.data.numbers.insert(tracking_number.to_string());
        self.data
            .shipments
            .insert(tracking_number.to_string(), latest.clone());
        self.persist();
        tracing::info!(tracking_number = %tracking_number, "Started tracking shipment");

        AddOutcome::Added(events)
    }

    pub fn remove(&mut self, tracking_number: &str) -> RemoveOutcome {
        if !self.data.numbers.remove(tracking_number) {
            return RemoveOutcome::NotPresent;
        }
        self.data.shipments.remove(tracking_number);
        self.persist();
        tracing::info!(tracking_number = %tracking_number, "Stopped tracking shipment");
        RemoveOutcome::Removed
    }

    /// Tracked numbers in ascending order.
    pub fn list(&self) -> Vec<String> {
        self.data.numbers.iter().cloned().collect()
    }

    pub fn latest_known_event(&self, tracking_number: &str) -> Option<&Event> {
        self.data.shipments.get(tracking_number)
    }

    /// Overwrite the last-seen event and persist immediately. Ignored for
    /// numbers that are no longer tracked.
    pub fn record_latest(&mut self, tracking_number: &str, event: Event) {
        if !self.data.numbers.contains(tracking_number) {
            tracing::debug!(
                tracking_number = %tracking_number,
                "Dropping event for shipment that is no longer tracked"
            );
            return;
        }
        self.data
            .shipments
            .insert(tracking_number.to_string(), event);
        self.persist();
    }

    /// Rewrite the data file with the current state.
    pub fn flush(&self) -> Result<(), StoreError> {
        write_data(&self.path, &self.data)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        if let Err(e) = self.flush() {
            tracing::error!(path = %self.path.display(), "Failed to save tracking data: {e}");
        }
    }
}

fn read_data(path: &Path) -> Result<Option<TrackingData>, StoreError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut data: TrackingData = serde_json::from_str(&contents)?;
    let TrackingData { numbers, shipments } = &mut data;
    shipments.retain(|number, _| numbers.contains(number));
    Ok(Some(data))
}

/// Write to a sibling temp file, sync it, then rename over the target.
fn write_data(path: &Path, data: &TrackingData) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    let tmp_path = path.with_extension("json.tmp");
    let mut file = std::fs::File::create(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    // Contents must be on disk before the rename makes them visible.
    file.sync_all()?;
    drop(file);
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
