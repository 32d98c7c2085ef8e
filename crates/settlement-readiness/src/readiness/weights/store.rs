use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError, RwLock};

use super::{WeightsError, WeightsRecord};

/// Storage abstraction for the active weights record.
///
/// Saves replace the whole record; concurrent writers resolve last-write-wins.
pub trait WeightStore: Send + Sync {
    fn load(&self) -> Result<Option<WeightsRecord>, WeightsError>;
    fn save(&self, record: WeightsRecord) -> Result<(), WeightsError>;
}

#[derive(Debug, Default)]
pub struct InMemoryWeightStore {
    record: RwLock<Option<WeightsRecord>>,
}

impl WeightStore for InMemoryWeightStore {
    fn load(&self) -> Result<Option<WeightsRecord>, WeightsError> {
        let guard = self.record.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn save(&self, record: WeightsRecord) -> Result<(), WeightsError> {
        let mut guard = self.record.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(record);
        Ok(())
    }
}

/// JSON file holding the active record. A missing file means nothing was saved.
#[derive(Debug)]
pub struct JsonFileWeightStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileWeightStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

impl WeightStore for JsonFileWeightStore {
    fn load(&self) -> Result<Option<WeightsRecord>, WeightsError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(WeightsError::Storage(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )))
            }
        };

        serde_json::from_slice(&bytes).map(Some).map_err(|err| {
            WeightsError::Storage(format!(
                "malformed weights file {}: {err}",
                self.path.display()
            ))
        })
    }

    fn save(&self, record: WeightsRecord) -> Result<(), WeightsError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let body = serde_json::to_vec_pretty(&record)
            .map_err(|err| WeightsError::Storage(format!("failed to encode weights: {err}")))?;

        // Readers see either the previous record or the new one, never a partial write.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, body)
            .and_then(|_| fs::rename(&staging, &self.path))
            .map_err(|err| {
                WeightsError::Storage(format!("failed to write {}: {err}", self.path.display()))
            })
    }
}
