use chrono::{NaiveDate, NaiveDateTime};
use metrics_exporter_prometheus::PrometheusHandle;
use settlement_readiness::config::{ConfigError, ScoringConfig};
use settlement_readiness::error::AppError;
use settlement_readiness::import::{EntitySnapshot, RosterImporter};
use settlement_readiness::readiness::{
    InMemoryWeightStore, JsonFileWeightStore, ReadinessService, WeightStore, WeightsError,
    WeightsRecord,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// File-backed when a weights path is configured, otherwise process-local.
#[derive(Debug)]
pub(crate) enum ConfiguredWeightStore {
    Memory(InMemoryWeightStore),
    File(JsonFileWeightStore),
}

impl ConfiguredWeightStore {
    pub(crate) fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::File(JsonFileWeightStore::new(path)),
            None => Self::Memory(InMemoryWeightStore::default()),
        }
    }

    pub(crate) fn is_persistent(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl WeightStore for ConfiguredWeightStore {
    fn load(&self) -> Result<Option<WeightsRecord>, WeightsError> {
        match self {
            Self::Memory(store) => store.load(),
            Self::File(store) => store.load(),
        }
    }

    fn save(&self, record: WeightsRecord) -> Result<(), WeightsError> {
        match self {
            Self::Memory(store) => store.save(record),
            Self::File(store) => store.save(record),
        }
    }
}

pub(crate) type ConfiguredService = ReadinessService<EntitySnapshot, ConfiguredWeightStore>;

/// Reads the snapshot export, replacing its soldiers with a roster CSV when given.
pub(crate) fn load_snapshot(
    snapshot: Option<&Path>,
    roster: Option<&Path>,
) -> Result<EntitySnapshot, AppError> {
    let mut loaded = match snapshot {
        Some(path) => EntitySnapshot::from_path(path)?,
        None => {
            warn!("no entity snapshot configured; scoring against empty data");
            EntitySnapshot::default()
        }
    };

    if let Some(path) = roster {
        let soldiers = RosterImporter::from_path(path)?;
        info!(path = %path.display(), soldiers = soldiers.len(), "roster imported");
        loaded = loaded.with_soldiers(soldiers);
    }

    Ok(loaded)
}

/// Wires a service from scoring configuration and an already-loaded snapshot.
///
/// The configured settlement list wins; otherwise the snapshot's own names are used.
pub(crate) fn build_service(
    scoring: &ScoringConfig,
    snapshot: EntitySnapshot,
) -> ConfiguredService {
    let settlements = if scoring.settlements.is_empty() {
        snapshot.settlement_names()
    } else {
        scoring.settlements.clone()
    };
    let store = ConfiguredWeightStore::from_path(scoring.weights_path.as_deref());

    ReadinessService::new(
        Arc::new(snapshot),
        Arc::new(store),
        settlements,
        scoring.policy,
    )
}

pub(crate) fn required_weights_path(scoring: &ScoringConfig) -> Result<PathBuf, AppError> {
    scoring
        .weights_path
        .clone()
        .ok_or(AppError::Config(ConfigError::MissingVariable {
            key: "APP_WEIGHTS_PATH",
        }))
}

/// Accepts `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`, or a bare date meaning midnight.
pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
        .map_err(|err| {
            format!("failed to parse '{raw}' as YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD ({err})")
        })
}
