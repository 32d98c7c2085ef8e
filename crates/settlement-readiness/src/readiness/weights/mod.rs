//! Operator-editable scoring weights.
//!
//! One active weight vector exists at a time. It is read fresh on every scoring
//! run and replaced wholesale on save; nothing normalizes or bounds the values.

mod store;

pub use store::{InMemoryWeightStore, JsonFileWeightStore, WeightStore};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Nine coefficients combining sub-scores into readiness, risk and priority.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub personnel: f64,
    pub components: f64,
    pub training: f64,
    pub risk_threat: f64,
    pub risk_infra: f64,
    pub risk_response: f64,
    pub risk_incidents: f64,
    pub priority_risk: f64,
    pub priority_readiness: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            personnel: 0.4,
            components: 0.4,
            training: 0.2,
            risk_threat: 0.3,
            risk_infra: 0.3,
            risk_response: 0.3,
            risk_incidents: 0.1,
            priority_risk: 0.6,
            priority_readiness: 0.4,
        }
    }
}

impl Weights {
    pub const FIELDS: [&'static str; 9] = [
        "personnel",
        "components",
        "training",
        "risk_threat",
        "risk_infra",
        "risk_response",
        "risk_incidents",
        "priority_risk",
        "priority_readiness",
    ];

    /// Builds weights from an untyped payload, naming the first offending field.
    ///
    /// Every field is required and must be a finite JSON number. Unknown keys
    /// are ignored.
    pub fn from_json(payload: &Value) -> Result<Self, WeightsError> {
        let object = payload.as_object().ok_or(WeightsError::Validation {
            field: "weights",
            reason: "expected a JSON object".to_string(),
        })?;

        let mut values = [0.0_f64; 9];
        for (slot, field) in values.iter_mut().zip(Self::FIELDS) {
            let raw = object.get(field).ok_or_else(|| WeightsError::Validation {
                field,
                reason: "missing".to_string(),
            })?;
            *slot = raw.as_f64().ok_or_else(|| WeightsError::Validation {
                field,
                reason: format!("must be numeric, got {raw}"),
            })?;
        }

        let [
            personnel,
            components,
            training,
            risk_threat,
            risk_infra,
            risk_response,
            risk_incidents,
            priority_risk,
            priority_readiness,
        ] = values;
        let weights = Self {
            personnel,
            components,
            training,
            risk_threat,
            risk_infra,
            risk_response,
            risk_incidents,
            priority_risk,
            priority_readiness,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<(), WeightsError> {
        for (field, value) in Self::FIELDS.into_iter().zip(self.values()) {
            if !value.is_finite() {
                return Err(WeightsError::Validation {
                    field,
                    reason: format!("must be a finite number, got {value}"),
                });
            }
        }
        Ok(())
    }

    fn values(&self) -> [f64; 9] {
        [
            self.personnel,
            self.components,
            self.training,
            self.risk_threat,
            self.risk_infra,
            self.risk_response,
            self.risk_incidents,
            self.priority_risk,
            self.priority_readiness,
        ]
    }
}

/// Identity of the operator a weights change is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorId(String);

impl OperatorId {
    pub fn parse(raw: &str) -> Result<Self, WeightsError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WeightsError::MissingOperator);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted weights with audit attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsRecord {
    pub weights: Weights,
    pub updated_by: OperatorId,
    pub updated_at: NaiveDateTime,
}

/// Where the weights used by a run came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightsOrigin {
    Defaults,
    Saved {
        updated_by: OperatorId,
        updated_at: NaiveDateTime,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveWeights {
    pub weights: Weights,
    pub origin: WeightsOrigin,
}

impl From<WeightsRecord> for ActiveWeights {
    fn from(record: WeightsRecord) -> Self {
        Self {
            weights: record.weights,
            origin: WeightsOrigin::Saved {
                updated_by: record.updated_by,
                updated_at: record.updated_at,
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WeightsError {
    #[error("invalid weight '{field}': {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("saving weights requires an operator identity")]
    MissingOperator,
    #[error("weight storage unavailable: {0}")]
    Storage(String),
}

/// Reads and replaces the single active weight configuration.
pub struct WeightsManager<W> {
    store: Arc<W>,
}

impl<W> Clone for WeightsManager<W> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<W> WeightsManager<W>
where
    W: WeightStore + 'static,
{
    pub fn new(store: Arc<W>) -> Self {
        Self { store }
    }

    /// Saved weights, or the defaults when nothing has been saved yet.
    pub fn current(&self) -> Result<ActiveWeights, WeightsError> {
        Ok(match self.store.load()? {
            Some(record) => record.into(),
            None => ActiveWeights {
                weights: Weights::default(),
                origin: WeightsOrigin::Defaults,
            },
        })
    }

    /// Validates and stores a new weight vector; the previous one stays active on error.
    pub fn save(
        &self,
        operator: &str,
        payload: &Value,
        now: NaiveDateTime,
    ) -> Result<WeightsRecord, WeightsError> {
        let updated_by = OperatorId::parse(operator)?;
        let weights = Weights::from_json(payload)?;
        self.save_weights(updated_by, weights, now)
    }

    pub fn save_weights(
        &self,
        updated_by: OperatorId,
        weights: Weights,
        now: NaiveDateTime,
    ) -> Result<WeightsRecord, WeightsError> {
        weights.validate()?;
        let record = WeightsRecord {
            weights,
            updated_by,
            updated_at: now,
        };
        self.store.save(record.clone())?;
        info!(operator = %record.updated_by, updated_at = %record.updated_at, "scoring weights saved");
        Ok(record)
    }
}
