use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::aggregator::{
    EntityAggregator, EntitySource, EvaluationRangeError, PartialDataWarning, WeekWindow,
};
use super::domain::ScoringPolicy;
use super::ranking::ReadinessBoard;
use super::scoring::{ScoreCalculator, SettlementScore};
use super::weights::{ActiveWeights, WeightStore, WeightsError, WeightsManager, WeightsRecord};

/// Composes the weight store, entity source and calculator into scoring runs.
pub struct ReadinessService<S, W> {
    aggregator: EntityAggregator<S>,
    weights: WeightsManager<W>,
    settlements: Vec<String>,
    policy: ScoringPolicy,
}

/// Result of one scoring run, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessDashboard {
    pub evaluated_at: NaiveDateTime,
    pub week: WeekWindow,
    pub weights: ActiveWeights,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PartialDataWarning>,
    pub scores: ReadinessBoard,
}

impl<S, W> ReadinessService<S, W>
where
    S: EntitySource + 'static,
    W: WeightStore + 'static,
{
    pub fn new(
        source: Arc<S>,
        weights: Arc<W>,
        settlements: Vec<String>,
        policy: ScoringPolicy,
    ) -> Self {
        Self {
            aggregator: EntityAggregator::new(source),
            weights: WeightsManager::new(weights),
            settlements,
            policy,
        }
    }

    pub fn settlements(&self) -> &[String] {
        &self.settlements
    }

    /// Scores every configured settlement as of `now`.
    ///
    /// Weights are read fresh; failing to load them aborts the run. Entity
    /// read failures only degrade the affected categories.
    pub fn dashboard(
        &self,
        now: NaiveDateTime,
    ) -> Result<ReadinessDashboard, ReadinessServiceError> {
        let weights = self
            .weights
            .current()
            .map_err(ReadinessServiceError::Configuration)?;
        let entities = self.aggregator.fetch_all(now)?;

        let calculator = ScoreCalculator::new(weights.weights, self.policy);
        let scores = ReadinessBoard::rank(calculator.score_all(&self.settlements, &entities, now));

        info!(
            settlements = scores.len(),
            degraded_categories = entities.warnings.len(),
            %now,
            "readiness scoring run complete"
        );

        Ok(ReadinessDashboard {
            evaluated_at: now,
            week: entities.week,
            weights,
            warnings: entities.warnings,
            scores,
        })
    }

    pub fn settlement(
        &self,
        name: &str,
        now: NaiveDateTime,
    ) -> Result<SettlementScore, ReadinessServiceError> {
        let dashboard = self.dashboard(now)?;
        dashboard
            .scores
            .find_by_settlement(name)
            .cloned()
            .ok_or_else(|| ReadinessServiceError::UnknownSettlement(name.to_string()))
    }

    pub fn weights(&self) -> Result<ActiveWeights, ReadinessServiceError> {
        Ok(self.weights.current()?)
    }

    pub fn save_weights(
        &self,
        operator: &str,
        payload: &Value,
        now: NaiveDateTime,
    ) -> Result<WeightsRecord, ReadinessServiceError> {
        Ok(self.weights.save(operator, payload, now)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReadinessServiceError {
    #[error("weight configuration could not be loaded: {0}")]
    Configuration(#[source] WeightsError),
    #[error(transparent)]
    Weights(#[from] WeightsError),
    #[error("unknown settlement '{0}'")]
    UnknownSettlement(String),
    #[error(transparent)]
    EvaluationOutOfRange(#[from] EvaluationRangeError),
}
