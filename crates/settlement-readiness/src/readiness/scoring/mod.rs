//! Per-settlement readiness, risk and priority scoring.
//!
//! Scoring is a pure function of the aggregated entities, the active weights,
//! the scoring policy and the evaluation instant. Each sub-assessment returns
//! its own diagnostics, which are concatenated in evaluation order.

mod infrastructure;
mod personnel;
mod reasons;
mod risk;
mod training;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::aggregator::AggregatedEntities;
use super::domain::ScoringPolicy;
use super::weights::Weights;

use infrastructure::assess_components;
use personnel::assess_personnel;
use risk::{assess_incidents, assess_response, assess_threat};
use training::assess_training;

/// Scores and diagnostics for one settlement from one scoring run.
///
/// Every percentage field is rounded to the nearest integer and clamped into
/// `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementScore {
    pub settlement: String,
    pub readiness: u8,
    pub risk: u8,
    pub priority: u8,
    pub personnel_fitness: u8,
    pub component_health: u8,
    pub training_score: u8,
    pub threat_rating: u8,
    pub infra_vulnerability: u8,
    pub response_capability: u8,
    pub incident_score: u8,
    pub open_incidents: usize,
    pub reasons: Vec<String>,
    pub total_soldiers: usize,
    pub active_soldiers: usize,
    pub expired_shooting: usize,
    pub armed_count: usize,
    pub total_certifications: usize,
    pub expired_certifications: usize,
    pub weekend_approved: usize,
    pub recent_training_events: usize,
    pub recent_drills: usize,
    pub equipment_expected: u64,
    pub equipment_on_hand: u64,
}

/// Rounds to the nearest integer and clamps into `[0, 100]`.
pub(crate) fn to_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Stateless scorer bound to one weight vector and policy.
#[derive(Debug, Clone, Copy)]
pub struct ScoreCalculator {
    weights: Weights,
    policy: ScoringPolicy,
}

impl ScoreCalculator {
    pub fn new(weights: Weights, policy: ScoringPolicy) -> Self {
        Self { weights, policy }
    }

    /// Scores every settlement in master-list order.
    pub fn score_all(
        &self,
        settlements: &[String],
        entities: &AggregatedEntities,
        now: NaiveDateTime,
    ) -> Vec<SettlementScore> {
        settlements
            .iter()
            .map(|settlement| self.score(settlement, entities, now))
            .collect()
    }

    pub fn score(
        &self,
        settlement: &str,
        entities: &AggregatedEntities,
        now: NaiveDateTime,
    ) -> SettlementScore {
        let today = now.date();
        let w = &self.weights;

        let personnel = assess_personnel(settlement, entities, &self.policy, today);
        let components = assess_components(settlement, entities);
        let training = assess_training(
            settlement,
            entities,
            self.policy.recent_activity_months,
            today,
        );

        let readiness = to_percent(
            f64::from(personnel.fitness) * w.personnel
                + f64::from(components.health) * w.components
                + f64::from(training.score) * w.training,
        );

        let threat = assess_threat(settlement, entities);
        // Weak infrastructure lowers readiness and raises risk alike.
        let infra_vulnerability = 100 - components.health;
        let response = assess_response(settlement, entities, &personnel);
        let incidents = assess_incidents(settlement, entities);

        let risk = to_percent(
            f64::from(threat.rating) * w.risk_threat
                + f64::from(infra_vulnerability) * w.risk_infra
                + f64::from(response.capability) * w.risk_response
                + f64::from(incidents.score) * w.risk_incidents,
        );

        let priority = to_percent(
            f64::from(risk) * w.priority_risk
                + f64::from(100 - readiness) * w.priority_readiness,
        );

        let reasons: Vec<String> = [
            &personnel.reasons,
            &components.reasons,
            &training.reasons,
            &threat.reasons,
            &response.reasons,
            &incidents.reasons,
        ]
        .into_iter()
        .flatten()
        .map(ToString::to_string)
        .collect();

        let (equipment_expected, equipment_on_hand) = entities
            .equipment
            .iter()
            .filter(|aggregate| aggregate.settlement == settlement)
            .fold((0_u64, 0_u64), |(expected, on_hand), aggregate| {
                (
                    expected + u64::from(aggregate.expected_quantity),
                    on_hand + u64::from(aggregate.actual_quantity),
                )
            });

        debug!(
            settlement,
            readiness,
            risk,
            priority,
            reasons = reasons.len(),
            "settlement scored"
        );

        SettlementScore {
            settlement: settlement.to_string(),
            readiness,
            risk,
            priority,
            personnel_fitness: personnel.fitness,
            component_health: components.health,
            training_score: training.score,
            threat_rating: threat.rating,
            infra_vulnerability,
            response_capability: response.capability,
            incident_score: incidents.score,
            open_incidents: incidents.open_incidents,
            reasons,
            total_soldiers: personnel.total_soldiers,
            active_soldiers: personnel.active_soldiers,
            expired_shooting: personnel.expired_shooting,
            armed_count: personnel.armed_count,
            total_certifications: personnel.total_certifications,
            expired_certifications: personnel.expired_certifications,
            weekend_approved: response.weekend_approved,
            recent_training_events: training.recent_events,
            recent_drills: training.recent_drills,
            equipment_expected,
            equipment_on_hand,
        }
    }
}
