//! Settlement readiness and risk scoring engine.

pub mod aggregator;
pub mod domain;
pub mod ranking;
pub mod router;
pub mod scoring;
pub mod service;
pub mod weights;

#[cfg(test)]
mod tests;

pub use aggregator::{
    AggregatedEntities, EntityAggregator, EntityCategory, EntitySource, EvaluationRangeError,
    PartialDataWarning, SourceError, WeekWindow,
};
pub use domain::{
    Certification, Drill, EquipmentAggregate, Incident, IncidentStatus, ScoringPolicy,
    SecurityComponent, Soldier, SoldierId, ThreatRating, TrainingEvent, WeekendWeaponHolder,
    CERT_VALIDITY_DAYS, RECENT_ACTIVITY_MONTHS, SHOOTING_VALIDITY_DAYS,
};
pub use ranking::{ReadinessBoard, SeverityBand};
pub use router::{readiness_router, OPERATOR_HEADER};
pub use scoring::{ScoreCalculator, SettlementScore};
pub use service::{ReadinessDashboard, ReadinessService, ReadinessServiceError};
pub use weights::{
    ActiveWeights, InMemoryWeightStore, JsonFileWeightStore, OperatorId, WeightStore, Weights,
    WeightsError, WeightsManager, WeightsOrigin, WeightsRecord,
};
