use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use super::common::*;
use crate::import::EntitySnapshot;
use crate::readiness::aggregator::EntityCategory;
use crate::readiness::domain::ScoringPolicy;
use crate::readiness::service::{ReadinessService, ReadinessServiceError};
use crate::readiness::weights::{
    InMemoryWeightStore, WeightStore, Weights, WeightsError, WeightsOrigin,
};

fn settlement_order(
    service: &ReadinessService<EntitySnapshot, InMemoryWeightStore>,
) -> Vec<String> {
    service
        .dashboard(now())
        .expect("dashboard")
        .scores
        .scores()
        .iter()
        .map(|score| score.settlement.clone())
        .collect()
}

#[test]
fn dashboard_ranks_every_configured_settlement() {
    let (service, _) = build_service(three_settlement_snapshot());
    let dashboard = service.dashboard(now()).expect("dashboard");

    assert_eq!(dashboard.evaluated_at, now());
    assert_eq!(
        dashboard.week.start.date(),
        NaiveDate::from_ymd_opt(2025, 10, 12).expect("valid date")
    );
    assert_eq!(dashboard.weights.origin, WeightsOrigin::Defaults);
    assert!(dashboard.warnings.is_empty());
    assert_eq!(settlement_order(&service), vec![HARISH, TALMON, NILI]);
}

#[test]
fn saved_weights_apply_to_the_next_run() {
    let (service, _) = build_service(three_settlement_snapshot());
    let readiness_only = json!({
        "personnel": 0.4,
        "components": 0.4,
        "training": 0.2,
        "risk_threat": 0.3,
        "risk_infra": 0.3,
        "risk_response": 0.3,
        "risk_incidents": 0.1,
        "priority_risk": 0.0,
        "priority_readiness": 1.0,
    });

    service
        .save_weights("ops-1", &readiness_only, now())
        .expect("save weights");

    let dashboard = service.dashboard(now()).expect("dashboard");
    let priorities: Vec<(String, u8)> = dashboard
        .scores
        .scores()
        .iter()
        .map(|score| (score.settlement.clone(), score.priority))
        .collect();
    assert_eq!(
        priorities,
        vec![
            (HARISH.to_string(), 100),
            (NILI.to_string(), 20),
            (TALMON.to_string(), 6),
        ]
    );
    assert!(matches!(
        dashboard.weights.origin,
        WeightsOrigin::Saved { .. }
    ));
}

#[test]
fn rejected_weights_surface_as_validation_errors() {
    let (service, store) = build_service(talmon_snapshot());
    let err = service
        .save_weights("ops-1", &json!({ "personnel": "lots" }), now())
        .expect_err("invalid payload");

    assert!(matches!(
        err,
        ReadinessServiceError::Weights(WeightsError::Validation { field: "personnel", .. })
    ));
    assert!(store.load().expect("store readable").is_none());
    assert_eq!(
        service.weights().expect("weights").weights,
        Weights::default()
    );
}

#[test]
fn unavailable_weight_store_aborts_the_run() {
    let service = ReadinessService::new(
        Arc::new(talmon_snapshot()),
        Arc::new(UnavailableWeightStore),
        vec![TALMON.to_string()],
        ScoringPolicy::default(),
    );

    assert!(matches!(
        service.dashboard(now()),
        Err(ReadinessServiceError::Configuration(WeightsError::Storage(_)))
    ));
    assert!(matches!(
        service.weights(),
        Err(ReadinessServiceError::Weights(WeightsError::Storage(_)))
    ));
}

#[test]
fn evaluation_instant_beyond_the_calendar_is_rejected() {
    let (service, _) = build_service(talmon_snapshot());
    let last_day = NaiveDate::MAX
        .and_hms_opt(10, 0, 0)
        .expect("valid time");

    assert!(matches!(
        service.dashboard(last_day),
        Err(ReadinessServiceError::EvaluationOutOfRange(_))
    ));
    assert!(matches!(
        service.settlement(TALMON, last_day),
        Err(ReadinessServiceError::EvaluationOutOfRange(_))
    ));
}

#[test]
fn unknown_settlement_is_reported() {
    let (service, _) = build_service(three_settlement_snapshot());

    let talmon = service.settlement(TALMON, now()).expect("known settlement");
    assert_eq!(talmon.readiness, 94);

    match service.settlement("Itamar", now()) {
        Err(ReadinessServiceError::UnknownSettlement(name)) => assert_eq!(name, "Itamar"),
        other => panic!("expected unknown settlement, got {other:?}"),
    }
}

#[test]
fn degraded_sources_still_produce_a_dashboard() {
    let source = FlakySource::failing(
        three_settlement_snapshot(),
        vec![EntityCategory::ThreatRatings],
    );
    let service = ReadinessService::new(
        Arc::new(source),
        Arc::new(InMemoryWeightStore::default()),
        vec![TALMON.to_string(), HARISH.to_string()],
        ScoringPolicy::default(),
    );

    let dashboard = service.dashboard(now()).expect("dashboard");
    assert_eq!(dashboard.warnings.len(), 1);
    assert_eq!(dashboard.warnings[0].category, EntityCategory::ThreatRatings);
    assert_eq!(dashboard.scores.len(), 2);
    assert!(dashboard
        .scores
        .scores()
        .iter()
        .all(|score| score.threat_rating == 0));
}
