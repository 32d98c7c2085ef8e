use std::sync::Arc;

use axum::response::Response;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::import::EntitySnapshot;
use crate::readiness::aggregator::{
    AggregatedEntities, EntityAggregator, EntityCategory, EntitySource, SourceError, WeekWindow,
};
use crate::readiness::domain::{
    Certification, Drill, EquipmentAggregate, Incident, IncidentStatus, ScoringPolicy,
    SecurityComponent, Soldier, SoldierId, ThreatRating, TrainingEvent, WeekendWeaponHolder,
};
use crate::readiness::weights::{InMemoryWeightStore, WeightStore, WeightsError, WeightsRecord};
use crate::readiness::ReadinessService;

pub(super) const TALMON: &str = "Talmon";
pub(super) const HARISH: &str = "Harish";
pub(super) const NILI: &str = "Nili";

/// Thursday; the surrounding week runs Sunday 12 Oct to Saturday 18 Oct.
pub(super) fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 16)
        .expect("valid date")
        .and_hms_opt(10, 0, 0)
        .expect("valid time")
}

pub(super) fn days_ago(days: i64) -> NaiveDate {
    now().date() - Duration::days(days)
}

pub(super) fn friday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 17).expect("valid date")
}

pub(super) fn saturday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 18).expect("valid date")
}

pub(super) fn soldier(
    id: &str,
    settlement: &str,
    active: bool,
    weapon_serial: Option<&str>,
    last_range_date: Option<NaiveDate>,
) -> Soldier {
    Soldier {
        id: SoldierId(id.to_string()),
        full_name: format!("Soldier {id}"),
        settlement: settlement.to_string(),
        active,
        weapon_serial: weapon_serial.map(str::to_string),
        last_range_date,
    }
}

pub(super) fn certification(soldier_id: &str, refreshed: Option<NaiveDate>) -> Certification {
    Certification {
        soldier_id: SoldierId(soldier_id.to_string()),
        kind: "first aid".to_string(),
        last_refresh_date: refreshed,
    }
}

pub(super) fn complete_components(settlement: &str) -> SecurityComponent {
    SecurityComponent {
        settlement: settlement.to_string(),
        has_armory: true,
        has_armored_vehicle: true,
        has_shelter: true,
        fence_type: Some("smart fence".to_string()),
        command_center_type: Some("fixed".to_string()),
        defensive_security_type: Some("patrol".to_string()),
    }
}

pub(super) fn threat(settlement: &str, ratings: [u8; 4]) -> ThreatRating {
    ThreatRating {
        settlement: settlement.to_string(),
        village_proximity: ratings[0],
        road_proximity: ratings[1],
        topographic_vulnerability: ratings[2],
        regional_alert: ratings[3],
    }
}

pub(super) fn incident(settlement: &str, status: IncidentStatus) -> Incident {
    Incident {
        settlement: settlement.to_string(),
        status,
        reported_on: Some(days_ago(3)),
        summary: "perimeter breach".to_string(),
    }
}

pub(super) fn training_event(settlement: &str, date: NaiveDate) -> TrainingEvent {
    TrainingEvent {
        settlement: settlement.to_string(),
        title: "squad tactics".to_string(),
        event_date: date,
    }
}

pub(super) fn drill(settlement: &str, date: NaiveDate) -> Drill {
    Drill {
        settlement: settlement.to_string(),
        scenario: "infiltration".to_string(),
        drill_date: date,
    }
}

pub(super) fn weekend_holder(
    settlement: &str,
    soldier_id: &str,
    date: NaiveDate,
    holding: bool,
) -> WeekendWeaponHolder {
    WeekendWeaponHolder {
        settlement: settlement.to_string(),
        soldier_id: SoldierId(soldier_id.to_string()),
        weekend_date: date,
        holding_weapon: holding,
    }
}

/// Ten active fighters (two without a valid range qualification, three armed),
/// five valid certifications, full infrastructure, two events and one drill,
/// threat average 2.5, no open incidents and two weekend holders.
pub(super) fn talmon_snapshot() -> EntitySnapshot {
    let mut soldiers = Vec::new();
    for index in 0..10 {
        let id = format!("t-{index}");
        let range = match index {
            0 => None,
            1 => Some(days_ago(200)),
            _ => Some(days_ago(30)),
        };
        let serial = if index < 3 { Some("M4-1100") } else { None };
        soldiers.push(soldier(&id, TALMON, true, serial, range));
    }
    // Inactive soldiers and their certifications never count.
    soldiers.push(soldier("t-retired", TALMON, false, Some("M4-0001"), None));

    let mut certifications: Vec<Certification> = (0..5)
        .map(|index| certification(&format!("t-{index}"), Some(days_ago(40))))
        .collect();
    certifications.push(certification("t-retired", None));

    EntitySnapshot {
        settlements: vec![TALMON.to_string()],
        soldiers,
        certifications,
        security_components: vec![complete_components(TALMON)],
        equipment: vec![EquipmentAggregate {
            settlement: TALMON.to_string(),
            expected_quantity: 12,
            actual_quantity: 9,
        }],
        threat_ratings: vec![threat(TALMON, [2, 3, 2, 3])],
        incidents: vec![incident(TALMON, IncidentStatus::Closed)],
        training_events: vec![
            training_event(TALMON, days_ago(20)),
            training_event(TALMON, days_ago(90)),
        ],
        drills: vec![drill(TALMON, days_ago(60))],
        weekend_weapon_holders: vec![
            weekend_holder(TALMON, "t-3", friday(), true),
            weekend_holder(TALMON, "t-4", saturday(), true),
        ],
    }
}

/// Snapshot with three settlements of clearly different urgency.
pub(super) fn three_settlement_snapshot() -> EntitySnapshot {
    let mut snapshot = talmon_snapshot();
    snapshot.settlements = vec![TALMON.to_string(), HARISH.to_string(), NILI.to_string()];
    snapshot.threat_ratings.push(threat(HARISH, [5, 5, 5, 5]));
    snapshot.incidents.push(incident(HARISH, IncidentStatus::Open));
    snapshot.incidents.push(incident(HARISH, IncidentStatus::Open));
    snapshot
        .soldiers
        .push(soldier("n-1", NILI, true, Some("M4-3000"), Some(days_ago(5))));
    snapshot.security_components.push(complete_components(NILI));
    snapshot
}

pub(super) fn aggregate(snapshot: EntitySnapshot) -> AggregatedEntities {
    EntityAggregator::new(Arc::new(snapshot))
        .fetch_all(now())
        .expect("week in range")
}

pub(super) fn build_service(
    snapshot: EntitySnapshot,
) -> (
    ReadinessService<EntitySnapshot, InMemoryWeightStore>,
    Arc<InMemoryWeightStore>,
) {
    let settlements = snapshot.settlement_names();
    let weights = Arc::new(InMemoryWeightStore::default());
    let service = ReadinessService::new(
        Arc::new(snapshot),
        weights.clone(),
        settlements,
        ScoringPolicy::default(),
    );
    (service, weights)
}

/// Source whose listed categories fail or panic; the weekend read ignores the window.
pub(super) struct FlakySource {
    pub inner: EntitySnapshot,
    pub failing: Vec<EntityCategory>,
    pub panicking: Vec<EntityCategory>,
}

impl FlakySource {
    pub(super) fn failing(inner: EntitySnapshot, failing: Vec<EntityCategory>) -> Self {
        Self {
            inner,
            failing,
            panicking: Vec::new(),
        }
    }

    fn check(&self, category: EntityCategory) -> Result<(), SourceError> {
        if self.panicking.contains(&category) {
            panic!("{} reader crashed", category.label());
        }
        if self.failing.contains(&category) {
            Err(SourceError::Unavailable(format!(
                "{} table offline",
                category.label()
            )))
        } else {
            Ok(())
        }
    }
}

impl EntitySource for FlakySource {
    fn soldiers(&self) -> Result<Vec<Soldier>, SourceError> {
        self.check(EntityCategory::Soldiers)?;
        Ok(self.inner.soldiers.clone())
    }

    fn certifications(&self) -> Result<Vec<Certification>, SourceError> {
        self.check(EntityCategory::Certifications)?;
        Ok(self.inner.certifications.clone())
    }

    fn security_components(&self) -> Result<Vec<SecurityComponent>, SourceError> {
        self.check(EntityCategory::SecurityComponents)?;
        Ok(self.inner.security_components.clone())
    }

    fn equipment(&self) -> Result<Vec<EquipmentAggregate>, SourceError> {
        self.check(EntityCategory::Equipment)?;
        Ok(self.inner.equipment.clone())
    }

    fn threat_ratings(&self) -> Result<Vec<ThreatRating>, SourceError> {
        self.check(EntityCategory::ThreatRatings)?;
        Ok(self.inner.threat_ratings.clone())
    }

    fn open_incidents(&self) -> Result<Vec<Incident>, SourceError> {
        self.check(EntityCategory::OpenIncidents)?;
        Ok(self.inner.incidents.clone())
    }

    fn training_events(&self) -> Result<Vec<TrainingEvent>, SourceError> {
        self.check(EntityCategory::TrainingEvents)?;
        Ok(self.inner.training_events.clone())
    }

    fn drills(&self) -> Result<Vec<Drill>, SourceError> {
        self.check(EntityCategory::Drills)?;
        Ok(self.inner.drills.clone())
    }

    fn weekend_weapon_holders(
        &self,
        _week: &WeekWindow,
    ) -> Result<Vec<WeekendWeaponHolder>, SourceError> {
        self.check(EntityCategory::WeekendWeaponHolders)?;
        Ok(self.inner.weekend_weapon_holders.clone())
    }
}

pub(super) struct UnavailableWeightStore;

impl WeightStore for UnavailableWeightStore {
    fn load(&self) -> Result<Option<WeightsRecord>, WeightsError> {
        Err(WeightsError::Storage("config database offline".to_string()))
    }

    fn save(&self, _record: WeightsRecord) -> Result<(), WeightsError> {
        Err(WeightsError::Storage("config database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
