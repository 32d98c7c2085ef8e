//! Batch read of every entity category the calculator needs.
//!
//! Categories are read concurrently and independently. A failed read degrades
//! that category to an empty collection and records a warning; the run goes on.

use std::sync::Arc;
use std::thread::{self, ScopedJoinHandle};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{
    Certification, Drill, EquipmentAggregate, Incident, IncidentStatus, SecurityComponent,
    Soldier, ThreatRating, TrainingEvent, WeekendWeaponHolder,
};

/// Sunday 00:00:00 through Saturday 23:59:59 of one local calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl WeekWindow {
    /// Fails when the week would start or end outside chrono's representable dates.
    pub fn containing(now: NaiveDateTime) -> Result<Self, EvaluationRangeError> {
        let date = now.date();
        let offset = i64::from(date.weekday().num_days_from_sunday());
        let start = date
            .checked_sub_signed(Duration::days(offset))
            .ok_or(EvaluationRangeError(now))?
            .and_time(NaiveTime::MIN);
        let end = start
            .checked_add_signed(Duration::days(7) - Duration::seconds(1))
            .ok_or(EvaluationRangeError(now))?;
        Ok(Self { start, end })
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start.date() <= date && date <= self.end.date()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Soldiers,
    Certifications,
    SecurityComponents,
    Equipment,
    ThreatRatings,
    OpenIncidents,
    TrainingEvents,
    Drills,
    WeekendWeaponHolders,
}

impl EntityCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Soldiers => "soldiers",
            Self::Certifications => "certifications",
            Self::SecurityComponents => "security components",
            Self::Equipment => "equipment",
            Self::ThreatRatings => "threat ratings",
            Self::OpenIncidents => "open incidents",
            Self::TrainingEvents => "training events",
            Self::Drills => "drills",
            Self::WeekendWeaponHolders => "weekend weapon holders",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("evaluation instant {0} is outside the supported calendar range")]
pub struct EvaluationRangeError(pub NaiveDateTime);

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to the records kept by the surrounding application.
pub trait EntitySource: Send + Sync {
    fn soldiers(&self) -> Result<Vec<Soldier>, SourceError>;
    fn certifications(&self) -> Result<Vec<Certification>, SourceError>;
    fn security_components(&self) -> Result<Vec<SecurityComponent>, SourceError>;
    fn equipment(&self) -> Result<Vec<EquipmentAggregate>, SourceError>;
    fn threat_ratings(&self) -> Result<Vec<ThreatRating>, SourceError>;
    fn open_incidents(&self) -> Result<Vec<Incident>, SourceError>;
    fn training_events(&self) -> Result<Vec<TrainingEvent>, SourceError>;
    fn drills(&self) -> Result<Vec<Drill>, SourceError>;
    fn weekend_weapon_holders(
        &self,
        week: &WeekWindow,
    ) -> Result<Vec<WeekendWeaponHolder>, SourceError>;
}

/// A category that was scored as empty because its read failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialDataWarning {
    pub category: EntityCategory,
    pub detail: String,
}

/// Everything one scoring run reads, fetched once for all settlements.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedEntities {
    pub week: WeekWindow,
    pub soldiers: Vec<Soldier>,
    pub certifications: Vec<Certification>,
    pub security_components: Vec<SecurityComponent>,
    pub equipment: Vec<EquipmentAggregate>,
    pub threat_ratings: Vec<ThreatRating>,
    pub open_incidents: Vec<Incident>,
    pub training_events: Vec<TrainingEvent>,
    pub drills: Vec<Drill>,
    pub weekend_weapon_holders: Vec<WeekendWeaponHolder>,
    pub warnings: Vec<PartialDataWarning>,
}

impl AggregatedEntities {
    pub fn empty(week: WeekWindow) -> Self {
        Self {
            week,
            soldiers: Vec::new(),
            certifications: Vec::new(),
            security_components: Vec::new(),
            equipment: Vec::new(),
            threat_ratings: Vec::new(),
            open_incidents: Vec::new(),
            training_events: Vec::new(),
            drills: Vec::new(),
            weekend_weapon_holders: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

pub struct EntityAggregator<S> {
    source: Arc<S>,
}

impl<S> Clone for EntityAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<S> EntityAggregator<S>
where
    S: EntitySource + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Reads all categories for the week containing `now`.
    pub fn fetch_all(
        &self,
        now: NaiveDateTime,
    ) -> Result<AggregatedEntities, EvaluationRangeError> {
        let week = WeekWindow::containing(now)?;
        let source = self.source.as_ref();

        let (
            soldiers,
            certifications,
            security_components,
            equipment,
            threat_ratings,
            open_incidents,
            training_events,
            drills,
            weekend_weapon_holders,
        ) = thread::scope(|scope| {
            let soldiers = scope.spawn(|| source.soldiers());
            let certifications = scope.spawn(|| source.certifications());
            let security_components = scope.spawn(|| source.security_components());
            let equipment = scope.spawn(|| source.equipment());
            let threat_ratings = scope.spawn(|| source.threat_ratings());
            let open_incidents = scope.spawn(|| source.open_incidents());
            let training_events = scope.spawn(|| source.training_events());
            let drills = scope.spawn(|| source.drills());
            let weekend_weapon_holders = scope.spawn(|| source.weekend_weapon_holders(&week));

            (
                joined(soldiers),
                joined(certifications),
                joined(security_components),
                joined(equipment),
                joined(threat_ratings),
                joined(open_incidents),
                joined(training_events),
                joined(drills),
                joined(weekend_weapon_holders),
            )
        });

        let mut warnings = Vec::new();
        let mut entities = AggregatedEntities::empty(week);
        entities.soldiers = settle(EntityCategory::Soldiers, soldiers, &mut warnings);
        entities.certifications =
            settle(EntityCategory::Certifications, certifications, &mut warnings);
        entities.security_components = settle(
            EntityCategory::SecurityComponents,
            security_components,
            &mut warnings,
        );
        entities.equipment = settle(EntityCategory::Equipment, equipment, &mut warnings);
        entities.threat_ratings =
            settle(EntityCategory::ThreatRatings, threat_ratings, &mut warnings);
        entities.open_incidents =
            settle(EntityCategory::OpenIncidents, open_incidents, &mut warnings)
                .into_iter()
                .filter(|incident| incident.status == IncidentStatus::Open)
                .collect();
        entities.training_events =
            settle(EntityCategory::TrainingEvents, training_events, &mut warnings);
        entities.drills = settle(EntityCategory::Drills, drills, &mut warnings);
        entities.weekend_weapon_holders = settle(
            EntityCategory::WeekendWeaponHolders,
            weekend_weapon_holders,
            &mut warnings,
        )
        .into_iter()
        .filter(|holder| week.contains_date(holder.weekend_date))
        .collect();
        entities.warnings = warnings;

        debug!(
            soldiers = entities.soldiers.len(),
            open_incidents = entities.open_incidents.len(),
            degraded = entities.warnings.len(),
            week_start = %week.start,
            "entity snapshot aggregated"
        );

        Ok(entities)
    }
}

fn joined<T>(
    handle: ScopedJoinHandle<'_, Result<Vec<T>, SourceError>>,
) -> Result<Vec<T>, SourceError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(SourceError::Unavailable("reader panicked".to_string())))
}

fn settle<T>(
    category: EntityCategory,
    result: Result<Vec<T>, SourceError>,
    warnings: &mut Vec<PartialDataWarning>,
) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(err) => {
            warn!(
                category = category.label(),
                error = %err,
                "entity read failed; scoring with an empty collection"
            );
            warnings.push(PartialDataWarning {
                category,
                detail: err.to_string(),
            });
            Vec::new()
        }
    }
}
