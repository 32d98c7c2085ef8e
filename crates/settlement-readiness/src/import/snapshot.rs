use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::SnapshotError;
use crate::readiness::aggregator::{EntitySource, SourceError, WeekWindow};
use crate::readiness::domain::{
    Certification, Drill, EquipmentAggregate, Incident, IncidentStatus, SecurityComponent,
    Soldier, ThreatRating, TrainingEvent, WeekendWeaponHolder,
};

/// In-memory copy of every entity category, typically loaded from a JSON export.
///
/// Missing categories deserialize as empty. `settlements` optionally carries the
/// master list when the deployment does not configure one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySnapshot {
    pub settlements: Vec<String>,
    pub soldiers: Vec<Soldier>,
    pub certifications: Vec<Certification>,
    pub security_components: Vec<SecurityComponent>,
    pub equipment: Vec<EquipmentAggregate>,
    pub threat_ratings: Vec<ThreatRating>,
    pub incidents: Vec<Incident>,
    pub training_events: Vec<TrainingEvent>,
    pub drills: Vec<Drill>,
    pub weekend_weapon_holders: Vec<WeekendWeaponHolder>,
}

impl EntitySnapshot {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_reader(reader)?;
        for rating in &snapshot.threat_ratings {
            if let Some((field, value)) = rating.out_of_scale() {
                return Err(SnapshotError::InvalidThreatRating {
                    settlement: rating.settlement.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(snapshot)
    }

    /// Replaces the roster, e.g. with a fresher personnel-system CSV export.
    pub fn with_soldiers(mut self, soldiers: Vec<Soldier>) -> Self {
        self.soldiers = soldiers;
        self
    }

    /// Master list from the snapshot, or settlements in first-seen record order.
    pub fn settlement_names(&self) -> Vec<String> {
        if !self.settlements.is_empty() {
            return self.settlements.clone();
        }

        let seen = self
            .soldiers
            .iter()
            .map(|soldier| soldier.settlement.as_str())
            .chain(self.security_components.iter().map(|c| c.settlement.as_str()))
            .chain(self.threat_ratings.iter().map(|t| t.settlement.as_str()));

        let mut names: Vec<String> = Vec::new();
        for name in seen {
            if !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

impl EntitySource for EntitySnapshot {
    fn soldiers(&self) -> Result<Vec<Soldier>, SourceError> {
        Ok(self.soldiers.clone())
    }

    fn certifications(&self) -> Result<Vec<Certification>, SourceError> {
        Ok(self.certifications.clone())
    }

    fn security_components(&self) -> Result<Vec<SecurityComponent>, SourceError> {
        Ok(self.security_components.clone())
    }

    fn equipment(&self) -> Result<Vec<EquipmentAggregate>, SourceError> {
        Ok(self.equipment.clone())
    }

    fn threat_ratings(&self) -> Result<Vec<ThreatRating>, SourceError> {
        Ok(self.threat_ratings.clone())
    }

    fn open_incidents(&self) -> Result<Vec<Incident>, SourceError> {
        Ok(self
            .incidents
            .iter()
            .filter(|incident| incident.status == IncidentStatus::Open)
            .cloned()
            .collect())
    }

    fn training_events(&self) -> Result<Vec<TrainingEvent>, SourceError> {
        Ok(self.training_events.clone())
    }

    fn drills(&self) -> Result<Vec<Drill>, SourceError> {
        Ok(self.drills.clone())
    }

    fn weekend_weapon_holders(
        &self,
        week: &WeekWindow,
    ) -> Result<Vec<WeekendWeaponHolder>, SourceError> {
        Ok(self
            .weekend_weapon_holders
            .iter()
            .filter(|holder| week.contains_date(holder.weekend_date))
            .cloned()
            .collect())
    }
}
