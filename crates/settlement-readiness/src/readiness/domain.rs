use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days a range (shooting) qualification stays valid.
pub const SHOOTING_VALIDITY_DAYS: i64 = 180;
/// Days a certification stays valid after its last refresh.
pub const CERT_VALIDITY_DAYS: i64 = 365;
/// Trailing window, in calendar months, for training events and drills.
pub const RECENT_ACTIVITY_MONTHS: u32 = 6;

/// Validity and recency windows applied while scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub shooting_validity_days: i64,
    pub cert_validity_days: i64,
    pub recent_activity_months: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            shooting_validity_days: SHOOTING_VALIDITY_DAYS,
            cert_validity_days: CERT_VALIDITY_DAYS,
            recent_activity_months: RECENT_ACTIVITY_MONTHS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoldierId(pub String);

impl fmt::Display for SoldierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Roster entry owned by the personnel system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Soldier {
    pub id: SoldierId,
    #[serde(default)]
    pub full_name: String,
    pub settlement: String,
    pub active: bool,
    #[serde(default)]
    pub weapon_serial: Option<String>,
    #[serde(default)]
    pub last_range_date: Option<NaiveDate>,
}

impl Soldier {
    pub fn is_armed(&self) -> bool {
        is_set(&self.weapon_serial)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub soldier_id: SoldierId,
    pub kind: String,
    #[serde(default)]
    pub last_refresh_date: Option<NaiveDate>,
}

/// Security infrastructure survey; at most one per settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityComponent {
    pub settlement: String,
    #[serde(default)]
    pub has_armory: bool,
    #[serde(default)]
    pub has_armored_vehicle: bool,
    #[serde(default)]
    pub has_shelter: bool,
    #[serde(default)]
    pub fence_type: Option<String>,
    #[serde(default)]
    pub command_center_type: Option<String>,
    #[serde(default)]
    pub defensive_security_type: Option<String>,
}

impl SecurityComponent {
    pub fn has_fence(&self) -> bool {
        is_set(&self.fence_type)
    }

    pub fn has_command_center(&self) -> bool {
        is_set(&self.command_center_type)
    }

    pub fn has_defensive_security(&self) -> bool {
        is_set(&self.defensive_security_type)
    }

    /// Presence checks in survey order.
    pub fn checks(&self) -> [bool; 6] {
        [
            self.has_armory,
            self.has_armored_vehicle,
            self.has_shelter,
            self.has_fence(),
            self.has_command_center(),
            self.has_defensive_security(),
        ]
    }
}

/// Expected versus on-hand equipment totals for a settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentAggregate {
    pub settlement: String,
    pub expected_quantity: u32,
    pub actual_quantity: u32,
}

/// Ordinal threat assessment, each field on a 1-5 scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatRating {
    pub settlement: String,
    pub village_proximity: u8,
    pub road_proximity: u8,
    pub topographic_vulnerability: u8,
    pub regional_alert: u8,
}

impl ThreatRating {
    pub const SCALE: std::ops::RangeInclusive<u8> = 1..=5;

    /// First field whose ordinal falls outside [`Self::SCALE`].
    pub fn out_of_scale(&self) -> Option<(&'static str, u8)> {
        [
            ("village_proximity", self.village_proximity),
            ("road_proximity", self.road_proximity),
            ("topographic_vulnerability", self.topographic_vulnerability),
            ("regional_alert", self.regional_alert),
        ]
        .into_iter()
        .find(|(_, value)| !Self::SCALE.contains(value))
    }

    pub fn average(&self) -> f64 {
        let sum = u32::from(self.village_proximity)
            + u32::from(self.road_proximity)
            + u32::from(self.topographic_vulnerability)
            + u32::from(self.regional_alert);
        f64::from(sum) / 4.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub settlement: String,
    pub status: IncidentStatus,
    #[serde(default)]
    pub reported_on: Option<NaiveDate>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingEvent {
    pub settlement: String,
    #[serde(default)]
    pub title: String,
    pub event_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drill {
    pub settlement: String,
    #[serde(default)]
    pub scenario: String,
    pub drill_date: NaiveDate,
}

/// Weekend weapon-holding approval for one soldier on one weekend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekendWeaponHolder {
    pub settlement: String,
    pub soldier_id: SoldierId,
    pub weekend_date: NaiveDate,
    pub holding_weapon: bool,
}

fn is_set(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|raw| !raw.trim().is_empty())
        .unwrap_or(false)
}
