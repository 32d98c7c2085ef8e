use super::super::aggregator::AggregatedEntities;
use super::personnel::PersonnelAssessment;
use super::reasons::Reason;
use super::to_percent;

const MAX_ORDINAL: f64 = 5.0;
const HIGH_VILLAGE_PROXIMITY: u8 = 4;
const QUALIFIED_SHARE_POINTS: f64 = 40.0;
const ARMED_POINTS: f64 = 30.0;
const WEEKEND_HOLDER_POINTS: f64 = 30.0;
const POINTS_PER_INCIDENT: usize = 25;

pub(crate) struct ThreatAssessment {
    pub rating: u8,
    pub reasons: Vec<Reason>,
}

pub(crate) fn assess_threat(settlement: &str, entities: &AggregatedEntities) -> ThreatAssessment {
    let Some(threat) = entities
        .threat_ratings
        .iter()
        .find(|rating| rating.settlement == settlement)
    else {
        return ThreatAssessment {
            rating: 0,
            reasons: Vec::new(),
        };
    };

    let mut reasons = Vec::new();
    if threat.village_proximity >= HIGH_VILLAGE_PROXIMITY {
        reasons.push(Reason::HighVillageProximity(threat.village_proximity));
    }

    ThreatAssessment {
        rating: to_percent(threat.average() / MAX_ORDINAL * 100.0),
        reasons,
    }
}

pub(crate) struct ResponseAssessment {
    pub weekend_approved: usize,
    /// Inverse of response strength; higher means a weaker response.
    pub capability: u8,
    pub reasons: Vec<Reason>,
}

pub(crate) fn assess_response(
    settlement: &str,
    entities: &AggregatedEntities,
    personnel: &PersonnelAssessment,
) -> ResponseAssessment {
    let weekend_approved = entities
        .weekend_weapon_holders
        .iter()
        .filter(|holder| holder.settlement == settlement && holder.holding_weapon)
        .count();

    let response_score = if personnel.active_soldiers == 0 {
        0.0
    } else {
        let armed = if personnel.armed_count > 0 {
            ARMED_POINTS
        } else {
            0.0
        };
        let weekend = if weekend_approved > 0 {
            WEEKEND_HOLDER_POINTS
        } else {
            0.0
        };
        personnel.qualified_share() * QUALIFIED_SHARE_POINTS + armed + weekend
    };

    let mut reasons = Vec::new();
    if weekend_approved == 0 {
        reasons.push(Reason::NoWeekendWeaponHolders);
    }

    ResponseAssessment {
        weekend_approved,
        capability: to_percent(100.0 - response_score),
        reasons,
    }
}

pub(crate) struct IncidentAssessment {
    pub open_incidents: usize,
    pub score: u8,
    pub reasons: Vec<Reason>,
}

pub(crate) fn assess_incidents(
    settlement: &str,
    entities: &AggregatedEntities,
) -> IncidentAssessment {
    let open_incidents = entities
        .open_incidents
        .iter()
        .filter(|incident| incident.settlement == settlement)
        .count();

    let mut reasons = Vec::new();
    if open_incidents > 0 {
        reasons.push(Reason::OpenIncidents(open_incidents));
    }

    IncidentAssessment {
        open_incidents,
        score: to_percent(open_incidents.saturating_mul(POINTS_PER_INCIDENT).min(100) as f64),
        reasons,
    }
}
