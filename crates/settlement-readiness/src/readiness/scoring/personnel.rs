use std::collections::HashSet;

use chrono::NaiveDate;

use super::super::aggregator::AggregatedEntities;
use super::super::domain::{ScoringPolicy, SoldierId};
use super::reasons::Reason;
use super::to_percent;

const SHOOTING_SHARE: f64 = 0.7;
const CERTIFICATION_SHARE: f64 = 0.3;

pub(crate) struct PersonnelAssessment {
    pub total_soldiers: usize,
    pub active_soldiers: usize,
    pub expired_shooting: usize,
    pub total_certifications: usize,
    pub expired_certifications: usize,
    pub armed_count: usize,
    pub fitness: u8,
    pub reasons: Vec<Reason>,
}

impl PersonnelAssessment {
    /// Share of active soldiers holding a valid range qualification, in [0, 1].
    pub fn qualified_share(&self) -> f64 {
        if self.active_soldiers == 0 {
            return 0.0;
        }
        (self.active_soldiers - self.expired_shooting) as f64 / self.active_soldiers as f64
    }
}

/// True when the record is missing or strictly older than the validity window.
pub(crate) fn is_expired(last: Option<NaiveDate>, today: NaiveDate, validity_days: i64) -> bool {
    match last {
        None => true,
        Some(date) => (today - date).num_days() > validity_days,
    }
}

pub(crate) fn assess_personnel(
    settlement: &str,
    entities: &AggregatedEntities,
    policy: &ScoringPolicy,
    today: NaiveDate,
) -> PersonnelAssessment {
    let roster: Vec<_> = entities
        .soldiers
        .iter()
        .filter(|soldier| soldier.settlement == settlement)
        .collect();
    let active: Vec<_> = roster.iter().filter(|soldier| soldier.active).collect();

    let expired_shooting = active
        .iter()
        .filter(|soldier| {
            is_expired(
                soldier.last_range_date,
                today,
                policy.shooting_validity_days,
            )
        })
        .count();
    let armed_count = active.iter().filter(|soldier| soldier.is_armed()).count();

    let active_ids: HashSet<&SoldierId> = active.iter().map(|soldier| &soldier.id).collect();
    let certifications: Vec<_> = entities
        .certifications
        .iter()
        .filter(|cert| active_ids.contains(&cert.soldier_id))
        .collect();
    let expired_certifications = certifications
        .iter()
        .filter(|cert| is_expired(cert.last_refresh_date, today, policy.cert_validity_days))
        .count();

    let mut assessment = PersonnelAssessment {
        total_soldiers: roster.len(),
        active_soldiers: active.len(),
        expired_shooting,
        total_certifications: certifications.len(),
        expired_certifications,
        armed_count,
        fitness: 0,
        reasons: Vec::new(),
    };

    let shooting_rate = assessment.qualified_share() * 100.0;
    // Having no certifications on file is not itself a fitness penalty.
    let cert_rate = if certifications.is_empty() {
        100.0
    } else {
        (certifications.len() - expired_certifications) as f64 / certifications.len() as f64
            * 100.0
    };

    if !active.is_empty() {
        assessment.fitness =
            to_percent(shooting_rate * SHOOTING_SHARE + cert_rate * CERTIFICATION_SHARE);
    }

    if expired_shooting > 0 {
        assessment
            .reasons
            .push(Reason::ExpiredRangeQualification(expired_shooting));
    }
    if expired_certifications > 0 {
        assessment
            .reasons
            .push(Reason::ExpiredCertifications(expired_certifications));
    }
    if active.is_empty() {
        assessment.reasons.push(Reason::NoActiveFighters);
    }

    assessment
}
