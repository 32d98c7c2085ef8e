use chrono::{Months, NaiveDate};

use super::super::aggregator::AggregatedEntities;
use super::reasons::Reason;
use super::to_percent;

/// Events needed in the window for full event credit.
const EVENTS_FOR_FULL_CREDIT: f64 = 2.0;
/// Drills needed in the window for full drill credit.
const DRILLS_FOR_FULL_CREDIT: f64 = 1.0;
const HALF_CREDIT: f64 = 50.0;

pub(crate) struct TrainingAssessment {
    pub recent_events: usize,
    pub recent_drills: usize,
    pub score: u8,
    pub reasons: Vec<Reason>,
}

/// Inclusive `[today - months, today]` window; future-dated entries are not yet held.
pub(crate) fn recent_window(today: NaiveDate, months: u32) -> (NaiveDate, NaiveDate) {
    let cutoff = today
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);
    (cutoff, today)
}

pub(crate) fn assess_training(
    settlement: &str,
    entities: &AggregatedEntities,
    months: u32,
    today: NaiveDate,
) -> TrainingAssessment {
    let (cutoff, until) = recent_window(today, months);
    let within = |date: NaiveDate| cutoff <= date && date <= until;

    let recent_events = entities
        .training_events
        .iter()
        .filter(|event| event.settlement == settlement && within(event.event_date))
        .count();
    let recent_drills = entities
        .drills
        .iter()
        .filter(|drill| drill.settlement == settlement && within(drill.drill_date))
        .count();

    let event_score = (recent_events as f64 / EVENTS_FOR_FULL_CREDIT).min(1.0) * HALF_CREDIT;
    let drill_score = (recent_drills as f64 / DRILLS_FOR_FULL_CREDIT).min(1.0) * HALF_CREDIT;

    let mut reasons = Vec::new();
    if recent_events == 0 {
        reasons.push(Reason::NoRecentTrainingEvents { months });
    }
    if recent_drills == 0 {
        reasons.push(Reason::NoRecentDrills { months });
    }

    TrainingAssessment {
        recent_events,
        recent_drills,
        score: to_percent(event_score + drill_score),
        reasons,
    }
}
