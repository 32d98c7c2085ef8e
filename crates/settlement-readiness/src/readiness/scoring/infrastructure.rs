use super::super::aggregator::AggregatedEntities;
use super::reasons::Reason;
use super::to_percent;

pub(crate) struct ComponentAssessment {
    pub health: u8,
    pub reasons: Vec<Reason>,
}

pub(crate) fn assess_components(
    settlement: &str,
    entities: &AggregatedEntities,
) -> ComponentAssessment {
    let Some(component) = entities
        .security_components
        .iter()
        .find(|component| component.settlement == settlement)
    else {
        return ComponentAssessment {
            health: 0,
            reasons: vec![Reason::ComponentsNotEntered],
        };
    };

    let checks = component.checks();
    let operational = checks.iter().filter(|present| **present).count();

    let mut reasons = Vec::new();
    if !component.has_armory {
        reasons.push(Reason::NoArmory);
    }
    if !component.has_fence() {
        reasons.push(Reason::NoFence);
    }
    if !component.has_command_center() {
        reasons.push(Reason::NoCommandCenter);
    }

    ComponentAssessment {
        health: to_percent(operational as f64 / checks.len() as f64 * 100.0),
        reasons,
    }
}
