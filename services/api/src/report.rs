use crate::infra::{build_service, load_snapshot};
use chrono::{Local, NaiveDateTime};
use clap::Args;
use settlement_readiness::config::AppConfig;
use settlement_readiness::error::AppError;
use settlement_readiness::readiness::{
    ReadinessDashboard, ReadinessServiceError, SettlementScore, SeverityBand, WeightsOrigin,
};
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Entity snapshot export (JSON)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Optional roster CSV replacing the snapshot's soldiers
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Evaluation instant (YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_datetime)]
    pub(crate) at: Option<NaiveDateTime>,
    /// Only print this settlement
    #[arg(long)]
    pub(crate) settlement: Option<String>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        snapshot,
        roster,
        at,
        settlement,
    } = args;

    let config = AppConfig::load()?;
    let snapshot = load_snapshot(Some(&snapshot), roster.as_deref())?;
    let service = build_service(&config.scoring, snapshot);

    let now = at.unwrap_or_else(|| Local::now().naive_local());
    let dashboard = service.dashboard(now)?;
    print!("{}", render_dashboard(&dashboard, settlement.as_deref())?);
    Ok(())
}

/// Text rendering of a dashboard, optionally narrowed to one settlement.
pub(crate) fn render_dashboard(
    dashboard: &ReadinessDashboard,
    only: Option<&str>,
) -> Result<String, AppError> {
    if let Some(name) = only {
        if dashboard.scores.find_by_settlement(name).is_none() {
            return Err(ReadinessServiceError::UnknownSettlement(name.to_string()).into());
        }
    }

    let mut out = String::new();
    render_into(&mut out, dashboard, only)
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
    Ok(out)
}

fn render_into(
    out: &mut String,
    dashboard: &ReadinessDashboard,
    only: Option<&str>,
) -> std::fmt::Result {
    writeln!(out, "Settlement readiness report")?;
    writeln!(
        out,
        "Evaluated {} (week {} -> {})",
        dashboard.evaluated_at,
        dashboard.week.start.date(),
        dashboard.week.end.date()
    )?;

    match &dashboard.weights.origin {
        WeightsOrigin::Defaults => writeln!(out, "Weights: defaults")?,
        WeightsOrigin::Saved {
            updated_by,
            updated_at,
        } => writeln!(out, "Weights: saved by {updated_by} at {updated_at}")?,
    }

    if dashboard.warnings.is_empty() {
        writeln!(out, "Data warnings: none")?;
    } else {
        writeln!(out, "Data warnings (scored without these records)")?;
        for warning in &dashboard.warnings {
            writeln!(out, "- {}: {}", warning.category.label(), warning.detail)?;
        }
    }

    if dashboard.scores.is_empty() {
        writeln!(out, "\nNo settlements configured")?;
        return Ok(());
    }

    for (position, score) in dashboard.scores.scores().iter().enumerate() {
        if only.is_some_and(|name| name != score.settlement) {
            continue;
        }
        writeln!(out)?;
        render_score(out, position + 1, score)?;
    }
    Ok(())
}

fn render_score(out: &mut String, rank: usize, score: &SettlementScore) -> std::fmt::Result {
    writeln!(
        out,
        "{rank}. {} | priority {} [{}] | readiness {} [{}] | risk {} [{}]",
        score.settlement,
        score.priority,
        SeverityBand::for_risk(score.priority).label(),
        score.readiness,
        SeverityBand::for_readiness(score.readiness).label(),
        score.risk,
        SeverityBand::for_risk(score.risk).label(),
    )?;
    writeln!(
        out,
        "   personnel {} | components {} | training {} | threat {} | infrastructure gap {} | response gap {} | incidents {}",
        score.personnel_fitness,
        score.component_health,
        score.training_score,
        score.threat_rating,
        score.infra_vulnerability,
        score.response_capability,
        score.incident_score,
    )?;
    writeln!(
        out,
        "   fighters {}/{} active, {} armed, {} weekend holders | equipment {}/{} on hand",
        score.active_soldiers,
        score.total_soldiers,
        score.armed_count,
        score.weekend_approved,
        score.equipment_on_hand,
        score.equipment_expected,
    )?;

    if score.reasons.is_empty() {
        writeln!(out, "   No gaps detected")?;
    } else {
        for reason in &score.reasons {
            writeln!(out, "   - {reason}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use settlement_readiness::config::ScoringConfig;
    use settlement_readiness::import::EntitySnapshot;
    use settlement_readiness::readiness::{
        ScoringPolicy, SecurityComponent, Soldier, SoldierId, ThreatRating,
    };

    fn evaluated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 16)
            .expect("valid date")
            .and_hms_opt(10, 0, 0)
            .expect("valid time")
    }

    fn dashboard() -> ReadinessDashboard {
        let snapshot = EntitySnapshot {
            settlements: vec!["Talmon".to_string(), "Harish".to_string()],
            soldiers: vec![Soldier {
                id: SoldierId("t-1".to_string()),
                full_name: "Avi Cohen".to_string(),
                settlement: "Talmon".to_string(),
                active: true,
                weapon_serial: Some("M4-1100".to_string()),
                last_range_date: NaiveDate::from_ymd_opt(2025, 9, 1),
            }],
            security_components: vec![SecurityComponent {
                settlement: "Talmon".to_string(),
                has_armory: true,
                has_armored_vehicle: true,
                has_shelter: true,
                fence_type: Some("electronic".to_string()),
                command_center_type: Some("mobile".to_string()),
                defensive_security_type: Some("patrol".to_string()),
            }],
            threat_ratings: vec![ThreatRating {
                settlement: "Harish".to_string(),
                village_proximity: 5,
                road_proximity: 4,
                topographic_vulnerability: 4,
                regional_alert: 5,
            }],
            ..EntitySnapshot::default()
        };
        let scoring = ScoringConfig {
            settlements: Vec::new(),
            snapshot_path: None,
            weights_path: None,
            policy: ScoringPolicy::default(),
        };
        build_service(&scoring, snapshot)
            .dashboard(evaluated_at())
            .expect("dashboard")
    }

    #[test]
    fn renders_ranked_settlements_with_bands_and_reasons() {
        let text = render_dashboard(&dashboard(), None).expect("rendered");

        assert!(text.contains("Evaluated 2025-10-16 10:00:00 (week 2025-10-12 -> 2025-10-18)"));
        assert!(text.contains("Weights: defaults"));
        let harish = text.find("1. Harish").expect("Harish ranked first");
        let talmon = text.find("2. Talmon").expect("Talmon ranked second");
        assert!(harish < talmon);
        assert!(text.contains("readiness 0 [Critical]"));
        assert!(text.contains("   - high village proximity (level 5)"));
        assert!(text.contains("   - no drills in the last 6 months"));
    }

    #[test]
    fn narrows_to_a_single_settlement() {
        let text = render_dashboard(&dashboard(), Some("Talmon")).expect("rendered");
        assert!(text.contains("2. Talmon"));
        assert!(!text.contains("Harish"));

        let err = render_dashboard(&dashboard(), Some("Itamar")).expect_err("unknown settlement");
        assert!(matches!(
            err,
            AppError::Readiness(ReadinessServiceError::UnknownSettlement(_))
        ));
    }
}
