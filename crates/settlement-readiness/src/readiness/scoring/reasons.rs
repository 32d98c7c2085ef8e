use std::fmt;

/// Diagnostic explaining what pulled a settlement's score down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reason {
    ExpiredRangeQualification(usize),
    ExpiredCertifications(usize),
    NoActiveFighters,
    ComponentsNotEntered,
    NoArmory,
    NoFence,
    NoCommandCenter,
    NoRecentTrainingEvents { months: u32 },
    NoRecentDrills { months: u32 },
    HighVillageProximity(u8),
    NoWeekendWeaponHolders,
    OpenIncidents(usize),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::ExpiredRangeQualification(count) => {
                write!(f, "{count} fighters without range qualification")
            }
            Reason::ExpiredCertifications(count) => write!(f, "{count} expired certifications"),
            Reason::NoActiveFighters => f.write_str("no active fighters"),
            Reason::ComponentsNotEntered => f.write_str("security components not entered"),
            Reason::NoArmory => f.write_str("no armory"),
            Reason::NoFence => f.write_str("no perimeter fence"),
            Reason::NoCommandCenter => f.write_str("no command center"),
            Reason::NoRecentTrainingEvents { months } => {
                write!(f, "no training events in the last {months} months")
            }
            Reason::NoRecentDrills { months } => write!(f, "no drills in the last {months} months"),
            Reason::HighVillageProximity(level) => {
                write!(f, "high village proximity (level {level})")
            }
            Reason::NoWeekendWeaponHolders => f.write_str("no approved weekend weapon holders"),
            Reason::OpenIncidents(count) => write!(f, "{count} open security incidents"),
        }
    }
}
