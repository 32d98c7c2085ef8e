use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

use super::SnapshotError;
use crate::readiness::domain::{Soldier, SoldierId};

/// Parses personnel-system roster exports into soldier records.
pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Soldier>, SnapshotError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Soldier>, SnapshotError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut soldiers = Vec::new();

        for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
            let row = record?;
            // Header is line 1.
            let line = index as u64 + 2;
            soldiers.push(row.into_soldier(line)?);
        }

        Ok(soldiers)
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Soldier ID")]
    soldier_id: String,
    #[serde(rename = "Full Name", default)]
    full_name: String,
    #[serde(rename = "Settlement")]
    settlement: String,
    #[serde(rename = "Active")]
    active: String,
    #[serde(
        rename = "Weapon Serial",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    weapon_serial: Option<String>,
    #[serde(
        rename = "Last Range Date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    last_range_date: Option<String>,
}

impl RosterRow {
    fn into_soldier(self, line: u64) -> Result<Soldier, SnapshotError> {
        if self.soldier_id.is_empty() {
            return Err(SnapshotError::InvalidRow {
                line,
                reason: "missing soldier id".to_string(),
            });
        }
        if self.settlement.is_empty() {
            return Err(SnapshotError::InvalidRow {
                line,
                reason: format!("soldier {} has no settlement", self.soldier_id),
            });
        }

        let active = parse_flag(&self.active).ok_or_else(|| SnapshotError::InvalidRow {
            line,
            reason: format!("unrecognized active flag '{}'", self.active),
        })?;

        let last_range_date = match self.last_range_date.as_deref() {
            None => None,
            Some(raw) => Some(parse_date(raw).ok_or_else(|| SnapshotError::InvalidRow {
                line,
                reason: format!("unrecognized range date '{raw}'"),
            })?),
        };

        Ok(Soldier {
            id: SoldierId(self.soldier_id),
            full_name: self.full_name,
            settlement: self.settlement,
            active,
            weapon_serial: self.weapon_serial,
            last_range_date,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" | "" => Some(false),
        _ => None,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}
