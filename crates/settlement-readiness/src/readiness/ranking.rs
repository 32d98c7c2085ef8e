use serde::Serialize;

use super::scoring::SettlementScore;

/// Settlement scores ordered by priority, most urgent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReadinessBoard {
    scores: Vec<SettlementScore>,
}

impl ReadinessBoard {
    /// Stable sort by priority descending; ties keep master-list order.
    pub fn rank(mut scores: Vec<SettlementScore>) -> Self {
        scores.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { scores }
    }

    pub fn scores(&self) -> &[SettlementScore] {
        &self.scores
    }

    pub fn find_by_settlement(&self, name: &str) -> Option<&SettlementScore> {
        self.scores.iter().find(|score| score.settlement == name)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Three-way bucketing for text rendering; polarity differs per score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBand {
    Good,
    Watch,
    Critical,
}

impl SeverityBand {
    const HIGH: u8 = 70;
    const MIDDLE: u8 = 40;

    /// Higher readiness is better.
    pub const fn for_readiness(score: u8) -> Self {
        if score >= Self::HIGH {
            Self::Good
        } else if score >= Self::MIDDLE {
            Self::Watch
        } else {
            Self::Critical
        }
    }

    /// Higher risk or priority is worse.
    pub const fn for_risk(score: u8) -> Self {
        if score >= Self::HIGH {
            Self::Critical
        } else if score >= Self::MIDDLE {
            Self::Watch
        } else {
            Self::Good
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Watch => "Watch",
            Self::Critical => "Critical",
        }
    }
}
