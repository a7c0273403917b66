use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Completed => "completed",
        }
    }
}

/// One row of the schedule page. `updated_at` is not part of the record; the
/// store stamps it at write time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchRecord {
    pub id: String,
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl MatchRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: MatchStatus::Scheduled,
            score: None,
            home_team: None,
            away_team: None,
            date: None,
        }
    }

    /// Records a played score and marks the match completed. The parser sets the
    /// score only through this method, so status and score stay in step.
    pub fn set_score(&mut self, score: impl Into<String>) {
        self.score = Some(score.into());
        self.status = MatchStatus::Completed;
    }

    /// Numeric part of the identifier, e.g. 30 for "M030".
    pub fn number(&self) -> Option<u32> {
        match_number(&self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundInfo {
    pub round: &'static str,
    pub last_match: &'static str,
    pub date: &'static str,
}

/// Rounds of the 2024 Empress's Cup, in play order. Reference data only; the
/// crawler never consults it while extracting.
pub const EMPRESS_CUP_ROUNDS: &[RoundInfo] = &[
    RoundInfo { round: "3", last_match: "M028", date: "2024-12-01" },
    RoundInfo { round: "4", last_match: "M032", date: "2024-12-08" },
    RoundInfo { round: "5", last_match: "M040", date: "2024-12-15" },
    RoundInfo { round: "準々決勝", last_match: "M044", date: "2024-12-22" },
    RoundInfo { round: "準決勝", last_match: "M046", date: "2025-01-18" },
    RoundInfo { round: "決勝", last_match: "M047", date: "2025-01-25" },
];

/// Looks up the round a match belongs to: the first round whose final match
/// number is not below the given one.
pub fn round_for_match(match_id: &str) -> Option<&'static RoundInfo> {
    let number = match_number(match_id)?;
    EMPRESS_CUP_ROUNDS
        .iter()
        .find(|round| match_number(round.last_match).map_or(false, |last| number <= last))
}

fn match_number(match_id: &str) -> Option<u32> {
    match_id.strip_prefix('M')?.parse().ok()
}
