// Match Result Domain Model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp layout used in result views and exports
pub const COMPUTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Opaque identifiers sent with a match request
///
/// The client never learns server-assigned ids from uploads, so the pair is a
/// fixed example pair supplied by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPair {
    pub resume_id: i64,
    pub job_id: i64,
}

impl MatchPair {
    pub const EXAMPLE: MatchPair = MatchPair {
        resume_id: 1,
        job_id: 1,
    };

    pub fn new(resume_id: i64, job_id: i64) -> Self {
        Self { resume_id, job_id }
    }
}

impl Default for MatchPair {
    fn default() -> Self {
        Self::EXAMPLE
    }
}

/// Raw `getMatchResult` response body
///
/// Skills arrive comma-joined; every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPayload {
    #[serde(default)]
    pub match_score: Option<f64>,
    #[serde(default)]
    pub matched_skills: Option<String>,
    #[serde(default)]
    pub missing_skills: Option<String>,
}

/// Score and skill partition for one resume/job pair
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub match_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub computed_at: NaiveDateTime,
}

impl MatchResult {
    /// Build a result from the wire payload, stamped with the apply time
    pub fn from_payload(payload: MatchPayload, computed_at: NaiveDateTime) -> Self {
        Self {
            match_score: payload.match_score.unwrap_or(0.0),
            matched_skills: split_skills(payload.matched_skills.as_deref()),
            missing_skills: split_skills(payload.missing_skills.as_deref()),
            computed_at,
        }
    }

    /// "82%", or "66.5%" for fractional scores
    pub fn score_label(&self) -> String {
        format!("{}%", format_score(self.match_score))
    }

    pub fn computed_at_label(&self) -> String {
        self.computed_at.format(COMPUTED_AT_FORMAT).to_string()
    }
}

/// Split a comma-joined skill list, trimming and dropping empty entries
pub fn split_skills(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|skill| !skill.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub(crate) fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        format!("{}", score)
    }
}
