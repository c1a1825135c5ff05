// History Record Domain Model

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use super::match_result::format_score;

/// A persisted past match, owned by the remote service
///
/// Skill lists are kept exactly as the server sends them. Null or missing
/// ids decode as 0 so one sparse row cannot fail the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resume_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_id: i64,
    #[serde(default)]
    pub matched_skills: Option<String>,
    #[serde(default)]
    pub missing_skills: Option<String>,
    #[serde(default)]
    pub match_score: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HistoryRecord {
    /// "N/A" when the server sent no score
    pub fn score_label(&self) -> String {
        match self.match_score {
            Some(score) => format!("{}%", format_score(score)),
            None => "N/A".to_string(),
        }
    }

    /// Timestamp for display: reformatted when parseable, raw otherwise, "N/A" when absent
    pub fn timestamp_label(&self) -> String {
        match self.timestamp.as_deref() {
            None | Some("") => "N/A".to_string(),
            Some(raw) => parse_server_timestamp(raw)
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| raw.to_string()),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Server sends either a local ISO datetime or an RFC 3339 instant
fn parse_server_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_server_shape() {
        let json = r#"[
            {"id": 7, "resumeId": 1, "jobId": 1, "matchedSkills": "java,sql",
             "missingSkills": "python", "matchScore": 66.67, "timestamp": "2024-03-05T09:15:00.123"},
            {"id": 3, "resumeId": 1, "jobId": 2, "matchedSkills": null,
             "missingSkills": null, "matchScore": 0, "timestamp": null}
        ]"#;
        let records: Vec<HistoryRecord> = serde_json::from_str(json).unwrap();

        // Server order is kept (7 before 3)
        assert_eq!(records[0].id, 7);
        assert_eq!(records[1].id, 3);
        assert_eq!(records[0].score_label(), "66.67%");
        assert_eq!(records[0].timestamp_label(), "2024-03-05 09:15:00");
        assert_eq!(records[1].timestamp_label(), "N/A");
    }

    #[test]
    fn test_null_fields_do_not_fail_the_list() {
        let json = r#"[
            {"id": 3, "resumeId": 1, "jobId": 1, "matchScore": null},
            {"id": null, "resumeId": null, "jobId": 2, "matchScore": 40},
            {"id": 1, "resumeId": 1, "jobId": 1, "matchScore": 82.5,
             "timestamp": "2024-01-01T10:00:00"}
        ]"#;
        let records: Vec<HistoryRecord> = serde_json::from_str(json).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].match_score, None);
        assert_eq!(records[0].score_label(), "N/A");
        assert_eq!((records[1].id, records[1].resume_id, records[1].job_id), (0, 0, 2));
        assert_eq!(records[1].score_label(), "40%");
        assert_eq!(records[2].score_label(), "82.5%");
    }

    #[test]
    fn test_unparseable_timestamp_is_shown_raw() {
        let record = HistoryRecord {
            id: 1,
            resume_id: 1,
            job_id: 1,
            matched_skills: None,
            missing_skills: None,
            match_score: Some(50.0),
            timestamp: Some("yesterday".to_string()),
        };
        assert_eq!(record.timestamp_label(), "yesterday");
    }
}
