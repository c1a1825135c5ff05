// Terminal rendering of workflow views

use colored::Colorize;
use resume_match_core::application::{ExportReport, WorkflowSnapshot};
use resume_match_core::domain::{DocumentKind, HistoryRecord, MatchResult, UploadMessage};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Resume ID")]
    resume_id: i64,
    #[tabled(rename = "Job ID")]
    job_id: i64,
    #[tabled(rename = "Matched Skills")]
    matched: String,
    #[tabled(rename = "Missing Skills")]
    missing: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
}

impl From<&HistoryRecord> for HistoryRow {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            id: record.id,
            resume_id: record.resume_id,
            job_id: record.job_id,
            matched: record.matched_skills.clone().unwrap_or_default(),
            missing: record.missing_skills.clone().unwrap_or_default(),
            score: record.score_label(),
            timestamp: record.timestamp_label(),
        }
    }
}

/// Same six rows the exports carry
pub fn match_result(result: &MatchResult, resume_file: &str, job_file: &str) -> String {
    let rows: Vec<FieldRow> = ExportReport::new(result, resume_file, job_file)
        .rows()
        .into_iter()
        .map(|(field, value)| FieldRow { field, value })
        .collect();
    Table::new(rows).with(Style::modern()).to_string()
}

/// Server order, unchanged
pub fn history(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return "No match history yet".dimmed().to_string();
    }
    Table::new(records.iter().map(HistoryRow::from))
        .with(Style::modern())
        .to_string()
}

pub fn upload_message(message: &UploadMessage) -> String {
    match message {
        UploadMessage::Confirmed(receipt) => format!("✅ {}", receipt.message).green().to_string(),
        UploadMessage::Failed(text) => format!("❌ {}", text).red().to_string(),
    }
}

pub fn status(snapshot: &WorkflowSnapshot) -> String {
    let mut lines = vec![format!(
        "  {} {}",
        "State:".bold(),
        snapshot.state.to_string().cyan()
    )];

    for kind in [DocumentKind::Resume, DocumentKind::JobDescription] {
        let slot = snapshot.slot(kind);
        let file = slot.file_name.as_deref().unwrap_or("(none)");
        let mut line = format!("  {:<8} {}", format!("{}:", kind).bold(), file);
        if slot.uploading {
            line.push_str(&format!(" {}", "uploading...".yellow()));
        }
        if let Some(message) = &slot.message {
            line.push_str(&format!("  {}", upload_message(message)));
        }
        lines.push(line);
    }

    if let Some(alert) = &snapshot.alert {
        lines.push(format!("  {} {}", "⚠".red(), alert.red()));
    }
    if let Some(result) = &snapshot.result {
        lines.push(format!(
            "  {} {} ({})",
            "Score:".bold(),
            result.score_label().green().bold(),
            result.computed_at_label()
        ));
    }
    lines.push(format!(
        "  {} {}",
        "Exports:".bold(),
        if snapshot.can_export() {
            "available".green()
        } else {
            "run a match first".dimmed()
        }
    ));
    lines.push(format!("  {} {} record(s)", "History:".bold(), snapshot.history_len));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use resume_match_core::domain::MatchPayload;

    #[test]
    fn test_result_table_lists_rows_in_order() {
        let payload = MatchPayload {
            match_score: Some(82.0),
            matched_skills: Some("Java, SQL".to_string()),
            missing_skills: Some("Python".to_string()),
        };
        let computed_at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let result = MatchResult::from_payload(payload, computed_at);

        let table = match_result(&result, "resume.pdf", "job.pdf");

        let resume = table.find("Resume File").unwrap();
        let score = table.find("Match Score").unwrap();
        let stamp = table.find("Timestamp").unwrap();
        assert!(resume < score && score < stamp);
        assert!(table.contains("Java, SQL"));
        assert!(table.contains("82%"));
        assert!(table.contains("2024-01-01 10:00"));
    }

    #[test]
    fn test_history_keeps_server_order() {
        let records: Vec<HistoryRecord> = serde_json::from_str(
            r#"[{"id":9,"resumeId":1,"jobId":1,"matchScore":40},
                {"id":2,"resumeId":1,"jobId":1,"matchScore":75.5,"timestamp":"2024-01-01T10:00:00"}]"#,
        )
        .unwrap();

        let table = history(&records);

        assert!(table.find("│ 9").unwrap() < table.find("│ 2").unwrap());
        assert!(table.contains("75.5%"));
        assert!(table.contains("N/A"));
    }
}
