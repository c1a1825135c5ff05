// Delimited-text export
//
// Values are written unquoted: comma-joined skill lists spill into extra
// columns when the file is opened as a spreadsheet.

use super::{ExportArtifact, ExportFormat, ExportReport, TABLE_HEADER};

/// Seven `Field,Value` lines joined by `\n`, no trailing newline
pub fn render(report: &ExportReport) -> ExportArtifact {
    let mut lines = Vec::with_capacity(7);
    lines.push(TABLE_HEADER.join(","));
    for (field, value) in report.rows() {
        lines.push(format!("{},{}", field, value));
    }

    ExportArtifact {
        format: ExportFormat::Csv,
        bytes: lines.join("\n").into_bytes(),
    }
}
