//! Dataset export
//!
//! Downloads a backend-generated PDF or Excel file and gives it a
//! timestamped name. Failures are noted on the `audit` target and returned.

use campus_core::{DashboardError, ExportFormat, ExportService, ExportTarget};
use chrono::{DateTime, SecondsFormat, Utc};

/// Downloaded export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// Suggested file name
    pub file_name: String,
    /// File content as returned by the backend
    pub bytes: Vec<u8>,
}

/// `<timestamp>-<suffix>.<ext>`, with `:` and `.` of the UTC timestamp
/// replaced by `-`
#[must_use]
pub fn export_file_name(target: ExportTarget, format: ExportFormat, at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{stamp}-{}.{}", target.file_suffix(), format.extension())
}

/// Download an export named after the current time
///
/// # Errors
/// Returns the normalized backend error
pub async fn export_dataset<S>(
    service: &S,
    target: ExportTarget,
    format: ExportFormat,
) -> Result<ExportFile, DashboardError>
where
    S: ExportService + ?Sized,
{
    match service.export(target, format).await {
        Ok(bytes) => {
            let file_name = export_file_name(target, format, Utc::now());
            tracing::info!(%file_name, size = bytes.len(), "export downloaded");
            Ok(ExportFile { file_name, bytes })
        }
        Err(err) => {
            tracing::warn!(
                target: "audit",
                dataset = target.file_suffix(),
                format = format.extension(),
                error = %err,
                "export failed"
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_name_replaces_separators() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 10, 20, 30).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(
            export_file_name(ExportTarget::Audits, ExportFormat::Pdf, at),
            "2024-03-05T10-20-30-123Z-reporte-auditorias.pdf"
        );
        assert_eq!(
            export_file_name(ExportTarget::Reports, ExportFormat::Excel, at),
            "2024-03-05T10-20-30-123Z-reporte-estadisticas.xlsx"
        );
    }
}
