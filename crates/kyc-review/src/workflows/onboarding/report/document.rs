use super::layout::{tone_color, ReportBuilder, TableCell, BODY_TEXT, MUTED_TEXT};
use super::summary::ReportSummary;
use super::DISCLAIMER;

const DATE_FORMAT: &str = "%d %b %Y";

/// Lays the summary out in report order: cover, key findings, location,
/// disclaimer. Header and footer bands belong to the builder.
pub(crate) fn render(summary: &ReportSummary, builder: &mut ReportBuilder) {
    builder.add_section("Verification Summary");
    builder.add_key_value("Subject", &summary.subject_name, BODY_TEXT);
    builder.add_key_value("Applicant ID", &summary.applicant_id.0, BODY_TEXT);
    builder.add_key_value(
        "Created",
        &summary.created_on.format(DATE_FORMAT).to_string(),
        BODY_TEXT,
    );
    builder.add_status_pill(
        "Overall Status",
        summary.overall_label,
        tone_color(summary.overall_tone),
    );
    builder.add_key_value("Flow", &summary.flow_name, BODY_TEXT);
    for row in &summary.identity {
        builder.add_key_value(row.label, &row.value, BODY_TEXT);
    }

    builder.add_subsection("Required Steps");
    let rows: Vec<Vec<TableCell>> = summary
        .steps
        .iter()
        .map(|entry| {
            vec![
                TableCell {
                    text: entry.step_label.to_string(),
                    color: BODY_TEXT,
                },
                TableCell {
                    text: entry.status_label.clone(),
                    color: tone_color(entry.tone),
                },
            ]
        })
        .collect();
    builder.add_table(&["Step", "Status"], &[0.65, 0.35], &rows);

    builder.add_section("Key Findings");
    if summary.findings.is_empty() {
        builder.add_paragraph(
            "No verification results were available when this report was generated.",
            9.5,
            MUTED_TEXT,
        );
    }
    for section in &summary.findings {
        builder.add_subsection(section.title);
        for row in &section.rows {
            builder.add_key_value(row.label, &row.value, tone_color(row.tone));
        }
    }

    if let Some(location) = &summary.location {
        builder.add_section(location.title);
        for row in &location.rows {
            builder.add_key_value(row.label, &row.value, BODY_TEXT);
        }
    }

    builder.add_section("Disclaimer");
    builder.add_paragraph(DISCLAIMER, 8.5, MUTED_TEXT);
}
