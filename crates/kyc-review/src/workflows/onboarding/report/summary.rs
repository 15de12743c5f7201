use super::findings::{self, FindingRow, FindingSection};
use crate::workflows::onboarding::domain::{
    Applicant, ApplicantId, ApplicantStatus, PiiField, Step, VerificationResult,
};
use crate::workflows::onboarding::flows::{FlowRequirementResolver, DEFAULT_FLOW, MISSING_VALUE};
use crate::workflows::onboarding::status::{derive_overall_status, RawStatus, StatusTone};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatusEntry {
    pub step: Step,
    pub step_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_status: Option<String>,
    pub status_label: String,
    pub tone: StatusTone,
}

/// Everything a report shows, derived from the applicant and its results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub applicant_id: ApplicantId,
    pub subject_name: String,
    pub created_on: NaiveDate,
    pub flow_name: String,
    pub overall_status: ApplicantStatus,
    pub overall_label: &'static str,
    pub overall_tone: StatusTone,
    pub identity: Vec<FindingRow>,
    pub steps: Vec<StepStatusEntry>,
    pub findings: Vec<FindingSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<FindingSection>,
}

impl ReportSummary {
    pub fn build(
        applicant: &Applicant,
        results: &[VerificationResult],
        resolver: &FlowRequirementResolver,
    ) -> Self {
        let flow = applicant.flow_name.as_deref();
        let required = resolver.required_steps_for(flow);

        let overall_status = derive_overall_status(applicant.tracked_statuses(required));

        let identity = [
            ("Email", PiiField::Email),
            ("Phone", PiiField::Phone),
            ("Address", PiiField::Address),
        ]
        .into_iter()
        .map(|(label, field)| FindingRow {
            label,
            value: resolver.display_value(flow, field, applicant.identity_value(field)),
            tone: StatusTone::Neutral,
        })
        .collect();

        let steps = required
            .iter()
            .map(|step| {
                let raw_status = applicant.step_status(*step);
                let (status_label, tone) = match raw_status.as_deref() {
                    Some(raw) if !raw.trim().is_empty() => {
                        let status = RawStatus::parse(raw);
                        (status.label(), status.tone())
                    }
                    _ => (MISSING_VALUE.to_string(), StatusTone::Neutral),
                };
                StepStatusEntry {
                    step: *step,
                    step_label: step.label(),
                    raw_status,
                    status_label,
                    tone,
                }
            })
            .collect();

        let flow_name = flow
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FLOW)
            .to_string();

        Self {
            applicant_id: applicant.id.clone(),
            subject_name: applicant.display_name(),
            created_on: applicant.created_at.date_naive(),
            flow_name,
            overall_status,
            overall_label: overall_status.label(),
            overall_tone: StatusTone::for_applicant(overall_status),
            identity,
            steps,
            findings: findings::key_findings(applicant, results, resolver),
            location: findings::location_section(applicant, results),
        }
    }
}
