use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use crate::workflows::onboarding::domain::{
    Applicant, ApplicantId, ApplicantStatus, Step, StepState, VerificationResult,
};
use crate::workflows::onboarding::report::{ReportCompiler, ReportInput, ReportSettings};
use crate::workflows::onboarding::flows::FlowRequirementResolver;

pub(super) fn generated_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

pub(super) fn compiler() -> ReportCompiler {
    ReportCompiler::new(
        FlowRequirementResolver::default(),
        ReportSettings::new("Northwind Compliance").with_generated_on(generated_on()),
    )
}

pub(super) fn applicant(flow: Option<&str>, steps: &[(Step, StepState)]) -> Applicant {
    Applicant {
        id: ApplicantId("app-7781".to_string()),
        full_name: Some("Jane Q. Doe".to_string()),
        email: Some("jane@example.com".to_string()),
        phone: Some("+44 20 7946 0018".to_string()),
        address: Some("221B Baker Street, London".to_string()),
        status: ApplicantStatus::Pending,
        flow_name: flow.map(str::to_string),
        steps: steps.iter().copied().collect::<BTreeMap<_, _>>(),
        required_verifications: Vec::new(),
        created_at: Utc
            .with_ymd_and_hms(2025, 3, 10, 9, 30, 0)
            .single()
            .expect("valid timestamp"),
        ip_address: Some("203.0.113.24".to_string()),
    }
}

pub(super) fn result(kind: &str, status: &str, day: u32, processed: Value) -> VerificationResult {
    VerificationResult {
        verification_type: kind.to_string(),
        status: status.to_string(),
        processed_data: processed,
        raw_response: Value::Null,
        created_at: Utc
            .with_ymd_and_hms(2025, 3, day, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub(super) fn input(applicant: Applicant, results: Vec<VerificationResult>) -> ReportInput {
    ReportInput {
        applicant,
        verification_results: results,
        client_name: None,
    }
}

pub(super) fn document_result() -> VerificationResult {
    result(
        "idDocument",
        "verified",
        11,
        json!({
            "documentType": "passport",
            "documentNumber": "X1234567",
            "dateOfBirth": "1988-04-02T00:00:00Z",
            "validity": "valid",
            "address": "221B Baker Street, London",
        }),
    )
}

pub(super) fn selfie_result() -> VerificationResult {
    result(
        "selfie",
        "passed",
        11,
        json!({
            "liveness": { "result": "passed", "score": 0.982 },
            "faceMatch": { "result": true, "score": 91.5 },
        }),
    )
}
