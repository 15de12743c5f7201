use super::common::*;
use crate::workflows::onboarding::domain::{ApplicantStatus, RequiredVerification, Step, StepState};
use crate::workflows::onboarding::flows::{FLOW_PLACEHOLDER, MISSING_VALUE};
use crate::workflows::onboarding::report::{report_filename, FindingSection};
use crate::workflows::onboarding::status::StatusTone;
use serde_json::json;

fn row_value<'a>(section: &'a FindingSection, label: &str) -> &'a str {
    section
        .rows
        .iter()
        .find(|row| row.label == label)
        .map(|row| row.value.as_str())
        .unwrap_or_else(|| panic!("missing row {label}"))
}

#[test]
fn simple_kyc_hides_address_even_when_present() {
    let applicant = applicant(
        Some("SimpleKYC"),
        &[
            (Step::Phone, StepState::Passed),
            (Step::Email, StepState::Passed),
            (Step::IdDocument, StepState::Passed),
            (Step::Selfie, StepState::Passed),
        ],
    );
    let summary = compiler().summarize(&input(applicant, vec![document_result()]));

    let address = summary
        .identity
        .iter()
        .find(|row| row.label == "Address")
        .expect("address row");
    assert_eq!(address.value, FLOW_PLACEHOLDER);

    let document = &summary.findings[0];
    assert_eq!(row_value(document, "Address"), FLOW_PLACEHOLDER);
    assert_eq!(summary.overall_status, ApplicantStatus::Approved);
    assert_eq!(summary.steps.len(), 4);
}

#[test]
fn basic_idv_with_passed_checks_is_approved() {
    let applicant = applicant(
        Some("BASIC_IDV"),
        &[
            (Step::IdDocument, StepState::Passed),
            (Step::Selfie, StepState::Passed),
            (Step::Phone, StepState::Failed),
        ],
    );
    let summary = compiler().summarize(&input(applicant, Vec::new()));

    assert_eq!(summary.overall_status, ApplicantStatus::Approved);
    assert_eq!(summary.overall_label, "APPROVED");
    assert_eq!(summary.overall_tone, StatusTone::Positive);
    let labels: Vec<_> = summary.steps.iter().map(|entry| entry.step).collect();
    assert_eq!(labels, vec![Step::IdDocument, Step::Selfie]);
}

#[test]
fn enhanced_kyc_with_pending_poa_needs_review() {
    let applicant = applicant(
        Some("EnhancedKYC"),
        &[
            (Step::Phone, StepState::Passed),
            (Step::Email, StepState::Passed),
            (Step::IdDocument, StepState::Passed),
            (Step::Selfie, StepState::Passed),
            (Step::ProofOfAddress, StepState::Pending),
        ],
    );
    let summary = compiler().summarize(&input(applicant, Vec::new()));

    assert_eq!(summary.overall_status, ApplicantStatus::NeedsReview);
    let poa = summary
        .steps
        .iter()
        .find(|entry| entry.step == Step::ProofOfAddress)
        .expect("poa entry");
    assert_eq!(poa.status_label, "PENDING");
    assert_eq!(poa.tone, StatusTone::InProgress);
}

#[test]
fn default_flow_with_failed_document_is_rejected() {
    let applicant = applicant(
        None,
        &[
            (Step::Phone, StepState::Passed),
            (Step::Email, StepState::Passed),
            (Step::IdDocument, StepState::Failed),
            (Step::Selfie, StepState::Passed),
            (Step::ProofOfAddress, StepState::Passed),
        ],
    );
    let summary = compiler().summarize(&input(applicant, Vec::new()));

    assert_eq!(summary.flow_name, "Default");
    assert_eq!(summary.overall_status, ApplicantStatus::Rejected);
    let document = summary
        .steps
        .iter()
        .find(|entry| entry.step == Step::IdDocument)
        .expect("document entry");
    assert_eq!(document.status_label, "FAIL");
}

#[test]
fn required_verifications_take_precedence_over_step_states() {
    let mut applicant = applicant(
        Some("BASIC_IDV"),
        &[
            (Step::IdDocument, StepState::Passed),
            (Step::Selfie, StepState::Passed),
        ],
    );
    applicant.required_verifications = vec![
        RequiredVerification {
            verification_type: "idDocument".to_string(),
            status: "verified".to_string(),
        },
        RequiredVerification {
            verification_type: "selfie".to_string(),
            status: "rejected".to_string(),
        },
    ];
    let summary = compiler().summarize(&input(applicant, Vec::new()));

    assert_eq!(summary.overall_status, ApplicantStatus::Rejected);
    assert_eq!(summary.steps[1].status_label, "REJECTED");
}

#[test]
fn unrecorded_required_steps_hold_back_approval() {
    let applicant = applicant(Some("EnhancedKYC"), &[(Step::Phone, StepState::Passed)]);
    let summary = compiler().summarize(&input(applicant, Vec::new()));

    assert_eq!(summary.overall_status, ApplicantStatus::NeedsReview);
    assert_eq!(summary.steps[0].status_label, "PASS");
    assert!(summary.steps[1..]
        .iter()
        .all(|entry| entry.status_label == MISSING_VALUE));
}

#[test]
fn flow_gates_phone_and_email_findings() {
    let applicant = applicant(
        Some("BASIC_IDV"),
        &[
            (Step::IdDocument, StepState::Passed),
            (Step::Selfie, StepState::Passed),
        ],
    );
    let results = vec![
        result(
            "phone",
            "verified",
            11,
            json!({ "phoneNumber": "+1 202 555 0147", "carrier": { "name": "Acme Mobile" } }),
        ),
        result(
            "email",
            "verified",
            11,
            json!({ "email": "hidden@example.net", "deliverable": true }),
        ),
    ];
    let compiler = compiler();
    let summary = compiler.summarize(&input(applicant, results));

    let phone = summary
        .findings
        .iter()
        .find(|section| section.title == "Phone Verification")
        .expect("phone section");
    let email = summary
        .findings
        .iter()
        .find(|section| section.title == "Email Verification")
        .expect("email section");
    assert_eq!(row_value(phone, "Phone Number"), FLOW_PLACEHOLDER);
    assert_eq!(row_value(phone, "Carrier"), "Acme Mobile");
    assert_eq!(row_value(email, "Email Address"), FLOW_PLACEHOLDER);

    let layout = compiler.layout(&summary, "Northwind Compliance");
    assert!(!layout.texts().any(|text| text.contains("+1 202 555 0147")));
    assert!(!layout.texts().any(|text| text.contains("hidden@example.net")));
}

#[test]
fn applicant_without_tracked_statuses_is_pending() {
    let applicant = applicant(Some("SimpleKYC"), &[(Step::Phone, StepState::Na)]);
    let summary = compiler().summarize(&input(applicant, Vec::new()));

    assert_eq!(summary.overall_status, ApplicantStatus::Pending);
    assert!(summary
        .steps
        .iter()
        .filter(|entry| entry.step != Step::Phone)
        .all(|entry| entry.status_label == MISSING_VALUE));
}

#[test]
fn latest_result_per_type_wins_and_missing_types_are_omitted() {
    let applicant = applicant(Some("BASIC_IDV"), &[]);
    let older = result("selfie", "failed", 2, json!({ "liveness": "failed" }));
    let results = vec![selfie_result(), older, result("mystery", "passed", 12, json!({}))];
    let summary = compiler().summarize(&input(applicant, results));

    assert_eq!(summary.findings.len(), 1);
    let selfie = &summary.findings[0];
    assert_eq!(selfie.title, "Selfie & Liveness");
    assert_eq!(row_value(selfie, "Status"), "PASS");
    assert_eq!(row_value(selfie, "Liveness"), "PASS");
    assert_eq!(row_value(selfie, "Face Match"), "Match");
    assert_eq!(row_value(selfie, "Similarity"), "91.5%");
    assert_eq!(row_value(selfie, "Liveness Score"), "98.2%");
}

#[test]
fn absent_percentages_render_placeholder_not_zero() {
    let applicant = applicant(Some("BASIC_IDV"), &[]);
    let results = vec![result("selfie", "pending", 11, json!({ "faceMatch": {} }))];
    let summary = compiler().summarize(&input(applicant, results));

    let selfie = &summary.findings[0];
    assert_eq!(row_value(selfie, "Similarity"), MISSING_VALUE);
    assert_eq!(row_value(selfie, "Liveness Score"), MISSING_VALUE);
}

#[test]
fn compile_produces_loadable_pdf_with_safe_filename() {
    let applicant = applicant(
        Some("BASIC_IDV"),
        &[
            (Step::IdDocument, StepState::Passed),
            (Step::Selfie, StepState::Passed),
        ],
    );
    let report = compiler()
        .compile(&input(applicant, vec![document_result(), selfie_result()]))
        .expect("report compiles");

    assert_eq!(report.filename, "verification-report-Jane-Q-Doe.pdf");
    assert_eq!(report.overall_status, ApplicantStatus::Approved);
    assert!(report.bytes.starts_with(b"%PDF-1.5"));

    let document = lopdf::Document::load_mem(&report.bytes).expect("pdf parses");
    assert_eq!(document.get_pages().len(), report.page_count);
}

#[test]
fn footer_attribution_and_header_date_are_drawn() {
    let compiler = compiler();
    let summary = compiler.summarize(&input(applicant(None, &[]), Vec::new()));

    let layout = compiler.layout(&summary, "Acme Bank");
    assert!(layout.texts().any(|text| text == "Prepared for Acme Bank"));
    assert!(layout.texts().any(|text| text == "Generated 14 Mar 2025"));
}

#[test]
fn filenames_collapse_separators() {
    assert_eq!(
        report_filename("  Zoë  O'Brien / 株式会社 "),
        "verification-report-Zo-O-Brien.pdf"
    );
    assert_eq!(report_filename("---"), "verification-report-applicant.pdf");
    assert_eq!(report_filename("app-42"), "verification-report-app-42.pdf");
}
