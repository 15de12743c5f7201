use crate::infra::{build_compiler, read_report_input};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use clap::Args;
use kyc_review::config::AppConfig;
use kyc_review::error::AppError;
use kyc_review::workflows::onboarding::{
    Applicant, ApplicantId, ApplicantStatus, FlowCatalog, FlowRequirementResolver, ReportCompiler,
    ReportInput, Step, StepState, VerificationResult,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// JSON file holding `{ applicant, verificationResults, clientName? }`
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Directory the PDF is written to
    #[arg(long)]
    pub(crate) out_dir: PathBuf,
    /// Organisation name for the footer (overrides REPORT_CLIENT_NAME)
    #[arg(long)]
    pub(crate) client_name: Option<String>,
    /// Generation date printed in the header (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) generated_on: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Directory the demo PDF is written to
    #[arg(long, default_value = "reports")]
    pub(crate) out_dir: PathBuf,
    /// Onboarding flow of the synthetic applicant
    #[arg(long, default_value = "EnhancedKYC")]
    pub(crate) flow: String,
    /// Generation date printed in the header (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) generated_on: Option<NaiveDate>,
}

pub(crate) fn run_report_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        input,
        out_dir,
        client_name,
        generated_on,
    } = args;

    let config = AppConfig::load()?;
    let compiler = build_compiler(&config.report, generated_on)?;
    let mut report_input = read_report_input(&input)?;
    if client_name.is_some() {
        report_input.client_name = client_name;
    }

    export(&compiler, &report_input, out_dir)
}

pub(crate) fn run_flows_list() -> Result<(), AppError> {
    let resolver = load_resolver()?;
    println!("Onboarding flows ({})", resolver.catalog().len());
    for definition in resolver.catalog().definitions() {
        let steps: Vec<&str> = definition
            .required_steps
            .iter()
            .map(|step| step.key())
            .collect();
        println!("- {}: {}", definition.name, steps.join(", "));
    }
    Ok(())
}

pub(crate) fn run_flows_show(name: &str) -> Result<(), AppError> {
    let resolver = load_resolver()?;
    let definition = resolver.definition(Some(name));
    let fallback = resolver.catalog().get(name).is_none();

    if fallback {
        println!("Flow '{}' is not in the catalog; resolved to '{}'", name, definition.name);
    } else {
        println!("Flow '{}'", definition.name);
    }
    println!("Required steps:");
    for step in &definition.required_steps {
        println!("  - {} ({})", step.label(), step.key());
    }

    let visibility = resolver.field_visibility(Some(name));
    let shown = |visible: bool| if visible { "shown" } else { "not collected" };
    println!("Field visibility:");
    println!("  - phone: {}", shown(visibility.phone));
    println!("  - email: {}", shown(visibility.email));
    println!("  - address: {}", shown(visibility.address));
    println!("  - id document: {}", shown(visibility.id_doc));
    println!("  - selfie: {}", shown(visibility.selfie));
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        out_dir,
        flow,
        generated_on,
    } = args;

    let config = AppConfig::load()?;
    let compiler = build_compiler(&config.report, generated_on)?;
    let input = demo_input(&flow);

    println!("Verification report demo (synthetic applicant)");
    let summary = compiler.summarize(&input);
    println!(
        "- Applicant {} on flow '{}' -> overall {}",
        summary.applicant_id, summary.flow_name, summary.overall_label
    );
    for entry in &summary.steps {
        println!("  - {}: {}", entry.step_label, entry.status_label);
    }
    for row in &summary.identity {
        println!("  {}: {}", row.label, row.value);
    }
    println!("- {} key finding sections", summary.findings.len());

    export(&compiler, &input, out_dir)
}

fn export(compiler: &ReportCompiler, input: &ReportInput, out_dir: PathBuf) -> Result<(), AppError> {
    let report = compiler.compile(input)?;
    let path = report.save_to_dir(&out_dir)?;
    println!(
        "Saved {} ({} pages, {} bytes, overall {})",
        path.display(),
        report.page_count,
        report.bytes.len(),
        report.overall_status.label()
    );
    Ok(())
}

fn load_resolver() -> Result<FlowRequirementResolver, AppError> {
    let config = AppConfig::load()?;
    let catalog: FlowCatalog = crate::infra::load_catalog(&config.report)?;
    Ok(FlowRequirementResolver::new(Arc::new(catalog)))
}

pub(crate) fn demo_input(flow: &str) -> ReportInput {
    let created_at = Utc
        .with_ymd_and_hms(2025, 5, 28, 14, 20, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let checked_at = created_at + Duration::minutes(12);

    let applicant = Applicant {
        id: ApplicantId("demo-applicant-001".to_string()),
        full_name: Some("Alex Example".to_string()),
        email: Some("alex@example.org".to_string()),
        phone: Some("+1 555 0100".to_string()),
        address: Some("100 Sample Avenue, Springfield".to_string()),
        status: ApplicantStatus::Pending,
        flow_name: Some(flow.to_string()),
        steps: [
            (Step::Phone, StepState::Passed),
            (Step::Email, StepState::Passed),
            (Step::IdDocument, StepState::Passed),
            (Step::Selfie, StepState::Passed),
            (Step::ProofOfAddress, StepState::Pending),
        ]
        .into_iter()
        .collect(),
        required_verifications: Vec::new(),
        created_at,
        ip_address: Some("198.51.100.7".to_string()),
    };

    let result = |kind: &str, status: &str, processed: serde_json::Value| VerificationResult {
        verification_type: kind.to_string(),
        status: status.to_string(),
        processed_data: processed,
        raw_response: serde_json::Value::Null,
        created_at: checked_at,
    };

    ReportInput {
        applicant,
        verification_results: vec![
            result(
                "idDocument",
                "verified",
                json!({
                    "documentType": "passport",
                    "documentNumber": "P0000000",
                    "fullName": "Alex Example",
                    "dateOfBirth": "1990-01-01",
                    "issuingCountry": "US",
                    "expiryDate": "2031-09-30",
                    "validity": "valid",
                    "address": "100 Sample Avenue, Springfield",
                }),
            ),
            result(
                "selfie",
                "passed",
                json!({
                    "liveness": { "result": "passed", "score": 0.97 },
                    "faceMatch": { "result": true, "score": 0.93 },
                }),
            ),
            result(
                "phone",
                "verified",
                json!({ "phoneNumber": "+1 555 0100", "carrier": { "name": "Example Mobile", "type": "mobile" } }),
            ),
            result(
                "email",
                "verified",
                json!({ "email": "alex@example.org", "deliverable": true, "disposable": false }),
            ),
            result(
                "proofOfAddress",
                "pending",
                json!({ "documentType": "utility_bill" }),
            ),
            result(
                "aml",
                "clear",
                json!({ "result": "clear", "matchCount": 0, "lists": ["OFAC", "UN", "EU"], "pep": false, "adverseMedia": false }),
            ),
            result(
                "riskEvaluation",
                "approved",
                json!({
                    "riskLevel": "low",
                    "riskScore": 0.12,
                    "geolocation": { "country": "US", "city": "Springfield", "region": "IL", "latitude": 39.7817, "longitude": -89.6501 },
                }),
            ),
        ],
        client_name: None,
    }
}
