//! Applicant onboarding review: flow requirements, status rules and the
//! verification report.

pub mod domain;
pub mod flows;
pub mod report;
pub mod router;
pub mod status;

pub use domain::{
    Applicant, ApplicantId, ApplicantStatus, PiiField, RequiredVerification, Step, StepState,
    VerificationResult, VerificationType,
};
pub use flows::{
    FieldVisibility, FlowCatalog, FlowCatalogError, FlowDefinition, FlowRequirementResolver,
    DEFAULT_FLOW, FLOW_PLACEHOLDER, MISSING_VALUE,
};
pub use report::{
    report_filename, CompiledReport, LogoAsset, ReportCompiler, ReportError, ReportInput,
    ReportSettings, ReportSummary,
};
pub use router::onboarding_router;
pub use status::{derive_overall_status, normalize_label, RawStatus, StatusTone};
