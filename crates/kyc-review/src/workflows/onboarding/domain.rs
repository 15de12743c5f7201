use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One identity-verification check an onboarding flow can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    Phone,
    Email,
    IdDocument,
    Selfie,
    #[serde(alias = "poa")]
    ProofOfAddress,
}

impl Step {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Phone,
            Self::Email,
            Self::IdDocument,
            Self::Selfie,
            Self::ProofOfAddress,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
            Self::IdDocument => "idDocument",
            Self::Selfie => "selfie",
            Self::ProofOfAddress => "proofOfAddress",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Phone => "Phone Verification",
            Self::Email => "Email Verification",
            Self::IdDocument => "Identity Document",
            Self::Selfie => "Selfie & Liveness",
            Self::ProofOfAddress => "Proof of Address",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "phone" => Ok(Self::Phone),
            "email" => Ok(Self::Email),
            "iddocument" | "iddoc" => Ok(Self::IdDocument),
            "selfie" => Ok(Self::Selfie),
            "proofofaddress" | "poa" => Ok(Self::ProofOfAddress),
            _ => Err(value.trim().to_string()),
        }
    }
}

/// Completion state of one step for one applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Na,
    #[default]
    Pending,
    Passed,
    Failed,
}

impl StepState {
    pub const fn as_status(self) -> &'static str {
        match self {
            Self::Na => "na",
            Self::Pending => "pending",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

/// Applicant-level decision shown on dashboards and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicantStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    NeedsReview,
}

impl ApplicantStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::NeedsReview => "NEEDS_REVIEW",
        }
    }
}

/// PII or evidence field whose display depends on the applicant's flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PiiField {
    Phone,
    Email,
    Address,
    IdDoc,
    Selfie,
}

impl PiiField {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Phone,
            Self::Email,
            Self::Address,
            Self::IdDoc,
            Self::Selfie,
        ]
    }

    /// Step whose presence in a flow makes this field collectable.
    ///
    /// Address is gated by proof of address, not by a dedicated address step.
    pub const fn step(self) -> Step {
        match self {
            Self::Phone => Step::Phone,
            Self::Email => Step::Email,
            Self::Address => Step::ProofOfAddress,
            Self::IdDoc => Step::IdDocument,
            Self::Selfie => Step::Selfie,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status entry reported by the backend for a flow requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredVerification {
    pub verification_type: String,
    pub status: String,
}

/// Verification subject as returned by the applicant resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub id: ApplicantId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Decision stored upstream. Reports derive their own status instead.
    #[serde(default)]
    pub status: ApplicantStatus,
    #[serde(default)]
    pub flow_name: Option<String>,
    #[serde(default)]
    pub steps: BTreeMap<Step, StepState>,
    #[serde(default)]
    pub required_verifications: Vec<RequiredVerification>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl Applicant {
    /// Name used on the cover page and in the report filename.
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.id.0.clone())
    }

    pub fn identity_value(&self, field: PiiField) -> Option<&str> {
        let value = match field {
            PiiField::Phone => self.phone.as_deref(),
            PiiField::Email => self.email.as_deref(),
            PiiField::Address => self.address.as_deref(),
            PiiField::IdDoc | PiiField::Selfie => None,
        };
        value.map(str::trim).filter(|value| !value.is_empty())
    }

    /// Raw status for a required step, preferring the backend's
    /// `requiredVerifications` entry over the per-step state map.
    pub fn step_status(&self, step: Step) -> Option<String> {
        self.required_verifications
            .iter()
            .find(|entry| entry.verification_type.parse::<Step>().ok() == Some(step))
            .map(|entry| entry.status.clone())
            .or_else(|| {
                self.steps
                    .get(&step)
                    .map(|state| state.as_status().to_string())
            })
    }

    /// Statuses feeding the overall decision for the given required steps.
    /// A required step with no recorded state counts as pending.
    pub fn tracked_statuses(&self, required: &[Step]) -> Vec<String> {
        if !self.required_verifications.is_empty() {
            return self
                .required_verifications
                .iter()
                .map(|entry| entry.status.clone())
                .collect();
        }

        required
            .iter()
            .map(|step| self.steps.get(step).copied().unwrap_or_default())
            .filter(|state| *state != StepState::Na)
            .map(|state| state.as_status().to_string())
            .collect()
    }
}

/// Known verification check kinds that produce a report section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationType {
    IdDocument,
    Selfie,
    Phone,
    Email,
    ProofOfAddress,
    SanctionsCheck,
    RiskEvaluation,
}

impl VerificationType {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::IdDocument,
            Self::Selfie,
            Self::Phone,
            Self::Email,
            Self::ProofOfAddress,
            Self::SanctionsCheck,
            Self::RiskEvaluation,
        ]
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::IdDocument => "Identity Document",
            Self::Selfie => "Selfie & Liveness",
            Self::Phone => "Phone Verification",
            Self::Email => "Email Verification",
            Self::ProofOfAddress => "Proof of Address",
            Self::SanctionsCheck => "Sanctions & AML Screening",
            Self::RiskEvaluation => "Risk Evaluation",
        }
    }

    /// Accepts the spellings used by the verification-results resource.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "iddocument" | "iddoc" | "document" => Some(Self::IdDocument),
            "selfie" | "liveness" => Some(Self::Selfie),
            "phone" => Some(Self::Phone),
            "email" => Some(Self::Email),
            "proofofaddress" | "poa" => Some(Self::ProofOfAddress),
            "sanctionscheck" | "sanctions" | "aml" | "amlscreening" => {
                Some(Self::SanctionsCheck)
            }
            "riskevaluation" | "risk" | "riskassessment" => Some(Self::RiskEvaluation),
            _ => None,
        }
    }
}

/// Persisted outcome of one verification check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verification_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub processed_data: Value,
    #[serde(default)]
    pub raw_response: Value,
    pub created_at: DateTime<Utc>,
}

impl VerificationResult {
    pub fn kind(&self) -> Option<VerificationType> {
        VerificationType::parse(&self.verification_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn step_parsing_accepts_poa_alias_and_camel_case() {
        assert_eq!("proofOfAddress".parse::<Step>(), Ok(Step::ProofOfAddress));
        assert_eq!(" poa ".parse::<Step>(), Ok(Step::ProofOfAddress));
        assert_eq!("id_document".parse::<Step>(), Ok(Step::IdDocument));
        assert_eq!("passport".parse::<Step>(), Err("passport".to_string()));
    }

    #[test]
    fn applicant_deserializes_backend_shape() {
        let applicant: Applicant = serde_json::from_value(json!({
            "id": "app-17",
            "fullName": "Ada Lovelace",
            "address": "12 St James's Square",
            "status": "NEEDS_REVIEW",
            "flowName": "SimpleKYC",
            "steps": { "phone": "passed", "poa": "na", "selfie": "pending" },
            "createdAt": "2025-03-04T10:00:00Z"
        }))
        .expect("applicant json parses");

        assert_eq!(applicant.status, ApplicantStatus::NeedsReview);
        assert_eq!(
            applicant.steps.get(&Step::ProofOfAddress),
            Some(&StepState::Na)
        );
        assert_eq!(applicant.display_name(), "Ada Lovelace");
        assert_eq!(
            applicant.identity_value(PiiField::Address),
            Some("12 St James's Square")
        );
        assert_eq!(applicant.identity_value(PiiField::Email), None);
    }

    #[test]
    fn tracked_statuses_skip_not_applicable_and_unrequired_steps() {
        let mut applicant: Applicant = serde_json::from_value(json!({
            "id": "app-3",
            "createdAt": "2025-03-04T10:00:00Z"
        }))
        .expect("minimal applicant parses");
        applicant.steps.insert(Step::Phone, StepState::Na);
        applicant.steps.insert(Step::IdDocument, StepState::Passed);
        applicant.steps.insert(Step::Email, StepState::Failed);

        let tracked = applicant.tracked_statuses(&[Step::Phone, Step::IdDocument]);
        assert_eq!(tracked, vec!["passed".to_string()]);
        assert_eq!(applicant.display_name(), "app-3");
    }

    #[test]
    fn unrecorded_required_steps_count_as_pending() {
        let mut applicant: Applicant = serde_json::from_value(json!({
            "id": "app-4",
            "createdAt": "2025-03-04T10:00:00Z"
        }))
        .expect("minimal applicant parses");
        applicant.steps.insert(Step::Phone, StepState::Passed);

        let tracked = applicant.tracked_statuses(&[Step::Phone, Step::Email, Step::Selfie]);
        assert_eq!(tracked, vec!["passed", "pending", "pending"]);
    }

    #[test]
    fn verification_type_parse_covers_aml_spellings() {
        assert_eq!(
            VerificationType::parse("sanctionsCheck"),
            Some(VerificationType::SanctionsCheck)
        );
        assert_eq!(
            VerificationType::parse("AML"),
            Some(VerificationType::SanctionsCheck)
        );
        assert_eq!(
            VerificationType::parse("risk_evaluation"),
            Some(VerificationType::RiskEvaluation)
        );
        assert_eq!(VerificationType::parse("credit"), None);
    }
}
