use super::domain::ApplicantStatus;
use serde::Serialize;

/// Provider status vocabulary understood by the review tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawStatus {
    Verified,
    Approved,
    Passed,
    Match,
    Valid,
    Clear,
    Rejected,
    Failed,
    Expired,
    Invalid,
    Pending,
    Requested,
    Review,
    NeedsReview,
    Unknown(String),
}

impl RawStatus {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "verified" => Self::Verified,
            "approved" => Self::Approved,
            "passed" => Self::Passed,
            "match" => Self::Match,
            "valid" => Self::Valid,
            "clear" => Self::Clear,
            "rejected" => Self::Rejected,
            "failed" => Self::Failed,
            "expired" => Self::Expired,
            "invalid" => Self::Invalid,
            "pending" => Self::Pending,
            "requested" => Self::Requested,
            "review" => Self::Review,
            "needs_review" => Self::NeedsReview,
            _ => Self::Unknown(trimmed.to_string()),
        }
    }

    /// Normalized label printed in step tables.
    pub fn label(&self) -> String {
        match self {
            Self::Verified | Self::Approved => "APPROVED".to_string(),
            Self::Rejected => "REJECTED".to_string(),
            Self::Pending | Self::Requested => "PENDING".to_string(),
            Self::Passed => "PASS".to_string(),
            Self::Failed => "FAIL".to_string(),
            Self::Match => "MATCH".to_string(),
            Self::Valid => "VALID".to_string(),
            Self::Clear => "CLEAR".to_string(),
            Self::Expired => "EXPIRED".to_string(),
            Self::Invalid => "INVALID".to_string(),
            Self::Review => "REVIEW".to_string(),
            Self::NeedsReview => "NEEDS_REVIEW".to_string(),
            Self::Unknown(raw) => raw.to_uppercase(),
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            Self::Verified
            | Self::Approved
            | Self::Passed
            | Self::Match
            | Self::Valid
            | Self::Clear => StatusTone::Positive,
            Self::Rejected | Self::Failed | Self::Expired | Self::Invalid => StatusTone::Negative,
            Self::Pending | Self::Review | Self::NeedsReview => StatusTone::InProgress,
            Self::Requested | Self::Unknown(_) => StatusTone::Neutral,
        }
    }

    fn outcome(&self) -> Outcome {
        match self {
            Self::Verified | Self::Approved | Self::Passed => Outcome::Verified,
            Self::Rejected | Self::Failed => Outcome::Rejected,
            Self::Pending | Self::Requested => Outcome::Pending,
            _ => Outcome::Other,
        }
    }
}

/// Display colour family for a status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Positive,
    Negative,
    InProgress,
    Neutral,
}

impl StatusTone {
    pub fn of(raw: &str) -> Self {
        RawStatus::parse(raw).tone()
    }

    pub const fn for_applicant(status: ApplicantStatus) -> Self {
        match status {
            ApplicantStatus::Approved => Self::Positive,
            ApplicantStatus::Rejected => Self::Negative,
            ApplicantStatus::NeedsReview => Self::InProgress,
            ApplicantStatus::Pending => Self::Neutral,
        }
    }
}

pub fn normalize_label(raw: &str) -> String {
    RawStatus::parse(raw).label()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Verified,
    Rejected,
    Pending,
    Other,
}

/// Overall applicant decision derived from its constituent verification
/// statuses. Rules apply in order: all verified, any rejection, verified mixed
/// with pending, otherwise pending. An empty set is pending.
pub fn derive_overall_status<I, S>(statuses: I) -> ApplicantStatus
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let outcomes: Vec<Outcome> = statuses
        .into_iter()
        .map(|status| RawStatus::parse(status.as_ref()).outcome())
        .collect();

    if outcomes.is_empty() {
        return ApplicantStatus::Pending;
    }

    if outcomes.iter().all(|outcome| *outcome == Outcome::Verified) {
        return ApplicantStatus::Approved;
    }

    if outcomes.contains(&Outcome::Rejected) {
        return ApplicantStatus::Rejected;
    }

    if outcomes.contains(&Outcome::Verified) && outcomes.contains(&Outcome::Pending) {
        return ApplicantStatus::NeedsReview;
    }

    ApplicantStatus::Pending
}
