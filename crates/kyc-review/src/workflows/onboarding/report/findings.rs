use crate::workflows::onboarding::domain::{
    Applicant, PiiField, VerificationResult, VerificationType,
};
use crate::workflows::onboarding::flows::{FlowRequirementResolver, MISSING_VALUE};
use crate::workflows::onboarding::status::{RawStatus, StatusTone};
use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindingRow {
    pub label: &'static str,
    pub value: String,
    pub tone: StatusTone,
}

impl FindingRow {
    pub(crate) fn new(label: &'static str, value: String) -> Self {
        let tone = StatusTone::of(&value);
        Self { label, value, tone }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_type: Option<VerificationType>,
    pub title: &'static str,
    pub rows: Vec<FindingRow>,
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Text,
    Status,
    Percent,
    Date,
    Flag {
        yes: &'static str,
        no: &'static str,
    },
}

struct FieldSpec {
    label: &'static str,
    paths: &'static [&'static str],
    format: Format,
    gate: Option<PiiField>,
}

const fn field(label: &'static str, paths: &'static [&'static str], format: Format) -> FieldSpec {
    FieldSpec {
        label,
        paths,
        format,
        gate: None,
    }
}

const fn gated(label: &'static str, paths: &'static [&'static str], gate: PiiField) -> FieldSpec {
    FieldSpec {
        label,
        paths,
        format: Format::Text,
        gate: Some(gate),
    }
}

const MATCH_FLAG: Format = Format::Flag {
    yes: "Match",
    no: "Failed",
};
const SCREENING_FLAG: Format = Format::Flag {
    yes: "Review",
    no: "Clear",
};

const ID_DOCUMENT_FIELDS: &[FieldSpec] = &[
    field(
        "Document Type",
        &["documentType", "document.type", "docType"],
        Format::Text,
    ),
    field(
        "Document Number",
        &["documentNumber", "document.number"],
        Format::Text,
    ),
    field(
        "Full Name",
        &["fullName", "name", "extractedData.fullName"],
        Format::Text,
    ),
    field("Date of Birth", &["dateOfBirth", "dob"], Format::Date),
    field("Nationality", &["nationality"], Format::Text),
    field(
        "Issuing Country",
        &["issuingCountry", "document.country"],
        Format::Text,
    ),
    field(
        "Expiry Date",
        &["expiryDate", "document.expiryDate"],
        Format::Date,
    ),
    field(
        "Document Validity",
        &["validity", "documentStatus"],
        Format::Status,
    ),
    gated(
        "Address",
        &["address", "extractedData.address"],
        PiiField::Address,
    ),
];

const SELFIE_FIELDS: &[FieldSpec] = &[
    field(
        "Liveness",
        &["liveness.result", "livenessResult", "liveness"],
        Format::Status,
    ),
    field(
        "Face Match",
        &["faceMatch.result", "faceMatch", "match"],
        MATCH_FLAG,
    ),
    field(
        "Similarity",
        &["faceMatch.score", "similarityScore", "similarity"],
        Format::Percent,
    ),
    field(
        "Liveness Score",
        &["liveness.score", "livenessScore"],
        Format::Percent,
    ),
];

const PHONE_FIELDS: &[FieldSpec] = &[
    gated("Phone Number", &["phoneNumber", "phone"], PiiField::Phone),
    field("Carrier", &["carrier.name", "carrier"], Format::Text),
    field("Line Type", &["lineType", "carrier.type"], Format::Text),
    field("Verified At", &["verifiedAt"], Format::Date),
];

const EMAIL_FIELDS: &[FieldSpec] = &[
    gated("Email Address", &["email", "emailAddress"], PiiField::Email),
    field(
        "Deliverability",
        &["deliverable", "deliverability"],
        Format::Flag {
            yes: "Valid",
            no: "Invalid",
        },
    ),
    field(
        "Disposable Domain",
        &["disposable"],
        Format::Flag {
            yes: "Yes",
            no: "No",
        },
    ),
    field("Verified At", &["verifiedAt"], Format::Date),
];

const PROOF_OF_ADDRESS_FIELDS: &[FieldSpec] = &[
    gated(
        "Address",
        &["address", "extractedAddress"],
        PiiField::Address,
    ),
    field("Document Type", &["documentType"], Format::Text),
    field("Issue Date", &["issueDate", "documentDate"], Format::Date),
    field("Name Match", &["nameMatch"], MATCH_FLAG),
];

const SANCTIONS_FIELDS: &[FieldSpec] = &[
    field(
        "Screening Result",
        &["result", "screeningResult"],
        Format::Status,
    ),
    field(
        "Matches Found",
        &["matchCount", "totalMatches"],
        Format::Text,
    ),
    field(
        "Lists Screened",
        &["lists", "listsScreened", "sources"],
        Format::Text,
    ),
    field("PEP", &["pep", "isPep", "pepMatch"], SCREENING_FLAG),
    field("Adverse Media", &["adverseMedia"], SCREENING_FLAG),
];

const RISK_FIELDS: &[FieldSpec] = &[
    field("Risk Level", &["riskLevel", "level"], Format::Text),
    field("Risk Score", &["riskScore", "score"], Format::Percent),
    field("Risk Factors", &["reasons", "riskFactors"], Format::Text),
];

fn specs_for(kind: VerificationType) -> &'static [FieldSpec] {
    match kind {
        VerificationType::IdDocument => ID_DOCUMENT_FIELDS,
        VerificationType::Selfie => SELFIE_FIELDS,
        VerificationType::Phone => PHONE_FIELDS,
        VerificationType::Email => EMAIL_FIELDS,
        VerificationType::ProofOfAddress => PROOF_OF_ADDRESS_FIELDS,
        VerificationType::SanctionsCheck => SANCTIONS_FIELDS,
        VerificationType::RiskEvaluation => RISK_FIELDS,
    }
}

/// Most recent result per known verification type. Unknown types are skipped.
pub(crate) fn latest_by_type(
    results: &[VerificationResult],
) -> BTreeMap<VerificationType, &VerificationResult> {
    let mut latest: BTreeMap<VerificationType, &VerificationResult> = BTreeMap::new();
    for result in results {
        let Some(kind) = result.kind() else {
            debug!(
                verification_type = %result.verification_type,
                "ignoring unrecognized verification type"
            );
            continue;
        };
        match latest.get(&kind) {
            Some(existing) if existing.created_at > result.created_at => {}
            _ => {
                latest.insert(kind, result);
            }
        }
    }
    latest
}

/// Key findings, one section per present check type in report order.
pub(crate) fn key_findings(
    applicant: &Applicant,
    results: &[VerificationResult],
    resolver: &FlowRequirementResolver,
) -> Vec<FindingSection> {
    let latest = latest_by_type(results);
    let flow = applicant.flow_name.as_deref();

    VerificationType::ordered()
        .into_iter()
        .filter_map(|kind| {
            let Some(result) = latest.get(&kind) else {
                debug!(section = kind.title(), "no result, section omitted");
                return None;
            };

            let mut rows = vec![status_row(&result.status)];
            for spec in specs_for(kind) {
                let raw = lookup_text(result, spec.paths);
                let value = match spec.gate {
                    Some(gate) => resolver.display_value(flow, gate, raw.as_deref()),
                    None => format_value(raw_value(result, spec.paths), spec.format),
                };
                if value == MISSING_VALUE {
                    trace!(section = kind.title(), field = spec.label, "missing data");
                }
                rows.push(FindingRow::new(spec.label, value));
            }

            Some(FindingSection {
                verification_type: Some(kind),
                title: kind.title(),
                rows,
            })
        })
        .collect()
}

fn status_row(raw: &str) -> FindingRow {
    let status = RawStatus::parse(raw);
    let value = if raw.trim().is_empty() {
        MISSING_VALUE.to_string()
    } else {
        status.label()
    };
    FindingRow {
        label: "Status",
        value,
        tone: status.tone(),
    }
}

/// Location/IP details gathered from the applicant and any result payload.
pub(crate) fn location_section(
    applicant: &Applicant,
    results: &[VerificationResult],
) -> Option<FindingSection> {
    let sources: Vec<&Value> = results
        .iter()
        .flat_map(|result| [&result.processed_data, &result.raw_response])
        .collect();
    let first = |paths: &[&str]| -> Option<String> {
        sources
            .iter()
            .find_map(|source| paths.iter().find_map(|path| text_at(source, path)))
    };

    let ip = applicant
        .ip_address
        .as_deref()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| first(&["ipAddress", "geolocation.ip", "location.ip"]));
    let country = first(&["geolocation.country", "location.country"]);
    let city = first(&["geolocation.city", "location.city"]);
    let region = first(&["geolocation.region", "location.region"]);
    let coordinates = sources.iter().find_map(|source| {
        ["geolocation", "location"].iter().find_map(|root| {
            let node = lookup(source, root)?;
            let latitude = node.get("latitude").and_then(Value::as_f64)?;
            let longitude = node.get("longitude").and_then(Value::as_f64)?;
            Some(format!("{latitude:.4}, {longitude:.4}"))
        })
    });

    if ip.is_none()
        && country.is_none()
        && city.is_none()
        && region.is_none()
        && coordinates.is_none()
    {
        return None;
    }

    let or_missing = |value: Option<String>| value.unwrap_or_else(|| MISSING_VALUE.to_string());
    Some(FindingSection {
        verification_type: None,
        title: "Location & IP",
        rows: vec![
            FindingRow::new("IP Address", or_missing(ip)),
            FindingRow::new("Country", or_missing(country)),
            FindingRow::new("City", or_missing(city)),
            FindingRow::new("Region", or_missing(region)),
            FindingRow::new("Coordinates", or_missing(coordinates)),
        ],
    })
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.get(key))
}

fn raw_value<'a>(result: &'a VerificationResult, paths: &[&str]) -> Option<&'a Value> {
    [&result.processed_data, &result.raw_response]
        .into_iter()
        .find_map(|source| {
            paths
                .iter()
                .find_map(|path| lookup(source, path).filter(|value| is_present(value)))
        })
}

fn lookup_text(result: &VerificationResult, paths: &[&str]) -> Option<String> {
    raw_value(result, paths).and_then(scalar_text)
}

fn text_at(source: &Value, path: &str) -> Option<String> {
    lookup(source, path).and_then(scalar_text)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()).filter(|text| !text.is_empty()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(if *flag { "Yes" } else { "No" }.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Null | Value::Object(_) => None,
    }
}

fn format_value(value: Option<&Value>, format: Format) -> String {
    let formatted = value.and_then(|value| match format {
        Format::Text => scalar_text(value),
        Format::Status => scalar_text(value).map(|raw| RawStatus::parse(&raw).label()),
        Format::Percent => percent(value),
        Format::Date => scalar_text(value).map(|raw| date(&raw)),
        Format::Flag { yes, no } => match value {
            Value::Bool(true) => Some(yes.to_string()),
            Value::Bool(false) => Some(no.to_string()),
            other => scalar_text(other),
        },
    });
    formatted.unwrap_or_else(|| MISSING_VALUE.to_string())
}

/// Fractions in `0..=1` are scaled to percent; larger numbers already are.
fn percent(value: &Value) -> Option<String> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }?;
    if !number.is_finite() {
        return None;
    }
    let scaled = if (0.0..=1.0).contains(&number) {
        number * 100.0
    } else {
        number
    };
    Some(format!("{scaled:.1}%"))
}

fn date(raw: &str) -> String {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return timestamp.format("%Y-%m-%d").to_string();
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return day.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(kind: &str, status: &str, processed: Value, at: &str) -> VerificationResult {
        VerificationResult {
            verification_type: kind.to_string(),
            status: status.to_string(),
            processed_data: processed,
            raw_response: Value::Null,
            created_at: at.parse().expect("timestamp"),
        }
    }

    #[test]
    fn latest_result_wins_per_type() {
        let results = vec![
            result("selfie", "failed", json!({}), "2025-01-01T00:00:00Z"),
            result("selfie", "verified", json!({}), "2025-02-01T00:00:00Z"),
            result("selfie", "pending", json!({}), "2025-01-15T00:00:00Z"),
            result("creditCheck", "passed", json!({}), "2025-03-01T00:00:00Z"),
        ];
        let latest = latest_by_type(&results);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[&VerificationType::Selfie].status, "verified");
    }

    #[test]
    fn percent_handles_fractions_strings_and_absence() {
        assert_eq!(percent(&json!(0.873)), Some("87.3%".to_string()));
        assert_eq!(percent(&json!(64)), Some("64.0%".to_string()));
        assert_eq!(percent(&json!("91.5%")), Some("91.5%".to_string()));
        assert_eq!(percent(&json!({"score": 1})), None);
        assert_eq!(format_value(None, Format::Percent), MISSING_VALUE);
    }

    #[test]
    fn malformed_nested_fields_degrade_to_placeholder() {
        let processed = json!({
            "faceMatch": "not-an-object",
            "liveness": { "result": ["unexpected", {"nested": true}] },
            "similarityScore": null
        });
        let results = vec![result("selfie", "passed", processed, "2025-01-01T00:00:00Z")];
        let applicant: Applicant = serde_json::from_value(json!({
            "id": "a-1",
            "createdAt": "2025-01-01T00:00:00Z"
        }))
        .expect("applicant");

        let sections = key_findings(&applicant, &results, &FlowRequirementResolver::default());
        let rows = &sections[0].rows;
        let value = |label: &str| {
            rows.iter()
                .find(|row| row.label == label)
                .map(|row| row.value.clone())
                .expect("row present")
        };
        assert_eq!(value("Status"), "PASS");
        assert_eq!(value("Face Match"), "not-an-object");
        assert_eq!(value("Liveness"), "UNEXPECTED");
        assert_eq!(value("Similarity"), MISSING_VALUE);
        assert_eq!(value("Liveness Score"), MISSING_VALUE);
    }

    #[test]
    fn raw_response_backs_up_processed_data() {
        let mut email = result(
            "email",
            "verified",
            json!({ "deliverable": true }),
            "2025-01-01T00:00:00Z",
        );
        email.raw_response = json!({ "emailAddress": "ada@example.com", "disposable": false });
        let applicant: Applicant = serde_json::from_value(json!({
            "id": "a-1",
            "flowName": "EnhancedKYC",
            "createdAt": "2025-01-01T00:00:00Z"
        }))
        .expect("applicant");

        let sections = key_findings(&applicant, &[email], &FlowRequirementResolver::default());
        let rows = &sections[0].rows;
        assert_eq!(rows[1].value, "ada@example.com");
        assert_eq!(rows[2].value, "Valid");
        assert_eq!(rows[2].tone, StatusTone::Positive);
        assert_eq!(rows[3].value, "No");
    }

    #[test]
    fn location_section_requires_some_geodata() {
        let applicant: Applicant = serde_json::from_value(json!({
            "id": "a-1",
            "createdAt": "2025-01-01T00:00:00Z"
        }))
        .expect("applicant");
        assert!(location_section(&applicant, &[]).is_none());

        let with_geo = result(
            "phone",
            "verified",
            json!({ "geolocation": { "country": "NG", "city": "Lagos", "latitude": 6.5244, "longitude": 3.3792 } }),
            "2025-01-01T00:00:00Z",
        );
        let section = location_section(&applicant, &[with_geo]).expect("location present");
        assert_eq!(section.rows[0].value, MISSING_VALUE);
        assert_eq!(section.rows[1].value, "NG");
        assert_eq!(section.rows[4].value, "6.5244, 3.3792");
    }

    #[test]
    fn region_alone_is_enough_for_a_location_section() {
        let applicant: Applicant = serde_json::from_value(json!({
            "id": "a-2",
            "createdAt": "2025-01-01T00:00:00Z"
        }))
        .expect("applicant");
        let region_only = result(
            "phone",
            "verified",
            json!({ "geolocation": { "region": "IL" } }),
            "2025-01-01T00:00:00Z",
        );

        let section = location_section(&applicant, &[region_only]).expect("location present");
        assert_eq!(section.rows[3].label, "Region");
        assert_eq!(section.rows[3].value, "IL");
        assert_eq!(section.rows[0].value, MISSING_VALUE);
    }
}
