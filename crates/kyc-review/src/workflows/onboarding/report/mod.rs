//! Verification report compiler.
//!
//! A report is built in three passes: the applicant and its results are
//! summarised, the summary is laid out onto pages, and the pages are encoded
//! as a PDF. Nothing here touches the network or keeps state between exports.

mod document;
mod export;
mod findings;
pub mod layout;
mod pdf;
mod summary;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use super::domain::{Applicant, ApplicantStatus, VerificationResult};
use super::flows::FlowRequirementResolver;
use layout::{FooterBand, HeaderBand, OrgMark, PageGeometry, ReportBuilder, ReportLayout};

pub use findings::{FindingRow, FindingSection};
pub use pdf::LogoAsset;
pub use summary::{ReportSummary, StepStatusEntry};

pub const REPORT_TITLE: &str = "Identity Verification Report";
pub const FILENAME_PREFIX: &str = "verification-report";
pub const CONFIDENTIALITY_NOTICE: &str =
    "Confidential. Contains personal data; handle under your data protection obligations.";
pub const DISCLAIMER: &str = "This report summarises the results of automated identity \
verification checks performed on the information and documents supplied by the applicant. \
It reflects the data available at the time of generation and does not constitute legal, \
regulatory or financial advice. Results may be affected by the quality of the submitted \
material and by the coverage of third-party data sources. The recipient remains solely \
responsible for any onboarding decision and for meeting its own KYC and AML obligations. \
This document must not be relied upon as the sole basis for granting or refusing access to \
any product or service.";

const HEADER_DATE_FORMAT: &str = "%d %b %Y";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to encode report: {0}")]
    Encode(String),
    #[error("report io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid logo image: {0}")]
    InvalidLogo(String),
}

/// Request body accepted by the report endpoints and the CLI.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    pub applicant: Applicant,
    #[serde(default)]
    pub verification_results: Vec<VerificationResult>,
    #[serde(default)]
    pub client_name: Option<String>,
}

/// Organisation-level presentation settings shared by every export.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub client_name: String,
    pub logo: Option<LogoAsset>,
    /// Fixed generation date; today when unset.
    pub generated_on: Option<NaiveDate>,
    pub geometry: PageGeometry,
}

impl ReportSettings {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            logo: None,
            generated_on: None,
            geometry: PageGeometry::A4,
        }
    }

    pub fn with_logo(mut self, logo: LogoAsset) -> Self {
        self.logo = Some(logo);
        self
    }

    pub fn with_generated_on(mut self, date: NaiveDate) -> Self {
        self.generated_on = Some(date);
        self
    }
}

#[derive(Debug, Clone)]
pub struct CompiledReport {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub overall_status: ApplicantStatus,
}

pub struct ReportCompiler {
    resolver: FlowRequirementResolver,
    settings: ReportSettings,
}

impl ReportCompiler {
    pub fn new(resolver: FlowRequirementResolver, settings: ReportSettings) -> Self {
        Self { resolver, settings }
    }

    pub fn resolver(&self) -> &FlowRequirementResolver {
        &self.resolver
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn summarize(&self, input: &ReportInput) -> ReportSummary {
        ReportSummary::build(&input.applicant, &input.verification_results, &self.resolver)
    }

    /// Paginates a summary without encoding it.
    pub fn layout(&self, summary: &ReportSummary, client_name: &str) -> ReportLayout {
        let mark = match &self.settings.logo {
            Some(logo) => OrgMark::Logo {
                aspect: logo.aspect(),
            },
            None => OrgMark::Text(client_name.to_string()),
        };
        let generated_on = self
            .settings
            .generated_on
            .unwrap_or_else(|| Utc::now().date_naive());
        let header = HeaderBand {
            mark,
            title: REPORT_TITLE.to_string(),
            generated_on: format!("Generated {}", generated_on.format(HEADER_DATE_FORMAT)),
        };

        let mut builder = ReportBuilder::new(self.settings.geometry, header);
        document::render(summary, &mut builder);

        let footer = FooterBand {
            attribution: format!("Prepared for {client_name}"),
            notice: CONFIDENTIALITY_NOTICE.to_string(),
        };
        builder.finish(&footer)
    }

    pub fn compile(&self, input: &ReportInput) -> Result<CompiledReport, ReportError> {
        let client_name = input
            .client_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.settings.client_name);

        let summary = self.summarize(input);
        let layout = self.layout(&summary, client_name);
        let bytes = pdf::encode(&layout, REPORT_TITLE, self.settings.logo.as_ref())?;
        let filename = report_filename(&summary.subject_name);

        info!(
            applicant_id = %summary.applicant_id,
            flow = %summary.flow_name,
            overall_status = summary.overall_label,
            pages = layout.page_count(),
            bytes = bytes.len(),
            "compiled verification report"
        );

        Ok(CompiledReport {
            filename,
            bytes,
            page_count: layout.page_count(),
            overall_status: summary.overall_status,
        })
    }
}

impl Default for ReportCompiler {
    fn default() -> Self {
        Self::new(
            FlowRequirementResolver::default(),
            ReportSettings::new(crate::config::DEFAULT_CLIENT_NAME),
        )
    }
}

/// Shared handle used by the HTTP router and the CLI.
pub type SharedCompiler = Arc<ReportCompiler>;

/// `verification-report-<slug>.pdf`; the slug keeps ASCII alphanumerics and
/// collapses every other run into one `-`.
pub fn report_filename(display_name: &str) -> String {
    let mut slug = String::with_capacity(display_name.len());
    for ch in display_name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("applicant");
    }
    format!("{FILENAME_PREFIX}-{slug}.pdf")
}
