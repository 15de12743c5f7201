use chrono::NaiveDate;
use kyc_review::config::ReportConfig;
use kyc_review::error::AppError;
use kyc_review::workflows::onboarding::{
    FlowCatalog, FlowRequirementResolver, LogoAsset, ReportCompiler, ReportInput, ReportSettings,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Flow catalog from `FLOW_CATALOG_PATH`, or the built-in table.
pub(crate) fn load_catalog(config: &ReportConfig) -> Result<FlowCatalog, AppError> {
    match &config.flow_catalog_path {
        Some(path) => {
            let catalog = FlowCatalog::from_path(path)?;
            info!(path = %path.display(), flows = catalog.len(), "flow catalog loaded");
            Ok(catalog)
        }
        None => Ok(FlowCatalog::standard()),
    }
}

/// A logo that cannot be read falls back to the text organisation mark.
pub(crate) fn load_logo(config: &ReportConfig) -> Option<LogoAsset> {
    let path = config.logo_path.as_ref()?;
    match LogoAsset::from_path(path) {
        Ok(logo) => {
            info!(
                path = %path.display(),
                width = logo.width(),
                height = logo.height(),
                "report logo loaded"
            );
            Some(logo)
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "report logo unusable, using text mark");
            None
        }
    }
}

pub(crate) fn build_compiler(
    config: &ReportConfig,
    generated_on: Option<NaiveDate>,
) -> Result<ReportCompiler, AppError> {
    let resolver = FlowRequirementResolver::new(Arc::new(load_catalog(config)?));
    let mut settings = ReportSettings::new(config.client_name.clone());
    if let Some(logo) = load_logo(config) {
        settings = settings.with_logo(logo);
    }
    if let Some(date) = generated_on {
        settings = settings.with_generated_on(date);
    }
    Ok(ReportCompiler::new(resolver, settings))
}

pub(crate) fn read_report_input(path: &Path) -> Result<ReportInput, AppError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
