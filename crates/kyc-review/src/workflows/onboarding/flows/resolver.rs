use super::{FlowCatalog, FlowDefinition};
use crate::workflows::onboarding::domain::{PiiField, Step};
use serde::Serialize;
use std::sync::Arc;

/// Rendered instead of a field the applicant's flow never collects.
pub const FLOW_PLACEHOLDER: &str = "Not collected (flow)";

/// Rendered when a field is collectable but has no backing data.
pub const MISSING_VALUE: &str = "\u{2014}";

/// Per-field visibility for one flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldVisibility {
    pub phone: bool,
    pub email: bool,
    pub address: bool,
    pub id_doc: bool,
    pub selfie: bool,
}

impl FieldVisibility {
    pub fn get(&self, field: PiiField) -> bool {
        match field {
            PiiField::Phone => self.phone,
            PiiField::Email => self.email,
            PiiField::Address => self.address,
            PiiField::IdDoc => self.id_doc,
            PiiField::Selfie => self.selfie,
        }
    }
}

/// Answers which steps a flow requires and which PII fields it may show.
///
/// Every flow name, including unknown and empty ones, resolves: unknown names
/// fall back to the default flow.
#[derive(Debug, Clone)]
pub struct FlowRequirementResolver {
    catalog: Arc<FlowCatalog>,
}

impl FlowRequirementResolver {
    pub fn new(catalog: Arc<FlowCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &FlowCatalog {
        &self.catalog
    }

    pub fn definition(&self, flow_name: Option<&str>) -> &FlowDefinition {
        match flow_name {
            Some(name) => self.catalog.resolve(name),
            None => self.catalog.default_flow(),
        }
    }

    pub fn required_steps(&self, flow_name: &str) -> &[Step] {
        &self.catalog.resolve(flow_name).required_steps
    }

    /// Same as [`Self::required_steps`] for applicants without a flow name.
    pub fn required_steps_for(&self, flow_name: Option<&str>) -> &[Step] {
        &self.definition(flow_name).required_steps
    }

    pub fn is_visible(&self, flow_name: &str, field: PiiField) -> bool {
        self.required_steps(flow_name).contains(&field.step())
    }

    pub fn is_visible_for(&self, flow_name: Option<&str>, field: PiiField) -> bool {
        self.required_steps_for(flow_name).contains(&field.step())
    }

    pub fn placeholder_for(&self, _field: PiiField) -> &'static str {
        FLOW_PLACEHOLDER
    }

    pub fn field_visibility(&self, flow_name: Option<&str>) -> FieldVisibility {
        let steps = self.required_steps_for(flow_name);
        let visible = |field: PiiField| steps.contains(&field.step());
        FieldVisibility {
            phone: visible(PiiField::Phone),
            email: visible(PiiField::Email),
            address: visible(PiiField::Address),
            id_doc: visible(PiiField::IdDoc),
            selfie: visible(PiiField::Selfie),
        }
    }

    /// Text to display for a gated field: the flow placeholder when the flow
    /// does not collect it, the missing-data dash when it is empty.
    pub fn display_value(
        &self,
        flow_name: Option<&str>,
        field: PiiField,
        value: Option<&str>,
    ) -> String {
        if !self.is_visible_for(flow_name, field) {
            return self.placeholder_for(field).to_string();
        }

        value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(MISSING_VALUE)
            .to_string()
    }
}

impl Default for FlowRequirementResolver {
    fn default() -> Self {
        Self::new(Arc::new(FlowCatalog::standard()))
    }
}
