mod parser;
mod resolver;

pub use resolver::{FieldVisibility, FlowRequirementResolver, FLOW_PLACEHOLDER, MISSING_VALUE};

use super::domain::Step;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Name of the flow every unknown or absent flow name resolves to.
pub const DEFAULT_FLOW: &str = "Default";

#[derive(Debug)]
pub enum FlowCatalogError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownStep { flow: String, step: String },
    EmptyFlow { flow: String },
}

impl std::fmt::Display for FlowCatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowCatalogError::Io(err) => write!(f, "failed to read flow catalog: {}", err),
            FlowCatalogError::Csv(err) => write!(f, "invalid flow catalog CSV: {}", err),
            FlowCatalogError::UnknownStep { flow, step } => {
                write!(f, "flow '{}' lists unknown step '{}'", flow, step)
            }
            FlowCatalogError::EmptyFlow { flow } => {
                write!(f, "flow '{}' does not require any step", flow)
            }
        }
    }
}

impl std::error::Error for FlowCatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlowCatalogError::Io(err) => Some(err),
            FlowCatalogError::Csv(err) => Some(err),
            FlowCatalogError::UnknownStep { .. } | FlowCatalogError::EmptyFlow { .. } => None,
        }
    }
}

impl From<std::io::Error> for FlowCatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for FlowCatalogError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Named onboarding flow and the ordered steps it requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDefinition {
    pub name: String,
    pub required_steps: Vec<Step>,
}

impl FlowDefinition {
    /// Build a definition, dropping repeated steps while keeping first-seen order.
    pub fn new(name: impl Into<String>, steps: impl IntoIterator<Item = Step>) -> Self {
        let mut required_steps: Vec<Step> = Vec::new();
        for step in steps {
            if !required_steps.contains(&step) {
                required_steps.push(step);
            }
        }

        Self {
            name: name.into(),
            required_steps,
        }
    }

    pub fn requires(&self, step: Step) -> bool {
        self.required_steps.contains(&step)
    }
}

/// The single flow -> steps table shared by every consumer.
#[derive(Debug, Clone)]
pub struct FlowCatalog {
    flows: BTreeMap<String, FlowDefinition>,
}

impl FlowCatalog {
    pub fn standard() -> Self {
        use Step::{Email, IdDocument, Phone, ProofOfAddress, Selfie};

        let mut catalog = Self {
            flows: BTreeMap::new(),
        };
        for definition in [
            FlowDefinition::new(
                DEFAULT_FLOW,
                [Phone, Email, IdDocument, Selfie, ProofOfAddress],
            ),
            FlowDefinition::new("SimpleKYC", [Phone, Email, IdDocument, Selfie]),
            FlowDefinition::new(
                "EnhancedKYC",
                [Phone, Email, IdDocument, Selfie, ProofOfAddress],
            ),
            FlowDefinition::new(
                "PoA Required",
                [Phone, Email, IdDocument, Selfie, ProofOfAddress],
            ),
            FlowDefinition::new("BASIC_IDV", [IdDocument, Selfie]),
            FlowDefinition::new("SIM_REGISTRATION", [Phone, IdDocument, Selfie]),
        ] {
            catalog.insert(definition);
        }
        catalog
    }

    /// Standard catalog extended (or overridden) by a CSV file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FlowCatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FlowCatalogError> {
        let mut catalog = Self::standard();
        catalog.extend_from_reader(reader)?;
        Ok(catalog)
    }

    pub fn extend_from_reader<R: Read>(&mut self, reader: R) -> Result<(), FlowCatalogError> {
        for row in parser::parse_rows(reader)? {
            let mut steps = Vec::with_capacity(row.steps.len());
            for raw in &row.steps {
                let step = raw
                    .parse::<Step>()
                    .map_err(|step| FlowCatalogError::UnknownStep {
                        flow: row.name.clone(),
                        step,
                    })?;
                steps.push(step);
            }

            if steps.is_empty() {
                return Err(FlowCatalogError::EmptyFlow { flow: row.name });
            }

            debug!(flow = %row.name, steps = steps.len(), "flow catalog entry loaded");
            self.insert(FlowDefinition::new(row.name, steps));
        }

        Ok(())
    }

    /// Adds or replaces a flow. Definitions without steps are ignored so the
    /// default flow always keeps a non-empty step set.
    pub fn insert(&mut self, definition: FlowDefinition) {
        if definition.required_steps.is_empty() {
            return;
        }
        self.flows.insert(definition.name.clone(), definition);
    }

    /// Exact lookup; names are case and whitespace sensitive.
    pub fn get(&self, name: &str) -> Option<&FlowDefinition> {
        self.flows.get(name)
    }

    /// Definition for `name`, or the default flow when the name is unknown.
    pub fn resolve(&self, name: &str) -> &FlowDefinition {
        match self.get(name) {
            Some(definition) => definition,
            None => {
                debug!(flow = name, "unknown flow, falling back to default");
                self.default_flow()
            }
        }
    }

    pub fn default_flow(&self) -> &FlowDefinition {
        match self.flows.get(DEFAULT_FLOW) {
            Some(definition) => definition,
            None => standard_default(),
        }
    }

    pub fn definitions(&self) -> impl Iterator<Item = &FlowDefinition> {
        self.flows.values()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

impl Default for FlowCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_default() -> &'static FlowDefinition {
    static DEFAULT: std::sync::OnceLock<FlowDefinition> = std::sync::OnceLock::new();
    DEFAULT.get_or_init(|| FlowDefinition::new(DEFAULT_FLOW, Step::ordered()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn standard_catalog_matches_known_flows() {
        let catalog = FlowCatalog::standard();
        assert_eq!(catalog.len(), 6);
        assert_eq!(
            catalog.resolve("SIM_REGISTRATION").required_steps,
            vec![Step::Phone, Step::IdDocument, Step::Selfie]
        );
        assert_eq!(
            catalog.resolve("PoA Required").required_steps,
            Step::ordered().to_vec()
        );
        assert_eq!(catalog.resolve("nope").name, DEFAULT_FLOW);
    }

    #[test]
    fn lookups_match_names_exactly() {
        let catalog = FlowCatalog::standard();
        assert!(catalog.get("SimpleKYC").is_some());
        assert!(catalog.get(" SimpleKYC ").is_none());
        assert!(catalog.get("simplekyc").is_none());
        assert_eq!(catalog.resolve(" SimpleKYC ").name, DEFAULT_FLOW);
    }

    #[test]
    fn csv_overrides_and_extends_the_standard_table() {
        let csv = "Flow name,Required steps\n\
KYB Lite,\"email, idDocument\"\n\
SimpleKYC,\"phone, idDocument\"\n";
        let catalog = FlowCatalog::from_reader(Cursor::new(csv)).expect("catalog loads");

        assert_eq!(catalog.len(), 7);
        assert_eq!(
            catalog.resolve("KYB Lite").required_steps,
            vec![Step::Email, Step::IdDocument]
        );
        assert_eq!(
            catalog.resolve("SimpleKYC").required_steps,
            vec![Step::Phone, Step::IdDocument]
        );
    }

    #[test]
    fn csv_rejects_unknown_steps_and_empty_flows() {
        let error = FlowCatalog::from_reader(Cursor::new(
            "Flow name,Required steps\nKYB,\"email, passport\"\n",
        ))
        .expect_err("unknown step rejected");
        match error {
            FlowCatalogError::UnknownStep { flow, step } => {
                assert_eq!(flow, "KYB");
                assert_eq!(step, "passport");
            }
            other => panic!("expected unknown step, got {other:?}"),
        }

        let error = FlowCatalog::from_reader(Cursor::new("Flow name,Required steps\nKYB,\n"))
            .expect_err("empty flow rejected");
        assert!(matches!(error, FlowCatalogError::EmptyFlow { .. }));
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = FlowCatalog::from_path("./does-not-exist.csv").expect_err("io error");
        assert!(matches!(error, FlowCatalogError::Io(_)));
    }

    #[test]
    fn definitions_drop_duplicate_steps() {
        let definition = FlowDefinition::new("dup", [Step::Email, Step::Phone, Step::Email]);
        assert_eq!(definition.required_steps, vec![Step::Email, Step::Phone]);
        assert!(definition.requires(Step::Phone));
        assert!(!definition.requires(Step::Selfie));
    }
}
