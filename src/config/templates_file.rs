use crate::config::error::ConfigError;
use crate::shared::ids::{validate_identifier_value, ResourceId, StepId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Declarative blueprint a planner instantiates into a concrete flow.
/// Files declare templates in yaml:
///
/// ```yaml
/// templates:
///   - id: standard-travel-booking
///     name: Standard Travel Booking
///     description: Book flight and hotel in sequence
///     trigger_tags: [flight, hotel, travel]
///     required_resources: [flight-api, hotel-api]
///     estimated_duration_seconds: 3600
///     steps:
///       - id: search-flights
///         name: Search flights
///         description: Find candidate flights
///         action: search
///         service: flight
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub trigger_tags: Vec<String>,
    #[serde(default)]
    pub required_resources: Vec<ResourceId>,
    pub estimated_duration_seconds: u64,
    #[serde(default)]
    pub steps: Vec<TemplateStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateStep {
    pub id: StepId,
    pub name: String,
    pub description: String,
    pub action: String,
    pub service: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub depends_on: Vec<StepId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTemplateFile {
    #[serde(default)]
    pub templates: Vec<FlowTemplate>,
}

impl FlowTemplateFile {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let file: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        file.validate()?;
        Ok(file)
    }

    /// Structural checks after parse: unique valid template ids, unique
    /// step ids per template, and no dependency on a step the template
    /// does not declare. Cycle detection belongs to the engine, which
    /// validates every instantiated flow before running it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen_templates = HashSet::new();
        for template in &self.templates {
            validate_identifier_value("template id", &template.id)
                .map_err(ConfigError::Templates)?;
            if !seen_templates.insert(template.id.as_str()) {
                return Err(ConfigError::Templates(format!(
                    "duplicate template id `{}`",
                    template.id
                )));
            }
            if template.name.trim().is_empty() {
                return Err(ConfigError::Templates(format!(
                    "template `{}` has a blank name",
                    template.id
                )));
            }
            let mut seen_steps = HashSet::new();
            for step in &template.steps {
                if !seen_steps.insert(step.id.as_str()) {
                    return Err(ConfigError::Templates(format!(
                        "template `{}` declares step `{}` twice",
                        template.id, step.id
                    )));
                }
            }
            for step in &template.steps {
                for dep in &step.depends_on {
                    if !seen_steps.contains(dep.as_str()) {
                        return Err(ConfigError::Templates(format!(
                            "step `{}` in template `{}` depends on unknown step `{}`",
                            step.id, template.id, dep
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
