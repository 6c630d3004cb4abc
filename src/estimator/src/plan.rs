//! Estimate plans: resource lists read from TOML
//!
//! ```toml
//! [[resource]]
//! kind = "ec2"
//! tag = "web asg"
//! size = "m5.large"
//! count = 2
//!
//! [[resource]]
//! kind = "nlb"
//! tag = "ingress"
//! connections = 300
//! duration = 120
//! bandwidth = 1000
//! ```
//!
//! Every key besides `kind` and `tag` is bound as a field of the resource.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::resource::{FieldValue, Resource, ResourceKind};

const PLAN: &str = "plan";

#[derive(Debug, Deserialize)]
struct PlanFile {
    #[serde(default, rename = "resource")]
    resources: Vec<toml::Table>,
}

#[derive(Clone, Debug, Default)]
pub struct EstimatePlan {
    pub resources: Vec<Resource>,
}

fn invalid_plan(reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: PLAN.to_string(),
        reason: reason.into(),
    }
}

fn take_string(entry: &mut toml::Table, key: &str, position: usize) -> Result<String, ConfigError> {
    match entry.remove(key) {
        Some(toml::Value::String(value)) => Ok(value),
        Some(other) => Err(invalid_plan(format!(
            "resource #{}: {} must be a string, found {}",
            position,
            key,
            other.type_str()
        ))),
        None => Err(invalid_plan(format!("resource #{}: no {}", position, key))),
    }
}

fn field_value(name: &str, value: toml::Value) -> Result<FieldValue, ConfigError> {
    match value {
        toml::Value::Integer(i) => Ok(FieldValue::Number(i as f64)),
        toml::Value::Float(f) => Ok(FieldValue::Number(f)),
        toml::Value::String(s) => Ok(FieldValue::Text(s)),
        other => Err(ConfigError::InvalidValue {
            field: name.to_string(),
            reason: format!("expected a number or a string, found {}", other.type_str()),
        }),
    }
}

impl EstimatePlan {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| invalid_plan(format!("failed to read {}: {}", path.display(), e)))?;
        contents.parse()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl FromStr for EstimatePlan {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let file: PlanFile = toml::from_str(s).map_err(|e| invalid_plan(e.message()))?;

        let resources = file
            .resources
            .into_iter()
            .enumerate()
            .map(|(i, mut entry)| {
                let position = i + 1;
                let kind: ResourceKind = take_string(&mut entry, "kind", position)?.parse()?;
                let tag = take_string(&mut entry, "tag", position)?;

                entry
                    .into_iter()
                    .try_fold(Resource::builder(kind, tag), |builder, (name, value)| {
                        let value = field_value(&name, value)?;
                        Ok::<_, ConfigError>(builder.set(name, value))
                    })?
                    .build()
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { resources })
    }
}
