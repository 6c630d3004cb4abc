//! Resource specifications
//!
//! A [`Resource`] is one instance of a [`ResourceKind`]: a tag plus the kind's
//! fields with whatever values the caller bound. The field set of each kind is
//! declared once in [`kinds`]; only the bound values differ between instances.
//!
//! Resources can be built two ways:
//! - keyword style, through [`Resource::builder`], which checks field names and
//!   required fields when [`ResourceBuilder::build`] runs (used for plans read
//!   from files);
//! - through the typed per-kind builders in [`kinds`], where a missing required
//!   field does not compile.

mod field;
pub mod kinds;

pub use field::{Field, FieldDefault, FieldDescriptor, FieldType, FieldValue};
pub use kinds::{
    ApplicationLoadBalancer, ClassicLoadBalancer, ComputeInstance, NetworkLoadBalancer,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::filter::{FilterCriterion, ProductQuery};
use crate::pricing::PricingStrategy;
use crate::region::AwsRegion;

pub(crate) const REGION: &str = "region";
pub(crate) const SERVICE_CODE: &str = "code";
pub(crate) const TERM: &str = "term";
pub(crate) const COUNT: &str = "count";

const DEFAULT_SERVICE_CODE: &str = "AmazonEC2";
const DEFAULT_TERM: &str = "OnDemand";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    ComputeInstance,
    ClassicLoadBalancer,
    NetworkLoadBalancer,
    ApplicationLoadBalancer,
}

impl ResourceKind {
    pub fn descriptors(&self) -> &'static [FieldDescriptor] {
        match self {
            ResourceKind::ComputeInstance => &kinds::COMPUTE_INSTANCE_FIELDS,
            ResourceKind::ClassicLoadBalancer => &kinds::CLASSIC_LOAD_BALANCER_FIELDS,
            ResourceKind::NetworkLoadBalancer => &kinds::NETWORK_LOAD_BALANCER_FIELDS,
            ResourceKind::ApplicationLoadBalancer => &kinds::APPLICATION_LOAD_BALANCER_FIELDS,
        }
    }

    pub fn strategy(&self) -> PricingStrategy {
        match self {
            ResourceKind::ComputeInstance => PricingStrategy::FlatRate,
            ResourceKind::ClassicLoadBalancer => PricingStrategy::DualRate,
            ResourceKind::NetworkLoadBalancer => {
                PricingStrategy::CapacityUnit(kinds::NETWORK_LCU_PROFILE)
            }
            ResourceKind::ApplicationLoadBalancer => {
                PricingStrategy::CapacityUnit(kinds::APPLICATION_LCU_PROFILE)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::ComputeInstance => "ec2",
            ResourceKind::ClassicLoadBalancer => "clb",
            ResourceKind::NetworkLoadBalancer => "nlb",
            ResourceKind::ApplicationLoadBalancer => "alb",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ec2" | "compute" | "compute_instance" => Ok(ResourceKind::ComputeInstance),
            "clb" | "classic" | "classic_load_balancer" => Ok(ResourceKind::ClassicLoadBalancer),
            "nlb" | "network" | "network_load_balancer" => Ok(ResourceKind::NetworkLoadBalancer),
            "alb" | "application" | "application_load_balancer" => {
                Ok(ResourceKind::ApplicationLoadBalancer)
            }
            _ => Err(ConfigError::InvalidValue {
                field: "kind".to_string(),
                reason: format!("unknown resource kind: {}", s),
            }),
        }
    }
}

/// One resource to be priced
#[derive(Clone, Debug)]
pub struct Resource {
    tag: String,
    kind: ResourceKind,
    fields: Vec<Field>,
}

impl Resource {
    pub fn builder(kind: ResourceKind, tag: impl Into<String>) -> ResourceBuilder {
        ResourceBuilder {
            tag: tag.into(),
            kind,
            bindings: Vec::new(),
        }
    }

    /// Keyword-style construction from `(name, value)` pairs
    pub fn from_fields<I, K, V>(
        kind: ResourceKind,
        tag: impl Into<String>,
        fields: I,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        fields
            .into_iter()
            .fold(Self::builder(kind, tag), |builder, (name, value)| {
                builder.set(name, value)
            })
            .build()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name() == name)
    }

    pub fn value(&self, name: &str) -> Option<FieldValue> {
        self.field(name).and_then(Field::effective_value)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(|v| v.as_number())
    }

    pub fn text(&self, name: &str) -> Option<String> {
        match self.value(name) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn count(&self) -> f64 {
        self.number(COUNT).unwrap_or(1.0)
    }

    pub fn service_code(&self) -> String {
        self.text(SERVICE_CODE)
            .unwrap_or_else(|| DEFAULT_SERVICE_CODE.to_string())
    }

    /// Offer term the price is read from, `OnDemand` unless overridden
    pub fn term(&self) -> String {
        self.text(TERM).unwrap_or_else(|| DEFAULT_TERM.to_string())
    }

    /// The region the resource is priced in, if one is bound
    pub fn region(&self) -> Option<Result<AwsRegion, ConfigError>> {
        self.text(REGION).map(|code| code.parse())
    }

    /// Binds `fallback` when the resource has no region of its own and returns
    /// the region the resource will be priced in. The field keeps the region
    /// code, so calling this again gives the same answer.
    pub fn bind_region(&mut self, fallback: AwsRegion) -> Result<AwsRegion, ConfigError> {
        if let Some(field) = self.field_mut(REGION) {
            if !field.is_bound() {
                field.bind(FieldValue::Text(fallback.code().to_string()))?;
            }
        }

        self.region().unwrap_or(Ok(fallback))
    }

    /// One exact-match criterion per field with a catalog attribute, in
    /// declaration order. The region is sent as its location name.
    pub fn filters(&mut self, fallback: AwsRegion) -> Result<Vec<FilterCriterion>, ConfigError> {
        let region = self.bind_region(fallback)?;

        let filters = self
            .fields
            .iter()
            .filter_map(|field| match (field.name(), field.descriptor().attribute) {
                (REGION, Some(attribute)) => Some(FilterCriterion::term_match(
                    attribute,
                    region.location_name(),
                )),
                _ => field.to_filter_criterion(),
            })
            .collect();

        Ok(filters)
    }

    pub fn query(&mut self, fallback: AwsRegion) -> Result<ProductQuery, ConfigError> {
        Ok(ProductQuery {
            filters: self.filters(fallback)?,
            service_code: self.service_code(),
        })
    }
}

/// Collects keyword bindings; all checks run in [`ResourceBuilder::build`]
#[derive(Clone, Debug)]
pub struct ResourceBuilder {
    tag: String,
    kind: ResourceKind,
    bindings: Vec<(String, FieldValue)>,
}

impl ResourceBuilder {
    pub fn set(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.bindings.push((name.into(), value.into()));
        self
    }

    /// Like [`ResourceBuilder::set`], skipping `None`
    pub fn set_opt<V: Into<FieldValue>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(name, value),
            None => self,
        }
    }

    pub fn build(self) -> Result<Resource, ConfigError> {
        let kind = self.kind;
        let mut resource = Resource {
            fields: kind.descriptors().iter().map(Field::new).collect(),
            tag: self.tag,
            kind,
        };

        for (name, value) in self.bindings {
            let field = resource
                .field_mut(&name)
                .ok_or_else(|| ConfigError::UnknownField {
                    kind,
                    field: name.clone(),
                })?;
            field.bind(value)?;
        }

        if let Some(region) = resource.region() {
            region?;
        }

        for field in &resource.fields {
            if field.descriptor().required && field.effective_value().is_none() {
                return Err(ConfigError::MissingField {
                    tag: resource.tag.clone(),
                    field: field.name().to_string(),
                });
            }
        }

        Ok(resource)
    }
}
