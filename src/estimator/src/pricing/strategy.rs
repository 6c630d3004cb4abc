//! Per-kind billing formulas

use tracing::debug;

use super::document::{extract_leaf_price, unit_price, DocumentError, LeafPrice, PriceDocument};
use crate::error::{ConfigError, EstimateError, Result};
use crate::resource::Resource;

/// Normalizer for the rule-evaluation dimension of application load balancers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuleEvaluation {
    pub evaluations_per_unit: f64,
    pub free_rules: f64,
}

/// How much of each usage dimension one load balancer capacity unit covers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LcuProfile {
    pub new_connections_per_unit: f64,
    pub active_connections_per_unit: f64,
    pub bandwidth_mb_per_unit: f64,
    pub rule_evaluations: Option<RuleEvaluation>,
}

/// Load balancer traffic over the billing period
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LcuUsage {
    pub connections: f64,
    pub duration_secs: f64,
    pub bandwidth_mb: f64,
    pub requests: f64,
    pub rules: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LcuDimension {
    NewConnections,
    ActiveConnections,
    Bandwidth,
    RuleEvaluations,
}

/// Capacity units needed by each dimension
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LcuDimensions {
    pub new_connections: f64,
    pub active_connections: f64,
    pub bandwidth: f64,
    pub rule_evaluations: Option<f64>,
}

impl LcuDimensions {
    fn iter(&self) -> impl Iterator<Item = (LcuDimension, f64)> {
        [
            Some((LcuDimension::NewConnections, self.new_connections)),
            Some((LcuDimension::ActiveConnections, self.active_connections)),
            Some((LcuDimension::Bandwidth, self.bandwidth)),
            self.rule_evaluations
                .map(|lcu| (LcuDimension::RuleEvaluations, lcu)),
        ]
        .into_iter()
        .flatten()
    }

    /// The dimension the load balancer is billed on and its capacity units
    pub fn bottleneck(&self) -> (LcuDimension, f64) {
        let mut bottleneck = (LcuDimension::NewConnections, f64::MIN);
        for (dimension, lcu) in self.iter() {
            if lcu > bottleneck.1 {
                bottleneck = (dimension, lcu);
            }
        }
        bottleneck
    }

    pub fn max(&self) -> f64 {
        self.bottleneck().1
    }
}

impl LcuProfile {
    pub fn dimensions(&self, usage: &LcuUsage, hours: f64) -> LcuDimensions {
        LcuDimensions {
            new_connections: usage.connections / self.new_connections_per_unit,
            active_connections: (usage.connections * usage.duration_secs)
                / self.active_connections_per_unit,
            bandwidth: (usage.bandwidth_mb / hours) / self.bandwidth_mb_per_unit,
            rule_evaluations: self.rule_evaluations.map(|rules| {
                let billable_rules = (usage.rules - rules.free_rules).max(0.0);
                (usage.requests * billable_rules) / rules.evaluations_per_unit
            }),
        }
    }
}

/// Hourly base rate plus a usage rate, as returned for load balancers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DualRate {
    pub hourly: f64,
    pub usage: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PricingStrategy {
    /// `unit price × hours × count`
    FlatRate,
    /// `hourly × hours + usage rate × bandwidth`
    DualRate,
    /// `hours × (hourly + LCU rate × max LCU)`
    CapacityUnit(LcuProfile),
}

impl PricingStrategy {
    pub fn expected_documents(&self) -> usize {
        match self {
            PricingStrategy::FlatRate => 1,
            PricingStrategy::DualRate | PricingStrategy::CapacityUnit(_) => 2,
        }
    }

    /// Prices `resource` from the raw catalog records matched by its filters
    pub fn price(&self, resource: &Resource, documents: &[String], hours: f64) -> Result<f64> {
        let tag = resource.tag();
        check_match_count(tag, self.expected_documents(), documents.len())?;

        let documents = documents
            .iter()
            .map(|raw| PriceDocument::parse(raw).map_err(|e| malformed(tag, raw, e)))
            .collect::<Result<Vec<_>>>()?;
        let term = resource.term();

        let price = match self {
            PricingStrategy::FlatRate => {
                let leaf = leaf_price(tag, &documents[0], &term)?;
                let rate = rate(tag, &documents[0], &leaf)?;
                rate * hours * resource.count()
            }
            PricingStrategy::DualRate => {
                let rates = split_rates(tag, &documents, &term)?;
                let bandwidth = required_number(resource, "bandwidth")?;
                rates.hourly * hours + rates.usage * bandwidth
            }
            PricingStrategy::CapacityUnit(profile) => {
                let rates = split_rates(tag, &documents, &term)?;
                let usage = LcuUsage {
                    connections: required_number(resource, "connections")?,
                    duration_secs: required_number(resource, "duration")?,
                    bandwidth_mb: required_number(resource, "bandwidth")?,
                    requests: resource.number("requests").unwrap_or_default(),
                    rules: resource.number("rules").unwrap_or_default(),
                };
                let dimensions = profile.dimensions(&usage, hours);
                let (bottleneck, max_lcu) = dimensions.bottleneck();

                debug!(
                    tag,
                    ?bottleneck,
                    max_lcu,
                    new_connections = dimensions.new_connections,
                    active_connections = dimensions.active_connections,
                    bandwidth = dimensions.bandwidth,
                    rule_evaluations = ?dimensions.rule_evaluations,
                    "Computed load balancer capacity units"
                );

                hours * (rates.hourly + rates.usage * max_lcu)
            }
        };

        Ok(price)
    }
}

fn check_match_count(tag: &str, expected: usize, found: usize) -> Result<()> {
    if found < expected {
        Err(EstimateError::NoMatch {
            tag: tag.to_string(),
            expected,
            found,
        })
    } else if found > expected {
        Err(EstimateError::AmbiguousMatch {
            tag: tag.to_string(),
            expected,
            found,
        })
    } else {
        Ok(())
    }
}

fn malformed(tag: &str, document: &str, err: DocumentError) -> EstimateError {
    EstimateError::MalformedDocument {
        tag: tag.to_string(),
        reason: err.to_string(),
        document: document.to_string(),
    }
}

fn leaf_price(tag: &str, document: &PriceDocument, term: &str) -> Result<LeafPrice> {
    extract_leaf_price(document, term).map_err(|e| malformed(tag, document.raw(), e))
}

fn rate(tag: &str, document: &PriceDocument, leaf: &LeafPrice) -> Result<f64> {
    unit_price(leaf).map_err(|e| malformed(tag, document.raw(), e))
}

/// Splits a pair of documents into the hourly (`Hrs`) rate and the usage rate.
/// Exactly one document of each sort is accepted.
pub fn split_rates(tag: &str, documents: &[PriceDocument], term: &str) -> Result<DualRate> {
    let mut hourly = None;
    let mut usage = None;

    for document in documents {
        let leaf = leaf_price(tag, document, term)?;
        let price = rate(tag, document, &leaf)?;
        let slot = if leaf.is_hourly() {
            &mut hourly
        } else {
            &mut usage
        };

        if slot.replace(price).is_some() {
            return Err(EstimateError::MalformedDocument {
                tag: tag.to_string(),
                reason: format!("more than one price dimension with unit {:?}", leaf.unit),
                document: document.raw().to_string(),
            });
        }
    }

    match (hourly, usage) {
        (Some(hourly), Some(usage)) => Ok(DualRate { hourly, usage }),
        (hourly, _) => Err(EstimateError::MalformedDocument {
            tag: tag.to_string(),
            reason: if hourly.is_none() {
                "no hourly (Hrs) price dimension".to_string()
            } else {
                "no usage price dimension".to_string()
            },
            document: documents
                .iter()
                .map(PriceDocument::raw)
                .collect::<Vec<_>>()
                .join("\n"),
        }),
    }
}

fn required_number(resource: &Resource, name: &str) -> Result<f64> {
    resource.number(name).ok_or_else(|| {
        ConfigError::MissingField {
            tag: resource.tag().to_string(),
            field: name.to_string(),
        }
        .into()
    })
}
