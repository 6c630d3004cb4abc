//! Session that prices resources and keeps a running total

use futures_util::future::join_all;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

use crate::catalog::PriceCatalog;
use crate::error::{ConfigError, EstimateError, Result};
use crate::plan::EstimatePlan;
use crate::region::AwsRegion;
use crate::resource::Resource;

/// Hours in the billing period, 30.5 days
pub const DEFAULT_HOURS: f64 = 732.0;

pub struct Calculator<C> {
    catalog: C,
    region: AwsRegion,
    hours: f64,
    prices: BTreeMap<String, f64>,
    total: f64,
}

impl<C: PriceCatalog> Calculator<C> {
    pub fn new(catalog: C, region: &str) -> std::result::Result<Self, ConfigError> {
        Self::with_hours(catalog, region, DEFAULT_HOURS)
    }

    pub fn with_hours(
        catalog: C,
        region: &str,
        hours: f64,
    ) -> std::result::Result<Self, ConfigError> {
        let region: AwsRegion = region.parse()?;

        if !(hours.is_finite() && hours > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "hours".to_string(),
                reason: format!("billing hours must be a positive number, got {}", hours),
            });
        }

        Ok(Self {
            catalog,
            region,
            hours,
            prices: BTreeMap::new(),
            total: 0.0,
        })
    }

    pub fn region(&self) -> AwsRegion {
        self.region
    }

    pub fn hours(&self) -> f64 {
        self.hours
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Recorded prices by tag
    pub fn prices(&self) -> &BTreeMap<String, f64> {
        &self.prices
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Prices `resource` and records it under its tag.
    ///
    /// Nothing is recorded when pricing fails. A tag that is already recorded
    /// fails before the catalog is queried.
    pub async fn add(&mut self, mut resource: Resource) -> Result<f64> {
        self.check_unique(resource.tag())?;

        let price = self.lookup(&mut resource).await?;
        self.record(resource.tag(), price);

        Ok(price)
    }

    /// Prices a batch of resources concurrently.
    ///
    /// Duplicate tags (already recorded, or repeated within the batch) are
    /// rejected before any query is made. The returned results are in input
    /// order; successful ones are recorded once every lookup has finished.
    pub async fn add_all(&mut self, resources: Vec<Resource>) -> Vec<Result<f64>> {
        let mut seen = HashSet::new();
        let mut results: Vec<Option<Result<f64>>> = Vec::with_capacity(resources.len());
        let mut pending = Vec::new();

        for (position, resource) in resources.into_iter().enumerate() {
            let unique = self
                .check_unique(resource.tag())
                .and_then(|_| match seen.insert(resource.tag().to_string()) {
                    true => Ok(()),
                    false => Err(EstimateError::DuplicateResource {
                        tag: resource.tag().to_string(),
                    }),
                });

            match unique {
                Ok(()) => {
                    results.push(None);
                    pending.push((position, resource));
                }
                Err(err) => results.push(Some(Err(err))),
            }
        }

        let lookups = join_all(
            pending
                .iter_mut()
                .map(|(_, resource)| self.lookup(resource)),
        )
        .await;

        for ((position, resource), result) in pending.into_iter().zip(lookups) {
            match &result {
                Ok(price) => self.record(resource.tag(), *price),
                Err(err) => warn!(tag = %resource.tag(), error = %err, "Resource was not priced"),
            }
            results[position] = Some(result);
        }

        results.into_iter().flatten().collect()
    }

    /// Adds every resource of `plan`, returning each tag with its outcome
    pub async fn estimate(&mut self, plan: EstimatePlan) -> Vec<(String, Result<f64>)> {
        let tags: Vec<String> = plan
            .resources
            .iter()
            .map(|resource| resource.tag().to_string())
            .collect();
        let results = self.add_all(plan.resources).await;

        tags.into_iter().zip(results).collect()
    }

    pub fn report(&self) -> EstimateReport {
        EstimateReport {
            region: self.region,
            hours: self.hours,
            lines: self
                .prices
                .iter()
                .map(|(tag, price)| ReportLine {
                    tag: tag.clone(),
                    price: *price,
                })
                .collect(),
            total: self.total,
        }
    }

    fn check_unique(&self, tag: &str) -> Result<()> {
        if self.prices.contains_key(tag) {
            return Err(EstimateError::DuplicateResource {
                tag: tag.to_string(),
            });
        }
        Ok(())
    }

    async fn lookup(&self, resource: &mut Resource) -> Result<f64> {
        let query = resource.query(self.region)?;
        debug!(
            tag = %resource.tag(),
            service_code = %query.service_code,
            filters = ?query.filters,
            "Querying pricing catalog"
        );

        let documents = self
            .catalog
            .get_products(&query)
            .await
            .map_err(|source| EstimateError::Catalog {
                tag: resource.tag().to_string(),
                source,
            })?;
        debug!(tag = %resource.tag(), matches = documents.len(), "Catalog returned products");

        resource
            .kind()
            .strategy()
            .price(resource, &documents, self.hours)
    }

    fn record(&mut self, tag: &str, price: f64) {
        info!(tag = %tag, price, "Recorded resource price");
        self.prices.insert(tag.to_string(), price);
        self.total += price;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportLine {
    pub tag: String,
    pub price: f64,
}

/// Snapshot of a calculator's recorded prices, sorted by tag
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EstimateReport {
    pub region: AwsRegion,
    pub hours: f64,
    pub lines: Vec<ReportLine>,
    pub total: f64,
}

impl fmt::Display for EstimateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .lines
            .iter()
            .map(|line| line.tag.len())
            .chain(std::iter::once("Total".len()))
            .max()
            .unwrap_or_default();

        writeln!(
            f,
            "Estimate for {} over {} hours",
            self.region.location_name(),
            self.hours
        )?;
        for line in &self.lines {
            writeln!(f, "{:<width$}  ${:>12.2}", line.tag, line.price)?;
        }
        write!(f, "{:<width$}  ${:>12.2}", "Total", self.total)
    }
}
