#![allow(dead_code)]

use async_trait::async_trait;
use awscalc_estimator::logging::setup_logging;
use awscalc_estimator::{CatalogError, PriceCatalog, ProductQuery};
use serde_json::{json, Value};
use std::sync::{Mutex, Once};

static LOGGING: Once = Once::new();

pub fn init_logging() {
    LOGGING.call_once(|| {
        let _ = setup_logging("debug", None);
    });
}

pub const N_VIRGINIA: &str = "US East (N. Virginia)";
pub const OREGON: &str = "US West (Oregon)";

/// In-memory price list that applies term-match filters the way the
/// Pricing API does
#[derive(Default)]
pub struct FixtureCatalog {
    products: Vec<Value>,
    queries: Mutex<Vec<ProductQuery>>,
}

impl FixtureCatalog {
    pub fn new(products: Vec<Value>) -> Self {
        Self {
            products,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Catalog with EC2 instances and load balancers in two regions
    pub fn standard() -> Self {
        Self::new(vec![
            instance("M5LARGEOR", OREGON, "m5.large", "Linux", "0.0960000000"),
            instance("M5WINOR", OREGON, "m5.large", "Windows", "0.1880000000"),
            instance("M5LARGEVA", N_VIRGINIA, "m5.large", "Linux", "0.0960000000"),
            instance("T3MICROVA", N_VIRGINIA, "t3.micro", "Linux", "0.0104000000"),
            load_balancer(
                "CLBHRSVA",
                N_VIRGINIA,
                "Load Balancer",
                "LoadBalancerUsage",
                "Hrs",
                "0.0250000000",
            ),
            load_balancer(
                "CLBGBVA",
                N_VIRGINIA,
                "Load Balancer",
                "DataProcessing-Bytes",
                "GB",
                "0.0080000000",
            ),
            load_balancer(
                "NLBHRSVA",
                N_VIRGINIA,
                "Load Balancer-Network",
                "LoadBalancerUsage",
                "Hrs",
                "0.0225000000",
            ),
            load_balancer(
                "NLBLCUVA",
                N_VIRGINIA,
                "Load Balancer-Network",
                "LCUUsage",
                "LCU-Hrs",
                "0.0060000000",
            ),
            load_balancer(
                "ALBHRSVA",
                N_VIRGINIA,
                "Load Balancer-Application",
                "LoadBalancerUsage",
                "Hrs",
                "0.0225000000",
            ),
            load_balancer(
                "ALBLCUVA",
                N_VIRGINIA,
                "Load Balancer-Application",
                "LCUUsage",
                "LCU-Hrs",
                "0.0080000000",
            ),
            load_balancer(
                "NLBHRSOR",
                OREGON,
                "Load Balancer-Network",
                "LoadBalancerUsage",
                "Hrs",
                "0.0225000000",
            ),
        ])
    }

    pub fn queries(&self) -> Vec<ProductQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    fn matches(product: &Value, query: &ProductQuery) -> bool {
        product["serviceCode"].as_str() == Some(query.service_code.as_str())
            && query.filters.iter().all(|filter| {
                let actual = match filter.field.as_str() {
                    "serviceCode" => &product["serviceCode"],
                    "productFamily" => &product["product"]["productFamily"],
                    attribute => &product["product"]["attributes"][attribute],
                };
                actual.as_str() == Some(filter.value.as_str())
            })
    }
}

#[async_trait]
impl PriceCatalog for FixtureCatalog {
    async fn get_products(&self, query: &ProductQuery) -> Result<Vec<String>, CatalogError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }

        Ok(self
            .products
            .iter()
            .filter(|product| Self::matches(product, query))
            .map(Value::to_string)
            .collect())
    }
}

fn on_demand(sku: &str, unit: &str, usd: &str, description: &str) -> Value {
    let offer = format!("{}.JRTCKXETXF", sku);
    let rate = format!("{}.6YS6EN2CT7", offer);

    json!({
        "OnDemand": {
            (offer.clone()): {
                "priceDimensions": {
                    (rate.clone()): {
                        "unit": unit,
                        "endRange": "Inf",
                        "description": description,
                        "appliesTo": [],
                        "rateCode": rate,
                        "beginRange": "0",
                        "pricePerUnit": {"USD": usd}
                    }
                },
                "sku": sku,
                "effectiveDate": "2025-05-01T00:00:00Z",
                "offerTermCode": "JRTCKXETXF",
                "termAttributes": {}
            }
        }
    })
}

pub fn instance(sku: &str, location: &str, size: &str, os: &str, usd: &str) -> Value {
    json!({
        "product": {
            "productFamily": "Compute Instance",
            "attributes": {
                "instanceType": size,
                "location": location,
                "locationType": "AWS Region",
                "operatingSystem": os,
                "preInstalledSw": "NA",
                "tenancy": "Shared",
                "capacitystatus": "Used",
                "licenseModel": "No License required",
                "servicecode": "AmazonEC2",
                "vcpu": "2",
                "memory": "8 GiB"
            },
            "sku": sku
        },
        "serviceCode": "AmazonEC2",
        "terms": on_demand(
            sku,
            "Hrs",
            usd,
            &format!("${} per On Demand {} {} Instance Hour", usd, os, size)
        ),
        "version": "20250501000000",
        "publicationDate": "2025-05-01T00:00:00Z"
    })
}

pub fn load_balancer(
    sku: &str,
    location: &str,
    family: &str,
    usage_type: &str,
    unit: &str,
    usd: &str,
) -> Value {
    json!({
        "product": {
            "productFamily": family,
            "attributes": {
                "location": location,
                "locationType": "AWS Region",
                "usagetype": usage_type,
                "operation": "LoadBalancing",
                "servicecode": "AWSELB"
            },
            "sku": sku
        },
        "serviceCode": "AmazonEC2",
        "terms": on_demand(sku, unit, usd, &format!("${} per {}", usd, unit)),
        "version": "20250501000000",
        "publicationDate": "2025-05-01T00:00:00Z"
    })
}
