//! Navigation of raw price list documents
//!
//! A price list product looks like
//!
//! ```json
//! { "product": { ... },
//!   "terms": { "OnDemand": { "<offer>": { "priceDimensions": { "<rate>": {
//!       "unit": "Hrs", "pricePerUnit": { "USD": "0.0960000000" } } } } } } }
//! ```
//!
//! For the filters this crate sends, every offer term holds exactly one price
//! dimension, so the navigator takes the first one it finds.

use serde::Deserialize;
use serde_json::{Map, Value};
use serde_query::{DeserializeQuery, Query};
use std::collections::HashMap;
use thiserror::Error;

const TERMS: &str = "terms";
const PRICE_DIMENSIONS: &str = "priceDimensions";
const USD: &str = "USD";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("document is not valid price list JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("missing {0}")]
    MissingLevel(String),

    #[error("price dimension is not a {{unit, pricePerUnit}} record: {0}")]
    InvalidLeaf(#[source] serde_json::Error),

    #[error("price dimension has no USD price")]
    MissingUsd,

    #[error("USD price is not a number: {0:?}")]
    InvalidUsd(String),
}

#[derive(Debug, DeserializeQuery)]
struct TermsQuery {
    #[query(".terms")]
    terms: Map<String, Value>,
}

/// One parsed catalog record
#[derive(Debug, Clone)]
pub struct PriceDocument {
    terms: Map<String, Value>,
    raw: String,
}

impl PriceDocument {
    pub fn parse(raw: &str) -> Result<Self, DocumentError> {
        let query: TermsQuery = serde_json::from_str::<Query<TermsQuery>>(raw)
            .map_err(|err| parse_error(raw, err))?
            .into();

        Ok(Self {
            terms: query.terms,
            raw: raw.to_string(),
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn term(&self, term_key: &str) -> Option<&Value> {
        self.terms.get(term_key)
    }
}

// Valid JSON without a `terms` object is a missing level, not a syntax error
fn parse_error(raw: &str, err: serde_json::Error) -> DocumentError {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) if value.get(TERMS).is_none() => DocumentError::MissingLevel(TERMS.to_string()),
        _ => DocumentError::InvalidJson(err),
    }
}

/// The leaf price dimension of an offer term
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeafPrice {
    pub unit: String,
    #[serde(rename = "pricePerUnit")]
    pub price_per_unit: HashMap<String, String>,
}

impl LeafPrice {
    pub fn is_hourly(&self) -> bool {
        self.unit == "Hrs"
    }
}

fn first_object<'a>(
    map: &'a Map<String, Value>,
    level: &str,
) -> Result<&'a Map<String, Value>, DocumentError> {
    map.values()
        .next()
        .and_then(Value::as_object)
        .ok_or_else(|| DocumentError::MissingLevel(level.to_string()))
}

/// `terms[term_key]` → first offer → price dimensions → first dimension
pub fn extract_leaf_price(
    document: &PriceDocument,
    term_key: &str,
) -> Result<LeafPrice, DocumentError> {
    let term = document
        .term(term_key)
        .and_then(Value::as_object)
        .ok_or_else(|| DocumentError::MissingLevel(format!("\"{}\" offer term", term_key)))?;

    let offer = first_object(term, "offer")?;

    let dimensions = match offer.get(PRICE_DIMENSIONS) {
        Some(dimensions) => dimensions
            .as_object()
            .ok_or_else(|| DocumentError::MissingLevel(PRICE_DIMENSIONS.to_string()))?,
        None => first_object(offer, PRICE_DIMENSIONS)?,
    };

    let leaf = dimensions
        .values()
        .next()
        .ok_or_else(|| DocumentError::MissingLevel("price dimension".to_string()))?;

    serde_json::from_value(leaf.clone()).map_err(DocumentError::InvalidLeaf)
}

pub fn unit_price(leaf: &LeafPrice) -> Result<f64, DocumentError> {
    let usd = leaf.price_per_unit.get(USD).ok_or(DocumentError::MissingUsd)?;
    usd.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .ok_or_else(|| DocumentError::InvalidUsd(usd.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EC2_DOCUMENT: &str = r#"{
        "product": {
            "productFamily": "Compute Instance",
            "attributes": {"instanceType": "m5.large", "location": "US West (Oregon)"},
            "sku": "XYZ"
        },
        "serviceCode": "AmazonEC2",
        "terms": {
            "OnDemand": {
                "XYZ.JRTCKXETXF": {
                    "priceDimensions": {
                        "XYZ.JRTCKXETXF.6YS6EN2CT7": {
                            "unit": "Hrs",
                            "endRange": "Inf",
                            "description": "$0.096 per On Demand Linux m5.large Instance Hour",
                            "pricePerUnit": {"USD": "0.0960000000"}
                        }
                    },
                    "sku": "XYZ",
                    "effectiveDate": "2024-01-01T00:00:00Z",
                    "offerTermCode": "JRTCKXETXF",
                    "termAttributes": {}
                }
            }
        }
    }"#;

    #[test]
    fn test_extracts_leaf_from_real_document() {
        let document = PriceDocument::parse(EC2_DOCUMENT).unwrap();
        let leaf = extract_leaf_price(&document, "OnDemand").unwrap();
        assert_eq!(leaf.unit, "Hrs");
        assert!(leaf.is_hourly());
        assert_eq!(unit_price(&leaf).unwrap(), 0.096);
    }

    // The intermediate level is skipped by position when it is not called priceDimensions.
    #[test]
    fn test_extracts_leaf_through_unnamed_level() {
        let raw = r#"{"terms": {"OnDemand": {"OFFER": {"OFFER": {"DIM": {
            "unit": "Hrs", "pricePerUnit": {"USD": "0.096"}}}}}}}"#;
        let document = PriceDocument::parse(raw).unwrap();
        let leaf = extract_leaf_price(&document, "OnDemand").unwrap();
        assert_eq!(unit_price(&leaf).unwrap(), 0.096);
    }

    #[test]
    fn test_missing_term() {
        let document = PriceDocument::parse(EC2_DOCUMENT).unwrap();
        let err = extract_leaf_price(&document, "Reserved").unwrap_err();
        assert!(
            matches!(err, DocumentError::MissingLevel(ref level) if level.contains("Reserved"))
        );
    }

    #[test]
    fn test_missing_terms_key() {
        let err = PriceDocument::parse(r#"{"product": {}}"#).unwrap_err();
        assert!(matches!(err, DocumentError::MissingLevel(ref level) if level == "terms"));
        assert_eq!(err.to_string(), "missing terms");
    }

    #[test]
    fn test_not_json() {
        let err = PriceDocument::parse("not json").unwrap_err();
        assert!(matches!(err, DocumentError::InvalidJson(_)));
    }

    #[test]
    fn test_empty_offer_term() {
        let document = PriceDocument::parse(r#"{"terms": {"OnDemand": {}}}"#).unwrap();
        let err = extract_leaf_price(&document, "OnDemand").unwrap_err();
        assert!(matches!(err, DocumentError::MissingLevel(_)));
    }

    #[test]
    fn test_empty_price_dimensions() {
        let raw = r#"{"terms": {"OnDemand": {"A": {"priceDimensions": {}}}}}"#;
        let document = PriceDocument::parse(raw).unwrap();
        assert!(matches!(
            extract_leaf_price(&document, "OnDemand"),
            Err(DocumentError::MissingLevel(_))
        ));
    }

    #[test]
    fn test_leaf_without_unit() {
        let raw = r#"{"terms": {"OnDemand": {"A": {"priceDimensions": {"B": {
            "pricePerUnit": {"USD": "1.0"}}}}}}}"#;
        let document = PriceDocument::parse(raw).unwrap();
        assert!(matches!(
            extract_leaf_price(&document, "OnDemand"),
            Err(DocumentError::InvalidLeaf(_))
        ));
    }

    #[test]
    fn test_unparsable_usd() {
        let leaf = LeafPrice {
            unit: "Hrs".to_string(),
            price_per_unit: HashMap::from([("USD".to_string(), "n/a".to_string())]),
        };
        assert!(matches!(
            unit_price(&leaf),
            Err(DocumentError::InvalidUsd(_))
        ));
    }

    #[test]
    fn test_missing_usd() {
        let leaf = LeafPrice {
            unit: "Hrs".to_string(),
            price_per_unit: HashMap::from([("CNY".to_string(), "1.0".to_string())]),
        };
        assert!(matches!(unit_price(&leaf), Err(DocumentError::MissingUsd)));
    }
}
