//! Filter criteria and product queries sent to the pricing catalog

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterType {
    #[serde(rename = "TERM_MATCH")]
    TermMatch,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::TermMatch => "TERM_MATCH",
        }
    }
}

/// Exact-match constraint on one product attribute
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriterion {
    #[serde(rename = "Type")]
    pub filter_type: FilterType,
    #[serde(rename = "Field")]
    pub field: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl FilterCriterion {
    pub fn term_match(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            filter_type: FilterType::TermMatch,
            field: field.into(),
            value: value.into(),
        }
    }
}

/// One `GetProducts` request: the service to search and the filters to apply
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    pub service_code: String,
    pub filters: Vec<FilterCriterion>,
}

impl ProductQuery {
    pub fn filter_value(&self, field: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.value.as_str())
    }
}
