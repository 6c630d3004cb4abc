use anyhow::Context;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_pricing as pricing;
use aws_sdk_pricing::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_pricing::types::{Filter as PricingFilter, FilterType as PricingFilterType};

use awscalc_estimator::{CatalogError, FilterCriterion, FilterType, PriceCatalog, ProductQuery};

use crate::config::{resolve_sdk_config, AwsConfig};
use crate::retry::RetryPolicy;

/// The Pricing API is served from a few regions only; us-east-1 carries every service
pub const DEFAULT_PRICING_REGION: &str = "us-east-1";

const THROTTLING_CODES: [&str; 4] = [
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
];

/// [`PriceCatalog`] backed by the AWS Price List Query API
pub struct AwsPriceCatalog {
    client: pricing::Client,
    retry: RetryPolicy,
}

impl AwsPriceCatalog {
    pub fn new(conf: &SdkConfig, retry: RetryPolicy) -> Self {
        Self {
            client: pricing::Client::new(conf),
            retry,
        }
    }

    /// Resolves credentials for `pricing_region` and builds a client
    pub async fn connect(
        initialization_conf: AwsConfig,
        pricing_region: &str,
        retry: RetryPolicy,
    ) -> anyhow::Result<Self> {
        let conf = resolve_sdk_config(&initialization_conf, pricing_region)
            .await
            .context("could not resolve AWS credentials for the Pricing API")?;

        Ok(Self::new(&conf, retry))
    }

    async fn fetch_all(&self, query: &ProductQuery) -> Result<Vec<String>, CatalogError> {
        let filters = query
            .filters
            .iter()
            .map(to_pricing_filter)
            .collect::<Result<Vec<_>, _>>()?;

        let mut paginator = self
            .client
            .get_products()
            .service_code(&query.service_code)
            .set_filters(Some(filters))
            .into_paginator()
            .send();

        let mut documents = Vec::new();

        while let Some(output) = paginator.next().await {
            let output = output.map_err(classify_sdk_error)?;
            documents.extend(output.price_list().iter().cloned());
        }

        Ok(documents)
    }
}

#[async_trait]
impl PriceCatalog for AwsPriceCatalog {
    async fn get_products(&self, query: &ProductQuery) -> Result<Vec<String>, CatalogError> {
        let documents = self.retry.run(|| self.fetch_all(query)).await?;

        tracing::debug!(
            service_code = %query.service_code,
            products = documents.len(),
            "Fetched price list products"
        );

        Ok(documents)
    }
}

pub fn to_pricing_filter(criterion: &FilterCriterion) -> Result<PricingFilter, CatalogError> {
    let filter_type = match criterion.filter_type {
        FilterType::TermMatch => PricingFilterType::TermMatch,
    };

    PricingFilter::builder()
        .field(criterion.field.clone())
        .value(criterion.value.clone())
        .r#type(filter_type)
        .build()
        .map_err(|e| {
            let message = format!("invalid filter {}: {}", criterion.field, e);
            CatalogError::Rejected(message)
        })
}

fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> CatalogError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();

    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            CatalogError::Transport(message)
        }
        SdkError::ServiceError(service_err) => classify_code(service_err.err().code(), message),
        _ => CatalogError::Rejected(message),
    }
}

/// Maps a service error code to a catalog error
pub fn classify_code(code: Option<&str>, message: String) -> CatalogError {
    match code {
        Some(code) if THROTTLING_CODES.contains(&code) => CatalogError::Throttled(message),
        Some("InternalErrorException" | "ServiceUnavailableException") => {
            CatalogError::Transport(message)
        }
        _ => CatalogError::Rejected(message),
    }
}
