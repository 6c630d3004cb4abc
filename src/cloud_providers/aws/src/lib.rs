pub mod config;
pub mod pricing;
pub mod retry;
pub mod settings;

pub use crate::config::AwsConfig;
pub use pricing::AwsPriceCatalog;
pub use retry::RetryPolicy;
pub use settings::{ConfigLoader, Settings};

use anyhow::Context;
use awscalc_estimator::Calculator;

/// Builds a calculator priced against the live Pricing API
pub async fn open_session(settings: &Settings) -> anyhow::Result<Calculator<AwsPriceCatalog>> {
    let catalog = AwsPriceCatalog::connect(
        settings.aws_config(),
        &settings.pricing_region,
        settings.retry_policy(),
    )
    .await?;

    tracing::info!(
        region = %settings.region,
        hours = settings.hours,
        "Opened pricing session"
    );

    Calculator::with_hours(catalog, settings.region.code(), settings.hours)
        .context("failed to create calculator")
}
