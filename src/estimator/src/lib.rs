//! Monthly cost estimates for AWS resources.
//!
//! Resources are described by kind and a handful of fields, turned into
//! exact-match queries against the AWS price list, and priced with the
//! billing formula of their kind.
//!
//! ```no_run
//! # async fn run(catalog: impl awscalc_estimator::PriceCatalog) -> awscalc_estimator::Result<()> {
//! use awscalc_estimator::{Calculator, ComputeInstance};
//!
//! let mut calculator = Calculator::new(catalog, "us-west-2")?;
//! let web = ComputeInstance::builder().tag("web asg").size("m5.large").count(2).build();
//! calculator.add(web.try_into()?).await?;
//! println!("{}", calculator.report());
//! # Ok(())
//! # }
//! ```

pub mod calculator;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod logging;
pub mod plan;
pub mod pricing;
pub mod region;
pub mod resource;

pub use calculator::{Calculator, EstimateReport, ReportLine, DEFAULT_HOURS};
pub use catalog::PriceCatalog;
pub use error::{CatalogError, ConfigError, EstimateError, Result};
pub use filter::{FilterCriterion, FilterType, ProductQuery};
pub use plan::EstimatePlan;
pub use pricing::PricingStrategy;
pub use region::AwsRegion;
pub use resource::{
    ApplicationLoadBalancer, ClassicLoadBalancer, ComputeInstance, FieldValue,
    NetworkLoadBalancer, Resource, ResourceKind,
};
