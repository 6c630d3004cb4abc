use anyhow::{ensure, Context, Result};
use awscalc_estimator::logging::setup_logging;
use awscalc_estimator::{AwsRegion, DEFAULT_HOURS};
use config::{Config as RConfig, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{get_aws_default_config, AwsConfig};
use crate::pricing::DEFAULT_PRICING_REGION;
use crate::retry::RetryPolicy;

pub const ENV_PREFIX: &str = "AWSCALC";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Settings {
    /// Region resources are priced in when they do not name one
    pub region: AwsRegion,
    pub hours: f64,

    /// Detected from the environment when not configured
    #[serde(default)]
    pub aws_init_type: Option<AwsConfig>,
    /// Region of the Pricing API endpoint, unrelated to `region`
    pub pricing_region: String,

    pub retry_attempts: usize,
    pub retry_base_delay_ms: u64,
    pub request_timeout_ms: u64,

    pub log_filter: String,
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    pub fn aws_config(&self) -> AwsConfig {
        self.aws_init_type
            .clone()
            .unwrap_or_else(get_aws_default_config)
    }

    pub fn init_logging(&self) -> Result<()> {
        setup_logging(&self.log_filter, self.log_dir.as_deref())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retry_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    fn validate(self) -> Result<Self> {
        ensure!(
            self.hours.is_finite() && self.hours > 0.0,
            "hours must be a positive number, got {}",
            self.hours
        );
        ensure!(
            self.request_timeout_ms > 0,
            "request_timeout_ms must be greater than zero"
        );
        ensure!(!self.pricing_region.is_empty(), "pricing_region is empty");
        Ok(self)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the TOML file at `path` if given, then `AWSCALC_*`
    /// environment variables
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let defaults = RetryPolicy::default();
        let base_delay_ms = defaults.base_delay.as_millis() as u64;
        let timeout_ms = defaults.timeout.as_millis() as u64;
        let mut builder = RConfig::builder()
            .set_default("region", AwsRegion::UsEast1.code())?
            .set_default("hours", DEFAULT_HOURS)?
            .set_default("pricing_region", DEFAULT_PRICING_REGION)?
            .set_default("retry_attempts", defaults.retries as u64)?
            .set_default("retry_base_delay_ms", base_delay_ms)?
            .set_default("request_timeout_ms", timeout_ms)?
            .set_default("log_filter", "info")?
            .set_default("log_dir", None::<String>)?;

        if let Some(path) = path {
            let file = File::from(path).format(FileFormat::Toml).required(true);
            builder = builder.add_source(file);
        }

        let environment = Environment::with_prefix(ENV_PREFIX).try_parsing(true);
        builder = builder.add_source(environment);

        let settings: Settings = builder
            .build()
            .context("failed to read settings")?
            .try_deserialize()
            .context("failed to parse settings")?;

        settings.validate().context("invalid settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn settings_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_defaults() {
        let settings = ConfigLoader::load(None).unwrap();

        assert_eq!(settings.region, AwsRegion::UsEast1);
        assert_eq!(settings.hours, 732.0);
        assert_eq!(settings.pricing_region, "us-east-1");
        assert_eq!(settings.retry_policy(), RetryPolicy::default());
        assert_eq!(settings.log_dir, None);
    }

    #[test]
    #[serial]
    fn test_file_overrides_defaults() {
        let file = settings_file(
            r#"
            region = "us-west-2"
            hours = 100
            retry_attempts = 5

            [aws_init_type]
            role_arn = "arn:aws:iam::123456789012:role/pricing"
            "#,
        );

        let settings = ConfigLoader::load(Some(file.path())).unwrap();

        assert_eq!(settings.region, AwsRegion::UsWest2);
        assert_eq!(settings.hours, 100.0);
        assert_eq!(settings.retry_policy().retries, 5);
        assert_eq!(
            settings.aws_config(),
            AwsConfig::RoleArn("arn:aws:iam::123456789012:role/pricing".to_string())
        );
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let file = settings_file("region = \"us-west-2\"\n");
        std::env::set_var("AWSCALC_REGION", "us-east-2");
        std::env::set_var("AWSCALC_HOURS", "24");

        let settings = ConfigLoader::load(Some(file.path()));

        std::env::remove_var("AWSCALC_REGION");
        std::env::remove_var("AWSCALC_HOURS");

        let settings = settings.unwrap();
        assert_eq!(settings.region, AwsRegion::UsEast2);
        assert_eq!(settings.hours, 24.0);
    }

    #[test]
    #[serial]
    fn test_unknown_region_is_rejected() {
        let file = settings_file("region = \"eu-central-1\"\n");
        assert!(ConfigLoader::load(Some(file.path())).is_err());
    }

    #[test]
    #[serial]
    fn test_non_positive_hours_are_rejected() {
        let file = settings_file("hours = 0\n");
        let err = ConfigLoader::load(Some(file.path())).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("hours must be a positive number"));
    }

    #[test]
    #[serial]
    fn test_missing_file_is_an_error() {
        let path = Path::new("/nonexistent/awscalc.toml");
        assert!(ConfigLoader::load(Some(path)).is_err());
    }
}
