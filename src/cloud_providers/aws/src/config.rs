use anyhow::{anyhow, Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const SESSION_NAME: &str = "awscalc-session";

/// How credentials for the Pricing API are obtained
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AwsConfig {
    Profile(String),
    RoleArn(String),
    Env,
}

impl fmt::Display for AwsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AwsConfig::Profile(profile) => write!(f, "profile:{}", profile),
            AwsConfig::RoleArn(role) => write!(f, "role_arn:{}", role),
            AwsConfig::Env => write!(f, "env"),
        }
    }
}

/// Loads an SDK config for `source` in `region` and checks that it yields
/// credentials
pub async fn load_sdk_config(source: &AwsConfig, region: &str) -> Result<SdkConfig> {
    let region = Region::new(region.to_string());
    let loader = aws_config::defaults(BehaviorVersion::latest()).region(region.clone());

    let loader = match source {
        AwsConfig::Profile(profile) => loader.profile_name(profile),
        AwsConfig::RoleArn(arn) => {
            let assumed_role = aws_config::sts::AssumeRoleProvider::builder(arn)
                .session_name(SESSION_NAME)
                .region(region)
                .build()
                .await;
            loader.credentials_provider(assumed_role)
        }
        AwsConfig::Env => loader,
    };

    let config = loader.load().await;
    let credentials = config
        .credentials_provider()
        .ok_or_else(|| anyhow!("no credentials provider for {}", source))?;
    credentials
        .provide_credentials()
        .await
        .with_context(|| format!("failed to get AWS credentials using {}", source))?;

    Ok(config)
}

/// Tries `preferred` first and falls back to the environment chain
pub async fn resolve_sdk_config(preferred: &AwsConfig, region: &str) -> Result<SdkConfig> {
    match load_sdk_config(preferred, region).await {
        Ok(config) => {
            tracing::info!(source = %preferred, "Resolved AWS credentials");
            return Ok(config);
        }
        Err(err) if *preferred == AwsConfig::Env => return Err(err),
        Err(err) => {
            tracing::warn!(source = %preferred, error = ?err, "Falling back to environment");
        }
    }

    let config = load_sdk_config(&AwsConfig::Env, region).await?;
    tracing::info!(source = %AwsConfig::Env, "Resolved AWS credentials");
    Ok(config)
}

/// `AWS_PROFILE` when set, else the `default` profile if the shared
/// credentials file has one, else the environment chain
pub fn get_aws_default_config() -> AwsConfig {
    if let Ok(profile) = std::env::var("AWS_PROFILE") {
        if !profile.is_empty() {
            return AwsConfig::Profile(profile);
        }
    }

    match dirs::home_dir() {
        Some(home) if has_default_profile(&home) => AwsConfig::Profile("default".to_string()),
        _ => AwsConfig::Env,
    }
}

fn has_default_profile(home: &Path) -> bool {
    std::fs::read_to_string(home.join(".aws/credentials"))
        .unwrap_or_default()
        .lines()
        .any(|line| line.trim() == "[default]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_display() {
        assert_eq!(AwsConfig::Profile("dev".into()).to_string(), "profile:dev");
        assert_eq!(
            AwsConfig::RoleArn("arn:aws:iam::1:role/x".into()).to_string(),
            "role_arn:arn:aws:iam::1:role/x"
        );
    }

    #[test]
    fn test_default_profile_detection() {
        let home = tempfile::tempdir().unwrap();
        assert!(!has_default_profile(home.path()));

        std::fs::create_dir_all(home.path().join(".aws")).unwrap();
        std::fs::write(
            home.path().join(".aws/credentials"),
            "[work]\naws_access_key_id = A\n\n[default]\naws_access_key_id = B\n",
        )
        .unwrap();
        assert!(has_default_profile(home.path()));
    }

    #[tokio::test]
    #[serial]
    async fn test_env_credentials_resolve_in_requested_region() {
        std::env::set_var("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE");
        std::env::set_var("AWS_SECRET_ACCESS_KEY", "secret");
        let config = resolve_sdk_config(&AwsConfig::Env, "us-west-2").await;
        std::env::remove_var("AWS_ACCESS_KEY_ID");
        std::env::remove_var("AWS_SECRET_ACCESS_KEY");

        let config = config.unwrap();
        let region = config.region().map(|r| r.to_string());
        assert_eq!(region.as_deref(), Some("us-west-2"));
    }

    #[test]
    #[serial]
    fn test_aws_profile_env_wins() {
        std::env::set_var("AWS_PROFILE", "billing");
        let conf = get_aws_default_config();
        std::env::remove_var("AWS_PROFILE");

        assert_eq!(conf, AwsConfig::Profile("billing".to_string()));
    }
}
