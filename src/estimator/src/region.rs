// The pricing catalog filters on the human readable location name, not on the region code
// the rest of AWS uses, so every supported region carries both.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AwsRegion {
    #[serde(rename = "us-east-1")]
    UsEast1,
    #[serde(rename = "us-east-2")]
    UsEast2,
    #[serde(rename = "us-west-1")]
    UsWest1,
    #[serde(rename = "us-west-2")]
    UsWest2,
}

impl AwsRegion {
    pub const ALL: [AwsRegion; 4] = [
        AwsRegion::UsEast1,
        AwsRegion::UsEast2,
        AwsRegion::UsWest1,
        AwsRegion::UsWest2,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            AwsRegion::UsEast1 => "us-east-1",
            AwsRegion::UsEast2 => "us-east-2",
            AwsRegion::UsWest1 => "us-west-1",
            AwsRegion::UsWest2 => "us-west-2",
        }
    }

    /// Name used by the `location` attribute of price list products
    pub fn location_name(&self) -> &'static str {
        match self {
            AwsRegion::UsEast1 => "US East (N. Virginia)",
            AwsRegion::UsEast2 => "US East (Ohio)",
            AwsRegion::UsWest1 => "US West (California)",
            AwsRegion::UsWest2 => "US West (Oregon)",
        }
    }
}

impl FromStr for AwsRegion {
    type Err = ConfigError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        AwsRegion::ALL
            .into_iter()
            .find(|region| region.code() == code)
            .ok_or_else(|| ConfigError::UnknownRegion {
                code: code.to_string(),
            })
    }
}

impl fmt::Display for AwsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
