//! Field tables and typed builders for each resource kind

use typed_builder::TypedBuilder;

use super::field::{FieldDefault, FieldDescriptor, FieldType};
use super::{Resource, ResourceKind};
use crate::error::ConfigError;
use crate::pricing::{LcuProfile, RuleEvaluation};

const CODE: FieldDescriptor = FieldDescriptor::filter(
    "code",
    "serviceCode",
    FieldDefault::Text("AmazonEC2"),
    false,
);
const COUNT: FieldDescriptor =
    FieldDescriptor::parameter("count", FieldType::Number, FieldDefault::Number(1.0), false);
const REGION: FieldDescriptor =
    FieldDescriptor::filter("region", "location", FieldDefault::None, false);
const TERM: FieldDescriptor = FieldDescriptor::parameter(
    "term",
    FieldType::Text,
    FieldDefault::Text("OnDemand"),
    false,
);

const fn usage(name: &'static str) -> FieldDescriptor {
    FieldDescriptor::parameter(name, FieldType::Number, FieldDefault::None, true)
}

pub static COMPUTE_INSTANCE_FIELDS: [FieldDescriptor; 9] = [
    CODE,
    COUNT,
    FieldDescriptor::filter(
        "family",
        "productFamily",
        FieldDefault::Text("Compute Instance"),
        false,
    ),
    FieldDescriptor::filter("os", "operatingSystem", FieldDefault::Text("Linux"), false),
    REGION,
    FieldDescriptor::filter("size", "instanceType", FieldDefault::None, true),
    FieldDescriptor::filter("sw", "preInstalledSw", FieldDefault::Text("NA"), false),
    FieldDescriptor::filter("tenancy", "tenancy", FieldDefault::Text("Shared"), false),
    TERM,
];

pub static CLASSIC_LOAD_BALANCER_FIELDS: [FieldDescriptor; 6] = [
    usage("bandwidth"),
    CODE,
    COUNT,
    FieldDescriptor::filter(
        "family",
        "productFamily",
        FieldDefault::Text("Load Balancer"),
        false,
    ),
    REGION,
    TERM,
];

pub static NETWORK_LOAD_BALANCER_FIELDS: [FieldDescriptor; 8] = [
    usage("bandwidth"),
    CODE,
    usage("connections"),
    usage("duration"),
    COUNT,
    FieldDescriptor::filter(
        "family",
        "productFamily",
        FieldDefault::Text("Load Balancer-Network"),
        false,
    ),
    REGION,
    TERM,
];

pub static APPLICATION_LOAD_BALANCER_FIELDS: [FieldDescriptor; 10] = [
    usage("bandwidth"),
    CODE,
    usage("connections"),
    usage("duration"),
    COUNT,
    FieldDescriptor::filter(
        "family",
        "productFamily",
        FieldDefault::Text("Load Balancer-Application"),
        false,
    ),
    REGION,
    usage("requests"),
    usage("rules"),
    TERM,
];

pub const NETWORK_LCU_PROFILE: LcuProfile = LcuProfile {
    new_connections_per_unit: 800.0,
    active_connections_per_unit: 100_000.0,
    bandwidth_mb_per_unit: 1.0,
    rule_evaluations: None,
};

pub const APPLICATION_LCU_PROFILE: LcuProfile = LcuProfile {
    new_connections_per_unit: 25.0,
    active_connections_per_unit: 3_000.0,
    bandwidth_mb_per_unit: 1.0,
    rule_evaluations: Some(RuleEvaluation {
        evaluations_per_unit: 1_000.0,
        free_rules: 10.0,
    }),
};

/// EC2 instance billed at a flat hourly rate
#[derive(Debug, Clone, TypedBuilder)]
pub struct ComputeInstance {
    #[builder(setter(into))]
    pub tag: String,
    /// Instance type, e.g. `m5.large`
    #[builder(setter(into))]
    pub size: String,
    #[builder(default, setter(strip_option))]
    pub count: Option<u32>,
    #[builder(default, setter(strip_option, into))]
    pub region: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub os: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub tenancy: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub sw: Option<String>,
}

impl TryFrom<ComputeInstance> for Resource {
    type Error = ConfigError;

    fn try_from(spec: ComputeInstance) -> Result<Self, Self::Error> {
        Resource::builder(ResourceKind::ComputeInstance, spec.tag)
            .set("size", spec.size)
            .set_opt("count", spec.count)
            .set_opt("region", spec.region)
            .set_opt("os", spec.os)
            .set_opt("tenancy", spec.tenancy)
            .set_opt("sw", spec.sw)
            .build()
    }
}

/// Classic load balancer: hourly rate plus a per-GB data processing rate
#[derive(Debug, Clone, TypedBuilder)]
pub struct ClassicLoadBalancer {
    #[builder(setter(into))]
    pub tag: String,
    /// Data processed over the billing period, in GB
    #[builder(setter(into))]
    pub bandwidth_gb: f64,
    #[builder(default, setter(strip_option))]
    pub count: Option<u32>,
    #[builder(default, setter(strip_option, into))]
    pub region: Option<String>,
}

impl TryFrom<ClassicLoadBalancer> for Resource {
    type Error = ConfigError;

    fn try_from(spec: ClassicLoadBalancer) -> Result<Self, Self::Error> {
        Resource::builder(ResourceKind::ClassicLoadBalancer, spec.tag)
            .set("bandwidth", spec.bandwidth_gb)
            .set_opt("count", spec.count)
            .set_opt("region", spec.region)
            .build()
    }
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct NetworkLoadBalancer {
    #[builder(setter(into))]
    pub tag: String,
    /// New connections per second
    #[builder(setter(into))]
    pub connections: f64,
    /// Average connection duration in seconds
    #[builder(setter(into))]
    pub duration_secs: f64,
    /// Data processed over the billing period, in MB
    #[builder(setter(into))]
    pub bandwidth_mb: f64,
    #[builder(default, setter(strip_option))]
    pub count: Option<u32>,
    #[builder(default, setter(strip_option, into))]
    pub region: Option<String>,
}

impl TryFrom<NetworkLoadBalancer> for Resource {
    type Error = ConfigError;

    fn try_from(spec: NetworkLoadBalancer) -> Result<Self, Self::Error> {
        Resource::builder(ResourceKind::NetworkLoadBalancer, spec.tag)
            .set("connections", spec.connections)
            .set("duration", spec.duration_secs)
            .set("bandwidth", spec.bandwidth_mb)
            .set_opt("count", spec.count)
            .set_opt("region", spec.region)
            .build()
    }
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct ApplicationLoadBalancer {
    #[builder(setter(into))]
    pub tag: String,
    /// New connections per second
    #[builder(setter(into))]
    pub connections: f64,
    /// Average connection duration in seconds
    #[builder(setter(into))]
    pub duration_secs: f64,
    /// Data processed over the billing period, in MB
    #[builder(setter(into))]
    pub bandwidth_mb: f64,
    /// Requests per second
    #[builder(setter(into))]
    pub requests: f64,
    /// Listener rules evaluated per request
    #[builder(setter(into))]
    pub rules: f64,
    #[builder(default, setter(strip_option))]
    pub count: Option<u32>,
    #[builder(default, setter(strip_option, into))]
    pub region: Option<String>,
}

impl TryFrom<ApplicationLoadBalancer> for Resource {
    type Error = ConfigError;

    fn try_from(spec: ApplicationLoadBalancer) -> Result<Self, Self::Error> {
        Resource::builder(ResourceKind::ApplicationLoadBalancer, spec.tag)
            .set("connections", spec.connections)
            .set("duration", spec.duration_secs)
            .set("bandwidth", spec.bandwidth_mb)
            .set("requests", spec.requests)
            .set("rules", spec.rules)
            .set_opt("count", spec.count)
            .set_opt("region", spec.region)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::FieldValue;

    #[test]
    fn test_field_names_are_unique_per_kind() {
        for kind in [
            ResourceKind::ComputeInstance,
            ResourceKind::ClassicLoadBalancer,
            ResourceKind::NetworkLoadBalancer,
            ResourceKind::ApplicationLoadBalancer,
        ] {
            let mut names: Vec<&str> = kind.descriptors().iter().map(|d| d.name).collect();
            let total = names.len();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), total, "duplicate field in {}", kind);
        }
    }

    #[test]
    fn test_typed_compute_instance() {
        let resource: Resource = ComputeInstance::builder()
            .tag("web asg")
            .size("m5.large")
            .count(2)
            .build()
            .try_into()
            .unwrap();

        assert_eq!(resource.kind(), ResourceKind::ComputeInstance);
        assert_eq!(resource.count(), 2.0);
        assert_eq!(resource.value("size"), Some(FieldValue::from("m5.large")));
        assert_eq!(resource.text("tenancy").as_deref(), Some("Shared"));
    }

    #[test]
    fn test_typed_application_load_balancer() {
        let resource: Resource = ApplicationLoadBalancer::builder()
            .tag("web alb")
            .connections(300)
            .duration_secs(120)
            .bandwidth_mb(1000)
            .requests(50)
            .rules(60)
            .region("us-west-2")
            .build()
            .try_into()
            .unwrap();

        assert_eq!(resource.number("rules"), Some(60.0));
        assert_eq!(
            resource.text("family").as_deref(),
            Some("Load Balancer-Application")
        );
    }

    #[test]
    fn test_typed_builder_still_validates_region() {
        let result: Result<Resource, _> = ClassicLoadBalancer::builder()
            .tag("clb")
            .bandwidth_gb(10)
            .region("ap-south-1")
            .build()
            .try_into();

        assert!(matches!(result, Err(ConfigError::UnknownRegion { .. })));
    }
}
