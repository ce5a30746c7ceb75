//! # Semantic Equality
//!
//! "Derivative" comparison between a sparse desired object and a live object.
//!
//! `desired.is_derivative_of(&live)` holds when every field set on `desired`
//! matches `live`. Fields left unset on `desired` are ignored, so defaults the
//! API server fills in (cluster IPs, session affinity, node ports, uid,
//! managed fields, ...) never read as drift.
//!
//! "Unset" means `None`, an empty string or an empty collection. Scalars that
//! are not optional (`ServicePort::port`) are always compared.
//!
//! Every impl destructures its type without `..`, so a field added to
//! k8s-openapi fails to compile here instead of being silently ignored.

use k8s_openapi::api::core::v1::{
    ClientIPConfig, Service, ServicePort, ServiceSpec, SessionAffinityConfig,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    ManagedFieldsEntry, ObjectMeta, OwnerReference, Time,
};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

/// Asymmetric comparison: `self` is the sparse side, `live` the populated one
pub trait Derivative {
    fn is_derivative_of(&self, live: &Self) -> bool;

    /// Whether the value counts as "not set" on the desired side
    fn is_unset(&self) -> bool {
        false
    }
}

/// Compare two Services by spec and metadata
///
/// Status is ignored: it is owned by the API server.
#[must_use]
pub fn service_equal(this: &Service, that: &Service) -> bool {
    this.spec.is_derivative_of(&that.spec) && this.metadata.is_derivative_of(&that.metadata)
}

impl Derivative for String {
    fn is_derivative_of(&self, live: &Self) -> bool {
        self.is_empty() || self == live
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

macro_rules! exact_derivative {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Derivative for $ty {
                fn is_derivative_of(&self, live: &Self) -> bool {
                    self == live
                }
            }
        )*
    };
}

// Leaf values with no meaningful "unset" of their own
exact_derivative!(bool, i32, i64, IntOrString, Time, ManagedFieldsEntry);

/// k8s-openapi wraps plain API values (`type`, `clusterIP`, ...) in `Option`
/// too, and the API server omits them when empty. A desired `Some("")` is
/// therefore read as unset and matches a live `None`, even for fields that
/// are true pointers on the server side.
impl<T: Derivative> Derivative for Option<T> {
    fn is_derivative_of(&self, live: &Self) -> bool {
        match (self, live) {
            (None, _) => true,
            (Some(desired), _) if desired.is_unset() => true,
            (Some(desired), Some(live)) => desired.is_derivative_of(live),
            (Some(_), None) => false,
        }
    }
}

impl<T: Derivative> Derivative for Vec<T> {
    /// Element-wise by position; the live list may carry extra trailing items
    fn is_derivative_of(&self, live: &Self) -> bool {
        if self.is_empty() {
            return true;
        }
        self.len() <= live.len()
            && self
                .iter()
                .zip(live.iter())
                .all(|(desired, live)| desired.is_derivative_of(live))
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl<V: Derivative> Derivative for BTreeMap<String, V> {
    fn is_derivative_of(&self, live: &Self) -> bool {
        if self.is_empty() {
            return true;
        }
        self.len() <= live.len()
            && self.iter().all(|(key, desired)| {
                live.get(key)
                    .is_some_and(|live| desired.is_derivative_of(live))
            })
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl Derivative for ServiceSpec {
    fn is_derivative_of(&self, live: &Self) -> bool {
        let ServiceSpec {
            allocate_load_balancer_node_ports,
            cluster_ip,
            cluster_ips,
            external_ips,
            external_name,
            external_traffic_policy,
            health_check_node_port,
            internal_traffic_policy,
            ip_families,
            ip_family_policy,
            load_balancer_class,
            load_balancer_ip,
            load_balancer_source_ranges,
            ports,
            publish_not_ready_addresses,
            selector,
            session_affinity,
            session_affinity_config,
            traffic_distribution,
            type_,
        } = self;

        allocate_load_balancer_node_ports.is_derivative_of(&live.allocate_load_balancer_node_ports)
            && cluster_ip.is_derivative_of(&live.cluster_ip)
            && cluster_ips.is_derivative_of(&live.cluster_ips)
            && external_ips.is_derivative_of(&live.external_ips)
            && external_name.is_derivative_of(&live.external_name)
            && external_traffic_policy.is_derivative_of(&live.external_traffic_policy)
            && health_check_node_port.is_derivative_of(&live.health_check_node_port)
            && internal_traffic_policy.is_derivative_of(&live.internal_traffic_policy)
            && ip_families.is_derivative_of(&live.ip_families)
            && ip_family_policy.is_derivative_of(&live.ip_family_policy)
            && load_balancer_class.is_derivative_of(&live.load_balancer_class)
            && load_balancer_ip.is_derivative_of(&live.load_balancer_ip)
            && load_balancer_source_ranges.is_derivative_of(&live.load_balancer_source_ranges)
            && ports.is_derivative_of(&live.ports)
            && publish_not_ready_addresses.is_derivative_of(&live.publish_not_ready_addresses)
            && selector.is_derivative_of(&live.selector)
            && session_affinity.is_derivative_of(&live.session_affinity)
            && session_affinity_config.is_derivative_of(&live.session_affinity_config)
            && traffic_distribution.is_derivative_of(&live.traffic_distribution)
            && type_.is_derivative_of(&live.type_)
    }
}

impl Derivative for ServicePort {
    fn is_derivative_of(&self, live: &Self) -> bool {
        let ServicePort {
            app_protocol,
            name,
            node_port,
            port,
            protocol,
            target_port,
        } = self;

        app_protocol.is_derivative_of(&live.app_protocol)
            && name.is_derivative_of(&live.name)
            && node_port.is_derivative_of(&live.node_port)
            && port.is_derivative_of(&live.port)
            && protocol.is_derivative_of(&live.protocol)
            && target_port.is_derivative_of(&live.target_port)
    }
}

impl Derivative for SessionAffinityConfig {
    fn is_derivative_of(&self, live: &Self) -> bool {
        let SessionAffinityConfig { client_ip } = self;
        client_ip.is_derivative_of(&live.client_ip)
    }
}

impl Derivative for ClientIPConfig {
    fn is_derivative_of(&self, live: &Self) -> bool {
        let ClientIPConfig { timeout_seconds } = self;
        timeout_seconds.is_derivative_of(&live.timeout_seconds)
    }
}

impl Derivative for ObjectMeta {
    fn is_derivative_of(&self, live: &Self) -> bool {
        let ObjectMeta {
            annotations,
            creation_timestamp,
            deletion_grace_period_seconds,
            deletion_timestamp,
            finalizers,
            generate_name,
            generation,
            labels,
            managed_fields,
            name,
            namespace,
            owner_references,
            resource_version,
            self_link,
            uid,
        } = self;

        annotations.is_derivative_of(&live.annotations)
            && creation_timestamp.is_derivative_of(&live.creation_timestamp)
            && deletion_grace_period_seconds.is_derivative_of(&live.deletion_grace_period_seconds)
            && deletion_timestamp.is_derivative_of(&live.deletion_timestamp)
            && finalizers.is_derivative_of(&live.finalizers)
            && generate_name.is_derivative_of(&live.generate_name)
            && generation.is_derivative_of(&live.generation)
            && labels.is_derivative_of(&live.labels)
            && managed_fields.is_derivative_of(&live.managed_fields)
            && name.is_derivative_of(&live.name)
            && namespace.is_derivative_of(&live.namespace)
            && owner_references.is_derivative_of(&live.owner_references)
            && resource_version.is_derivative_of(&live.resource_version)
            && self_link.is_derivative_of(&live.self_link)
            && uid.is_derivative_of(&live.uid)
    }
}

impl Derivative for OwnerReference {
    fn is_derivative_of(&self, live: &Self) -> bool {
        let OwnerReference {
            api_version,
            block_owner_deletion,
            controller,
            kind,
            name,
            uid,
        } = self;

        api_version.is_derivative_of(&live.api_version)
            && block_owner_deletion.is_derivative_of(&live.block_owner_deletion)
            && controller.is_derivative_of(&live.controller)
            && kind.is_derivative_of(&live.kind)
            && name.is_derivative_of(&live.name)
            && uid.is_derivative_of(&live.uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_desired_fields_are_ignored() {
        let desired = ServicePort {
            port: 443,
            ..ServicePort::default()
        };
        let live = ServicePort {
            port: 443,
            protocol: Some("TCP".to_string()),
            target_port: Some(IntOrString::Int(9400)),
            ..ServicePort::default()
        };
        assert!(desired.is_derivative_of(&live));
        // Not symmetric
        assert!(!live.is_derivative_of(&desired));
    }

    #[test]
    fn test_empty_string_counts_as_unset() {
        assert!(String::new().is_derivative_of(&"anything".to_string()));
        assert!(Some(String::new()).is_derivative_of(&Some("x".to_string())));
        assert!(Some(String::new()).is_derivative_of(&None));
        assert!(Some(Vec::<String>::new()).is_derivative_of(&None));
        assert!(!"a".to_string().is_derivative_of(&"b".to_string()));
    }

    #[test]
    fn test_set_option_requires_live_value() {
        assert!(!Some(true).is_derivative_of(&None));
        assert!(!Some(false).is_derivative_of(&Some(true)));
        assert!(None::<bool>.is_derivative_of(&Some(true)));
    }

    #[test]
    fn test_vec_compares_by_position() {
        let desired = vec!["a".to_string()];
        assert!(desired.is_derivative_of(&vec!["a".to_string(), "b".to_string()]));
        assert!(!desired.is_derivative_of(&vec!["b".to_string(), "a".to_string()]));
        assert!(!vec!["a".to_string(), "b".to_string()].is_derivative_of(&desired));
        assert!(Vec::<String>::new().is_derivative_of(&desired));
    }

    #[test]
    fn test_map_requires_every_desired_key() {
        let desired = BTreeMap::from([("app".to_string(), "webhook".to_string())]);
        let live = BTreeMap::from([
            ("app".to_string(), "webhook".to_string()),
            ("extra".to_string(), "label".to_string()),
        ]);
        assert!(desired.is_derivative_of(&live));
        assert!(!live.is_derivative_of(&desired));

        let conflicting = BTreeMap::from([("app".to_string(), "other".to_string())]);
        assert!(!desired.is_derivative_of(&conflicting));
    }

    #[test]
    fn test_non_optional_scalars_always_compared() {
        let desired = ServicePort::default();
        let live = ServicePort {
            port: 443,
            ..ServicePort::default()
        };
        assert!(!desired.is_derivative_of(&live));
    }

    #[test]
    fn test_traffic_distribution_is_compared() {
        let desired = Service {
            spec: Some(ServiceSpec {
                traffic_distribution: Some("PreferClose".to_string()),
                ..ServiceSpec::default()
            }),
            ..Service::default()
        };
        let live = Service {
            spec: Some(ServiceSpec {
                cluster_ip: Some("10.0.0.1".to_string()),
                ..ServiceSpec::default()
            }),
            ..Service::default()
        };
        assert!(!service_equal(&desired, &live));

        let mut matching = live.clone();
        if let Some(spec) = matching.spec.as_mut() {
            spec.traffic_distribution = Some("PreferClose".to_string());
        }
        assert!(service_equal(&desired, &matching));
    }

    #[test]
    fn test_empty_desired_string_matches_absent_live_value() {
        let desired = ServiceSpec {
            type_: Some(String::new()),
            ..ServiceSpec::default()
        };
        assert!(desired.is_derivative_of(&ServiceSpec::default()));
    }
}
