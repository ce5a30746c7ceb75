//! # Assets
//!
//! Desired-state builders for the objects that make up the webhook operand.
//!
//! Names are derived from the operand name so that the Service, its selector
//! label and the serving-cert secret always agree with each other.

use crate::config::ControllerConfig;
use crate::constants::{
    SERVING_CERT_SECRET_NAME_ANNOTATION, SERVING_CERT_SECRET_PREFIX, WEBHOOK_SERVICE_PORT,
};
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

/// Values every asset is rendered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetValues {
    pub name: String,
    pub namespace: String,
    pub webhook_target_port: i32,
}

impl From<&ControllerConfig> for AssetValues {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            name: config.operand_name.clone(),
            namespace: config.operand_namespace.clone(),
            webhook_target_port: config.webhook_target_port,
        }
    }
}

/// Entry point to the operand's desired-state builders
#[derive(Debug, Clone)]
pub struct Asset {
    values: AssetValues,
}

impl Asset {
    #[must_use]
    pub fn new(values: AssetValues) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &AssetValues {
        &self.values
    }

    #[must_use]
    pub fn service(&self) -> ServiceAsset<'_> {
        ServiceAsset {
            values: &self.values,
        }
    }

    #[must_use]
    pub fn service_serving_secret(&self) -> ServingSecretAsset<'_> {
        ServingSecretAsset {
            values: &self.values,
        }
    }
}

/// The Service fronting the webhook server
#[derive(Debug, Clone, Copy)]
pub struct ServiceAsset<'a> {
    values: &'a AssetValues,
}

impl<'a> ServiceAsset<'a> {
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.values.name
    }

    /// Build the desired Service
    ///
    /// The object is sparse: only fields the operator cares about are set,
    /// everything else is left for the API server to default.
    #[must_use]
    pub fn new_object(&self) -> Service {
        let selector = selector_labels(&self.values.name);
        let secret_name = serving_secret_name(&self.values.name);

        Service {
            metadata: ObjectMeta {
                name: Some(self.values.name.clone()),
                namespace: Some(self.values.namespace.clone()),
                labels: Some(selector.clone()),
                annotations: Some(BTreeMap::from([(
                    SERVING_CERT_SECRET_NAME_ANNOTATION.to_string(),
                    secret_name,
                )])),
                ..ObjectMeta::default()
            },
            spec: Some(ServiceSpec {
                selector: Some(selector),
                ports: Some(vec![ServicePort {
                    name: Some("https".to_string()),
                    port: WEBHOOK_SERVICE_PORT,
                    protocol: Some("TCP".to_string()),
                    target_port: Some(IntOrString::Int(self.values.webhook_target_port)),
                    ..ServicePort::default()
                }]),
                ..ServiceSpec::default()
            }),
            status: None,
        }
    }
}

/// The TLS serving-cert secret the service CA provisions for the Service
#[derive(Debug, Clone, Copy)]
pub struct ServingSecretAsset<'a> {
    values: &'a AssetValues,
}

impl ServingSecretAsset<'_> {
    #[must_use]
    pub fn name(&self) -> String {
        serving_secret_name(&self.values.name)
    }
}

fn serving_secret_name(operand_name: &str) -> String {
    format!("{SERVING_CERT_SECRET_PREFIX}{operand_name}")
}

fn selector_labels(operand_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(operand_name.to_string(), "true".to_string())])
}
