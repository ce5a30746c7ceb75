//! # Object References
//!
//! Snapshot references to live objects, stored in the owner's status.

use k8s_openapi::api::core::v1::ObjectReference;
use kube::Resource;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("{kind} has no {field}")]
    MissingField { kind: String, field: &'static str },
}

/// Build an `ObjectReference` pinned to the object's current resourceVersion
///
/// The object must be a live object: name, uid and resourceVersion are all
/// server-assigned identity and a reference without them cannot be compared.
pub fn object_reference<K>(obj: &K) -> Result<ObjectReference, ReferenceError>
where
    K: Resource<DynamicType = ()>,
{
    let kind = K::kind(&()).into_owned();
    let meta = obj.meta();

    let missing = |field| ReferenceError::MissingField {
        kind: kind.clone(),
        field,
    };
    let name = meta.name.clone().ok_or_else(|| missing("name"))?;
    let uid = meta.uid.clone().ok_or_else(|| missing("uid"))?;
    let resource_version = meta
        .resource_version
        .clone()
        .ok_or_else(|| missing("resourceVersion"))?;

    Ok(ObjectReference {
        api_version: Some(K::api_version(&()).into_owned()),
        kind: Some(kind),
        name: Some(name),
        namespace: meta.namespace.clone(),
        uid: Some(uid),
        resource_version: Some(resource_version),
        ..ObjectReference::default()
    })
}

/// Whether a stored reference still points at this exact version of `obj`
#[must_use]
pub fn is_current<K>(stored: Option<&ObjectReference>, obj: &K) -> bool
where
    K: Resource,
{
    match (stored, obj.meta().resource_version.as_deref()) {
        (Some(reference), Some(live)) => reference.resource_version.as_deref() == Some(live),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::Service;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn live_service() -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some("webhook".to_string()),
                namespace: Some("ns".to_string()),
                uid: Some("uid-1".to_string()),
                resource_version: Some("10".to_string()),
                ..ObjectMeta::default()
            },
            ..Service::default()
        }
    }

    #[test]
    fn test_reference_captures_identity() {
        let reference = object_reference(&live_service()).unwrap();
        assert_eq!(reference.kind.as_deref(), Some("Service"));
        assert_eq!(reference.api_version.as_deref(), Some("v1"));
        assert_eq!(reference.namespace.as_deref(), Some("ns"));
        assert_eq!(reference.name.as_deref(), Some("webhook"));
        assert_eq!(reference.uid.as_deref(), Some("uid-1"));
        assert_eq!(reference.resource_version.as_deref(), Some("10"));
    }

    #[test]
    fn test_reference_requires_server_identity() {
        let mut service = live_service();
        service.metadata.uid = None;
        assert_eq!(
            object_reference(&service),
            Err(ReferenceError::MissingField {
                kind: "Service".to_string(),
                field: "uid",
            })
        );

        let mut service = live_service();
        service.metadata.resource_version = None;
        assert!(object_reference(&service).is_err());
    }

    #[test]
    fn test_is_current_compares_resource_version_only() {
        let service = live_service();
        let mut stored = object_reference(&service).unwrap();
        assert!(is_current(Some(&stored), &service));

        // A different uid with the same version is still considered current
        stored.uid = Some("other".to_string());
        assert!(is_current(Some(&stored), &service));

        stored.resource_version = Some("9".to_string());
        assert!(!is_current(Some(&stored), &service));
        assert!(!is_current(None, &service));
    }
}
