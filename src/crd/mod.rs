//! # Custom Resource Definitions
//!
//! CRD types for the ClusterResourceOverride operator.
//!
//! ## Module Structure
//!
//! - `spec.rs` - `ClusterResourceOverride` specification
//! - `status.rs` - Status types, tracked object references and conditions

mod spec;
mod status;

pub use spec::{
    ClusterResourceOverride, ClusterResourceOverrideSpec, DeploymentOverrides,
    PodResourceOverride, PodResourceOverrideSpec,
};
pub use status::{ClusterResourceOverrideStatus, Condition, ConditionStatus, OperandResources};
