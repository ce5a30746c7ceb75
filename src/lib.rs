//! ClusterResourceOverride Operator Library
//!
//! Installs and maintains the admission webhook behind the
//! `ClusterResourceOverride` resource. The building blocks live here so the
//! binaries and the integration tests share them.

pub mod asset;
pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod ensurer;
pub mod equality;
pub mod observability;
pub mod prelude;
pub mod reference;
pub mod runtime;
pub mod server;
pub mod store;
