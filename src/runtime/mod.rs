//! # Runtime
//!
//! The control loop around the handlers.
//!
//! - `initialization`: start-up of clients, caches, metrics and probes
//! - `reconcile`: one reconciliation pass
//! - `status`: readiness condition and status persistence
//! - `error_policy`: requeue after failures
//! - `watch_loop`: the `kube_runtime` controller

pub mod error_policy;
pub mod initialization;
pub mod reconcile;
pub mod status;
pub mod watch_loop;
