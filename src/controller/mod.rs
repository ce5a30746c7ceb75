//! # Controller
//!
//! Reconciliation building blocks for the ClusterResourceOverride operator.
//!
//! - `backoff`: Fibonacci backoff for failed reconciliations
//! - `condition`: classified handler errors and their condition reasons
//! - `handlers`: the per-object steps of a reconciliation pass

pub mod backoff;
pub mod condition;
pub mod handlers;
