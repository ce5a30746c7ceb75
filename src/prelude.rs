//! # Prelude
//!
//! Re-exports commonly used types and traits.
//!
//! ```rust
//! use resource_override_operator::prelude::*;
//! ```

// CRD types
pub use crate::crd::*;

// Handler chain
pub use crate::controller::condition::{InstallReadinessError, ReadinessReason};
pub use crate::controller::handlers::{
    ControllerSetter, HandleResult, Handler, OwnerReferenceSetter, ReconcileRequestContext,
    ServiceHandler,
};

// Stores
pub use crate::store::{ObjectReader, ObjectWriter, StoreError};

// Control loop
pub use crate::runtime::reconcile::{reconcile, Reconciler, ReconcilerError};

pub use crate::asset::{Asset, AssetValues};
pub use crate::config::ControllerConfig;
