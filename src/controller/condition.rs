//! # Install Readiness Errors
//!
//! Classified handler failures. The classification becomes the reason of the
//! `InstallReadinessFailure` condition the control loop writes.

use crate::reference::ReferenceError;
use crate::store::StoreError;
use std::fmt;
use thiserror::Error;

/// Why a handler could not bring the operand to its desired state
#[derive(Debug, Error)]
pub enum InstallReadinessError {
    /// Unexpected failure, e.g. deleting a stale serving-cert secret
    #[error("internal error: {0}")]
    InternalError(#[source] StoreError),
    /// Serving certificate state could not be read, or the Service fronting it
    /// could not be created
    #[error("serving certificate not available: {0}")]
    CertNotAvailable(#[source] StoreError),
    /// A live object could not be turned into a status reference
    #[error("cannot set object reference: {0}")]
    CannotSetReference(#[source] ReferenceError),
}

/// Condition reason for each [`InstallReadinessError`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadinessReason {
    InternalError,
    CertNotAvailable,
    CannotSetReference,
}

impl ReadinessReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessReason::InternalError => "InternalError",
            ReadinessReason::CertNotAvailable => "CertNotAvailable",
            ReadinessReason::CannotSetReference => "CannotSetReference",
        }
    }
}

impl fmt::Display for ReadinessReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InstallReadinessError {
    #[must_use]
    pub fn reason(&self) -> ReadinessReason {
        match self {
            InstallReadinessError::InternalError(_) => ReadinessReason::InternalError,
            InstallReadinessError::CertNotAvailable(_) => ReadinessReason::CertNotAvailable,
            InstallReadinessError::CannotSetReference(_) => ReadinessReason::CannotSetReference,
        }
    }
}
