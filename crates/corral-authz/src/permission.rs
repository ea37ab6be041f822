//! Grants and the principal capability that supplies them.
//!
//! # Purpose
//! A [`Permission`] is one right a principal holds: a scheme (and, by
//! hierarchy, everything nested under it) within a context. A [`Principal`]
//! hands out a snapshot of its grants at the start of every evaluation.
//!
//! # Key invariants
//! - Grants are plain values; they are compared, never mutated.
//! - A retrieval failure is reported as an error, never as an empty list, so
//!   callers can tell "no grants" from "could not ask".
//!
//! # Examples
//! ```rust
//! use corral_authz::{Permission, PermissionContext, Principal, SchemeRegistry};
//!
//! let registry = SchemeRegistry::build(Vec::new()).unwrap();
//! let grants = vec![Permission::new(registry.root().id(), PermissionContext::global())];
//! assert_eq!(grants.permissions().unwrap().len(), 1);
//! ```
use crate::{AuthzResult, PermissionContext, SchemeId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission {
    pub scheme: SchemeId,
    pub context: PermissionContext,
}

impl Permission {
    pub fn new(scheme: SchemeId, context: PermissionContext) -> Self {
        Self { scheme, context }
    }
}

/// Source of a principal's current grants.
///
/// Implementations may block or perform I/O; timeouts and caching belong
/// here, not in the evaluator. Ordering and duplicates do not matter.
pub trait Principal: Send + Sync {
    fn permissions(&self) -> AuthzResult<Vec<Permission>>;
}

impl Principal for [Permission] {
    fn permissions(&self) -> AuthzResult<Vec<Permission>> {
        Ok(self.to_vec())
    }
}

impl Principal for Vec<Permission> {
    fn permissions(&self) -> AuthzResult<Vec<Permission>> {
        Ok(self.clone())
    }
}

impl<P: Principal + ?Sized> Principal for &P {
    fn permissions(&self) -> AuthzResult<Vec<Permission>> {
        (**self).permissions()
    }
}

impl<P: Principal + ?Sized> Principal for std::sync::Arc<P> {
    fn permissions(&self) -> AuthzResult<Vec<Permission>> {
        (**self).permissions()
    }
}
