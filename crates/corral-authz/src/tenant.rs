//! Tenant resolution from a principal's grants.
//!
//! # Purpose
//! Recovers the single tenant scope (a team, by default) a principal's rights
//! for a scheme are confined to, so a request can default to "the caller's
//! team" when exactly one is implied.
//!
//! # Key invariants
//! - Only grants scoped to the tenant kind count. A global grant implies every
//!   tenant, so it never resolves to one.
//! - Zero candidates and several candidates both yield
//!   [`AuthzError::AmbiguousTenant`]; callers must not pick one themselves.
//!
//! # Examples
//! ```rust
//! use corral_authz::{catalog, Permission, PermissionContext, SchemeRegistry, TenantResolver};
//!
//! let registry = SchemeRegistry::platform().unwrap();
//! let create = registry.get(catalog::APP_CREATE).unwrap();
//! let grants = vec![Permission::new(create, PermissionContext::team("payments"))];
//!
//! let resolver = TenantResolver::new(&registry);
//! assert_eq!(resolver.tenant_for(&grants, create).unwrap(), "payments");
//! ```
use crate::config::AuthzConfig;
use crate::{AuthzError, AuthzResult, ContextKind, Principal, SchemeId, SchemeRegistry};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy)]
pub struct TenantResolver<'r> {
    registry: &'r SchemeRegistry,
    tenant_kind: ContextKind,
}

impl<'r> TenantResolver<'r> {
    pub fn new(registry: &'r SchemeRegistry) -> Self {
        Self {
            registry,
            tenant_kind: ContextKind::Team,
        }
    }

    pub fn with_config(registry: &'r SchemeRegistry, config: &AuthzConfig) -> Self {
        Self {
            registry,
            tenant_kind: config.tenant_kind,
        }
    }

    /// The single tenant `principal` holds `required` within.
    ///
    /// # Errors
    /// - The principal's retrieval error, unchanged.
    /// - [`AuthzError::AmbiguousTenant`] unless exactly one tenant is implied.
    pub fn tenant_for<P>(&self, principal: &P, required: SchemeId) -> AuthzResult<String>
    where
        P: Principal + ?Sized,
    {
        self.tenant_for_kind(principal, required, self.tenant_kind)
    }

    /// Like [`tenant_for`](Self::tenant_for) for an explicit context kind.
    pub fn tenant_for_kind<P>(
        &self,
        principal: &P,
        required: SchemeId,
        kind: ContextKind,
    ) -> AuthzResult<String>
    where
        P: Principal + ?Sized,
    {
        let grants = principal.permissions()?;
        if kind.is_global() {
            return Err(AuthzError::AmbiguousTenant);
        }

        let mut tenants: BTreeSet<&str> = BTreeSet::new();
        for grant in &grants {
            if grant.context.kind == kind && self.registry.covers(grant.scheme, required) {
                tenants.insert(grant.context.value.as_str());
            }
        }

        let mut candidates = tenants.into_iter();
        match (candidates.next(), candidates.next()) {
            (Some(tenant), None) => Ok(tenant.to_string()),
            (first, _) => {
                tracing::debug!(
                    kind = %kind,
                    found = first.is_some(),
                    "tenant could not be resolved"
                );
                Err(AuthzError::AmbiguousTenant)
            }
        }
    }
}
