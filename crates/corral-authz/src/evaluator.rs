//! Grant evaluation: does a principal hold a scheme within a context?
//!
//! # Purpose
//! Answers permit/deny for a required scheme and the scopes a caller is
//! asking about, from a snapshot of the principal's grants.
//!
//! # Key invariants
//! - Fail-closed: a grant retrieval failure is a denial, never an error.
//! - A grant satisfies the request when its scheme covers the required one
//!   and its context is global or equals one of the requested contexts.
//! - A request with no contexts is answered according to [`UnscopedCheck`];
//!   by default only a global grant satisfies it.
//! - No caching and no retries; every call scans the full snapshot.
//!
//! # Examples
//! ```rust
//! use corral_authz::{catalog, AccessEvaluator, Permission, PermissionContext, SchemeRegistry};
//!
//! let registry = SchemeRegistry::platform().unwrap();
//! let update = registry.get(catalog::APP_UPDATE).unwrap();
//! let env_set = registry.get(catalog::APP_UPDATE_ENV_SET).unwrap();
//! let grants = vec![Permission::new(update, PermissionContext::team("team1"))];
//!
//! let evaluator = AccessEvaluator::new(&registry);
//! assert!(evaluator.check(&grants, env_set, &[PermissionContext::team("team1")]));
//! assert!(!evaluator.check(&grants, env_set, &[PermissionContext::team("team2")]));
//! ```
use crate::config::{AuthzConfig, UnscopedCheck};
use crate::{Permission, PermissionContext, Principal, SchemeId, SchemeRegistry};

#[derive(Debug, Clone, Copy)]
pub struct AccessEvaluator<'r> {
    registry: &'r SchemeRegistry,
    unscoped_check: UnscopedCheck,
}

impl<'r> AccessEvaluator<'r> {
    pub fn new(registry: &'r SchemeRegistry) -> Self {
        Self {
            registry,
            unscoped_check: UnscopedCheck::default(),
        }
    }

    pub fn with_config(registry: &'r SchemeRegistry, config: &AuthzConfig) -> Self {
        Self {
            registry,
            unscoped_check: config.unscoped_check,
        }
    }

    /// Decide whether `principal` may perform `required` within any one of
    /// `contexts`.
    ///
    /// An empty `contexts` slice is an unscoped request.
    pub fn check<P>(&self, principal: &P, required: SchemeId, contexts: &[PermissionContext]) -> bool
    where
        P: Principal + ?Sized,
    {
        let grants = match principal.permissions() {
            Ok(grants) => grants,
            Err(err) => {
                tracing::warn!(error = %err, "permission retrieval failed; denying");
                return false;
            }
        };

        let allowed = grants
            .iter()
            .any(|grant| self.grant_satisfies(grant, required, contexts));
        if !allowed {
            tracing::debug!(
                required = self.scheme_name(required),
                contexts = ?contexts,
                grants = grants.len(),
                "permission denied"
            );
        }
        allowed
    }

    fn grant_satisfies(
        &self,
        grant: &Permission,
        required: SchemeId,
        contexts: &[PermissionContext],
    ) -> bool {
        if !self.registry.covers(grant.scheme, required) {
            return false;
        }
        if grant.context.is_global() {
            return true;
        }
        if contexts.is_empty() {
            return self.unscoped_check == UnscopedCheck::AnyScope;
        }
        contexts.iter().any(|requested| *requested == grant.context)
    }

    fn scheme_name(&self, id: SchemeId) -> &'r str {
        self.registry
            .scheme(id)
            .map(|scheme| scheme.full_name())
            .unwrap_or("<foreign>")
    }
}
