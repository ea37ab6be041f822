//! Corral authorization core: permission schemes and grant evaluation.
//!
//! # Purpose
//! Owns the permission taxonomy (a fixed tree of named schemes) and decides
//! whether a principal's grants permit an action within a scope.
//!
//! # How it fits
//! The API and scheduler services build one [`SchemeRegistry`] at startup,
//! share it read-only, and route every authorization question through
//! [`AccessEvaluator::check`] or [`TenantResolver::tenant_for`]. Grants come
//! from a [`Principal`] supplied by the authentication layer.
//!
//! # Key invariants
//! - Holding a scheme authorizes every scheme nested beneath it.
//! - A global grant satisfies any requested scope; a scoped grant only the
//!   identical scope.
//! - Evaluation is fail-closed: a grant retrieval failure denies.
//! - Tenant resolution never guesses between several candidates.
//!
//! # Important configuration
//! - `CORRAL_AUTHZ_UNSCOPED_CHECK`, `CORRAL_AUTHZ_TENANT_KIND`,
//!   `CORRAL_AUTHZ_SCHEMES` and `CORRAL_AUTHZ_CONFIG`; see [`AuthzConfig`].
//!
//! # Examples
//! ```rust
//! use corral_authz::{catalog, AccessEvaluator, Permission, PermissionContext, SchemeRegistry};
//!
//! let registry = SchemeRegistry::platform().unwrap();
//! let deploy = registry.get(catalog::APP_DEPLOY).unwrap();
//! let grants = vec![Permission::new(registry.root().id(), PermissionContext::global())];
//!
//! let evaluator = AccessEvaluator::new(&registry);
//! assert!(evaluator.check(&grants, deploy, &[PermissionContext::team("team1")]));
//! ```
//!
//! # Common pitfalls
//! - Starting to serve after [`SchemeRegistry::build`] failed.
//! - Mixing [`SchemeId`]s from different registries; foreign ids are denied.

pub mod catalog;
mod config;
mod context;
mod errors;
mod evaluator;
mod permission;
mod registry;
mod scheme;
mod tenant;

pub use config::{AuthzConfig, UnscopedCheck};
pub use context::{ContextKind, PermissionContext};
pub use errors::{AuthzError, AuthzResult};
pub use evaluator::AccessEvaluator;
pub use permission::{Permission, Principal};
pub use registry::{SchemeDeclaration, SchemeRegistry};
pub use scheme::{ContextDeclaration, Scheme, SchemeId};
pub use tenant::TenantResolver;
