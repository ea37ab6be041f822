//! The platform permission taxonomy.
//!
//! # Purpose
//! Declares every scheme the platform checks against, top-down, with the
//! context kinds each subtree may be scoped to. Callers build the registry
//! once with [`SchemeRegistry::platform`] and reference schemes through the
//! full-name constants below.
//!
//! # Key invariants
//! - Parents are declared before their children.
//! - Creating a tenant-level resource is scoped by the tenant that will own
//!   it (`app.create` by team), while acting on it is scoped by the resource.
//!
//! # Examples
//! ```rust
//! use corral_authz::{catalog, SchemeRegistry};
//!
//! let registry = SchemeRegistry::platform().unwrap();
//! let scheme = registry.lookup(catalog::APP_UPDATE_ENV_SET).unwrap();
//! assert_eq!(scheme.identifier(), "AppUpdateEnvSet");
//! ```
use crate::{AuthzResult, ContextKind, SchemeDeclaration, SchemeRegistry};

pub const APP: &str = "app";
pub const APP_CREATE: &str = "app.create";
pub const APP_READ: &str = "app.read";
pub const APP_READ_ENV: &str = "app.read.env";
pub const APP_READ_LOG: &str = "app.read.log";
pub const APP_UPDATE: &str = "app.update";
pub const APP_UPDATE_ENV: &str = "app.update.env";
pub const APP_UPDATE_ENV_SET: &str = "app.update.env.set";
pub const APP_UPDATE_ENV_UNSET: &str = "app.update.env.unset";
pub const APP_UPDATE_POOL: &str = "app.update.pool";
pub const APP_UPDATE_TEAM_OWNER: &str = "app.update.team-owner";
pub const APP_UPDATE_RESTART: &str = "app.update.restart";
pub const APP_DEPLOY: &str = "app.deploy";
pub const APP_DEPLOY_ROLLBACK: &str = "app.deploy.rollback";
pub const APP_DELETE: &str = "app.delete";
pub const APP_RUN: &str = "app.run";

pub const TEAM: &str = "team";
pub const TEAM_CREATE: &str = "team.create";
pub const TEAM_READ: &str = "team.read";
pub const TEAM_UPDATE: &str = "team.update";
pub const TEAM_DELETE: &str = "team.delete";

pub const USER: &str = "user";
pub const USER_UPDATE: &str = "user.update";
pub const USER_DELETE: &str = "user.delete";

pub const POOL: &str = "pool";
pub const POOL_CREATE: &str = "pool.create";
pub const POOL_UPDATE: &str = "pool.update";
pub const POOL_DELETE: &str = "pool.delete";

pub const SERVICE: &str = "service";
pub const SERVICE_CREATE: &str = "service.create";
pub const SERVICE_INSTANCE: &str = "service-instance";
pub const SERVICE_INSTANCE_CREATE: &str = "service-instance.create";
pub const SERVICE_INSTANCE_UPDATE_BIND: &str = "service-instance.update.bind";

pub const ROLE: &str = "role";
pub const ROLE_UPDATE_ASSIGN: &str = "role.update.assign";

pub const NODE: &str = "node";
pub const CLUSTER: &str = "cluster";
pub const VOLUME: &str = "volume";
pub const VOLUME_CREATE: &str = "volume.create";
pub const WEBHOOK: &str = "webhook";
pub const ROUTER: &str = "router";
pub const MACHINE: &str = "machine";

// Split a full name into a declaration under its dotted parent.
fn scheme(full_name: &str) -> SchemeDeclaration {
    match full_name.rsplit_once('.') {
        Some((parent, name)) => SchemeDeclaration::child(parent, name),
        None => SchemeDeclaration::top(full_name),
    }
}

fn crud(root: &str) -> Vec<SchemeDeclaration> {
    ["create", "read", "update", "delete"]
        .into_iter()
        .map(|action| scheme(&format!("{root}.{action}")))
        .collect()
}

/// Declarations for the whole platform taxonomy, parents first.
pub fn declarations() -> Vec<SchemeDeclaration> {
    use ContextKind::*;

    let mut decls = vec![
        scheme(APP).contexts(vec![App, Team, Pool]),
        scheme(APP_CREATE).contexts(vec![Team]),
        scheme(APP_READ),
        scheme(APP_READ_ENV),
        scheme(APP_READ_LOG),
        scheme("app.read.metric"),
        scheme("app.read.deploy"),
        scheme(APP_UPDATE),
        scheme("app.update.description"),
        scheme("app.update.plan"),
        scheme(APP_UPDATE_POOL),
        scheme(APP_UPDATE_TEAM_OWNER),
        scheme("app.update.cname"),
        scheme("app.update.cname.add"),
        scheme("app.update.cname.remove"),
        scheme(APP_UPDATE_ENV),
        scheme(APP_UPDATE_ENV_SET),
        scheme(APP_UPDATE_ENV_UNSET),
        scheme(APP_UPDATE_RESTART),
        scheme("app.update.grant"),
        scheme("app.update.revoke"),
        scheme("app.update.unit"),
        scheme("app.update.unit.add"),
        scheme("app.update.unit.remove"),
        scheme("app.update.router"),
        scheme("app.update.router.add"),
        scheme("app.update.router.remove"),
        scheme(APP_DEPLOY),
        scheme(APP_DEPLOY_ROLLBACK),
        scheme(APP_DELETE),
        scheme(APP_RUN),
        scheme("app.run.shell"),
        scheme(TEAM).contexts(vec![Team]),
        scheme(TEAM_CREATE).global_only(),
        scheme(TEAM_READ),
        scheme(TEAM_UPDATE),
        scheme(TEAM_DELETE),
        scheme("team.token"),
        scheme("team.token.create"),
        scheme("team.token.read"),
        scheme("team.token.delete"),
        scheme(USER).contexts(vec![User]),
        scheme("user.create").global_only(),
        scheme("user.read"),
        scheme(USER_UPDATE),
        scheme("user.update.password"),
        scheme("user.update.token"),
        scheme("user.update.quota"),
        scheme(USER_DELETE),
        scheme(POOL).contexts(vec![Pool]),
        scheme(POOL_CREATE).global_only(),
        scheme("pool.read"),
        scheme(POOL_UPDATE),
        scheme("pool.update.team"),
        scheme("pool.update.team.add"),
        scheme("pool.update.team.remove"),
        scheme("pool.update.constraints"),
        scheme(POOL_DELETE),
        scheme(SERVICE).contexts(vec![Service, Team]),
        scheme(SERVICE_CREATE).contexts(vec![Team]),
        scheme("service.read"),
        scheme("service.read.doc"),
        scheme("service.read.plans"),
        scheme("service.update"),
        scheme("service.update.doc"),
        scheme("service.update.grant-access"),
        scheme("service.update.revoke-access"),
        scheme("service.delete"),
        scheme(SERVICE_INSTANCE).contexts(vec![ServiceInstance, Team]),
        scheme(SERVICE_INSTANCE_CREATE).contexts(vec![Team]),
        scheme("service-instance.read"),
        scheme("service-instance.read.status"),
        scheme("service-instance.update"),
        scheme(SERVICE_INSTANCE_UPDATE_BIND),
        scheme("service-instance.update.unbind"),
        scheme("service-instance.update.grant"),
        scheme("service-instance.update.revoke"),
        scheme("service-instance.delete"),
        scheme(ROLE).global_only(),
        scheme("role.create"),
        scheme("role.read"),
        scheme("role.update"),
        scheme(ROLE_UPDATE_ASSIGN),
        scheme("role.update.dissociate"),
        scheme("role.update.permission"),
        scheme("role.delete"),
        scheme(NODE).contexts(vec![Pool]),
        scheme(CLUSTER).global_only(),
        scheme(VOLUME).contexts(vec![Volume, Team, Pool]),
        scheme(VOLUME_CREATE).contexts(vec![Team, Pool]),
        scheme("volume.read"),
        scheme("volume.update"),
        scheme("volume.update.bind"),
        scheme("volume.update.unbind"),
        scheme("volume.delete"),
        scheme(WEBHOOK).contexts(vec![Webhook, Team]),
        scheme(ROUTER).contexts(vec![Router]),
        scheme(MACHINE).contexts(vec![Iaas]),
        scheme("machine.create"),
        scheme("machine.read"),
        scheme("machine.delete"),
    ];
    for root in [NODE, CLUSTER, WEBHOOK, ROUTER] {
        decls.extend(crud(root));
    }
    decls
}

impl SchemeRegistry {
    /// Build the registry holding the platform taxonomy.
    pub fn platform() -> AuthzResult<Self> {
        Self::build(declarations())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_taxonomy_builds() {
        let registry = SchemeRegistry::platform().expect("platform registry");
        assert_eq!(registry.len(), declarations().len() + 1);
        for name in [
            APP_UPDATE_ENV_SET,
            APP_UPDATE_ENV_UNSET,
            APP_DEPLOY,
            TEAM_CREATE,
            SERVICE_INSTANCE_UPDATE_BIND,
            ROLE_UPDATE_ASSIGN,
            "node.create",
            "webhook.delete",
        ] {
            assert!(registry.get(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn platform_context_scoping() {
        let registry = SchemeRegistry::platform().expect("platform registry");
        let allowed = |name: &str| registry.lookup(name).expect(name).allowed_contexts();

        assert_eq!(
            allowed(APP_UPDATE_ENV_SET),
            vec![
                ContextKind::Global,
                ContextKind::App,
                ContextKind::Team,
                ContextKind::Pool
            ]
        );
        assert_eq!(
            allowed(APP_CREATE),
            vec![ContextKind::Global, ContextKind::Team]
        );
        assert_eq!(allowed(TEAM_CREATE), vec![ContextKind::Global]);
        assert_eq!(allowed("role.update.dissociate"), vec![ContextKind::Global]);
        assert_eq!(allowed("node.update"), vec![ContextKind::Global, ContextKind::Pool]);
        assert_eq!(registry.root().allowed_contexts(), vec![ContextKind::Global]);
    }

    #[test]
    fn identifiers_are_unique() {
        let registry = SchemeRegistry::platform().expect("platform registry");
        let mut identifiers: Vec<String> = registry.iter().map(|s| s.identifier()).collect();
        let total = identifiers.len();
        identifiers.sort();
        identifiers.dedup();
        assert_eq!(identifiers.len(), total);
    }
}
