//! Scope kinds and the value-bearing contexts grants and requests carry.
//!
//! # Purpose
//! Defines the closed set of scope kinds a permission can be restricted to and
//! the `kind:value` context pairs built from them.
//!
//! # Key invariants
//! - `Global` is the only kind that applies regardless of tenant/resource.
//! - A global context carries an empty value; every other kind is paired with
//!   the identifier of the resource it scopes to.
//!
//! # Examples
//! ```rust
//! use corral_authz::{ContextKind, PermissionContext};
//!
//! let ctx: PermissionContext = "team:payments".parse().unwrap();
//! assert_eq!(ctx.kind, ContextKind::Team);
//! assert_eq!(ctx.to_string(), "team:payments");
//! assert_eq!(PermissionContext::global().to_string(), "global");
//! ```
use crate::{AuthzError, AuthzResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextKind {
    Global,
    App,
    Team,
    User,
    Pool,
    Iaas,
    Service,
    ServiceInstance,
    Volume,
    Role,
    Router,
    Cluster,
    Webhook,
}

impl ContextKind {
    pub const ALL: [ContextKind; 13] = [
        ContextKind::Global,
        ContextKind::App,
        ContextKind::Team,
        ContextKind::User,
        ContextKind::Pool,
        ContextKind::Iaas,
        ContextKind::Service,
        ContextKind::ServiceInstance,
        ContextKind::Volume,
        ContextKind::Role,
        ContextKind::Router,
        ContextKind::Cluster,
        ContextKind::Webhook,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContextKind::Global => "global",
            ContextKind::App => "app",
            ContextKind::Team => "team",
            ContextKind::User => "user",
            ContextKind::Pool => "pool",
            ContextKind::Iaas => "iaas",
            ContextKind::Service => "service",
            ContextKind::ServiceInstance => "service-instance",
            ContextKind::Volume => "volume",
            ContextKind::Role => "role",
            ContextKind::Router => "router",
            ContextKind::Cluster => "cluster",
            ContextKind::Webhook => "webhook",
        }
    }

    pub fn is_global(self) -> bool {
        self == ContextKind::Global
    }
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContextKind {
    type Err = AuthzError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ContextKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| AuthzError::InvalidContextKind(value.to_string()))
    }
}

/// Scope a grant is restricted to, or a scope a caller asks about.
///
/// # Invariants
/// - `value` is empty for [`ContextKind::Global`] and non-empty otherwise.
///   Deserialization rejects documents that break this.
///
/// # Example
/// ```rust
/// use corral_authz::{ContextKind, PermissionContext};
///
/// let ctx = PermissionContext::new(ContextKind::App, "billing-api");
/// assert_eq!(ctx.value, "billing-api");
/// assert!(!ctx.is_global());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PermissionContextFields")]
pub struct PermissionContext {
    pub kind: ContextKind,
    pub value: String,
}

#[derive(Deserialize)]
struct PermissionContextFields {
    kind: ContextKind,
    #[serde(default)]
    value: String,
}

impl TryFrom<PermissionContextFields> for PermissionContext {
    type Error = AuthzError;

    fn try_from(fields: PermissionContextFields) -> Result<Self, Self::Error> {
        let PermissionContextFields { kind, value } = fields;
        if kind.is_global() != value.is_empty() {
            return Err(AuthzError::InvalidContext(format!("{kind}:{value}")));
        }
        Ok(Self::new(kind, value))
    }
}

impl PermissionContext {
    /// Create a context of `kind` scoped to `value`.
    ///
    /// A global kind drops the value so that the global context has a single
    /// representation.
    pub fn new(kind: ContextKind, value: impl Into<String>) -> Self {
        if kind.is_global() {
            return Self::global();
        }
        Self {
            kind,
            value: value.into(),
        }
    }

    /// The unscoped context.
    pub fn global() -> Self {
        Self {
            kind: ContextKind::Global,
            value: String::new(),
        }
    }

    pub fn team(value: impl Into<String>) -> Self {
        Self::new(ContextKind::Team, value)
    }

    pub fn app(value: impl Into<String>) -> Self {
        Self::new(ContextKind::App, value)
    }

    pub fn is_global(&self) -> bool {
        self.kind.is_global()
    }

    /// Parse a `kind:value` string, or `global`.
    ///
    /// # Errors
    /// - [`AuthzError::InvalidContextKind`] if the kind is unknown.
    /// - [`AuthzError::InvalidContext`] if a scoped kind has no value.
    pub fn parse(value: &str) -> AuthzResult<Self> {
        value.parse()
    }
}

impl std::fmt::Display for PermissionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_global() {
            return f.write_str(ContextKind::Global.as_str());
        }
        write!(f, "{}:{}", self.kind, self.value)
    }
}

impl std::str::FromStr for PermissionContext {
    type Err = AuthzError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // Split on the first colon; values may contain further colons.
        let (kind, rest) = match value.split_once(':') {
            Some((kind, rest)) => (kind, Some(rest)),
            None => (value, None),
        };
        let kind: ContextKind = kind.parse()?;
        if kind.is_global() {
            return match rest {
                None | Some("") => Ok(Self::global()),
                Some(_) => Err(AuthzError::InvalidContext(value.to_string())),
            };
        }
        match rest {
            Some(rest) if !rest.is_empty() => Ok(Self::new(kind, rest)),
            _ => Err(AuthzError::InvalidContext(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_string_roundtrip() {
        for kind in ContextKind::ALL {
            let as_str = kind.as_str();
            assert_eq!(as_str.parse::<ContextKind>().ok(), Some(kind));
            assert_eq!(kind.to_string(), as_str);
        }
    }

    #[test]
    fn kind_from_str_invalid() {
        let err = "galaxy".parse::<ContextKind>().expect_err("unknown kind");
        assert!(matches!(err, AuthzError::InvalidContextKind(_)));
    }

    #[test]
    fn kind_serde_uses_kebab_case() {
        let json = serde_json::to_string(&ContextKind::ServiceInstance).expect("serialize");
        assert_eq!(json, "\"service-instance\"");
    }

    #[test]
    fn global_context_drops_value() {
        let ctx = PermissionContext::new(ContextKind::Global, "ignored");
        assert_eq!(ctx, PermissionContext::global());
        assert!(ctx.value.is_empty());
    }

    #[test]
    fn context_parse_scoped_and_global() {
        let ctx = PermissionContext::parse("team:team1").expect("team ctx");
        assert_eq!(ctx, PermissionContext::team("team1"));

        let ctx = PermissionContext::parse("global").expect("global ctx");
        assert_eq!(ctx, PermissionContext::global());

        let ctx = PermissionContext::parse("router:lb:internal").expect("router ctx");
        assert_eq!(ctx.kind, ContextKind::Router);
        assert_eq!(ctx.value, "lb:internal");
    }

    #[test]
    fn context_deserialize_keeps_single_global_form() {
        let ctx: PermissionContext =
            serde_json::from_str(r#"{"kind":"global"}"#).expect("global");
        assert_eq!(ctx, PermissionContext::global());
        let ctx: PermissionContext =
            serde_json::from_str(r#"{"kind":"team","value":"team1"}"#).expect("team");
        assert_eq!(ctx, PermissionContext::team("team1"));

        let serialized = serde_json::to_string(&PermissionContext::global()).expect("serialize");
        let ctx: PermissionContext = serde_json::from_str(&serialized).expect("roundtrip");
        assert_eq!(ctx, PermissionContext::global());
    }

    #[test]
    fn context_deserialize_rejects_valued_global_and_empty_scope() {
        let err = serde_json::from_str::<PermissionContext>(r#"{"kind":"global","value":"x"}"#)
            .expect_err("valued global");
        assert!(err.to_string().contains("invalid context"));
        assert!(serde_json::from_str::<PermissionContext>(r#"{"kind":"team"}"#).is_err());
        assert!(
            serde_json::from_str::<PermissionContext>(r#"{"kind":"app","value":""}"#).is_err()
        );
    }

    #[test]
    fn context_parse_rejects_missing_value() {
        let err = PermissionContext::parse("team").expect_err("missing value");
        assert!(matches!(err, AuthzError::InvalidContext(_)));
        let err = PermissionContext::parse("app:").expect_err("empty value");
        assert!(matches!(err, AuthzError::InvalidContext(_)));
        let err = PermissionContext::parse("global:x").expect_err("valued global");
        assert!(matches!(err, AuthzError::InvalidContext(_)));
    }
}
