//! Scheme registry: the arena that owns the permission taxonomy.
//!
//! # Purpose
//! Builds the scheme tree once from a declarative list and answers lookups
//! and hierarchy queries for the lifetime of the process.
//!
//! # Key invariants
//! - The root is implicit, has an empty name, and is always index 0.
//! - Every registry carries a process-unique tag stamped into its ids; ids
//!   with another tag are unknown to it.
//! - Every other node names an already-registered parent.
//! - Full names are unique.
//! - The tree is never mutated after [`SchemeRegistry::build`] returns, so a
//!   shared `&SchemeRegistry` (or `Arc`) is safe to read from any thread.
//!
//! # Common pitfalls
//! - Declaring a child before its parent fails; order declarations top-down.
//! - A malformed declaration list is an initialization error. Callers must
//!   refuse to serve requests rather than fall back to a partial taxonomy.
use crate::scheme::{ContextDeclaration, Scheme, SchemeId, SchemeNode};
use crate::{AuthzError, AuthzResult, ContextKind, Permission};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REGISTRY_TAG: AtomicU64 = AtomicU64::new(1);

/// One entry of the declarative scheme list.
///
/// `parent` is the full name of an earlier declaration; `None` (or the empty
/// string) places the scheme directly under the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub contexts: ContextDeclaration,
}

impl SchemeDeclaration {
    /// Declare a scheme directly under the root.
    pub fn top(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            contexts: ContextDeclaration::Inherit,
        }
    }

    /// Declare a scheme under the scheme whose full name is `parent`.
    pub fn child(parent: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent.into()),
            contexts: ContextDeclaration::Inherit,
        }
    }

    /// Override the inherited contexts with `Global` plus `kinds`.
    pub fn contexts(mut self, kinds: Vec<ContextKind>) -> Self {
        self.contexts = ContextDeclaration::Explicit(kinds);
        self
    }

    /// Override the inherited contexts with `Global` alone.
    pub fn global_only(mut self) -> Self {
        self.contexts = ContextDeclaration::global_only();
        self
    }
}

#[derive(Debug, Clone)]
pub struct SchemeRegistry {
    tag: u64,
    nodes: Vec<SchemeNode>,
    by_name: HashMap<String, SchemeId>,
}

impl SchemeRegistry {
    /// Build the tree from `declarations`, stopping at the first structural
    /// violation.
    ///
    /// # Errors
    /// - [`AuthzError::InvalidSchemeName`] for an empty or malformed segment.
    /// - [`AuthzError::MissingParent`] if a parent was not declared earlier.
    /// - [`AuthzError::DuplicateScheme`] if a full name repeats.
    pub fn build(declarations: impl IntoIterator<Item = SchemeDeclaration>) -> AuthzResult<Self> {
        let tag = NEXT_REGISTRY_TAG.fetch_add(1, Ordering::Relaxed);
        let root = SchemeId {
            registry: tag,
            index: 0,
        };
        let mut registry = Self {
            tag,
            nodes: vec![SchemeNode {
                name: String::new(),
                full_name: String::new(),
                parent: None,
                children: Vec::new(),
                contexts: ContextDeclaration::Inherit,
            }],
            by_name: HashMap::from([(String::new(), root)]),
        };
        for declaration in declarations {
            registry.register(declaration)?;
        }
        tracing::info!(schemes = registry.len(), "permission scheme registry built");
        Ok(registry)
    }

    /// Build the tree from a YAML list of declarations.
    ///
    /// ```rust
    /// use corral_authz::SchemeRegistry;
    ///
    /// let registry = SchemeRegistry::from_yaml(r#"
    /// - name: app
    ///   contexts: [app, team]
    /// - name: deploy
    ///   parent: app
    /// "#).unwrap();
    /// assert!(registry.get("app.deploy").is_some());
    /// ```
    pub fn from_yaml(document: &str) -> AuthzResult<Self> {
        let declarations: Vec<SchemeDeclaration> = serde_yaml::from_str(document)?;
        Self::build(declarations)
    }

    fn register(&mut self, declaration: SchemeDeclaration) -> AuthzResult<SchemeId> {
        let SchemeDeclaration {
            name,
            parent,
            contexts,
        } = declaration;
        if !valid_segment(&name) {
            return Err(AuthzError::InvalidSchemeName(name));
        }
        let parent_name = parent.unwrap_or_default();
        let parent_id = *self
            .by_name
            .get(&parent_name)
            .ok_or_else(|| AuthzError::MissingParent {
                name: name.clone(),
                parent: parent_name.clone(),
            })?;
        let full_name = if parent_name.is_empty() {
            name.clone()
        } else {
            format!("{parent_name}.{name}")
        };
        if self.by_name.contains_key(&full_name) {
            return Err(AuthzError::DuplicateScheme(full_name));
        }

        let id = self.id_at(self.nodes.len());
        self.nodes.push(SchemeNode {
            name,
            full_name: full_name.clone(),
            parent: Some(parent_id),
            children: Vec::new(),
            contexts,
        });
        self.nodes[parent_id.index].children.push(id);
        self.by_name.insert(full_name, id);
        Ok(id)
    }

    pub(crate) fn node(&self, id: SchemeId) -> &SchemeNode {
        &self.nodes[id.index]
    }

    fn id_at(&self, index: usize) -> SchemeId {
        SchemeId {
            registry: self.tag,
            index,
        }
    }

    /// True when `id` was issued by this registry.
    pub fn contains(&self, id: SchemeId) -> bool {
        id.registry == self.tag && id.index < self.nodes.len()
    }

    /// The scheme representing every permission.
    pub fn root(&self) -> Scheme<'_> {
        Scheme {
            registry: self,
            id: self.id_at(0),
        }
    }

    pub fn get(&self, full_name: &str) -> Option<SchemeId> {
        self.by_name.get(full_name).copied()
    }

    /// Resolve a full name to a scheme view.
    ///
    /// # Errors
    /// - [`AuthzError::UnknownScheme`] if no scheme has that full name.
    pub fn lookup(&self, full_name: &str) -> AuthzResult<Scheme<'_>> {
        self.get(full_name)
            .map(|id| Scheme { registry: self, id })
            .ok_or_else(|| AuthzError::UnknownScheme(full_name.to_string()))
    }

    /// View of `id`, or `None` if the id was issued by another registry.
    pub fn scheme(&self, id: SchemeId) -> Option<Scheme<'_>> {
        self.contains(id).then_some(Scheme { registry: self, id })
    }

    /// Every scheme, root first, then in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Scheme<'_>> {
        (0..self.nodes.len()).map(move |index| Scheme {
            registry: self,
            id: self.id_at(index),
        })
    }

    /// Number of schemes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when `ancestor` is `descendant` or one of its ancestors.
    ///
    /// Ids this registry never issued are covered by nothing.
    pub fn covers(&self, ancestor: SchemeId, descendant: SchemeId) -> bool {
        if !self.contains(ancestor) {
            return false;
        }
        let mut current = self.scheme(descendant);
        while let Some(scheme) = current {
            if scheme.id == ancestor {
                return true;
            }
            current = scheme.parent();
        }
        false
    }

    /// Check that a grant names a known scheme and a context kind that scheme
    /// may be restricted to. Used when roles are edited, not when checking.
    ///
    /// # Errors
    /// - [`AuthzError::UnknownScheme`] for a foreign scheme id.
    /// - [`AuthzError::ContextNotAllowed`] for a disallowed context kind.
    pub fn validate_permission(&self, permission: &Permission) -> AuthzResult<()> {
        let scheme = self
            .scheme(permission.scheme)
            .ok_or_else(|| AuthzError::UnknownScheme(format!("#{}", permission.scheme.index())))?;
        if scheme.allowed_contexts().contains(&permission.context.kind) {
            Ok(())
        } else {
            Err(AuthzError::ContextNotAllowed {
                scheme: scheme.full_name().to_string(),
                kind: permission.context.kind.to_string(),
            })
        }
    }
}

// Lowercase ASCII alphanumerics joined by single hyphens.
fn valid_segment(name: &str) -> bool {
    !name.is_empty()
        && name.split('-').all(|part| {
            !part.is_empty()
                && part
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}
