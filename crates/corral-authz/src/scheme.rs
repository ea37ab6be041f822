//! Permission scheme nodes and hierarchy queries.
//!
//! # Purpose
//! A permission scheme is a named node in the permission taxonomy. Holding a
//! scheme authorizes every scheme nested beneath it, and a scheme's declared
//! contexts bound which scopes a grant of it may be restricted to.
//!
//! # How it fits
//! Nodes live in the arena owned by [`SchemeRegistry`](crate::SchemeRegistry)
//! and are addressed by [`SchemeId`]. [`Scheme`] is a borrowed view pairing an
//! id with its registry so hierarchy walks never leave the arena.
//!
//! # Key invariants
//! - The root has an empty name and no parent; every other node has a parent.
//! - Context declarations are tri-state; see [`ContextDeclaration`].
//!
//! # Examples
//! ```rust
//! use corral_authz::{ContextKind, SchemeDeclaration, SchemeRegistry};
//!
//! let registry = SchemeRegistry::build(vec![
//!     SchemeDeclaration::top("app").contexts(vec![ContextKind::App, ContextKind::Team]),
//!     SchemeDeclaration::child("app", "update"),
//!     SchemeDeclaration::child("app.update", "env-set"),
//! ])
//! .unwrap();
//!
//! let scheme = registry.lookup("app.update.env-set").unwrap();
//! assert_eq!(scheme.identifier(), "AppUpdateEnvSet");
//! assert_eq!(
//!     scheme.allowed_contexts(),
//!     vec![ContextKind::Global, ContextKind::App, ContextKind::Team]
//! );
//! ```
use crate::registry::SchemeRegistry;
use crate::ContextKind;
use serde::{Deserialize, Serialize};

/// Stable index of a scheme, tagged with the registry that created it.
///
/// A registry rejects ids carrying another registry's tag, so a grant built
/// against one taxonomy can never be read as a scheme of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemeId {
    pub(crate) registry: u64,
    pub(crate) index: usize,
}

impl SchemeId {
    pub fn index(self) -> usize {
        self.index
    }
}

/// Context declaration carried by a scheme.
///
/// - `Inherit`: defer to the parent's allowed contexts.
/// - `Explicit(vec![])`: allow only `Global`, whatever the ancestors declare.
/// - `Explicit(kinds)`: allow `Global` plus `kinds`, overriding ancestors.
///
/// In declaration documents an absent (or null) `contexts` key is `Inherit`
/// and an empty list is global-only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(
    from = "Option<Vec<ContextKind>>",
    into = "Option<Vec<ContextKind>>"
)]
pub enum ContextDeclaration {
    #[default]
    Inherit,
    Explicit(Vec<ContextKind>),
}

impl ContextDeclaration {
    pub fn global_only() -> Self {
        ContextDeclaration::Explicit(Vec::new())
    }
}

impl From<Option<Vec<ContextKind>>> for ContextDeclaration {
    fn from(value: Option<Vec<ContextKind>>) -> Self {
        match value {
            Some(kinds) => ContextDeclaration::Explicit(kinds),
            None => ContextDeclaration::Inherit,
        }
    }
}

impl From<ContextDeclaration> for Option<Vec<ContextKind>> {
    fn from(value: ContextDeclaration) -> Self {
        match value {
            ContextDeclaration::Inherit => None,
            ContextDeclaration::Explicit(kinds) => Some(kinds),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SchemeNode {
    pub(crate) name: String,
    pub(crate) full_name: String,
    pub(crate) parent: Option<SchemeId>,
    pub(crate) children: Vec<SchemeId>,
    pub(crate) contexts: ContextDeclaration,
}

/// Borrowed view of a scheme node.
#[derive(Clone, Copy)]
pub struct Scheme<'r> {
    pub(crate) registry: &'r SchemeRegistry,
    pub(crate) id: SchemeId,
}

impl<'r> Scheme<'r> {
    fn node(&self) -> &'r SchemeNode {
        self.registry.node(self.id)
    }

    pub fn id(&self) -> SchemeId {
        self.id
    }

    /// The single path segment naming this node; empty for the root.
    pub fn name(&self) -> &'r str {
        &self.node().name
    }

    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    pub fn parent(&self) -> Option<Scheme<'r>> {
        self.node().parent.map(|id| Scheme {
            registry: self.registry,
            id,
        })
    }

    pub fn children(self) -> impl Iterator<Item = Scheme<'r>> {
        let registry = self.registry;
        self.node()
            .children
            .iter()
            .map(move |&id| Scheme { registry, id })
    }

    pub fn declared_contexts(&self) -> &'r ContextDeclaration {
        &self.node().contexts
    }

    /// This scheme followed by each ancestor up to and including the root.
    pub fn ancestors(self) -> impl Iterator<Item = Scheme<'r>> {
        std::iter::successors(Some(self), |scheme| scheme.parent())
    }

    /// Dot-joined segment path from the root, excluding the root itself.
    pub fn full_name(&self) -> &'r str {
        &self.node().full_name
    }

    /// Display form: every hyphen-part of every segment capitalized and
    /// concatenated root-to-leaf, or `All` for the root.
    pub fn identifier(&self) -> String {
        let full_name = self.full_name();
        if full_name.is_empty() {
            return "All".to_string();
        }
        full_name
            .split('.')
            .flat_map(|segment| segment.split('-'))
            .map(capitalize)
            .collect()
    }

    /// Context kinds a grant of this scheme may be restricted to.
    ///
    /// Always starts with `Global`. The closest explicit declaration on the
    /// way to the root supplies the rest; an explicit empty declaration stops
    /// the walk with `Global` alone.
    pub fn allowed_contexts(&self) -> Vec<ContextKind> {
        let mut allowed = vec![ContextKind::Global];
        let declared = self
            .ancestors()
            .find_map(|scheme| match scheme.declared_contexts() {
                ContextDeclaration::Explicit(kinds) => Some(kinds),
                ContextDeclaration::Inherit => None,
            });
        for &kind in declared.into_iter().flatten() {
            if !allowed.contains(&kind) {
                allowed.push(kind);
            }
        }
        allowed
    }

    /// True when `other` is this scheme or nested anywhere beneath it.
    pub fn covers(&self, other: SchemeId) -> bool {
        self.registry.covers(self.id, other)
    }
}

impl std::fmt::Debug for Scheme<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheme")
            .field("id", &self.id)
            .field("full_name", &self.full_name())
            .finish()
    }
}

impl std::fmt::Display for Scheme<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.full_name())
    }
}

impl PartialEq for Scheme<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.registry, other.registry) && self.id == other.id
    }
}

impl Eq for Scheme<'_> {}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
