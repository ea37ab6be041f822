use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("invalid scheme name: {0:?}")]
    InvalidSchemeName(String),
    #[error("duplicate scheme: {0}")]
    DuplicateScheme(String),
    #[error("scheme {name} declares missing parent {parent}")]
    MissingParent { name: String, parent: String },
    #[error("unknown scheme: {0}")]
    UnknownScheme(String),
    #[error("invalid context kind: {0}")]
    InvalidContextKind(String),
    #[error("invalid context: {0}")]
    InvalidContext(String),
    #[error("context {kind} is not allowed for scheme {scheme}")]
    ContextNotAllowed { scheme: String, kind: String },
    #[error("failed to retrieve permissions: {0}")]
    PermissionRetrieval(String),
    #[error("ambiguous tenant: a single tenant scope could not be determined")]
    AmbiguousTenant,
    #[error("scheme declarations: {0}")]
    Declarations(#[from] serde_yaml::Error),
}

pub type AuthzResult<T> = Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_variants() {
        let errors = vec![
            AuthzError::InvalidSchemeName("App".to_string()),
            AuthzError::DuplicateScheme("app.update".to_string()),
            AuthzError::MissingParent {
                name: "set".to_string(),
                parent: "app.env".to_string(),
            },
            AuthzError::UnknownScheme("app.nope".to_string()),
            AuthzError::InvalidContextKind("galaxy".to_string()),
            AuthzError::InvalidContext("team".to_string()),
            AuthzError::ContextNotAllowed {
                scheme: "team.create".to_string(),
                kind: "team".to_string(),
            },
            AuthzError::PermissionRetrieval("token expired".to_string()),
            AuthzError::AmbiguousTenant,
        ];

        for error in errors {
            let rendered = error.to_string();
            assert!(!rendered.is_empty());
        }
    }

    #[test]
    fn missing_parent_names_both_sides() {
        let err = AuthzError::MissingParent {
            name: "set".to_string(),
            parent: "app.env".to_string(),
        };
        assert_eq!(err.to_string(), "scheme set declares missing parent app.env");
    }
}
