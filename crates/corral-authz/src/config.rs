// Evaluation settings sourced from environment variables and optional YAML.
use crate::catalog;
use crate::{ContextKind, SchemeDeclaration, SchemeRegistry};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// How a check that names no context is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnscopedCheck {
    /// Only a global grant of a covering scheme satisfies the request.
    #[default]
    GlobalOnly,
    /// A covering grant in any context satisfies the request.
    AnyScope,
}

impl std::str::FromStr for UnscopedCheck {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "global-only" => Ok(UnscopedCheck::GlobalOnly),
            "any-scope" => Ok(UnscopedCheck::AnyScope),
            other => bail!("unknown unscoped check mode: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthzConfig {
    // Answer for checks made without any requested context.
    pub unscoped_check: UnscopedCheck,
    // Context kind the tenant resolver extracts.
    pub tenant_kind: ContextKind,
    // Extra scheme declarations layered under the platform catalog.
    pub schemes_path: Option<PathBuf>,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            unscoped_check: UnscopedCheck::GlobalOnly,
            tenant_kind: ContextKind::Team,
            schemes_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthzConfigOverride {
    unscoped_check: Option<UnscopedCheck>,
    tenant_kind: Option<ContextKind>,
    schemes_path: Option<PathBuf>,
}

impl AuthzConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(value) = std::env::var("CORRAL_AUTHZ_UNSCOPED_CHECK") {
            config.unscoped_check = value
                .parse()
                .with_context(|| "parse CORRAL_AUTHZ_UNSCOPED_CHECK")?;
        }
        if let Ok(value) = std::env::var("CORRAL_AUTHZ_TENANT_KIND") {
            config.tenant_kind = value
                .parse()
                .with_context(|| "parse CORRAL_AUTHZ_TENANT_KIND")?;
        }
        if let Ok(value) = std::env::var("CORRAL_AUTHZ_SCHEMES") {
            config.schemes_path = Some(PathBuf::from(value));
        }
        config.validate()?;
        Ok(config)
    }

    /// Load from the environment, then apply the YAML file at `path` (or at
    /// `CORRAL_AUTHZ_CONFIG` when `path` is `None`).
    pub fn from_env_or_yaml(path: Option<&str>) -> Result<Self> {
        let mut config = Self::from_env()?;
        let path = match path {
            Some(path) => Some(path.to_string()),
            None => std::env::var("CORRAL_AUTHZ_CONFIG").ok(),
        };
        if let Some(path) = path {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read authz config: {path}"))?;
            let override_cfg: AuthzConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse authz config yaml")?;
            if let Some(value) = override_cfg.unscoped_check {
                config.unscoped_check = value;
            }
            if let Some(value) = override_cfg.tenant_kind {
                config.tenant_kind = value;
            }
            if let Some(value) = override_cfg.schemes_path {
                config.schemes_path = Some(value);
            }
            config.validate()?;
        }
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.tenant_kind.is_global() {
            bail!("tenant kind must be a scoped context kind, not global");
        }
        Ok(())
    }

    /// Build the platform registry plus any schemes declared at
    /// `schemes_path`.
    ///
    /// # Errors
    /// Any malformed declaration is fatal; callers must not start serving.
    pub fn registry(&self) -> Result<SchemeRegistry> {
        let mut declarations = catalog::declarations();
        if let Some(path) = &self.schemes_path {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("read scheme declarations: {}", path.display()))?;
            let extra: Vec<SchemeDeclaration> = serde_yaml::from_str(&contents)
                .with_context(|| "parse scheme declarations yaml")?;
            declarations.extend(extra);
        }
        SchemeRegistry::build(declarations).with_context(|| "build permission scheme registry")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn clear_env() {
        unsafe {
            std::env::remove_var("CORRAL_AUTHZ_UNSCOPED_CHECK");
            std::env::remove_var("CORRAL_AUTHZ_TENANT_KIND");
            std::env::remove_var("CORRAL_AUTHZ_SCHEMES");
            std::env::remove_var("CORRAL_AUTHZ_CONFIG");
        }
    }

    #[test]
    #[serial_test::serial]
    fn defaults_without_env() {
        clear_env();
        let config = AuthzConfig::from_env_or_yaml(None).expect("config");
        assert_eq!(config, AuthzConfig::default());
        assert_eq!(config.unscoped_check, UnscopedCheck::GlobalOnly);
        assert_eq!(config.tenant_kind, ContextKind::Team);
    }

    #[test]
    #[serial_test::serial]
    fn env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("CORRAL_AUTHZ_UNSCOPED_CHECK", "any-scope");
            std::env::set_var("CORRAL_AUTHZ_TENANT_KIND", "pool");
            std::env::set_var("CORRAL_AUTHZ_SCHEMES", "/etc/corral/schemes.yaml");
        }
        let config = AuthzConfig::from_env().expect("config");
        clear_env();

        assert_eq!(config.unscoped_check, UnscopedCheck::AnyScope);
        assert_eq!(config.tenant_kind, ContextKind::Pool);
        assert_eq!(
            config.schemes_path,
            Some(PathBuf::from("/etc/corral/schemes.yaml"))
        );
    }

    #[test]
    #[serial_test::serial]
    fn env_rejects_unknown_values() {
        clear_env();
        unsafe {
            std::env::set_var("CORRAL_AUTHZ_UNSCOPED_CHECK", "sometimes");
        }
        assert!(AuthzConfig::from_env().is_err());
        clear_env();

        unsafe {
            std::env::set_var("CORRAL_AUTHZ_TENANT_KIND", "global");
        }
        assert!(AuthzConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn yaml_file_overrides_env() {
        clear_env();
        unsafe {
            std::env::set_var("CORRAL_AUTHZ_TENANT_KIND", "pool");
        }
        let yaml = r#"
unscoped_check: any-scope
tenant_kind: app
"#;
        let mut temp_file = NamedTempFile::new().expect("temp file");
        temp_file.write_all(yaml.as_bytes()).expect("write");
        let path = temp_file.path().to_str().expect("path");

        let config = AuthzConfig::from_env_or_yaml(Some(path)).expect("config");
        clear_env();
        assert_eq!(config.unscoped_check, UnscopedCheck::AnyScope);
        assert_eq!(config.tenant_kind, ContextKind::App);
    }

    #[test]
    #[serial_test::serial]
    fn invalid_yaml_file_returns_error() {
        clear_env();
        let mut temp_file = NamedTempFile::new().expect("temp file");
        temp_file
            .write_all(b"unscoped_check: [invalid\n")
            .expect("write");
        let path = temp_file.path().to_str().expect("path");
        assert!(AuthzConfig::from_env_or_yaml(Some(path)).is_err());
    }

    #[test]
    #[serial_test::serial]
    fn nonexistent_file_returns_error() {
        clear_env();
        assert!(AuthzConfig::from_env_or_yaml(Some("/nonexistent/authz.yaml")).is_err());
    }

    #[test]
    fn registry_appends_declared_schemes() {
        let yaml = r#"
- name: backup
  contexts: [app]
- name: restore
  parent: backup
"#;
        let mut temp_file = NamedTempFile::new().expect("temp file");
        temp_file.write_all(yaml.as_bytes()).expect("write");
        let config = AuthzConfig {
            schemes_path: Some(temp_file.path().to_path_buf()),
            ..AuthzConfig::default()
        };

        let registry = config.registry().expect("registry");
        assert!(registry.get(catalog::APP_DEPLOY).is_some());
        let restore = registry.lookup("backup.restore").expect("restore");
        assert_eq!(
            restore.allowed_contexts(),
            vec![ContextKind::Global, ContextKind::App]
        );
    }

    #[test]
    fn registry_refuses_conflicting_declarations() {
        let yaml = "- name: app\n";
        let mut temp_file = NamedTempFile::new().expect("temp file");
        temp_file.write_all(yaml.as_bytes()).expect("write");
        let config = AuthzConfig {
            schemes_path: Some(temp_file.path().to_path_buf()),
            ..AuthzConfig::default()
        };
        assert!(config.registry().is_err());
    }
}
