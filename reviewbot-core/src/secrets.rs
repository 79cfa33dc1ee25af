//! Secrets management for reviewbot
//!
//! Secrets are stored separately from configuration to avoid accidental sharing.
//! The secrets file is located at `~/.config/reviewbot/secrets.toml` and must have
//! restrictive permissions (0600 on Unix).
//!
//! Loading priority:
//! 1. Environment variables (the configured token variable, GITHUB_TOKEN by default)
//! 2. Secrets file (~/.config/reviewbot/secrets.toml)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub configuration (PR comments, fallback for inference)
    pub github: TokenSecrets,

    /// Model inference configuration
    pub models: TokenSecrets,
}

/// A section holding a single token
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenSecrets {
    /// Personal Access Token
    pub token: Option<String>,
}

/// Bearer token presented to the inference endpoint
///
/// The token is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token, trimming whitespace and rejecting empty values
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(Error::Authentication(
                "Credential is empty. Provide a token with models:read permission.".to_string(),
            ));
        }
        Ok(Self(token))
    }

    /// The raw token value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        let secrets_path = Self::default_secrets_path();

        if let Some(path) = secrets_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            // group/other bits must be clear
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        for token in [&mut secrets.github.token, &mut secrets.models.token]
            .into_iter()
            .flatten()
        {
            *token = token.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/reviewbot/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reviewbot").join("secrets.toml"))
    }

    /// Resolve the inference credential from the process environment and this file
    ///
    /// Priority: `token_env` env var > `[models] token` > `[github] token`
    pub fn inference_credential(&self, token_env: &str) -> Result<Credential> {
        self.inference_credential_with(token_env, |key| std::env::var(key).ok())
    }

    /// Resolve the inference credential using an arbitrary environment lookup
    pub fn inference_credential_with<F>(&self, token_env: &str, lookup: F) -> Result<Credential>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = non_empty(lookup(token_env)) {
            debug!(var = token_env, "Using inference token from environment");
            return Credential::new(token);
        }

        if let Some(token) = non_empty(self.models.token.clone()) {
            debug!("Using inference token from [models] in secrets file");
            return Credential::new(token);
        }

        if let Some(token) = non_empty(self.github.token.clone()) {
            debug!("Using inference token from [github] in secrets file");
            return Credential::new(token);
        }

        Err(Error::Authentication(format!(
            "Missing {} environment variable. \
             Set it to a GitHub PAT with models:read permission.",
            token_env
        )))
    }

    /// Get GitHub token with environment variable override
    ///
    /// Priority: GITHUB_TOKEN env var > secrets file
    pub fn github_token(&self) -> Option<String> {
        self.github_token_with(|key| std::env::var(key).ok())
    }

    /// Get GitHub token using an arbitrary environment lookup
    pub fn github_token_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = non_empty(lookup("GITHUB_TOKEN")) {
            debug!("Using GitHub token from GITHUB_TOKEN environment variable");
            return Some(token);
        }

        if let Some(token) = non_empty(self.github.token.clone()) {
            debug!("Using GitHub token from secrets file");
            return Some(token);
        }

        None
    }

    /// Create a template secrets file at the default location
    ///
    /// Creates parent directories if needed and sets secure permissions
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::default_secrets_path()
            .ok_or_else(|| Error::Config("Could not determine secrets path".to_string()))?;
        Self::create_template_at(&path)?;
        Ok(path)
    }

    /// Create a template secrets file at `path`
    pub fn create_template_at(path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        // Don't overwrite existing file
        if path.exists() {
            return Err(Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )));
        }

        let template = r#"# reviewbot secrets
# This file contains sensitive credentials - do not share or commit to version control
#
# IMPORTANT: This file must have restrictive permissions (chmod 600)

[models]
# Token used for model inference (needs models:read)
token = ""

[github]
# Token used to post pull request comments; also used for inference
# when [models] token is empty
token = ""
"#;

        std::fs::write(path, template).map_err(Error::Io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms).map_err(Error::Io)?;
        }

        warn!(path = %path.display(), "Created secrets template - please edit and add your tokens");

        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_secrets() {
        let secrets = Secrets::default();
        assert!(secrets.github.token.is_none());
        assert!(secrets.models.token.is_none());
    }

    #[test]
    fn test_parse_secrets() {
        let toml = r#"
[github]
token = "ghp_xxxxxxxxxxxx"

[models]
token = "github_pat_models"
"#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.github.token, Some("ghp_xxxxxxxxxxxx".to_string()));
        assert_eq!(secrets.models.token, Some("github_pat_models".to_string()));
    }

    #[test]
    fn test_credential_trims_and_rejects_empty() {
        assert_eq!(Credential::new("  abc \n").unwrap().expose(), "abc");
        assert!(matches!(Credential::new("   "), Err(Error::Authentication(_))));
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = Credential::new("super-secret").unwrap();
        assert!(!format!("{:?}", cred).contains("super-secret"));
    }

    #[test]
    fn test_inference_credential_priority() {
        let secrets = Secrets {
            github: TokenSecrets {
                token: Some("from_github".to_string()),
            },
            models: TokenSecrets {
                token: Some("from_models".to_string()),
            },
        };

        let env = |k: &str| (k == "MODELS_PAT").then(|| "from_env".to_string());
        assert_eq!(
            secrets.inference_credential_with("MODELS_PAT", env).unwrap().expose(),
            "from_env"
        );
        assert_eq!(
            secrets.inference_credential_with("MODELS_PAT", no_env).unwrap().expose(),
            "from_models"
        );

        let github_only = Secrets {
            github: TokenSecrets {
                token: Some("from_github".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(
            github_only
                .inference_credential_with("MODELS_PAT", no_env)
                .unwrap()
                .expose(),
            "from_github"
        );
    }

    #[test]
    fn test_missing_inference_credential() {
        let err = Secrets::default()
            .inference_credential_with("GITHUB_TOKEN", |_| Some("   ".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
        assert!(err.to_string().contains("GITHUB_TOKEN"));
    }

    #[test]
    fn test_github_token_lookup() {
        let secrets = Secrets {
            github: TokenSecrets {
                token: Some("from_file".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(secrets.github_token_with(no_env), Some("from_file".to_string()));
        assert_eq!(
            secrets.github_token_with(|_| Some("from_env".to_string())),
            Some("from_env".to_string())
        );
        assert_eq!(Secrets::default().github_token_with(no_env), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_permissions_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[github]\ntoken = \"test\"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o644);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let result = Secrets::load_from_file(&file.path().to_path_buf());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("insecure permissions"));
    }

    #[cfg(unix)]
    #[test]
    fn test_secure_permissions_accepted_and_trimmed() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[models]\ntoken = \"  pat_test  \"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let secrets = Secrets::load_from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(secrets.models.token, Some("pat_test".to_string()));
    }

    #[test]
    fn test_create_template_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviewbot").join("secrets.toml");

        Secrets::create_template_at(&path).unwrap();
        assert!(path.exists());
        assert!(Secrets::create_template_at(&path).is_err());

        // template parses, tokens are empty
        let secrets = Secrets::load_from_file(&path).unwrap();
        assert_eq!(secrets.models.token.as_deref(), Some(""));
    }
}
