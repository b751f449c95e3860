//! # Credential Resolver
//!
//! Locates the OpenAI API key from layered sources, in order:
//!
//! 1. an application secrets file (TOML, key `openai_api_key`)
//! 2. the `OPENAI_API_KEY` environment variable
//! 3. a dotenv file containing `OPENAI_API_KEY=<value>`
//!
//! The first non-empty value wins. A key found in one of the files is mirrored
//! into the process environment so anything reading `OPENAI_API_KEY` later sees
//! the same value.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::CredentialError;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Key looked up in the application secrets file.
pub const SECRETS_KEY: &str = "openai_api_key";

/// Default location of the application secrets file.
pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

/// Default location of the dotenv file.
pub const DEFAULT_ENV_FILE: &str = ".env";

// =============================================================================
// CREDENTIAL
// =============================================================================
/// Where a credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOrigin {
    SecretsFile,
    Environment,
    DotenvFile,
}

impl CredentialOrigin {
    /// File-backed origins are mirrored into the process environment.
    fn is_file(&self) -> bool {
        matches!(self, Self::SecretsFile | Self::DotenvFile)
    }
}

/// A resolved API key. `Debug` never prints the key itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    api_key: String,
    origin: CredentialOrigin,
}

impl Credential {
    pub fn new(api_key: impl Into<String>, origin: CredentialOrigin) -> Self {
        Self {
            api_key: api_key.into(),
            origin,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn origin(&self) -> CredentialOrigin {
        self.origin
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &"<redacted>")
            .field("origin", &self.origin)
            .finish()
    }
}

// =============================================================================
// SOURCES
// =============================================================================
/// One layer of the resolver.
pub trait CredentialSource {
    /// Human-readable description used in the "not found" message.
    fn describe(&self) -> String;

    fn origin(&self) -> CredentialOrigin;

    /// Returns the raw value if this source has one. Unreadable sources
    /// return `None`.
    fn lookup(&self) -> Option<String>;
}

/// Application secrets file: `openai_api_key = "sk-..."`.
#[derive(Debug, Clone)]
pub struct SecretsFile {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct SecretsTable {
    openai_api_key: Option<String>,
}

impl SecretsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for SecretsFile {
    fn describe(&self) -> String {
        format!("secrets file {} ({})", self.path.display(), SECRETS_KEY)
    }

    fn origin(&self) -> CredentialOrigin {
        CredentialOrigin::SecretsFile
    }

    fn lookup(&self) -> Option<String> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Secrets file not readable");
                return None;
            }
        };

        match toml::from_str::<SecretsTable>(&contents) {
            Ok(table) => table.openai_api_key,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Secrets file is not valid TOML");
                None
            }
        }
    }
}

/// The `OPENAI_API_KEY` environment variable.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentVariable;

impl CredentialSource for EnvironmentVariable {
    fn describe(&self) -> String {
        format!("environment variable {}", API_KEY_ENV)
    }

    fn origin(&self) -> CredentialOrigin {
        CredentialOrigin::Environment
    }

    fn lookup(&self) -> Option<String> {
        std::env::var(API_KEY_ENV).ok()
    }
}

/// A dotenv file; the first `OPENAI_API_KEY=<value>` line wins.
#[derive(Debug, Clone)]
pub struct DotenvFile {
    path: PathBuf,
}

impl DotenvFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for DotenvFile {
    fn describe(&self) -> String {
        format!("{} file {}", API_KEY_ENV, self.path.display())
    }

    fn origin(&self) -> CredentialOrigin {
        CredentialOrigin::DotenvFile
    }

    fn lookup(&self) -> Option<String> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Dotenv file not readable");
                return None;
            }
        };

        dotenv_key(&contents)
    }
}

/// Value of the first `OPENAI_API_KEY=` line, read literally: no quoting,
/// escaping or `$VAR` expansion.
fn dotenv_key(contents: &str) -> Option<String> {
    let prefix = format!("{}=", API_KEY_ENV);
    contents
        .lines()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .map(|value| value.trim().to_string())
}

// =============================================================================
// RESOLVER
// =============================================================================
/// Tries each source in order and returns the first non-empty key.
pub struct CredentialResolver {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialResolver {
    /// Resolver over explicit sources, tried in the given order.
    pub fn new(sources: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    /// The standard secrets → environment → dotenv chain.
    pub fn standard(secrets_path: impl AsRef<Path>, env_path: impl AsRef<Path>) -> Self {
        Self::new(vec![
            Box::new(SecretsFile::new(secrets_path.as_ref())),
            Box::new(EnvironmentVariable),
            Box::new(DotenvFile::new(env_path.as_ref())),
        ])
    }

    /// Resolve without touching the process environment.
    pub fn find(&self) -> Result<Credential, CredentialError> {
        for source in &self.sources {
            if let Some(value) = source.lookup() {
                let value = value.trim();
                if !value.is_empty() {
                    return Ok(Credential::new(value, source.origin()));
                }
            }
            debug!(source = %source.describe(), "No credential in source");
        }

        let checked = self
            .sources
            .iter()
            .map(|s| s.describe())
            .collect::<Vec<_>>()
            .join(", ");
        Err(CredentialError::NotFound(checked))
    }

    /// Resolve, mirroring file-backed keys into `OPENAI_API_KEY`.
    pub fn resolve(&self) -> Result<Credential, CredentialError> {
        let credential = self.find()?;

        if credential.origin().is_file() {
            std::env::set_var(API_KEY_ENV, credential.api_key());
        }

        info!(origin = ?credential.origin(), "Resolved API credential");
        Ok(credential)
    }
}
