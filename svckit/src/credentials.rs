use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

use crate::config::AuthConfig;

/// Supplies the bearer token attached to every API request.
///
/// The transport asks on every call, so a source backed by persistent
/// storage picks up a token that was rotated while the console runs.
pub trait CredentialSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// No credentials; requests go out without an `Authorization` header.
pub struct Anonymous;

impl CredentialSource for Anonymous {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialSource for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Token kept in a file on disk, re-read on every request.
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for TokenFile {
    fn bearer_token(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) => {
                warn!("Cannot read token file {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

/// Builds the credential source described by the auth section of the config.
pub fn from_config(auth: &AuthConfig) -> Arc<dyn CredentialSource> {
    if let Some(token) = auth.token.as_deref().filter(|t| !t.is_empty()) {
        return Arc::new(StaticToken::new(token));
    }
    match &auth.token_file {
        Some(path) => Arc::new(TokenFile::new(path)),
        None => Arc::new(Anonymous),
    }
}
