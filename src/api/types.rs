//! Shared types for the booking API layer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::core_state::CoreState;
use crate::models::enums::Role;
use crate::models::Principal;

// ═══════════════════════════════════════════════════════════
// API context — shared state for the booking router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
/// Wraps `CoreState` plus the credential resolver.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
    pub resolver: Arc<dyn PrincipalResolver>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>, resolver: Arc<dyn PrincipalResolver>) -> Self {
        Self { core, resolver }
    }
}

// ═══════════════════════════════════════════════════════════
// Principal resolution
// ═══════════════════════════════════════════════════════════

/// Turns a presented credential into a caller identity.
///
/// Credential issuance lives outside this service; the resolver only
/// answers "who is this token".
pub trait PrincipalResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Option<Principal>;
}

/// In-memory bearer token table. Only SHA-256 hashes are kept.
#[derive(Default)]
pub struct TokenRegistry {
    tokens: RwLock<HashMap<[u8; 32], Principal>>,
}

/// One entry of the tokens file.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenGrant {
    pub token: String,
    pub user_id: i64,
    pub role: Role,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenFileError {
    #[error("Cannot read tokens file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed tokens file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Empty token for user {0}")]
    EmptyToken(i64),
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load grants from a JSON array of `{token, user_id, role}`.
    pub fn from_file(path: &Path) -> Result<Self, TokenFileError> {
        let raw = std::fs::read_to_string(path).map_err(|source| TokenFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let grants: Vec<TokenGrant> =
            serde_json::from_str(&raw).map_err(|source| TokenFileError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_grants(grants)
    }

    pub fn from_grants(grants: Vec<TokenGrant>) -> Result<Self, TokenFileError> {
        let registry = Self::new();
        for grant in grants {
            if grant.token.trim().is_empty() {
                return Err(TokenFileError::EmptyToken(grant.user_id));
            }
            registry.register(
                &grant.token,
                Principal {
                    user_id: grant.user_id,
                    role: grant.role,
                },
            );
        }
        Ok(registry)
    }

    /// Bind an existing token to `principal`, replacing any previous binding.
    pub fn register(&self, token: &str, principal: Principal) {
        self.write_tokens().insert(hash_token(token), principal);
    }

    pub fn len(&self) -> usize {
        self.read_tokens().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Writers do a single insert, so a poisoned map is still consistent.
    fn read_tokens(&self) -> RwLockReadGuard<'_, HashMap<[u8; 32], Principal>> {
        self.tokens.read().unwrap_or_else(|poisoned| {
            tracing::error!("Token registry lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_tokens(&self) -> RwLockWriteGuard<'_, HashMap<[u8; 32], Principal>> {
        self.tokens.write().unwrap_or_else(|poisoned| {
            tracing::error!("Token registry lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl PrincipalResolver for TokenRegistry {
    fn resolve(&self, token: &str) -> Option<Principal> {
        self.read_tokens().get(&hash_token(token)).copied()
    }
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

// ═══════════════════════════════════════════════════════════
// Response envelope
// ═══════════════════════════════════════════════════════════

/// Success body: a human-readable message plus optional payload.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}
