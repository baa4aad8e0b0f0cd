//! Credential store: password hashing and opaque identity tokens.
//!
//! Tokens are random 32-byte values handed to the caller once; only their
//! SHA-256 hashes are kept, each with an expiry. An optional admin token
//! from configuration resolves to `ADMIN_IDENTITY`.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Identity allowed to delete any record.
pub const ADMIN_IDENTITY: i64 = 0;

const PASSWORD_SCHEME: &str = "pbkdf2-sha256";
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

/// Registry size above which expired entries are swept on issue.
const SWEEP_THRESHOLD: usize = 1024;

/// The authenticated subject of a request: a patient SSN or an employee id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(pub i64);

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.0 == ADMIN_IDENTITY
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "identity:{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Malformed password hash")]
    MalformedHash,
    #[error("Internal lock error")]
    LockPoisoned,
}

/// Issues and resolves identity tokens.
pub trait CredentialStore: Send + Sync {
    fn issue_token(&self, subject: i64) -> Result<String, CredentialError>;
    fn resolve(&self, token: &str) -> Option<Identity>;
}

// ═══════════════════════════════════════════════════════════
// Token registry
// ═══════════════════════════════════════════════════════════

#[derive(Debug)]
struct TokenEntry {
    identity: Identity,
    expires_at: Instant,
}

/// In-memory `CredentialStore` keyed by token hash.
pub struct TokenRegistry {
    tokens: RwLock<HashMap<[u8; 32], TokenEntry>>,
    ttl: Duration,
    admin_hash: Option<[u8; 32]>,
}

impl TokenRegistry {
    pub fn new(ttl: Duration, admin_token: Option<&str>) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            ttl,
            admin_hash: admin_token.map(hash_token),
        }
    }

    /// Number of live (unexpired) tokens.
    pub fn active_count(&self) -> usize {
        let now = Instant::now();
        self.tokens
            .read()
            .map(|t| t.values().filter(|e| e.expires_at > now).count())
            .unwrap_or(0)
    }
}

impl CredentialStore for TokenRegistry {
    fn issue_token(&self, subject: i64) -> Result<String, CredentialError> {
        let token = generate_token();
        let mut tokens = self.tokens.write().map_err(|_| CredentialError::LockPoisoned)?;

        if tokens.len() > SWEEP_THRESHOLD {
            let now = Instant::now();
            tokens.retain(|_, e| e.expires_at > now);
        }

        tokens.insert(
            hash_token(&token),
            TokenEntry {
                identity: Identity(subject),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(token)
    }

    fn resolve(&self, token: &str) -> Option<Identity> {
        let hash = hash_token(token);

        if let Some(admin) = &self.admin_hash {
            if admin.as_slice().ct_eq(hash.as_slice()).unwrap_u8() == 1 {
                return Some(Identity(ADMIN_IDENTITY));
            }
        }

        let tokens = self.tokens.read().ok()?;
        tokens
            .get(&hash)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.identity)
    }
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::Digest;
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

// ═══════════════════════════════════════════════════════════
// Passwords
// ═══════════════════════════════════════════════════════════

/// Derive a storable hash: `pbkdf2-sha256$<iterations>$<salt>$<hash>`.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let salt: [u8; SALT_LENGTH] = rand::random();
    let derived = derive(password, &salt, iterations);
    let b64 = base64::engine::general_purpose::STANDARD_NO_PAD;
    format!(
        "{PASSWORD_SCHEME}${iterations}${}${}",
        b64.encode(salt),
        b64.encode(derived)
    )
}

/// Check a password against a hash produced by `hash_password`.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, CredentialError> {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(CredentialError::MalformedHash);
    };
    if scheme != PASSWORD_SCHEME {
        return Err(CredentialError::MalformedHash);
    }

    let iterations: u32 = iterations.parse().map_err(|_| CredentialError::MalformedHash)?;
    let b64 = base64::engine::general_purpose::STANDARD_NO_PAD;
    let salt = b64.decode(salt).map_err(|_| CredentialError::MalformedHash)?;
    let expected = b64.decode(expected).map_err(|_| CredentialError::MalformedHash)?;
    if expected.len() != HASH_LENGTH {
        return Err(CredentialError::MalformedHash);
    }

    let derived = derive(password, &salt, iterations);
    Ok(derived.as_slice().ct_eq(expected.as_slice()).unwrap_u8() == 1)
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}
