//! Session token codec
//!
//! Tokens are compact HS256 JWTs. The subject is the identity id, a custom
//! `handle` claim carries the handle, and `iat`/`exp` are absolute UNIX
//! timestamps. A token is valid iff its MAC verifies under the process key
//! and it has not expired; there is no server-side session state.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hkdf::Hkdf;
use jwt_simple::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::config::AuthConfig;
use crate::{FlipstockError, Handle, Identity, IdentityId, Result};
use secrecy::ExposeSecret;

/// Tokens longer than this are rejected before any parsing
pub const MAX_TOKEN_LEN: usize = 4096;

const KEY_INFO: &[u8] = b"flipstock/session-token/hs256";

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub identity_id: IdentityId,
    pub handle: Handle,
    /// Seconds since the epoch
    pub issued_at: u64,
    /// Seconds since the epoch
    pub expires_at: u64,
}

impl SessionClaims {
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at
    }
}

/// Custom part of the JWT payload
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HandleClaim {
    handle: String,
}

/// Signed bearer credential handed to clients
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Current wall-clock time in whole seconds since the epoch
pub fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| FlipstockError::Internal(format!("system clock before epoch: {}", e)))
}

/// Encodes and verifies session tokens with a process-wide key
#[derive(Clone)]
pub struct TokenCodec {
    key: HS256Key,
    ttl_secs: u64,
}

impl TokenCodec {
    /// Derive the MAC key from the configured signing secret
    pub fn new(signing_secret: &[u8], ttl: std::time::Duration) -> Result<Self> {
        if signing_secret.is_empty() {
            return Err(FlipstockError::Config("signing secret is empty".to_string()));
        }
        if ttl.as_secs() == 0 {
            return Err(FlipstockError::Config(
                "token ttl must be at least one second".to_string(),
            ));
        }

        let mut okm = [0u8; 32];
        Hkdf::<Sha256>::new(None, signing_secret)
            .expand(KEY_INFO, &mut okm)
            .map_err(|e| FlipstockError::Internal(format!("key derivation failed: {}", e)))?;

        Ok(TokenCodec {
            key: HS256Key::from_bytes(&okm),
            ttl_secs: ttl.as_secs(),
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Self::new(
            config.signing_secret.expose_secret().as_bytes(),
            config.token_ttl,
        )
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Claims for a session starting at `now`
    pub fn claims_for(&self, identity: &Identity, now: u64) -> SessionClaims {
        SessionClaims {
            identity_id: identity.id,
            handle: identity.handle.clone(),
            issued_at: now,
            expires_at: now.saturating_add(self.ttl_secs),
        }
    }

    /// Issue a token for `identity` valid from now for the configured ttl
    pub fn issue(&self, identity: &Identity) -> Result<SessionToken> {
        let claims = self.claims_for(identity, unix_now()?);
        self.encode(&claims)
    }

    /// Sign the given claims as-is
    pub fn encode(&self, claims: &SessionClaims) -> Result<SessionToken> {
        let custom = HandleClaim {
            handle: claims.handle.as_str().to_string(),
        };

        let mut jwt_claims = Claims::with_custom_claims(custom, Duration::from_secs(self.ttl_secs))
            .with_subject(claims.identity_id.to_string());
        jwt_claims.issued_at = Some(UnixTimeStamp::from_secs(claims.issued_at));
        jwt_claims.expires_at = Some(UnixTimeStamp::from_secs(claims.expires_at));
        jwt_claims.invalid_before = None;

        let token = self
            .key
            .authenticate(jwt_claims)
            .map_err(|e| FlipstockError::Internal(format!("token signing failed: {}", e)))?;

        Ok(SessionToken(token))
    }

    /// Verify a token against the current time.
    ///
    /// The clock is read exactly once per call.
    pub fn decode(&self, token: &str) -> Result<SessionClaims> {
        let now = unix_now()?;
        self.decode_at(token, now)
    }

    /// Verify a token as of `now` (seconds since the epoch).
    ///
    /// Every failure collapses to `InvalidToken`.
    pub fn decode_at(&self, token: &str, now: u64) -> Result<SessionClaims> {
        self.verify_at(token, now).map_err(|reason| {
            debug!(reason, "session token rejected");
            FlipstockError::InvalidToken
        })
    }

    fn verify_at(&self, token: &str, now: u64) -> std::result::Result<SessionClaims, &'static str> {
        if token.is_empty() || token.len() > MAX_TOKEN_LEN {
            return Err("bad length");
        }
        if !is_canonical_compact(token) {
            return Err("malformed structure");
        }

        let options = VerificationOptions {
            accept_future: true,
            time_tolerance: Some(Duration::from_secs(0)),
            artificial_time: Some(UnixTimeStamp::from_secs(now)),
            max_token_length: Some(MAX_TOKEN_LEN),
            ..Default::default()
        };

        let verified = self
            .key
            .verify_token::<HandleClaim>(token, Some(options))
            .map_err(|_| "signature or claims rejected")?;

        let issued_at = verified.issued_at.ok_or("missing iat")?.as_secs();
        let expires_at = verified.expires_at.ok_or("missing exp")?.as_secs();
        let subject = verified.subject.ok_or("missing sub")?;
        let identity_id = subject
            .parse::<IdentityId>()
            .map_err(|_| "malformed sub")?;
        let handle = Handle::new(&verified.custom.handle).map_err(|_| "malformed handle")?;

        let claims = SessionClaims {
            identity_id,
            handle,
            issued_at,
            expires_at,
        };

        if claims.is_expired_at(now) {
            return Err("expired");
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

/// Three base64url segments, each canonically encoded (no padding, no stray
/// trailing bits), so that distinct strings never verify as the same token.
fn is_canonical_compact(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    segments.len() == 3
        && segments
            .iter()
            .all(|seg| !seg.is_empty() && URL_SAFE_NO_PAD.decode(seg).is_ok())
}
