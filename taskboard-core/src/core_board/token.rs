//! Signed invite tokens
//!
//! A token is `bs58(claims JSON) "." bs58(ed25519 signature over the JSON)`.
//! Verification checks the signature and the embedded expiry; it never looks
//! at the board, so tampered or stale tokens are rejected before any lookup.

use super::permissions::Role;
use super::types::{BoardId, Timestamp, UserId};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const SEPARATOR: char = '.';

/// Default lifetime of the embedded expiry
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Claims carried by an invite token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteClaims {
    pub board_id: BoardId,
    pub role: Role,
    pub created_by: UserId,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    /// Random, so two links with the same board and role never share a token
    pub nonce: String,
}

/// Token verification errors
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Token signature does not verify")]
    InvalidSignature,

    #[error("Token expired at {0}")]
    Expired(Timestamp),

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Claims encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Issues and verifies invite tokens with a single ed25519 key
#[derive(Clone)]
pub struct InviteTokenSigner {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    ttl: Duration,
}

impl InviteTokenSigner {
    /// Signer with a fresh random key
    pub fn generate(ttl: Duration) -> Self {
        Self::from_seed(&generate_seed(), ttl)
    }

    pub fn from_seed(seed: &[u8; 32], ttl: Duration) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
            ttl,
        }
    }

    /// Signer from a 64 hex digit seed, as stored in configuration
    pub fn from_hex_seed(seed_hex: &str, ttl: Duration) -> Result<Self, TokenError> {
        let bytes = hex::decode(seed_hex.trim()).map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| TokenError::InvalidKey("seed must be 32 bytes".to_string()))?;
        Ok(Self::from_seed(&seed, ttl))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Hex encoded public key, safe to publish
    pub fn verifying_key_hex(&self) -> String {
        hex::encode(self.verifying_key.to_bytes())
    }

    /// Build and sign claims expiring after the configured TTL
    pub fn issue(
        &self,
        board_id: &BoardId,
        role: Role,
        created_by: &UserId,
    ) -> Result<String, TokenError> {
        let issued_at = Timestamp::now();
        let claims = InviteClaims {
            board_id: board_id.clone(),
            role,
            created_by: created_by.clone(),
            issued_at,
            expires_at: issued_at.plus(self.ttl),
            nonce: random_nonce(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &InviteClaims) -> Result<String, TokenError> {
        let payload = serde_json::to_vec(claims)?;
        let signature: Signature = self.signing_key.sign(&payload);

        Ok(format!(
            "{}{}{}",
            bs58::encode(&payload).into_string(),
            SEPARATOR,
            bs58::encode(signature.to_bytes()).into_string()
        ))
    }

    /// Verify signature and embedded expiry against the current time
    pub fn verify(&self, token: &str) -> Result<InviteClaims, TokenError> {
        self.verify_at(token, Timestamp::now())
    }

    pub fn verify_at(&self, token: &str, now: Timestamp) -> Result<InviteClaims, TokenError> {
        let (payload, signature) = split_token(token)?;
        let signature = Signature::from_slice(&signature).map_err(|_| TokenError::Malformed)?;

        self.verifying_key
            .verify(&payload, &signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: InviteClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if now > claims.expires_at {
            return Err(TokenError::Expired(claims.expires_at));
        }

        Ok(claims)
    }
}

impl fmt::Debug for InviteTokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InviteTokenSigner")
            .field("verifying_key", &self.verifying_key_hex())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Read the claims without checking the signature. For diagnostics only.
pub fn decode_unverified(token: &str) -> Result<InviteClaims, TokenError> {
    let (payload, _) = split_token(token)?;
    serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)
}

/// 32 random bytes suitable for [`InviteTokenSigner::from_seed`]
pub fn generate_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    rand::rng().fill_bytes(&mut seed);
    seed
}

fn random_nonce() -> String {
    let mut nonce = [0u8; 16];
    rand::rng().fill_bytes(&mut nonce);
    hex::encode(nonce)
}

fn split_token(token: &str) -> Result<(Vec<u8>, Vec<u8>), TokenError> {
    let (payload, signature) = token.trim().split_once(SEPARATOR).ok_or(TokenError::Malformed)?;
    let payload = bs58::decode(payload)
        .into_vec()
        .map_err(|_| TokenError::Malformed)?;
    let signature = bs58::decode(signature)
        .into_vec()
        .map_err(|_| TokenError::Malformed)?;
    Ok((payload, signature))
}
