//! Anti-forgery tokens for the submission form.
//!
//! A token is `<issued_at>.<nonce>.<signature>` where the signature is the
//! HMAC-SHA256 of `<issued_at>.<nonce>` under the server secret. Tokens are
//! stateless: nothing is stored server-side, so verification only checks the
//! signature and the token age.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::error::CoreError;

type HmacSha256 = Hmac<Sha256>;

/// Name of the hidden form input carrying the token.
pub const FIELD_NAME: &str = "csrf_token";

/// Tokens older than this are rejected (seconds).
pub const DEFAULT_MAX_AGE_SECS: i64 = 3600;

/// Random bytes per token nonce.
const NONCE_BYTES: usize = 16;

/// Generate a random hex secret, used when no `SECRET_KEY` is configured.
pub fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

/// Issues and verifies tokens under one secret.
#[derive(Clone)]
pub struct CsrfSigner {
    secret: Vec<u8>,
    max_age_secs: i64,
}

impl std::fmt::Debug for CsrfSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfSigner")
            .field("max_age_secs", &self.max_age_secs)
            .finish_non_exhaustive()
    }
}

impl CsrfSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            max_age_secs: DEFAULT_MAX_AGE_SECS,
        }
    }

    pub fn with_max_age(mut self, max_age_secs: i64) -> Self {
        self.max_age_secs = max_age_secs;
        self
    }

    /// Issue a token stamped with the current time.
    pub fn issue(&self) -> String {
        self.issue_at(chrono::Utc::now().timestamp())
    }

    fn issue_at(&self, issued_at: i64) -> String {
        let nonce: [u8; NONCE_BYTES] = rand::rng().random();
        let payload = format!("{issued_at}.{}", hex::encode(nonce));
        let signature = hex::encode(self.sign(&payload));
        format!("{payload}.{signature}")
    }

    /// Verify a token's signature and age.
    pub fn verify(&self, token: &str) -> Result<(), CoreError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    fn verify_at(&self, token: &str, now: i64) -> Result<(), CoreError> {
        let invalid = || CoreError::Validation("Invalid or expired form token".into());

        let (payload, signature) = token.rsplit_once('.').ok_or_else(invalid)?;
        let (issued_at, _nonce) = payload.split_once('.').ok_or_else(invalid)?;
        let issued_at: i64 = issued_at.parse().map_err(|_| invalid())?;
        let signature = hex::decode(signature).ok_or_else(invalid)?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).map_err(|_| invalid())?;

        let age = now - issued_at;
        if !(0..=self.max_age_secs).contains(&age) {
            return Err(invalid());
        }
        Ok(())
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }

    fn sign(&self, payload: &str) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

// ---------------------------------------------------------------------------
// hex encoding helper (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string; `None` on odd length or non-hex characters.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 || !s.is_ascii() {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
            .collect()
    }
}
