//! Signed URLs for objects served by this service (local and memory backends).
//!
//! Token = base64url(expiry_ts (u64 BE) || HMAC-SHA256(secret, expiry_ts || bucket || 0x00 || key)).
//! URL = `{base_url}/{bucket}/{key}?token={token}`.

use crate::traits::{StorageError, StorageResult};
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const EXPIRY_LEN: usize = 8;
const MAC_LEN: usize = 32; // SHA256
const TOKEN_LEN: usize = EXPIRY_LEN + MAC_LEN;

#[derive(Clone)]
pub struct UrlSigner {
    base_url: String,
    secret: Vec<u8>,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UrlSigner {
    pub fn new(base_url: impl Into<String>, secret: &[u8]) -> StorageResult<Self> {
        if secret.is_empty() {
            return Err(StorageError::ConfigError(
                "URL signing secret must not be empty".to_string(),
            ));
        }
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret: secret.to_vec(),
        })
    }

    /// Mint a URL for `(bucket, key)` valid for `expires_in`.
    pub fn sign(&self, bucket: &str, key: &str, expires_in: Duration) -> StorageResult<String> {
        let expiry_ts = SystemTime::now()
            .checked_add(expires_in)
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .ok_or_else(|| StorageError::SigningFailed("Invalid expiry".to_string()))?
            .as_secs();

        let tag = self.mac(expiry_ts, bucket, key)?;
        let mut token_bytes = [0u8; TOKEN_LEN];
        token_bytes[..EXPIRY_LEN].copy_from_slice(&expiry_ts.to_be_bytes());
        token_bytes[EXPIRY_LEN..].copy_from_slice(&tag);
        let token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(token_bytes);

        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        Ok(format!(
            "{}/{}/{}?token={}",
            self.base_url,
            urlencoding::encode(bucket),
            encoded_key,
            token
        ))
    }

    /// Check that `token` was minted for exactly `(bucket, key)` and has not expired.
    pub fn verify(&self, bucket: &str, key: &str, token: &str) -> StorageResult<()> {
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| StorageError::AccessDenied("Malformed access token".to_string()))?;
        if decoded.len() != TOKEN_LEN {
            return Err(StorageError::AccessDenied(
                "Malformed access token".to_string(),
            ));
        }

        let (expiry, tag) = decoded.split_at(EXPIRY_LEN);
        let mut expiry_bytes = [0u8; EXPIRY_LEN];
        expiry_bytes.copy_from_slice(expiry);
        let expiry_ts = u64::from_be_bytes(expiry_bytes);

        self.keyed_mac(expiry_ts, bucket, key)?
            .verify_slice(tag)
            .map_err(|_| StorageError::AccessDenied("Invalid access token".to_string()))?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        if now > expiry_ts {
            return Err(StorageError::AccessDenied(
                "Access token has expired".to_string(),
            ));
        }

        Ok(())
    }

    fn keyed_mac(&self, expiry_ts: u64, bucket: &str, key: &str) -> StorageResult<Hmac<Sha256>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(&expiry_ts.to_be_bytes());
        mac.update(bucket.as_bytes());
        mac.update(&[0]);
        mac.update(key.as_bytes());
        Ok(mac)
    }

    fn mac(&self, expiry_ts: u64, bucket: &str, key: &str) -> StorageResult<[u8; MAC_LEN]> {
        let tag = self.keyed_mac(expiry_ts, bucket, key)?.finalize().into_bytes();
        let mut out = [0u8; MAC_LEN];
        out.copy_from_slice(&tag);
        Ok(out)
    }
}

/// Pull the `token` query parameter out of a signed URL.
pub fn token_from_url(url: &str) -> Option<&str> {
    url.split_once('?')?
        .1
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
}
