//! Token signing for CDN playback URLs and upload authorization.
//!
//! Both token kinds are instances of one signing primitive: concatenate the
//! scoping material in a fixed order, digest it, and encode the digest. The
//! verifying backend recomputes the same bytes and compares, so the digest
//! algorithm, concatenation order, and encoding are a wire contract with the
//! CDN provider and must not be changed independently of it.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest as _, Sha256};
use subtle::ConstantTimeEq;
use utoipa::ToSchema;

use crate::error::AppError;

/// Digest algorithm used for a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignatureDigest {
    Md5,
    Sha256,
}

/// Textual encoding of the digest bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignatureEncoding {
    /// Base64 with `+` -> `-`, `/` -> `_` and padding stripped.
    UrlSafeBase64,
    /// Lowercase hexadecimal.
    Hex,
}

/// Digest the concatenation of `parts` and encode the result.
fn compute_signature(
    digest: SignatureDigest,
    encoding: SignatureEncoding,
    parts: &[&str],
) -> String {
    let mut material = String::new();
    for part in parts {
        material.push_str(part);
    }

    let bytes: Vec<u8> = match digest {
        SignatureDigest::Md5 => md5::compute(material.as_bytes()).0.to_vec(),
        SignatureDigest::Sha256 => Sha256::digest(material.as_bytes()).to_vec(),
    };

    match encoding {
        SignatureEncoding::UrlSafeBase64 => URL_SAFE_NO_PAD.encode(&bytes),
        SignatureEncoding::Hex => hex::encode(&bytes),
    }
}

/// A playback URL augmented with a path-scoped, expiring token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignedUrl {
    /// Fully composed URL including `token`, `token_path`, and `expires`.
    pub url: String,
    /// The bare token value.
    pub token: String,
    /// Unix timestamp after which the CDN edge rejects the URL.
    pub expires: i64,
}

/// Signs CDN playback URLs with expiring, path-scoped tokens.
///
/// Token scheme (provider contract): `base64url(md5(security_key +
/// allowed_path + expires))`, appended to the resource URL as
/// `?token=..&token_path=..&expires=..`. Pure computation, no I/O.
#[derive(Clone)]
pub struct UrlSigner {
    security_key: String,
    validity_window_secs: u64,
}

impl UrlSigner {
    pub fn new(security_key: impl Into<String>, validity_window_secs: u64) -> Self {
        Self {
            security_key: security_key.into(),
            validity_window_secs,
        }
    }

    /// Unix timestamp at which a token issued now expires.
    pub fn expiration_timestamp(&self) -> i64 {
        Utc::now().timestamp() + self.validity_window_secs as i64
    }

    /// Sign `resource_url` so it is valid for paths under `allowed_path`
    /// until the configured validity window elapses.
    pub fn sign_url(&self, resource_url: &str, allowed_path: &str) -> SignedUrl {
        self.sign_url_at(resource_url, allowed_path, self.expiration_timestamp())
    }

    /// Deterministic core of [`sign_url`]: identical inputs and `expires`
    /// always produce an identical token.
    pub fn sign_url_at(&self, resource_url: &str, allowed_path: &str, expires: i64) -> SignedUrl {
        let token = self.token_for(allowed_path, expires);
        let url = format!(
            "{}?token={}&token_path={}&expires={}",
            resource_url,
            token,
            urlencoding::encode(allowed_path),
            expires
        );
        SignedUrl {
            url,
            token,
            expires,
        }
    }

    fn token_for(&self, allowed_path: &str, expires: i64) -> String {
        compute_signature(
            SignatureDigest::Md5,
            SignatureEncoding::UrlSafeBase64,
            &[&self.security_key, allowed_path, &expires.to_string()],
        )
    }

    /// Verify a signed URL the way the CDN edge does: re-derive the token
    /// from the URL's own `token_path` and `expires` parameters and compare.
    pub fn verify(&self, signed_url: &str) -> Result<(), AppError> {
        let parsed = url::Url::parse(signed_url)
            .map_err(|e| AppError::SigningInput(format!("invalid URL: {}", e)))?;

        let mut token = None;
        let mut token_path = None;
        let mut expires = None;
        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "token" => token = Some(value.into_owned()),
                "token_path" => token_path = Some(value.into_owned()),
                "expires" => expires = Some(value.into_owned()),
                _ => {}
            }
        }

        let token =
            token.ok_or_else(|| AppError::SigningInput("missing token parameter".into()))?;
        let token_path = token_path
            .ok_or_else(|| AppError::SigningInput("missing token_path parameter".into()))?;
        let expires: i64 = expires
            .ok_or_else(|| AppError::SigningInput("missing expires parameter".into()))?
            .parse()
            .map_err(|_| AppError::SigningInput("invalid expires parameter".into()))?;

        if Utc::now().timestamp() > expires {
            return Err(AppError::SigningInput("URL expired".into()));
        }

        let expected = self.token_for(&token_path, expires);
        if !bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
            return Err(AppError::SigningInput("token mismatch".into()));
        }

        Ok(())
    }
}

/// Short-lived signature authorizing one upload session for one video.
///
/// Scheme (provider contract): lowercase hex of `sha256(library_id +
/// api_key + expires + video_id)`. Issued fresh per attempt; never reuse an
/// authorization across attempts, its validity window is short by design.
#[derive(Debug, Clone)]
pub struct UploadAuthorization {
    pub library_id: String,
    pub video_id: String,
    pub expires: i64,
    pub signature: String,
}

impl UploadAuthorization {
    /// Issue an authorization for `video_id` expiring `validity_window_secs`
    /// from now.
    pub fn issue(
        library_id: &str,
        api_key: &str,
        video_id: &str,
        validity_window_secs: u64,
    ) -> Self {
        let expires = Utc::now().timestamp() + validity_window_secs as i64;
        Self::issue_at(library_id, api_key, video_id, expires)
    }

    /// Deterministic core of [`issue`].
    pub fn issue_at(library_id: &str, api_key: &str, video_id: &str, expires: i64) -> Self {
        let signature = compute_signature(
            SignatureDigest::Sha256,
            SignatureEncoding::Hex,
            &[library_id, api_key, &expires.to_string(), video_id],
        );
        Self {
            library_id: library_id.to_string(),
            video_id: video_id.to_string(),
            expires,
            signature,
        }
    }
}
