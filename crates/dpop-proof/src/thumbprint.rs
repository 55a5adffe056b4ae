//! JWK thumbprints (RFC 7638) and `cnf` key confirmation
//!
//! The canonical form keeps only the required members of a key, in lexicographic
//! order, serialized without whitespace. Member values are the base64url strings
//! exactly as received, so two encodings of the same key with different member
//! order or extra members hash identically.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::{
    Result,
    errors::DpopError,
    types::{EcJwk, Jwk, RsaJwk},
};

/// Required `EC` members in lexicographic order
#[derive(Serialize)]
struct CanonicalEc<'a> {
    crv: &'a str,
    kty: &'static str,
    x: &'a str,
    y: &'a str,
}

/// Required `RSA` members in lexicographic order
#[derive(Serialize)]
struct CanonicalRsa<'a> {
    e: &'a str,
    kty: &'static str,
    n: &'a str,
}

/// Confirmation (`cnf`) claim binding an access token to a DPoP key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// JWK SHA-256 thumbprint
    pub jkt: String,
}

/// Canonical JSON text of a JWK's required members
///
/// # Errors
///
/// Returns [`DpopError::InvalidKey`] if serialization fails.
pub fn canonical_json(jwk: &Jwk) -> Result<String> {
    let json = match jwk {
        Jwk::Ec(EcJwk { crv, x, y, .. }) => serde_json::to_string(&CanonicalEc {
            crv,
            kty: "EC",
            x,
            y,
        }),
        Jwk::Rsa(RsaJwk { e, n, .. }) => serde_json::to_string(&CanonicalRsa { e, kty: "RSA", n }),
    };
    json.map_err(|e| DpopError::invalid_key(format!("canonical serialization failed: {e}")))
}

/// SHA-256 JWK thumbprint, base64url without padding
///
/// # Errors
///
/// Returns [`DpopError::InvalidKey`] if serialization fails.
pub fn thumbprint(jwk: &Jwk) -> Result<String> {
    let canonical = canonical_json(jwk)?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(digest))
}

/// Thumbprint of an untyped JWK object
///
/// # Errors
///
/// [`DpopError::UnsupportedKeyType`] for a `kty` other than `EC`/`RSA`,
/// [`DpopError::InvalidKey`] when required members are absent.
pub fn thumbprint_json(jwk: &Value) -> Result<String> {
    thumbprint(&Jwk::from_value(jwk.clone())?)
}

/// `cnf` claim for tokens bound to `jwk`
///
/// # Errors
///
/// Returns [`DpopError::InvalidKey`] if serialization fails.
pub fn confirmation(jwk: &Jwk) -> Result<Confirmation> {
    Ok(Confirmation {
        jkt: thumbprint(jwk)?,
    })
}

/// Compare `expected_jkt` against the thumbprint of `jwk` in constant time
///
/// # Errors
///
/// Returns [`DpopError::ConfirmationMismatch`] when they differ.
pub fn verify_confirmation(jwk: &Jwk, expected_jkt: &str) -> Result<()> {
    let actual = thumbprint(jwk)?;
    if bool::from(actual.as_bytes().ct_eq(expected_jkt.as_bytes())) {
        Ok(())
    } else {
        Err(DpopError::ConfirmationMismatch {
            expected: expected_jkt.to_string(),
            actual,
        })
    }
}
