//! Signature verification against the proof's embedded JWK
//!
//! The public key comes from the header `jwk` only. `RS*` signatures are verified
//! as raw PKCS#1 v1.5 bytes; `ES*` signatures arrive in JOSE form and are
//! converted to DER first.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rsa::{BigUint, RsaPublicKey, pkcs1v15};
use sha2::{Sha256, Sha384, Sha512};
use signature::Verifier;
use tracing::trace;

use crate::{
    Result,
    der::jose_to_der,
    errors::{DpopError, SignatureFailure},
    types::{DpopAlgorithm, EcCurve, EcJwk, Jwk, ProofHeader, RsaJwk},
};

/// Verify `signature` over `signing_input` with the header's algorithm and key
///
/// # Errors
///
/// Returns [`DpopError::SignatureVerification`] with
/// - [`SignatureFailure::UnusableKey`] when the key does not fit the algorithm or
///   its parameters do not form a valid key
/// - [`SignatureFailure::MalformedSignature`] when the signature has the wrong
///   size or encoding
/// - [`SignatureFailure::Mismatch`] when the signature does not verify
pub fn verify(signing_input: &[u8], signature: &[u8], header: &ProofHeader) -> Result<()> {
    let algorithm = header.algorithm;
    match (&header.jwk, algorithm.curve()) {
        (Jwk::Rsa(jwk), None) => verify_rsa(jwk, algorithm, signing_input, signature),
        (Jwk::Ec(jwk), Some(curve)) => verify_ec(jwk, curve, signing_input, signature),
        (jwk, _) => Err(DpopError::unusable_key(format!(
            "{algorithm} cannot be used with a {} key",
            jwk.key_type()
        ))),
    }
}

fn verify_rsa(
    jwk: &RsaJwk,
    algorithm: DpopAlgorithm,
    signing_input: &[u8],
    signature: &[u8],
) -> Result<()> {
    let key = rsa_public_key(jwk).map_err(DpopError::unusable_key)?;
    let signature = pkcs1v15::Signature::try_from(signature)
        .map_err(|e| DpopError::malformed_signature(e.to_string()))?;

    let outcome = match algorithm {
        DpopAlgorithm::RS256 => {
            pkcs1v15::VerifyingKey::<Sha256>::new(key).verify(signing_input, &signature)
        }
        DpopAlgorithm::RS384 => {
            pkcs1v15::VerifyingKey::<Sha384>::new(key).verify(signing_input, &signature)
        }
        DpopAlgorithm::RS512 => {
            pkcs1v15::VerifyingKey::<Sha512>::new(key).verify(signing_input, &signature)
        }
        other => return Err(DpopError::unusable_key(format!("{other} is not an RSA algorithm"))),
    };
    trace!(%algorithm, verified = outcome.is_ok(), "RSA signature check");
    outcome.map_err(|_| DpopError::SignatureVerification(SignatureFailure::Mismatch))
}

fn verify_ec(jwk: &EcJwk, curve: EcCurve, signing_input: &[u8], signature: &[u8]) -> Result<()> {
    let (key_curve, point) = sec1_point(jwk).map_err(DpopError::unusable_key)?;
    if key_curve != curve {
        return Err(DpopError::unusable_key(format!(
            "algorithm requires {curve}, key is on {key_curve}"
        )));
    }
    let der = jose_to_der(signature, curve)?;

    let outcome = match curve {
        EcCurve::P256 => {
            let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(&point)
                .map_err(|e| DpopError::unusable_key(e.to_string()))?;
            let signature = p256::ecdsa::Signature::from_der(&der)
                .map_err(|e| DpopError::malformed_signature(e.to_string()))?;
            key.verify(signing_input, &signature)
        }
        EcCurve::P384 => {
            let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(&point)
                .map_err(|e| DpopError::unusable_key(e.to_string()))?;
            let signature = p384::ecdsa::Signature::from_der(&der)
                .map_err(|e| DpopError::malformed_signature(e.to_string()))?;
            key.verify(signing_input, &signature)
        }
        EcCurve::P521 => {
            let key = p521::ecdsa::VerifyingKey::from_sec1_bytes(&point)
                .map_err(|e| DpopError::unusable_key(e.to_string()))?;
            let signature = p521::ecdsa::Signature::from_der(&der)
                .map_err(|e| DpopError::malformed_signature(e.to_string()))?;
            key.verify(signing_input, &signature)
        }
    };
    trace!(%curve, verified = outcome.is_ok(), "ECDSA signature check");
    outcome.map_err(|_| DpopError::SignatureVerification(SignatureFailure::Mismatch))
}

/// RSA public key from base64url `n` and `e`
pub(crate) fn rsa_public_key(jwk: &RsaJwk) -> std::result::Result<RsaPublicKey, String> {
    let n = decode_member(&jwk.n, "n")?;
    let e = decode_member(&jwk.e, "e")?;
    RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
        .map_err(|err| format!("RSA key rejected: {err}"))
}

/// Uncompressed SEC1 point (`0x04 || x || y`) from base64url coordinates
pub(crate) fn sec1_point(jwk: &EcJwk) -> std::result::Result<(EcCurve, Vec<u8>), String> {
    let curve =
        EcCurve::from_crv(&jwk.crv).ok_or_else(|| format!("unsupported curve '{}'", jwk.crv))?;
    let x = decode_member(&jwk.x, "x")?;
    let y = decode_member(&jwk.y, "y")?;

    let width = curve.component_len();
    if x.len() != width || y.len() != width {
        return Err(format!(
            "{curve} coordinates must be {width} bytes, got x={} y={}",
            x.len(),
            y.len()
        ));
    }

    let mut point = Vec::with_capacity(1 + 2 * width);
    point.push(0x04);
    point.extend_from_slice(&x);
    point.extend_from_slice(&y);
    Ok((curve, point))
}

fn decode_member(value: &str, name: &str) -> std::result::Result<Vec<u8>, String> {
    URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| format!("JWK member '{name}' is not base64url: {e}"))
}
