//! Compact-serialization parsing of DPoP proofs
//!
//! Parsing is structural only: segments, base64url, JSON shape, `typ` and the
//! algorithm allow-list. Signatures and time are checked by [`crate::verify`] and
//! [`crate::claims`].

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::{
    DPOP_JWT_TYPE, Result,
    claims::ProofClaims,
    errors::{DpopError, ProofSegment},
    types::{DpopAlgorithm, Jwk, ProofHeader},
};

/// Header as it appears on the wire, before `typ`/`alg`/`jwk` are checked
#[derive(Deserialize)]
struct RawHeader {
    #[serde(default)]
    alg: String,
    #[serde(default)]
    typ: String,
    jwk: Value,
}

/// A structurally valid proof whose signature has not been checked yet
#[derive(Debug, Clone)]
pub struct ParsedProof {
    /// Checked header
    pub header: ProofHeader,
    /// Payload claims as presented
    pub claims: ProofClaims,
    signing_input: String,
    signature: Vec<u8>,
}

impl ParsedProof {
    /// `base64url(header) "." base64url(payload)` exactly as received
    #[must_use]
    pub fn signing_input(&self) -> &str {
        &self.signing_input
    }

    /// Decoded signature segment
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

/// Parse a DPoP proof from its wire form
///
/// # Errors
///
/// - [`DpopError::MalformedProof`] unless there are exactly three non-empty segments
/// - [`DpopError::MalformedEncoding`] when a segment is not unpadded base64url
/// - [`DpopError::MalformedClaims`] when the header or payload JSON has the wrong shape
/// - [`DpopError::InvalidType`] when `typ` is not `dpop+jwt`
/// - [`DpopError::UnsupportedAlgorithm`] when `alg` is not allowed
/// - [`DpopError::UnsupportedKeyType`] / [`DpopError::InvalidKey`] for an unusable `jwk`
pub fn parse(wire: &str) -> Result<ParsedProof> {
    let parts: Vec<&str> = wire.split('.').collect();
    let [header_b64, payload_b64, signature_b64] = parts[..] else {
        return Err(DpopError::MalformedProof {
            segments: parts.len(),
        });
    };
    if parts.iter().any(|part| part.is_empty()) {
        return Err(DpopError::MalformedProof {
            segments: parts.iter().filter(|part| !part.is_empty()).count(),
        });
    }

    let header_bytes = decode_segment(header_b64, ProofSegment::Header)?;
    let payload_bytes = decode_segment(payload_b64, ProofSegment::Payload)?;
    let signature = decode_segment(signature_b64, ProofSegment::Signature)?;

    let raw: RawHeader = from_json(&header_bytes, ProofSegment::Header)?;
    if raw.typ != DPOP_JWT_TYPE {
        return Err(DpopError::InvalidType { typ: raw.typ });
    }
    let algorithm: DpopAlgorithm = raw.alg.parse()?;
    let jwk = Jwk::from_value(raw.jwk)?;
    trace!(%algorithm, kty = jwk.key_type(), "parsed DPoP header");

    let claims: ProofClaims = from_json(&payload_bytes, ProofSegment::Payload)?;

    Ok(ParsedProof {
        header: ProofHeader {
            algorithm,
            typ: raw.typ,
            jwk,
        },
        claims,
        signing_input: format!("{header_b64}.{payload_b64}"),
        signature,
    })
}

/// Pick the single `DPoP` header value out of everything a request carried
///
/// Identical repeats collapse into one value.
///
/// # Errors
///
/// Returns [`DpopError::ConflictingHeaders`] when more than one distinct value is present.
pub fn select_proof_header<I, S>(values: I) -> Result<Option<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut distinct: Vec<String> = Vec::new();
    for value in values {
        let value = value.as_ref();
        if !distinct.iter().any(|seen| seen == value) {
            distinct.push(value.to_string());
        }
    }

    match distinct.len() {
        0 | 1 => Ok(distinct.pop()),
        count => Err(DpopError::ConflictingHeaders { count }),
    }
}

fn decode_segment(segment: &str, which: ProofSegment) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| DpopError::MalformedEncoding {
            segment: which,
            reason: e.to_string(),
        })
}

fn from_json<T: DeserializeOwned>(bytes: &[u8], which: ProofSegment) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| DpopError::MalformedClaims {
        segment: which,
        reason: e.to_string(),
    })
}
