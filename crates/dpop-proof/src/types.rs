//! Core DPoP types and data structures
//!
//! Algorithms, the embedded public key (JWK), the proof header and payload, and the
//! validated [`Proof`] handed back to callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DpopError;

/// DPoP signature algorithms accepted in the proof header
///
/// RSASSA-PKCS1-v1.5 and ECDSA with SHA-2, per RFC 7518. Anything else
/// (including `none`, HMAC and PSS) is refused at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DpopAlgorithm {
    /// RSASSA-PKCS1-v1.5 with SHA-256
    #[serde(rename = "RS256")]
    RS256,
    /// RSASSA-PKCS1-v1.5 with SHA-384
    #[serde(rename = "RS384")]
    RS384,
    /// RSASSA-PKCS1-v1.5 with SHA-512
    #[serde(rename = "RS512")]
    RS512,
    /// ECDSA over P-256 with SHA-256
    #[serde(rename = "ES256")]
    ES256,
    /// ECDSA over P-384 with SHA-384
    #[serde(rename = "ES384")]
    ES384,
    /// ECDSA over P-521 with SHA-512
    #[serde(rename = "ES512")]
    ES512,
}

impl DpopAlgorithm {
    /// Every algorithm on the allow-list
    pub const ALL: [Self; 6] = [
        Self::RS256,
        Self::RS384,
        Self::RS512,
        Self::ES256,
        Self::ES384,
        Self::ES512,
    ];

    /// Get the algorithm name as specified in RFC 7518
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
        }
    }

    /// True for the `ES*` family
    #[must_use]
    pub fn is_ecdsa(self) -> bool {
        self.curve().is_some()
    }

    /// Curve an `ES*` algorithm is defined over
    #[must_use]
    pub fn curve(self) -> Option<EcCurve> {
        match self {
            Self::ES256 => Some(EcCurve::P256),
            Self::ES384 => Some(EcCurve::P384),
            Self::ES512 => Some(EcCurve::P521),
            Self::RS256 | Self::RS384 | Self::RS512 => None,
        }
    }

    /// Width in bytes of each of R and S in a JOSE ECDSA signature
    #[must_use]
    pub fn ec_component_len(self) -> Option<usize> {
        self.curve().map(EcCurve::component_len)
    }
}

impl fmt::Display for DpopAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DpopAlgorithm {
    type Err = DpopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| DpopError::UnsupportedAlgorithm { alg: s.to_string() })
    }
}

/// NIST curves usable in an `EC` JWK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcCurve {
    /// secp256r1
    P256,
    /// secp384r1
    P384,
    /// secp521r1
    P521,
}

impl EcCurve {
    /// Parse the JWK `crv` member
    #[must_use]
    pub fn from_crv(crv: &str) -> Option<Self> {
        match crv {
            "P-256" => Some(Self::P256),
            "P-384" => Some(Self::P384),
            "P-521" => Some(Self::P521),
            _ => None,
        }
    }

    /// JWK `crv` name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Field element size in bytes (coordinate and signature component width)
    #[must_use]
    pub fn component_len(self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON Web Key representation of a DPoP public key
///
/// Members are kept exactly as received (base64url text), so canonicalization
/// hashes what the client sent. Members other than the essential ones end up in
/// `other` and are re-emitted on serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kty")]
pub enum Jwk {
    /// Elliptic Curve public key
    #[serde(rename = "EC")]
    Ec(EcJwk),

    /// RSA public key
    #[serde(rename = "RSA")]
    Rsa(RsaJwk),
}

/// `EC` key members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcJwk {
    /// Curve name, e.g. `P-256`
    pub crv: String,
    /// X coordinate (base64url)
    pub x: String,
    /// Y coordinate (base64url)
    pub y: String,
    /// Unrecognized members (`kid`, `use`, `alg`, ...)
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// `RSA` key members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaJwk {
    /// Public exponent (base64url)
    pub e: String,
    /// Modulus (base64url)
    pub n: String,
    /// Unrecognized members (`kid`, `use`, `alg`, ...)
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Jwk {
    /// Build a JWK from an untyped JSON object
    ///
    /// # Errors
    ///
    /// [`DpopError::UnsupportedKeyType`] when `kty` is present but neither `EC`
    /// nor `RSA`; [`DpopError::InvalidKey`] when the value is not an object, `kty`
    /// is missing, or a required member is missing or not a string.
    pub fn from_value(value: Value) -> crate::Result<Self> {
        let Value::Object(members) = value else {
            return Err(DpopError::invalid_key("JWK must be a JSON object"));
        };
        let kty = match members.get("kty") {
            Some(Value::String(kty)) => kty.clone(),
            Some(_) => return Err(DpopError::invalid_key("JWK kty must be a string")),
            None => return Err(DpopError::invalid_key("JWK is missing kty")),
        };
        let result = match kty.as_str() {
            "EC" | "RSA" => serde_json::from_value(Value::Object(members)),
            _ => return Err(DpopError::UnsupportedKeyType { kty }),
        };
        result.map_err(|e| DpopError::invalid_key(format!("{kty} JWK: {e}")))
    }

    /// The `kty` member
    #[must_use]
    pub fn key_type(&self) -> &'static str {
        match self {
            Self::Ec(_) => "EC",
            Self::Rsa(_) => "RSA",
        }
    }

    /// Thumbprint per RFC 7638, see [`crate::thumbprint::thumbprint`]
    ///
    /// # Errors
    ///
    /// Fails only if canonical serialization fails.
    pub fn thumbprint(&self) -> crate::Result<String> {
        crate::thumbprint::thumbprint(self)
    }
}

impl TryFrom<Value> for Jwk {
    type Error = DpopError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// DPoP JWT header as defined in RFC 9449
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProofHeader {
    /// Signature algorithm
    #[serde(rename = "alg")]
    pub algorithm: DpopAlgorithm,

    /// JWT type, always `dpop+jwt` once parsed
    #[serde(rename = "typ")]
    pub typ: String,

    /// Public key the proof was signed with
    #[serde(rename = "jwk")]
    pub jwk: Jwk,
}

/// Validated DPoP JWT payload as defined in RFC 9449
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPayload {
    /// JWT ID, unique per proof
    #[serde(rename = "jti")]
    pub jti: String,

    /// HTTP method the proof was created for
    #[serde(rename = "htm")]
    pub htm: String,

    /// HTTP URI the proof was created for
    #[serde(rename = "htu")]
    pub htu: String,

    /// Issued at (Unix seconds)
    #[serde(rename = "iat")]
    pub iat: i64,

    /// Access token hash; carried but not verified
    #[serde(rename = "ath", skip_serializing_if = "Option::is_none")]
    pub ath: Option<String>,

    /// Server-provided nonce; carried but not verified
    #[serde(rename = "nonce", skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// A DPoP proof that passed parsing, signature and claim validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Proof {
    /// JWT header
    pub header: ProofHeader,

    /// JWT payload
    pub payload: ProofPayload,
}

impl Proof {
    /// JWK thumbprint of the key that signed this proof
    ///
    /// # Errors
    ///
    /// Fails only if canonical serialization fails.
    pub fn thumbprint(&self) -> crate::Result<String> {
        self.header.jwk.thumbprint()
    }

    /// `cnf` claim value binding a token to this proof's key
    ///
    /// # Errors
    ///
    /// Fails only if canonical serialization fails.
    pub fn confirmation(&self) -> crate::Result<crate::thumbprint::Confirmation> {
        crate::thumbprint::confirmation(&self.header.jwk)
    }

    /// Check that this proof was signed by the key a token is bound to
    ///
    /// # Errors
    ///
    /// [`DpopError::ConfirmationMismatch`] when `expected_jkt` is not this
    /// proof's key thumbprint.
    pub fn verify_confirmation(&self, expected_jkt: &str) -> crate::Result<()> {
        crate::thumbprint::verify_confirmation(&self.header.jwk, expected_jkt)
    }

    /// Check that this proof was created for the request it arrived with
    ///
    /// The method compares case-insensitively, the URI exactly. Callers strip
    /// query and fragment (and any ingress prefix) from `uri` first.
    ///
    /// # Errors
    ///
    /// [`DpopError::HttpBindingMismatch`] naming the first claim that differs.
    pub fn verify_http_binding(&self, method: &str, uri: &str) -> crate::Result<()> {
        if !self.payload.htm.eq_ignore_ascii_case(method) {
            return Err(DpopError::HttpBindingMismatch {
                claim: "htm",
                proof: self.payload.htm.clone(),
                request: method.to_string(),
            });
        }
        if self.payload.htu != uri {
            return Err(DpopError::HttpBindingMismatch {
                claim: "htu",
                proof: self.payload.htu.clone(),
                request: uri.to_string(),
            });
        }
        Ok(())
    }
}
