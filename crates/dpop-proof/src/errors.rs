//! DPoP-specific error types
//!
//! Every rejection produced by this crate is a [`DpopError`]. Callers decide how a
//! rejection maps onto their protocol (an OAuth server typically answers
//! `invalid_dpop_proof` / 401); nothing in here assumes a transport.

use std::fmt;

/// Which of the three compact-serialization segments an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProofSegment {
    /// First segment, the JOSE header
    Header,
    /// Second segment, the claims set
    Payload,
    /// Third segment, the signature bytes
    Signature,
}

impl fmt::Display for ProofSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Header => "header",
            Self::Payload => "payload",
            Self::Signature => "signature",
        })
    }
}

/// DPoP proof rejection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DpopError {
    /// The wire value is not three non-empty dot-separated segments
    #[error("Malformed DPoP proof: expected 3 non-empty segments, found {segments}")]
    MalformedProof {
        /// Number of segments found
        segments: usize,
    },

    /// A segment is not valid unpadded base64url
    #[error("Malformed base64url in DPoP {segment}: {reason}")]
    MalformedEncoding {
        /// Offending segment
        segment: ProofSegment,
        /// Decoder message
        reason: String,
    },

    /// Header or payload JSON does not have the expected shape
    #[error("Malformed DPoP {segment} claims: {reason}")]
    MalformedClaims {
        /// Offending segment
        segment: ProofSegment,
        /// Deserializer message
        reason: String,
    },

    /// Header `typ` is not `dpop+jwt`
    #[error("Invalid DPoP typ: expected 'dpop+jwt', got '{typ}'")]
    InvalidType {
        /// The `typ` value that was presented
        typ: String,
    },

    /// Header `alg` is outside the allow-list
    #[error("Unsupported DPoP algorithm: {alg}")]
    UnsupportedAlgorithm {
        /// The `alg` value that was presented
        alg: String,
    },

    /// JWK `kty` is neither `EC` nor `RSA`
    #[error("Unsupported JWK key type: {kty}")]
    UnsupportedKeyType {
        /// The `kty` value that was presented
        kty: String,
    },

    /// JWK parameters cannot be turned into a public key
    #[error("Invalid JWK: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },

    /// Signature did not verify against the embedded key
    #[error("DPoP signature verification failed: {0}")]
    SignatureVerification(SignatureFailure),

    /// Payload claim missing or outside the freshness window
    #[error("DPoP claim rejected: {0}")]
    Claim(ClaimFailure),

    /// Proof key thumbprint differs from the token's `cnf.jkt`
    #[error("DPoP key does not match confirmation: expected jkt '{expected}', proof key has '{actual}'")]
    ConfirmationMismatch {
        /// `cnf.jkt` of the access token
        expected: String,
        /// Thumbprint of the proof's JWK
        actual: String,
    },

    /// Proof `htm` or `htu` does not match the request it arrived with
    #[error("DPoP {claim} mismatch: proof has '{proof}', request uses '{request}'")]
    HttpBindingMismatch {
        /// `htm` or `htu`
        claim: &'static str,
        /// Value carried by the proof
        proof: String,
        /// Value of the actual request
        request: String,
    },

    /// More than one distinct DPoP header value was supplied
    #[error("Conflicting DPoP headers: {count} distinct values")]
    ConflictingHeaders {
        /// Number of distinct values
        count: usize,
    },
}

/// Why signature verification failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureFailure {
    /// The key was usable but the signature does not match the signing input
    #[error("signature did not verify")]
    Mismatch,

    /// The key cannot be used with the declared algorithm
    #[error("key or algorithm unusable: {reason}")]
    UnusableKey {
        /// Detail for diagnostics
        reason: String,
    },

    /// Signature bytes have the wrong size or encoding
    #[error("malformed signature: {reason}")]
    MalformedSignature {
        /// Detail for diagnostics
        reason: String,
    },
}

/// Why a payload claim was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimFailure {
    /// A required claim is absent or empty
    #[error("missing or empty `{claim}` claim")]
    Missing {
        /// Claim name
        claim: &'static str,
    },

    /// `iat` is older than the accepted look-back
    #[error("proof issued at {issued_at} is older than {max_age_seconds}s (now {now})")]
    Stale {
        /// Presented `iat`
        issued_at: i64,
        /// Validation time
        now: i64,
        /// Allowed look-back
        max_age_seconds: u64,
    },

    /// `iat` is further in the future than the accepted skew
    #[error("proof issued at {issued_at} is more than {max_future_seconds}s ahead (now {now})")]
    NotYetValid {
        /// Presented `iat`
        issued_at: i64,
        /// Validation time
        now: i64,
        /// Allowed look-ahead
        max_future_seconds: u64,
    },
}

/// Stable classification of a [`DpopError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong number of segments
    MalformedProof,
    /// Bad base64url
    MalformedEncoding,
    /// Bad header or payload JSON
    MalformedClaims,
    /// Wrong `typ`
    InvalidType,
    /// `alg` not allowed
    UnsupportedAlgorithm,
    /// `kty` not supported
    UnsupportedKeyType,
    /// Unusable JWK
    InvalidKey,
    /// Cryptographic failure
    SignatureVerification,
    /// Claim or time-window failure
    Claim,
    /// `cnf.jkt` mismatch
    ConfirmationMismatch,
    /// `htm`/`htu` differ from the request
    HttpBindingMismatch,
    /// Duplicate header values
    ConflictingHeaders,
}

impl DpopError {
    /// Classify the error without its diagnostic payload
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedProof { .. } => ErrorKind::MalformedProof,
            Self::MalformedEncoding { .. } => ErrorKind::MalformedEncoding,
            Self::MalformedClaims { .. } => ErrorKind::MalformedClaims,
            Self::InvalidType { .. } => ErrorKind::InvalidType,
            Self::UnsupportedAlgorithm { .. } => ErrorKind::UnsupportedAlgorithm,
            Self::UnsupportedKeyType { .. } => ErrorKind::UnsupportedKeyType,
            Self::InvalidKey { .. } => ErrorKind::InvalidKey,
            Self::SignatureVerification(_) => ErrorKind::SignatureVerification,
            Self::Claim(_) => ErrorKind::Claim,
            Self::ConfirmationMismatch { .. } => ErrorKind::ConfirmationMismatch,
            Self::HttpBindingMismatch { .. } => ErrorKind::HttpBindingMismatch,
            Self::ConflictingHeaders { .. } => ErrorKind::ConflictingHeaders,
        }
    }

    /// Whether the error means the request itself was malformed
    ///
    /// Only conflicting headers qualify. Every other rejection is a failed
    /// proof of possession.
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::ConflictingHeaders { .. })
    }

    pub(crate) fn unusable_key(reason: impl Into<String>) -> Self {
        Self::SignatureVerification(SignatureFailure::UnusableKey {
            reason: reason.into(),
        })
    }

    pub(crate) fn malformed_signature(reason: impl Into<String>) -> Self {
        Self::SignatureVerification(SignatureFailure::MalformedSignature {
            reason: reason.into(),
        })
    }

    pub(crate) fn missing_claim(claim: &'static str) -> Self {
        Self::Claim(ClaimFailure::Missing { claim })
    }

    pub(crate) fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            reason: reason.into(),
        }
    }
}
