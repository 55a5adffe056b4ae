//! # DPoP Proof - RFC 9449 proof validation
//!
//! Validation core for OAuth 2.0 DPoP (Demonstrating Proof-of-Possession) proofs.
//! A client signs a short-lived JWT with a private key and embeds the matching public
//! key; the server checks the signature, the claims and the age of the proof, and
//! binds tokens to the key through its RFC 7638 thumbprint (`cnf.jkt`).
//!
//! ## Core Features
//!
//! - **Algorithms** - RS256/RS384/RS512 and ES256/ES384/ES512 (P-256, P-384, P-521)
//! - **Token Binding** - JWK thumbprints and constant-time `cnf.jkt` comparison
//! - **Freshness** - configurable window, 300s back and 30s ahead by default
//! - **Legacy Keys** - PEM export for deprecated raw public-key headers
//!
//! Replay detection of `jti`, `ath` verification and DPoP-Nonce are left to the caller.
//!
//! ## Architecture
//!
//! - `errors` - DPoP-specific error types
//! - `types` - Algorithms, JWKs, header, payload and validated proof
//! - `thumbprint` - Canonical JWK JSON, thumbprints, confirmation claims
//! - `der` - JOSE to DER conversion of ECDSA signatures
//! - `parser` - Compact serialization parsing
//! - `verify` - Signature verification
//! - `claims` - Required claims and the freshness window
//! - `validator` - The validation pipeline
//! - `pem` - PEM export and legacy header comparison
//!
//! ## Example
//!
//! ```no_run
//! use dpop_proof::DpopValidator;
//!
//! # fn main() -> dpop_proof::Result<()> {
//! let header_value = "eyJhbGciOi...";
//! let proof = DpopValidator::new().validate_current(header_value)?;
//! println!("{} {} bound to {}", proof.payload.htm, proof.payload.htu, proof.thumbprint()?);
//! # Ok(())
//! # }
//! ```

pub mod claims;
pub mod der;
pub mod errors;
pub mod parser;
pub mod pem;
pub mod thumbprint;
pub mod types;
pub mod validator;
pub mod verify;

// Re-export core types for convenience
pub use claims::{FreshnessWindow, ProofClaims};
pub use errors::*;
pub use parser::{ParsedProof, parse, select_proof_header};
pub use pem::{decode_legacy_public_key, matches_legacy_public_key, to_pem};
pub use thumbprint::{
    Confirmation, canonical_json, confirmation, thumbprint, thumbprint_json, verify_confirmation,
};
pub use types::*;
pub use validator::{DpopValidator, validate};

/// DPoP result type
pub type Result<T> = std::result::Result<T, DpopError>;

/// DPoP JWT header type as defined in RFC 9449
pub const DPOP_JWT_TYPE: &str = "dpop+jwt";

/// Default look-back for `iat` (5 minutes)
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 300;

/// Default look-ahead for `iat` (clock skew)
pub const DEFAULT_MAX_FUTURE_SECONDS: u64 = 30;
