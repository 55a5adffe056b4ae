//! DPoP proof validation
//!
//! [`DpopValidator`] runs the full pipeline: parse, verify the signature against
//! the embedded key, then check claims against the freshness window. The first
//! failure is returned.

use chrono::Utc;
use tracing::{Level, debug, enabled};

use crate::{
    Result,
    claims::FreshnessWindow,
    parser::parse,
    types::Proof,
    verify::verify,
};

/// Validates DPoP proofs against a freshness window
#[derive(Debug, Clone, Default)]
pub struct DpopValidator {
    window: FreshnessWindow,
}

impl DpopValidator {
    /// Create a validator with the default window (300s back, 30s ahead)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom freshness window
    #[must_use]
    pub fn with_window(mut self, window: FreshnessWindow) -> Self {
        self.window = window;
        self
    }

    /// The configured window
    #[must_use]
    pub fn window(&self) -> &FreshnessWindow {
        &self.window
    }

    /// Validate a proof at `now` (Unix seconds)
    ///
    /// # Errors
    ///
    /// Any parse, signature or claim failure, see [`crate::DpopError`].
    pub fn validate(&self, wire: &str, now: i64) -> Result<Proof> {
        let parsed = parse(wire)?;
        verify(
            parsed.signing_input().as_bytes(),
            parsed.signature(),
            &parsed.header,
        )?;
        let payload = self.window.check(parsed.claims, now)?;

        let proof = Proof {
            header: parsed.header,
            payload,
        };
        if enabled!(Level::DEBUG) {
            debug!(
                algorithm = %proof.header.algorithm,
                kty = proof.header.jwk.key_type(),
                jkt = %proof.thumbprint().unwrap_or_default(),
                jti = %proof.payload.jti,
                htm = %proof.payload.htm,
                "DPoP proof validated"
            );
        }
        Ok(proof)
    }

    /// Validate a proof at the current system time
    ///
    /// # Errors
    ///
    /// Same as [`DpopValidator::validate`].
    pub fn validate_current(&self, wire: &str) -> Result<Proof> {
        self.validate(wire, Utc::now().timestamp())
    }
}

/// Validate a proof at `now` with the default window
///
/// # Errors
///
/// Any parse, signature or claim failure, see [`crate::DpopError`].
pub fn validate(wire: &str, now: i64) -> Result<Proof> {
    DpopValidator::default().validate(wire, now)
}
