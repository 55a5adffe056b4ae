//! Payload claim and freshness checks

use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_MAX_AGE_SECONDS, DEFAULT_MAX_FUTURE_SECONDS, Result,
    errors::{ClaimFailure, DpopError},
    types::ProofPayload,
};

/// Payload claims as presented, before presence and freshness checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofClaims {
    /// JWT ID
    #[serde(default)]
    pub jti: Option<String>,
    /// HTTP method
    #[serde(default)]
    pub htm: Option<String>,
    /// HTTP URI
    #[serde(default)]
    pub htu: Option<String>,
    /// Issued at (Unix seconds)
    #[serde(default)]
    pub iat: Option<i64>,
    /// Access token hash
    #[serde(default)]
    pub ath: Option<String>,
    /// Server nonce
    #[serde(default)]
    pub nonce: Option<String>,
}

/// Acceptance window for `iat`, relative to the validation time
///
/// A proof is fresh when `now - max_age_seconds <= iat <= now + max_future_seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessWindow {
    /// How far in the past `iat` may be
    pub max_age_seconds: u64,
    /// How far in the future `iat` may be (clock skew)
    pub max_future_seconds: u64,
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self {
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
            max_future_seconds: DEFAULT_MAX_FUTURE_SECONDS,
        }
    }
}

impl FreshnessWindow {
    /// Window with the default bounds
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the look-back bound
    #[must_use]
    pub fn with_max_age(mut self, seconds: u64) -> Self {
        self.max_age_seconds = seconds;
        self
    }

    /// Set the look-ahead bound
    #[must_use]
    pub fn with_max_future(mut self, seconds: u64) -> Self {
        self.max_future_seconds = seconds;
        self
    }

    /// Check presence of the required claims and the freshness of `iat`
    ///
    /// # Errors
    ///
    /// Returns [`DpopError::Claim`] with [`ClaimFailure::Missing`] when `jti`,
    /// `htm` or `htu` is absent or empty or `iat` is absent, and
    /// [`ClaimFailure::Stale`] / [`ClaimFailure::NotYetValid`] when `iat` falls
    /// outside the window.
    pub fn check(&self, claims: ProofClaims, now: i64) -> Result<ProofPayload> {
        let jti = required(claims.jti, "jti")?;
        let htm = required(claims.htm, "htm")?;
        let htu = required(claims.htu, "htu")?;
        let iat = claims.iat.ok_or_else(|| DpopError::missing_claim("iat"))?;

        let oldest = now.saturating_sub_unsigned(self.max_age_seconds);
        let newest = now.saturating_add_unsigned(self.max_future_seconds);
        if iat < oldest {
            return Err(DpopError::Claim(ClaimFailure::Stale {
                issued_at: iat,
                now,
                max_age_seconds: self.max_age_seconds,
            }));
        }
        if iat > newest {
            return Err(DpopError::Claim(ClaimFailure::NotYetValid {
                issued_at: iat,
                now,
                max_future_seconds: self.max_future_seconds,
            }));
        }

        Ok(ProofPayload {
            jti,
            htm,
            htu,
            iat,
            ath: claims.ath,
            nonce: claims.nonce,
        })
    }
}

fn required(value: Option<String>, claim: &'static str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DpopError::missing_claim(claim))
}
