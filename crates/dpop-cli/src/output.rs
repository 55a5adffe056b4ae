//! Output formatting

use std::io::Write;

use dpop_proof::{Confirmation, Proof};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliResult;

/// Summary of a validated proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Header `alg`
    pub algorithm: String,
    /// JWK `kty`
    pub key_type: String,
    /// JWT ID
    pub jti: String,
    /// HTTP method
    pub htm: String,
    /// HTTP URI
    pub htu: String,
    /// Issued at
    pub iat: i64,
    /// Access token hash, unverified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ath: Option<String>,
    /// Server nonce, unverified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Confirmation claim for the proof key
    pub cnf: Confirmation,
}

impl ValidationReport {
    /// Build a report for `proof` with its key confirmation
    #[must_use]
    pub fn new(proof: &Proof, cnf: Confirmation) -> Self {
        Self {
            algorithm: proof.header.algorithm.to_string(),
            key_type: proof.header.jwk.key_type().to_string(),
            jti: proof.payload.jti.clone(),
            htm: proof.payload.htm.clone(),
            htu: proof.payload.htu.clone(),
            iat: proof.payload.iat,
            ath: proof.payload.ath.clone(),
            nonce: proof.payload.nonce.clone(),
            cnf,
        }
    }
}

/// Writes command results in the selected format
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Display a validation report
    ///
    /// # Errors
    ///
    /// Fails if writing or serialization fails.
    pub fn display_report(&self, out: &mut impl Write, report: &ValidationReport) -> CliResult<()> {
        match self.format {
            OutputFormat::Json => self.display_json(out, report),
            OutputFormat::Human => {
                writeln!(out, "valid DPoP proof")?;
                writeln!(out, "  alg:      {} ({})", report.algorithm, report.key_type)?;
                writeln!(out, "  jti:      {}", report.jti)?;
                writeln!(out, "  htm:      {}", report.htm)?;
                writeln!(out, "  htu:      {}", report.htu)?;
                writeln!(out, "  iat:      {}", report.iat)?;
                if let Some(ath) = &report.ath {
                    writeln!(out, "  ath:      {ath} (not verified)")?;
                }
                if let Some(nonce) = &report.nonce {
                    writeln!(out, "  nonce:    {nonce} (not verified)")?;
                }
                writeln!(out, "  cnf.jkt:  {}", report.cnf.jkt)?;
                Ok(())
            }
        }
    }

    /// Display a thumbprint
    ///
    /// # Errors
    ///
    /// Fails if writing fails.
    pub fn display_thumbprint(&self, out: &mut impl Write, thumbprint: &str) -> CliResult<()> {
        match self.format {
            OutputFormat::Json => {
                self.display_json(out, &serde_json::json!({ "thumbprint": thumbprint }))
            }
            OutputFormat::Human => Ok(writeln!(out, "{thumbprint}")?),
        }
    }

    /// Display a `cnf` claim, JSON in both formats
    ///
    /// # Errors
    ///
    /// Fails if writing or serialization fails.
    pub fn display_confirmation(&self, out: &mut impl Write, cnf: &Confirmation) -> CliResult<()> {
        self.display_json(out, cnf)
    }

    /// Display a PEM document
    ///
    /// # Errors
    ///
    /// Fails if writing fails.
    pub fn display_pem(&self, out: &mut impl Write, pem: &str) -> CliResult<()> {
        match self.format {
            OutputFormat::Json => self.display_json(out, &serde_json::json!({ "pem": pem })),
            OutputFormat::Human => Ok(write!(out, "{pem}")?),
        }
    }

    fn display_json<T: Serialize + ?Sized>(
        &self,
        out: &mut impl Write,
        value: &T,
    ) -> CliResult<()> {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)?;
        Ok(())
    }
}
