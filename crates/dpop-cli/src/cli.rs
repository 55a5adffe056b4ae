//! CLI argument parsing

use clap::{Args, Parser, Subcommand, ValueEnum};
use dpop_proof::{DEFAULT_MAX_AGE_SECONDS, DEFAULT_MAX_FUTURE_SECONDS, FreshnessWindow};

/// Main CLI application structure
#[derive(Parser, Debug)]
#[command(
    name = "dpop",
    version,
    about = "Inspect and validate OAuth DPoP proofs",
    long_about = "Validates DPoP proofs (RFC 9449) and computes JWK thumbprints (RFC 7638).\n\
                  Positional PROOF/JWK arguments accept `-` to read from stdin.\n\n\
                  Replay of `jti`, the `ath` claim and DPoP nonces are NOT checked."
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a DPoP proof and print its claims
    Validate(ValidateArgs),

    /// Print the SHA-256 thumbprint of a JWK
    Thumbprint(JwkArg),

    /// Print the `cnf` claim binding a token to a JWK
    Confirmation(JwkArg),

    /// Print a JWK as a SubjectPublicKeyInfo PEM document
    Pem(JwkArg),
}

/// Arguments for `validate`
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Proof in compact serialization, or `-` for stdin
    pub proof: String,

    /// Validation time in Unix seconds (defaults to the system clock)
    #[arg(long, env = "DPOP_NOW", allow_hyphen_values = true)]
    pub now: Option<i64>,

    /// Oldest accepted `iat`, in seconds before the validation time
    #[arg(long, env = "DPOP_MAX_AGE_SECONDS", default_value_t = DEFAULT_MAX_AGE_SECONDS)]
    pub max_age: u64,

    /// Newest accepted `iat`, in seconds after the validation time
    #[arg(long, env = "DPOP_MAX_FUTURE_SECONDS", default_value_t = DEFAULT_MAX_FUTURE_SECONDS)]
    pub max_future: u64,

    /// Require the proof key to match this `cnf.jkt`
    #[arg(long)]
    pub jkt: Option<String>,

    /// Require the proof's `htm` to match this request method
    #[arg(long)]
    pub htm: Option<String>,

    /// Require the proof's `htu` to match this request URI
    #[arg(long)]
    pub htu: Option<String>,
}

impl ValidateArgs {
    /// Freshness window from the window options
    #[must_use]
    pub fn window(&self) -> FreshnessWindow {
        FreshnessWindow::new()
            .with_max_age(self.max_age)
            .with_max_future(self.max_future)
    }
}

/// A JWK argument
#[derive(Args, Debug)]
pub struct JwkArg {
    /// JWK as a JSON object, or `-` for stdin
    pub jwk: String,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
}
