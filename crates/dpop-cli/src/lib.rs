//! # DPoP CLI
//!
//! Command-line interface over `dpop-proof`, for checking proofs and keys while
//! integrating a client or an authorization server.
//!
//! ## Usage
//!
//! ```bash
//! # Validate a captured proof at its issue time
//! dpop validate "$PROOF" --now 1670866831
//!
//! # Validate and require a token binding
//! dpop validate "$PROOF" --jkt bbsSdyA_3m_aig3CvdaLcYWvLRg1Yidpym39xpkODxY
//!
//! # Validate against the request the proof arrived with
//! dpop validate "$PROOF" --htm POST --htu https://as.example.com/token
//!
//! # Thumbprint, cnf claim and PEM of a JWK read from stdin
//! echo '{"kty":"EC",...}' | dpop thumbprint -
//! dpop confirmation '{"kty":"EC",...}' --format json
//! dpop pem '{"kty":"RSA",...}'
//! ```

pub mod cli;
pub mod error;
pub mod output;

use std::io::{self, Read, Write};

use clap::Parser;
use dpop_proof::{DpopValidator, Jwk, confirmation, thumbprint, to_pem};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub use cli::{Cli, Commands, OutputFormat};
pub use error::{CliError, CliResult};
use output::{Formatter, ValidationReport};

/// Run the CLI application
///
/// # Errors
///
/// Returns the first failure of the selected command.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut stdout = io::stdout().lock();
    execute(&cli, &mut io::stdin().lock(), &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Execute a parsed command, reading `-` arguments from `input`
///
/// # Errors
///
/// Returns [`CliError`] when input cannot be read, a JWK cannot be parsed, or the
/// proof or key is rejected.
pub fn execute(cli: &Cli, input: &mut impl Read, out: &mut impl Write) -> CliResult<()> {
    let formatter = Formatter::new(cli.format);

    match &cli.command {
        Commands::Validate(args) => {
            let wire = read_argument(&args.proof, input)?;
            let validator = DpopValidator::new().with_window(args.window());
            debug!(window = ?validator.window(), now = ?args.now, "validating proof");

            let proof = match args.now {
                Some(now) => validator.validate(&wire, now)?,
                None => validator.validate_current(&wire)?,
            };
            if let Some(expected) = &args.jkt {
                proof.verify_confirmation(expected)?;
            }
            if args.htm.is_some() || args.htu.is_some() {
                let method = args.htm.as_deref().unwrap_or(&proof.payload.htm);
                let uri = args.htu.as_deref().unwrap_or(&proof.payload.htu);
                proof.verify_http_binding(method, uri)?;
            }
            let report = ValidationReport::new(&proof, proof.confirmation()?);
            formatter.display_report(out, &report)
        }
        Commands::Thumbprint(arg) => {
            let jwk = read_jwk(&arg.jwk, input)?;
            formatter.display_thumbprint(out, &thumbprint(&jwk)?)
        }
        Commands::Confirmation(arg) => {
            let jwk = read_jwk(&arg.jwk, input)?;
            formatter.display_confirmation(out, &confirmation(&jwk)?)
        }
        Commands::Pem(arg) => {
            let jwk = read_jwk(&arg.jwk, input)?;
            formatter.display_pem(out, &to_pem(&jwk)?)
        }
    }
}

/// Logs go to stderr so stdout stays machine readable
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn read_argument(value: &str, input: &mut impl Read) -> CliResult<String> {
    let text = if value == "-" {
        let mut buffer = String::new();
        input.read_to_string(&mut buffer)?;
        buffer
    } else {
        value.to_string()
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(CliError::InvalidArguments("empty input".to_string()));
    }
    Ok(text.to_string())
}

fn read_jwk(value: &str, input: &mut impl Read) -> CliResult<Jwk> {
    let text = read_argument(value, input)?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    Ok(Jwk::from_value(json)?)
}
