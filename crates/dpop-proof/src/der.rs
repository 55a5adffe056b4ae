//! JOSE to ASN.1 DER conversion for ECDSA signatures
//!
//! JWS carries an ECDSA signature as `R || S`, each left-padded to the curve's
//! field size. Verifiers expect `SEQUENCE { INTEGER r, INTEGER s }`.

use crate::{Result, errors::DpopError, types::EcCurve};

const DER_SEQUENCE: u8 = 0x30;
const DER_INTEGER: u8 = 0x02;
/// Long-form length marker for a single length byte
const DER_LENGTH_1: u8 = 0x81;

/// Convert a fixed-width `R || S` signature for `curve` into DER
///
/// Each half is [`EcCurve::component_len`] bytes wide (32, 48 or 66).
///
/// # Errors
///
/// Returns a malformed-signature [`DpopError::SignatureVerification`] if
/// `signature` is not exactly twice the curve's component width.
pub fn jose_to_der(signature: &[u8], curve: EcCurve) -> Result<Vec<u8>> {
    let component_len = curve.component_len();
    let expected = component_len * 2;
    if signature.len() != expected {
        return Err(DpopError::malformed_signature(format!(
            "expected {expected} bytes for {curve}, got {}",
            signature.len()
        )));
    }

    let (r, s) = signature.split_at(component_len);
    let mut body = Vec::with_capacity(signature.len() + 6);
    push_integer(&mut body, r)?;
    push_integer(&mut body, s)?;

    let mut der = Vec::with_capacity(body.len() + 3);
    der.push(DER_SEQUENCE);
    push_length(&mut der, body.len())?;
    der.extend_from_slice(&body);
    Ok(der)
}

/// Minimal unsigned big-endian INTEGER
fn push_integer(out: &mut Vec<u8>, value: &[u8]) -> Result<()> {
    let first = value.iter().position(|&b| b != 0).unwrap_or(value.len());
    let magnitude = &value[first..];

    out.push(DER_INTEGER);
    match magnitude.first() {
        None => {
            out.push(1);
            out.push(0);
        }
        Some(&lead) if lead & 0x80 != 0 => {
            push_length(out, magnitude.len() + 1)?;
            out.push(0);
            out.extend_from_slice(magnitude);
        }
        Some(_) => {
            push_length(out, magnitude.len())?;
            out.extend_from_slice(magnitude);
        }
    }
    Ok(())
}

/// Short form up to 127, `0x81 <len>` up to 255
fn push_length(out: &mut Vec<u8>, len: usize) -> Result<()> {
    let byte = u8::try_from(len).map_err(|_| {
        DpopError::malformed_signature(format!("DER length {len} exceeds 255 bytes"))
    })?;
    if byte > 0x7f {
        out.push(DER_LENGTH_1);
    }
    out.push(byte);
    Ok(())
}
