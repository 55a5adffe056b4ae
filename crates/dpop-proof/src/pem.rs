//! PEM export of JWKs and the legacy public-key header
//!
//! Older clients send their raw public key as PEM (optionally base64 wrapped)
//! instead of a DPoP proof. These helpers let an integration compare that value
//! with a JWK.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rsa::pkcs8::{EncodePublicKey, LineEnding};

use crate::{
    Result,
    errors::DpopError,
    types::{EcCurve, Jwk},
    verify::{rsa_public_key, sec1_point},
};

/// Prefix of a base64-encoded PEM document (`base64("---")`)
const WRAPPED_PEM_PREFIX: &str = "LS0";

/// Render a JWK as a SubjectPublicKeyInfo PEM document
///
/// Lines are LF terminated, including the last one.
///
/// # Errors
///
/// Returns [`DpopError::InvalidKey`] when the JWK parameters do not form a valid
/// public key.
pub fn to_pem(jwk: &Jwk) -> Result<String> {
    let encoded = match jwk {
        Jwk::Rsa(rsa) => rsa_public_key(rsa)
            .map_err(DpopError::invalid_key)?
            .to_public_key_pem(LineEnding::LF),
        Jwk::Ec(ec) => {
            let (curve, point) = sec1_point(ec).map_err(DpopError::invalid_key)?;
            let invalid_point = |e: p256::elliptic_curve::Error| {
                DpopError::invalid_key(format!("{curve} point rejected: {e}"))
            };
            match curve {
                EcCurve::P256 => p256::PublicKey::from_sec1_bytes(&point)
                    .map_err(invalid_point)?
                    .to_public_key_pem(LineEnding::LF),
                EcCurve::P384 => p384::PublicKey::from_sec1_bytes(&point)
                    .map_err(invalid_point)?
                    .to_public_key_pem(LineEnding::LF),
                EcCurve::P521 => p521::PublicKey::from_sec1_bytes(&point)
                    .map_err(invalid_point)?
                    .to_public_key_pem(LineEnding::LF),
            }
        }
    };

    let mut pem = encoded.map_err(|e| DpopError::invalid_key(format!("PEM encoding failed: {e}")))?;
    if !pem.ends_with('\n') {
        pem.push('\n');
    }
    Ok(pem)
}

/// Unwrap a legacy public-key header value into PEM text
///
/// Values starting with `LS0` are standard base64 of the PEM document; anything
/// else is taken as PEM already.
///
/// # Errors
///
/// Returns [`DpopError::InvalidKey`] when a wrapped value is not valid base64 or
/// not UTF-8.
pub fn decode_legacy_public_key(value: &str) -> Result<String> {
    let value = value.trim();
    if !value.starts_with(WRAPPED_PEM_PREFIX) {
        return Ok(value.to_string());
    }
    let bytes = STANDARD
        .decode(value)
        .map_err(|e| DpopError::invalid_key(format!("legacy key header is not base64: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| DpopError::invalid_key(format!("legacy key header is not UTF-8: {e}")))
}

/// Whether a legacy public-key header carries the same key as `jwk`
///
/// Line endings and trailing whitespace are not significant.
///
/// # Errors
///
/// Returns [`DpopError::InvalidKey`] when `jwk` cannot be rendered or the header
/// cannot be decoded.
pub fn matches_legacy_public_key(jwk: &Jwk, value: &str) -> Result<bool> {
    let expected = to_pem(jwk)?;
    let presented = decode_legacy_public_key(value)?;
    Ok(normalize(&expected) == normalize(&presented))
}

fn normalize(pem: &str) -> String {
    pem.replace("\r\n", "\n").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use pretty_assertions::assert_eq;
    use rand::rngs::OsRng;
    use rsa::pkcs8::DecodePublicKey;
    use serde_json::json;

    const EC_PEM: &str = "-----BEGIN PUBLIC KEY-----
MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEl8tFrhx+34tV3hRICRDY9zCkDlpB
hF42UQUfWVAWBFv1UTiN/86T+jrjNtNOVy40lqMea3q/1MNWtTQJ28ZEMA==
-----END PUBLIC KEY-----
";

    const RSA_PEM: &str = "-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEA0vx7agoebGcQSuuPiLJX
ZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tS
oc/BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ/2W+5JsGY4Hc5n9yBXArwl93lqt
7/RN5w6Cf0h4QyQ5v+65YGjQR0/FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0
zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt+bFTWhAI4vMQFh6WeZu0f
M4lFd2NcRwr3XPksINHaQ+G/xBniIqbw0Ls1jF44+csFCur+kEgU8awapJzKnqDK
gwIDAQAB
-----END PUBLIC KEY-----
";

    fn ec_key() -> Jwk {
        Jwk::from_value(json!({
            "kty": "EC",
            "crv": "P-256",
            "x": "l8tFrhx-34tV3hRICRDY9zCkDlpBhF42UQUfWVAWBFs",
            "y": "9VE4jf_Ok_o64zbTTlcuNJajHmt6v9TDVrU0CdvGRDA"
        }))
        .unwrap()
    }

    fn rsa_key() -> Jwk {
        Jwk::from_value(json!({
            "kty": "RSA",
            "n": "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw",
            "e": "AQAB",
            "alg": "RS256",
            "kid": "2011-04-29"
        }))
        .unwrap()
    }

    #[test]
    fn test_ec_pem() {
        assert_eq!(to_pem(&ec_key()).unwrap(), EC_PEM);
    }

    #[test]
    fn test_rsa_pem() {
        assert_eq!(to_pem(&rsa_key()).unwrap(), RSA_PEM);
    }

    fn generated_ec_key(crv: &str, x: &[u8], y: &[u8]) -> Jwk {
        Jwk::from_value(json!({
            "kty": "EC",
            "crv": crv,
            "x": URL_SAFE_NO_PAD.encode(x),
            "y": URL_SAFE_NO_PAD.encode(y)
        }))
        .unwrap()
    }

    fn assert_spki_framing(pem: &str) {
        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----\n"));
        assert!(pem.ends_with("-----END PUBLIC KEY-----\n"));
        assert!(!pem.contains('\r'));
        assert!(pem.lines().all(|line| line.len() <= 64));
    }

    #[test]
    fn test_p384_pem_parses_back() {
        use p384::elliptic_curve::sec1::ToEncodedPoint;

        let public = p384::SecretKey::random(&mut OsRng).public_key();
        let point = public.to_encoded_point(false);
        let jwk = generated_ec_key("P-384", point.x().unwrap(), point.y().unwrap());

        let pem = to_pem(&jwk).unwrap();
        assert_spki_framing(&pem);
        assert_eq!(p384::PublicKey::from_public_key_pem(&pem).unwrap(), public);
    }

    #[test]
    fn test_p521_pem_parses_back() {
        use p521::elliptic_curve::sec1::ToEncodedPoint;

        let public = p521::SecretKey::random(&mut OsRng).public_key();
        let point = public.to_encoded_point(false);
        let jwk = generated_ec_key("P-521", point.x().unwrap(), point.y().unwrap());

        let pem = to_pem(&jwk).unwrap();
        assert_spki_framing(&pem);
        assert_eq!(p521::PublicKey::from_public_key_pem(&pem).unwrap(), public);
    }

    #[test]
    fn test_invalid_key_material() {
        let off_curve = Jwk::from_value(json!({
            "kty": "EC",
            "crv": "P-256",
            "x": STANDARD.encode([0u8; 1]),
            "y": "9VE4jf_Ok_o64zbTTlcuNJajHmt6v9TDVrU0CdvGRDA"
        }))
        .unwrap();
        assert!(matches!(to_pem(&off_curve), Err(DpopError::InvalidKey { .. })));

        let exponent_one =
            Jwk::from_value(json!({"kty": "RSA", "n": "0vx7agoebGcQSuuP", "e": "AQ"})).unwrap();
        assert!(matches!(to_pem(&exponent_one), Err(DpopError::InvalidKey { .. })));
    }

    #[test]
    fn test_decode_legacy_public_key() {
        let wrapped = STANDARD.encode(EC_PEM);
        assert!(wrapped.starts_with(WRAPPED_PEM_PREFIX));
        assert_eq!(decode_legacy_public_key(&wrapped).unwrap(), EC_PEM);

        assert_eq!(decode_legacy_public_key(EC_PEM).unwrap(), EC_PEM.trim_end());

        assert!(matches!(
            decode_legacy_public_key("LS0 not base64"),
            Err(DpopError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_matches_legacy_public_key() {
        let crlf = EC_PEM.replace('\n', "\r\n");
        assert!(matches_legacy_public_key(&ec_key(), &crlf).unwrap());
        assert!(matches_legacy_public_key(&ec_key(), &STANDARD.encode(EC_PEM)).unwrap());
        assert!(!matches_legacy_public_key(&rsa_key(), EC_PEM).unwrap());
    }
}
