//! Common test utilities for integration tests
//!
//! Mints real DPoP proofs with freshly generated keys so the validation pipeline
//! can be exercised end to end for every supported algorithm.

#![allow(dead_code)]

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::rngs::OsRng;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::traits::PublicKeyParts;
use serde_json::{Value, json};
use std::sync::OnceLock;

/// Fixed validation time used across tests
pub const NOW: i64 = 1_700_000_000;

/// Reference RS256 proof, valid at [`REFERENCE_NOW`]
pub const REFERENCE_PROOF: &str = "eyJhbGciOiJSUzI1NiIsInR5cCI6ImRwb3Arand0IiwiandrIjp7Imt0eSI6IlJTQSIsImUiOiJBUUFCIiwibiI6ImpZWUdvcGxoT3ViWnBiQ1ZVa0RDMTJhVUU3MmJKYk9Oa3VoS1g1ZVBMcXhiYV9BYWN5NXpzei04Ykxab2ttY2lKOUtQc2dwMkl3Q050UDBDMTJrX25kRlBGYzhwQ3pjSWp5MUxRZ3JnMEtUdXhac1JLN0k1bnRBOTRVM3IxR0tMcTBjM1J3RGZ2dWZDLUtjb2g5aWNVM0xFOTZGZUlmTFozYzlnMmROai1MWXJ4eFBPSzFuY2dobmZMbHI5QXNiM3UweUt2eFZ6M1FUTVRoVUFmTVY0NmFVdXdKSi1RNXRYLUZKbXdqajZRNVQ0bzgyT2xLcjhzZDZoZGp6NkY2YUlrMDIzcmxXeFRfRmdPLU1MdS0tVkFBblpuXzBaSFhKSGRCUjA2NUpKVi1obE5YdmdtZnJqOTFmckY2djNabDY2QUtJQUZQd29GdHV3ZzR2S0pFaFUzdyJ9fQ.eyJpYXQiOjE2NzA4NjY4MzEsImp0aSI6InBkc2tsX0lKdHJtY2h3NlZ1UjQycEZFZDFoTWxzVmlMNnV4MUcxT0FzRHMiLCJodG0iOiJQT1NUIiwiaHR1IjoiaHR0cDovL2xvY2FsaG9zdDo2NTQzMi9hdXRoL3JlYWxtcy90ZGYvcHJvdG9jb2wvb3BlbmlkLWNvbm5lY3QvdG9rZW4ifQ.WB_43xmaKdr--j7rm4Z1O1OVUXroxA-Pyp2j1qHHz0pwRq4ejHG3ev83edjOQT-sXp5kyySw2o-d5cW33OkGy1ZP2kX_B4TILwvVCIEGtXoz_JfKWchCVdQ49AmaTekWTq66uE8SA-H8NIyTaKIouMmGF4_wRFFH8nv203NVd_V2tSxm7AlrwlD2WdvB6a81tfw2wFBnxivoup0SKdy1UbEZ0usn-IcoVlqI-cy7dw_rdnJ7Gm6AwbJiNgLbcdN_-nzOXmJro7Mn41PMQCT13IZiP17fs1j58dpE11xYyQWWEjgFZG19iflzloKkNeoXy8uPT-iRgnunr-8FUay0sA";

/// `iat` of [`REFERENCE_PROOF`]
pub const REFERENCE_NOW: i64 = 1_670_866_831;

/// Thumbprint of the key embedded in [`REFERENCE_PROOF`]
pub const REFERENCE_THUMBPRINT: &str = "bbsSdyA_3m_aig3CvdaLcYWvLRg1Yidpym39xpkODxY";

/// A private key plus the public JWK a client would embed
pub struct TestSigner {
    /// Header `alg`
    pub algorithm: &'static str,
    /// Public key as a JWK object
    pub jwk: Value,
    sign: Box<dyn Fn(&[u8]) -> Vec<u8>>,
}

impl TestSigner {
    /// ES256 over a fresh P-256 key
    pub fn es256() -> Self {
        let key = p256::ecdsa::SigningKey::random(&mut OsRng);
        let point = key.verifying_key().to_encoded_point(false);
        let jwk = ec_jwk("P-256", point.x().unwrap(), point.y().unwrap());
        Self {
            algorithm: "ES256",
            jwk,
            sign: Box::new(move |input| {
                let signature: p256::ecdsa::Signature = key.sign(input);
                signature.to_bytes().to_vec()
            }),
        }
    }

    /// ES384 over a fresh P-384 key
    pub fn es384() -> Self {
        let key = p384::ecdsa::SigningKey::random(&mut OsRng);
        let point = key.verifying_key().to_encoded_point(false);
        let jwk = ec_jwk("P-384", point.x().unwrap(), point.y().unwrap());
        Self {
            algorithm: "ES384",
            jwk,
            sign: Box::new(move |input| {
                let signature: p384::ecdsa::Signature = key.sign(input);
                signature.to_bytes().to_vec()
            }),
        }
    }

    /// ES512 over a fresh P-521 key
    pub fn es512() -> Self {
        let key = p521::ecdsa::SigningKey::random(&mut OsRng);
        let point = p521::ecdsa::VerifyingKey::from(&key).to_encoded_point(false);
        let jwk = ec_jwk("P-521", point.x().unwrap(), point.y().unwrap());
        Self {
            algorithm: "ES512",
            jwk,
            sign: Box::new(move |input| {
                let signature: p521::ecdsa::Signature = key.sign(input);
                signature.to_bytes().to_vec()
            }),
        }
    }

    /// RS256 over the shared 2048-bit key
    pub fn rs256() -> Self {
        let private = shared_rsa_key();
        let jwk = rsa_jwk(&private);
        let key = rsa::pkcs1v15::SigningKey::<sha2::Sha256>::new(private);
        Self {
            algorithm: "RS256",
            jwk,
            sign: Box::new(move |input| key.sign(input).to_vec()),
        }
    }

    /// RS384 over the shared 2048-bit key
    pub fn rs384() -> Self {
        let private = shared_rsa_key();
        let jwk = rsa_jwk(&private);
        let key = rsa::pkcs1v15::SigningKey::<sha2::Sha384>::new(private);
        Self {
            algorithm: "RS384",
            jwk,
            sign: Box::new(move |input| key.sign(input).to_vec()),
        }
    }

    /// RS512 over the shared 2048-bit key
    pub fn rs512() -> Self {
        let private = shared_rsa_key();
        let jwk = rsa_jwk(&private);
        let key = rsa::pkcs1v15::SigningKey::<sha2::Sha512>::new(private);
        Self {
            algorithm: "RS512",
            jwk,
            sign: Box::new(move |input| key.sign(input).to_vec()),
        }
    }

    /// Standard DPoP header for this key
    pub fn header(&self) -> Value {
        json!({"typ": "dpop+jwt", "alg": self.algorithm, "jwk": self.jwk})
    }

    /// Signed proof over `claims` with the standard header
    pub fn proof(&self, claims: &Value) -> String {
        self.proof_with_header(&self.header(), claims)
    }

    /// Signed proof with an arbitrary header
    pub fn proof_with_header(&self, header: &Value, claims: &Value) -> String {
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(claims.to_string())
        );
        let signature = (self.sign)(signing_input.as_bytes());
        format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature))
    }
}

/// Typical token-endpoint claims issued at `iat`
pub fn claims(iat: i64) -> Value {
    json!({
        "jti": format!("jti-{iat}"),
        "htm": "POST",
        "htu": "https://as.example.com/token",
        "iat": iat
    })
}

/// Replace the signature segment of a proof
pub fn with_signature(proof: &str, signature: &[u8]) -> String {
    let (signing_input, _) = proof.rsplit_once('.').expect("three segments");
    format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature))
}

/// Decoded signature segment of a proof
pub fn signature_of(proof: &str) -> Vec<u8> {
    let (_, signature) = proof.rsplit_once('.').expect("three segments");
    URL_SAFE_NO_PAD.decode(signature).expect("base64url signature")
}

/// RSA key generation is slow in debug builds, so one key serves every test
fn shared_rsa_key() -> rsa::RsaPrivateKey {
    static KEY: OnceLock<rsa::RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| rsa::RsaPrivateKey::new(&mut OsRng, 2048).expect("RSA key generation"))
        .clone()
}

fn ec_jwk(crv: &str, x: &[u8], y: &[u8]) -> Value {
    json!({
        "kty": "EC",
        "crv": crv,
        "x": URL_SAFE_NO_PAD.encode(x),
        "y": URL_SAFE_NO_PAD.encode(y)
    })
}

fn rsa_jwk(key: &rsa::RsaPrivateKey) -> Value {
    json!({
        "kty": "RSA",
        "n": URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
        "e": URL_SAFE_NO_PAD.encode(key.e().to_bytes_be())
    })
}
