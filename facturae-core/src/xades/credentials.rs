//! Key and certificate material for a signer.
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use x509_cert::{
    Certificate,
    der::{Decode, DecodePem, Encode},
};

use super::crypto;
use super::signer::SigningError;

/// An RSA private key paired with the X.509 certificate that carries its
/// public half.
///
/// Construction fails with [`SigningError::Crypto`] when the certificate key
/// is not RSA or does not match the private key.
#[derive(Clone)]
pub struct SignerCredentials {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
    certificate: Certificate,
    certificate_der: Vec<u8>,
}

impl std::fmt::Debug for SignerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerCredentials")
            .field("issuer", &self.issuer_name())
            .field("serial", &self.serial_number())
            .finish_non_exhaustive()
    }
}

impl SignerCredentials {
    pub fn new(private_key: RsaPrivateKey, certificate: Certificate) -> Result<Self, SigningError> {
        let certificate_der = certificate.to_der().map_err(|e| {
            SigningError::Crypto(format!("Certificate DER encoding error: {e:?}"))
        })?;
        let public_key = certificate_public_key(&certificate)?;
        if private_key.to_public_key() != public_key {
            return Err(SigningError::Crypto(
                "Private key does not match the certificate public key".into(),
            ));
        }
        Ok(Self {
            private_key,
            public_key,
            certificate,
            certificate_der,
        })
    }

    /// Accepts PKCS#8 or PKCS#1 PEM for the key.
    pub fn from_pem(cert_pem: &str, private_key_pem: &str) -> Result<Self, SigningError> {
        let certificate = Certificate::from_pem(cert_pem.as_bytes())
            .map_err(|e| SigningError::Crypto(format!("Certificate parse error: {e:?}")))?;
        let private_key = RsaPrivateKey::from_pkcs8_pem(private_key_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_key_pem))
            .map_err(|e| SigningError::Crypto(format!("Private key parse error: {e:?}")))?;
        Self::new(private_key, certificate)
    }

    /// Accepts PKCS#8 or PKCS#1 DER for the key.
    pub fn from_der(cert_der: &[u8], private_key_der: &[u8]) -> Result<Self, SigningError> {
        let certificate = Certificate::from_der(cert_der)
            .map_err(|e| SigningError::Crypto(format!("Certificate parse error: {e:?}")))?;
        let private_key = RsaPrivateKey::from_pkcs8_der(private_key_der)
            .or_else(|_| RsaPrivateKey::from_pkcs1_der(private_key_der))
            .map_err(|e| SigningError::Crypto(format!("Private key parse error: {e:?}")))?;
        Self::new(private_key, certificate)
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    pub fn certificate_der(&self) -> &[u8] {
        &self.certificate_der
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub(crate) fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub fn modulus_base64(&self) -> String {
        crypto::base64(&self.public_key.n().to_bytes_be())
    }

    pub fn exponent_base64(&self) -> String {
        crypto::base64(&self.public_key.e().to_bytes_be())
    }

    /// Base64 SHA-512 of the certificate DER.
    pub fn certificate_digest_base64(&self) -> String {
        crypto::base64(&crypto::sha512(&self.certificate_der))
    }

    pub fn issuer_name(&self) -> String {
        let issuer = self.certificate.tbs_certificate.issuer.to_string();
        issuer
            .split(',')
            .map(|part| part.trim())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Serial number as a decimal string.
    pub fn serial_number(&self) -> String {
        serial_bytes_to_decimal_string(self.certificate.tbs_certificate.serial_number.as_bytes())
    }
}

fn certificate_public_key(certificate: &Certificate) -> Result<RsaPublicKey, SigningError> {
    let spki_der = certificate
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| SigningError::Crypto(format!("Failed to encode SPKI: {e:?}")))?;
    RsaPublicKey::from_public_key_der(&spki_der).map_err(|e| {
        SigningError::Crypto(format!("Certificate public key is not RSA: {e:?}"))
    })
}

fn serial_bytes_to_decimal_string(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "0".to_string();
    }

    let mut digits: Vec<u8> = vec![0];
    for &byte in bytes {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            let value = (*digit as u32) * 256 + carry;
            *digit = (value % 10) as u8;
            carry = value / 10;
        }
        while carry > 0 {
            digits.push((carry % 10) as u8);
            carry /= 10;
        }
    }

    while digits.len() > 1 && matches!(digits.last(), Some(0)) {
        digits.pop();
    }

    digits.iter().rev().map(|d| (b'0' + *d) as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64ct::{Base64, Encoding};

    const CERT_PEM: &str = include_str!("../../tests/fixtures/keys/signer-cert.pem");
    const KEY_PEM: &str = include_str!("../../tests/fixtures/keys/signer-key.pem");
    const OTHER_KEY_PEM: &str = include_str!("../../tests/fixtures/keys/other-key.pem");
    const EC_CERT_PEM: &str = include_str!("../../tests/fixtures/keys/ec-cert.pem");

    #[test]
    fn serial_bytes_to_decimal_string_handles_large_values() {
        assert_eq!(serial_bytes_to_decimal_string(&[]), "0");
        assert_eq!(serial_bytes_to_decimal_string(&[0x00, 0x01]), "1");
        assert_eq!(serial_bytes_to_decimal_string(&[0x01, 0x00]), "256");
        assert_eq!(
            serial_bytes_to_decimal_string(&[0x5A, 0x3F, 0x0C, 0x91, 0xD2]),
            "387604845010"
        );
    }

    #[test]
    fn loads_matching_pem_pair() {
        let creds = SignerCredentials::from_pem(CERT_PEM, KEY_PEM).expect("credentials");
        assert_eq!(creds.serial_number(), "387604845010");
        let issuer = creds.issuer_name();
        assert!(issuer.contains("CN=Firmante de Pruebas"));
        assert!(issuer.contains("O=Facturae Pruebas"));
        assert_eq!(creds.exponent_base64(), "AQAB");
        let modulus = Base64::decode_vec(&creds.modulus_base64()).expect("modulus b64");
        assert_eq!(modulus.len(), 256);
        assert_ne!(modulus[0], 0);
    }

    #[test]
    fn der_loading_matches_pem_loading() {
        let pem = SignerCredentials::from_pem(CERT_PEM, KEY_PEM).expect("pem credentials");
        let key_der = rsa::pkcs8::EncodePrivateKey::to_pkcs8_der(pem.private_key())
            .expect("key der");
        let der = SignerCredentials::from_der(pem.certificate_der(), key_der.as_bytes())
            .expect("der credentials");
        assert_eq!(der.certificate_der(), pem.certificate_der());
        assert_eq!(der.public_key(), pem.public_key());
    }

    #[test]
    fn certificate_digest_is_sha512_of_der() {
        let creds = SignerCredentials::from_pem(CERT_PEM, KEY_PEM).expect("credentials");
        assert_eq!(
            creds.certificate_digest_base64(),
            "Uk8DEX4LufnSQznvmppOjnwz4+OaSwJlxIWIqr84EV4Ha4V0oC3ySbQSVVgXVTvqsEadIJdUx5drC0+06iM9YA=="
        );
    }

    #[test]
    fn rejects_mismatched_key() {
        let err = SignerCredentials::from_pem(CERT_PEM, OTHER_KEY_PEM).expect_err("mismatch");
        assert!(matches!(err, SigningError::Crypto(_)));
    }

    #[test]
    fn rejects_non_rsa_certificate() {
        let err = SignerCredentials::from_pem(EC_CERT_PEM, KEY_PEM).expect_err("ec cert");
        match err {
            SigningError::Crypto(message) => assert!(message.contains("not RSA")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn debug_output_omits_key_material() {
        let creds = SignerCredentials::from_pem(CERT_PEM, KEY_PEM).expect("credentials");
        let debug = format!("{creds:?}");
        assert!(debug.contains("387604845010"));
        assert!(!debug.contains("private_key"));
    }
}
