use base64ct::{Base64, Encoding};
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha1::Sha1;
use sha2::{Digest, Sha512};

use super::constants::DIGEST_METHOD_ALGORITHM;
use super::signer::SigningError;

pub fn sha512(bytes: &[u8]) -> Vec<u8> {
    Sha512::digest(bytes).to_vec()
}

pub fn sha1(bytes: &[u8]) -> Vec<u8> {
    Sha1::digest(bytes).to_vec()
}

/// Standard padded Base64 on a single line.
pub fn base64(bytes: &[u8]) -> String {
    Base64::encode_string(bytes)
}

/// RSASSA-PKCS1-v1_5 over SHA-1 of `bytes`.
pub fn rsa_sign_sha1(key: &RsaPrivateKey, bytes: &[u8]) -> Result<Vec<u8>, SigningError> {
    let signing_key = SigningKey::<Sha1>::new(key.clone());
    let signature = signing_key
        .try_sign(bytes)
        .map_err(|e| SigningError::Crypto(format!("RSA signing failed: {e:?}")))?;
    Ok(signature.to_vec())
}

/// Digest `bytes` with the algorithm named by `algorithm` and Base64 the result.
pub fn digest_base64(algorithm: &str, bytes: &[u8]) -> Result<String, SigningError> {
    match algorithm {
        DIGEST_METHOD_ALGORITHM => Ok(base64(&sha512(bytes))),
        other => Err(SigningError::Crypto(format!(
            "Unsupported digest algorithm: {other}"
        ))),
    }
}
