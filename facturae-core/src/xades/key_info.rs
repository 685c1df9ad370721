use libxml::tree::Node;

use super::constants::{attr, node};
use super::credentials::SignerCredentials;
use super::crypto;
use super::document::{TargetDocument, append_element, append_text_element, set_attribute};
use super::ids::SigningContext;
use super::signer::SigningError;

/// Produces the `ds:KeyInfo` element of a signature.
pub trait KeyInfoBuilder {
    fn build(
        &self,
        target: &TargetDocument<'_>,
        context: &SigningContext,
        credentials: &SignerCredentials,
    ) -> Result<Option<Node>, SigningError>;
}

/// Certificate plus RSA key value, identified by the context's certificate id.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultKeyInfoBuilder;

impl KeyInfoBuilder for DefaultKeyInfoBuilder {
    fn build(
        &self,
        target: &TargetDocument<'_>,
        context: &SigningContext,
        credentials: &SignerCredentials,
    ) -> Result<Option<Node>, SigningError> {
        let ds = target.ds();
        let mut key_info = target.ds_element(node::KEY_INFO)?;
        set_attribute(&mut key_info, attr::ID, context.certificate_id())?;

        let mut x509_data = append_element(&mut key_info, ds, node::X509_DATA)?;
        append_text_element(
            &mut x509_data,
            ds,
            node::X509_CERTIFICATE,
            &crypto::base64(credentials.certificate_der()),
        )?;

        let mut key_value = append_element(&mut key_info, ds, node::KEY_VALUE)?;
        let mut rsa_key_value = append_element(&mut key_value, ds, node::RSA_KEY_VALUE)?;
        append_text_element(
            &mut rsa_key_value,
            ds,
            node::MODULUS,
            &credentials.modulus_base64(),
        )?;
        append_text_element(
            &mut rsa_key_value,
            ds,
            node::EXPONENT,
            &credentials.exponent_base64(),
        )?;

        Ok(Some(key_info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xades::constants::DS_NS;
    use crate::xades::document::{child_element, parse_xml};

    const CERT_PEM: &str = include_str!("../../tests/fixtures/keys/signer-cert.pem");
    const KEY_PEM: &str = include_str!("../../tests/fixtures/keys/signer-key.pem");

    #[test]
    fn renders_certificate_and_key_value() {
        let creds = SignerCredentials::from_pem(CERT_PEM, KEY_PEM).expect("credentials");
        let doc = parse_xml("<Root/>").expect("parse");
        let target = TargetDocument::new(&doc).expect("target");
        let context = SigningContext::generate();

        let key_info = DefaultKeyInfoBuilder
            .build(&target, &context, &creds)
            .expect("build")
            .expect("key info node");

        assert_eq!(
            key_info.get_attribute("Id").as_deref(),
            Some(context.certificate_id())
        );
        let cert = child_element(&key_info, DS_NS, "X509Data")
            .and_then(|data| child_element(&data, DS_NS, "X509Certificate"))
            .expect("certificate");
        assert_eq!(cert.get_content(), crypto::base64(creds.certificate_der()));

        let rsa = child_element(&key_info, DS_NS, "KeyValue")
            .and_then(|value| child_element(&value, DS_NS, "RSAKeyValue"))
            .expect("rsa key value");
        let exponent = child_element(&rsa, DS_NS, "Exponent").expect("exponent");
        assert_eq!(exponent.get_content(), "AQAB");
        let modulus = child_element(&rsa, DS_NS, "Modulus").expect("modulus");
        assert_eq!(modulus.get_content(), creds.modulus_base64());
    }
}
