use libxml::tree::{Document, Node};
use log::{debug, info};
use rsa::RsaPrivateKey;
use thiserror::Error;
use x509_cert::Certificate;

use super::constants::{attr, node};
use super::credentials::SignerCredentials;
use super::crypto;
use super::document::{TargetDocument, attach, parse_xml, set_attribute, set_text};
use super::ids::SigningContext;
use super::key_info::{DefaultKeyInfoBuilder, KeyInfoBuilder};
use super::object_info::{DefaultObjectInfoBuilder, ObjectInfoBuilder};
use super::signed_info::{DefaultSignedInfoBuilder, SignedInfoBuilder, fill_reference_digests};
use super::validate::validate_signature;
use crate::config::SignatureConfig;

#[derive(Debug, Error)]
pub enum SigningError {
    /// The assembled signature is incomplete or mis-identified.
    #[error("Signature structure error: {0}")]
    Structural(String),
    /// Key or certificate unusable for RSA-SHA1 / SHA-512.
    #[error("Cryptographic error: {0}")]
    Crypto(String),
    /// A node needed for digesting could not be located or canonicalized.
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("XML error: {0}")]
    Xml(String),
}

/// Produces one enveloped XAdES-BES signature.
///
/// A signer owns the identifiers of a single operation, so [`XadesSigner::sign`]
/// consumes it. On failure the document may already hold a partial
/// `ds:Signature` and should be discarded.
///
/// # Examples
/// ```rust,no_run
/// use facturae_core::xades::{SignerCredentials, XadesSigner};
///
/// # fn run(cert_pem: &str, key_pem: &str, xml: &str) -> Result<(), facturae_core::xades::SigningError> {
/// let credentials = SignerCredentials::from_pem(cert_pem, key_pem)?;
/// let signed = XadesSigner::new(credentials).sign_xml(xml)?;
/// # let _ = signed;
/// # Ok(())
/// # }
/// ```
pub struct XadesSigner {
    credentials: SignerCredentials,
    config: SignatureConfig,
    context: SigningContext,
    signed_info_builder: Box<dyn SignedInfoBuilder>,
    key_info_builder: Box<dyn KeyInfoBuilder>,
    object_info_builder: Box<dyn ObjectInfoBuilder>,
}

impl XadesSigner {
    pub fn new(credentials: SignerCredentials) -> Self {
        Self {
            credentials,
            config: SignatureConfig::default(),
            context: SigningContext::generate(),
            signed_info_builder: Box::new(DefaultSignedInfoBuilder),
            key_info_builder: Box::new(DefaultKeyInfoBuilder),
            object_info_builder: Box::new(DefaultObjectInfoBuilder),
        }
    }

    pub fn with_config(mut self, config: SignatureConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the generated identifiers, e.g. with a seeded set.
    pub fn with_context(mut self, context: SigningContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_signed_info_builder(mut self, builder: impl SignedInfoBuilder + 'static) -> Self {
        self.signed_info_builder = Box::new(builder);
        self
    }

    pub fn with_key_info_builder(mut self, builder: impl KeyInfoBuilder + 'static) -> Self {
        self.key_info_builder = Box::new(builder);
        self
    }

    pub fn with_object_info_builder(mut self, builder: impl ObjectInfoBuilder + 'static) -> Self {
        self.object_info_builder = Box::new(builder);
        self
    }

    pub fn context(&self) -> &SigningContext {
        &self.context
    }

    pub fn credentials(&self) -> &SignerCredentials {
        &self.credentials
    }

    /// Appends a `ds:Signature` to the root of `doc` and returns it.
    pub fn sign(self, doc: &mut Document) -> Result<Node, SigningError> {
        let context = &self.context;
        let target = TargetDocument::new(doc)?;
        debug!("signing {} as {}", target.root().get_name(), context.signature_id());

        let mut root = target.root().clone();
        let mut signature = target.ds_element(node::SIGNATURE)?;
        set_attribute(&mut signature, attr::ID, context.signature_id())?;
        attach(&mut root, &mut signature)?;

        let mut signed_info = self
            .signed_info_builder
            .build(&target, context)?
            .ok_or_else(|| SigningError::Structural("Missing SignedInfo".into()))?;
        let mut key_info = self
            .key_info_builder
            .build(&target, context, &self.credentials)?
            .ok_or_else(|| SigningError::Structural("Missing KeyInfo".into()))?;
        let mut object = self
            .object_info_builder
            .build(&target, context, &self.credentials, &self.config)?
            .ok_or_else(|| SigningError::Structural("Missing QualifyingProperties".into()))?;
        debug!("signature parts built");

        attach(&mut signature, &mut signed_info)?;
        attach(&mut signature, &mut key_info)?;
        attach(&mut signature, &mut object)?;
        debug!("key info and qualifying properties attached");

        fill_reference_digests(&target, &signed_info)?;

        let canonical = target.canonicalize(&signed_info)?;
        let value = crypto::rsa_sign_sha1(self.credentials.private_key(), canonical.as_bytes())?;
        let mut signature_value = target.ds_element(node::SIGNATURE_VALUE)?;
        set_attribute(&mut signature_value, attr::ID, context.signature_value_id())?;
        set_text(&mut signature_value, &crypto::base64(&value))?;
        signed_info
            .add_next_sibling(&mut signature_value)
            .map_err(|e| SigningError::Xml(format!("Failed to insert SignatureValue: {e:?}")))?;
        debug!("signature value computed");

        validate_signature(&target, &signature, context)?;
        info!("document signed as {}", context.signature_id());
        Ok(signature)
    }

    /// Parses `xml`, signs it and serializes the result.
    pub fn sign_xml(self, xml: &str) -> Result<String, SigningError> {
        let mut doc = parse_xml(xml)?;
        self.sign(&mut doc)?;
        Ok(doc.to_string())
    }
}

/// Signs `doc` with default settings.
pub fn sign(
    doc: &mut Document,
    private_key: &RsaPrivateKey,
    certificate: &Certificate,
) -> Result<Node, SigningError> {
    let credentials = SignerCredentials::new(private_key.clone(), certificate.clone())?;
    XadesSigner::new(credentials).sign(doc)
}
