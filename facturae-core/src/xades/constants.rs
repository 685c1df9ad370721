pub const DS_NS: &str = "http://www.w3.org/2000/09/xmldsig#";
pub const XADES_NS: &str = "http://uri.etsi.org/01903/v1.3.2#";

pub(crate) const DS_PREFIX: &str = "ds";
pub(crate) const XADES_PREFIX: &str = "xades";

pub const C14N_METHOD_ALGORITHM: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";
pub const SIGNATURE_METHOD_ALGORITHM: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
pub const DIGEST_METHOD_ALGORITHM: &str = "http://www.w3.org/2001/04/xmlenc#sha512";
pub const POLICY_DIGEST_METHOD_ALGORITHM: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
pub const ENVELOPED_SIGNATURE_TRANSFORM: &str =
    "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
pub const SIGNED_PROPERTIES_TYPE: &str = "http://uri.etsi.org/01903#SignedProperties";
pub const DOCUMENT_REFERENCE_TYPE: &str = "http://www.w3.org/2000/09/xmldsig#Object";

pub const FACTURAE_POLICY_IDENTIFIER: &str = "http://www.facturae.es/politica_de_firma_formato_facturae/politica_de_firma_formato_facturae_v3_1.pdf";
pub const FACTURAE_POLICY_DESCRIPTION: &str = "Política de Firma FacturaE v3.1";
/// SHA-1 of the published v3.1 policy PDF, base64.
pub const FACTURAE_POLICY_DIGEST: &str = "Ohixl6upD6av8N7pEvDABhEL6hM=";

pub(crate) const DATA_OBJECT_DESCRIPTION: &str = "Factura electrónica";
pub(crate) const DATA_OBJECT_OID: &str = "urn:oid:1.2.840.10003.5.109.10";
pub(crate) const DATA_OBJECT_OID_QUALIFIER: &str = "OIDAsURN";
pub(crate) const DATA_OBJECT_MIME_TYPE: &str = "application/xml";

/// Element names of the assembled signature.
pub(crate) mod node {
    pub const SIGNATURE: &str = "Signature";
    pub const SIGNED_INFO: &str = "SignedInfo";
    pub const CANONICALIZATION_METHOD: &str = "CanonicalizationMethod";
    pub const SIGNATURE_METHOD: &str = "SignatureMethod";
    pub const REFERENCE: &str = "Reference";
    pub const TRANSFORMS: &str = "Transforms";
    pub const TRANSFORM: &str = "Transform";
    pub const DIGEST_METHOD: &str = "DigestMethod";
    pub const DIGEST_VALUE: &str = "DigestValue";
    pub const SIGNATURE_VALUE: &str = "SignatureValue";
    pub const KEY_INFO: &str = "KeyInfo";
    pub const X509_DATA: &str = "X509Data";
    pub const X509_CERTIFICATE: &str = "X509Certificate";
    pub const KEY_VALUE: &str = "KeyValue";
    pub const RSA_KEY_VALUE: &str = "RSAKeyValue";
    pub const MODULUS: &str = "Modulus";
    pub const EXPONENT: &str = "Exponent";
    pub const OBJECT: &str = "Object";
    pub const QUALIFYING_PROPERTIES: &str = "QualifyingProperties";
    pub const SIGNED_PROPERTIES: &str = "SignedProperties";
    pub const SIGNED_SIGNATURE_PROPERTIES: &str = "SignedSignatureProperties";
    pub const SIGNING_TIME: &str = "SigningTime";
    pub const SIGNING_CERTIFICATE: &str = "SigningCertificate";
    pub const CERT: &str = "Cert";
    pub const CERT_DIGEST: &str = "CertDigest";
    pub const ISSUER_SERIAL: &str = "IssuerSerial";
    pub const X509_ISSUER_NAME: &str = "X509IssuerName";
    pub const X509_SERIAL_NUMBER: &str = "X509SerialNumber";
    pub const SIGNATURE_POLICY_IDENTIFIER: &str = "SignaturePolicyIdentifier";
    pub const SIGNATURE_POLICY_ID: &str = "SignaturePolicyId";
    pub const SIG_POLICY_ID: &str = "SigPolicyId";
    pub const SIG_POLICY_HASH: &str = "SigPolicyHash";
    pub const IDENTIFIER: &str = "Identifier";
    pub const DESCRIPTION: &str = "Description";
    pub const SIGNER_ROLE: &str = "SignerRole";
    pub const CLAIMED_ROLES: &str = "ClaimedRoles";
    pub const CLAIMED_ROLE: &str = "ClaimedRole";
    pub const SIGNED_DATA_OBJECT_PROPERTIES: &str = "SignedDataObjectProperties";
    pub const DATA_OBJECT_FORMAT: &str = "DataObjectFormat";
    pub const OBJECT_IDENTIFIER: &str = "ObjectIdentifier";
    pub const MIME_TYPE: &str = "MimeType";
}

/// Attribute names used on signature elements.
pub(crate) mod attr {
    pub const ID: &str = "Id";
    pub const URI: &str = "URI";
    pub const TYPE: &str = "Type";
    pub const ALGORITHM: &str = "Algorithm";
    pub const TARGET: &str = "Target";
    pub const OBJECT_REFERENCE: &str = "ObjectReference";
    pub const QUALIFIER: &str = "Qualifier";
}
