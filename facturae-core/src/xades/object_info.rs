//! `ds:Object` carrying the XAdES qualifying properties.
use chrono::{DateTime, SecondsFormat, Utc};
use libxml::tree::Node;

use super::constants::{
    DATA_OBJECT_DESCRIPTION, DATA_OBJECT_MIME_TYPE, DATA_OBJECT_OID, DATA_OBJECT_OID_QUALIFIER,
    DIGEST_METHOD_ALGORITHM, POLICY_DIGEST_METHOD_ALGORITHM, attr, node,
};
use super::credentials::SignerCredentials;
use super::document::{
    TargetDocument, append_element, append_text_element, attach, set_attribute,
};
use super::ids::SigningContext;
use super::signer::SigningError;
use crate::config::SignatureConfig;

/// Produces the `ds:Object` element wrapping `xades:QualifyingProperties`.
pub trait ObjectInfoBuilder {
    fn build(
        &self,
        target: &TargetDocument<'_>,
        context: &SigningContext,
        credentials: &SignerCredentials,
        config: &SignatureConfig,
    ) -> Result<Option<Node>, SigningError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultObjectInfoBuilder;

impl ObjectInfoBuilder for DefaultObjectInfoBuilder {
    fn build(
        &self,
        target: &TargetDocument<'_>,
        context: &SigningContext,
        credentials: &SignerCredentials,
        config: &SignatureConfig,
    ) -> Result<Option<Node>, SigningError> {
        let signing_time = config.signing_time().unwrap_or_else(Utc::now);

        let mut object = target.ds_element(node::OBJECT)?;
        set_attribute(&mut object, attr::ID, context.signature_object_id())?;

        let mut qualifying = append_element(&mut object, target.xades(), node::QUALIFYING_PROPERTIES)?;
        set_attribute(
            &mut qualifying,
            attr::TARGET,
            &format!("#{}", context.signature_id()),
        )?;

        let mut signed_properties =
            append_element(&mut qualifying, target.xades(), node::SIGNED_PROPERTIES)?;
        set_attribute(
            &mut signed_properties,
            attr::ID,
            context.signed_properties_id(),
        )?;

        let mut signature_properties =
            signed_signature_properties(target, credentials, config, signing_time)?;
        attach(&mut signed_properties, &mut signature_properties)?;
        let mut data_object_properties = signed_data_object_properties(target, context)?;
        attach(&mut signed_properties, &mut data_object_properties)?;

        Ok(Some(object))
    }
}

/// `SigningTime` text: UTC, second precision, `Z` suffix.
pub fn format_signing_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn signed_signature_properties(
    target: &TargetDocument<'_>,
    credentials: &SignerCredentials,
    config: &SignatureConfig,
    signing_time: DateTime<Utc>,
) -> Result<Node, SigningError> {
    let (ds, xades) = (target.ds(), target.xades());
    let mut properties = target.element(xades, node::SIGNED_SIGNATURE_PROPERTIES)?;
    append_text_element(
        &mut properties,
        xades,
        node::SIGNING_TIME,
        &format_signing_time(&signing_time),
    )?;

    let mut signing_certificate = append_element(&mut properties, xades, node::SIGNING_CERTIFICATE)?;
    let mut cert = append_element(&mut signing_certificate, xades, node::CERT)?;
    let mut cert_digest = append_element(&mut cert, xades, node::CERT_DIGEST)?;
    let mut digest_method = append_element(&mut cert_digest, ds, node::DIGEST_METHOD)?;
    set_attribute(&mut digest_method, attr::ALGORITHM, DIGEST_METHOD_ALGORITHM)?;
    append_text_element(
        &mut cert_digest,
        ds,
        node::DIGEST_VALUE,
        &credentials.certificate_digest_base64(),
    )?;
    let mut issuer_serial = append_element(&mut cert, xades, node::ISSUER_SERIAL)?;
    append_text_element(
        &mut issuer_serial,
        ds,
        node::X509_ISSUER_NAME,
        &credentials.issuer_name(),
    )?;
    append_text_element(
        &mut issuer_serial,
        ds,
        node::X509_SERIAL_NUMBER,
        &credentials.serial_number(),
    )?;

    let policy = config.policy();
    let mut policy_identifier =
        append_element(&mut properties, xades, node::SIGNATURE_POLICY_IDENTIFIER)?;
    let mut policy_id = append_element(&mut policy_identifier, xades, node::SIGNATURE_POLICY_ID)?;
    let mut sig_policy_id = append_element(&mut policy_id, xades, node::SIG_POLICY_ID)?;
    append_text_element(&mut sig_policy_id, xades, node::IDENTIFIER, policy.identifier())?;
    append_text_element(&mut sig_policy_id, xades, node::DESCRIPTION, policy.description())?;
    let mut policy_hash = append_element(&mut policy_id, xades, node::SIG_POLICY_HASH)?;
    let mut hash_method = append_element(&mut policy_hash, ds, node::DIGEST_METHOD)?;
    set_attribute(&mut hash_method, attr::ALGORITHM, POLICY_DIGEST_METHOD_ALGORITHM)?;
    append_text_element(&mut policy_hash, ds, node::DIGEST_VALUE, policy.digest())?;

    let mut signer_role = append_element(&mut properties, xades, node::SIGNER_ROLE)?;
    let mut claimed_roles = append_element(&mut signer_role, xades, node::CLAIMED_ROLES)?;
    append_text_element(
        &mut claimed_roles,
        xades,
        node::CLAIMED_ROLE,
        config.role().as_str(),
    )?;

    Ok(properties)
}

fn signed_data_object_properties(
    target: &TargetDocument<'_>,
    context: &SigningContext,
) -> Result<Node, SigningError> {
    let xades = target.xades();
    let mut properties = target.element(xades, node::SIGNED_DATA_OBJECT_PROPERTIES)?;
    let mut format = append_element(&mut properties, xades, node::DATA_OBJECT_FORMAT)?;
    set_attribute(
        &mut format,
        attr::OBJECT_REFERENCE,
        &format!("#{}", context.reference_id()),
    )?;
    append_text_element(&mut format, xades, node::DESCRIPTION, DATA_OBJECT_DESCRIPTION)?;
    let mut object_identifier = append_element(&mut format, xades, node::OBJECT_IDENTIFIER)?;
    let mut identifier =
        append_text_element(&mut object_identifier, xades, node::IDENTIFIER, DATA_OBJECT_OID)?;
    set_attribute(&mut identifier, attr::QUALIFIER, DATA_OBJECT_OID_QUALIFIER)?;
    append_text_element(&mut format, xades, node::MIME_TYPE, DATA_OBJECT_MIME_TYPE)?;
    Ok(properties)
}
