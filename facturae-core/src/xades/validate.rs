//! Structural checks over an assembled signature.
//!
//! Each check returns the first violated condition as
//! [`SigningError::Structural`]. Digests and the signature value are checked
//! for shape only; nothing is cryptographically re-verified here.
use base64ct::{Base64, Encoding};
use libxml::{tree::Node, xpath};
use std::collections::HashSet;

use super::constants::{
    C14N_METHOD_ALGORITHM, DOCUMENT_REFERENCE_TYPE, DS_NS, ENVELOPED_SIGNATURE_TRANSFORM,
    SIGNATURE_METHOD_ALGORITHM, SIGNED_PROPERTIES_TYPE, XADES_NS, attr, node,
};
use super::document::{TargetDocument, child_element, child_elements};
use super::ids::SigningContext;
use super::signer::SigningError;

fn structural(message: impl Into<String>) -> SigningError {
    SigningError::Structural(message.into())
}

fn required(parent: &Node, ns: &str, name: &str) -> Result<Node, SigningError> {
    child_element(parent, ns, name)
        .ok_or_else(|| structural(format!("Missing {name} in {}", parent.get_name())))
}

fn expect_attribute(node: &Node, name: &str, expected: &str) -> Result<(), SigningError> {
    match node.get_attribute(name) {
        Some(value) if value == expected => Ok(()),
        Some(value) => Err(structural(format!(
            "{} {name} is {value}, expected {expected}",
            node.get_name()
        ))),
        None => Err(structural(format!("{} has no {name}", node.get_name()))),
    }
}

fn expect_algorithm(parent: &Node, name: &str, expected: &str) -> Result<(), SigningError> {
    let method = required(parent, DS_NS, name)?;
    expect_attribute(&method, attr::ALGORITHM, expected)
}

fn non_empty_text(node: &Node) -> Result<String, SigningError> {
    let text = node.get_content().trim().to_string();
    if text.is_empty() {
        return Err(structural(format!("Empty {}", node.get_name())));
    }
    Ok(text)
}

fn base64_text(node: &Node) -> Result<Vec<u8>, SigningError> {
    let text = non_empty_text(node)?;
    let bytes = Base64::decode_vec(&text)
        .map_err(|e| structural(format!("{} is not valid Base64: {e:?}", node.get_name())))?;
    if bytes.is_empty() {
        return Err(structural(format!("{} decodes to nothing", node.get_name())));
    }
    Ok(bytes)
}

/// Checks the `Signature` element produced for `context`.
pub fn validate_signature(
    target: &TargetDocument<'_>,
    signature: &Node,
    context: &SigningContext,
) -> Result<(), SigningError> {
    expect_attribute(signature, attr::ID, context.signature_id())?;
    match signature.get_parent() {
        Some(parent) if &parent == target.root() => {}
        _ => return Err(structural("Signature is not a child of the root element")),
    }
    check_namespace_scope(target)?;

    let signed_info = required(signature, DS_NS, node::SIGNED_INFO)?;
    check_signed_info(&signed_info, context)?;

    let signature_value = required(signature, DS_NS, node::SIGNATURE_VALUE)?;
    expect_attribute(&signature_value, attr::ID, context.signature_value_id())?;
    base64_text(&signature_value)?;

    let key_info = required(signature, DS_NS, node::KEY_INFO)?;
    check_key_info(&key_info, context)?;

    let object = required(signature, DS_NS, node::OBJECT)?;
    check_object(&object, context)?;

    check_element_order(signature)?;
    check_identifiers(target, context)
}

fn check_namespace_scope(target: &TargetDocument<'_>) -> Result<(), SigningError> {
    let declared: Vec<String> = target
        .root()
        .get_namespace_declarations()
        .iter()
        .map(|ns| ns.get_href())
        .collect();
    for href in [DS_NS, XADES_NS] {
        if !declared.iter().any(|d| d == href) {
            return Err(structural(format!(
                "Namespace {href} is not declared on the root element"
            )));
        }
    }
    Ok(())
}

fn check_element_order(signature: &Node) -> Result<(), SigningError> {
    let order: Vec<String> = signature
        .get_child_elements()
        .iter()
        .map(|child| child.get_name())
        .collect();
    let expected = [
        node::SIGNED_INFO,
        node::SIGNATURE_VALUE,
        node::KEY_INFO,
        node::OBJECT,
    ];
    if order != expected {
        return Err(structural(format!(
            "Signature children are {order:?}, expected {expected:?}"
        )));
    }
    Ok(())
}

fn check_signed_info(signed_info: &Node, context: &SigningContext) -> Result<(), SigningError> {
    expect_attribute(signed_info, attr::ID, context.signed_info_id())?;
    expect_algorithm(signed_info, node::CANONICALIZATION_METHOD, C14N_METHOD_ALGORITHM)?;
    expect_algorithm(signed_info, node::SIGNATURE_METHOD, SIGNATURE_METHOD_ALGORITHM)?;

    let references = child_elements(signed_info, DS_NS, node::REFERENCE);
    if references.len() != 3 {
        return Err(structural(format!(
            "Expected 3 references, found {}",
            references.len()
        )));
    }

    let properties = &references[0];
    expect_attribute(
        properties,
        attr::ID,
        context.signed_properties_reference_id(),
    )?;
    expect_attribute(properties, attr::TYPE, SIGNED_PROPERTIES_TYPE)?;
    expect_attribute(
        properties,
        attr::URI,
        &format!("#{}", context.signed_properties_id()),
    )?;

    let certificate = &references[1];
    expect_attribute(
        certificate,
        attr::URI,
        &format!("#{}", context.certificate_id()),
    )?;

    let document = &references[2];
    expect_attribute(document, attr::ID, context.reference_id())?;
    expect_attribute(document, attr::TYPE, DOCUMENT_REFERENCE_TYPE)?;
    let transform = required(document, DS_NS, node::TRANSFORMS)
        .and_then(|transforms| required(&transforms, DS_NS, node::TRANSFORM))?;
    expect_attribute(&transform, attr::ALGORITHM, ENVELOPED_SIGNATURE_TRANSFORM)?;

    for reference in &references {
        required(reference, DS_NS, node::DIGEST_METHOD)?;
        let digest_value = required(reference, DS_NS, node::DIGEST_VALUE)?;
        base64_text(&digest_value)?;
    }
    Ok(())
}

fn check_key_info(key_info: &Node, context: &SigningContext) -> Result<(), SigningError> {
    expect_attribute(key_info, attr::ID, context.certificate_id())?;
    let x509_data = required(key_info, DS_NS, node::X509_DATA)?;
    base64_text(&required(&x509_data, DS_NS, node::X509_CERTIFICATE)?)?;
    let rsa = required(key_info, DS_NS, node::KEY_VALUE)
        .and_then(|key_value| required(&key_value, DS_NS, node::RSA_KEY_VALUE))?;
    base64_text(&required(&rsa, DS_NS, node::MODULUS)?)?;
    base64_text(&required(&rsa, DS_NS, node::EXPONENT)?)?;
    Ok(())
}

fn check_object(object: &Node, context: &SigningContext) -> Result<(), SigningError> {
    expect_attribute(object, attr::ID, context.signature_object_id())?;
    let qualifying = required(object, XADES_NS, node::QUALIFYING_PROPERTIES)?;
    expect_attribute(
        &qualifying,
        attr::TARGET,
        &format!("#{}", context.signature_id()),
    )?;
    let signed = required(&qualifying, XADES_NS, node::SIGNED_PROPERTIES)?;
    expect_attribute(&signed, attr::ID, context.signed_properties_id())?;

    let ssp = required(&signed, XADES_NS, node::SIGNED_SIGNATURE_PROPERTIES)?;
    non_empty_text(&required(&ssp, XADES_NS, node::SIGNING_TIME)?)?;

    let cert = required(&ssp, XADES_NS, node::SIGNING_CERTIFICATE)
        .and_then(|signing| required(&signing, XADES_NS, node::CERT))?;
    let cert_digest = required(&cert, XADES_NS, node::CERT_DIGEST)?;
    required(&cert_digest, DS_NS, node::DIGEST_METHOD)?;
    base64_text(&required(&cert_digest, DS_NS, node::DIGEST_VALUE)?)?;
    let issuer_serial = required(&cert, XADES_NS, node::ISSUER_SERIAL)?;
    non_empty_text(&required(&issuer_serial, DS_NS, node::X509_ISSUER_NAME)?)?;
    let serial = non_empty_text(&required(&issuer_serial, DS_NS, node::X509_SERIAL_NUMBER)?)?;
    if !serial.bytes().all(|b| b.is_ascii_digit()) {
        return Err(structural(format!("X509SerialNumber {serial} is not decimal")));
    }

    let policy_id = required(&ssp, XADES_NS, node::SIGNATURE_POLICY_IDENTIFIER)
        .and_then(|identifier| required(&identifier, XADES_NS, node::SIGNATURE_POLICY_ID))?;
    let sig_policy_id = required(&policy_id, XADES_NS, node::SIG_POLICY_ID)?;
    non_empty_text(&required(&sig_policy_id, XADES_NS, node::IDENTIFIER)?)?;
    non_empty_text(&required(&sig_policy_id, XADES_NS, node::DESCRIPTION)?)?;
    let policy_hash = required(&policy_id, XADES_NS, node::SIG_POLICY_HASH)?;
    required(&policy_hash, DS_NS, node::DIGEST_METHOD)?;
    base64_text(&required(&policy_hash, DS_NS, node::DIGEST_VALUE)?)?;

    let claimed_role = required(&ssp, XADES_NS, node::SIGNER_ROLE)
        .and_then(|role| required(&role, XADES_NS, node::CLAIMED_ROLES))
        .and_then(|roles| required(&roles, XADES_NS, node::CLAIMED_ROLE))?;
    non_empty_text(&claimed_role)?;

    let format = required(&signed, XADES_NS, node::SIGNED_DATA_OBJECT_PROPERTIES)
        .and_then(|props| required(&props, XADES_NS, node::DATA_OBJECT_FORMAT))?;
    expect_attribute(
        &format,
        attr::OBJECT_REFERENCE,
        &format!("#{}", context.reference_id()),
    )?;
    non_empty_text(&required(&format, XADES_NS, node::MIME_TYPE)?)?;
    Ok(())
}

/// Every generated id is distinct and every internal pointer resolves.
fn check_identifiers(
    target: &TargetDocument<'_>,
    context: &SigningContext,
) -> Result<(), SigningError> {
    let generated: HashSet<&str> = context.all().into_iter().collect();
    if generated.len() != context.all().len() {
        return Err(structural("Generated identifiers are not distinct"));
    }

    let ctx = xpath::Context::new(target.document())
        .map_err(|e| SigningError::Xml(format!("XPath context error: {e:?}")))?;
    let ids: Vec<String> = ctx
        .evaluate("//*[@Id]")
        .map_err(|e| SigningError::Xml(format!("XPath error: {e:?}")))?
        .get_nodes_as_vec()
        .iter()
        .filter_map(|node| node.get_attribute(attr::ID))
        .collect();
    for id in context.all() {
        let occurrences = ids.iter().filter(|existing| existing.as_str() == id).count();
        if occurrences != 1 {
            return Err(structural(format!(
                "Id {id} occurs {occurrences} times in the document"
            )));
        }
    }

    for attribute in [attr::URI, attr::TARGET, attr::OBJECT_REFERENCE] {
        let expr = format!(
            "//*[local-name()='{}' and namespace-uri()='{DS_NS}']//@{attribute}",
            node::SIGNATURE
        );
        let pointers = ctx
            .evaluate(&expr)
            .map_err(|e| SigningError::Xml(format!("XPath error: {e:?}")))?
            .get_nodes_as_vec();
        for pointer in pointers {
            let value = pointer.get_content();
            let Some(id) = value.strip_prefix('#') else {
                return Err(structural(format!(
                    "{attribute} {value} is not a local reference"
                )));
            };
            if !ids.iter().any(|existing| existing == id) {
                return Err(structural(format!("{attribute} {value} does not resolve")));
            }
        }
    }
    Ok(())
}
