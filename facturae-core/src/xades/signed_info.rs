use libxml::tree::Node;

use super::constants::{
    C14N_METHOD_ALGORITHM, DIGEST_METHOD_ALGORITHM, DOCUMENT_REFERENCE_TYPE, DS_NS,
    ENVELOPED_SIGNATURE_TRANSFORM, SIGNATURE_METHOD_ALGORITHM, SIGNED_PROPERTIES_TYPE, attr, node,
};
use super::crypto;
use super::document::{
    TargetDocument, append_element, child_element, child_elements, set_attribute, set_text,
};
use super::ids::SigningContext;
use super::signer::SigningError;

/// Produces the `ds:SignedInfo` skeleton. Digest values are left empty and
/// filled by [`fill_reference_digests`] once the referenced siblings exist.
pub trait SignedInfoBuilder {
    fn build(
        &self,
        target: &TargetDocument<'_>,
        context: &SigningContext,
    ) -> Result<Option<Node>, SigningError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSignedInfoBuilder;

struct ReferenceTemplate<'a> {
    id: Option<&'a str>,
    reference_type: Option<&'a str>,
    uri: Option<String>,
    transform: Option<&'a str>,
}

impl SignedInfoBuilder for DefaultSignedInfoBuilder {
    fn build(
        &self,
        target: &TargetDocument<'_>,
        context: &SigningContext,
    ) -> Result<Option<Node>, SigningError> {
        let ds = target.ds();
        let mut signed_info = target.ds_element(node::SIGNED_INFO)?;
        set_attribute(&mut signed_info, attr::ID, context.signed_info_id())?;

        let mut c14n_method = append_element(&mut signed_info, ds, node::CANONICALIZATION_METHOD)?;
        set_attribute(&mut c14n_method, attr::ALGORITHM, C14N_METHOD_ALGORITHM)?;
        let mut signature_method = append_element(&mut signed_info, ds, node::SIGNATURE_METHOD)?;
        set_attribute(&mut signature_method, attr::ALGORITHM, SIGNATURE_METHOD_ALGORITHM)?;

        let references = [
            ReferenceTemplate {
                id: Some(context.signed_properties_reference_id()),
                reference_type: Some(SIGNED_PROPERTIES_TYPE),
                uri: Some(format!("#{}", context.signed_properties_id())),
                transform: None,
            },
            ReferenceTemplate {
                id: None,
                reference_type: None,
                uri: Some(format!("#{}", context.certificate_id())),
                transform: None,
            },
            ReferenceTemplate {
                id: Some(context.reference_id()),
                reference_type: Some(DOCUMENT_REFERENCE_TYPE),
                uri: None,
                transform: Some(ENVELOPED_SIGNATURE_TRANSFORM),
            },
        ];
        for template in &references {
            append_reference(target, &mut signed_info, template)?;
        }

        Ok(Some(signed_info))
    }
}

fn append_reference(
    target: &TargetDocument<'_>,
    signed_info: &mut Node,
    template: &ReferenceTemplate<'_>,
) -> Result<(), SigningError> {
    let ds = target.ds();
    let mut reference = append_element(signed_info, ds, node::REFERENCE)?;
    if let Some(id) = template.id {
        set_attribute(&mut reference, attr::ID, id)?;
    }
    if let Some(reference_type) = template.reference_type {
        set_attribute(&mut reference, attr::TYPE, reference_type)?;
    }
    if let Some(uri) = &template.uri {
        set_attribute(&mut reference, attr::URI, uri)?;
    }
    if let Some(algorithm) = template.transform {
        let mut transforms = append_element(&mut reference, ds, node::TRANSFORMS)?;
        let mut transform = append_element(&mut transforms, ds, node::TRANSFORM)?;
        set_attribute(&mut transform, attr::ALGORITHM, algorithm)?;
    }
    let mut digest_method = append_element(&mut reference, ds, node::DIGEST_METHOD)?;
    set_attribute(&mut digest_method, attr::ALGORITHM, DIGEST_METHOD_ALGORITHM)?;
    append_element(&mut reference, ds, node::DIGEST_VALUE)?;
    Ok(())
}

/// Computes every `Reference` digest of an attached `SignedInfo`.
///
/// A `#id` URI digests the element carrying that `Id`; a reference without a
/// URI (or with an empty one) digests the whole document minus signatures.
pub fn fill_reference_digests(
    target: &TargetDocument<'_>,
    signed_info: &Node,
) -> Result<(), SigningError> {
    for reference in child_elements(signed_info, DS_NS, node::REFERENCE) {
        let canonical = match reference.get_attribute(attr::URI).as_deref() {
            None | Some("") => target.canonicalize_document()?,
            Some(uri) => {
                let id = uri.strip_prefix('#').ok_or_else(|| {
                    SigningError::Encoding(format!("Unsupported reference URI: {uri}"))
                })?;
                let referenced = target.find_by_id(id)?.ok_or_else(|| {
                    SigningError::Encoding(format!("Reference target {uri} not found"))
                })?;
                target.canonicalize(&referenced)?
            }
        };

        let algorithm = child_element(&reference, DS_NS, node::DIGEST_METHOD)
            .and_then(|method| method.get_attribute(attr::ALGORITHM))
            .ok_or_else(|| SigningError::Encoding("Reference without DigestMethod".into()))?;
        let digest = crypto::digest_base64(&algorithm, canonical.as_bytes())?;
        log::trace!(
            "reference {} digest {digest}",
            reference.get_attribute(attr::URI).unwrap_or_default()
        );

        let mut digest_value = child_element(&reference, DS_NS, node::DIGEST_VALUE)
            .ok_or_else(|| SigningError::Encoding("Reference without DigestValue".into()))?;
        set_text(&mut digest_value, &digest)?;
    }
    Ok(())
}
