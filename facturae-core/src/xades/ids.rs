//! Identifier allocation for signature elements.
//!
//! Every element that other parts of the signature point at carries an `Id`
//! made of a readable prefix and a random UUIDv4. Identifiers are a pure
//! function of the random source, so tests can pin them with a seeded RNG.
use rand::RngCore;
use uuid::Builder;

/// Returns `prefix` followed by a UUIDv4 drawn from `rng`.
pub fn new_id<R: RngCore + ?Sized>(prefix: &str, rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    let uuid = Builder::from_random_bytes(bytes).into_uuid();
    format!("{prefix}{uuid}")
}

/// Identifiers for a single signing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    signature_id: String,
    signed_info_id: String,
    signature_value_id: String,
    certificate_id: String,
    signed_properties_id: String,
    signature_object_id: String,
    reference_id: String,
    signed_properties_reference_id: String,
}

impl SigningContext {
    /// Allocates a fresh identifier set from the thread-local CSPRNG.
    pub fn generate() -> Self {
        Self::from_rng(&mut rand::rng())
    }

    pub fn from_rng<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let signature_id = new_id("Signature", rng);
        let signed_properties_id = new_id(&format!("{signature_id}-SignedProperties"), rng);
        let signature_object_id = new_id(&format!("{signature_id}-Object"), rng);
        Self {
            signed_info_id: new_id("Signature-SignedInfo", rng),
            signature_value_id: new_id("SignatureValue", rng),
            certificate_id: new_id("Certificate", rng),
            reference_id: new_id("Reference-ID-", rng),
            signed_properties_reference_id: new_id("SignedPropertiesID", rng),
            signature_id,
            signed_properties_id,
            signature_object_id,
        }
    }

    pub fn signature_id(&self) -> &str {
        &self.signature_id
    }

    pub fn signed_info_id(&self) -> &str {
        &self.signed_info_id
    }

    pub fn signature_value_id(&self) -> &str {
        &self.signature_value_id
    }

    pub fn certificate_id(&self) -> &str {
        &self.certificate_id
    }

    pub fn signed_properties_id(&self) -> &str {
        &self.signed_properties_id
    }

    pub fn signature_object_id(&self) -> &str {
        &self.signature_object_id
    }

    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    /// `Id` of the `Reference` that covers `SignedProperties`.
    pub fn signed_properties_reference_id(&self) -> &str {
        &self.signed_properties_reference_id
    }

    pub(crate) fn all(&self) -> [&str; 8] {
        [
            &self.signature_id,
            &self.signed_info_id,
            &self.signature_value_id,
            &self.certificate_id,
            &self.signed_properties_id,
            &self.signature_object_id,
            &self.reference_id,
            &self.signed_properties_reference_id,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn new_id_appends_uuid_v4() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = new_id("Certificate", &mut rng);
        let uuid = id.strip_prefix("Certificate").expect("prefix kept");
        let parsed = uuid::Uuid::parse_str(uuid).expect("uuid suffix");
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let a = SigningContext::from_rng(&mut StdRng::seed_from_u64(42));
        let b = SigningContext::from_rng(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn context_ids_are_distinct() {
        let ctx = SigningContext::generate();
        let unique: HashSet<&str> = ctx.all().into_iter().collect();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn nested_ids_carry_signature_id() {
        let ctx = SigningContext::generate();
        assert!(ctx.signed_properties_id().starts_with(&format!(
            "{}-SignedProperties",
            ctx.signature_id()
        )));
        assert!(
            ctx.signature_object_id()
                .starts_with(&format!("{}-Object", ctx.signature_id()))
        );
        assert!(ctx.reference_id().starts_with("Reference-ID-"));
    }

    #[test]
    fn contexts_never_repeat() {
        let first = SigningContext::generate();
        let second = SigningContext::generate();
        assert_ne!(first.signature_id(), second.signature_id());
        assert_ne!(first.reference_id(), second.reference_id());
    }
}
