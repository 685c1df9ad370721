use std::path::{Path, PathBuf};

use base64ct::{Base64, Encoding};
use chrono::{DateTime, TimeZone, Utc};
use facturae_core::config::SignatureConfig;
use facturae_core::xades::{SignerCredentials, SigningContext, XadesSigner, c14n, parse_xml};
use libxml::tree::{Document, Node};
use libxml::xpath;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use sha1::Sha1;
use sha2::{Digest, Sha512};

pub const DS_NS: &str = "http://www.w3.org/2000/09/xmldsig#";
pub const XADES_NS: &str = "http://uri.etsi.org/01903/v1.3.2#";

#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[allow(dead_code)]
pub fn read_fixture(relative: &str) -> String {
    let path = fixtures_dir().join(relative);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

#[allow(dead_code)]
pub fn parse_fixture(relative: &str) -> Document {
    parse_xml(&read_fixture(relative)).expect("parse fixture")
}

#[allow(dead_code)]
pub fn credentials() -> SignerCredentials {
    SignerCredentials::from_pem(
        &read_fixture("keys/signer-cert.pem"),
        &read_fixture("keys/signer-key.pem"),
    )
    .expect("fixture credentials")
}

#[allow(dead_code)]
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 10, 30, 0)
        .single()
        .expect("valid time")
}

#[allow(dead_code)]
pub fn seeded_context(seed: u64) -> SigningContext {
    SigningContext::from_rng(&mut StdRng::seed_from_u64(seed))
}

/// Signer with pinned identifiers and signing time.
#[allow(dead_code)]
pub fn reproducible_signer(seed: u64) -> XadesSigner {
    XadesSigner::new(credentials())
        .with_context(seeded_context(seed))
        .with_config(SignatureConfig::default().with_signing_time(fixed_time()))
}

#[allow(dead_code)]
pub fn nodes(doc: &Document, expr: &str) -> Vec<Node> {
    let ctx = xpath::Context::new(doc).expect("xpath context");
    ctx.register_namespace("ds", DS_NS).expect("ds prefix");
    ctx.register_namespace("xades", XADES_NS).expect("xades prefix");
    ctx.evaluate(expr).expect("xpath").get_nodes_as_vec()
}

#[allow(dead_code)]
pub fn single(doc: &Document, expr: &str) -> Node {
    let mut found = nodes(doc, expr);
    assert_eq!(found.len(), 1, "expected one match for {expr}");
    found.remove(0)
}

#[allow(dead_code)]
pub fn text(doc: &Document, expr: &str) -> String {
    single(doc, expr).get_content()
}

/// Recomputes every reference digest the way a verifier would.
#[allow(dead_code)]
pub fn recompute_reference_digests(doc: &Document) -> Vec<(String, String)> {
    nodes(doc, "/*/ds:Signature/ds:SignedInfo/ds:Reference")
        .into_iter()
        .map(|reference| {
            let canonical = match reference.get_attribute("URI") {
                Some(uri) => {
                    let id = uri.trim_start_matches('#');
                    let target = single(doc, &format!("//*[@Id='{id}']"));
                    c14n::canonicalize_subtree(doc, &target).expect("c14n reference")
                }
                None => c14n::canonicalize_document(doc).expect("c14n document"),
            };
            let expected = Base64::encode_string(&Sha512::digest(canonical.as_bytes()));
            let stored = reference
                .get_child_elements()
                .into_iter()
                .find(|child| child.get_name() == "DigestValue")
                .expect("digest value")
                .get_content();
            (stored, expected)
        })
        .collect()
}

/// Verifies `SignatureValue` over the canonical `SignedInfo` with `credentials`.
#[allow(dead_code)]
pub fn verify_signature_value(doc: &Document, credentials: &SignerCredentials) -> bool {
    let signed_info = single(doc, "/*/ds:Signature/ds:SignedInfo");
    let canonical = c14n::canonicalize_subtree(doc, &signed_info).expect("c14n signed info");
    let value = text(doc, "/*/ds:Signature/ds:SignatureValue");
    let bytes = Base64::decode_vec(&value).expect("signature base64");
    let signature = Signature::try_from(bytes.as_slice()).expect("signature bytes");
    VerifyingKey::<Sha1>::new(credentials.public_key().clone())
        .verify(canonical.as_bytes(), &signature)
        .is_ok()
}
