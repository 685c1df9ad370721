//! Enveloped XAdES-BES signatures for Facturae documents.
//!
//! [`XadesSigner`] appends a `ds:Signature` to the document root holding
//! `SignedInfo`, `SignatureValue`, `KeyInfo` and a `ds:Object` with the
//! qualifying properties required by the Facturae signature policy.
pub mod c14n;
pub mod constants;
pub mod credentials;
pub mod crypto;
pub mod document;
pub mod ids;
pub mod key_info;
pub mod object_info;
pub mod signed_info;
pub mod signer;
pub mod validate;

pub use credentials::SignerCredentials;
pub use document::{TargetDocument, parse_xml};
pub use ids::SigningContext;
pub use key_info::{DefaultKeyInfoBuilder, KeyInfoBuilder};
pub use object_info::{DefaultObjectInfoBuilder, ObjectInfoBuilder};
pub use signed_info::{DefaultSignedInfoBuilder, SignedInfoBuilder};
pub use signer::{SigningError, XadesSigner, sign};
