//! Signature policy and signer role selection.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::xades::constants::{
    FACTURAE_POLICY_DESCRIPTION, FACTURAE_POLICY_DIGEST, FACTURAE_POLICY_IDENTIFIER,
};

/// Role the signer claims inside `SignerRole/ClaimedRoles`.
///
/// Facturae recognises the issuer of the invoice (`supplier`), the recipient
/// (`customer`) and a third party signing on behalf of either.
///
/// # Examples
/// ```rust
/// use std::str::FromStr;
/// use facturae_core::config::ClaimedRole;
///
/// let role = ClaimedRole::from_str("third-party")?;
/// assert_eq!(role, ClaimedRole::ThirdParty);
/// # Ok::<(), facturae_core::config::RoleParseError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimedRole {
    #[default]
    Supplier,
    Customer,
    ThirdParty,
}

/// Error returned when parsing a [`ClaimedRole`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleParseError {
    #[error("invalid claimed role: {input}")]
    Invalid { input: String },
}

impl FromStr for ClaimedRole {
    type Err = RoleParseError;
    fn from_str(role: &str) -> Result<ClaimedRole, RoleParseError> {
        match role.to_ascii_lowercase().as_str() {
            "supplier" | "emisor" => Ok(ClaimedRole::Supplier),
            "customer" | "receptor" => Ok(ClaimedRole::Customer),
            "third party" | "third-party" | "third_party" | "tercero" => Ok(ClaimedRole::ThirdParty),
            _ => Err(RoleParseError::Invalid {
                input: role.to_string(),
            }),
        }
    }
}

impl ClaimedRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimedRole::Supplier => "supplier",
            ClaimedRole::Customer => "customer",
            ClaimedRole::ThirdParty => "third party",
        }
    }
}

/// Signature policy referenced from `SignaturePolicyIdentifier`.
///
/// The digest identifies the published policy document and is carried as a
/// constant; it is never fetched or recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePolicy {
    identifier: String,
    description: String,
    digest: String,
}

impl SignaturePolicy {
    pub fn new(
        identifier: impl Into<String>,
        description: impl Into<String>,
        digest: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            description: description.into(),
            digest: digest.into(),
        }
    }

    /// Facturae signature policy v3.1.
    pub fn facturae_v3_1() -> Self {
        Self::new(
            FACTURAE_POLICY_IDENTIFIER,
            FACTURAE_POLICY_DESCRIPTION,
            FACTURAE_POLICY_DIGEST,
        )
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Base64 SHA-1 of the policy document.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl Default for SignaturePolicy {
    fn default() -> Self {
        Self::facturae_v3_1()
    }
}

/// Settings for the qualifying properties of a signature.
///
/// # Examples
/// ```rust
/// use facturae_core::config::{ClaimedRole, SignatureConfig, SignaturePolicy};
///
/// let config = SignatureConfig::new(SignaturePolicy::facturae_v3_1(), ClaimedRole::Supplier);
/// assert!(config.signing_time().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignatureConfig {
    policy: SignaturePolicy,
    role: ClaimedRole,
    signing_time: Option<DateTime<Utc>>,
}

impl SignatureConfig {
    pub fn new(policy: SignaturePolicy, role: ClaimedRole) -> Self {
        Self {
            policy,
            role,
            signing_time: None,
        }
    }

    /// Pins `SigningTime` instead of reading the clock at signing.
    pub fn with_signing_time(mut self, signing_time: DateTime<Utc>) -> Self {
        self.signing_time = Some(signing_time);
        self
    }

    pub fn policy(&self) -> &SignaturePolicy {
        &self.policy
    }

    pub fn role(&self) -> ClaimedRole {
        self.role
    }

    pub fn signing_time(&self) -> Option<DateTime<Utc>> {
        self.signing_time
    }
}
