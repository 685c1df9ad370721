//! XAdES-BES signing for Facturae electronic invoices.
//!
//! # Examples
//! ```rust
//! use facturae_core::config::{ClaimedRole, SignatureConfig};
//!
//! let config = SignatureConfig::default();
//! assert_eq!(config.role(), ClaimedRole::Supplier);
//! ```
pub mod config;
pub mod xades;

use thiserror::Error;

pub use config::RoleParseError;
pub use xades::SigningError;

/// Top-level error wrapper for core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Signing(#[from] xades::SigningError),
    #[error(transparent)]
    Role(#[from] config::RoleParseError),
}
