//! Trust anchors and issuer distrust policies
//!
//! This crate holds the configured root authorities that certificate chains
//! must terminate at, together with per-anchor temporal distrust policies:
//! - [`TrustAnchor`]: a root certificate plus its ordered policies
//! - [`DistrustPolicy`]: reject leaves issued on or after a cutoff instant
//! - [`TrustStore`]: anchors keyed by subject and key, frozen after loading
//! - [`TrustStoreConfig`]: the JSON document a store is loaded from
//!
//! # Example
//!
//! ```no_run
//! use certpolicy_trust_root::{DistrustPolicy, TrustAnchor, TrustStore, TrustStoreConfig};
//! use certpolicy_crypto::Certificate;
//!
//! // Load from a configuration file
//! let store = TrustStoreConfig::from_file("trust_store.json")
//!     .and_then(|config| config.to_trust_store())
//!     .unwrap();
//!
//! // Or assemble in code
//! let root = Certificate::from_pem(&std::fs::read_to_string("root.pem").unwrap()).unwrap();
//! let mut store = TrustStore::new();
//! store
//!     .add_anchor(TrustAnchor::new(root).with_policy(DistrustPolicy::startcom_wosign()))
//!     .unwrap();
//! ```

pub mod anchor;
pub mod config;
pub mod error;
pub mod policy;
pub mod store;

pub use anchor::TrustAnchor;
pub use config::{
    AnchorConfig, CertificateSource, PolicyConfig, PolicyPreset, TrustStoreConfig,
    MIN_CHAIN_DEPTH, TRUST_STORE_MEDIA_TYPE,
};
pub use error::{Error, Result};
pub use policy::{DistrustPolicy, IssuerMatcher, PolicyViolation, STARTCOM_WOSIGN_ROOTS};
pub use store::TrustStore;
