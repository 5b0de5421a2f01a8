//! DocJourney Core — error taxonomy, configuration, domain-key derivation.

pub mod config;
pub mod domain;
pub mod error;

pub use config::{AvatarSettings, DataPaths, DocJourneyConfig};
pub use domain::{derive_key, key_for_url, parse_doc_url};
pub use error::{Error, Result};
